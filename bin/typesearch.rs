use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::ops::Range;
use std::path::{Path, PathBuf};
use tracing::info;
use typesearch::{EntryOrder, IndexConfig, SearchIndex, SearchResult, Tokenizer};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum TokenizerArg {
    Java,
    Bytecode,
}

impl From<TokenizerArg> for Tokenizer {
    fn from(arg: TokenizerArg) -> Self {
        match arg {
            TokenizerArg::Java => Tokenizer::Java,
            TokenizerArg::Bytecode => Tokenizer::Bytecode,
        }
    }
}

#[derive(Parser)]
#[command(name = "typesearch")]
#[command(about = "Camel-hump search over qualified identifiers", long_about = None)]
struct Args {
    /// Identifier lists, one name per line. Each file becomes a category
    /// named after its file stem.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Configuration file (defaults to ./typesearch.toml when present)
    #[arg(long, env = "TYPESEARCH_CONFIG")]
    config: Option<PathBuf>,

    /// Maximum jumps per match (0-5)
    #[arg(long)]
    jumps: Option<u8>,

    /// Entries per automaton chunk
    #[arg(long)]
    chunk_size: Option<usize>,

    /// How identifiers are split
    #[arg(long, value_enum)]
    tokenizer: Option<TokenizerArg>,

    /// Rank short simple names first within a jump count
    #[arg(long)]
    relevance: bool,

    /// Pattern to search; reads one pattern per line from stdin when absent
    #[arg(short, long)]
    query: Option<String>,

    /// Maximum results per pattern
    #[arg(short, long, default_value = "20")]
    limit: usize,

    /// Print automaton statistics after loading
    #[arg(long)]
    stats: bool,
}

fn load_config(args: &Args) -> Result<IndexConfig> {
    let mut config = match &args.config {
        Some(path) => IndexConfig::load_from_path(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => IndexConfig::load()?,
    };
    if let Some(jumps) = args.jumps {
        config = config.with_jumps(jumps);
    }
    if let Some(chunk_size) = args.chunk_size {
        config = config.with_chunk_size(chunk_size);
    }
    if let Some(tokenizer) = args.tokenizer {
        config = config.with_tokenizer(tokenizer.into());
    }
    if args.relevance {
        config = config.with_order(EntryOrder::Relevance);
    }
    Ok(config)
}

fn category_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Wrap the highlighted ranges of `text` in brackets.
fn highlight(text: &str, ranges: &[Range<usize>]) -> String {
    let mut out = String::with_capacity(text.len() + ranges.len() * 2);
    let mut last = 0;
    for range in ranges {
        out.push_str(&text[last..range.start]);
        out.push('[');
        out.push_str(&text[range.clone()]);
        out.push(']');
        last = range.end;
    }
    out.push_str(&text[last..]);
    out
}

fn print_results(
    out: &mut impl Write,
    results: impl Iterator<Item = SearchResult<String, ()>>,
) -> io::Result<()> {
    for result in results {
        writeln!(
            out,
            "{}\t{}\t{}",
            result.jumps(),
            result.category(),
            highlight(result.as_str(), &result.highlights())
        )?;
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;
    info!(?config, "configuration loaded");

    let index: SearchIndex<String, ()> = SearchIndex::new(config)?;
    for path in &args.files {
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        let automaton = index
            .replace_lines(category_name(path), BufReader::new(file))
            .with_context(|| format!("indexing {}", path.display()))?;
        if args.stats {
            let stats = automaton.stats();
            eprintln!(
                "{}: {} entries, {} chunks, {} states, {} KiB",
                category_name(path),
                stats.entries,
                stats.chunks,
                stats.states,
                stats.heap_bytes / 1024
            );
        }
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match &args.query {
        Some(pattern) => print_results(&mut out, index.find_all(pattern).take(args.limit))?,
        None => {
            for line in io::stdin().lock().lines() {
                let line = line?;
                let pattern = line.trim();
                if pattern.is_empty() {
                    continue;
                }
                print_results(&mut out, index.find_all(pattern).take(args.limit))?;
                out.flush()?;
            }
        }
    }
    Ok(())
}
