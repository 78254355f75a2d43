//! Deterministic identifier corpus shared by the benches.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const PACKAGES: &[&str] = &[
    "java", "javax", "org", "com", "io", "net", "util", "lang", "concurrent", "netty", "buffer",
    "apache", "commons", "internal", "spi", "impl", "reflect", "security", "stream", "function",
];
const WORDS: &[&str] = &[
    "Abstract", "Array", "Buffer", "Byte", "Channel", "Concurrent", "Default", "Entry", "Factory",
    "Hash", "Handler", "Linked", "List", "Map", "Node", "Queue", "Reader", "Set", "Skip", "Stream",
    "String", "Tree", "Utils", "Writer",
];

pub fn identifiers(count: usize) -> Vec<String> {
    let mut rng = StdRng::seed_from_u64(0x9E37_79B9_7F4A_7C15);
    (0..count)
        .map(|_| {
            let mut name = String::new();
            for _ in 0..rng.gen_range(2..5) {
                name.push_str(PACKAGES[rng.gen_range(0..PACKAGES.len())]);
                name.push('.');
            }
            for _ in 0..rng.gen_range(1..4) {
                name.push_str(WORDS[rng.gen_range(0..WORDS.len())]);
            }
            name
        })
        .collect()
}
