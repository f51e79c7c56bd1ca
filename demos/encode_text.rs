use log::{info, LevelFilter};
use sentinel_huffman::{compress, decompress};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};
use std::env;

fn main() {
    // Available log levels are Error, Warn, Info, Debug, Trace
    let level = env::var("HUFFMAN_LOG")
        .ok()
        .and_then(|l| l.parse().ok())
        .unwrap_or(LevelFilter::Info);
    TermLogger::init(level, Config::default(), TerminalMode::Stderr, ColorChoice::Auto)
        .expect("Logger was already initialised.");

    let s = env::args()
        .nth(1)
        .unwrap_or_else(|| String::from("Hello my name is Sam!"));

    let (tree, out) = compress(s.as_bytes()).expect("Input could not be encoded.");
    let table = tree.code_table().expect("Tree could not be tabled.");
    for (value, code) in table.iter() {
        info!("{:?} => {}", value, code);
    }
    info!("{} bytes in, {} bytes out", s.len(), out.len());

    let dec = String::from_utf8(decompress(&out, &tree).expect("Output could not be decoded."));

    println!("{:?}", dec);
}
