use log::{info, LevelFilter};
use sentinel_huffman::{compress, decompress, Node};
use serde::{Deserialize, Serialize};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};
use std::env;
use std::fs;

/// The packed bytes travel together with the tree needed to decode them.
#[derive(Serialize, Deserialize)]
struct HuffmanSerialized {
    data: Vec<u8>,
    tree: Node<u8>,
}

fn main() {
    let level = env::var("HUFFMAN_LOG")
        .ok()
        .and_then(|l| l.parse().ok())
        .unwrap_or(LevelFilter::Info);
    TermLogger::init(level, Config::default(), TerminalMode::Stderr, ColorChoice::Auto)
        .expect("Logger was already initialised.");

    let fp = env::args().nth(1).expect("Please provide path to input file as first argument.");

    let input_bytes = fs::read(fp).expect("First argument was not a valid filepath.");

    // encode scope - save to file
    {
        let (tree, data) = compress(&input_bytes).expect("Input could not be encoded.");
        info!("{} bytes in, {} bytes out", input_bytes.len(), data.len());

        let packed = HuffmanSerialized { data, tree };
        let file_data = rmp_serde::to_vec(&packed).unwrap();

        fs::write("encoded.mp", file_data).unwrap();
    }

    // decode scope - read from file
    {
        let file_data = fs::read("encoded.mp").unwrap();

        let packed: HuffmanSerialized = rmp_serde::from_slice(&file_data).unwrap();
        let decoded = decompress(&packed.data, &packed.tree).expect("Output could not be decoded.");

        fs::write("decoded.txt", decoded).unwrap();
    }
}
