//! Huffman coding with an explicit end-of-stream symbol.
//!
//! A synthetic terminator is counted alongside the input symbols, so the
//! packed output needs no length header: the decoder stops when it reaches
//! the terminator leaf and ignores the padding in the last byte. The tree
//! is not stored in the output and must reach the decoder some other way.
//!
//! ```
//! use sentinel_huffman::{build_tree, decode, encode, frequencies};
//!
//! let s = "Hello my name is Sam!";
//! let tree = build_tree(frequencies(s.bytes())).unwrap();
//! let table = tree.code_table()?;
//!
//! let out = encode(s.bytes(), &table)?;
//! assert_eq!(decode(&out, &tree)?, s.as_bytes());
//! # Ok::<(), sentinel_huffman::Error>(())
//! ```

mod codec;
mod error;
mod frequency;
mod table;
mod tree;

pub use codec::{decode, encode, pack};
pub use error::{Error, Result};
pub use frequency::{frequencies, Frequency, Value};
pub use table::{Bits, CodeTable, EncodedEntity, MAX_CODE_LEN};
pub use tree::{build_tree, Leaves, Node};

use std::hash::Hash;

/// Runs the whole pipeline over `symbols` and returns the tree needed to
/// decode alongside the packed bytes.
pub fn compress<Symbol>(symbols: &[Symbol]) -> Result<(Node<Symbol>, Vec<u8>)>
where
    Symbol: Eq + Hash + Clone,
{
    let tree = build_tree(frequencies(symbols.iter().cloned())).ok_or(Error::TreeIsEmpty)?;
    let table = tree.code_table()?;
    let out = encode(symbols, &table)?;

    Ok((tree, out))
}

/// Inverse of [`compress`].
pub fn decompress<Symbol: Clone>(input: &[u8], tree: &Node<Symbol>) -> Result<Vec<Symbol>> {
    decode(input, tree)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compress_round_trip() {
        for s in ["", "a", "aa", "ggggggg", "This is a test string to encode"] {
            let (tree, out) = compress(s.as_bytes()).unwrap();
            assert_eq!(decompress(&out, &tree).unwrap(), s.as_bytes());
        }
    }

    #[test]
    fn compress_chars() {
        let s: Vec<char> = "🙂🙃🙂🙃🙂🙃🙂🙃🙂🙃🙂🙃".chars().collect();
        let (tree, out) = compress(&s).unwrap();

        // 🙃 = 0, 🙂 = 11, terminator = 10: 20 bits
        assert_eq!(out.len(), 3);
        assert_eq!(decompress(&out, &tree).unwrap(), s);
    }
}
