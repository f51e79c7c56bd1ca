use crate::error::Result;
use crate::frequency::Value;
use crate::table::{CodeTable, EncodedEntity};
use crate::tree::Node;
use bitvec::prelude::*;
use log::warn;
use std::borrow::Borrow;
use std::hash::Hash;

/// Packs codes into bytes, least significant bit first. Unused high bits of
/// the last byte are zero.
pub fn pack(codes: impl IntoIterator<Item = EncodedEntity>) -> Vec<u8> {
    let mut out: BitVec<u8, Lsb0> = BitVec::new();
    for code in codes {
        out.extend(code.bits());
    }

    out.set_uninitialized(false);
    out.into_vec()
}

/// Encodes `symbols` followed by the terminator.
///
/// Every symbol must have a code in `table`, otherwise this fails with
/// [`Error::InvalidSequence`](crate::Error::InvalidSequence) and nothing is
/// produced.
pub fn encode<Symbol, B>(
    symbols: impl IntoIterator<Item = B>,
    table: &CodeTable<Symbol>,
) -> Result<Vec<u8>>
where
    Symbol: Eq + Hash,
    B: Borrow<Symbol>,
{
    let codes = table.codes_terminated(symbols)?;
    Ok(pack(codes))
}

/// Walks `root` one bit at a time until the terminator leaf is reached.
///
/// Bits after the terminator are ignored. If the input runs out first, the
/// symbols decoded so far are returned.
pub fn decode<Symbol>(input: &[u8], root: &Node<Symbol>) -> Result<Vec<Symbol>>
where
    Symbol: Clone,
{
    let mut out = Vec::new();

    let mut cursor = root;
    for bit in input.view_bits::<Lsb0>().iter().by_vals() {
        cursor = cursor.child(bit)?;

        match cursor.value() {
            Some(Value::Symbol(sym)) => {
                out.push(sym.clone());
                cursor = root;
            }
            Some(Value::Terminator) => return Ok(out),
            None => {}
        }
    }

    // a lone terminator leaf has an empty code, so empty input is complete
    if !(root.is_leaf() && input.is_empty()) {
        warn!(
            "input ended after {} symbols without a terminator",
            out.len()
        );
    }

    Ok(out)
}
