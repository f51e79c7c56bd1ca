use crate::error::{Error, Result};
use crate::frequency::Value;
use crate::tree::Node;
use bitvec::prelude::*;
use log::debug;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::ops::Range;
use std::str::FromStr;

/// Longest code an [`EncodedEntity`] can hold.
pub const MAX_CODE_LEN: u8 = 64;

/// The root-to-leaf path of one leaf.
///
/// Bit 0 of `bits` is the branch taken at the root, bit `len - 1` the
/// branch into the leaf. A set bit means "right".
///
/// Serialized as a `(len, bits)` pair; deserializing goes through
/// [`EncodedEntity::new`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "(u8, u64)", into = "(u8, u64)")]
pub struct EncodedEntity {
    len: u8,
    bits: u64,
}

impl EncodedEntity {
    /// Builds a code from its length and bit pattern. Bits above `len` are
    /// cleared.
    pub fn new(len: u8, bits: u64) -> Result<Self> {
        if len > MAX_CODE_LEN {
            return Err(Error::CodeTooLong { depth: len as usize });
        }

        let mut bits = BitArray::<u64, Lsb0>::new(bits);
        bits[len as usize..].fill(false);

        Ok(Self {
            len,
            bits: bits.into_inner(),
        })
    }

    pub fn len(&self) -> u8 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn pattern(&self) -> u64 {
        self.bits
    }

    /// Iterates the branches of this code, root first.
    pub fn bits(&self) -> Bits {
        Bits {
            bits: BitArray::new(self.bits),
            range: 0..self.len as usize,
        }
    }

    /// True when `self` is a (possibly equal) prefix of `other`.
    pub fn is_prefix_of(&self, other: &EncodedEntity) -> bool {
        self.len <= other.len && self.bits().eq(other.bits().take(self.len as usize))
    }

    /// This code extended by one more branch.
    pub(crate) fn branch(self, right: bool) -> Result<Self> {
        if self.len >= MAX_CODE_LEN {
            return Err(Error::CodeTooLong {
                depth: self.len as usize + 1,
            });
        }

        let mut bits = BitArray::<u64, Lsb0>::new(self.bits);
        bits.set(self.len as usize, right);

        Ok(Self {
            len: self.len + 1,
            bits: bits.into_inner(),
        })
    }
}

impl TryFrom<(u8, u64)> for EncodedEntity {
    type Error = Error;

    fn try_from((len, bits): (u8, u64)) -> Result<Self> {
        Self::new(len, bits)
    }
}

impl From<EncodedEntity> for (u8, u64) {
    fn from(code: EncodedEntity) -> Self {
        (code.len, code.bits)
    }
}

impl fmt::Display for EncodedEntity {
    /// Writes the path as `0`/`1` characters, root branch first.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.bits() {
            f.write_str(if bit { "1" } else { "0" })?;
        }

        Ok(())
    }
}

impl FromStr for EncodedEntity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        s.chars().try_fold(EncodedEntity::default(), |code, c| match c {
            '0' => code.branch(false),
            '1' => code.branch(true),
            _ => Err(Error::InvalidCode(s.to_owned())),
        })
    }
}

/// Lazy iterator over the bits of an [`EncodedEntity`], least significant
/// first.
#[derive(Debug, Clone)]
pub struct Bits {
    bits: BitArray<u64, Lsb0>,
    range: Range<usize>,
}

impl Iterator for Bits {
    type Item = bool;

    fn next(&mut self) -> Option<bool> {
        self.range.next().map(|i| self.bits[i])
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.range.size_hint()
    }
}

impl ExactSizeIterator for Bits {}

/// Maps every leaf value of a tree to its code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeTable<Symbol>
where
    Symbol: Eq + Hash,
{
    symbols: HashMap<Symbol, EncodedEntity>,
    terminator: Option<EncodedEntity>,
}

impl<Symbol> CodeTable<Symbol>
where
    Symbol: Eq + Hash,
{
    fn empty() -> Self {
        Self {
            symbols: HashMap::new(),
            terminator: None,
        }
    }

    /// Walks the tree depth first and records the path to every leaf.
    ///
    /// Fails with [`Error::TreeIsEmpty`] without a root, and with
    /// [`Error::InvalidTree`] when two leaves carry the same value.
    pub fn from_tree(root: Option<&Node<Symbol>>) -> Result<Self>
    where
        Symbol: Clone,
    {
        fn traverse<Symbol: Eq + Hash + Clone>(
            node: &Node<Symbol>,
            code: EncodedEntity,
            table: &mut CodeTable<Symbol>,
        ) -> Result<()> {
            match node {
                Node::Leaf { value, .. } => table.insert(value.clone(), code),
                Node::Internal { left, right, .. } => {
                    traverse(left, code.branch(false)?, table)?;
                    traverse(right, code.branch(true)?, table)
                }
            }
        }

        let root = root.ok_or(Error::TreeIsEmpty)?;
        let mut table = Self::empty();
        traverse(root, EncodedEntity::default(), &mut table)?;

        debug!(
            "code table built: {} codes, longest {} bits",
            table.len(),
            table.max_len()
        );

        Ok(table)
    }

    /// Collects explicit `(value, code)` pairs. A value listed twice fails
    /// with [`Error::InvalidTree`]; the codes themselves are not checked.
    pub fn from_codes(
        codes: impl IntoIterator<Item = (Value<Symbol>, EncodedEntity)>,
    ) -> Result<Self> {
        let mut table = Self::empty();
        for (value, code) in codes {
            table.insert(value, code)?;
        }

        Ok(table)
    }

    fn insert(&mut self, value: Value<Symbol>, code: EncodedEntity) -> Result<()> {
        let previous = match value {
            Value::Symbol(s) => self.symbols.insert(s, code),
            Value::Terminator => self.terminator.replace(code),
        };

        match previous {
            Some(_) => Err(Error::InvalidTree),
            None => Ok(()),
        }
    }

    pub fn get(&self, value: &Value<Symbol>) -> Option<&EncodedEntity> {
        match value {
            Value::Symbol(s) => self.symbols.get(s),
            Value::Terminator => self.terminator.as_ref(),
        }
    }

    pub fn code_for(&self, symbol: &Symbol) -> Result<EncodedEntity> {
        self.symbols.get(symbol).copied().ok_or(Error::MissingValue)
    }

    pub fn terminator(&self) -> Option<EncodedEntity> {
        self.terminator
    }

    /// Number of leaves, terminator included.
    pub fn len(&self) -> usize {
        self.symbols.len() + usize::from(self.terminator.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn max_len(&self) -> u8 {
        self.iter().map(|(_, code)| code.len()).max().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Value<&Symbol>, EncodedEntity)> + '_ {
        self.symbols
            .iter()
            .map(|(s, code)| (Value::Symbol(s), *code))
            .chain(self.terminator.map(|code| (Value::Terminator, code)))
    }

    /// Looks up the code of every symbol, in order.
    pub fn codes<B>(&self, symbols: impl IntoIterator<Item = B>) -> Result<Vec<EncodedEntity>>
    where
        B: Borrow<Symbol>,
    {
        symbols
            .into_iter()
            .map(|s| {
                self.symbols
                    .get(s.borrow())
                    .copied()
                    .ok_or(Error::InvalidSequence)
            })
            .collect()
    }

    /// Like [`CodeTable::codes`], followed by the terminator code.
    pub fn codes_terminated<B>(
        &self,
        symbols: impl IntoIterator<Item = B>,
    ) -> Result<Vec<EncodedEntity>>
    where
        B: Borrow<Symbol>,
    {
        let terminator = self.terminator.ok_or(Error::InvalidTree)?;
        let mut codes = self.codes(symbols)?;
        codes.push(terminator);
        Ok(codes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frequency::frequencies;
    use crate::tree::build_tree;

    fn table_for(s: &str) -> CodeTable<u8> {
        let tree = build_tree(frequencies(s.bytes())).unwrap();
        CodeTable::from_tree(Some(&tree)).unwrap()
    }

    fn code(s: &str) -> EncodedEntity {
        s.parse().unwrap()
    }

    #[test]
    fn bits_are_root_first() {
        let c = EncodedEntity::new(3, 0b110).unwrap();
        assert_eq!(c.bits().collect::<Vec<_>>(), vec![false, true, true]);
        assert_eq!(c.bits().len(), 3);
        assert_eq!(c.to_string(), "011");
    }

    #[test]
    fn new_masks_high_bits() {
        let c = EncodedEntity::new(2, 0b1111).unwrap();
        assert_eq!(c.pattern(), 0b11);
        assert!(EncodedEntity::new(65, 0).is_err());
    }

    #[test]
    fn full_width_code() {
        let c = EncodedEntity::new(MAX_CODE_LEN, u64::MAX).unwrap();
        assert_eq!(c.bits().len(), 64);
        assert!(c.bits().all(|b| b));
        assert!(c.is_prefix_of(&c));
        assert_eq!(c.branch(false), Err(Error::CodeTooLong { depth: 65 }));

        let mut bits = c.bits();
        bits.nth(62);
        assert_eq!(bits.size_hint(), (1, Some(1)));
    }

    #[test]
    fn parse_and_display_agree() {
        for s in ["", "0", "1", "0110", "1110001"] {
            assert_eq!(code(s).to_string(), s);
        }
        assert_eq!(code("01").pattern(), 0b10);
        assert!(matches!(
            "012".parse::<EncodedEntity>(),
            Err(Error::InvalidCode(_))
        ));
        assert_eq!(
            "1".repeat(65).parse::<EncodedEntity>(),
            Err(Error::CodeTooLong { depth: 65 })
        );
    }

    #[test]
    fn prefix_check() {
        assert!(code("01").is_prefix_of(&code("011")));
        assert!(code("").is_prefix_of(&code("1")));
        assert!(!code("01").is_prefix_of(&code("001")));
        assert!(!code("011").is_prefix_of(&code("01")));
    }

    #[test]
    fn known_codes() {
        // a: 2, b: 1, terminator: 1
        let t = table_for("aab");
        assert_eq!(t.code_for(&b'a'), Ok(code("0")));
        assert_eq!(t.code_for(&b'b'), Ok(code("10")));
        assert_eq!(t.terminator(), Some(code("11")));
        assert_eq!(t.get(&Value::Terminator), Some(&code("11")));
        assert_eq!(t.code_for(&b'z'), Err(Error::MissingValue));
        assert_eq!(t.max_len(), 2);
    }

    #[test]
    fn empty_tree_is_rejected() {
        assert_eq!(CodeTable::<u8>::from_tree(None), Err(Error::TreeIsEmpty));
    }

    #[test]
    fn duplicate_leaves_are_rejected() {
        let tree = Node::from_children(
            Node::new(Value::Symbol(1u8), 1),
            Node::new(Value::Symbol(1), 1),
        );
        assert_eq!(tree.code_table(), Err(Error::InvalidTree));
    }

    #[test]
    fn from_codes_rejects_duplicates() {
        let twice = [
            (Value::Terminator, code("0")),
            (Value::Terminator, code("1")),
        ];
        assert_eq!(CodeTable::<u8>::from_codes(twice), Err(Error::InvalidTree));

        let t = CodeTable::from_codes([(Value::Symbol(b'x'), code("1"))]).unwrap();
        assert_eq!(t.code_for(&b'x'), Ok(code("1")));
        assert_eq!(t.terminator(), None);
    }

    #[test]
    fn lone_terminator_has_empty_code() {
        let t = table_for("");
        assert_eq!(t.len(), 1);
        assert_eq!(t.terminator(), Some(EncodedEntity::default()));
    }

    #[test]
    fn terminator_always_present() {
        for s in ["", "a", "aa", "ggggggg", "hello world"] {
            let t = table_for(s);
            let terminators = t.iter().filter(|(v, _)| v.is_terminator()).count();
            assert_eq!(terminators, 1);
        }
    }

    #[test]
    fn codes_are_prefix_free() {
        let t = table_for("the quick brown fox jumps over the lazy dog, again and again");
        let codes: Vec<_> = t.iter().map(|(_, c)| c).collect();

        for (i, a) in codes.iter().enumerate() {
            for (j, b) in codes.iter().enumerate() {
                if i != j {
                    assert!(!a.is_prefix_of(b), "{} is a prefix of {}", a, b);
                }
            }
        }
    }

    #[test]
    fn codes_lookup() {
        let t = table_for("aab");
        assert_eq!(t.codes(b"ba".iter()), Ok(vec![code("10"), code("0")]));
        assert_eq!(
            t.codes_terminated("a".bytes()),
            Ok(vec![code("0"), code("11")])
        );
        assert_eq!(t.codes("abc".bytes()), Err(Error::InvalidSequence));
    }

    #[test]
    fn missing_terminator_is_invalid_tree() {
        let tree = Node::from_children(
            Node::new(Value::Symbol(1u8), 1),
            Node::new(Value::Symbol(2), 1),
        );
        let t = tree.code_table().unwrap();
        assert_eq!(t.codes_terminated([1u8]), Err(Error::InvalidTree));
    }
}
