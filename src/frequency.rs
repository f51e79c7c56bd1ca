use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::Hash;

/// A leaf value: either a caller symbol or the end-of-stream marker.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Value<Symbol> {
    Symbol(Symbol),
    Terminator,
}

impl<Symbol> Value<Symbol> {
    pub fn symbol(&self) -> Option<&Symbol> {
        match self {
            Value::Symbol(s) => Some(s),
            Value::Terminator => None,
        }
    }

    pub fn is_terminator(&self) -> bool {
        matches!(self, Value::Terminator)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frequency<Symbol> {
    pub count: usize,
    pub value: Value<Symbol>,
}

impl<Symbol> Frequency<Symbol> {
    pub fn new(value: Value<Symbol>, count: usize) -> Self {
        Self { count, value }
    }
}

/// Counts every distinct symbol in `symbols` and appends the terminator
/// with a count of one.
///
/// Entries come out in order of first appearance, terminator last, so the
/// same input always yields the same list (and therefore the same tree).
pub fn frequencies<Symbol>(symbols: impl IntoIterator<Item = Symbol>) -> Vec<Frequency<Symbol>>
where
    Symbol: Eq + Hash + Clone,
{
    let mut index: HashMap<Symbol, usize> = HashMap::new();
    let mut out: Vec<Frequency<Symbol>> = Vec::new();

    for s in symbols {
        match index.get(&s) {
            Some(&i) => out[i].count += 1,
            None => {
                index.insert(s.clone(), out.len());
                out.push(Frequency::new(Value::Symbol(s), 1));
            }
        }
    }

    out.push(Frequency::new(Value::Terminator, 1));
    out
}
