use crate::error::{Error, Result};
use crate::frequency::{Frequency, Value};
use crate::table::{Bits, CodeTable};
use derivative::Derivative;
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::hash::Hash;

/// A node of a Huffman tree.
///
/// Nodes own their children; there is no parent link. `depth` is the
/// height of the subtree (leaves are 1) and is informational only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Node<Symbol> {
    Leaf {
        priority: usize,
        depth: usize,
        value: Value<Symbol>,
    },
    Internal {
        priority: usize,
        depth: usize,
        left: Box<Node<Symbol>>,
        right: Box<Node<Symbol>>,
    },
}

impl<Symbol> Node<Symbol> {
    pub fn new(value: Value<Symbol>, priority: usize) -> Self {
        Node::Leaf {
            priority,
            depth: 1,
            value,
        }
    }

    pub fn from_children(left: Node<Symbol>, right: Node<Symbol>) -> Self {
        Node::Internal {
            priority: left.priority() + right.priority(),
            depth: left.depth().max(right.depth()) + 1,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn priority(&self) -> usize {
        match self {
            Node::Leaf { priority, .. } | Node::Internal { priority, .. } => *priority,
        }
    }

    pub fn depth(&self) -> usize {
        match self {
            Node::Leaf { depth, .. } | Node::Internal { depth, .. } => *depth,
        }
    }

    /// The leaf value, `None` for internal nodes.
    pub fn value(&self) -> Option<&Value<Symbol>> {
        match self {
            Node::Leaf { value, .. } => Some(value),
            Node::Internal { .. } => None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }

    pub fn left(&self) -> Option<&Node<Symbol>> {
        match self {
            Node::Internal { left, .. } => Some(left),
            Node::Leaf { .. } => None,
        }
    }

    pub fn right(&self) -> Option<&Node<Symbol>> {
        match self {
            Node::Internal { right, .. } => Some(right),
            Node::Leaf { .. } => None,
        }
    }

    /// The child reached by one bit: `false` goes left, `true` right.
    pub fn child(&self, bit: bool) -> Result<&Node<Symbol>> {
        let next = if bit { self.right() } else { self.left() };
        next.ok_or(Error::InvalidNode)
    }

    /// Leaf values from left to right.
    pub fn leaves(&self) -> Leaves<'_, Symbol> {
        Leaves { stack: vec![self] }
    }

    pub fn code_table(&self) -> Result<CodeTable<Symbol>>
    where
        Symbol: Eq + Hash + Clone,
    {
        CodeTable::from_tree(Some(self))
    }

    /// Rebuilds a decoding tree from a code table.
    ///
    /// The table carries no frequencies, so every node of the result has
    /// priority 0. Codes that collide or leave a branch unused fail with
    /// [`Error::InvalidTree`].
    pub fn from_code_table(table: &CodeTable<Symbol>) -> Result<Self>
    where
        Symbol: Eq + Hash + Clone,
    {
        if table.is_empty() {
            return Err(Error::TreeIsEmpty);
        }

        let mut root = Slot::Vacant;
        for (value, code) in table.iter() {
            let value = match value {
                Value::Symbol(s) => Value::Symbol(s.clone()),
                Value::Terminator => Value::Terminator,
            };
            root.insert(code.bits(), value)?;
        }

        root.into_node()
    }
}

/// Partially built tree used while replaying codes from a table.
enum Slot<Symbol> {
    Vacant,
    Leaf(Value<Symbol>),
    Branch(Box<Slot<Symbol>>, Box<Slot<Symbol>>),
}

impl<Symbol> Slot<Symbol> {
    fn insert(&mut self, mut path: Bits, value: Value<Symbol>) -> Result<()> {
        let bit = match path.next() {
            Some(bit) => bit,
            None => {
                return match *self {
                    Slot::Vacant => {
                        *self = Slot::Leaf(value);
                        Ok(())
                    }
                    // another code ends here or passes through
                    _ => Err(Error::InvalidTree),
                };
            }
        };

        if let Slot::Vacant = *self {
            *self = Slot::Branch(Box::new(Slot::Vacant), Box::new(Slot::Vacant));
        }

        match self {
            Slot::Branch(left, right) => {
                let next = if bit { right } else { left };
                next.insert(path, value)
            }
            _ => Err(Error::InvalidTree),
        }
    }

    fn into_node(self) -> Result<Node<Symbol>> {
        match self {
            Slot::Vacant => Err(Error::InvalidTree),
            Slot::Leaf(value) => Ok(Node::new(value, 0)),
            Slot::Branch(left, right) => {
                Ok(Node::from_children(left.into_node()?, right.into_node()?))
            }
        }
    }
}

/// Iterator over the leaf values of a tree, see [`Node::leaves`].
#[derive(Debug, Clone)]
pub struct Leaves<'a, Symbol> {
    stack: Vec<&'a Node<Symbol>>,
}

impl<'a, Symbol> Iterator for Leaves<'a, Symbol> {
    type Item = &'a Value<Symbol>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            match node {
                Node::Leaf { value, .. } => return Some(value),
                Node::Internal { left, right, .. } => {
                    self.stack.push(right);
                    self.stack.push(left);
                }
            }
        }

        None
    }
}

/// Working-set entry. Ordered by priority, then by the order entries joined
/// the set, so equal priorities are merged oldest first.
#[derive(Derivative)]
#[derivative(
    PartialEq(bound = ""),
    Eq(bound = ""),
    PartialOrd(bound = ""),
    Ord(bound = "")
)]
struct Pending<Symbol> {
    priority: usize,
    seq: usize,

    #[derivative(PartialEq = "ignore")]
    #[derivative(PartialOrd = "ignore")]
    #[derivative(Ord = "ignore")]
    node: Node<Symbol>,
}

impl<Symbol> Pending<Symbol> {
    fn new(node: Node<Symbol>, seq: usize) -> Self {
        Self {
            priority: node.priority(),
            seq,
            node,
        }
    }
}

/// Builds a Huffman tree by repeatedly merging the two lowest-priority
/// nodes. The first one popped becomes the left child.
///
/// Returns `None` for an empty frequency list. A single entry yields a
/// root that is itself a leaf.
pub fn build_tree<Symbol>(
    frequencies: impl IntoIterator<Item = Frequency<Symbol>>,
) -> Option<Node<Symbol>> {
    let mut pq: BinaryHeap<_> = frequencies
        .into_iter()
        .enumerate()
        .map(|(seq, f)| Reverse(Pending::new(Node::new(f.value, f.count), seq)))
        .collect();

    let leaves = pq.len();
    let mut seq = leaves;

    loop {
        let Reverse(left) = pq.pop()?;
        let Some(Reverse(right)) = pq.pop() else {
            debug!(
                "tree built: {} leaves, root priority {}, height {}",
                leaves,
                left.node.priority(),
                left.node.depth()
            );
            return Some(left.node);
        };

        trace!("merging priorities {} and {}", left.priority, right.priority);
        pq.push(Reverse(Pending::new(
            Node::from_children(left.node, right.node),
            seq,
        )));
        seq += 1;
    }
}
