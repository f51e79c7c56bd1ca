use thiserror::Error;

/// Errors produced while building code tables or running the codec.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// No root was supplied, or a table held no codes at all.
    #[error("tree is empty")]
    TreeIsEmpty,

    /// The tree or table does not describe a complete prefix-free code.
    #[error("invalid tree")]
    InvalidTree,

    /// Decoding tried to step below a leaf.
    #[error("invalid node")]
    InvalidNode,

    /// A symbol to encode has no code in the table.
    #[error("symbol sequence contains a value missing from the code table")]
    InvalidSequence,

    /// A direct table lookup found nothing.
    #[error("missing value")]
    MissingValue,

    #[error("code of {depth} branches does not fit in 64 bits")]
    CodeTooLong { depth: usize },

    #[error("invalid code string {0:?}")]
    InvalidCode(String),
}

pub type Result<T> = std::result::Result<T, Error>;
