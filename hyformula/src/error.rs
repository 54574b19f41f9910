use strum::EnumIs;
use thiserror::Error;

/// Errors raised while building formula values or loading registry configuration.
///
/// Validation errors are always the consequence of malformed input; retrying the same
/// construction yields the same error. Messages carry the offending values verbatim.
#[derive(Debug, Error, EnumIs)]
pub enum FormulaError {
    /// A collection that must contain at least one element was empty.
    #[error("A `{collection}` must contain at least one element, but an empty input was provided.")]
    EmptyCollection { collection: &'static str },

    /// The first element of a bounded sequence is not `0`.
    #[error(
        "The first element of a bounded sequence must be `0`, found `{found}` in sequence {sequence:?}."
    )]
    FirstElementNotZero { found: usize, sequence: Vec<usize> },

    /// An element of a bounded sequence grows by more than one above the running maximum.
    #[error(
        "Element `{value}` at index {index} exceeds the growth bound `{bound}` (1 + maximum of the preceding elements) in sequence {sequence:?}."
    )]
    GrowthViolation {
        index: usize,
        value: usize,
        bound: usize,
        sequence: Vec<usize>,
    },

    /// The number of connectors does not match the number of distinct pointers of the structure.
    #[error(
        "A formula requires exactly one connector per distinct pointer: {connectors} connector(s) were provided but structure `{structure}` uses {pointers} distinct pointer(s)."
    )]
    ArityMismatch {
        connectors: usize,
        pointers: usize,
        structure: String,
    },

    /// The structure's depth-first pointer sequence is not a bounded sequence.
    #[error(
        "Structure `{structure}` is not canonical: its depth-first pointer sequence {pointer_sequence:?} does not start at `0` or skips ahead of the running maximum."
    )]
    NonCanonicalStructure {
        structure: String,
        pointer_sequence: Vec<usize>,
    },

    /// A textual connector identifier could not be parsed as a UUID.
    #[error("Failed to parse connector identifier '{uid}': {source}")]
    InvalidUid { uid: String, source: uuid::Error },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse registry configuration file '{file}': {source}")]
    ConfigParse {
        file: String,
        source: toml::de::Error,
    },

    #[error("Failed to serialize registry configuration: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),
}

pub type FormulaResult<T> = Result<T, FormulaError>;
