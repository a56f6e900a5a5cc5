//! rankr error types

/// rankr result type
pub type Result<T> = std::result::Result<T, Error>;

/// rankr errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed structural input (arity mismatch, mixed column kinds,
    /// out-of-bounds indices)
    #[error("data error: {reason}")]
    DataError {
        /// Description of what went wrong
        reason: String,
    },

    /// An id referenced by the relation table has no entry in its feature
    /// table
    #[error("missing {table} feature entry for id '{id}'")]
    MissingEntity {
        /// Which feature table was probed (`"left"` or `"right"`)
        table: &'static str,
        /// The id that failed to resolve
        id: String,
    },

    /// A label could not be cast to the task's output dtype
    #[error("missing label at relation row {row}: supervised stages require a numeric label")]
    LabelCast {
        /// Relation row position of the offending label
        row: usize,
    },

    /// Invalid argument to an operation
    #[error("invalid argument '{arg}': {reason}")]
    InvalidArgument {
        /// Argument name
        arg: &'static str,
        /// Why it's invalid
        reason: String,
    },

    /// Configuration file loading or parsing error
    #[error("config error: {reason}")]
    ConfigError {
        /// Description of what went wrong
        reason: String,
    },
}
