use thiserror::Error;

/// Shared error surface for every lab crate built on top of `hostio`.
///
/// Mirrors the five kinds catalogued in the design: callers get a real
/// `Result`, while `to_code` reconstructs the historical small-integer
/// ABI for anything that wants to embed this as if it were the original
/// C library.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid argument")]
    InvalidArg,
    #[error("no such entry for the current identity")]
    NotFound,
    #[error("an entry already exists for the current identity")]
    Exists,
    #[error("table is full")]
    Exhausted,
    #[error("unrecoverable host failure")]
    Fatal,
}

impl CoreError {
    /// The original library's `-1`-style return convention, preserved for
    /// FFI-shaped embedding. Distinct kinds map to distinct negative codes
    /// so a caller that only has an `i32` can still branch on them.
    pub fn to_code(self) -> i32 {
        match self {
            CoreError::InvalidArg => -1,
            CoreError::NotFound => -2,
            CoreError::Exists => -3,
            CoreError::Exhausted => -4,
            CoreError::Fatal => -5,
        }
    }
}
