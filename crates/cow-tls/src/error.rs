use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TlsError {
    #[error(transparent)]
    Core(#[from] hostio::CoreError),
}

impl TlsError {
    pub fn to_code(self) -> i32 {
        match self {
            TlsError::Core(e) => e.to_code(),
        }
    }
}
