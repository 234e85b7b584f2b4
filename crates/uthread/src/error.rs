use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ThreadError {
    #[error(transparent)]
    Core(#[from] hostio::CoreError),
}

impl ThreadError {
    pub fn to_code(self) -> i32 {
        match self {
            ThreadError::Core(e) => e.to_code(),
        }
    }
}
