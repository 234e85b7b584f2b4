use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SyncError {
    #[error(transparent)]
    Core(#[from] hostio::CoreError),
    /// Destroying a mutex that is uninitialized or currently held. §3/§4.5
    /// of the design document resolve the source's ambiguity here in
    /// favor of a checked error rather than silently corrupting the
    /// other holder's state.
    #[error("mutex is uninitialized or currently held")]
    InvalidState,
}

impl SyncError {
    pub fn to_code(self) -> i32 {
        match self {
            SyncError::Core(e) => e.to_code(),
            SyncError::InvalidState => -6,
        }
    }
}
