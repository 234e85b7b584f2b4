//! Error type for `blockfs`, following the same transparent-wrapper
//! shape as `cow-tls::TlsError` and `uthread::ThreadError`.

use hostio::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FsError {
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl FsError {
    pub fn to_code(&self) -> i32 {
        match self {
            FsError::Core(e) => e.to_code(),
        }
    }
}
