//! Error type for `ushell`'s parser and executor.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("empty command line")]
    Empty,
    #[error("a pipeline cannot start with `{0}`")]
    LeadingOperator(char),
    #[error("unexpected `{0}` here")]
    MisplacedOperator(char),
    #[error("redirect already given for this command")]
    DuplicateRedirect,
    #[error("`&` given more than once")]
    DuplicateBackground,
    #[error("could not open `{path}`: {source}")]
    Redirect { path: String, source: std::io::Error },
    #[error("failed to spawn `{command}`: {source}")]
    Spawn { command: String, source: std::io::Error },
    #[error("failed to wait on child process: {0}")]
    Wait(std::io::Error),
}
