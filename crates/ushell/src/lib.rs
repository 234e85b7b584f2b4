//! A tokenizer, pipeline parser and process-spawning executor for a
//! small interactive shell. Grounded on
//! `examples/original_source/shell/myshell.c` and
//! `myshell_parser.c`.

pub mod error;
pub mod exec;
pub mod parser;
pub mod token;

pub use error::ShellError;
pub use exec::execute;
pub use parser::{parse, Command, Pipeline};
pub use token::{tokenize, Token};
