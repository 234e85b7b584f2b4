//! Builds a [`Pipeline`] out of a token stream. Grounded on
//! `pipeline_build` in `myshell_parser.c`, minus its manual
//! linked-list/malloc bookkeeping: a command's `state` machine (looking
//! for a bare word vs. the argument of a pending `>`/`<`) is preserved
//! exactly, since it's what decides whether a word becomes an argument
//! or a redirect target.

use crate::error::ShellError;
use crate::token::{tokenize, Token};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Command {
    pub args: Vec<String>,
    pub redirect_in: Option<String>,
    pub redirect_out: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pipeline {
    pub commands: Vec<Command>,
    pub background: bool,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Expect {
    Word,
    RedirectOutTarget,
    RedirectInTarget,
}

pub fn parse(line: &str) -> Result<Pipeline, ShellError> {
    let tokens = tokenize(line);
    let first = tokens.first().ok_or(ShellError::Empty)?;
    if let Some(op) = leading_operator_char(first) {
        return Err(ShellError::LeadingOperator(op));
    }

    let mut pipeline = Pipeline::default();
    let mut current = Command::default();
    let mut expect = Expect::Word;

    for token in tokens {
        match token {
            Token::Pipe => {
                if expect != Expect::Word {
                    return Err(ShellError::MisplacedOperator('|'));
                }
                pipeline.commands.push(std::mem::take(&mut current));
                expect = Expect::Word;
            }
            Token::RedirectOut => {
                if expect != Expect::Word {
                    return Err(ShellError::MisplacedOperator('>'));
                }
                expect = Expect::RedirectOutTarget;
            }
            Token::RedirectIn => {
                if expect != Expect::Word {
                    return Err(ShellError::MisplacedOperator('<'));
                }
                expect = Expect::RedirectInTarget;
            }
            Token::Background => {
                if pipeline.background {
                    return Err(ShellError::DuplicateBackground);
                }
                pipeline.background = true;
            }
            Token::Word(word) => match expect {
                Expect::Word => {
                    current.args.push(word);
                }
                Expect::RedirectOutTarget => {
                    if current.redirect_out.is_some() {
                        return Err(ShellError::DuplicateRedirect);
                    }
                    current.redirect_out = Some(word);
                    expect = Expect::Word;
                }
                Expect::RedirectInTarget => {
                    if current.redirect_in.is_some() {
                        return Err(ShellError::DuplicateRedirect);
                    }
                    current.redirect_in = Some(word);
                    expect = Expect::Word;
                }
            },
        }
    }
    pipeline.commands.push(current);
    Ok(pipeline)
}

fn leading_operator_char(token: &Token) -> Option<char> {
    match token {
        Token::Pipe => Some('|'),
        Token::RedirectOut => Some('>'),
        Token::RedirectIn => Some('<'),
        Token::Background => Some('&'),
        Token::Word(_) => None,
    }
}
