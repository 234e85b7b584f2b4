//! Splits a raw command line into words and single-character operators.
//! Grounded on `lex_pipeline` in `myshell_parser.c`: a word is any run
//! of non-whitespace, non-operator characters; `|`, `>`, `<` and `&` are
//! always their own token, even when glued to a word with no space
//! (`echo hi|cat` tokenizes the same as `echo hi | cat`).

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Word(String),
    Pipe,
    RedirectOut,
    RedirectIn,
    Background,
}

const OPERATORS: [(char, fn() -> Token); 4] = [
    ('|', || Token::Pipe),
    ('>', || Token::RedirectOut),
    ('<', || Token::RedirectIn),
    ('&', || Token::Background),
];

pub fn tokenize(line: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut word = String::new();

    let flush = |word: &mut String, tokens: &mut Vec<Token>| {
        if !word.is_empty() {
            tokens.push(Token::Word(std::mem::take(word)));
        }
    };

    for ch in line.chars() {
        if ch.is_whitespace() {
            flush(&mut word, &mut tokens);
        } else if let Some((_, make)) = OPERATORS.iter().find(|(op, _)| *op == ch) {
            flush(&mut word, &mut tokens);
            tokens.push(make());
        } else {
            word.push(ch);
        }
    }
    flush(&mut word, &mut tokens);
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_words_and_operators() {
        let tokens = tokenize("echo hi | tr a-z A-Z > out.txt");
        assert_eq!(
            tokens,
            vec![
                Token::Word("echo".into()),
                Token::Word("hi".into()),
                Token::Pipe,
                Token::Word("tr".into()),
                Token::Word("a-z".into()),
                Token::Word("A-Z".into()),
                Token::RedirectOut,
                Token::Word("out.txt".into()),
            ]
        );
    }

    #[test]
    fn operators_need_no_surrounding_space() {
        let tokens = tokenize("echo hi|cat&");
        assert_eq!(
            tokens,
            vec![
                Token::Word("echo".into()),
                Token::Word("hi".into()),
                Token::Pipe,
                Token::Word("cat".into()),
                Token::Background,
            ]
        );
    }
}
