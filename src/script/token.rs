//! Tokenizer for the tree shorthand.
//!
//! ```text
//! /src/ < index.html & [ /css/ < style.css ] ; /docs/readme.md
//! ```
//!
//! The tokenizer never fails: whitespace between tokens is skipped and runs that end up
//! empty (a lone `/`, `//`) are dropped.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `[`
    LBrack,
    /// `]`
    RBrack,
    /// `<`
    Lt,
    /// `&`
    Amp,
    /// `;`
    Semi,
    /// `/`-prefixed run split on `/`. `parts` is never empty.
    Path {
        parts: Vec<String>,
        last_is_file: bool,
    },
    /// Bare name not starting with `/`. Never empty.
    File(String),
}

impl Token {
    /// `<` and `&` chain the next statement to the current path context.
    pub fn is_connector(&self) -> bool {
        matches!(self, Token::Lt | Token::Amp)
    }

    /// Tokens that trigger the sibling reset when a branch anchor is pending.
    pub fn opens_statement(&self) -> bool {
        matches!(self, Token::Path { .. } | Token::File(_) | Token::LBrack)
    }
}

impl fmt::Display for Token {
    /// Writes the token back in shorthand form.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::LBrack => f.write_str("["),
            Token::RBrack => f.write_str("]"),
            Token::Lt => f.write_str("<"),
            Token::Amp => f.write_str("&"),
            Token::Semi => f.write_str(";"),
            Token::Path {
                parts,
                last_is_file,
            } => {
                write!(f, "/{}", parts.join("/"))?;
                if !last_is_file {
                    f.write_str("/")?;
                }
                Ok(())
            }
            Token::File(name) => f.write_str(name),
        }
    }
}

/// Unicode whitespace plus the byte-order mark.
fn is_space(c: char) -> bool {
    c.is_whitespace() || c == '\u{feff}'
}

/// Characters that end a path or name run besides whitespace.
fn is_delimiter(c: char) -> bool {
    is_space(c) || matches!(c, '&' | '<' | ';' | '[' | ']')
}

/// A `/` always starts a new path token, so it ends a bare name too.
fn ends_name(c: char) -> bool {
    is_delimiter(c) || c == '/'
}

pub fn tokenize(src: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = src.chars().collect();
    let mut pos = 0usize;

    while pos < chars.len() {
        let c = chars[pos];

        if is_space(c) {
            pos += 1;
            continue;
        }

        let marker = match c {
            '[' => Some(Token::LBrack),
            ']' => Some(Token::RBrack),
            '<' => Some(Token::Lt),
            '&' => Some(Token::Amp),
            ';' => Some(Token::Semi),
            _ => None,
        };
        if let Some(token) = marker {
            tokens.push(token);
            pos += 1;
            continue;
        }

        if c == '/' {
            pos += 1;
            let start = pos;
            while pos < chars.len() && !is_delimiter(chars[pos]) {
                pos += 1;
            }
            let run: String = chars[start..pos].iter().collect();
            let parts: Vec<String> = run
                .split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .collect();
            if let Some(last) = parts.last() {
                let last_is_file = last.contains('.');
                tokens.push(Token::Path {
                    parts,
                    last_is_file,
                });
            }
            continue;
        }

        let start = pos;
        while pos < chars.len() && !ends_name(chars[pos]) {
            pos += 1;
        }
        tokens.push(Token::File(chars[start..pos].iter().collect()));
    }

    tokens
}
