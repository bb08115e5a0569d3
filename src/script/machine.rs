//! Stack machine that turns tokens into an operation list.
//!
//! The machine keeps a path `stack` (the current directory context), an optional
//! `branch_anchor` and a `last_connector` flag. Each item of the token stream is folded
//! through [`State::step`]:
//!
//! - a pending anchor truncates the stack before an unchained `PATH`, name or `[`
//!   (sibling reset), so `/a/x.txt /b/y.txt` builds two independent trees;
//! - `<` and `&` protect the next token from that reset;
//! - `;` clears everything;
//! - `[ ... ]` is compiled on its own, with the current stack as root prefix.

use crate::error::Error;
use crate::script::op::Operation;
use crate::script::token::{Token, tokenize};

/// Unit of the fold: a single token or a whole bracket group (without its brackets).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Item<'t> {
    Token(&'t Token),
    Group(&'t [Token]),
}

/// Splits a token sequence into items, matching `[` with its `]`.
/// A `]` with no opening bracket is kept as a plain token.
pub fn items(tokens: &[Token]) -> Result<Vec<Item<'_>>, Error> {
    let mut items = Vec::new();
    let mut pos = 0usize;

    while pos < tokens.len() {
        if tokens[pos] != Token::LBrack {
            items.push(Item::Token(&tokens[pos]));
            pos += 1;
            continue;
        }

        let mut depth = 1usize;
        let mut end = pos + 1;
        while end < tokens.len() {
            match tokens[end] {
                Token::LBrack => depth += 1,
                Token::RBrack => depth -= 1,
                _ => {}
            }
            if depth == 0 {
                break;
            }
            end += 1;
        }
        if depth != 0 {
            return Err(Error::UnmatchedGroup);
        }

        items.push(Item::Group(&tokens[pos + 1..end]));
        pos = end + 1;
    }

    Ok(items)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct State {
    pub stack: Vec<String>,
    pub branch_anchor: Option<usize>,
    pub last_connector: bool,
}

impl State {
    /// Consumes one item. `root` is prepended to every emitted path.
    pub fn step(
        mut self,
        item: Item<'_>,
        root: &[String],
    ) -> Result<(State, Vec<Operation>), Error> {
        let opens_statement = match item {
            Item::Token(token) => token.opens_statement(),
            Item::Group(_) => true,
        };
        if opens_statement && !self.last_connector {
            if let Some(anchor) = self.branch_anchor.take() {
                self.stack.truncate(anchor);
            }
        }

        let mut ops = Vec::new();
        match item {
            Item::Token(Token::Path {
                parts,
                last_is_file,
            }) => {
                let prev_len = self.stack.len();
                let (dirs, leaf) = match (*last_is_file, parts.split_last()) {
                    (true, Some((leaf, dirs))) => (dirs, Some(leaf)),
                    _ => (parts.as_slice(), None),
                };
                for dir in dirs {
                    self.stack.push(dir.clone());
                    ops.push(Operation::mkdir(self.join(root, None)));
                }
                if let Some(leaf) = leaf {
                    ops.push(Operation::write(self.join(root, Some(leaf))));
                }
                self.branch_anchor = Some(prev_len);
                self.last_connector = false;
            }
            Item::Token(Token::File(name)) => {
                ops.push(Operation::write(self.join(root, Some(name))));
                self.last_connector = false;
            }
            Item::Token(Token::Semi) => {
                self.stack.clear();
                self.branch_anchor = None;
                self.last_connector = false;
            }
            Item::Group(group) => {
                let mut prefix = root.to_vec();
                prefix.extend(self.stack.iter().cloned());
                ops = compile_rooted(group, &prefix)?;
                self.branch_anchor = None;
                self.last_connector = false;
            }
            Item::Token(token) if token.is_connector() => {
                self.last_connector = true;
            }
            // `[` never reaches here on its own; a stray `]` is ignored.
            Item::Token(_) => {}
        }

        Ok((self, ops))
    }

    fn join(&self, root: &[String], leaf: Option<&String>) -> String {
        root.iter()
            .chain(self.stack.iter())
            .chain(leaf)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// Compiles `tokens` as an independent script whose paths all live under `root`.
fn compile_rooted(tokens: &[Token], root: &[String]) -> Result<Vec<Operation>, Error> {
    let (_, ops) = items(tokens)?.into_iter().try_fold(
        (State::default(), Vec::new()),
        |(state, mut ops), item| {
            let (state, emitted) = state.step(item, root)?;
            ops.extend(emitted);
            Ok::<_, Error>((state, ops))
        },
    )?;
    Ok(ops)
}

pub fn compile_tokens(tokens: &[Token]) -> Result<Vec<Operation>, Error> {
    compile_rooted(tokens, &[])
}

/// Compiles shorthand text into its ordered operation list.
///
/// ```
/// use batch_kit::{Operation, compile};
///
/// let ops = compile("/src/ < [ /css/ < style.css ]").unwrap();
/// assert_eq!(
///     ops,
///     vec![
///         Operation::mkdir("src"),
///         Operation::mkdir("src/css"),
///         Operation::write("src/css/style.css"),
///     ]
/// );
/// ```
pub fn compile(src: &str) -> Result<Vec<Operation>, Error> {
    compile_tokens(&tokenize(src))
}
