//! Compiler from tree shorthand to an ordered list of filesystem operations.
//!
//! ```text
//! text ──tokenize──▶ tokens ──State::step (fold)──▶ operations
//!                          └─ [ ... ] groups recurse with a root prefix
//! ```
//!
//! Compilation is pure: it performs no I/O and keeps no state between calls.

mod machine;
mod op;
mod token;

pub use machine::{Item, State, compile, compile_tokens, items};
pub use op::{OpKind, Operation};
pub use token::{Token, tokenize};
