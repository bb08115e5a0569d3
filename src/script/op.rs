use std::fmt;

use serde::Serialize;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OpKind {
    Mkdir,
    Write,
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpKind::Mkdir => f.write_str("mkdir"),
            OpKind::Write => f.write_str("write"),
        }
    }
}

/// One filesystem instruction produced by the compiler.
///
/// `rel_path` is a `/`-joined sequence of non-empty segments relative to the run's root.
/// Lists of operations are ordered: a `write` never precedes the `mkdir`s of ancestors the
/// compiler itself creates. The apply layer treats `mkdir` as idempotent and `write` as
/// create-if-absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Operation {
    #[serde(rename = "op")]
    pub kind: OpKind,
    #[serde(rename = "relPath")]
    pub rel_path: String,
}

impl Operation {
    pub fn mkdir(rel_path: impl Into<String>) -> Self {
        Self {
            kind: OpKind::Mkdir,
            rel_path: rel_path.into(),
        }
    }

    pub fn write(rel_path: impl Into<String>) -> Self {
        Self {
            kind: OpKind::Write,
            rel_path: rel_path.into(),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.rel_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Operation::mkdir("a/b").to_string(), "mkdir a/b");
        assert_eq!(Operation::write("a/b/c.txt").to_string(), "write a/b/c.txt");
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(Operation::write("src/main.rs")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "op": "write", "relPath": "src/main.rs" })
        );
    }
}
