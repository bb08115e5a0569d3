//! `${name}` placeholder substitution, run on raw script text before compilation.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::error::{Error, Result};

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("placeholder pattern is valid"));

/// Name resolved from the workspace instead of asking the user.
pub const PROJECT_VAR: &str = "project";

/// Source of placeholder values.
pub trait Prompter {
    /// Asks for the value of `${name}`. `None` means the user cancelled.
    fn prompt(&mut self, name: &str) -> Option<String>;
}

/// Distinct placeholder names in order of first appearance.
pub fn placeholders(script: &str) -> Vec<&str> {
    let mut names: Vec<&str> = Vec::new();
    for caps in PLACEHOLDER.captures_iter(script) {
        if let Some(name) = caps.get(1).map(|m| m.as_str()) {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    names
}

/// Resolves every placeholder once and returns the substituted text.
///
/// `${project}` takes `workspace_name` when there is one. Any cancelled prompt cancels
/// the whole substitution with [`Error::SubstitutionCancelled`].
pub fn substitute<P: Prompter + ?Sized>(
    script: &str,
    workspace_name: Option<&str>,
    prompter: &mut P,
) -> Result<String> {
    let names = placeholders(script);
    if names.is_empty() {
        return Ok(script.to_string());
    }

    let mut values: HashMap<&str, String> = HashMap::new();
    for name in names {
        let value = match (name, workspace_name) {
            (PROJECT_VAR, Some(workspace)) => workspace.to_string(),
            _ => prompter
                .prompt(name)
                .ok_or(Error::SubstitutionCancelled)?,
        };
        values.insert(name, value);
    }

    Ok(PLACEHOLDER
        .replace_all(script, |caps: &Captures| {
            values.get(&caps[1]).cloned().unwrap_or_default()
        })
        .into_owned())
}
