//! The run flow behind every command: substitute, compile, apply.

use crate::FsBackend;
use crate::apply::{ApplyReport, apply};
use crate::content::ContentProvider;
use crate::error::{Error, Result};
use crate::script::{Operation, compile};
use crate::store::ScriptStore;
use crate::subst::{Prompter, substitute};

/// What the user typed into the create command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation<'a> {
    /// `!name` runs a saved script.
    Saved(&'a str),
    /// Anything else is shorthand.
    Inline(&'a str),
}

impl<'a> Invocation<'a> {
    /// Returns `None` for empty input.
    pub fn parse(input: &'a str) -> Option<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return None;
        }
        match trimmed.strip_prefix('!') {
            Some(name) => Some(Invocation::Saved(name.trim())),
            None => Some(Invocation::Inline(input)),
        }
    }

    /// Raw script text, looked up in `store` for saved scripts.
    pub fn resolve<S: ScriptStore + ?Sized>(&self, store: &S) -> Result<String> {
        match self {
            Invocation::Inline(script) => Ok(script.to_string()),
            Invocation::Saved(name) => store
                .get(name)?
                .ok_or_else(|| Error::UnknownScript(name.to_string())),
        }
    }
}

/// Splits `name @ script` at the first `@`.
pub fn parse_save(input: &str) -> Result<(String, String)> {
    let (name, script) = input.split_once('@').ok_or(Error::InvalidSaveSyntax)?;
    let (name, script) = (name.trim(), script.trim());
    if name.is_empty() || script.is_empty() {
        return Err(Error::MissingNameOrScript);
    }
    Ok((name.to_string(), script.to_string()))
}

/// Substitutes placeholders in `raw` and compiles the result. Touches no storage.
///
/// Cancelling a prompt returns [`Error::SubstitutionCancelled`].
pub fn prepare<P: Prompter + ?Sized>(
    raw: &str,
    workspace_name: Option<&str>,
    prompter: &mut P,
) -> Result<Vec<Operation>> {
    let script = substitute(raw, workspace_name, prompter)?;
    let ops = compile(&script)?;
    tracing::debug!(operations = ops.len(), "compiled script");
    Ok(ops)
}

/// Runs `raw` against `fs`.
///
/// Compilation completes before the first mutation, so a parse error or a cancelled
/// prompt leaves `fs` untouched.
pub fn run_script<B, P>(
    fs: &mut B,
    raw: &str,
    workspace_name: Option<&str>,
    prompter: &mut P,
    provider: &ContentProvider,
) -> Result<ApplyReport>
where
    B: FsBackend,
    P: Prompter + ?Sized,
{
    let ops = prepare(raw, workspace_name, prompter)?;
    apply(fs, &ops, provider)
}
