//! `batch` command line interface.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use batch_kit::{
    Config, DirFS, Error, Invocation, JsonStore, Prompter, ScriptStore, apply, compile,
    parse_save, prepare,
};

#[derive(Parser, Debug)]
#[command(name = "batch")]
#[command(about = "Create directory/file trees from a compact shorthand")]
#[command(version)]
struct Cli {
    /// Config file (defaults to batch-kit.toml in the root directory)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Saved-script file (overrides the config)
    #[arg(long, global = true, value_name = "FILE")]
    store: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run shorthand, or `!name` to run a saved script
    Create {
        #[arg(value_name = "INPUT")]
        input: String,

        /// Directory the tree is created in
        #[arg(short, long, value_name = "DIR")]
        root: Option<PathBuf>,
    },
    /// Save a script: `name @ script`
    Save {
        #[arg(value_name = "INPUT")]
        input: String,
    },
    /// Run a saved script, asking which one when NAME is omitted
    Template {
        name: Option<String>,

        /// Directory the tree is created in
        #[arg(short, long, value_name = "DIR")]
        root: Option<PathBuf>,
    },
    /// List saved scripts
    List,
    /// Print the operations a script compiles to, without touching the disk
    Compile {
        script: String,

        /// Print operations as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Reads placeholder values from stdin. End of input cancels.
struct StdinPrompter;

impl StdinPrompter {
    fn ask(&mut self, question: &str) -> Option<String> {
        eprint!("{question}");
        std::io::stderr().flush().ok()?;
        let mut line = String::new();
        match std::io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
        }
    }
}

impl Prompter for StdinPrompter {
    fn prompt(&mut self, name: &str) -> Option<String> {
        self.ask(&format!("Value for ${{{name}}}: "))
    }
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        // a cancelled prompt is a notice, not a failure
        if e.downcast_ref::<Error>().is_some_and(Error::is_cancellation) {
            println!("{e}");
            return;
        }
        eprintln!("{e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir().context("cannot read the current directory")?;

    match cli.command {
        Command::Create { input, root } => {
            let root = resolve_root(root, &cwd);
            let config = Config::discover(cli.config.as_deref(), &root)?;
            let store = open_store(cli.store, &config);
            let Some(invocation) = Invocation::parse(&input) else {
                return Ok(());
            };
            let script = invocation.resolve(&store)?;
            execute(&root, &script, &config)
        }
        Command::Save { input } => {
            let config = Config::discover(cli.config.as_deref(), &cwd)?;
            let mut store = open_store(cli.store, &config);
            let (name, script) = parse_save(&input)?;
            store.save(&name, &script)?;
            println!("Saved script: {name}");
            Ok(())
        }
        Command::Template { name, root } => {
            let root = resolve_root(root, &cwd);
            let config = Config::discover(cli.config.as_deref(), &root)?;
            let store = open_store(cli.store, &config);
            let names = store.names()?;
            if names.is_empty() {
                println!("No saved scripts.");
                return Ok(());
            }
            let name = match name {
                Some(name) => name,
                None => match pick(&names) {
                    Some(name) => name,
                    None => return Ok(()),
                },
            };
            let script = Invocation::Saved(&name).resolve(&store)?;
            execute(&root, &script, &config)
        }
        Command::List => {
            let config = Config::discover(cli.config.as_deref(), &cwd)?;
            let store = open_store(cli.store, &config);
            let names = store.names()?;
            if names.is_empty() {
                println!("No saved scripts.");
            }
            for name in names {
                println!("{name}");
            }
            Ok(())
        }
        Command::Compile { script, json } => {
            let ops = compile(&script)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&ops)?);
            } else {
                for op in &ops {
                    println!("{op}");
                }
            }
            Ok(())
        }
    }
}

fn resolve_root(root: Option<PathBuf>, cwd: &Path) -> PathBuf {
    let root = match root {
        Some(root) if root.is_absolute() => root,
        Some(root) => cwd.join(root),
        None => cwd.to_path_buf(),
    };
    batch_kit::utils::normalize(root)
}

fn open_store(explicit: Option<PathBuf>, config: &Config) -> JsonStore {
    let store = JsonStore::new(explicit.unwrap_or_else(|| config.store_path()));
    tracing::debug!(path = %store.path().display(), "script store");
    store
}

fn execute(root: &Path, script: &str, config: &Config) -> anyhow::Result<()> {
    let workspace = root.file_name().map(|n| n.to_string_lossy().into_owned());
    // nothing on disk changes until the script has compiled
    let ops = prepare(script, workspace.as_deref(), &mut StdinPrompter)?;
    let mut fs = DirFS::new(root)?;
    let report = apply(&mut fs, &ops, &config.content_provider())?;
    tracing::info!(?report, root = %root.display(), "run finished");
    println!("Batch execution complete.");
    Ok(())
}

/// Lets the user choose a saved script by number or by name.
fn pick(names: &[String]) -> Option<String> {
    for (i, name) in names.iter().enumerate() {
        eprintln!("{:>3}) {name}", i + 1);
    }
    let answer = StdinPrompter.ask("Pick saved script: ")?;
    let answer = answer.trim();
    if let Ok(n) = answer.parse::<usize>() {
        return names.get(n.checked_sub(1)?).cloned();
    }
    names.iter().find(|name| name.as_str() == answer).cloned()
}
