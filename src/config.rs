//! Optional `batch-kit.toml` configuration.
//!
//! ```toml
//! store = "/home/me/.batch-kit/scripts.json"
//!
//! [templates]
//! ".md" = "# ${name}\n"
//! rs = "// ${name}\n"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::content::ContentProvider;
use crate::error::{Error, Result};

/// File looked up in the run root when no explicit config is given.
pub const CONFIG_FILE: &str = "batch-kit.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Extension → template text. `${name}` expands to the file's base name.
    pub templates: BTreeMap<String, String>,
    /// Location of the saved-script JSON file.
    pub store: Option<PathBuf>,
}

impl Config {
    pub fn from_toml(text: &str, origin: &Path) -> Result<Self> {
        toml::from_str(text).map_err(|source| Error::Config {
            path: origin.to_path_buf(),
            source,
        })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text, path)
    }

    /// Loads `explicit` if given, else `<root>/batch-kit.toml` if present, else defaults.
    pub fn discover(explicit: Option<&Path>, root: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let candidate = root.join(CONFIG_FILE);
        if candidate.is_file() {
            tracing::debug!(path = %candidate.display(), "using config");
            return Self::load(candidate);
        }
        Ok(Self::default())
    }

    pub fn content_provider(&self) -> ContentProvider {
        ContentProvider::new(&self.templates)
    }

    /// Configured store path, else `$BATCH_KIT_HOME/scripts.json`,
    /// else `$HOME/.batch-kit/scripts.json`, else `.batch-kit/scripts.json`.
    pub fn store_path(&self) -> PathBuf {
        if let Some(path) = &self.store {
            return path.clone();
        }
        if let Some(home) = std::env::var_os("BATCH_KIT_HOME") {
            return PathBuf::from(home).join("scripts.json");
        }
        let base = std::env::var_os("HOME")
            .map(PathBuf::from)
            .unwrap_or_default();
        base.join(".batch-kit").join("scripts.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_parse_full_config() -> Result<()> {
        let config = Config::from_toml(
            "store = \"/tmp/s.json\"\n[templates]\n\".md\" = \"# ${name}\"\nrs = \"//\"\n",
            Path::new("inline"),
        )?;
        assert_eq!(config.store, Some(PathBuf::from("/tmp/s.json")));
        assert_eq!(config.store_path(), PathBuf::from("/tmp/s.json"));

        let provider = config.content_provider();
        assert_eq!(provider.content_for("a/README.md"), b"# README.md");
        assert_eq!(provider.content_for("main.rs"), b"//");
        Ok(())
    }

    #[test]
    fn test_empty_config_is_default() -> Result<()> {
        let config = Config::from_toml("", Path::new("inline"))?;
        assert!(config.templates.is_empty());
        assert!(config.store.is_none());
        Ok(())
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let result = Config::from_toml("colour = 1", Path::new("inline"));
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_discover_from_root() -> Result<()> {
        let temp_dir = TempDir::new("config_test")?;
        assert!(Config::discover(None, temp_dir.path())?.templates.is_empty());

        std::fs::write(
            temp_dir.path().join(CONFIG_FILE),
            "[templates]\ntxt = \"hi\"\n",
        )?;
        let config = Config::discover(None, temp_dir.path())?;
        assert_eq!(config.templates.get("txt").map(String::as_str), Some("hi"));
        Ok(())
    }

    #[test]
    fn test_discover_explicit_missing_file() {
        let result = Config::discover(Some(Path::new("/nonexistent/batch.toml")), Path::new("/"));
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
