//! Saved scripts: named shorthand texts kept across sessions.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Key-value store of raw script texts.
pub trait ScriptStore {
    fn load(&self) -> Result<BTreeMap<String, String>>;

    /// Saves `script` under `name`, replacing an existing entry.
    fn save(&mut self, name: &str, script: &str) -> Result<()>;

    fn get(&self, name: &str) -> Result<Option<String>> {
        Ok(self.load()?.remove(name))
    }

    fn names(&self) -> Result<Vec<String>> {
        Ok(self.load()?.into_keys().collect())
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    scripts: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScriptStore for MemoryStore {
    fn load(&self) -> Result<BTreeMap<String, String>> {
        Ok(self.scripts.clone())
    }

    fn save(&mut self, name: &str, script: &str) -> Result<()> {
        self.scripts.insert(name.to_string(), script.to_string());
        Ok(())
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(rename = "batchScripts_v1", default)]
    scripts: BTreeMap<String, String>,
}

/// Store persisted as a JSON file. A missing file is an empty store.
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_file(&self) -> Result<StoreFile> {
        if !self.path.exists() {
            return Ok(StoreFile::default());
        }
        let text = std::fs::read_to_string(&self.path)?;
        serde_json::from_str(&text).map_err(|source| Error::Store {
            path: self.path.clone(),
            source,
        })
    }
}

impl ScriptStore for JsonStore {
    fn load(&self) -> Result<BTreeMap<String, String>> {
        Ok(self.read_file()?.scripts)
    }

    fn save(&mut self, name: &str, script: &str) -> Result<()> {
        let mut file = self.read_file()?;
        file.scripts.insert(name.to_string(), script.to_string());

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(&file).map_err(|source| Error::Store {
            path: self.path.clone(),
            source,
        })?;
        std::fs::write(&self.path, text)?;
        tracing::debug!(name, path = %self.path.display(), "saved script");
        Ok(())
    }
}
