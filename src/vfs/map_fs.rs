//! This module provides an in-memory storage backend. It is what the compiler tests and dry runs
//! apply operation lists to.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::anyhow;

use crate::core::{FsBackend, Result, utils};
use crate::vfs::{Entry, EntryType};

/// A storage backend that keeps file and directory entries in memory.
///
/// ### Internal state
///
/// * `root`: always `/`.
/// * `entries`: Key: inner absolute normalized path. Value: `Entry` (type and, for files, content).
///   A `BTreeMap` gives deterministic, hierarchy-ordered iteration for `tree()`.
///
/// ### Invariants
///
/// 1. **Root existence**: `/` is always present in `entries` and has type `Directory`.
/// 2. **Path normalization**: All keys are normalized (no `..`, no `//`, no trailing `/`).
/// 3. **Parent consistency**: For any entry at `/a/b/c` there is a `Directory` entry `/a/b`.
///
/// ### Example
///
/// ```
/// use batch_kit::{FsBackend, MapFS};
///
/// let mut fs = MapFS::new();
/// fs.mkdir("/docs").unwrap();
/// fs.mkfile("/docs/note.txt", Some(b"Hello")).unwrap();
/// assert!(fs.exists("/docs/note.txt"));
/// ```
pub struct MapFS {
    root: PathBuf,
    entries: BTreeMap<PathBuf, Entry>,
}

impl MapFS {
    /// Creates an empty MapFS containing only `/`.
    pub fn new() -> Self {
        let inner_root = PathBuf::from("/");
        let mut entries = BTreeMap::new();
        entries.insert(inner_root.clone(), Entry::new(EntryType::Directory));

        Self {
            root: inner_root,
            entries,
        }
    }

    /// Number of entries, root included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.len() == 1
    }

    fn to_inner<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        utils::normalize(self.root.join(path))
    }
}

impl Default for MapFS {
    fn default() -> Self {
        Self::new()
    }
}

impl FsBackend for MapFS {
    fn root(&self) -> &Path {
        self.root.as_path()
    }

    fn exists<P: AsRef<Path>>(&self, path: P) -> bool {
        let inner = self.to_inner(path);
        self.entries.contains_key(&inner)
    }

    fn is_dir<P: AsRef<Path>>(&self, path: P) -> Result<bool> {
        let path = path.as_ref();
        let inner = self.to_inner(path);
        match self.entries.get(&inner) {
            Some(entry) => Ok(entry.is_dir()),
            None => Err(anyhow!("{} does not exist", path.display())),
        }
    }

    fn is_file<P: AsRef<Path>>(&self, path: P) -> Result<bool> {
        let path = path.as_ref();
        let inner = self.to_inner(path);
        match self.entries.get(&inner) {
            Some(entry) => Ok(entry.is_file()),
            None => Err(anyhow!("{} does not exist", path.display())),
        }
    }

    /// Yields every entry strictly below `path`. A file yields itself.
    fn tree<P: AsRef<Path>>(&self, path: P) -> Result<impl Iterator<Item = PathBuf>> {
        let inner_path = self.to_inner(path);
        let is_file = self.is_file(&inner_path)?;
        Ok(self
            .entries
            .keys()
            .filter(move |&path| path.starts_with(&inner_path) && (*path != inner_path || is_file))
            .cloned())
    }

    /// Creates directory and all its parents (if needed).
    /// Fails when some segment of `path` is an existing file.
    fn mkdir<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        if path.as_ref().as_os_str().is_empty() {
            return Err(anyhow!("invalid path: empty"));
        }

        let inner_path = self.to_inner(path);

        let mut built = PathBuf::new();
        for component in inner_path.components() {
            built.push(component);
            match self.entries.get(&built) {
                Some(entry) if entry.is_dir() => {}
                Some(_) => {
                    return Err(anyhow!(
                        "path '{}' exists but is not a directory",
                        built.display()
                    ));
                }
                None => {
                    self.entries
                        .insert(built.clone(), Entry::new(EntryType::Directory));
                }
            }
        }

        Ok(())
    }

    /// Creates a file, replacing the content of an existing one.
    /// If the parent directory does not exist, it will be created.
    fn mkfile<P: AsRef<Path>>(&mut self, file_path: P, content: Option<&[u8]>) -> Result<()> {
        let file_path = self.to_inner(file_path);
        if file_path == self.root {
            return Err(anyhow!("invalid path: the root is a directory"));
        }
        if matches!(self.entries.get(&file_path), Some(entry) if entry.is_dir()) {
            return Err(anyhow!("{} is a directory", file_path.display()));
        }
        if let Some(parent) = file_path.parent() {
            self.mkdir(parent)?;
        }

        let mut entry = Entry::new(EntryType::File);
        if let Some(content) = content {
            entry.set_content(content);
        }
        self.entries.insert(file_path, entry);

        Ok(())
    }

    /// Reads the entire contents of a file. Empty files yield an empty vector.
    fn read<P: AsRef<Path>>(&self, path: P) -> Result<Vec<u8>> {
        let path = path.as_ref();
        if self.is_dir(path)? {
            // checks for existent too
            return Err(anyhow!("{} is a directory", path.display()));
        }
        let inner = self.to_inner(path);
        Ok(self.entries[&inner].content().cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod creations {
        use super::*;

        #[test]
        fn test_new_map_fs() {
            let fs = MapFS::new();
            assert_eq!(fs.root(), Path::new("/"));
            assert!(fs.exists("/"));
            assert!(fs.is_empty());
            assert_eq!(fs.len(), 1);
        }
    }

    mod mkdir {
        use super::*;

        #[test]
        fn test_mkdir_nested_path() -> Result<()> {
            let mut fs = MapFS::new();
            fs.mkdir("/a/b/c")?;
            assert!(fs.is_dir("/a")?);
            assert!(fs.is_dir("/a/b")?);
            assert!(fs.is_dir("/a/b/c")?);
            Ok(())
        }

        #[test]
        fn test_mkdir_is_idempotent() -> Result<()> {
            let mut fs = MapFS::new();
            fs.mkdir("/data")?;
            fs.mkdir("/data")?;
            fs.mkdir("data/")?;
            assert_eq!(fs.len(), 2);
            Ok(())
        }

        #[test]
        fn test_mkdir_through_file_fails() -> Result<()> {
            let mut fs = MapFS::new();
            fs.mkfile("/notes", None)?;
            let result = fs.mkdir("/notes/sub");
            assert!(result.is_err());
            assert!(!fs.exists("/notes/sub"));
            Ok(())
        }

        #[test]
        fn test_mkdir_empty_path() {
            let mut fs = MapFS::new();
            assert!(fs.mkdir("").is_err());
        }

        #[test]
        fn test_mkdir_parent_dir_cannot_escape_root() -> Result<()> {
            let mut fs = MapFS::new();
            fs.mkdir("../../outside")?;
            assert!(fs.is_dir("/outside")?);
            Ok(())
        }
    }

    mod mkfile {
        use super::*;

        #[test]
        fn test_mkfile_creates_parents() -> Result<()> {
            let mut fs = MapFS::new();
            fs.mkfile("/src/css/style.css", Some(b"body {}"))?;
            assert!(fs.is_dir("/src")?);
            assert!(fs.is_dir("/src/css")?);
            assert!(fs.is_file("/src/css/style.css")?);
            assert_eq!(fs.read("/src/css/style.css")?, b"body {}");
            Ok(())
        }

        #[test]
        fn test_mkfile_replaces_content() -> Result<()> {
            let mut fs = MapFS::new();
            fs.mkfile("a.txt", Some(b"one"))?;
            fs.mkfile("a.txt", Some(b"two"))?;
            assert_eq!(fs.read("/a.txt")?, b"two");
            Ok(())
        }

        #[test]
        fn test_mkfile_over_directory_fails() -> Result<()> {
            let mut fs = MapFS::new();
            fs.mkdir("/dir")?;
            assert!(fs.mkfile("/dir", None).is_err());
            assert!(fs.mkfile("/", None).is_err());
            Ok(())
        }

        #[test]
        fn test_read_empty_and_missing() -> Result<()> {
            let mut fs = MapFS::new();
            fs.mkfile("/empty.txt", None)?;
            assert!(fs.read("/empty.txt")?.is_empty());
            assert!(fs.read("/missing.txt").is_err());
            assert!(fs.read("/").is_err());
            Ok(())
        }
    }

    mod tree {
        use super::*;

        #[test]
        fn test_tree_nested_structure() -> Result<()> {
            let mut fs = MapFS::new();
            fs.mkfile("/project/main.rs", Some(b"fn main() {}"))?;
            fs.mkfile("/project/src/lib.rs", Some(b"mod utils;"))?;
            fs.mkdir("/other")?;

            let all: Vec<_> = fs.tree("/")?.collect();
            assert_eq!(
                all,
                vec![
                    PathBuf::from("/other"),
                    PathBuf::from("/project"),
                    PathBuf::from("/project/main.rs"),
                    PathBuf::from("/project/src"),
                    PathBuf::from("/project/src/lib.rs"),
                ]
            );

            let project: Vec<_> = fs.tree("/project/src")?.collect();
            assert_eq!(project, vec![PathBuf::from("/project/src/lib.rs")]);
            Ok(())
        }

        #[test]
        fn test_tree_nonexistent_path_error() {
            let fs = MapFS::new();
            assert!(fs.tree("/nope").is_err());
        }
    }
}
