//! This module provides a storage backend that maps to a real directory on the host system.
//! Generated trees are materialized below a designated root and never outside of it.
//!
//! ### Key Features:
//! - **Isolated root**: All operations are confined to `self.root`.
//! - **Path normalization**: `.` and `..` are resolved lexically, `..` cannot climb above the root.
//! - **Idempotent directories**: `mkdir()` on an existing directory succeeds.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::anyhow;

use crate::core::{FsBackend, Result, utils};

/// A storage backend rooted at an absolute host directory.
///
/// Unlike `MapFS`, `DirFS` keeps no state besides its root: existence checks always ask the host,
/// so trees created by earlier runs (or by hand) are seen as they are.
///
/// ### Example:
/// ```no_run
/// use batch_kit::{DirFS, FsBackend};
///
/// let root = std::env::temp_dir().join("my_tree");
///
/// let mut fs = DirFS::new(root).unwrap();
/// fs.mkdir("/docs").unwrap();
/// fs.mkfile("/docs/note.txt", Some(b"Hello")).unwrap();
/// assert!(fs.exists("/docs/note.txt"));
/// ```
pub struct DirFS {
    root: PathBuf, // host-related absolute normalized path
}

impl DirFS {
    /// Creates a new DirFS instance with the root directory at `root`.
    /// * `root` is an absolute host path. If it does not exist it is created with its parents.
    /// If `root` is not absolute, is a file, or is not writable, an error returns.
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref();

        if root.as_os_str().is_empty() {
            return Err(anyhow!("invalid root path: empty"));
        }
        if root.is_relative() {
            return Err(anyhow!("the root path must be absolute"));
        }
        if root.exists() && !root.is_dir() {
            return Err(anyhow!("{:?} is not a directory", root));
        }

        let root = utils::normalize(root);

        if !std::fs::exists(&root)? {
            Self::mkdir_all(&root)?;
        }

        if !Self::check_permissions(&root) {
            return Err(anyhow!("Access denied: {:?}", root));
        }

        Ok(Self { root })
    }

    /// Returns the host path that matches `inner_path`.
    pub fn to_host<P: AsRef<Path>>(&self, inner_path: P) -> PathBuf {
        let inner = Self::to_inner(inner_path);
        match inner.strip_prefix("/") {
            Ok(rel) => self.root.join(rel),
            Err(_) => self.root.join(inner),
        }
    }

    fn to_inner<P: AsRef<Path>>(path: P) -> PathBuf {
        utils::normalize(Path::new("/").join(path))
    }

    /// Make directories recursively.
    /// * `path` is an absolute host path.
    /// Returns vector of created directories.
    fn mkdir_all<P: AsRef<Path>>(path: P) -> Result<Vec<PathBuf>> {
        let mut created = Vec::new();
        let mut built = PathBuf::new();
        for component in path.as_ref().components() {
            built.push(component);
            if std::fs::exists(&built)? {
                if !built.is_dir() {
                    return Err(anyhow!(
                        "path '{}' exists but is not a directory",
                        built.display()
                    ));
                }
                continue;
            }
            std::fs::create_dir(&built)?;
            created.push(built.clone());
        }
        Ok(created)
    }

    fn check_permissions<P: AsRef<Path>>(path: P) -> bool {
        let filename = path.as_ref().join(".access");
        if std::fs::write(&filename, b"check").is_err() {
            return false;
        }
        std::fs::remove_file(filename).is_ok()
    }

    fn walk(&self, host_dir: &Path, inner_dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
        let mut children: Vec<_> = std::fs::read_dir(host_dir)?
            .map(|entry| entry.map(|e| e.file_name()))
            .collect::<std::io::Result<_>>()?;
        children.sort();

        for name in children {
            let inner_child = inner_dir.join(&name);
            let host_child = host_dir.join(&name);
            out.push(inner_child.clone());
            if host_child.is_dir() {
                self.walk(&host_child, &inner_child, out)?;
            }
        }
        Ok(())
    }
}

impl FsBackend for DirFS {
    /// Returns root path related to the host file system.
    fn root(&self) -> &Path {
        self.root.as_path()
    }

    /// A symbolic link counts as existing even when its target does not.
    fn exists<P: AsRef<Path>>(&self, path: P) -> bool {
        std::fs::symlink_metadata(self.to_host(path)).is_ok()
    }

    fn is_dir<P: AsRef<Path>>(&self, path: P) -> Result<bool> {
        let path = path.as_ref();
        let host = self.to_host(path);
        if !host.exists() {
            return Err(anyhow!("{} does not exist", path.display()));
        }
        Ok(host.is_dir())
    }

    fn is_file<P: AsRef<Path>>(&self, path: P) -> Result<bool> {
        let path = path.as_ref();
        let host = self.to_host(path);
        if !host.exists() {
            return Err(anyhow!("{} does not exist", path.display()));
        }
        Ok(host.is_file())
    }

    /// Walks the host directory below `path`. Siblings come in name order,
    /// each directory is followed by its contents.
    fn tree<P: AsRef<Path>>(&self, path: P) -> Result<impl Iterator<Item = PathBuf>> {
        let inner = Self::to_inner(&path);
        let host = self.to_host(&inner);
        let mut found = Vec::new();
        if self.is_file(&inner)? {
            found.push(inner);
        } else {
            self.walk(&host, &inner, &mut found)?;
        }
        Ok(found.into_iter())
    }

    /// Creates directory and all its parents (if needed).
    /// * `path` - inner path.
    fn mkdir<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        if path.as_ref().as_os_str().is_empty() {
            return Err(anyhow!("invalid path: empty"));
        }

        let inner = Self::to_inner(path);
        let rel = inner.strip_prefix("/")?;

        let mut built = self.root.clone();
        for component in rel.components() {
            built.push(component);
            if built.is_symlink() {
                return Err(anyhow!("path '{}' is a symbolic link", inner.display()));
            }
            if built.exists() {
                if !built.is_dir() {
                    return Err(anyhow!(
                        "path '{}' exists but is not a directory",
                        inner.display()
                    ));
                }
                continue;
            }
            std::fs::create_dir(&built)?;
        }

        Ok(())
    }

    /// Creates a file in the tree, replacing an existing file.
    /// If the parent directory does not exist, it will be created.
    /// Never writes through a symbolic link.
    fn mkfile<P: AsRef<Path>>(&mut self, file_path: P, content: Option<&[u8]>) -> Result<()> {
        let inner = Self::to_inner(file_path);
        let host = self.to_host(&inner);
        if host.is_symlink() {
            return Err(anyhow!("{} is a symbolic link", inner.display()));
        }
        if host.is_dir() {
            return Err(anyhow!("{} is a directory", inner.display()));
        }
        if let Some(parent) = inner.parent() {
            self.mkdir(parent)?;
        }
        let mut fd = std::fs::File::create(&host)?;
        if let Some(content) = content {
            fd.write_all(content)?;
        }
        Ok(())
    }

    /// Reads the entire contents of a file into a byte vector.
    fn read<P: AsRef<Path>>(&self, path: P) -> Result<Vec<u8>> {
        let path = path.as_ref();
        if self.is_dir(path)? {
            // checks for existent too
            return Err(anyhow!("{} is a directory", path.display()));
        }
        Ok(std::fs::read(self.to_host(path))?)
    }
}
