use std::path::{Path, PathBuf};

/// Storage backend driven by the apply layer.
///
/// All paths are *inner* paths: absolute (`/docs/a.txt`) or relative to the backend root
/// (`docs/a.txt`). They are normalized before use and can never escape the root.
pub trait FsBackend {
    /// Returns the root path (host-related for `DirFS`, `/` for `MapFS`).
    fn root(&self) -> &Path;

    /// Checks if a `path` exists.
    fn exists<P: AsRef<Path>>(&self, path: P) -> bool;

    /// Checks if `path` is a directory. Errors if `path` does not exist.
    fn is_dir<P: AsRef<Path>>(&self, path: P) -> Result<bool>;

    /// Checks if `path` is a regular file. Errors if `path` does not exist.
    fn is_file<P: AsRef<Path>>(&self, path: P) -> Result<bool>;

    /// Recursive listing of everything below `path` (not including `path` itself), in path order.
    fn tree<P: AsRef<Path>>(&self, path: P) -> Result<impl Iterator<Item = PathBuf>>;

    /// Creates directory and all its parents. Existing directories are not an error.
    fn mkdir<P: AsRef<Path>>(&mut self, path: P) -> Result<()>;

    /// Creates (or replaces) a file, creating its parent directories first.
    fn mkfile<P: AsRef<Path>>(&mut self, path: P, content: Option<&[u8]>) -> Result<()>;

    /// Reads the entire contents of a file.
    fn read<P: AsRef<Path>>(&self, path: P) -> Result<Vec<u8>>;
}

pub type Result<T> = std::result::Result<T, anyhow::Error>;

pub mod utils {
    use std::path::{Component, Path, PathBuf};

    /// Resolves `.` and `..` lexically and drops trailing separators.
    /// `..` at the top is swallowed, so `/..` stays `/`.
    pub fn normalize<P: AsRef<Path>>(path: P) -> PathBuf {
        let mut result = PathBuf::new();
        for component in path.as_ref().components() {
            match component {
                Component::CurDir => {}
                Component::ParentDir => {
                    if let Some(parent) = result.parent() {
                        result = parent.to_path_buf();
                    }
                }
                _ => result.push(component),
            }
        }
        result
    }

    /// Turns an operation's `/`-joined relative path into an absolute inner path.
    pub fn to_inner_path(rel_path: &str) -> PathBuf {
        let mut inner = PathBuf::from("/");
        for segment in rel_path.split('/').filter(|s| !s.is_empty()) {
            inner.push(segment);
        }
        normalize(inner)
    }
}
