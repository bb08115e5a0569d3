//! Sequential application of an operation list to a storage backend.
//!
//! Operations run one at a time, in list order. `mkdir` is idempotent and `write` is
//! create-if-absent, so applying the same list twice is safe. The first failure stops the
//! run; operations already applied stay in place.

use crate::FsBackend;
use crate::content::ContentProvider;
use crate::core::utils;
use crate::error::{Error, Result};
use crate::script::{OpKind, Operation};

/// What an apply run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// `mkdir` operations applied (including directories that already existed).
    pub dirs: usize,
    /// Files created.
    pub written: usize,
    /// `write` operations skipped because the target already existed.
    pub skipped: usize,
}

pub fn apply<B: FsBackend>(
    fs: &mut B,
    ops: &[Operation],
    provider: &ContentProvider,
) -> Result<ApplyReport> {
    let mut report = ApplyReport::default();

    for (index, op) in ops.iter().enumerate() {
        apply_one(fs, op, provider, &mut report).map_err(|source| {
            tracing::warn!(index, %op, error = %source, "operation failed, stopping");
            Error::Apply {
                index,
                kind: op.kind,
                path: op.rel_path.clone(),
                source,
            }
        })?;
    }

    tracing::info!(
        dirs = report.dirs,
        written = report.written,
        skipped = report.skipped,
        "operations applied"
    );
    Ok(report)
}

fn apply_one<B: FsBackend>(
    fs: &mut B,
    op: &Operation,
    provider: &ContentProvider,
    report: &mut ApplyReport,
) -> crate::core::Result<()> {
    let target = utils::to_inner_path(&op.rel_path);

    match op.kind {
        OpKind::Mkdir => {
            fs.mkdir(&target)?;
            report.dirs += 1;
            tracing::debug!(%op, "directory ready");
        }
        OpKind::Write => {
            if let Some(parent) = target.parent() {
                fs.mkdir(parent)?;
            }
            if fs.exists(&target) {
                report.skipped += 1;
                tracing::debug!(%op, "exists, skipped");
                return Ok(());
            }
            let content = provider.content_for(&op.rel_path);
            fs.mkfile(&target, Some(&content))?;
            report.written += 1;
            tracing::debug!(%op, bytes = content.len(), "file written");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DirFS, MapFS, compile};
    use std::path::{Path, PathBuf};
    use tempdir::TempDir;

    /// Delegates to `MapFS` but refuses to create anything under `poisoned`.
    struct FailingFs {
        inner: MapFS,
        poisoned: PathBuf,
    }

    impl FsBackend for FailingFs {
        fn root(&self) -> &Path {
            self.inner.root()
        }

        fn exists<P: AsRef<Path>>(&self, path: P) -> bool {
            self.inner.exists(path)
        }

        fn is_dir<P: AsRef<Path>>(&self, path: P) -> crate::core::Result<bool> {
            self.inner.is_dir(path)
        }

        fn is_file<P: AsRef<Path>>(&self, path: P) -> crate::core::Result<bool> {
            self.inner.is_file(path)
        }

        fn tree<P: AsRef<Path>>(
            &self,
            path: P,
        ) -> crate::core::Result<impl Iterator<Item = PathBuf>> {
            self.inner.tree(path)
        }

        fn mkdir<P: AsRef<Path>>(&mut self, path: P) -> crate::core::Result<()> {
            if path.as_ref().starts_with(&self.poisoned) {
                anyhow::bail!("Permission denied: {}", path.as_ref().display());
            }
            self.inner.mkdir(path)
        }

        fn mkfile<P: AsRef<Path>>(
            &mut self,
            path: P,
            content: Option<&[u8]>,
        ) -> crate::core::Result<()> {
            if path.as_ref().starts_with(&self.poisoned) {
                anyhow::bail!("Permission denied: {}", path.as_ref().display());
            }
            self.inner.mkfile(path, content)
        }

        fn read<P: AsRef<Path>>(&self, path: P) -> crate::core::Result<Vec<u8>> {
            self.inner.read(path)
        }
    }

    fn tree_of<B: FsBackend>(fs: &B) -> Vec<String> {
        fs.tree("/")
            .unwrap()
            .map(|p| p.display().to_string())
            .collect()
    }

    mod map_fs {
        use super::*;

        #[test]
        fn test_apply_builds_tree() -> Result<()> {
            let mut fs = MapFS::new();
            let ops = compile("/site/ < index.html & [ /js/ < app.js ] & notes.txt")?;

            let report = apply(&mut fs, &ops, &ContentProvider::default())?;

            assert_eq!(
                report,
                ApplyReport {
                    dirs: 2,
                    written: 3,
                    skipped: 0
                }
            );
            assert_eq!(
                tree_of(&fs),
                vec![
                    "/site",
                    "/site/index.html",
                    "/site/js",
                    "/site/js/app.js",
                    "/site/notes.txt"
                ]
            );
            assert_eq!(
                fs.read("/site/js/app.js").unwrap(),
                b"// site/js/app.js\nconsole.log('Loaded app.js');\n"
            );
            assert!(fs.read("/site/notes.txt").unwrap().is_empty());
            Ok(())
        }

        #[test]
        fn test_write_creates_missing_parent() -> Result<()> {
            let mut fs = MapFS::new();
            apply(&mut fs, &[Operation::write("a/b/c.txt")], &ContentProvider::default())?;
            assert!(fs.is_dir("/a/b").unwrap());
            assert!(fs.is_file("/a/b/c.txt").unwrap());
            Ok(())
        }

        #[test]
        fn test_applying_twice_is_idempotent() -> Result<()> {
            let mut fs = MapFS::new();
            let provider = ContentProvider::new([("txt", "first ${name}")]);
            let ops = compile("/a/ < x.txt & y.txt ; /b/z.txt")?;

            apply(&mut fs, &ops, &provider)?;
            let before = tree_of(&fs);

            let report = apply(&mut fs, &ops, &ContentProvider::new([("txt", "second")]))?;

            assert_eq!(report.written, 0);
            assert_eq!(report.skipped, 3);
            assert_eq!(tree_of(&fs), before);
            assert_eq!(fs.read("/a/x.txt").unwrap(), b"first x.txt");
            Ok(())
        }

        #[test]
        fn test_existing_file_is_never_overwritten() -> Result<()> {
            let mut fs = MapFS::new();
            fs.mkfile("/keep.md", Some(b"mine")).unwrap();
            let report = apply(&mut fs, &compile("keep.md")?, &ContentProvider::default())?;
            assert_eq!(report.skipped, 1);
            assert_eq!(fs.read("/keep.md").unwrap(), b"mine");
            Ok(())
        }
    }

    mod failures {
        use super::*;

        #[test]
        fn test_stops_at_first_failure_and_keeps_applied() {
            let mut fs = FailingFs {
                inner: MapFS::new(),
                poisoned: PathBuf::from("/locked"),
            };
            let ops = compile("/ok/ < a.txt ; /locked/ < b.txt ; /later/").unwrap();

            let err = apply(&mut fs, &ops, &ContentProvider::default()).unwrap_err();

            match err {
                Error::Apply {
                    index, kind, path, ..
                } => {
                    assert_eq!(index, 2);
                    assert_eq!(kind, OpKind::Mkdir);
                    assert_eq!(path, "locked");
                }
                other => panic!("unexpected error: {other}"),
            }
            assert!(fs.exists("/ok/a.txt"));
            assert!(!fs.exists("/later"));
        }

        #[test]
        fn test_file_in_place_of_directory() {
            let mut fs = MapFS::new();
            fs.mkfile("/src", None).unwrap();
            let ops = compile("/src/main.rs").unwrap();

            let err = apply(&mut fs, &ops, &ContentProvider::default()).unwrap_err();
            assert!(matches!(err, Error::Apply { index: 0, .. }));
            assert!(err.to_string().starts_with("mkdir src failed (operation 0)"));
        }
    }

    mod dir_fs {
        use super::*;

        #[test]
        fn test_apply_on_host_twice() -> Result<()> {
            let temp_dir = TempDir::new("apply_test")?;
            let mut fs = DirFS::new(temp_dir.path()).unwrap();
            let ops = compile("/web/ < index.html & [ /css/ < style.css ]")?;

            apply(&mut fs, &ops, &ContentProvider::default())?;
            std::fs::write(temp_dir.path().join("web/css/style.css"), "edited")?;
            let report = apply(&mut fs, &ops, &ContentProvider::default())?;

            assert_eq!(report.skipped, 2);
            let html = std::fs::read_to_string(temp_dir.path().join("web/index.html"))?;
            assert!(html.contains("<title>index</title>"));
            assert_eq!(
                std::fs::read_to_string(temp_dir.path().join("web/css/style.css"))?,
                "edited"
            );
            Ok(())
        }

        #[cfg(unix)]
        #[test]
        fn test_write_skips_dangling_link() -> Result<()> {
            let temp_dir = TempDir::new("apply_test")?;
            let root = temp_dir.path().join("root");
            let mut fs = DirFS::new(&root).unwrap();
            let outside = temp_dir.path().join("outside.txt");
            std::fs::create_dir(root.join("web"))?;
            std::os::unix::fs::symlink(&outside, root.join("web/index.html"))?;

            let ops = compile("/web/ < index.html")?;
            let report = apply(&mut fs, &ops, &ContentProvider::default())?;

            assert_eq!(report.skipped, 1);
            assert!(!outside.exists());
            Ok(())
        }
    }
}
