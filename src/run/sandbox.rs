//! Sandbox directory lifecycle for a single bridged invocation

use crate::error::{Error, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

const SANDBOX_PREFIX: &str = "scriptbridge-";

/// Temporary directory holding the script and support files of one run
///
/// Cleanup runs on [`Sandbox::cleanup`] or, failing that, on drop, so every
/// exit path of an invocation releases the directory.
pub struct Sandbox {
    /// The root directory of the sandbox
    pub base_path: PathBuf,
    temp_dir: Option<TempDir>,
    tracked_files: Vec<PathBuf>,
    retain: bool,
}

impl Sandbox {
    /// Create a uniquely named sandbox in the system temp dir or in `root`
    pub fn create(root: Option<&Path>, retain: bool) -> Result<Self> {
        let temp_dir = match root {
            Some(root) => {
                if !root.is_dir() {
                    return Err(Error::sandbox(
                        root,
                        io::Error::new(io::ErrorKind::NotFound, "not a directory"),
                    ));
                }
                tempfile::Builder::new()
                    .prefix(SANDBOX_PREFIX)
                    .tempdir_in(root)
                    .map_err(|e| Error::sandbox(root, e))?
            }
            None => tempfile::Builder::new()
                .prefix(SANDBOX_PREFIX)
                .tempdir()
                .map_err(|e| Error::sandbox(std::env::temp_dir(), e))?,
        };
        let base_path = temp_dir.path().to_path_buf();
        tracing::debug!(path = %base_path.display(), retain, "created sandbox");

        Ok(Sandbox {
            base_path,
            temp_dir: Some(temp_dir),
            tracked_files: Vec::new(),
            retain,
        })
    }

    /// Record a file written into the sandbox
    pub fn track(&mut self, path: PathBuf) {
        self.tracked_files.push(path);
    }

    /// Files written into the sandbox, in the order they were extracted
    pub fn tracked_files(&self) -> &[PathBuf] {
        &self.tracked_files
    }

    /// Release the sandbox
    ///
    /// Removes tracked files, prunes the directories they leave empty and
    /// deletes the sandbox itself. A retained sandbox is left in place and
    /// its path returned.
    pub fn cleanup(mut self) -> Result<Option<PathBuf>> {
        self.release().map_err(Error::from)
    }

    fn release(&mut self) -> io::Result<Option<PathBuf>> {
        let Some(temp_dir) = self.temp_dir.take() else {
            return Ok(None);
        };

        if self.retain {
            let preserved = temp_dir.keep();
            eprintln!("Sandbox preserved at: {}", preserved.display());
            for file in &self.tracked_files {
                eprintln!("  {}", file.display());
            }
            return Ok(Some(preserved));
        }

        for file in self.tracked_files.drain(..) {
            match fs::remove_file(&file) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!(path = %file.display(), error = %e, "cannot remove sandbox file")
                }
            }
        }
        prune_empty_dirs(&self.base_path);

        temp_dir.close()?;
        tracing::debug!(path = %self.base_path.display(), "removed sandbox");
        Ok(None)
    }
}

impl Drop for Sandbox {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            tracing::warn!(path = %self.base_path.display(), error = %e, "sandbox cleanup failed");
        }
    }
}

/// Remove directories under `root` that are empty, deepest first
fn prune_empty_dirs(root: &Path) {
    for entry in WalkDir::new(root)
        .min_depth(1)
        .contents_first(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if entry.file_type().is_dir() {
            // Fails for directories that still hold untracked files.
            let _ = fs::remove_dir(entry.path());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sandbox_creation() {
        let sandbox = Sandbox::create(None, false).unwrap();
        assert!(sandbox.base_path.is_dir());
        assert!(sandbox
            .base_path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with(SANDBOX_PREFIX));
    }

    #[test]
    fn test_sandbox_names_are_unique() {
        let first = Sandbox::create(None, false).unwrap();
        let second = Sandbox::create(None, false).unwrap();
        assert_ne!(first.base_path, second.base_path);
    }

    #[test]
    fn test_cleanup_removes_tracked_files_and_directory() {
        let mut sandbox = Sandbox::create(None, false).unwrap();
        let nested = sandbox.base_path.join("a/b/file.txt");
        fs::create_dir_all(nested.parent().unwrap()).unwrap();
        fs::write(&nested, "x").unwrap();
        sandbox.track(nested.clone());
        let base = sandbox.base_path.clone();

        assert_eq!(sandbox.cleanup().unwrap(), None);
        assert!(!nested.exists());
        assert!(!base.exists());
    }

    #[test]
    fn test_drop_cleans_up() {
        let base = {
            let mut sandbox = Sandbox::create(None, false).unwrap();
            let file = sandbox.base_path.join("script.js");
            fs::write(&file, "x").unwrap();
            sandbox.track(file);
            sandbox.base_path.clone()
        };
        assert!(!base.exists());
    }

    #[test]
    fn test_retained_sandbox_survives() {
        let mut sandbox = Sandbox::create(None, true).unwrap();
        let file = sandbox.base_path.join("script.js");
        fs::write(&file, "x").unwrap();
        sandbox.track(file.clone());

        let preserved = sandbox.cleanup().unwrap().unwrap();
        assert!(file.exists());
        fs::remove_dir_all(preserved).unwrap();
    }

    #[test]
    fn test_custom_root() {
        let root = TempDir::new().unwrap();
        let sandbox = Sandbox::create(Some(root.path()), false).unwrap();
        assert!(sandbox.base_path.starts_with(root.path()));
        drop(sandbox);
        assert_eq!(fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_missing_root_is_rejected() {
        let parent = TempDir::new().unwrap();
        let missing = parent.path().join("nope");
        match Sandbox::create(Some(&missing), false) {
            Err(Error::Sandbox { root, source }) => {
                assert_eq!(root, missing);
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            Err(other) => panic!("expected sandbox error, got {:?}", other),
            Ok(_) => panic!("sandbox created under a missing root"),
        }
    }
}
