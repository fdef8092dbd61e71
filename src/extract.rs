//! Copy resources from a store into the sandbox

use crate::error::{Error, Result};
use crate::store::ResourceStore;
use std::fs::{self, OpenOptions};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Component, Path, PathBuf};

/// Buffer size used on both sides of the copy
const COPY_BUFFER_SIZE: usize = 8 * 1024;

/// Copy `locator` from `origin` to `destination`, which must lie inside `sandbox_root`
///
/// The destination must not exist yet. Missing parent directories are
/// created. Returns the normalized path that was written.
pub fn extract(
    store: &dyn ResourceStore,
    origin: Option<&str>,
    locator: &str,
    destination: &Path,
    sandbox_root: &Path,
) -> Result<PathBuf> {
    let origin = origin
        .filter(|o| !o.trim().is_empty())
        .ok_or_else(|| Error::extraction(locator, "no origin given"))?;
    if locator.trim().is_empty() {
        return Err(Error::extraction(locator, "resource locator is empty"));
    }
    if destination.as_os_str().is_empty() {
        return Err(Error::extraction(locator, "destination path is empty"));
    }

    let destination = contained_path(destination, sandbox_root).ok_or_else(|| {
        Error::extraction(
            locator,
            format!(
                "destination '{}' is outside the sandbox '{}'",
                destination.display(),
                sandbox_root.display()
            ),
        )
    })?;

    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            Error::extraction(
                locator,
                format!("cannot create directory '{}': {}", parent.display(), e),
            )
        })?;
    }

    let source = store.open(origin, locator)?;
    let file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&destination)
        .map_err(|e| {
            let reason = if e.kind() == io::ErrorKind::AlreadyExists {
                "already exists".to_string()
            } else {
                e.to_string()
            };
            Error::extraction(
                locator,
                format!("cannot create '{}': {}", destination.display(), reason),
            )
        })?;

    let mut reader = BufReader::with_capacity(COPY_BUFFER_SIZE, source);
    let mut writer = BufWriter::with_capacity(COPY_BUFFER_SIZE, file);
    let copied = io::copy(&mut reader, &mut writer).and_then(|n| writer.flush().map(|_| n));
    drop(writer);

    match copied {
        Ok(bytes) => {
            tracing::debug!(
                origin,
                locator,
                destination = %destination.display(),
                bytes,
                "extracted resource"
            );
            Ok(destination)
        }
        Err(e) => {
            let _ = fs::remove_file(&destination);
            Err(Error::extraction(
                locator,
                format!("copy to '{}' failed: {}", destination.display(), e),
            ))
        }
    }
}

/// Resolve `path` lexically and return it if it equals or is nested under `root`
pub fn contained_path(path: &Path, root: &Path) -> Option<PathBuf> {
    let root = normalize(root);
    let resolved = normalize(&root.join(path));
    resolved.starts_with(&root).then_some(resolved)
}

/// Collapse `.` and `..` components without touching the filesystem
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let at_anchor = matches!(
                    out.components().next_back(),
                    None | Some(Component::RootDir | Component::Prefix(_) | Component::ParentDir)
                );
                if at_anchor {
                    out.push("..");
                } else {
                    out.pop();
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
