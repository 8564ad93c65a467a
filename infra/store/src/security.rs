use crate::error::StoreError;
use std::path::{Component, Path, PathBuf};

/// Collapses `.` and `..` lexically. `..` is allowed as long as it never climbs
/// above the root.
fn normalize_relative(path: &Path) -> Result<PathBuf, StoreError> {
    let mut out = PathBuf::new();

    for c in path.components() {
        match c {
            Component::CurDir => {},
            Component::Normal(seg) => out.push(seg),
            Component::ParentDir => {
                if !out.pop() {
                    return Err(StoreError::PathTraversalAttempt {
                        message: path.display().to_string().into(),
                        context: Some("'..' climbs above the root".into()),
                    });
                }
            },
            Component::RootDir | Component::Prefix(_) => {
                return Err(StoreError::PathTraversalAttempt {
                    message: path.display().to_string().into(),
                    context: Some("Absolute paths are not allowed".into()),
                });
            },
        }
    }

    if out.as_os_str().is_empty() {
        return Err(StoreError::FileNotFound {
            message: path.display().to_string().into(),
            context: Some("Path names the root itself".into()),
        });
    }

    Ok(out)
}

pub(crate) fn resolve_path(root: &Path, path: impl AsRef<Path>) -> Result<PathBuf, StoreError> {
    let path = path.as_ref();
    let joined = root.join(normalize_relative(path)?);

    match joined.canonicalize() {
        Ok(canonical) if canonical.starts_with(root) => Ok(canonical),
        Ok(canonical) => Err(StoreError::PathTraversalAttempt {
            message: canonical.display().to_string().into(),
            context: Some("Symlink points outside the root".into()),
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => validate_ancestors(root, &joined),
        Err(e) => Err(StoreError::Io { source: e, context: None }),
    }
}

/// For a path that does not exist yet, checks its nearest existing ancestor.
fn validate_ancestors(root: &Path, joined: &Path) -> Result<PathBuf, StoreError> {
    let mut current = joined.parent();

    while let Some(path) = current {
        if path == root {
            return Ok(joined.to_path_buf());
        }

        if path.exists() {
            return match path.canonicalize() {
                Ok(canonical) if canonical.starts_with(root) => Ok(joined.to_path_buf()),
                Ok(canonical) => Err(StoreError::PathTraversalAttempt {
                    message: canonical.display().to_string().into(),
                    context: Some("Existing parent is a symlink outside the root".into()),
                }),
                Err(e) => Err(StoreError::Io {
                    source: e,
                    context: Some("Failed to verify parent directory".into()),
                }),
            };
        }

        current = path.parent();
    }

    Err(StoreError::PathTraversalAttempt {
        message: joined.display().to_string().into(),
        context: Some("No parent directory inside the root".into()),
    })
}
