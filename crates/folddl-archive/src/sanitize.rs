use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

/// Resolve an archive entry name under `root`.
///
/// `.` segments are dropped and `..` segments are resolved lexically. An
/// absolute name, or a `..` that would climb above `root`, is rejected.
pub fn sanitize_entry_path(entry: &Path, root: &Path) -> Result<PathBuf> {
    let mut relative = PathBuf::new();
    let mut depth = 0usize;

    for component in entry.components() {
        match component {
            Component::Normal(part) => {
                relative.push(part);
                depth += 1;
            }
            Component::CurDir => {}
            Component::ParentDir => {
                if depth == 0 {
                    return Err(Error::PathTraversal { entry: entry.to_path_buf() });
                }
                relative.pop();
                depth -= 1;
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(Error::PathTraversal { entry: entry.to_path_buf() });
            }
        }
    }

    if relative.as_os_str().is_empty() {
        Ok(root.to_path_buf())
    } else {
        Ok(root.join(relative))
    }
}
