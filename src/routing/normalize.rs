//! Filesystem path to URL path.

use std::path::{Component, Path};

use crate::routing::error::{RoutingError, RoutingResult};

/// Rewrite a discovered directory into the URL path it serves.
///
/// The root itself becomes `/`. Anything below it keeps its segments, joined
/// by `/` after a leading `/`. Comparison is component-wise, so trailing
/// separators on either side do not matter.
pub fn normalize(filesystem_path: &Path, root: &Path) -> RoutingResult<String> {
    let relative = filesystem_path
        .strip_prefix(root)
        .map_err(|_| RoutingError::PathOutsideRoot {
            path: filesystem_path.to_path_buf(),
            root: root.to_path_buf(),
        })?;

    let mut url = String::new();
    for component in relative.components() {
        match component {
            Component::Normal(segment) => {
                url.push('/');
                url.push_str(&segment.to_string_lossy());
            }
            Component::CurDir => {}
            _ => {
                return Err(RoutingError::PathOutsideRoot {
                    path: filesystem_path.to_path_buf(),
                    root: root.to_path_buf(),
                })
            }
        }
    }

    if url.is_empty() {
        url.push('/');
    }
    Ok(url)
}
