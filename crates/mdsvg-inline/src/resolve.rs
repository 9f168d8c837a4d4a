//! Image URL resolution against the site layout.
//!
//! Two rules, matching how documentation sites lay out assets:
//! - URLs under `/img/` point into the static asset directory and
//!   resolve against the site root.
//! - Everything else resolves against the directory of the markdown
//!   file referencing the image; absolute URLs stand alone.

use std::path::{Component, Path, PathBuf};

use crate::consts::SITE_ROOT_PREFIX;
use crate::inliner::InlineOptions;

/// The markdown file currently being transformed.
///
/// Carries the file's path so relative image URLs can be resolved
/// against its directory. The path should be absolute for the resolved
/// image paths to be absolute.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileContext {
    path: PathBuf,
}

impl FileContext {
    /// Create a context for the document at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the document.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory containing the document.
    #[must_use]
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or(Path::new(""))
    }
}

/// Resolve an image URL to a filesystem path.
///
/// URLs starting with `/img/` resolve to `<site root>/<static dir>/<url>`,
/// with the URL's leading slash acting as a separator into the static
/// directory rather than as a filesystem root. An absolute static dir is
/// honored as-is instead of being nested under the site root.
///
/// All other URLs resolve against the document's directory; absolute
/// URLs stand alone. `.` and `..` components are folded lexically, so
/// the filesystem is never consulted and resolution is a pure function
/// of its inputs.
#[must_use]
pub fn resolve_image_path(url: &str, file: &FileContext, options: &InlineOptions) -> PathBuf {
    if url.starts_with(SITE_ROOT_PREFIX) {
        let below_root = url.trim_start_matches('/');
        return normalize(&options.static_root().join(below_root));
    }

    let url_path = Path::new(url);
    if url_path.is_absolute() {
        normalize(url_path)
    } else {
        normalize(&file.dir().join(url_path))
    }
}

/// Fold `.` and `..` components without touching the filesystem.
///
/// `..` drops a preceding normal component, clamps at the root, and is
/// kept verbatim at the start of a relative path.
fn normalize(path: &Path) -> PathBuf {
    let mut parts: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }
    parts.into_iter().collect()
}
