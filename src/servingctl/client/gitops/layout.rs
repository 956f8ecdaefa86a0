//! On-disk layout of the gitops store.
//!
//! ```text
//! <root>/
//! ├── ksvc/                  # objects written with an empty namespace
//! │   └── <name>.yaml
//! └── <namespace>/
//!     └── ksvc/
//!         └── <name>.yaml
//! ```
//!
//! Names are used as-is: the cluster API already restricts them to DNS labels, which
//! are valid file names everywhere.

use super::MODE;
use crate::error::{Operation, Result, ServingError};
use crate::model::Kind;
use std::path::{Component, Path, PathBuf};

pub const FILE_EXT: &str = "yaml";

/// Directory segment holding objects of `kind`, or `None` if this store can't hold it.
pub fn kind_segment(kind: Kind) -> Option<&'static str> {
    match kind {
        Kind::Service => Some("ksvc"),
        Kind::Revision | Kind::Route | Kind::Configuration => None,
    }
}

/// Where a file sits in the layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub namespace: String,
    pub kind: Kind,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct Layout {
    root: PathBuf,
    namespace: String,
}

impl Layout {
    pub fn new(root: impl Into<PathBuf>, namespace: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            namespace: namespace.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// `<root>` for the empty namespace, `<root>/<namespace>` otherwise.
    pub fn scan_root(&self) -> PathBuf {
        if self.namespace.is_empty() {
            self.root.clone()
        } else {
            self.root.join(&self.namespace)
        }
    }

    pub fn segment(&self, kind: Kind, operation: Operation) -> Result<&'static str> {
        kind_segment(kind).ok_or_else(|| ServingError::unsupported(operation, MODE))
    }

    pub fn kind_dir(&self, kind: Kind, operation: Operation) -> Result<PathBuf> {
        Ok(self.scan_root().join(self.segment(kind, operation)?))
    }

    pub fn resource_path(&self, kind: Kind, name: &str, operation: Operation) -> Result<PathBuf> {
        Ok(self
            .kind_dir(kind, operation)?
            .join(format!("{}.{}", name, FILE_EXT)))
    }

    /// Inverse of [`Layout::resource_path`] for any namespace under the root.
    pub fn locate(&self, path: &Path) -> Option<Location> {
        let rel = path.strip_prefix(&self.root).ok()?;
        let parts: Vec<&str> = rel
            .components()
            .map(|c| match c {
                Component::Normal(s) => s.to_str(),
                _ => None,
            })
            .collect::<Option<_>>()?;

        let (namespace, segment, file) = match parts.as_slice() {
            [segment, file] => ("", *segment, *file),
            [namespace, segment, file] => (*namespace, *segment, *file),
            _ => return None,
        };

        let kind = Kind::ALL
            .into_iter()
            .find(|k| kind_segment(*k) == Some(segment))?;
        let name = Path::new(file)
            .extension()
            .filter(|ext| *ext == FILE_EXT)
            .and_then(|_| Path::new(file).file_stem())
            .and_then(|stem| stem.to_str())?;

        Some(Location {
            namespace: namespace.to_string(),
            kind,
            name: name.to_string(),
        })
    }
}
