//! Directory scanner: rebuilds "list" results from the layout on disk.
//!
//! The walk is depth-first in file-name order. Each entry gets a [`Visit`] decision:
//! directories that can't lead to a conforming object path are pruned together with
//! everything below them, so unrelated trees can live next to the store without being
//! read as objects. The first read or decode failure ends the scan.

use super::layout::{Layout, FILE_EXT};
use crate::codec;
use crate::error::{Operation, Result};
use crate::model::{Kind, Resource};
use std::fs::File;
use std::io::BufReader;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// What to do with one entry of the walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    /// Descend into a directory, or load a file.
    Enter,
    /// Ignore this entry only.
    Skip,
    /// Ignore this directory and its whole subtree.
    Prune,
}

/// Decide how to treat an entry, given its path components relative to the scan root.
///
/// A store-wide scan accepts `<segment>/<file>` and `<namespace>/<segment>/<file>`;
/// a namespaced scan accepts only `<segment>/<file>`.
pub fn visit(rel: &[&str], is_dir: bool, segment: &str, store_wide: bool) -> Visit {
    if is_dir {
        let conforming = match rel {
            [] => true,
            [first] => store_wide || *first == segment,
            [_, second] => store_wide && *second == segment,
            _ => false,
        };
        return if conforming { Visit::Enter } else { Visit::Prune };
    }

    let in_kind_dir = match rel {
        [dir, _] => *dir == segment,
        [_, dir, _] => store_wide && *dir == segment,
        _ => false,
    };
    let has_ext = rel
        .last()
        .and_then(|file| Path::new(file).extension())
        .is_some_and(|ext| ext == FILE_EXT);

    if in_kind_dir && has_ext {
        Visit::Enter
    } else {
        Visit::Skip
    }
}

/// Lazy traversal yielding every object of one kind below a layout's scan root.
///
/// Not restartable: once it has returned `None` or an error it stays exhausted.
pub struct Scan {
    walker: Option<walkdir::IntoIter>,
    layout: Layout,
    root: PathBuf,
    kind: Kind,
    segment: &'static str,
    store_wide: bool,
}

impl Scan {
    pub fn new(layout: &Layout, kind: Kind) -> Result<Self> {
        let segment = layout.segment(kind, Operation::List)?;
        let root = layout.scan_root();
        let walker = root.is_dir().then(|| {
            WalkDir::new(&root)
                .follow_links(false)
                .sort_by_file_name()
                .into_iter()
        });
        if walker.is_none() {
            tracing::debug!(root = %root.display(), "scan root missing, nothing to list");
        }
        Ok(Self {
            walker,
            layout: layout.clone(),
            root,
            kind,
            segment,
            store_wide: layout.namespace().is_empty(),
        })
    }

    fn relative_parts<'p>(&self, path: &'p Path) -> Option<Vec<&'p str>> {
        path.strip_prefix(&self.root)
            .ok()?
            .components()
            .map(|c| match c {
                Component::Normal(s) => s.to_str(),
                _ => None,
            })
            .collect()
    }

    fn load(&self, path: &Path) -> Result<Resource> {
        tracing::trace!(path = %path.display(), "loading object");
        let file = File::open(path)?;
        let resource = codec::decode(BufReader::new(file), self.kind)?;
        if let Some(location) = self.layout.locate(path) {
            if location.name != resource.name() {
                tracing::warn!(
                    path = %path.display(),
                    object = resource.name(),
                    "file name does not match metadata.name"
                );
            }
        }
        Ok(resource)
    }

    fn fail<T>(&mut self, err: impl Into<crate::error::ServingError>) -> Option<Result<T>> {
        self.walker = None;
        Some(Err(err.into()))
    }
}

impl Iterator for Scan {
    type Item = Result<Resource>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.walker.as_mut()?.next() {
                None => {
                    self.walker = None;
                    return None;
                }
                Some(Ok(entry)) => entry,
                Some(Err(e)) => return self.fail(e),
            };

            let is_dir = entry.file_type().is_dir();
            let decision = match self.relative_parts(entry.path()) {
                Some(parts) => visit(&parts, is_dir, self.segment, self.store_wide),
                None if is_dir => Visit::Prune,
                None => Visit::Skip,
            };

            match decision {
                Visit::Enter if is_dir => continue,
                Visit::Enter => {
                    return match self.load(entry.path()) {
                        Ok(resource) => Some(Ok(resource)),
                        Err(e) => self.fail(e),
                    };
                }
                Visit::Skip => continue,
                Visit::Prune => {
                    tracing::trace!(path = %entry.path().display(), "pruning subtree");
                    if let Some(walker) = self.walker.as_mut() {
                        walker.skip_current_dir();
                    }
                }
            }
        }
    }
}
