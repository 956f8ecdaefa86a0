//! # Resource Clients
//!
//! [`ServingClient`] is the one interface the command layer talks to. It is the same
//! operation set whether the objects live in a cluster or in a local directory, so no
//! command ever checks which backend it was handed.
//!
//! ## Implementations
//!
//! - [`gitops::GitOpsClient`]: objects are YAML files under a storage root. Only
//!   services are supported; everything else answers with
//!   [`ServingError::Unsupported`](crate::error::ServingError::Unsupported).
//! - [`memory::MemoryClient`]: keeps objects in memory and follows the cluster API's
//!   stricter contract (duplicate creates rejected, resourceVersion conflicts, missing
//!   deletes reported as NotFound). Used for tests.
//!
//! ## Retry
//!
//! `update_with_retry` is provided by the trait on top of `get` and `update`; see
//! [`retry`] for the loop itself.

use crate::error::Result;
use crate::model::{Kind, Resource, ResourceList};
use std::time::Duration;

pub mod gitops;
pub mod memory;
pub mod retry;

/// Edits a freshly fetched object during [`ServingClient::update_with_retry`].
pub type UpdateFn<'a> = dyn FnMut(Resource) -> Result<Resource> + 'a;

/// Receives progress messages while waiting for an object to become ready.
pub type ProgressFn<'a> = dyn FnMut(&str) + 'a;

/// Narrows a list call beyond namespace scoping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListFilter {
    /// Only the object with this name.
    Name(String),
    /// Only objects carrying this label value.
    Label { key: String, value: String },
}

impl ListFilter {
    pub fn label(key: impl Into<String>, value: impl Into<String>) -> Self {
        ListFilter::Label {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn matches(&self, resource: &Resource) -> bool {
        match self {
            ListFilter::Name(name) => resource.metadata.name == *name,
            ListFilter::Label { key, value } => {
                resource.metadata.labels.get(key) == Some(value)
            }
        }
    }
}

/// A change reported by [`ServingClient::watch`].
#[derive(Debug, Clone, PartialEq)]
pub enum WatchEvent {
    Added(Resource),
    Modified(Resource),
    Deleted(Resource),
}

pub type WatchStream = Box<dyn Iterator<Item = WatchEvent>>;

pub trait ServingClient {
    /// Namespace this client operates in. Empty means every namespace.
    fn namespace(&self) -> &str;

    fn get(&self, kind: Kind, name: &str) -> Result<Resource>;

    fn list(&self, kind: Kind, filters: &[ListFilter]) -> Result<ResourceList>;

    fn create(&self, kind: Kind, resource: &Resource) -> Result<()>;

    fn update(&self, kind: Kind, resource: &Resource) -> Result<()>;

    /// Create or replace; returns whether anything changed.
    fn apply(&self, kind: Kind, resource: &Resource) -> Result<bool>;

    fn delete(&self, kind: Kind, name: &str, timeout: Duration) -> Result<()>;

    fn watch(&self, kind: Kind, name: &str, timeout: Duration) -> Result<WatchStream>;

    /// Block until the object is ready; returns how long that took.
    fn wait_for(
        &self,
        kind: Kind,
        name: &str,
        timeout: Duration,
        progress: &mut ProgressFn<'_>,
    ) -> Result<Duration>;

    /// Fetch, mutate and update `name`, trying at most `max_attempts` times.
    fn update_with_retry(
        &self,
        kind: Kind,
        name: &str,
        mutate: &mut UpdateFn<'_>,
        max_attempts: usize,
    ) -> Result<()> {
        retry::retry_update(self, kind, name, mutate, max_attempts).into_result()
    }
}
