use super::{ListFilter, ProgressFn, ServingClient, WatchEvent, WatchStream};
use crate::codec;
use crate::error::{Result, ServingError};
use crate::model::{Kind, Resource, ResourceList};
use chrono::Utc;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::time::Duration;

type Key = (Kind, String, String);

/// In-memory client that follows the cluster API contract.
///
/// Uses `RefCell` for interior mutability since the CLI is single-threaded.
/// This lets every `ServingClient` method take `&self`, like the file-backed client.
pub struct MemoryClient {
    namespace: String,
    objects: RefCell<BTreeMap<Key, Resource>>,
    next_version: Cell<u64>,
    failing_updates: Cell<usize>,
}

impl MemoryClient {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            objects: RefCell::new(BTreeMap::new()),
            next_version: Cell::new(1),
            failing_updates: Cell::new(0),
        }
    }

    /// Make the next `count` updates fail with a conflict, for exercising retries.
    pub fn fail_next_updates(&self, count: usize) {
        self.failing_updates.set(count);
    }

    fn key(&self, kind: Kind, namespace: &str, name: &str) -> Key {
        let namespace = if namespace.is_empty() {
            self.namespace.clone()
        } else {
            namespace.to_string()
        };
        (kind, namespace, name.to_string())
    }

    fn bump_version(&self) -> String {
        let version = self.next_version.get();
        self.next_version.set(version + 1);
        version.to_string()
    }

    fn require_name(kind: Kind, resource: &Resource) -> Result<()> {
        if resource.metadata.name.is_empty() {
            return Err(ServingError::Invalid(format!("{} name is required", kind)));
        }
        Ok(())
    }
}

impl Default for MemoryClient {
    fn default() -> Self {
        Self::new("default")
    }
}

impl ServingClient for MemoryClient {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn get(&self, kind: Kind, name: &str) -> Result<Resource> {
        self.objects
            .borrow()
            .get(&self.key(kind, "", name))
            .cloned()
            .ok_or_else(|| ServingError::not_found(kind, name))
    }

    fn list(&self, kind: Kind, filters: &[ListFilter]) -> Result<ResourceList> {
        let items = self
            .objects
            .borrow()
            .iter()
            .filter(|((k, ns, _), _)| {
                *k == kind && (self.namespace.is_empty() || *ns == self.namespace)
            })
            .map(|(_, resource)| resource)
            .filter(|resource| filters.iter().all(|f| f.matches(resource)))
            .cloned()
            .collect();
        Ok(ResourceList::new(items))
    }

    fn create(&self, kind: Kind, resource: &Resource) -> Result<()> {
        Self::require_name(kind, resource)?;
        let key = self.key(kind, &resource.metadata.namespace, &resource.metadata.name);
        let mut objects = self.objects.borrow_mut();
        if objects.contains_key(&key) {
            return Err(ServingError::AlreadyExists {
                kind,
                name: resource.metadata.name.clone(),
            });
        }

        let mut stored = resource.clone();
        codec::stamp(&mut stored, kind);
        stored.metadata.namespace = key.1.clone();
        stored.metadata.resource_version = self.bump_version();
        stored.metadata.generation = 1;
        stored.metadata.creation_timestamp.get_or_insert_with(Utc::now);
        objects.insert(key, stored);
        Ok(())
    }

    fn update(&self, kind: Kind, resource: &Resource) -> Result<()> {
        Self::require_name(kind, resource)?;
        let name = &resource.metadata.name;
        let key = self.key(kind, &resource.metadata.namespace, name);
        let mut objects = self.objects.borrow_mut();
        let current = objects
            .get(&key)
            .ok_or_else(|| ServingError::not_found(kind, name))?;

        let failing = self.failing_updates.get();
        let stale = !resource.metadata.resource_version.is_empty()
            && resource.metadata.resource_version != current.metadata.resource_version;
        if failing > 0 || stale {
            self.failing_updates.set(failing.saturating_sub(1));
            return Err(ServingError::Conflict {
                kind,
                name: name.clone(),
            });
        }

        let mut stored = resource.clone();
        codec::stamp(&mut stored, kind);
        stored.metadata.namespace = key.1.clone();
        stored.metadata.resource_version = self.bump_version();
        stored.metadata.generation = current.metadata.generation + 1;
        stored.metadata.creation_timestamp = current.metadata.creation_timestamp;
        objects.insert(key, stored);
        Ok(())
    }

    fn apply(&self, kind: Kind, resource: &Resource) -> Result<bool> {
        match self.get(kind, &resource.metadata.name) {
            Err(err) if err.is_not_found() => {
                self.create(kind, resource)?;
                Ok(true)
            }
            Err(err) => Err(err),
            Ok(current) => {
                if current.spec == resource.spec
                    && current.metadata.labels == resource.metadata.labels
                {
                    return Ok(false);
                }
                let mut desired = resource.clone();
                desired.metadata.resource_version = current.metadata.resource_version;
                self.update(kind, &desired)?;
                Ok(true)
            }
        }
    }

    fn delete(&self, kind: Kind, name: &str, _timeout: Duration) -> Result<()> {
        self.objects
            .borrow_mut()
            .remove(&self.key(kind, "", name))
            .map(|_| ())
            .ok_or_else(|| ServingError::not_found(kind, name))
    }

    fn watch(&self, kind: Kind, name: &str, _timeout: Duration) -> Result<WatchStream> {
        let current = self.get(kind, name)?;
        Ok(Box::new(std::iter::once(WatchEvent::Added(current))))
    }

    fn wait_for(
        &self,
        kind: Kind,
        name: &str,
        _timeout: Duration,
        progress: &mut ProgressFn<'_>,
    ) -> Result<Duration> {
        self.get(kind, name)?;
        progress(&format!("{} {} is ready", kind, name));
        Ok(Duration::ZERO)
    }
}
