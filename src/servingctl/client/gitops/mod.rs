//! # GitOps Client
//!
//! Runs the client operations against a directory tree instead of a cluster, so the
//! result can be committed and reconciled by whatever watches the repository.
//!
//! ## Behavior compared to the cluster API
//!
//! The directory is the only state. Nothing is cached and every call is an independent
//! filesystem transaction. Some operations are looser than their cluster counterparts:
//!
//! - `create` replaces an existing file instead of failing.
//! - `update` checks that the object exists, then rewrites the whole file. There is
//!   no resourceVersion check and no merge.
//! - `delete` of a missing object returns the raw I/O error, not NotFound.
//! - `list` ignores filters other than the namespace (a warning is logged).
//! - `wait_for` has nothing to wait for and reports success right away.
//!
//! Only services can be stored. Every operation on other kinds, and `watch`/`apply` on
//! any kind, fails with [`ServingError::Unsupported`].
//!
//! Writes go to a temporary file in the target directory and are renamed into place,
//! so a concurrent reader sees either the old or the new object.

use super::{ListFilter, ProgressFn, ServingClient, WatchStream};
use crate::codec;
use crate::error::{Operation, Result, ServingError};
use crate::model::{Kind, Resource, ResourceList};
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::instrument;
use uuid::Uuid;

pub mod layout;
pub mod scan;

use layout::Layout;
use scan::Scan;

/// Name used for this backend in unsupported-operation errors.
pub const MODE: &str = "gitops";

/// Elapsed time reported by `wait_for`; objects on disk are ready as soon as written.
const READY_AFTER: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct GitOpsClient {
    layout: Layout,
}

impl GitOpsClient {
    pub fn new(namespace: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            layout: Layout::new(root, namespace),
        }
    }

    pub fn root(&self) -> &Path {
        self.layout.root()
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    fn ensure_dir(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path)?;
        }
        Ok(())
    }

    fn write_atomic(&self, dir: &Path, target: &Path, content: &[u8]) -> Result<()> {
        let tmp = dir.join(format!(".write-{}.tmp", Uuid::new_v4()));
        if let Err(e) = fs::write(&tmp, content).and_then(|()| fs::rename(&tmp, target)) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }
}

impl ServingClient for GitOpsClient {
    fn namespace(&self) -> &str {
        self.layout.namespace()
    }

    #[instrument(level = "debug", skip(self), fields(root = %self.root().display()))]
    fn get(&self, kind: Kind, name: &str) -> Result<Resource> {
        let path = self.layout.resource_path(kind, name, Operation::Get)?;
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ServingError::not_found(kind, name));
            }
            Err(e) => return Err(e.into()),
        };
        codec::decode(BufReader::new(file), kind)
    }

    #[instrument(level = "debug", skip(self), fields(root = %self.root().display()))]
    fn list(&self, kind: Kind, filters: &[ListFilter]) -> Result<ResourceList> {
        let scan = Scan::new(&self.layout, kind)?;
        if !filters.is_empty() {
            tracing::warn!(?filters, "list filters are not applied in {} mode", MODE);
        }
        let items = scan.collect::<Result<Vec<_>>>()?;
        tracing::debug!(count = items.len(), "listed objects");
        let mut list = ResourceList::new(items);
        codec::stamp_list(&mut list, kind);
        Ok(list)
    }

    #[instrument(level = "debug", skip(self, resource), fields(name = %resource.metadata.name))]
    fn create(&self, kind: Kind, resource: &Resource) -> Result<()> {
        let dir = self.layout.kind_dir(kind, Operation::Create)?;
        let name = &resource.metadata.name;
        if name.is_empty() {
            return Err(ServingError::Invalid(format!("{} name is required", kind)));
        }
        self.ensure_dir(&dir)?;

        let target = self.layout.resource_path(kind, name, Operation::Create)?;
        if target.exists() {
            tracing::debug!(path = %target.display(), "replacing existing object");
        }

        let mut content = Vec::new();
        codec::encode(resource, kind, &mut content)?;
        self.write_atomic(&dir, &target, &content)
    }

    #[instrument(level = "debug", skip(self, resource), fields(name = %resource.metadata.name))]
    fn update(&self, kind: Kind, resource: &Resource) -> Result<()> {
        self.layout.segment(kind, Operation::Update)?;
        self.get(kind, &resource.metadata.name)?;
        self.create(kind, resource)
    }

    fn apply(&self, _kind: Kind, _resource: &Resource) -> Result<bool> {
        Err(ServingError::unsupported(Operation::Apply, MODE))
    }

    #[instrument(level = "debug", skip(self), fields(root = %self.root().display()))]
    fn delete(&self, kind: Kind, name: &str, _timeout: Duration) -> Result<()> {
        let path = self.layout.resource_path(kind, name, Operation::Delete)?;
        fs::remove_file(path)?;
        Ok(())
    }

    fn watch(&self, _kind: Kind, _name: &str, _timeout: Duration) -> Result<WatchStream> {
        Err(ServingError::unsupported(Operation::Watch, MODE))
    }

    fn wait_for(
        &self,
        kind: Kind,
        _name: &str,
        _timeout: Duration,
        _progress: &mut ProgressFn<'_>,
    ) -> Result<Duration> {
        self.layout.segment(kind, Operation::WaitFor)?;
        Ok(READY_AFTER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_yaml::Value;
    use tempfile::TempDir;

    fn setup(namespace: &str) -> (TempDir, GitOpsClient) {
        let dir = TempDir::new().unwrap();
        let client = GitOpsClient::new(namespace, dir.path());
        (dir, client)
    }

    fn service(name: &str, image: &str) -> Resource {
        let mut svc = Resource::new(Kind::Service, "ns1", name);
        svc.set_image(image);
        svc
    }

    #[test]
    fn create_get_delete_scenario() {
        let (_dir, client) = setup("ns1");
        let svc = service("svc1", "img:v1");
        client.create(Kind::Service, &svc).unwrap();

        let fetched = client.get(Kind::Service, "svc1").unwrap();
        assert_eq!(fetched.spec, svc.spec);

        client.delete(Kind::Service, "svc1", Duration::ZERO).unwrap();
        let err = client.get(Kind::Service, "svc1").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn get_missing_is_not_found_with_name() {
        let (_dir, client) = setup("ns1");
        match client.get(Kind::Service, "missing").unwrap_err() {
            ServingError::NotFound { kind, name } => {
                assert_eq!(kind, Kind::Service);
                assert_eq!(name, "missing");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn create_writes_expected_layout() {
        let (dir, client) = setup("ns1");
        client.create(Kind::Service, &service("svc1", "img")).unwrap();
        let path = dir.path().join("ns1").join("ksvc").join("svc1.yaml");
        let text = fs::read_to_string(path).unwrap();
        assert!(text.contains("kind: Service"));
        assert!(text.contains("image: img"));
    }

    #[test]
    fn create_leaves_no_temp_files() {
        let (dir, client) = setup("ns1");
        client.create(Kind::Service, &service("a", "img")).unwrap();
        client.create(Kind::Service, &service("a", "img2")).unwrap();
        for entry in fs::read_dir(dir.path().join("ns1/ksvc")).unwrap() {
            let name = entry.unwrap().file_name();
            let name = name.to_string_lossy();
            assert!(!name.ends_with(".tmp"), "leftover temp file: {name}");
        }
    }

    #[test]
    fn failed_write_cleans_up_temp_file() {
        let (dir, client) = setup("ns1");
        let kind_dir = dir.path().join("ns1/ksvc");
        // a non-empty directory in the way makes the final rename fail
        fs::create_dir_all(kind_dir.join("blocked.yaml/inner")).unwrap();

        assert!(client.create(Kind::Service, &service("blocked", "img")).is_err());
        let leftovers: Vec<_> = fs::read_dir(&kind_dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name.ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty(), "leftover temp files: {leftovers:?}");
    }

    #[test]
    fn create_replaces_existing_object() {
        let (_dir, client) = setup("ns1");
        client.create(Kind::Service, &service("a", "v1")).unwrap();
        client.create(Kind::Service, &service("a", "v2")).unwrap();
        let svc = client.get(Kind::Service, "a").unwrap();
        assert_eq!(svc.image(), Some("v2"));
    }

    #[test]
    fn update_of_missing_object_writes_nothing() {
        let (dir, client) = setup("ns1");
        let err = client
            .update(Kind::Service, &service("ghost", "img"))
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(!dir.path().join("ns1/ksvc/ghost.yaml").exists());
    }

    #[test]
    fn update_overwrites_whole_object() {
        let (_dir, client) = setup("ns1");
        let mut svc = service("a", "v1");
        svc.metadata.labels.insert("keep".into(), "me".into());
        client.create(Kind::Service, &svc).unwrap();

        let replacement = service("a", "v2");
        client.update(Kind::Service, &replacement).unwrap();
        let stored = client.get(Kind::Service, "a").unwrap();
        assert_eq!(stored.image(), Some("v2"));
        assert!(stored.metadata.labels.is_empty());
    }

    #[test]
    fn delete_missing_surfaces_io_error() {
        let (_dir, client) = setup("ns1");
        let err = client
            .delete(Kind::Service, "nope", Duration::ZERO)
            .unwrap_err();
        match err {
            ServingError::Io(e) => assert_eq!(e.kind(), io::ErrorKind::NotFound),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn list_returns_namespace_objects() {
        let (dir, client) = setup("ns1");
        for name in ["a", "b", "c"] {
            client.create(Kind::Service, &service(name, "img")).unwrap();
        }
        GitOpsClient::new("ns2", dir.path())
            .create(Kind::Service, &service("other", "img"))
            .unwrap();
        fs::write(dir.path().join("ns1/ksvc/notes.txt"), "ignore me").unwrap();

        let list = client.list(Kind::Service, &[]).unwrap();
        assert_eq!(list.kind, "List");
        assert_eq!(list.api_version, "v1");
        let mut names: Vec<_> = list.items.iter().map(|s| s.name().to_string()).collect();
        names.sort();
        assert_eq!(names, vec!["a", "b", "c"]);

        let everything = GitOpsClient::new("", dir.path())
            .list(Kind::Service, &[])
            .unwrap();
        assert_eq!(everything.len(), 4);
    }

    #[test]
    fn list_ignores_extra_filters() {
        let (_dir, client) = setup("ns1");
        client.create(Kind::Service, &service("a", "img")).unwrap();
        client.create(Kind::Service, &service("b", "img")).unwrap();
        let list = client
            .list(Kind::Service, &[ListFilter::Name("a".into())])
            .unwrap();
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn empty_object_file_is_rejected() {
        let (dir, client) = setup("ns1");
        client.create(Kind::Service, &service("a", "img")).unwrap();
        fs::write(dir.path().join("ns1/ksvc/blank.yaml"), "").unwrap();

        assert!(client.list(Kind::Service, &[]).is_err());
        let err = client.get(Kind::Service, "blank").unwrap_err();
        assert!(matches!(err, ServingError::Decode(_)), "{err}");
        assert!(client
            .update_with_retry(Kind::Service, "blank", &mut |svc| Ok(svc), 3)
            .is_err());
    }

    #[test]
    fn list_of_empty_store_is_empty() {
        let (_dir, client) = setup("ns1");
        assert!(client.list(Kind::Service, &[]).unwrap().is_empty());
    }

    #[test]
    fn payload_survives_with_canonical_identity() {
        let (dir, client) = setup("ns1");
        let path = dir.path().join("ns1/ksvc/raw.yaml");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(
            &path,
            "apiVersion: old/v1\nkind: Legacy\nmetadata:\n  name: raw\nspec:\n  custom:\n    z: 1\n    a: [x, y]\n",
        )
        .unwrap();

        let svc = client.get(Kind::Service, "raw").unwrap();
        assert_eq!(svc.kind, "Service");
        client.update(Kind::Service, &svc).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("apiVersion: serving.knative.dev/v1"));
        let again = client.get(Kind::Service, "raw").unwrap();
        let custom = again.spec.as_ref().and_then(|s| s.get("custom")).unwrap();
        assert_eq!(custom.get("z"), Some(&Value::from(1)));
        assert_eq!(again, svc);
    }

    #[test]
    fn unsupported_kinds_fail_uniformly() {
        let (_dir, client) = setup("ns1");
        for kind in [Kind::Revision, Kind::Route, Kind::Configuration] {
            let obj = Resource::new(kind, "ns1", "x");
            let errors = [
                client.get(kind, "x").unwrap_err(),
                client.list(kind, &[]).unwrap_err(),
                client.create(kind, &obj).unwrap_err(),
                client.update(kind, &obj).unwrap_err(),
                client.delete(kind, "x", Duration::ZERO).unwrap_err(),
                client
                    .wait_for(kind, "x", Duration::ZERO, &mut |_| {})
                    .unwrap_err(),
                client
                    .update_with_retry(kind, "x", &mut |r| Ok(r), 3)
                    .unwrap_err(),
            ];
            for err in errors {
                assert!(err.is_unsupported(), "{kind}: {err}");
            }
        }
    }

    #[test]
    fn watch_and_apply_are_unsupported() {
        let (_dir, client) = setup("ns1");
        assert!(client
            .watch(Kind::Service, "a", Duration::ZERO)
            .err()
            .unwrap()
            .is_unsupported());
        assert!(client
            .apply(Kind::Service, &service("a", "img"))
            .unwrap_err()
            .is_unsupported());
    }

    #[test]
    fn wait_for_reports_ready_without_polling() {
        let (_dir, client) = setup("ns1");
        let mut messages = Vec::new();
        let elapsed = client
            .wait_for(Kind::Service, "anything", Duration::from_secs(600), &mut |m| {
                messages.push(m.to_string())
            })
            .unwrap();
        assert_eq!(elapsed, Duration::from_secs(1));
        assert!(messages.is_empty());
    }

    #[test]
    fn update_with_retry_edits_stored_object() {
        let (_dir, client) = setup("ns1");
        client.create(Kind::Service, &service("a", "v1")).unwrap();
        client
            .update_with_retry(
                Kind::Service,
                "a",
                &mut |mut svc| {
                    svc.set_image("v2");
                    Ok(svc)
                },
                3,
            )
            .unwrap();
        assert_eq!(client.get(Kind::Service, "a").unwrap().image(), Some("v2"));
    }

    #[test]
    fn update_with_retry_on_missing_object_is_not_found() {
        let (_dir, client) = setup("ns1");
        let mut calls = 0;
        let err = client
            .update_with_retry(
                Kind::Service,
                "missing",
                &mut |svc| {
                    calls += 1;
                    Ok(svc)
                },
                5,
            )
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(calls, 0);
    }

    #[test]
    fn empty_namespace_writes_at_root() {
        let (dir, client) = setup("");
        let mut svc = service("top", "img");
        svc.metadata.namespace.clear();
        client.create(Kind::Service, &svc).unwrap();
        assert!(dir.path().join("ksvc/top.yaml").exists());
        assert_eq!(client.list(Kind::Service, &[]).unwrap().len(), 1);
    }
}
