use crate::client::{ListFilter, ServingClient};
use crate::commands::CmdResult;
use crate::error::Result;
use crate::model::Kind;

pub fn run(client: &dyn ServingClient, kind: Kind, filters: &[ListFilter]) -> Result<CmdResult> {
    let mut list = client.list(kind, filters)?;
    list.items.sort_by(|a, b| (a.namespace(), a.name()).cmp(&(b.namespace(), b.name())));
    Ok(CmdResult::default().with_listed(list))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::gitops::GitOpsClient;
    use crate::client::memory::MemoryClient;
    use crate::model::{Resource, LIST_KIND};
    use tempfile::TempDir;

    fn service(namespace: &str, name: &str) -> Resource {
        let mut svc = Resource::new(Kind::Service, namespace, name);
        svc.set_image("img");
        svc
    }

    #[test]
    fn lists_every_namespace_sorted() {
        let dir = TempDir::new().unwrap();
        for (ns, name) in [("ns2", "b"), ("ns1", "z"), ("ns1", "a")] {
            GitOpsClient::new(ns, dir.path())
                .create(Kind::Service, &service(ns, name))
                .unwrap();
        }

        let all = GitOpsClient::new("", dir.path());
        let listed = run(&all, Kind::Service, &[]).unwrap().listed.unwrap();
        let names: Vec<_> = listed
            .items
            .iter()
            .map(|r| format!("{}/{}", r.namespace(), r.name()))
            .collect();
        assert_eq!(names, ["ns1/a", "ns1/z", "ns2/b"]);
        assert_eq!(listed.kind, LIST_KIND);
    }

    #[test]
    fn empty_namespace_lists_nothing() {
        let dir = TempDir::new().unwrap();
        let client = GitOpsClient::new("ns1", dir.path());
        let listed = run(&client, Kind::Service, &[]).unwrap().listed.unwrap();
        assert!(listed.is_empty());
    }

    #[test]
    fn label_filters_apply_on_remote_backend() {
        let client = MemoryClient::new("ns1");
        let mut blue = service("ns1", "a");
        blue.metadata.labels.insert("team".into(), "blue".into());
        client.create(Kind::Service, &blue).unwrap();
        client.create(Kind::Service, &service("ns1", "b")).unwrap();

        let listed = run(&client, Kind::Service, &[ListFilter::label("team", "blue")])
            .unwrap()
            .listed
            .unwrap();
        assert_eq!(listed.len(), 1);
    }
}
