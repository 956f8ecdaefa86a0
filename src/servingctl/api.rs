//! # API Facade
//!
//! A thin facade over the command layer and the single entry point for UIs.
//!
//! The facade dispatches to `commands/*.rs`, turns raw CLI-shaped input (`KEY=VALUE`
//! strings, attempt counts, timeouts) into typed values, and returns
//! `Result<CmdResult>`. It never prints and holds no business logic.
//!
//! `ServingApi<C: ServingClient>` is generic over the backend:
//! - gitops mode: `ServingApi<GitOpsClient>`
//! - tests: `ServingApi<MemoryClient>`

use crate::client::{ListFilter, ServingClient};
use crate::commands::config::ConfigAction;
use crate::commands::create::CreateOptions;
use crate::commands::helpers::{parse_pairs, ServiceEdits};
use crate::commands::update::UpdateOptions;
use crate::commands::{self, CmdResult};
use crate::config::ServingConfig;
use crate::error::Result;
use crate::model::Kind;
use std::path::Path;
use std::time::Duration;

/// Service fields as given on the command line.
#[derive(Debug, Clone, Default)]
pub struct ServiceInput {
    pub image: Option<String>,
    pub env: Vec<String>,
    pub labels: Vec<String>,
}

impl ServiceInput {
    fn edits(&self) -> Result<ServiceEdits> {
        Ok(ServiceEdits {
            image: self.image.clone(),
            env: parse_pairs(&self.env)?,
            labels: parse_pairs(&self.labels)?,
        })
    }
}

pub struct ServingApi<C: ServingClient> {
    client: C,
    settings: ServingConfig,
}

impl<C: ServingClient> ServingApi<C> {
    pub fn new(client: C, settings: ServingConfig) -> Self {
        Self { client, settings }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn create_service(
        &self,
        name: &str,
        input: &ServiceInput,
        force: bool,
        wait: bool,
    ) -> Result<CmdResult> {
        let options = CreateOptions {
            edits: input.edits()?,
            force,
            wait: self.wait_timeout(wait),
        };
        commands::create::run(&self.client, name, &options)
    }

    pub fn update_service(&self, name: &str, input: &ServiceInput, wait: bool) -> Result<CmdResult> {
        let options = UpdateOptions {
            edits: input.edits()?,
            max_attempts: self.settings.update_retries,
            wait: self.wait_timeout(wait),
        };
        commands::update::run(&self.client, name, &options)
    }

    pub fn describe(&self, kind: Kind, name: &str) -> Result<CmdResult> {
        commands::describe::run(&self.client, kind, name)
    }

    /// Lists `kind`, keeping only objects that carry every `KEY=VALUE` selector.
    pub fn list<I: AsRef<str>>(&self, kind: Kind, selectors: &[I]) -> Result<CmdResult> {
        let filters: Vec<_> = parse_pairs(selectors)?
            .into_iter()
            .map(|(key, value)| ListFilter::Label { key, value })
            .collect();
        commands::list::run(&self.client, kind, &filters)
    }

    pub fn delete<I: AsRef<str>>(&self, kind: Kind, names: &[I], wait: bool) -> Result<CmdResult> {
        let timeout = self.wait_timeout(wait).unwrap_or(Duration::ZERO);
        commands::delete::run(&self.client, kind, names, timeout)
    }

    fn wait_timeout(&self, wait: bool) -> Option<Duration> {
        wait.then(|| Duration::from_secs(self.settings.wait_timeout))
    }
}

/// Config commands need no backend.
pub fn config(config_dir: &Path, action: ConfigAction) -> Result<CmdResult> {
    commands::config::run(config_dir, action)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::memory::MemoryClient;
    use crate::error::ServingError;

    fn api() -> ServingApi<MemoryClient> {
        ServingApi::new(MemoryClient::new("ns1"), ServingConfig::default())
    }

    fn input(image: &str) -> ServiceInput {
        ServiceInput {
            image: Some(image.into()),
            env: vec!["MODE=prod".into()],
            labels: vec!["team=blue".into()],
        }
    }

    #[test]
    fn create_parses_pairs() {
        let api = api();
        let result = api.create_service("svc1", &input("img:v1"), false, false).unwrap();
        let svc = &result.affected[0];
        assert_eq!(svc.metadata.labels.get("team").map(String::as_str), Some("blue"));
    }

    #[test]
    fn malformed_pairs_are_rejected_before_any_write() {
        let api = api();
        let mut bad = input("img:v1");
        bad.env = vec!["MODE".into()];
        let err = api.create_service("svc1", &bad, false, false).unwrap_err();
        assert!(matches!(err, ServingError::Invalid(_)));
        assert!(api.client().get(Kind::Service, "svc1").is_err());
    }

    #[test]
    fn update_uses_configured_attempts() {
        let mut settings = ServingConfig::default();
        settings.update_retries = 2;
        let api = ServingApi::new(MemoryClient::new("ns1"), settings);
        api.create_service("svc1", &input("img:v1"), false, false).unwrap();

        api.client().fail_next_updates(2);
        let update = ServiceInput {
            image: Some("img:v2".into()),
            ..Default::default()
        };
        assert!(api.update_service("svc1", &update, false).is_err());
        assert!(api.update_service("svc1", &update, false).is_ok());
    }

    #[test]
    fn list_turns_selectors_into_label_filters() {
        let api = api();
        api.create_service("svc1", &input("img:v1"), false, false).unwrap();
        let other = ServiceInput {
            image: Some("img:v1".into()),
            ..Default::default()
        };
        api.create_service("svc2", &other, false, false).unwrap();

        let listed = api.list(Kind::Service, &["team=blue"]).unwrap().listed.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed.items[0].name(), "svc1");
    }

    #[test]
    fn delete_dispatches_per_name() {
        let api = api();
        api.create_service("svc1", &input("img:v1"), false, false).unwrap();
        let result = api.delete(Kind::Service, &["svc1", "svc2"], false).unwrap();
        assert_eq!(result.messages.len(), 1);
        assert_eq!(result.failures.len(), 1);
    }
}
