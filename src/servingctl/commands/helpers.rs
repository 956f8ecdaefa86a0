use crate::client::ServingClient;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::{Result, ServingError};
use crate::model::{Kind, Resource};
use std::time::Duration;

/// Parses `KEY=VALUE` arguments. The value may be empty; the key may not.
pub fn parse_pairs<I: AsRef<str>>(args: &[I]) -> Result<Vec<(String, String)>> {
    args.iter()
        .map(|arg| {
            let arg = arg.as_ref();
            match arg.split_once('=') {
                Some((key, value)) if !key.trim().is_empty() => {
                    Ok((key.trim().to_string(), value.to_string()))
                }
                _ => Err(ServingError::Invalid(format!(
                    "expected KEY=VALUE, got '{}'",
                    arg
                ))),
            }
        })
        .collect()
}

/// Edits shared by `service create` and `service update`.
#[derive(Debug, Clone, Default)]
pub struct ServiceEdits {
    pub image: Option<String>,
    pub env: Vec<(String, String)>,
    pub labels: Vec<(String, String)>,
}

impl ServiceEdits {
    pub fn is_empty(&self) -> bool {
        self.image.is_none() && self.env.is_empty() && self.labels.is_empty()
    }

    pub fn apply_to(&self, service: &mut Resource) {
        if let Some(image) = &self.image {
            service.set_image(image);
        }
        for (name, value) in &self.env {
            service.set_env(name, value);
        }
        for (key, value) in &self.labels {
            service.metadata.labels.insert(key.clone(), value.clone());
        }
    }
}

/// Namespace to show in messages.
pub fn display_namespace(client: &dyn ServingClient) -> &str {
    match client.namespace() {
        "" => "all namespaces",
        ns => ns,
    }
}

/// Waits for a service and records progress and elapsed time as messages.
pub fn wait_ready(
    client: &dyn ServingClient,
    name: &str,
    timeout: Duration,
    result: &mut CmdResult,
) -> Result<()> {
    let mut progress = Vec::new();
    let elapsed = client.wait_for(Kind::Service, name, timeout, &mut |msg| {
        progress.push(msg.to_string())
    })?;
    for msg in progress {
        result.add_message(CmdMessage::info(msg));
    }
    result.add_message(CmdMessage::info(format!(
        "Service '{}' ready after {:.1}s",
        name,
        elapsed.as_secs_f64()
    )));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::memory::MemoryClient;

    #[test]
    fn parses_key_value_pairs() {
        let pairs = parse_pairs(&["A=1", "B=", "C=x=y"]).unwrap();
        assert_eq!(
            pairs,
            vec![
                ("A".to_string(), "1".to_string()),
                ("B".to_string(), String::new()),
                ("C".to_string(), "x=y".to_string()),
            ]
        );
    }

    #[test]
    fn rejects_pairs_without_key() {
        assert!(parse_pairs(&["novalue"]).is_err());
        assert!(parse_pairs(&["=1"]).is_err());
    }

    #[test]
    fn edits_touch_only_what_is_given() {
        let mut svc = Resource::new(Kind::Service, "ns1", "svc1");
        svc.set_image("img:v1");
        let edits = ServiceEdits {
            image: None,
            env: vec![("MODE".into(), "prod".into())],
            labels: vec![("team".into(), "blue".into())],
        };
        edits.apply_to(&mut svc);
        assert_eq!(svc.image(), Some("img:v1"));
        assert_eq!(svc.metadata.labels.get("team").map(String::as_str), Some("blue"));
        assert!(!edits.is_empty());
        assert!(ServiceEdits::default().is_empty());
    }

    #[test]
    fn wait_reports_progress() {
        let client = MemoryClient::new("ns1");
        client
            .create(Kind::Service, &Resource::new(Kind::Service, "", "svc1"))
            .unwrap();
        let mut result = CmdResult::default();
        wait_ready(&client, "svc1", Duration::from_secs(5), &mut result).unwrap();
        assert_eq!(result.messages.len(), 2);
        assert!(result.messages[1].content.contains("ready after 0.0s"));
    }

    #[test]
    fn all_namespaces_display() {
        assert_eq!(display_namespace(&MemoryClient::new("")), "all namespaces");
        assert_eq!(display_namespace(&MemoryClient::new("ns1")), "ns1");
    }
}
