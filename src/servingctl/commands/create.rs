use crate::client::ServingClient;
use crate::commands::helpers::{display_namespace, wait_ready, ServiceEdits};
use crate::commands::{CmdMessage, CmdResult};
use crate::error::{Result, ServingError};
use crate::model::{Kind, Resource};
use chrono::Utc;
use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    pub edits: ServiceEdits,
    /// Replace an existing service instead of failing.
    pub force: bool,
    pub wait: Option<Duration>,
}

pub fn run(client: &dyn ServingClient, name: &str, options: &CreateOptions) -> Result<CmdResult> {
    if name.is_empty() {
        return Err(ServingError::Invalid("service name is required".into()));
    }
    if options.edits.image.is_none() {
        return Err(ServingError::Invalid("--image is required".into()));
    }

    let existing = match client.get(Kind::Service, name) {
        Ok(current) => Some(current),
        Err(err) if err.is_not_found() => None,
        Err(err) => return Err(err),
    };
    if existing.is_some() && !options.force {
        return Err(ServingError::AlreadyExists {
            kind: Kind::Service,
            name: name.to_string(),
        });
    }

    let mut service = Resource::new(Kind::Service, client.namespace(), name);
    options.edits.apply_to(&mut service);
    service.metadata.creation_timestamp = Some(Utc::now());

    let mut result = CmdResult::default();
    let verb = match existing {
        Some(current) => {
            service.metadata.resource_version = current.metadata.resource_version;
            service.metadata.creation_timestamp = current
                .metadata
                .creation_timestamp
                .or(service.metadata.creation_timestamp);
            client.update(Kind::Service, &service)?;
            "replaced"
        }
        None => {
            client.create(Kind::Service, &service)?;
            "created"
        }
    };
    tracing::info!(name, verb, "service written");
    result.add_message(CmdMessage::success(format!(
        "Service '{}' {} in namespace '{}'.",
        name,
        verb,
        display_namespace(client)
    )));

    if let Some(timeout) = options.wait {
        wait_ready(client, name, timeout, &mut result)?;
    }

    result.affected.push(client.get(Kind::Service, name)?);
    Ok(result)
}
