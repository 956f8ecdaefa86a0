use crate::client::ServingClient;
use crate::commands::helpers::{display_namespace, wait_ready, ServiceEdits};
use crate::commands::{CmdMessage, CmdResult};
use crate::error::{Result, ServingError};
use crate::model::Kind;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct UpdateOptions {
    pub edits: ServiceEdits,
    pub max_attempts: usize,
    pub wait: Option<Duration>,
}

pub fn run(client: &dyn ServingClient, name: &str, options: &UpdateOptions) -> Result<CmdResult> {
    if options.edits.is_empty() {
        return Err(ServingError::Invalid(
            "nothing to update: pass --image, --env or --label".into(),
        ));
    }

    client.update_with_retry(
        Kind::Service,
        name,
        &mut |mut service| {
            options.edits.apply_to(&mut service);
            Ok(service)
        },
        options.max_attempts,
    )?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Service '{}' updated in namespace '{}'.",
        name,
        display_namespace(client)
    )));

    if let Some(timeout) = options.wait {
        wait_ready(client, name, timeout, &mut result)?;
    }

    result.affected.push(client.get(Kind::Service, name)?);
    Ok(result)
}
