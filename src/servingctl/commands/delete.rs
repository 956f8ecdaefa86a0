use crate::client::ServingClient;
use crate::commands::helpers::display_namespace;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::{Result, ServingError};
use crate::model::Kind;
use std::time::Duration;

/// Deletes each name in turn. Failures do not stop the run; they are collected in
/// [`CmdResult::failures`].
pub fn run<I: AsRef<str>>(
    client: &dyn ServingClient,
    kind: Kind,
    names: &[I],
    timeout: Duration,
) -> Result<CmdResult> {
    if names.is_empty() {
        return Err(ServingError::Invalid(format!(
            "'{} delete' requires one or more {} names",
            kind, kind
        )));
    }

    let mut result = CmdResult::default();
    for name in names {
        let name = name.as_ref();
        match client.delete(kind, name, timeout) {
            Ok(()) => result.add_message(CmdMessage::success(format!(
                "{} '{}' deleted in namespace '{}'.",
                kind.type_name(),
                name,
                display_namespace(client)
            ))),
            Err(err) => {
                tracing::debug!(%kind, name, error = %err, "delete failed");
                result.add_failure(&err);
            }
        }
    }
    Ok(result)
}
