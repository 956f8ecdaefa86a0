//! Optimistic update loop shared by every client.
//!
//! Each attempt re-reads the object, hands it to the caller's mutator and writes the
//! result back. There is no lock: another writer can still slip in between the read
//! and the write of one attempt. The bound only limits how many times we try.

use super::{ServingClient, UpdateFn};
use crate::error::{Result, ServingError};
use crate::model::Kind;

/// How a [`retry_update`] run ended.
#[derive(Debug)]
pub enum UpdateOutcome {
    Updated { attempts: usize },
    /// Stopped on an error that another attempt would not fix.
    Aborted(ServingError),
    /// Every attempt hit a retryable error; `last` is the final one.
    Exhausted { attempts: usize, last: ServingError },
}

impl UpdateOutcome {
    pub fn into_result(self) -> Result<()> {
        match self {
            UpdateOutcome::Updated { .. } => Ok(()),
            UpdateOutcome::Aborted(err) => Err(err),
            UpdateOutcome::Exhausted { last, .. } => Err(last),
        }
    }
}

pub fn retry_update<C: ServingClient + ?Sized>(
    client: &C,
    kind: Kind,
    name: &str,
    mutate: &mut UpdateFn<'_>,
    max_attempts: usize,
) -> UpdateOutcome {
    let max_attempts = max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;

        let current = match client.get(kind, name) {
            Ok(current) => current,
            Err(err) => return UpdateOutcome::Aborted(err),
        };
        if current.metadata.deletion_timestamp.is_some() {
            return UpdateOutcome::Aborted(ServingError::MarkedForDeletion {
                kind,
                name: name.to_string(),
            });
        }

        let updated = match mutate(current) {
            Ok(updated) => updated,
            Err(err) => return UpdateOutcome::Aborted(err),
        };

        match client.update(kind, &updated) {
            Ok(()) => {
                tracing::debug!(%kind, name, attempt, "update committed");
                return UpdateOutcome::Updated { attempts: attempt };
            }
            Err(err) if err.is_retryable() && attempt < max_attempts => {
                tracing::debug!(%kind, name, attempt, error = %err, "update failed, retrying");
            }
            Err(err) if err.is_retryable() => {
                tracing::warn!(%kind, name, attempts = attempt, error = %err, "giving up on update");
                return UpdateOutcome::Exhausted {
                    attempts: attempt,
                    last: err,
                };
            }
            Err(err) => return UpdateOutcome::Aborted(err),
        }
    }
}
