use crate::config::ServingConfig;
use crate::error::{Result, ServingError};
use crate::model::{Resource, ResourceList};

pub mod config;
pub mod create;
pub mod delete;
pub mod describe;
pub mod helpers;
pub mod list;
pub mod update;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub affected: Vec<Resource>,
    pub listed: Option<ResourceList>,
    pub config: Option<ServingConfig>,
    pub messages: Vec<CmdMessage>,
    /// Per-object failures of a multi-object command.
    pub failures: Vec<String>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn add_failure(&mut self, error: &ServingError) {
        self.failures.push(error.to_string());
    }

    pub fn with_affected(mut self, resources: Vec<Resource>) -> Self {
        self.affected = resources;
        self
    }

    pub fn with_listed(mut self, list: ResourceList) -> Self {
        self.listed = Some(list);
        self
    }

    pub fn with_config(mut self, config: ServingConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Turns collected failures into one error, after the caller has shown the messages.
    pub fn check(&self) -> Result<()> {
        if self.failures.is_empty() {
            Ok(())
        } else {
            Err(ServingError::Multiple(self.failures.clone()))
        }
    }
}
