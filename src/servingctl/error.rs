use crate::model::Kind;
use std::fmt;
use thiserror::Error;

/// Client operations, used to name what an unsupported call attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Get,
    List,
    Create,
    Update,
    Delete,
    Watch,
    WaitFor,
    Apply,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Get => "get",
            Operation::List => "list",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::Watch => "watch",
            Operation::WaitFor => "wait",
            Operation::Apply => "apply",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum ServingError {
    #[error("{kind} \"{name}\" not found")]
    NotFound { kind: Kind, name: String },

    #[error("{kind} \"{name}\" already exists")]
    AlreadyExists { kind: Kind, name: String },

    #[error("operation cannot be fulfilled on {kind} \"{name}\": the object has been modified; please apply your changes to the latest version and try again")]
    Conflict { kind: Kind, name: String },

    #[error("can't update {kind} \"{name}\" because it has been marked for deletion")]
    MarkedForDeletion { kind: Kind, name: String },

    #[error("{operation} is not supported in {mode} mode")]
    Unsupported {
        operation: Operation,
        mode: &'static str,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Decode(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Walk(#[from] walkdir::Error),

    #[error("Invalid argument: {0}")]
    Invalid(String),

    #[error("Config error: {0}")]
    Config(String),

    /// Failures collected from a command acting on several objects.
    #[error("{}", .0.join("\nError: "))]
    Multiple(Vec<String>),
}

impl ServingError {
    pub fn not_found(kind: Kind, name: impl Into<String>) -> Self {
        ServingError::NotFound {
            kind,
            name: name.into(),
        }
    }

    pub fn unsupported(operation: Operation, mode: &'static str) -> Self {
        ServingError::Unsupported { operation, mode }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ServingError::NotFound { .. })
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, ServingError::Unsupported { .. })
    }

    /// Whether an update that failed this way may succeed on a fresh attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            ServingError::Conflict { .. } => true,
            ServingError::Io(e) => e.kind() != std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, ServingError>;
