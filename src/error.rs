use std::fmt;
use thiserror::Error;

use crate::schema_registry::RegistryError;
use crate::schema_version::SchemaVersionError;

/// Broad classification of a [`MigrationError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Parsing,
    Validation,
    Migration,
    Io,
    Unsupported,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorKind::Parsing => "Parsing",
            ErrorKind::Validation => "Validation",
            ErrorKind::Migration => "Migration",
            ErrorKind::Io => "IO",
            ErrorKind::Unsupported => "Unsupported",
        };
        f.write_str(label)
    }
}

/// Errors surfaced by parsing, canonicalization and migration.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("{}", located(ErrorKind::Parsing, .message, &None))]
    Parsing {
        message: String,
        element_path: Option<String>,
    },

    #[error("Parsing error: malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("{}", located(ErrorKind::Validation, .message, .item_id))]
    Validation {
        message: String,
        item_id: Option<String>,
        element_path: Option<String>,
    },

    #[error("{}", located(ErrorKind::Migration, .message, .item_id))]
    Migration {
        message: String,
        item_id: Option<String>,
        details: Option<String>,
    },

    #[error("IO error: {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported error: unsupported QTI version: {0}")]
    UnsupportedVersion(String),

    #[error("Unsupported error: unsupported migration path from {from} to {to}")]
    UnsupportedPath { from: String, to: String },
}

fn located(kind: ErrorKind, message: &str, item_id: &Option<String>) -> String {
    match item_id {
        Some(item) => format!("[{}] {} error: {}", item, kind, message),
        None => format!("{} error: {}", kind, message),
    }
}

impl MigrationError {
    pub fn parsing(message: impl Into<String>) -> Self {
        MigrationError::Parsing {
            message: message.into(),
            element_path: None,
        }
    }

    pub fn parsing_at(message: impl Into<String>, element_path: impl Into<String>) -> Self {
        MigrationError::Parsing {
            message: message.into(),
            element_path: Some(element_path.into()),
        }
    }

    /// Failure reading or writing `path` ("-" for the standard streams).
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        MigrationError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        MigrationError::Validation {
            message: message.into(),
            item_id: None,
            element_path: None,
        }
    }

    pub fn migration(message: impl Into<String>) -> Self {
        MigrationError::Migration {
            message: message.into(),
            item_id: None,
            details: None,
        }
    }

    /// Attach the owning item to errors that can carry one.
    pub fn with_item(self, item: impl Into<String>) -> Self {
        match self {
            MigrationError::Validation {
                message,
                element_path,
                ..
            } => MigrationError::Validation {
                message,
                item_id: Some(item.into()),
                element_path,
            },
            MigrationError::Migration {
                message, details, ..
            } => MigrationError::Migration {
                message,
                item_id: Some(item.into()),
                details,
            },
            other => other,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            MigrationError::Parsing { .. } | MigrationError::Xml(_) => ErrorKind::Parsing,
            MigrationError::Validation { .. } => ErrorKind::Validation,
            MigrationError::Migration { .. } => ErrorKind::Migration,
            MigrationError::Io { .. } => ErrorKind::Io,
            MigrationError::UnsupportedVersion(_) | MigrationError::UnsupportedPath { .. } => {
                ErrorKind::Unsupported
            }
        }
    }

    pub fn item_id(&self) -> Option<&str> {
        match self {
            MigrationError::Validation { item_id, .. }
            | MigrationError::Migration { item_id, .. } => item_id.as_deref(),
            _ => None,
        }
    }

    pub fn element_path(&self) -> Option<&str> {
        match self {
            MigrationError::Parsing { element_path, .. }
            | MigrationError::Validation { element_path, .. } => element_path.as_deref(),
            _ => None,
        }
    }
}

impl From<SchemaVersionError> for MigrationError {
    fn from(err: SchemaVersionError) -> Self {
        match err {
            SchemaVersionError::Unsupported(version) => MigrationError::UnsupportedVersion(version),
            SchemaVersionError::InvalidFormat(version) => MigrationError::UnsupportedVersion(version),
        }
    }
}

impl From<RegistryError> for MigrationError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::NoCanonicalizer(family) => {
                MigrationError::UnsupportedVersion(family.canonical_version().to_string())
            }
            RegistryError::NoRuleSet(from, to) => MigrationError::UnsupportedPath {
                from: from.canonical_version().to_string(),
                to: to.canonical_version().to_string(),
            },
        }
    }
}
