use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    User,
    Group,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::User => write!(f, "user"),
            EntityKind::Group => write!(f, "group"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("This script must be run as root")]
    Privilege,

    #[error("failed to look up {kind} {name}: {source}")]
    Lookup {
        kind: EntityKind,
        name: String,
        #[source]
        source: nix::Error,
    },

    #[error("command {program} {} failed with status {}", .args.join(" "), describe_code(.code))]
    Tool {
        program: String,
        args: Vec<String>,
        code: Option<i32>,
    },

    #[error("failed to execute {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("group {0} does not exist")]
    UnknownGroup(String),

    #[error("failed to {operation} {}: {source}", .path.display())]
    Filesystem {
        path: PathBuf,
        operation: &'static str,
        #[source]
        source: io::Error,
    },
}

impl ProvisionError {
    pub fn filesystem(path: impl Into<PathBuf>, operation: &'static str, source: io::Error) -> Self {
        ProvisionError::Filesystem {
            path: path.into(),
            operation,
            source,
        }
    }
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "signal".to_string(),
    }
}

pub type Result<T, E = ProvisionError> = std::result::Result<T, E>;
