// file: src/error.rs
// version: 3.0.0
// guid: 57b83a63-07b6-4534-aa6c-51e8797254e0

use crate::provision::Phase;
use thiserror::Error;

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, ProvisionError>;

/// Error types for the vsftpd provisioner
#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Root privilege, supported platform or free space check failed
    #[error("Prerequisite check failed: {0}")]
    PreconditionError(String),

    #[error("Command '{command}' failed with exit code {exit_code:?}: {stderr}")]
    ProcessError {
        command: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("Invalid input: {0}")]
    InputError(String),

    #[error("System error: {0}")]
    SystemError(String),

    #[error("Phase {} ({}) failed: {source}", phase.number(), phase.title())]
    PhaseFailed {
        phase: Phase,
        #[source]
        source: Box<ProvisionError>,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl ProvisionError {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Create a new validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    /// Create a new prerequisite failure
    pub fn precondition(msg: impl Into<String>) -> Self {
        Self::PreconditionError(msg.into())
    }

    /// Create a new user input error
    pub fn input(msg: impl Into<String>) -> Self {
        Self::InputError(msg.into())
    }

    /// Create a new system error
    pub fn system(msg: impl Into<String>) -> Self {
        Self::SystemError(msg.into())
    }

    /// True when the error (or the error a failed phase wraps) is a prerequisite failure
    pub fn is_precondition(&self) -> bool {
        match self {
            Self::PreconditionError(_) => true,
            Self::PhaseFailed { source, .. } => source.is_precondition(),
            _ => false,
        }
    }

    /// Process exit status for this error.
    ///
    /// Prerequisite failures exit with 1; every other failure (a phase that
    /// broke mid-pipeline, bad input, bad configuration) exits with 2.
    pub fn exit_code(&self) -> u8 {
        if self.is_precondition() {
            1
        } else {
            2
        }
    }
}
