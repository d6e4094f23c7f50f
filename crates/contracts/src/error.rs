//! Layered error definitions
//!
//! Categorized by source: handle / control / calibration / config

use thiserror::Error;

use crate::CalibrationKind;

/// Invalid argument
pub const EINVAL: i32 = 22;
/// I/O error
pub const EIO: i32 = 5;

/// Unified error type
#[derive(Debug, Error)]
pub enum HubError {
    // ===== Caller Errors =====
    /// Handle does not map to a known sensor
    #[error("invalid sensor handle: {handle}")]
    InvalidHandle { handle: i32 },

    /// Argument rejected before any state was touched
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    // ===== Device Errors =====
    /// Control-channel write failed
    #[error("control '{operation}' failed: {source}")]
    ControlIo {
        operation: &'static str,
        #[source]
        source: ControlFault,
    },

    /// Calibration data missing or malformed
    #[error("calibration error for {kind:?}: {message}")]
    Calibration {
        kind: CalibrationKind,
        message: String,
    },

    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== General Errors =====
    /// Control lock was poisoned by a panicking holder
    #[error("control lock poisoned")]
    LockPoisoned,

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl HubError {
    /// Create invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create calibration error
    pub fn calibration(kind: CalibrationKind, message: impl Into<String>) -> Self {
        Self::Calibration {
            kind,
            message: message.into(),
        }
    }

    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Negative errno for the C-style surface
    pub fn errno(&self) -> i32 {
        match self {
            HubError::InvalidHandle { .. }
            | HubError::InvalidArgument { .. }
            | HubError::ConfigParse { .. }
            | HubError::ConfigValidation { .. } => -EINVAL,
            _ => -EIO,
        }
    }
}

/// Control-channel failure
///
/// `Unavailable` means no write descriptor was obtained; `WriteFailed` means
/// the descriptor was obtained but the write itself failed.
#[derive(Debug, Error)]
pub enum ControlFault {
    #[error("control file unavailable: {0}")]
    Unavailable(#[source] std::io::Error),

    #[error("control write failed: {0}")]
    WriteFailed(#[source] std::io::Error),
}

impl ControlFault {
    /// Whether a write descriptor had been obtained
    pub fn descriptor_obtained(&self) -> bool {
        matches!(self, ControlFault::WriteFailed(_))
    }
}
