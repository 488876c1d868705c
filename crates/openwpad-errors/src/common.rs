//! Top-level error type and classification shared by every OpenWPAD crate.

use core::fmt;

use crate::{DecodeError, DeviceError, TransportError};

/// Top-level error wrapping every bridge sub-error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BridgeError {
    /// Transport session or transfer errors
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Per-slot device errors
    #[error("Device error: {0}")]
    Device(#[from] DeviceError),

    /// Report decode errors
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl BridgeError {
    /// Get the error category for classification.
    pub fn category(&self) -> ErrorCategory {
        match self {
            BridgeError::Transport(_) => ErrorCategory::Transport,
            BridgeError::Device(_) => ErrorCategory::Device,
            BridgeError::Decode(_) => ErrorCategory::Decode,
            BridgeError::Config(_) => ErrorCategory::Config,
        }
    }

    /// Get the error severity level.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            BridgeError::Transport(e) => e.severity(),
            BridgeError::Device(e) => e.severity(),
            BridgeError::Decode(_) => ErrorSeverity::Warning,
            BridgeError::Config(_) => ErrorSeverity::Error,
        }
    }

    /// Whether the bridge can keep running after this error.
    ///
    /// Only transport session failures are unrecoverable.
    pub fn is_recoverable(&self) -> bool {
        self.severity() < ErrorSeverity::Critical
    }

    /// Create a configuration error with a message.
    pub fn config(msg: impl Into<String>) -> Self {
        BridgeError::Config(msg.into())
    }
}

/// Error category for classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorCategory {
    /// Transport session or transfer errors
    Transport = 0,
    /// Device slot errors
    Device = 1,
    /// Report decode errors
    Decode = 2,
    /// Configuration errors
    Config = 3,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Transport => write!(f, "Transport"),
            ErrorCategory::Device => write!(f, "Device"),
            ErrorCategory::Decode => write!(f, "Decode"),
            ErrorCategory::Config => write!(f, "Config"),
        }
    }
}

/// Error severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ErrorSeverity {
    /// Informational; nothing to act on
    Info = 0,
    /// Local and self-healing
    Warning = 1,
    /// Operation failed; the rest of the bridge is unaffected
    Error = 2,
    /// The transport session is gone
    Critical = 3,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}
