//! USB HID transport errors.
//!
//! The transport is reached through asynchronous ioctls. A submission can be
//! rejected synchronously, and a completion can report a negative status
//! later. Errors on the session itself (open, version detection, device
//! change) are fatal; errors on a single transfer are not.

use crate::common::ErrorSeverity;

/// Transport session and transfer errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The resource manager could not be opened
    #[error("Failed to open {path}: status {status}")]
    OpenFailed {
        /// Device node path
        path: String,
        /// Negative status returned by the open call
        status: i32,
    },

    /// Neither supported transport revision answered the version query
    #[error("Unsupported transport version {found:#010x}")]
    VersionMismatch {
        /// Version word reported by the transport
        found: u32,
    },

    /// The device change request failed
    #[error("Device change request failed: status {status}")]
    DeviceChange {
        /// Negative status delivered by the transport
        status: i32,
    },

    /// The attach-finish acknowledgement failed
    #[error("Attach finish failed: status {status}")]
    AttachFinish {
        /// Negative status delivered by the transport
        status: i32,
    },

    /// A request was rejected at submission time
    #[error("Submission of ioctl {ioctl} rejected: status {status}")]
    Submit {
        /// Ioctl number
        ioctl: u32,
        /// Negative status returned synchronously
        status: i32,
    },

    /// A transfer completed with a negative status
    #[error("Transfer completed with status {status}")]
    Completion {
        /// Negative status delivered by the completion
        status: i32,
    },

    /// The transport was closed before a request could be queued
    #[error("Transport closed")]
    Closed,
}

impl TransportError {
    /// Get the error severity.
    pub fn severity(&self) -> ErrorSeverity {
        if self.is_fatal() {
            ErrorSeverity::Critical
        } else {
            ErrorSeverity::Error
        }
    }

    /// Whether this error ends the whole transport session.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            TransportError::OpenFailed { .. }
                | TransportError::VersionMismatch { .. }
                | TransportError::DeviceChange { .. }
                | TransportError::AttachFinish { .. }
                | TransportError::Closed
        )
    }

    /// Create an open failure.
    pub fn open_failed(path: impl Into<String>, status: i32) -> Self {
        TransportError::OpenFailed {
            path: path.into(),
            status,
        }
    }

    /// Create a submission failure.
    pub fn submit(ioctl: u32, status: i32) -> Self {
        TransportError::Submit { ioctl, status }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_errors_are_fatal() {
        assert!(TransportError::open_failed("/dev/usb/hid", -6).is_fatal());
        assert!(TransportError::VersionMismatch { found: 0 }.is_fatal());
        assert!(TransportError::DeviceChange { status: -1 }.is_fatal());
        assert!(TransportError::AttachFinish { status: -1 }.is_fatal());
        assert!(TransportError::Closed.is_fatal());
    }

    #[test]
    fn test_transfer_errors_are_local() {
        assert!(!TransportError::submit(3, -4).is_fatal());
        assert!(!TransportError::Completion { status: -7022 }.is_fatal());
        assert_eq!(
            TransportError::Completion { status: -7022 }.severity(),
            ErrorSeverity::Error
        );
    }

    #[test]
    fn test_version_display_is_hex() {
        let msg = TransportError::VersionMismatch { found: 0x0003_0001 }.to_string();
        assert_eq!(msg, "Unsupported transport version 0x00030001");
    }
}
