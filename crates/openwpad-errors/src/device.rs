//! Per-slot device errors.
//!
//! These never propagate past the slot they occurred on. The enumeration
//! layer treats a slot that reported one as detached on its next pass.

use crate::common::ErrorSeverity;

/// Device slot errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeviceError {
    /// No registered family claims the device
    #[error("Unsupported device: vendor={vendor_id:#06x}, product={product_id:#06x}")]
    Unsupported {
        /// USB vendor ID
        vendor_id: u16,
        /// USB product ID
        product_id: u16,
    },

    /// Every slot is occupied
    #[error("No free slot for device {dev_id:#x}")]
    NoFreeSlot {
        /// Transport device id
        dev_id: u32,
    },

    /// The device has no usable HID interrupt endpoint
    #[error("Device {dev_id:#x} has no HID interrupt IN endpoint")]
    EndpointMissing {
        /// Transport device id
        dev_id: u32,
    },

    /// The family's init step failed
    #[error("Failed to initialize slot {slot}: {reason}")]
    InitFailed {
        /// Slot index
        slot: usize,
        /// Failure reason
        reason: String,
    },

    /// A transfer for this slot failed and the poll loop stopped
    #[error("Transfer on slot {slot} failed: status {status}")]
    TransferFailed {
        /// Slot index
        slot: usize,
        /// Negative transport status
        status: i32,
    },

    /// A completion arrived for a slot that was recycled meanwhile
    #[error("Stale completion for slot {slot}")]
    StaleCompletion {
        /// Slot index
        slot: usize,
    },

    /// Slot index outside the registry
    #[error("Invalid slot {0}")]
    InvalidSlot(usize),
}

impl DeviceError {
    /// Get the error severity.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            DeviceError::Unsupported { .. } => ErrorSeverity::Info,
            DeviceError::StaleCompletion { .. } => ErrorSeverity::Info,
            DeviceError::NoFreeSlot { .. } => ErrorSeverity::Warning,
            DeviceError::TransferFailed { .. } => ErrorSeverity::Warning,
            DeviceError::EndpointMissing { .. } => ErrorSeverity::Error,
            DeviceError::InitFailed { .. } => ErrorSeverity::Error,
            DeviceError::InvalidSlot(_) => ErrorSeverity::Error,
        }
    }

    /// Create an unsupported device error.
    pub fn unsupported(vendor_id: u16, product_id: u16) -> Self {
        DeviceError::Unsupported {
            vendor_id,
            product_id,
        }
    }

    /// Create an init failure.
    pub fn init_failed(slot: usize, reason: impl Into<String>) -> Self {
        DeviceError::InitFailed {
            slot,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_error_severity() {
        assert_eq!(
            DeviceError::unsupported(0x1234, 0x5678).severity(),
            ErrorSeverity::Info
        );
        assert_eq!(
            DeviceError::TransferFailed {
                slot: 0,
                status: -4
            }
            .severity(),
            ErrorSeverity::Warning
        );
        assert_eq!(
            DeviceError::init_failed(1, "control transfer rejected").severity(),
            ErrorSeverity::Error
        );
    }

    #[test]
    fn test_device_error_display() {
        let msg = DeviceError::unsupported(0x12ba, 0x0100).to_string();
        assert!(msg.contains("0x12ba"));
        assert!(msg.contains("0x0100"));
    }

    #[test]
    fn test_device_error_is_std_error() {
        let err = DeviceError::InvalidSlot(7);
        let _: &dyn std::error::Error = &err;
    }
}
