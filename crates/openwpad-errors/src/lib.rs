//! Error types for the OpenWPAD bridge.
//!
//! Failures fall into four groups, and each group has its own type:
//!
//! - [`TransportError`]: the USB HID transport session itself failed. Session
//!   failures are fatal and are not retried at this layer.
//! - [`DeviceError`]: something went wrong with one bound device slot. These
//!   are local; the slot is recycled on the next enumeration pass.
//! - [`DecodeError`]: a report had an unexpected length or sub-type. The
//!   previous translated state is kept.
//! - An unclaimed device (no family matches its ids) is reported as
//!   [`DeviceError::Unsupported`] and simply left unbound.
//!
//! [`BridgeError`] wraps all of them and classifies by [`ErrorSeverity`].
//!
//! # Example
//!
//! ```
//! use openwpad_errors::{BridgeError, TransportError};
//!
//! let err: BridgeError = TransportError::VersionMismatch { found: 0x0003_0000 }.into();
//! assert!(!err.is_recoverable());
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod common;
pub mod decode;
pub mod device;
pub mod transport;

pub use common::{BridgeError, ErrorCategory, ErrorSeverity};
pub use decode::DecodeError;
pub use device::DeviceError;
pub use transport::TransportError;

/// A specialized `Result` type for bridge operations.
pub type Result<T> = std::result::Result<T, BridgeError>;
