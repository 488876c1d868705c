//! Report decode errors.

/// Errors raised while decoding a raw input report.
///
/// A decode error never clears the slot's cached record; the previous
/// translated state stays visible to the host.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The report was shorter than the family's layout
    #[error("report too short: got {got} bytes, need {need}")]
    TooShort {
        /// Bytes received
        got: usize,
        /// Bytes required
        need: usize,
    },

    /// A composite device reported a sub-type with no decoder
    #[error("unrecognized sub-type {0:#04x}")]
    UnknownSubtype(u8),

    /// A framed packet did not match any known header
    #[error("unexpected packet id={id:#04x} kind={kind:#04x}")]
    UnexpectedPacket {
        /// Packet id byte
        id: u8,
        /// Packet type byte
        kind: u8,
    },
}
