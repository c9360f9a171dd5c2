use std::fmt;

/// Media packet decoding errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    PacketTooShort { expected: usize, got: usize },
    IncompletePacket { got: usize },
    InvalidHex { preview: String },
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::PacketTooShort { expected, got } => {
                write!(f, "packet too short: expected at least {} bytes, got {}", expected, got)
            }
            ProtocolError::IncompletePacket { got } => {
                write!(f, "incomplete packet: {} bytes", got)
            }
            ProtocolError::InvalidHex { preview } => {
                write!(f, "invalid hex data: {}", preview)
            }
        }
    }
}

impl std::error::Error for ProtocolError {}
