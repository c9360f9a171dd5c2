use crate::error::ProtocolError;
use crate::packet::RtpPacket;

/// Prefix of the outbound call-initiation frame.
pub const CALL_PREFIX: &str = "CALL:";

/// Prefix marking an inbound frame as a hex-encoded media packet.
pub const RTP_PREFIX: &str = "RTP:";

/// How much of an undecodable hex string is kept for diagnostics.
const HEX_PREVIEW_LEN: usize = 30;

/// One inbound frame, classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifiedMessage {
    /// Opaque server text, passed through unmodified.
    ControlText(String),
    /// A decoded media packet.
    MediaPacket(RtpPacket),
    /// A media-tagged frame that failed to decode; the reason is human-readable.
    Malformed(String),
}

/// Classify one inbound text frame.
///
/// Frames prefixed with `RTP:` carry a hex-encoded media packet; everything
/// else is opaque control text. Decode failures are folded into
/// [`ClassifiedMessage::Malformed`] so the caller's receive loop stays linear.
#[must_use]
pub fn classify(frame: &str) -> ClassifiedMessage {
    let Some(hex_data) = frame.strip_prefix(RTP_PREFIX) else {
        return ClassifiedMessage::ControlText(frame.to_string());
    };

    let bytes = match hex::decode(hex_data) {
        Ok(bytes) => bytes,
        Err(_) => {
            let err = ProtocolError::InvalidHex {
                preview: hex_data.chars().take(HEX_PREVIEW_LEN).collect(),
            };
            return ClassifiedMessage::Malformed(err.to_string());
        }
    };

    match RtpPacket::decode(&bytes) {
        Ok(packet) => ClassifiedMessage::MediaPacket(packet),
        Err(e) => ClassifiedMessage::Malformed(e.to_string()),
    }
}
