use crate::error::ProtocolError;
use crate::io::{Reader, Writer};

/// Size of the fixed RTP header in bytes.
pub const RTP_HEADER_LEN: usize = 12;

/// A decoded RTP-style media packet.
///
/// Wire layout (RFC 3550 fixed header, big-endian):
///
/// ```text
/// byte 0: [version:2][padding:1][extension:1][csrc_count:4]
/// byte 1: [marker:1][payload_type:7]
/// bytes 2-3:  sequence number
/// bytes 4-7:  timestamp
/// bytes 8-11: synchronization source (SSRC)
/// ```
///
/// Everything after the first 12 bytes is carried as opaque payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RtpPacket {
    pub version: u8,
    pub padding: bool,
    pub extension: bool,
    pub csrc_count: u8,
    pub marker: bool,
    pub payload_type: u8,
    pub sequence: u16,
    pub timestamp: u32,
    pub ssrc: u32,
    pub payload: Vec<u8>,
}

impl RtpPacket {
    /// Decode a packet from raw bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::IncompletePacket` if fewer than 12 bytes are given.
    pub fn decode(data: &[u8]) -> Result<Self, ProtocolError> {
        if data.len() < RTP_HEADER_LEN {
            return Err(ProtocolError::IncompletePacket { got: data.len() });
        }

        let mut r = Reader::new(data);
        let flags = r.read_u8()?;
        let marker_pt = r.read_u8()?;

        Ok(Self {
            version: (flags >> 6) & 0x03,
            padding: flags & 0x20 != 0,
            extension: flags & 0x10 != 0,
            csrc_count: flags & 0x0F,
            marker: marker_pt & 0x80 != 0,
            payload_type: marker_pt & 0x7F,
            sequence: r.read_u16()?,
            timestamp: r.read_u32()?,
            ssrc: r.read_u32()?,
            payload: r.remaining().to_vec(),
        })
    }

    /// Re-encode the fixed 12-byte header from the decoded fields.
    #[must_use]
    pub fn encode_header(&self) -> Vec<u8> {
        let mut w = Writer::new();
        w.write_u8(
            (self.version << 6)
                | (u8::from(self.padding) << 5)
                | (u8::from(self.extension) << 4)
                | (self.csrc_count & 0x0F),
        );
        w.write_u8((u8::from(self.marker) << 7) | (self.payload_type & 0x7F));
        w.write_u16(self.sequence);
        w.write_u32(self.timestamp);
        w.write_u32(self.ssrc);
        w.into_vec()
    }

    /// Encode the full packet (header followed by payload).
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut w = Writer::new();
        w.write_bytes(&self.encode_header());
        w.write_bytes(&self.payload);
        w.into_vec()
    }
}
