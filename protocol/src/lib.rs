//! Wire framing and RTP packet decoding for the callprobe diagnostic client.
//!
//! The signaling protocol is text-framed: the client sends a single
//! `CALL:<number>` frame, then every inbound frame is either opaque server
//! text or an `RTP:`-prefixed hex-encoded media packet. This crate is pure
//! codec logic; it owns no sockets and keeps no state.

pub mod error;
pub mod frame;
mod io;
pub mod packet;

pub use error::ProtocolError;
pub use frame::{classify, ClassifiedMessage, CALL_PREFIX, RTP_PREFIX};
pub use packet::{RtpPacket, RTP_HEADER_LEN};
