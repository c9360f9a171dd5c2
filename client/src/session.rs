use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use callprobe_protocol::{classify, ClassifiedMessage, CALL_PREFIX};

use crate::config::SessionConfig;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Terminal failures when establishing the session.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to connect to {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: WsError,
    },
    #[error("failed to send call request: {0}")]
    CallRequest(#[source] WsError),
}

/// Session lifecycle. Disconnected is terminal; there is no reconnect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Connecting,
    Connected,
    Disconnected,
}

/// Why the receive loop ended.
#[derive(Debug)]
pub enum SessionEnd {
    /// An external stop request was observed.
    Stopped,
    /// The server closed the connection; a normal termination.
    PeerClosed,
    /// The receive channel failed abnormally.
    TransportError(WsError),
    /// `run` was called without a live connection.
    NotConnected,
}

/// Result of a completed receive loop.
#[derive(Debug)]
pub struct SessionSummary {
    pub packets_received: u64,
    pub end: SessionEnd,
}

/// Cross-task handle for requesting a session stop.
#[derive(Debug, Clone)]
pub struct StopHandle {
    stop: Arc<AtomicBool>,
}

impl StopHandle {
    /// Request the receive loop to exit. Idempotent; the loop observes the
    /// request within one receive wait interval.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}

/// One diagnostic call session over a persistent WebSocket connection.
///
/// The session exclusively owns the connection handle. The packet counter and
/// the stop flag are atomics so a signal task and the post-run summary can
/// read them from other tasks; only the receive loop mutates the counter.
pub struct Session {
    config: SessionConfig,
    conn: Option<WsStream>,
    state: SessionState,
    packets: Arc<AtomicU64>,
    stop: Arc<AtomicBool>,
}

impl Session {
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            conn: None,
            state: SessionState::Idle,
            packets: Arc::new(AtomicU64::new(0)),
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Connect to the signaling server and send the call request.
    ///
    /// Failure is terminal for this attempt; the caller decides whether to
    /// give up (there is no automatic retry).
    ///
    /// # Errors
    /// Returns `ClientError::Connect` if the WebSocket handshake fails and
    /// `ClientError::CallRequest` if the initial frame cannot be sent.
    pub async fn start(&mut self) -> Result<(), ClientError> {
        let url = format!(
            "ws://{}:{}",
            self.config.server_addr, self.config.server_port
        );
        self.state = SessionState::Connecting;
        info!("Connecting to {}...", url);

        let (mut ws, _response) = match connect_async(url.as_str()).await {
            Ok(pair) => pair,
            Err(source) => {
                self.state = SessionState::Disconnected;
                return Err(ClientError::Connect { url, source });
            }
        };
        self.state = SessionState::Connected;
        info!("Connection established with server");

        let request = format!("{CALL_PREFIX}{}", self.config.phone_number);
        if let Err(source) = ws.send(Message::Text(request.into())).await {
            self.state = SessionState::Disconnected;
            return Err(ClientError::CallRequest(source));
        }

        self.conn = Some(ws);
        Ok(())
    }

    /// Pump inbound frames until the peer closes, the transport fails, or a
    /// stop request is observed.
    ///
    /// Each received text frame is classified and handed to `on_message`
    /// together with the running media packet count. Decode problems never end
    /// the loop. Every exit path drops the connection handle exactly once and
    /// leaves the session Disconnected.
    pub async fn run<F>(&mut self, mut on_message: F) -> SessionSummary
    where
        F: FnMut(ClassifiedMessage, u64),
    {
        let Some(mut ws) = self.conn.take() else {
            warn!("run() called without an established connection");
            return self.finish(SessionEnd::NotConnected);
        };

        let end = loop {
            if self.stop.load(Ordering::Relaxed) {
                info!("Stop requested, leaving receive loop");
                break SessionEnd::Stopped;
            }

            let frame = match timeout(self.config.recv_timeout, ws.next()).await {
                // Idle interval; go back around to re-check the stop flag.
                Err(_) => continue,
                Ok(None) => break SessionEnd::PeerClosed,
                Ok(Some(Err(e))) => break SessionEnd::TransportError(e),
                Ok(Some(Ok(frame))) => frame,
            };

            match frame {
                Message::Text(text) => {
                    let msg = classify(text.as_str());
                    // Media-tagged frames count even when malformed; plain
                    // server text does not.
                    let count = match msg {
                        ClassifiedMessage::ControlText(_) => self.packets.load(Ordering::Relaxed),
                        _ => self.packets.fetch_add(1, Ordering::Relaxed) + 1,
                    };
                    on_message(msg, count);
                }
                Message::Close(_) => break SessionEnd::PeerClosed,
                other => debug!("Ignoring non-text frame: {:?}", other),
            }
        };

        let _ = ws.close(None).await;
        drop(ws);
        self.finish(end)
    }

    /// Request the receive loop to exit; see [`StopHandle::stop`].
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    /// Handle for stopping the session from another task.
    #[must_use]
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            stop: self.stop.clone(),
        }
    }

    /// Total media packets received so far. Safe to call from any task.
    #[must_use]
    pub fn packets_received(&self) -> u64 {
        self.packets.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether the session still holds the connection handle.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    fn finish(&mut self, end: SessionEnd) -> SessionSummary {
        self.state = SessionState::Disconnected;
        SessionSummary {
            packets_received: self.packets.load(Ordering::Relaxed),
            end,
        }
    }
}
