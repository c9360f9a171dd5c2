use std::time::{Duration, Instant};

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

use callprobe_client::config::SessionConfig;
use callprobe_client::session::{ClientError, Session, SessionEnd, SessionState};
use callprobe_protocol::ClassifiedMessage;

const TEST_TIMEOUT: Duration = Duration::from_millis(100);

/// Spawn a one-shot WebSocket server that records the call request, pushes the
/// given frames, and closes. Returns the port and the call request it saw.
async fn spawn_server(frames: Vec<&'static str>) -> (u16, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind listener");
    let port = listener.local_addr().expect("Failed to get address").port();

    let handle = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("Accept failed");
        let mut ws = accept_async(stream).await.expect("Handshake failed");

        let first = ws
            .next()
            .await
            .expect("No call request received")
            .expect("Receive failed");
        let call_request = first.into_text().expect("Call request not text");

        for frame in frames {
            ws.send(Message::Text(frame.into()))
                .await
                .expect("Send failed");
        }
        let _ = ws.close(None).await;

        call_request.as_str().to_string()
    });

    (port, handle)
}

fn test_session(port: u16, number: &str) -> Session {
    Session::new(
        SessionConfig::new("127.0.0.1".to_string(), port, number.to_string())
            .with_recv_timeout(TEST_TIMEOUT),
    )
}

/// Test that start() sends exactly one framed call request
#[tokio::test]
async fn start_sends_call_request() {
    let (port, server) = spawn_server(vec![]).await;
    let mut session = test_session(port, "5551234");

    session.start().await.expect("Start failed");
    let summary = session.run(|_, _| {}).await;

    assert!(matches!(summary.end, SessionEnd::PeerClosed));
    assert_eq!(server.await.expect("Server task failed"), "CALL:5551234");
}

/// Test that inbound frames are classified, dispatched, and counted
#[tokio::test]
async fn frames_are_classified_and_counted() {
    let frames = vec!["hello", "RTP:zzzz", "RTP:80e0000100000002000000030102"];
    let (port, server) = spawn_server(frames).await;
    let mut session = test_session(port, "0938220136");
    session.start().await.expect("Start failed");

    let mut seen = Vec::new();
    let summary = session.run(|msg, count| seen.push((msg, count))).await;

    assert!(matches!(summary.end, SessionEnd::PeerClosed));
    // Media-tagged frames count even when malformed; control text does not.
    assert_eq!(summary.packets_received, 2);
    assert_eq!(session.packets_received(), 2);

    assert_eq!(seen.len(), 3);
    assert_eq!(
        seen[0].0,
        ClassifiedMessage::ControlText("hello".to_string())
    );
    assert_eq!(seen[0].1, 0);

    assert!(matches!(seen[1].0, ClassifiedMessage::Malformed(_)));
    assert_eq!(seen[1].1, 1);

    let ClassifiedMessage::MediaPacket(packet) = &seen[2].0 else {
        panic!("expected media packet, got {:?}", seen[2].0);
    };
    assert_eq!(packet.sequence, 1);
    assert_eq!(packet.payload, vec![0x01, 0x02]);
    assert_eq!(seen[2].1, 2);

    server.await.expect("Server task failed");
}

/// Test that a decode failure does not end the loop and later frames survive
#[tokio::test]
async fn malformed_frame_does_not_abort_session() {
    let frames = vec!["RTP:80000001", "RTP:800000010000000200000003"];
    let (port, server) = spawn_server(frames).await;
    let mut session = test_session(port, "0938220136");
    session.start().await.expect("Start failed");

    let mut media = 0;
    let mut malformed = 0;
    let summary = session
        .run(|msg, _| match msg {
            ClassifiedMessage::MediaPacket(_) => media += 1,
            ClassifiedMessage::Malformed(_) => malformed += 1,
            ClassifiedMessage::ControlText(_) => {}
        })
        .await;

    assert!(matches!(summary.end, SessionEnd::PeerClosed));
    assert_eq!(media, 1);
    assert_eq!(malformed, 1);
    server.await.expect("Server task failed");
}

/// Test that stop() before any frame ends the idle loop within one interval
#[tokio::test]
async fn stop_ends_idle_loop_within_one_interval() {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind listener");
    let port = listener.local_addr().expect("Failed to get address").port();

    // Server that sends nothing and holds the connection open.
    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("Accept failed");
        let mut ws = accept_async(stream).await.expect("Handshake failed");
        while let Some(Ok(_)) = ws.next().await {}
    });

    let mut session = test_session(port, "0938220136");
    session.start().await.expect("Start failed");
    session.stop();

    let started = Instant::now();
    let summary = session.run(|_, _| panic!("no frames expected")).await;

    assert!(matches!(summary.end, SessionEnd::Stopped));
    assert_eq!(summary.packets_received, 0);
    assert!(started.elapsed() < TEST_TIMEOUT * 5);
    assert_eq!(session.state(), SessionState::Disconnected);

    server.abort();
}

/// Test that peer close leaves the session Disconnected with the handle released
#[tokio::test]
async fn peer_close_releases_connection() {
    let (port, server) = spawn_server(vec!["bye"]).await;
    let mut session = test_session(port, "0938220136");

    assert_eq!(session.state(), SessionState::Idle);
    session.start().await.expect("Start failed");
    assert_eq!(session.state(), SessionState::Connected);
    assert!(session.is_connected());

    let summary = session.run(|_, _| {}).await;

    assert!(matches!(summary.end, SessionEnd::PeerClosed));
    assert_eq!(session.state(), SessionState::Disconnected);
    assert!(!session.is_connected());

    // A second run has no handle left to consume.
    let again = session.run(|_, _| panic!("no frames expected")).await;
    assert!(matches!(again.end, SessionEnd::NotConnected));

    server.await.expect("Server task failed");
}

/// Test that a refused connection surfaces a terminal connect error
#[tokio::test]
async fn connect_failure_is_terminal() {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind listener");
    let port = listener.local_addr().expect("Failed to get address").port();
    drop(listener);

    let mut session = test_session(port, "0938220136");
    let err = session.start().await.expect_err("Connect should fail");

    assert!(matches!(err, ClientError::Connect { .. }));
    assert_eq!(session.state(), SessionState::Disconnected);
    assert_eq!(session.packets_received(), 0);
}

/// Test that stop is idempotent and may be requested before start
#[tokio::test]
async fn stop_is_idempotent_and_valid_before_start() {
    let (port, server) = spawn_server(vec!["RTP:800000010000000200000003"]).await;
    let mut session = test_session(port, "0938220136");

    let handle = session.stop_handle();
    handle.stop();
    handle.stop();
    session.stop();

    session.start().await.expect("Start failed");
    let summary = session
        .run(|_, _| panic!("loop should exit before any dispatch"))
        .await;

    assert!(matches!(summary.end, SessionEnd::Stopped));
    assert_eq!(summary.packets_received, 0);

    server.abort();
}
