use tracing::{error, info, warn};

use callprobe_client::config::{self, SessionConfig, PAYLOAD_PREVIEW_LEN, STATS_INTERVAL};
use callprobe_client::session::{Session, SessionEnd};
use callprobe_protocol::ClassifiedMessage;

fn print_message(msg: ClassifiedMessage, count: u64) {
    match msg {
        ClassifiedMessage::ControlText(text) => println!("[SERVER] {text}"),
        ClassifiedMessage::MediaPacket(packet) => {
            println!("\n--- RTP Packet #{count} ---");
            println!("Header: {}", hex::encode(packet.encode_header()));
            println!(
                "Version: {}, Padding: {}, Extension: {}, CSRC Count: {}",
                packet.version,
                u8::from(packet.padding),
                u8::from(packet.extension),
                packet.csrc_count
            );
            println!(
                "Marker: {}, Payload Type: {}, Sequence Number: {}",
                u8::from(packet.marker),
                packet.payload_type,
                packet.sequence
            );
            println!("Timestamp: {}, SSRC: {}", packet.timestamp, packet.ssrc);
            println!("Payload Size: {} bytes", packet.payload.len());

            let preview = packet.payload.len().min(PAYLOAD_PREVIEW_LEN);
            println!(
                "Payload (first {PAYLOAD_PREVIEW_LEN} bytes): {}",
                hex::encode(&packet.payload[..preview])
            );

            if count % STATS_INTERVAL == 0 {
                info!("Received {} RTP packets so far", count);
            }
        }
        ClassifiedMessage::Malformed(reason) => warn!("Dropped media frame: {}", reason),
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1);
    let server = args.next().unwrap_or_else(config::server_addr);
    let port = args
        .next()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(config::server_port);
    let number = args.next().unwrap_or_else(config::phone_number);

    info!("Starting callprobe client");
    info!("Server: {}:{}", server, port);
    info!("Target phone number: {}", number);
    info!("Press Ctrl+C to exit");

    let mut session = Session::new(SessionConfig::new(server, port, number.clone()));

    let stop = session.stop_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, exiting...");
            stop.stop();
        }
    });

    match session.start().await {
        Ok(()) => {
            info!("Call request sent to {}", number);
            let summary = session.run(print_message).await;
            match summary.end {
                SessionEnd::PeerClosed => info!("Connection closed by server"),
                SessionEnd::Stopped => info!("Receive loop stopped"),
                SessionEnd::TransportError(e) => error!("Receive error: {}", e),
                SessionEnd::NotConnected => {}
            }
        }
        Err(e) => error!("{}", e),
    }

    info!("Disconnected from server");
    info!("Total RTP packets received: {}", session.packets_received());
}
