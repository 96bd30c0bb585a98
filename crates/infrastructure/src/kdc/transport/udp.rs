//! Kerberos over UDP (RFC 4120 §7.2.1)
//!
//! The message goes out as a single datagram with no framing. There is no
//! retransmission; the caller's candidate list supplies retries.

use kdc_proxy_domain::DomainError;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use tokio::net::UdpSocket;
use tracing::debug;

const MAX_DATAGRAM_SIZE: usize = 65_535;

pub async fn exchange(
    server: &str,
    addr: SocketAddr,
    message: &[u8],
    max_reply: usize,
) -> Result<Vec<u8>, DomainError> {
    let bind_addr: SocketAddr = if addr.is_ipv4() {
        (Ipv4Addr::UNSPECIFIED, 0).into()
    } else {
        (Ipv6Addr::UNSPECIFIED, 0).into()
    };

    let socket = UdpSocket::bind(bind_addr)
        .await
        .map_err(|e| io_error(server, "bind", e))?;
    // Connected sockets drop datagrams from any other peer.
    socket
        .connect(addr)
        .await
        .map_err(|e| io_error(server, "connect", e))?;

    let bytes_sent = socket
        .send(message)
        .await
        .map_err(|e| io_error(server, "send", e))?;

    debug!(server, addr = %addr, bytes_sent, "UDP request sent");

    let mut recv_buf = vec![0u8; MAX_DATAGRAM_SIZE];
    let bytes_received = socket.recv(&mut recv_buf).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::ConnectionRefused {
            DomainError::TransportConnectionRefused {
                server: server.to_string(),
            }
        } else {
            io_error(server, "receive", e)
        }
    })?;

    if bytes_received > max_reply {
        return Err(DomainError::ResponseTooLarge {
            server: server.to_string(),
            size: bytes_received,
            max: max_reply,
        });
    }
    if bytes_received == 0 {
        return Err(DomainError::TransportIo {
            server: server.to_string(),
            reason: "empty reply".to_string(),
        });
    }

    recv_buf.truncate(bytes_received);

    debug!(server, bytes_received, "UDP reply received");
    Ok(recv_buf)
}

fn io_error(server: &str, step: &str, e: std::io::Error) -> DomainError {
    DomainError::TransportIo {
        server: server.to_string(),
        reason: format!("{} failed: {}", step, e),
    }
}
