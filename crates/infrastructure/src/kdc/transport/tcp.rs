//! Kerberos over TCP (RFC 4120 §7.2.2)
//!
//! Each message is preceded by a 4-byte big-endian length. One connection
//! carries exactly one request and its reply.

use kdc_proxy_domain::DomainError;
use std::io::ErrorKind;
use std::net::SocketAddr;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

/// High bit of the length prefix is reserved for protocol extensions.
const RESERVED_LENGTH_BIT: u32 = 0x8000_0000;

/// Connects to the first address that accepts, then performs one exchange.
pub async fn exchange(
    server: &str,
    addrs: &[SocketAddr],
    message: &[u8],
    max_reply: usize,
) -> Result<Vec<u8>, DomainError> {
    let mut stream = connect_first(server, addrs).await?;

    send_with_length_prefix(&mut stream, message)
        .await
        .map_err(|e| io_error(server, "send", e))?;

    debug!(server, message_len = message.len(), "TCP request sent");

    let reply = read_with_length_prefix(&mut stream, server, max_reply).await?;

    debug!(server, reply_len = reply.len(), "TCP reply received");
    Ok(reply)
}

async fn connect_first(server: &str, addrs: &[SocketAddr]) -> Result<TcpStream, DomainError> {
    let mut last_err = None;
    for addr in addrs {
        match TcpStream::connect(addr).await {
            Ok(stream) => {
                if let Err(e) = stream.set_nodelay(true) {
                    debug!(server, addr = %addr, error = %e, "Failed to set TCP_NODELAY");
                }
                return Ok(stream);
            }
            Err(e) => {
                debug!(server, addr = %addr, error = %e, "TCP connect failed");
                last_err = Some(e);
            }
        }
    }

    match last_err {
        Some(e) if e.kind() == ErrorKind::ConnectionRefused => {
            Err(DomainError::TransportConnectionRefused {
                server: server.to_string(),
            })
        }
        Some(e) => Err(io_error(server, "connect", e)),
        None => Err(DomainError::AddressResolution {
            server: server.to_string(),
            reason: "no addresses to connect to".to_string(),
        }),
    }
}

pub(crate) async fn send_with_length_prefix<S>(
    stream: &mut S,
    message: &[u8],
) -> std::io::Result<()>
where
    S: AsyncWriteExt + Unpin,
{
    let length = u32::try_from(message.len())
        .map_err(|_| std::io::Error::new(ErrorKind::InvalidInput, "message too large to frame"))?;

    stream.write_all(&length.to_be_bytes()).await?;
    stream.write_all(message).await?;
    stream.flush().await
}

pub(crate) async fn read_with_length_prefix<S>(
    stream: &mut S,
    server: &str,
    max_reply: usize,
) -> Result<Vec<u8>, DomainError>
where
    S: AsyncReadExt + Unpin,
{
    let mut len_buf = [0u8; 4];
    stream
        .read_exact(&mut len_buf)
        .await
        .map_err(|e| io_error(server, "read reply length", e))?;

    let declared = u32::from_be_bytes(len_buf);
    if declared & RESERVED_LENGTH_BIT != 0 {
        return Err(DomainError::TransportIo {
            server: server.to_string(),
            reason: format!("reply length 0x{:08x} sets the reserved bit", declared),
        });
    }

    let reply_len = declared as usize;
    if reply_len > max_reply {
        return Err(DomainError::ResponseTooLarge {
            server: server.to_string(),
            size: reply_len,
            max: max_reply,
        });
    }
    if reply_len == 0 {
        return Err(DomainError::TransportIo {
            server: server.to_string(),
            reason: "empty reply".to_string(),
        });
    }

    let mut reply = vec![0u8; reply_len];
    stream
        .read_exact(&mut reply)
        .await
        .map_err(|e| io_error(server, "read reply body", e))?;

    Ok(reply)
}

fn io_error(server: &str, step: &str, e: std::io::Error) -> DomainError {
    DomainError::TransportIo {
        server: server.to_string(),
        reason: format!("{} failed: {}", step, e),
    }
}
