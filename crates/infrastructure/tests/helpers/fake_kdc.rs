use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, UdpSocket};
use tokio::sync::oneshot;

#[derive(Clone, Copy)]
pub enum TcpBehavior {
    /// Reply with a correctly framed message.
    Reply,
    /// Accept and read, then never answer.
    Silent,
    /// Announce a reply of the given length.
    AnnounceLength(u32),
}

/// Loopback KDC speaking length-prefixed TCP.
pub struct FakeTcpKdc {
    addr: SocketAddr,
    received: Arc<Mutex<Vec<Vec<u8>>>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl FakeTcpKdc {
    pub async fn start(reply: &'static [u8], behavior: TcpBehavior) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let received = Arc::new(Mutex::new(Vec::new()));
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        let log = Arc::clone(&received);
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    accepted = listener.accept() => {
                        let Ok((mut stream, _)) = accepted else { continue };
                        let log = Arc::clone(&log);
                        tokio::spawn(async move {
                            let mut len_buf = [0u8; 4];
                            if stream.read_exact(&mut len_buf).await.is_err() {
                                return;
                            }
                            let mut body = vec![0u8; u32::from_be_bytes(len_buf) as usize];
                            if stream.read_exact(&mut body).await.is_err() {
                                return;
                            }
                            log.lock().unwrap().push(body);

                            match behavior {
                                TcpBehavior::Reply => {
                                    let _ = stream.write_all(&(reply.len() as u32).to_be_bytes()).await;
                                    let _ = stream.write_all(reply).await;
                                }
                                TcpBehavior::Silent => {
                                    tokio::time::sleep(Duration::from_secs(30)).await;
                                }
                                TcpBehavior::AnnounceLength(len) => {
                                    let _ = stream.write_all(&len.to_be_bytes()).await;
                                    tokio::time::sleep(Duration::from_secs(30)).await;
                                }
                            }
                        });
                    }
                }
            }
        });

        Self {
            addr,
            received,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn received(&self) -> Vec<Vec<u8>> {
        self.received.lock().unwrap().clone()
    }
}

impl Drop for FakeTcpKdc {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Loopback KDC answering single datagrams.
pub struct FakeUdpKdc {
    addr: SocketAddr,
    received: Arc<Mutex<Vec<Vec<u8>>>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl FakeUdpKdc {
    pub async fn start(reply: &'static [u8]) -> Self {
        Self::start_on("127.0.0.1:0".parse().unwrap(), reply).await
    }

    pub async fn start_on(bind: SocketAddr, reply: &'static [u8]) -> Self {
        let socket = UdpSocket::bind(bind).await.unwrap();
        let addr = socket.local_addr().unwrap();
        let received = Arc::new(Mutex::new(Vec::new()));
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        let log = Arc::clone(&received);
        tokio::spawn(async move {
            let mut buf = vec![0u8; 65_535];
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    result = socket.recv_from(&mut buf) => {
                        if let Ok((len, peer)) = result {
                            log.lock().unwrap().push(buf[..len].to_vec());
                            let _ = socket.send_to(reply, peer).await;
                        }
                    }
                }
            }
        });

        Self {
            addr,
            received,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn received(&self) -> Vec<Vec<u8>> {
        self.received.lock().unwrap().clone()
    }
}

impl Drop for FakeUdpKdc {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// A loopback port with no TCP listener behind it.
pub async fn closed_tcp_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}
