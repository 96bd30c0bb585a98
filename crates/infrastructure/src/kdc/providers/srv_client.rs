//! Minimal SRV stub resolver over UDP using `hickory-proto`.

use super::dns_srv::{SrvRecordSource, SrvTarget};
use async_trait::async_trait;
use domain::resolv::stub::conf::ResolvConf;
use hickory_proto::op::{Message, MessageType, OpCode, Query, ResponseCode};
use hickory_proto::rr::{DNSClass, Name, RData, RecordType};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use kdc_proxy_domain::DomainError;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;
use tokio::net::UdpSocket;
use tracing::{debug, warn};

const DNS_PORT: u16 = 53;
const MAX_UDP_RESPONSE_SIZE: usize = 4096;

fn lookup_error(reason: impl Into<String>) -> DomainError {
    DomainError::ProviderLookup {
        provider: "dns".to_string(),
        reason: reason.into(),
    }
}

/// Queries nameservers one after another until one answers.
pub struct UdpSrvClient {
    nameservers: Vec<SocketAddr>,
    timeout: Duration,
}

impl UdpSrvClient {
    pub fn new(nameservers: Vec<SocketAddr>, timeout: Duration) -> Self {
        Self {
            nameservers,
            timeout,
        }
    }

    /// Uses `configured` when given (`ip` or `ip:port`), else the system's
    /// /etc/resolv.conf, else the local resolver.
    pub fn from_config(configured: &[String], timeout: Duration) -> Self {
        let mut nameservers: Vec<SocketAddr> = configured
            .iter()
            .filter_map(|s| match parse_nameserver(s) {
                Some(addr) => Some(addr),
                None => {
                    warn!(nameserver = %s, "Ignoring invalid nameserver");
                    None
                }
            })
            .collect();

        if nameservers.is_empty() {
            nameservers = system_nameservers(&ResolvConf::default());
        }
        if nameservers.is_empty() {
            nameservers.push(SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), DNS_PORT));
        }

        debug!(nameservers = ?nameservers, "SRV client configured");
        Self::new(nameservers, timeout)
    }

    pub fn nameservers(&self) -> &[SocketAddr] {
        &self.nameservers
    }

    pub(crate) fn build_query(name: &str) -> Result<(u16, Vec<u8>), DomainError> {
        let name = Name::from_str(name)
            .map_err(|e| lookup_error(format!("invalid SRV name '{}': {}", name, e)))?;

        let mut query = Query::new();
        query.set_name(name);
        query.set_query_type(RecordType::SRV);
        query.set_query_class(DNSClass::IN);

        let id = fastrand::u16(..);
        let mut message = Message::new(id, MessageType::Query, OpCode::Query);
        message.set_recursion_desired(true);
        message.add_query(query);

        let mut buf = Vec::with_capacity(512);
        let mut encoder = BinEncoder::new(&mut buf);
        message
            .emit(&mut encoder)
            .map_err(|e| lookup_error(format!("failed to serialize SRV query: {}", e)))?;
        Ok((id, buf))
    }

    async fn exchange(&self, server: SocketAddr, query: &[u8]) -> Result<Vec<u8>, DomainError> {
        let bind_addr: SocketAddr = if server.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };

        let io = async {
            let socket = UdpSocket::bind(bind_addr).await?;
            socket.connect(server).await?;
            socket.send(query).await?;
            let mut buf = vec![0u8; MAX_UDP_RESPONSE_SIZE];
            let len = socket.recv(&mut buf).await?;
            buf.truncate(len);
            Ok::<_, std::io::Error>(buf)
        };

        tokio::time::timeout(self.timeout, io)
            .await
            .map_err(|_| lookup_error(format!("timeout querying {}", server)))?
            .map_err(|e| lookup_error(format!("query to {} failed: {}", server, e)))
    }
}

#[async_trait]
impl SrvRecordSource for UdpSrvClient {
    async fn query_srv(&self, name: &str) -> Result<Vec<SrvTarget>, DomainError> {
        let (id, query) = Self::build_query(name)?;
        let mut last_err = lookup_error("no nameservers configured");

        for (index, server) in self.nameservers.iter().enumerate() {
            let response = match self.exchange(*server, &query).await {
                Ok(response) => response,
                Err(e) => {
                    warn!(nameserver = %server, error = %e, position = index, "Failing over");
                    last_err = e;
                    continue;
                }
            };
            if response.len() < 2 || u16::from_be_bytes([response[0], response[1]]) != id {
                warn!(nameserver = %server, "Discarding SRV response with mismatched ID");
                last_err = lookup_error(format!("mismatched response from {}", server));
                continue;
            }
            return parse_srv_response(&response);
        }

        Err(last_err)
    }
}

fn parse_srv_response(bytes: &[u8]) -> Result<Vec<SrvTarget>, DomainError> {
    let message = Message::from_vec(bytes)
        .map_err(|e| lookup_error(format!("failed to parse SRV response: {}", e)))?;

    match message.response_code() {
        ResponseCode::NoError => {}
        ResponseCode::NXDomain => return Ok(Vec::new()),
        other => return Err(lookup_error(format!("server answered {}", other))),
    }

    let records = message
        .answers()
        .iter()
        .filter_map(|record| match record.data() {
            RData::SRV(srv) => Some(SrvTarget {
                priority: srv.priority(),
                weight: srv.weight(),
                port: srv.port(),
                target: srv.target().to_utf8(),
            }),
            _ => None,
        })
        .collect();
    Ok(records)
}

fn parse_nameserver(s: &str) -> Option<SocketAddr> {
    s.parse::<SocketAddr>()
        .ok()
        .or_else(|| s.parse::<IpAddr>().ok().map(|ip| SocketAddr::new(ip, DNS_PORT)))
}

/// Nameservers of the system resolver configuration, in file order and
/// without repeats.
pub(crate) fn system_nameservers(conf: &ResolvConf) -> Vec<SocketAddr> {
    let mut servers: Vec<SocketAddr> = Vec::with_capacity(conf.servers.len());
    for server in &conf.servers {
        if !servers.contains(&server.addr) {
            servers.push(server.addr);
        }
    }
    servers
}
