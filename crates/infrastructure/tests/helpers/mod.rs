#![allow(dead_code)]

mod fake_kdc;
mod fake_srv;

pub use fake_kdc::{closed_tcp_port, FakeTcpKdc, FakeUdpKdc, TcpBehavior};
pub use fake_srv::FakeSrvSource;
