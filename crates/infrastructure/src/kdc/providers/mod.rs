pub mod dns_srv;
pub mod krb5_profile;
pub mod srv_client;
pub mod static_table;

pub use dns_srv::{DnsSrvProvider, SrvRecordSource, SrvTarget};
pub use krb5_profile::{Krb5Profile, MitConfigProvider};
pub use srv_client::UdpSrvClient;
pub use static_table::StaticRealmTable;
