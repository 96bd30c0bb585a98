mod kdc_transport;
mod realm_provider;

pub use kdc_transport::KdcTransport;
pub use realm_provider::RealmProvider;
