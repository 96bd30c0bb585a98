use bytes::Bytes;

/// Payload carried across the HTTP boundary (MS-KKDCP `KDC-PROXY-MESSAGE`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyMessage {
    /// Opaque Kerberos message; never empty once decoded.
    pub kerberos_message: Bytes,

    pub target_realm: Option<String>,

    /// DC locator flags, passed through without interpretation.
    pub locator_hint: Option<i64>,
}

impl ProxyMessage {
    pub fn new(kerberos_message: impl Into<Bytes>) -> Self {
        Self {
            kerberos_message: kerberos_message.into(),
            target_realm: None,
            locator_hint: None,
        }
    }

    pub fn with_realm(mut self, realm: impl Into<String>) -> Self {
        self.target_realm = Some(realm.into());
        self
    }

    pub fn with_locator_hint(mut self, hint: i64) -> Self {
        self.locator_hint = Some(hint);
        self
    }
}
