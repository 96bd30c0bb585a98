//! KDC-PROXY-MESSAGE codec (MS-KKDCP §2.2.2)
//!
//! ```text
//! KDC-PROXY-MESSAGE ::= SEQUENCE {
//!     kerb-message    [0] OCTET STRING,
//!     target-domain   [1] KERB-REALM OPTIONAL,
//!     dclocator-hint  [2] INTEGER OPTIONAL
//! }
//! ```
//!
//! The structure is read and written by `picky-asn1-der`. On top of that the
//! decoder only accepts the canonical DER form: the input must re-encode to
//! exactly the same bytes, which rules out long-form lengths that fit the
//! short form, trailing bytes and fields the structure does not declare.

use crate::errors::DomainError;
use crate::proxy_message::ProxyMessage;
use bytes::Bytes;
use picky_asn1::restricted_string::IA5String;
use picky_asn1::wrapper::{
    ExplicitContextTag0, ExplicitContextTag1, ExplicitContextTag2, IntegerAsn1, OctetStringAsn1,
    Optional,
};
use picky_krb::data_types::KerberosStringAsn1;
use picky_krb::messages::KdcProxyMessage;

const MAX_INTEGER_OCTETS: usize = 8;

/// Largest Kerberos message the codec will wrap.
pub const MAX_MESSAGE_SIZE: usize = 1024 * 1024;

fn decode_error(msg: impl Into<String>) -> DomainError {
    DomainError::Decode(msg.into())
}

/// Two's complement content octets of a DER INTEGER, as a signed value.
///
/// DER wants the shortest form: a leading 0x00 is only allowed in front of
/// a byte with the high bit set, a leading 0xFF only in front of one without.
fn decode_integer(bytes: &[u8]) -> Result<i64, DomainError> {
    match bytes {
        [] => return Err(decode_error("dclocator-hint has no content")),
        [0x00, next, ..] if next & 0x80 == 0 => {
            return Err(decode_error("dclocator-hint is not minimally encoded"))
        }
        [0xFF, next, ..] if next & 0x80 != 0 => {
            return Err(decode_error("dclocator-hint is not minimally encoded"))
        }
        _ => {}
    }
    if bytes.len() > MAX_INTEGER_OCTETS {
        return Err(decode_error(format!(
            "dclocator-hint of {} octets does not fit 64 bits",
            bytes.len()
        )));
    }

    let seed: i64 = if bytes[0] & 0x80 != 0 { -1 } else { 0 };
    Ok(bytes.iter().fold(seed, |acc, &b| (acc << 8) | i64::from(b)))
}

fn encode_integer(value: i64) -> Vec<u8> {
    let raw = value.to_be_bytes();
    let mut start = 0;
    while start < raw.len() - 1 {
        let redundant = (raw[start] == 0x00 && raw[start + 1] & 0x80 == 0)
            || (raw[start] == 0xFF && raw[start + 1] & 0x80 != 0);
        if !redundant {
            break;
        }
        start += 1;
    }
    raw[start..].to_vec()
}

/// Encoder and decoder for the HTTP-carried proxy envelope.
pub struct EnvelopeCodec;

impl EnvelopeCodec {
    pub fn decode(buf: &[u8]) -> Result<ProxyMessage, DomainError> {
        let parsed: KdcProxyMessage = picky_asn1_der::from_bytes(buf)
            .map_err(|e| decode_error(format!("malformed KDC-PROXY-MESSAGE: {}", e)))?;

        let canonical = picky_asn1_der::to_vec(&parsed)
            .map_err(|e| decode_error(format!("malformed KDC-PROXY-MESSAGE: {}", e)))?;
        if canonical != buf {
            return Err(decode_error(
                "KDC-PROXY-MESSAGE is not in canonical DER form or carries extra bytes",
            ));
        }

        let message = parsed.kerb_message.0.0;
        if message.is_empty() {
            return Err(decode_error("kerb-message is empty"));
        }
        if message.len() > MAX_MESSAGE_SIZE {
            return Err(decode_error(format!(
                "kerb-message of {} bytes exceeds the {} byte limit",
                message.len(),
                MAX_MESSAGE_SIZE
            )));
        }

        let target_realm = match parsed.target_domain.0 {
            Some(realm) => {
                let realm = realm.0.to_string();
                if realm.is_empty() {
                    return Err(decode_error("target-domain is empty"));
                }
                Some(realm)
            }
            None => None,
        };

        let locator_hint = parsed
            .dclocator_hint
            .0
            .map(|hint| decode_integer(&hint.0.0))
            .transpose()?;

        Ok(ProxyMessage {
            kerberos_message: Bytes::from(message),
            target_realm,
            locator_hint,
        })
    }

    /// Wraps a raw reply from a KDC; no optional fields are set.
    pub fn encode(reply: &[u8]) -> Result<Bytes, DomainError> {
        Self::encode_parts(reply, None, None)
    }

    pub fn encode_message(message: &ProxyMessage) -> Result<Bytes, DomainError> {
        Self::encode_parts(
            &message.kerberos_message,
            message.target_realm.as_deref(),
            message.locator_hint,
        )
    }

    fn encode_parts(
        message: &[u8],
        realm: Option<&str>,
        hint: Option<i64>,
    ) -> Result<Bytes, DomainError> {
        if message.is_empty() {
            return Err(DomainError::Encode("Kerberos message is empty".to_string()));
        }
        if message.len() > MAX_MESSAGE_SIZE {
            return Err(DomainError::Encode(format!(
                "Kerberos message of {} bytes exceeds the {} byte limit",
                message.len(),
                MAX_MESSAGE_SIZE
            )));
        }

        let target_domain = match realm {
            Some("") => return Err(DomainError::Encode("target realm is empty".to_string())),
            Some(realm) => {
                let realm = IA5String::from_string(realm.to_string()).map_err(|_| {
                    DomainError::Encode(format!("target realm '{}' is not ASCII", realm))
                })?;
                Some(ExplicitContextTag1::from(KerberosStringAsn1::from(realm)))
            }
            None => None,
        };

        let envelope = KdcProxyMessage {
            kerb_message: ExplicitContextTag0::from(OctetStringAsn1::from(message.to_vec())),
            target_domain: Optional::from(target_domain),
            dclocator_hint: Optional::from(
                hint.map(|h| ExplicitContextTag2::from(IntegerAsn1::from(encode_integer(h)))),
            ),
        };

        picky_asn1_der::to_vec(&envelope)
            .map(Bytes::from)
            .map_err(|e| DomainError::Encode(format!("failed to encode KDC-PROXY-MESSAGE: {}", e)))
    }
}
