//! Kerberos stream framing (RFC 4120 §7.2.2): a 4-byte big-endian length
//! followed by the message.

use crate::errors::DomainError;
use bytes::{BufMut, Bytes, BytesMut};

pub const LENGTH_PREFIX_LEN: usize = 4;

/// Returns the message body when `data` is exactly one stream-framed message.
///
/// A bare Kerberos message starts with an ASN.1 application tag (0x6a and up),
/// which would announce a length of well over a gigabyte, so it never matches.
pub fn unframe(data: &[u8]) -> Option<&[u8]> {
    if data.len() <= LENGTH_PREFIX_LEN {
        return None;
    }
    let (prefix, body) = data.split_at(LENGTH_PREFIX_LEN);
    let declared = u32::from_be_bytes([prefix[0], prefix[1], prefix[2], prefix[3]]) as usize;
    (declared == body.len()).then_some(body)
}

pub fn frame(message: &[u8]) -> Result<Bytes, DomainError> {
    let len = u32::try_from(message.len()).map_err(|_| {
        DomainError::Encode(format!(
            "message of {} bytes does not fit a stream frame",
            message.len()
        ))
    })?;
    let mut out = BytesMut::with_capacity(LENGTH_PREFIX_LEN + message.len());
    out.put_u32(len);
    out.put_slice(message);
    Ok(out.freeze())
}
