//! Record encoding and decoding
//!
//! One record is `crc ++ header ++ key ++ value`; see the module docs for the
//! exact layout.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{EmberError, Result};

use super::value::{Value, ValueType};

/// Size of the leading checksum field
pub const CHECKSUM_SIZE: usize = 4;

/// Size of the fixed header: timestamp + key_size + value_size + key_type + value_type
pub const HEADER_SIZE: usize = 14;

/// Checksum plus header; the smallest well-formed record
pub const RECORD_PREFIX_SIZE: usize = CHECKSUM_SIZE + HEADER_SIZE;

// =============================================================================
// Header
// =============================================================================

/// The fixed-size part of a record that follows the checksum
///
/// Type tags are kept raw here; validating them is the decoder's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    pub timestamp: u32,
    pub key_size: u32,
    pub value_size: u32,
    pub key_type: u8,
    pub value_type: u8,
}

impl RecordHeader {
    /// Serialize to the 14 header bytes
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        let mut buf = &mut out[..];
        buf.put_u32_le(self.timestamp);
        buf.put_u32_le(self.key_size);
        buf.put_u32_le(self.value_size);
        buf.put_u8(self.key_type);
        buf.put_u8(self.value_type);
        out
    }

    /// Length of key + value payloads
    pub fn payload_len(&self) -> u64 {
        self.key_size as u64 + self.value_size as u64
    }

    /// Full on-disk length of the record this header belongs to
    pub fn record_len(&self) -> u64 {
        RECORD_PREFIX_SIZE as u64 + self.payload_len()
    }
}

/// Unpack a header. No validation beyond the fixed length.
pub fn decode_header(bytes: &[u8; HEADER_SIZE]) -> RecordHeader {
    let mut buf = &bytes[..];
    RecordHeader {
        timestamp: buf.get_u32_le(),
        key_size: buf.get_u32_le(),
        value_size: buf.get_u32_le(),
        key_type: buf.get_u8(),
        value_type: buf.get_u8(),
    }
}

// =============================================================================
// Checksum
// =============================================================================

/// CRC-32/ISO-HDLC of `region`
pub fn checksum(region: &[u8]) -> u32 {
    crc32fast::hash(region)
}

/// Does `region` hash to `expected`?
pub fn is_valid(expected: u32, region: &[u8]) -> bool {
    checksum(region) == expected
}

// =============================================================================
// Encode
// =============================================================================

/// Encode a record, returning its total size and bytes
///
/// Fails with `InvalidType` when a payload cannot be described by the u32 size
/// fields of the header.
pub fn encode(key: &Value, value: &Value, timestamp: u32) -> Result<(u32, Bytes)> {
    let key_size = payload_size(key)?;
    let value_size = payload_size(value)?;

    let total_size = (RECORD_PREFIX_SIZE as u64) + key_size as u64 + value_size as u64;
    let total_size = u32::try_from(total_size).map_err(|_| {
        EmberError::InvalidType(format!("record of {} bytes exceeds u32 range", total_size))
    })?;

    let header = RecordHeader {
        timestamp,
        key_size,
        value_size,
        key_type: key.value_type() as u8,
        value_type: value.value_type() as u8,
    };

    // Body first so the CRC can be taken over it in one pass
    let mut buf = BytesMut::with_capacity(total_size as usize);
    buf.put_u32_le(0); // checksum placeholder
    buf.put_slice(&header.to_bytes());
    key.encode_payload(&mut buf);
    value.encode_payload(&mut buf);

    let crc = checksum(&buf[CHECKSUM_SIZE..]);
    buf[..CHECKSUM_SIZE].copy_from_slice(&crc.to_le_bytes());

    Ok((total_size, buf.freeze()))
}

fn payload_size(value: &Value) -> Result<u32> {
    u32::try_from(value.encoded_len()).map_err(|_| {
        EmberError::InvalidType(format!(
            "{:?} payload of {} bytes exceeds u32 range",
            value.value_type(),
            value.encoded_len()
        ))
    })
}

// =============================================================================
// Decode
// =============================================================================

/// A successfully decoded record
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub timestamp: u32,
    pub key: Value,
    pub value: Value,
}

/// Outcome of decoding a byte sequence
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    /// Checksum matched and the payloads decoded
    Valid(Record),

    /// Checksum mismatch
    Corrupt,

    /// Too short, bad sizes, unknown type tag or non-UTF-8 text
    Malformed(String),
}

impl Decoded {
    /// Collapse into `(timestamp, key, value)`, using `(0, "", "")` for any failure
    pub fn into_triple(self) -> (u32, Value, Value) {
        match self {
            Decoded::Valid(r) => (r.timestamp, r.key, r.value),
            Decoded::Corrupt | Decoded::Malformed(_) => (0, Value::empty(), Value::empty()),
        }
    }

    pub fn into_record(self) -> Option<Record> {
        match self {
            Decoded::Valid(r) => Some(r),
            _ => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Decoded::Valid(_))
    }
}

/// Decode one record. Never panics.
pub fn decode(bytes: &[u8]) -> Decoded {
    if bytes.len() < RECORD_PREFIX_SIZE {
        return Decoded::Malformed(format!(
            "need at least {} bytes, got {}",
            RECORD_PREFIX_SIZE,
            bytes.len()
        ));
    }

    let stored = (&bytes[..CHECKSUM_SIZE]).get_u32_le();
    if !is_valid(stored, &bytes[CHECKSUM_SIZE..]) {
        return Decoded::Corrupt;
    }

    let mut header_bytes = [0u8; HEADER_SIZE];
    header_bytes.copy_from_slice(&bytes[CHECKSUM_SIZE..RECORD_PREFIX_SIZE]);
    let header = decode_header(&header_bytes);

    // Byte offsets only; never index text by characters
    let key_end = RECORD_PREFIX_SIZE as u64 + header.key_size as u64;
    let value_end = key_end + header.value_size as u64;
    if (bytes.len() as u64) < value_end {
        return Decoded::Malformed(format!(
            "header declares {} bytes, buffer holds {}",
            value_end,
            bytes.len()
        ));
    }
    let key_bytes = &bytes[RECORD_PREFIX_SIZE..key_end as usize];
    let value_bytes = &bytes[key_end as usize..value_end as usize];

    let decoded = ValueType::try_from(header.key_type)
        .and_then(|t| Value::decode_payload(t, key_bytes))
        .and_then(|key| {
            ValueType::try_from(header.value_type)
                .and_then(|t| Value::decode_payload(t, value_bytes))
                .map(|value| (key, value))
        });

    match decoded {
        Ok((key, value)) => Decoded::Valid(Record {
            timestamp: header.timestamp,
            key,
            value,
        }),
        Err(e) => Decoded::Malformed(e.to_string()),
    }
}
