//! Tests for the record codec
//!
//! These tests verify:
//! - The exact byte layout of an encoded record
//! - Round-trips for every value type, including multi-byte UTF-8
//! - CRC32 corruption detection on every covered byte
//! - Header decoding in isolation

use emberlog::codec::{
    self, decode, decode_header, encode, is_valid, Decoded, Record, CHECKSUM_SIZE, HEADER_SIZE,
    RECORD_PREFIX_SIZE,
};
use emberlog::Value;

// =============================================================================
// Helper Functions
// =============================================================================

fn encoded(key: Value, value: Value, timestamp: u32) -> Vec<u8> {
    encode(&key, &value, timestamp).unwrap().1.to_vec()
}

// =============================================================================
// Byte Layout Tests
// =============================================================================

#[test]
fn test_encode_known_vector() {
    let (size, bytes) = encode(&Value::from("café"), &Value::Float(1.23), 1747005650).unwrap();

    let expected: [u8; 31] = [
        0x1E, 0x2B, 0x60, 0x4B, // crc
        0xD2, 0x30, 0x21, 0x68, // timestamp
        0x05, 0x00, 0x00, 0x00, // key size
        0x08, 0x00, 0x00, 0x00, // value size
        0x03, 0x02, // key type, value type
        0x63, 0x61, 0x66, 0xC3, 0xA9, // "café"
        0xAE, 0x47, 0xE1, 0x7A, 0x14, 0xAE, 0xF3, 0x3F, // 1.23
    ];

    assert_eq!(size, 31);
    assert_eq!(&bytes[..], &expected[..]);
}

#[test]
fn test_decode_known_vector() {
    let bytes = encoded(Value::from("café"), Value::Float(1.23), 1747005650);

    let (timestamp, key, value) = decode(&bytes).into_triple();

    assert_eq!(timestamp, 1747005650);
    assert_eq!(key, Value::from("café"));
    assert_eq!(value, Value::Float(1.23));
}

#[test]
fn test_integer_payload_is_twos_complement_le() {
    let bytes = encoded(Value::Integer(-2), Value::Integer(18), 0);

    assert_eq!(&bytes[16..18], &[1, 1]);
    assert_eq!(&bytes[18..26], &[0xFE, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]);
    assert_eq!(&bytes[26..34], &[18, 0, 0, 0, 0, 0, 0, 0]);
}

#[test]
fn test_size_law() {
    let cases = vec![
        (Value::Integer(1), Value::Integer(2)),
        (Value::from(""), Value::from("")),
        (Value::from("ключ"), Value::Float(-0.5)),
        (Value::Float(3.0), Value::from("a longer text value")),
    ];

    for (key, value) in cases {
        let (size, bytes) = encode(&key, &value, 99).unwrap();
        let expected = 18 + key.encoded_len() + value.encoded_len();
        assert_eq!(size as usize, expected);
        assert_eq!(bytes.len(), expected);
    }
}

// =============================================================================
// Round-Trip Tests
// =============================================================================

#[test]
fn test_round_trip_all_type_pairs() {
    let samples = vec![
        Value::Integer(i64::MIN),
        Value::Integer(0),
        Value::Integer(i64::MAX),
        Value::Float(f64::MIN_POSITIVE),
        Value::Float(-1e300),
        Value::from("plain"),
        Value::from("日本語テキスト"),
        Value::from(""),
    ];

    for key in &samples {
        for value in &samples {
            let bytes = encoded(key.clone(), value.clone(), u32::MAX);
            assert_eq!(
                decode(&bytes),
                Decoded::Valid(Record {
                    timestamp: u32::MAX,
                    key: key.clone(),
                    value: value.clone(),
                })
            );
        }
    }
}

#[test]
fn test_utf8_text_round_trips_byte_for_byte() {
    let text = "café ☕ naïve";
    let bytes = encoded(Value::from(text), Value::from(text), 1);

    let record = decode(&bytes).into_record().unwrap();
    match record.value {
        Value::Text(s) => {
            assert_eq!(s.as_bytes(), text.as_bytes());
            assert_eq!(s.chars().count(), text.chars().count());
        }
        other => panic!("expected text, got {:?}", other),
    }
}

// =============================================================================
// Corruption Detection Tests
// =============================================================================

#[test]
fn test_any_flipped_byte_is_rejected() {
    let bytes = encoded(Value::from("café"), Value::Float(1.23), 1747005650);

    for i in CHECKSUM_SIZE..bytes.len() {
        let mut corrupted = bytes.clone();
        corrupted[i] ^= 0xFF;
        assert!(
            !decode(&corrupted).is_valid(),
            "flip at byte {} was not detected",
            i
        );
        assert_eq!(
            decode(&corrupted).into_triple(),
            (0, Value::empty(), Value::empty())
        );
    }
}

#[test]
fn test_flipped_body_byte_reports_corrupt() {
    let mut bytes = encoded(Value::Integer(1), Value::Integer(2), 3);
    bytes[20] ^= 0x01;

    assert_eq!(decode(&bytes), Decoded::Corrupt);
}

#[test]
fn test_flipped_checksum_byte_reports_corrupt() {
    let mut bytes = encoded(Value::Integer(1), Value::Integer(2), 3);
    bytes[0] ^= 0x80;

    assert_eq!(decode(&bytes), Decoded::Corrupt);
}

#[test]
fn test_truncated_record_is_sentinel() {
    let bytes = encoded(Value::from("key"), Value::from("value"), 3);

    for len in 0..bytes.len() {
        assert_eq!(
            decode(&bytes[..len]).into_triple(),
            (0, Value::empty(), Value::empty()),
            "prefix of {} bytes decoded",
            len
        );
    }
}

#[test]
fn test_is_valid_over_region() {
    let bytes = encoded(Value::from("k"), Value::Integer(5), 10);
    let stored = u32::from_le_bytes(bytes[..4].try_into().unwrap());

    assert!(is_valid(stored, &bytes[CHECKSUM_SIZE..]));
    assert!(!is_valid(stored, &bytes[CHECKSUM_SIZE + 1..]));
    assert_eq!(codec::checksum(&bytes[CHECKSUM_SIZE..]), stored);
}

// =============================================================================
// Header Tests
// =============================================================================

#[test]
fn test_decode_header_standalone() {
    let bytes = encoded(Value::from("café"), Value::Float(1.23), 1747005650);

    let mut header_bytes = [0u8; HEADER_SIZE];
    header_bytes.copy_from_slice(&bytes[CHECKSUM_SIZE..RECORD_PREFIX_SIZE]);
    let header = decode_header(&header_bytes);

    assert_eq!(header.timestamp, 1747005650);
    assert_eq!(header.key_size, 5);
    assert_eq!(header.value_size, 8);
    assert_eq!(header.key_type, 3);
    assert_eq!(header.value_type, 2);
    assert_eq!(header.record_len(), bytes.len() as u64);
}
