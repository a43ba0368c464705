//! Record Codec Module
//!
//! Turns a (key, value, timestamp) triple into a self-describing, checksummed
//! byte sequence and back.
//!
//! ## Responsibilities
//! - Type-tagged payload encoding for Integer / Float / Text values
//! - CRC32 (ISO-HDLC, as used by zlib) over everything after the checksum
//! - Header decoding on its own, for the recovery scan
//! - Decoding that never panics on hostile input
//!
//! ## Record Format (little-endian throughout)
//! ```text
//! ┌──────────┬──────────┬──────────┬──────────┬─────────┬─────────┬───────┬─────────┐
//! │ CRC (4)  │  TS (4)  │ KLen (4) │ VLen (4) │ KTy (1) │ VTy (1) │  Key  │  Value  │
//! └──────────┴──────────┴──────────┴──────────┴─────────┴─────────┴───────┴─────────┘
//!            └─────────────────── covered by CRC ─────────────────────────────────────┘
//! ```
//!
//! Type tags: 1 = Integer (i64), 2 = Float (f64), 3 = Text (UTF-8).

mod record;
mod value;

pub use record::{
    checksum, decode, decode_header, encode, is_valid, Decoded, Record, RecordHeader,
    CHECKSUM_SIZE, HEADER_SIZE, RECORD_PREFIX_SIZE,
};
pub use value::{Value, ValueType};
