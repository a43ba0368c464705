//! Recovery Scan
//!
//! Replays a log from its first byte to rebuild the in-memory index.
//!
//! Unlike a point read, any checksum failure here is fatal: the scan stops and
//! the store is never opened. A short trailing record (crash mid-append) is
//! also reported as corruption rather than silently dropped.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use tracing::{debug, error, info};

use crate::codec::{self, Value, ValueType, CHECKSUM_SIZE, HEADER_SIZE, RECORD_PREFIX_SIZE};
use crate::error::{EmberError, Result};

use super::index::{Index, IndexEntry};

/// Summary of a completed scan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecoveryStats {
    /// Records read and verified
    pub records_scanned: u64,

    /// Distinct keys in the rebuilt index
    pub live_keys: u64,

    /// Records shadowed by a newer record for the same key
    pub superseded_records: u64,

    /// Bytes consumed; equals the log length after a clean scan
    pub bytes_scanned: u64,
}

/// Sequential reader that rebuilds an `Index` from a log
pub struct RecoveryScan<R: Read> {
    reader: R,
    position: u64,
    index: Index,
    records: u64,
}

impl<R: Read> RecoveryScan<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            position: 0,
            index: Index::new(),
            records: 0,
        }
    }

    /// Scan to end of input
    pub fn run(mut self) -> Result<(Index, RecoveryStats)> {
        while self.next_record()? {}

        let stats = RecoveryStats {
            records_scanned: self.records,
            live_keys: self.index.len() as u64,
            superseded_records: self.index.superseded(),
            bytes_scanned: self.position,
        };
        info!(
            records = stats.records_scanned,
            live_keys = stats.live_keys,
            superseded = stats.superseded_records,
            bytes = stats.bytes_scanned,
            "recovery scan complete"
        );
        Ok((self.index, stats))
    }

    /// Read, verify and index one record. `Ok(false)` at a clean end of log.
    fn next_record(&mut self) -> Result<bool> {
        let offset = self.position;

        let mut prefix = [0u8; RECORD_PREFIX_SIZE];
        match read_full(&mut self.reader, &mut prefix)? {
            0 => return Ok(false),
            n if n < RECORD_PREFIX_SIZE => {
                return Err(fail(
                    offset,
                    format!("truncated record header ({} of {} bytes)", n, RECORD_PREFIX_SIZE),
                ))
            }
            _ => {}
        }

        let stored_crc = u32::from_le_bytes([prefix[0], prefix[1], prefix[2], prefix[3]]);
        let mut header_bytes = [0u8; HEADER_SIZE];
        header_bytes.copy_from_slice(&prefix[CHECKSUM_SIZE..]);
        let header = codec::decode_header(&header_bytes);

        // Sizes come from disk; grow buffers only as bytes actually arrive
        let key_bytes = read_up_to(&mut self.reader, header.key_size)?;
        let value_bytes = read_up_to(&mut self.reader, header.value_size)?;
        let got = key_bytes.len() + value_bytes.len();
        if (got as u64) < header.payload_len() {
            return Err(fail(
                offset,
                format!(
                    "truncated record payload ({} of {} bytes)",
                    got,
                    header.payload_len()
                ),
            ));
        }

        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&header_bytes);
        hasher.update(&key_bytes);
        hasher.update(&value_bytes);
        let computed = hasher.finalize();
        if computed != stored_crc {
            return Err(fail(
                offset,
                format!(
                    "checksum mismatch (stored 0x{:08x}, computed 0x{:08x})",
                    stored_crc, computed
                ),
            ));
        }

        let key = ValueType::try_from(header.key_type)
            .and_then(|t| Value::decode_payload(t, &key_bytes))
            .map_err(|e| fail(offset, format!("undecodable key: {}", e)))?;
        // A record whose value can't be read back would make `get` silently absent
        ValueType::try_from(header.value_type)
            .and_then(|t| Value::decode_payload(t, &value_bytes))
            .map_err(|e| fail(offset, format!("undecodable value: {}", e)))?;

        let length = header.record_len();
        let entry = IndexEntry {
            offset,
            length: u32::try_from(length)
                .map_err(|_| fail(offset, format!("record length {} exceeds u32", length)))?,
        };
        debug!(offset, length, key = %key, "recovered record");

        self.index.insert(key, entry);
        self.records += 1;
        self.position += length;
        Ok(true)
    }
}

/// Scan the log at `path` without opening it for writing
pub fn verify(path: impl AsRef<Path>) -> Result<RecoveryStats> {
    let file = File::open(path.as_ref())?;
    let (_, stats) = RecoveryScan::new(BufReader::new(file)).run()?;
    Ok(stats)
}

fn fail(offset: u64, reason: String) -> EmberError {
    error!(offset, %reason, "log corruption detected during recovery");
    EmberError::corruption(offset, reason)
}

/// Fill `buf` as far as the input allows; returns the number of bytes read
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Read at most `len` bytes, fewer only at end of input
fn read_up_to<R: Read>(reader: &mut R, len: u32) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    reader.by_ref().take(len as u64).read_to_end(&mut buf)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn record(key: &str, value: i64) -> Vec<u8> {
        codec::encode(&Value::from(key), &Value::Integer(value), 7)
            .unwrap()
            .1
            .to_vec()
    }

    #[test]
    fn empty_input_is_clean() {
        let (index, stats) = RecoveryScan::new(Cursor::new(Vec::new())).run().unwrap();
        assert!(index.is_empty());
        assert_eq!(stats, RecoveryStats::default());
    }

    #[test]
    fn offsets_accumulate() {
        let mut log = record("a", 1);
        let first_len = log.len() as u64;
        log.extend(record("b", 2));

        let (index, stats) = RecoveryScan::new(Cursor::new(log.clone())).run().unwrap();
        assert_eq!(index.get(&Value::from("b")).unwrap().offset, first_len);
        assert_eq!(stats.bytes_scanned, log.len() as u64);
        assert_eq!(stats.records_scanned, 2);
    }

    #[test]
    fn short_tail_is_corruption() {
        let mut log = record("a", 1);
        let clean = log.len() as u64;
        log.extend_from_slice(&[1, 2, 3]);

        match RecoveryScan::new(Cursor::new(log)).run() {
            Err(EmberError::Corruption { offset, .. }) => assert_eq!(offset, clean),
            other => panic!("expected corruption, got {:?}", other.map(|(_, s)| s)),
        }
    }

    #[test]
    fn truncated_payload_is_corruption() {
        let mut log = record("abc", 1);
        log.truncate(log.len() - 2);
        let err = RecoveryScan::new(Cursor::new(log)).run().unwrap_err();
        assert!(err.is_corruption());
    }
}
