//! Log Store
//!
//! One append-only file plus the in-memory index that points into it.

use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, info, warn};

use crate::codec::{self, Decoded, Record, Value};
use crate::config::{Config, SyncStrategy};
use crate::error::Result;

use super::index::{Index, IndexEntry};
use super::recovery::{RecoveryScan, RecoveryStats};

/// An open append-only key-value log
///
/// ## Lifecycle
/// `open` either returns a fully recovered store or an error; there is no
/// partially-open state. Dropping the store releases the file handle.
///
/// ## Concurrency
/// Single writer, single thread. `put` needs `&mut self`; `get` reads through a
/// shared file handle and must not race with another `get` on the same store.
pub struct LogStore {
    config: Config,
    file: File,
    index: Index,
    /// Byte offset where the next record will land
    write_cursor: u64,
    recovery: RecoveryStats,
}

impl LogStore {
    /// Open (or create) the log at `path` with default settings
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(Config::builder().path(path.as_ref()).build())
    }

    /// Open (or create) a log and replay it into a fresh index
    ///
    /// Fails with `Corruption` if any record fails verification, including a
    /// truncated final record.
    pub fn open_with(config: Config) -> Result<Self> {
        config.validate()?;

        if config.create_parent_dirs {
            if let Some(parent) = config.path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&config.path)?;

        let (index, recovery) = {
            let mut reader = &file;
            reader.seek(SeekFrom::Start(0))?;
            RecoveryScan::new(BufReader::new(reader)).run()?
        };

        info!(
            path = %config.path.display(),
            keys = index.len(),
            bytes = recovery.bytes_scanned,
            "log store opened"
        );

        Ok(Self {
            write_cursor: recovery.bytes_scanned,
            config,
            file,
            index,
            recovery,
        })
    }

    /// Append a record stamped with the current wall-clock time
    pub fn put(&mut self, key: impl Into<Value>, value: impl Into<Value>) -> Result<()> {
        self.put_at(key, value, now_timestamp())
    }

    /// Append a record with an explicit timestamp
    ///
    /// The write is flushed (and synced, under `SyncStrategy::EveryWrite`)
    /// before the index is updated. I/O errors propagate unchanged.
    pub fn put_at(
        &mut self,
        key: impl Into<Value>,
        value: impl Into<Value>,
        timestamp: u32,
    ) -> Result<()> {
        let key = key.into();
        let value = value.into();
        let (total_size, bytes) = codec::encode(&key, &value, timestamp)?;

        // Take the offset from the file itself: a failed earlier append may have
        // left bytes behind that the cursor never counted.
        let offset = self.file.seek(SeekFrom::End(0))?;
        if offset != self.write_cursor {
            warn!(
                expected = self.write_cursor,
                actual = offset,
                "write cursor behind end of log, resynchronising"
            );
            self.write_cursor = offset;
        }

        if let Err(e) = self.append(&bytes) {
            if let Ok(meta) = self.file.metadata() {
                self.write_cursor = meta.len();
            }
            return Err(e);
        }

        let entry = IndexEntry {
            offset,
            length: total_size,
        };
        debug!(offset = entry.offset, length = total_size, key = %key, "appended record");

        self.index.insert(key, entry);
        self.write_cursor += total_size as u64;
        Ok(())
    }

    fn append(&mut self, bytes: &[u8]) -> Result<()> {
        self.file.write_all(bytes)?;
        self.file.flush()?;
        if self.config.sync_strategy == SyncStrategy::EveryWrite {
            self.file.sync_data()?;
        }
        Ok(())
    }

    /// Look up the newest value for `key`
    ///
    /// Returns `Ok(None)` both for a key never written and for a record that no
    /// longer passes its checksum.
    pub fn get(&self, key: &Value) -> Result<Option<Value>> {
        Ok(self.get_record(key)?.map(|record| record.value))
    }

    /// Like `get`, but returns the whole record including its timestamp
    pub fn get_record(&self, key: &Value) -> Result<Option<Record>> {
        let entry = match self.index.get(key) {
            Some(entry) => entry,
            None => return Ok(None),
        };

        match self.read_at(entry)? {
            Decoded::Valid(record) => Ok(Some(record)),
            Decoded::Corrupt => {
                warn!(offset = entry.offset, key = %key, "checksum mismatch on read");
                Ok(None)
            }
            Decoded::Malformed(reason) => {
                warn!(offset = entry.offset, key = %key, %reason, "malformed record on read");
                Ok(None)
            }
        }
    }

    fn read_at(&self, entry: IndexEntry) -> Result<Decoded> {
        let mut file = &self.file;
        file.seek(SeekFrom::Start(entry.offset))?;

        let mut buf = vec![0u8; entry.length as usize];
        file.read_exact(&mut buf)?;
        Ok(codec::decode(&buf))
    }

    /// Force file contents to stable storage
    pub fn sync(&self) -> Result<()> {
        self.file.sync_data()?;
        Ok(())
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    pub fn contains_key(&self, key: &Value) -> bool {
        self.index.contains_key(key)
    }

    /// Number of live keys
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Live keys in no particular order
    pub fn keys(&self) -> impl Iterator<Item = &Value> {
        self.index.keys()
    }

    /// Where `key`'s newest record lives, if anywhere
    pub fn entry(&self, key: &Value) -> Option<IndexEntry> {
        self.index.get(key)
    }

    /// Current end of the log
    pub fn write_cursor(&self) -> u64 {
        self.write_cursor
    }

    /// Stats from the scan that opened this store
    pub fn recovery_stats(&self) -> RecoveryStats {
        self.recovery
    }

    pub fn path(&self) -> &Path {
        &self.config.path
    }
}

/// Seconds since the Unix epoch, saturating at `u32::MAX` (year 2106)
fn now_timestamp() -> u32 {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    u32::try_from(secs).unwrap_or(u32::MAX)
}
