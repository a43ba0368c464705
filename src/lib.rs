//! # EmberLog
//!
//! The storage core of a persistent key-value store:
//! - A binary record codec with CRC32 integrity checks
//! - An append-only log with an in-memory index for point lookups
//! - Crash recovery that rebuilds the index by replaying the log
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Caller                                │
//! │                 put(key, value) / get(key)                   │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                      LogStore                                │
//! │         index: key → (offset, length), last writer wins      │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │ RecordCodec │          │  Log File   │
//!   │ (CRC32)     │          │  (Append)   │
//!   └─────────────┘          └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use emberlog::{LogStore, Value};
//!
//! # fn main() -> emberlog::Result<()> {
//! let mut store = LogStore::open("data/ember.log")?;
//! store.put("ipsum", 7.23)?;
//! assert_eq!(store.get(&Value::from("ipsum"))?, Some(Value::Float(7.23)));
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod codec;
pub mod store;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{EmberError, Result};
pub use config::{Config, SyncStrategy};
pub use codec::{Decoded, Record, Value, ValueType};
pub use store::{IndexEntry, LogStore, RecoveryStats};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of EmberLog
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
