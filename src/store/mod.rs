//! Store Module
//!
//! The append-only log engine built on top of the record codec.
//!
//! ## Responsibilities
//! - Own the single log file (append + positioned reads)
//! - Keep a key → (offset, length) index of the newest record per key
//! - Rebuild that index on open by replaying the whole log
//! - Treat any verification failure during that replay as fatal
//!
//! ## File Layout
//! ```text
//! ┌──────────┬──────────┬──────────┬─────┬──────────┐
//! │ Record 0 │ Record 1 │ Record 2 │ ... │ Record N │   (no file header)
//! └──────────┴──────────┴──────────┴─────┴──────────┘
//!  ^offset 0  ^offset = len(Record 0)       ^write cursor after append
//! ```
//!
//! Rewriting a key appends a new record; the old bytes stay in the file.

mod index;
mod log;
mod recovery;

pub use index::{Index, IndexEntry};
pub use log::LogStore;
pub use recovery::{verify, RecoveryScan, RecoveryStats};
