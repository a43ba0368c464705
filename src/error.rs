//! Error types for EmberLog
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using EmberError
pub type Result<T> = std::result::Result<T, EmberError>;

/// Unified error type for EmberLog operations
#[derive(Debug, Error)]
pub enum EmberError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Codec Errors
    // -------------------------------------------------------------------------
    /// A value outside {Integer, Float, Text} reached an encoding boundary
    #[error("Invalid type: {0}")]
    InvalidType(String),

    // -------------------------------------------------------------------------
    // Recovery Errors
    // -------------------------------------------------------------------------
    /// Fatal: found by the recovery scan while opening a store
    #[error("Log corruption at offset {offset}: {reason}")]
    Corruption { offset: u64, reason: String },

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl EmberError {
    pub(crate) fn corruption(offset: u64, reason: impl Into<String>) -> Self {
        EmberError::Corruption {
            offset,
            reason: reason.into(),
        }
    }

    /// True for the fatal recovery-scan variant
    pub fn is_corruption(&self) -> bool {
        matches!(self, EmberError::Corruption { .. })
    }
}
