//! Configuration for EmberLog
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::error::{EmberError, Result};

/// Main configuration for a LogStore instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// The single append-only log file backing the store
    pub path: PathBuf,

    /// Create missing parent directories when opening
    pub create_parent_dirs: bool,

    // -------------------------------------------------------------------------
    // Durability Configuration
    // -------------------------------------------------------------------------
    /// What `put` does after appending a record
    pub sync_strategy: SyncStrategy,
}

/// Durability strategy applied after every append
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStrategy {
    /// flush + fdatasync after every write (safest, slowest)
    EveryWrite,

    /// flush user-space buffers only; the OS decides when bytes hit the disk
    FlushOnly,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./ember.log"),
            create_parent_dirs: true,
            sync_strategy: SyncStrategy::EveryWrite,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Reject configurations that can never open
    pub fn validate(&self) -> Result<()> {
        if self.path.as_os_str().is_empty() {
            return Err(EmberError::Config("log path is empty".to_string()));
        }
        if self.path.is_dir() {
            return Err(EmberError::Config(format!(
                "log path {} is a directory",
                self.path.display()
            )));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the log file path
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.path = path.into();
        self
    }

    /// Set the sync strategy
    pub fn sync_strategy(mut self, strategy: SyncStrategy) -> Self {
        self.config.sync_strategy = strategy;
        self
    }

    /// Whether to create missing parent directories
    pub fn create_parent_dirs(mut self, create: bool) -> Self {
        self.config.create_parent_dirs = create;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
