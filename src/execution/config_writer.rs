use crate::onchain::store::ConfigStore;
use alloy_primitives::{B256, U256};
use eyre::Result;
use serde::Serialize;
use std::fmt;
use tracing::{debug, info};

/// Desired value of one DataStore slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConfigValue {
    Uint(U256),
    Bytes32(B256),
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Uint(value) => write!(f, "{value}"),
            ConfigValue::Bytes32(value) => write!(f, "{value}"),
        }
    }
}

/// A key, the value it should hold and a label for logs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigEntry {
    pub key: B256,
    pub value: ConfigValue,
    pub label: String,
}

impl ConfigEntry {
    pub fn uint(key: B256, value: U256, label: impl Into<String>) -> Self {
        Self { key, value: ConfigValue::Uint(value), label: label.into() }
    }

    pub fn bytes32(key: B256, value: B256, label: impl Into<String>) -> Self {
        Self { key, value: ConfigValue::Bytes32(value), label: label.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum WriteMode {
    #[default]
    Apply,
    /// Read current values and record differences without sending transactions
    DryRun,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct WriterStats {
    pub reads: u64,
    pub writes: u64,
    pub unchanged: u64,
}

/// Writes a slot only when its on-chain value differs from the desired one.
///
/// The store is the only source of truth: every call reads the current value, nothing is cached.
pub struct ConfigWriter<'a> {
    store: &'a dyn ConfigStore,
    mode: WriteMode,
    stats: WriterStats,
    pending: Vec<ConfigEntry>,
}

impl<'a> ConfigWriter<'a> {
    pub fn new(store: &'a dyn ConfigStore, mode: WriteMode) -> Self {
        Self { store, mode, stats: WriterStats::default(), pending: Vec::new() }
    }

    pub fn stats(&self) -> WriterStats {
        self.stats
    }

    /// Writes that a dry run would have sent
    pub fn pending(&self) -> &[ConfigEntry] {
        &self.pending
    }

    /// Returns whether a write was issued (or, in dry-run mode, would have been).
    pub async fn set_uint_if_different(&mut self, key: B256, value: U256, label: &str) -> Result<bool> {
        self.stats.reads += 1;
        let current = self.store.get_uint(key).await?;
        if current == value {
            self.record_unchanged(label);
            return Ok(false);
        }

        info!("{}: {} -> {}", label, current, value);
        if self.mode == WriteMode::DryRun {
            self.pending.push(ConfigEntry::uint(key, value, label));
        } else {
            self.store.set_uint(key, value).await?;
        }
        self.stats.writes += 1;
        Ok(true)
    }

    /// Returns whether a write was issued (or, in dry-run mode, would have been).
    pub async fn set_bytes32_if_different(&mut self, key: B256, value: B256, label: &str) -> Result<bool> {
        self.stats.reads += 1;
        let current = self.store.get_bytes32(key).await?;
        if current == value {
            self.record_unchanged(label);
            return Ok(false);
        }

        info!("{}: {} -> {}", label, current, value);
        if self.mode == WriteMode::DryRun {
            self.pending.push(ConfigEntry::bytes32(key, value, label));
        } else {
            self.store.set_bytes32(key, value).await?;
        }
        self.stats.writes += 1;
        Ok(true)
    }

    pub async fn apply(&mut self, entry: &ConfigEntry) -> Result<bool> {
        match entry.value {
            ConfigValue::Uint(value) => self.set_uint_if_different(entry.key, value, &entry.label).await,
            ConfigValue::Bytes32(value) => self.set_bytes32_if_different(entry.key, value, &entry.label).await,
        }
    }

    fn record_unchanged(&mut self, label: &str) {
        debug!("{} unchanged", label);
        self.stats.unchanged += 1;
    }
}
