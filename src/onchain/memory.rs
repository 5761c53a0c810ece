use crate::error::ProvisionError;
use crate::keys::market_salt;
use crate::onchain::store::{ConfigStore, MarketFactory, MarketProps, MarketRegistry};
use alloy_primitives::{Address, B256, U256};
use async_trait::async_trait;
use dashmap::{DashMap, DashSet};
use eyre::Result;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

/// Call counters of an [`InMemoryChain`].
#[derive(Debug, Default)]
pub struct ChainStats {
    pub reads: AtomicU64,
    pub writes: AtomicU64,
    pub markets_created: AtomicU64,
    pub registry_pages: AtomicU64,
}

impl ChainStats {
    pub fn reads(&self) -> u64 {
        self.reads.load(Ordering::Relaxed)
    }

    pub fn writes(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    pub fn markets_created(&self) -> u64 {
        self.markets_created.load(Ordering::Relaxed)
    }

    pub fn registry_pages(&self) -> u64 {
        self.registry_pages.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.reads.store(0, Ordering::Relaxed);
        self.writes.store(0, Ordering::Relaxed);
        self.markets_created.store(0, Ordering::Relaxed);
        self.registry_pages.store(0, Ordering::Relaxed);
    }
}

/// DataStore, Reader and MarketFactory backed by process memory.
///
/// Unset slots read as zero, like the contract. The factory reverts on a triple that
/// already exists, and writes to keys registered with [`InMemoryChain::revert_on`] fail.
#[derive(Debug, Default)]
pub struct InMemoryChain {
    uints: DashMap<B256, U256>,
    bytes32: DashMap<B256, B256>,
    markets: RwLock<Vec<MarketProps>>,
    reverting_keys: DashSet<B256>,
    stats: ChainStats,
}

impl InMemoryChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> &ChainStats {
        &self.stats
    }

    /// Seed a uint slot without counting a write.
    pub fn seed_uint(&self, key: B256, value: U256) {
        self.uints.insert(key, value);
    }

    /// Seed a bytes32 slot without counting a write.
    pub fn seed_bytes32(&self, key: B256, value: B256) {
        self.bytes32.insert(key, value);
    }

    /// Inspect a uint slot without counting a read.
    pub fn peek_uint(&self, key: &B256) -> Option<U256> {
        self.uints.get(key).map(|value| *value)
    }

    /// Inspect a bytes32 slot without counting a read.
    pub fn peek_bytes32(&self, key: &B256) -> Option<B256> {
        self.bytes32.get(key).map(|value| *value)
    }

    pub fn slot_count(&self) -> usize {
        self.uints.len() + self.bytes32.len()
    }

    /// Make every subsequent write to `key` revert.
    pub fn revert_on(&self, key: B256) {
        self.reverting_keys.insert(key);
    }

    pub async fn markets(&self) -> Vec<MarketProps> {
        self.markets.read().await.clone()
    }

    fn check_revert(&self, key: &B256, method: &str) -> Result<()> {
        if self.reverting_keys.contains(key) {
            return Err(ProvisionError::Reverted(format!("{method}({key})")).into());
        }
        Ok(())
    }
}

#[async_trait]
impl ConfigStore for InMemoryChain {
    async fn get_uint(&self, key: B256) -> Result<U256> {
        self.stats.reads.fetch_add(1, Ordering::Relaxed);
        Ok(self.peek_uint(&key).unwrap_or_default())
    }

    async fn get_bytes32(&self, key: B256) -> Result<B256> {
        self.stats.reads.fetch_add(1, Ordering::Relaxed);
        Ok(self.peek_bytes32(&key).unwrap_or_default())
    }

    async fn set_uint(&self, key: B256, value: U256) -> Result<()> {
        self.check_revert(&key, "setUint")?;
        self.stats.writes.fetch_add(1, Ordering::Relaxed);
        self.uints.insert(key, value);
        Ok(())
    }

    async fn set_bytes32(&self, key: B256, value: B256) -> Result<()> {
        self.check_revert(&key, "setBytes32")?;
        self.stats.writes.fetch_add(1, Ordering::Relaxed);
        self.bytes32.insert(key, value);
        Ok(())
    }
}

#[async_trait]
impl MarketRegistry for InMemoryChain {
    async fn get_markets(&self, start: u64, end: u64) -> Result<Vec<MarketProps>> {
        self.stats.registry_pages.fetch_add(1, Ordering::Relaxed);
        let markets = self.markets.read().await;
        let len = markets.len();
        let start = usize::try_from(start).unwrap_or(usize::MAX).min(len);
        let end = usize::try_from(end).unwrap_or(usize::MAX).clamp(start, len);
        Ok(markets[start..end].to_vec())
    }
}

#[async_trait]
impl MarketFactory for InMemoryChain {
    async fn create_market(&self, index_token: Address, long_token: Address, short_token: Address, market_type: B256) -> Result<()> {
        let mut markets = self.markets.write().await;
        let exists = markets
            .iter()
            .any(|market| market.index_token == index_token && market.long_token == long_token && market.short_token == short_token);
        if exists {
            return Err(ProvisionError::Reverted(format!("createMarket({index_token}, {long_token}, {short_token}): MarketAlreadyExists")).into());
        }

        let salt = market_salt(index_token, long_token, short_token, market_type);
        let market_token = Address::from_slice(&salt[12..]);
        markets.push(MarketProps { market_token, index_token, long_token, short_token });
        self.stats.markets_created.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
