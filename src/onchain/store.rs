use alloy_primitives::{Address, B256, U256};
use async_trait::async_trait;
use eyre::Result;
use serde::Serialize;

/// A market as returned by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MarketProps {
    pub market_token: Address,
    pub index_token: Address,
    pub long_token: Address,
    pub short_token: Address,
}

/// Key-value store holding protocol configuration.
///
/// Every call is awaited before the next one is issued; implementations need not
/// support concurrent writes.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    async fn get_uint(&self, key: B256) -> Result<U256>;

    async fn get_bytes32(&self, key: B256) -> Result<B256>;

    async fn set_uint(&self, key: B256, value: U256) -> Result<()>;

    async fn set_bytes32(&self, key: B256, value: B256) -> Result<()>;
}

/// Paginated enumeration of deployed markets.
#[async_trait]
pub trait MarketRegistry: Send + Sync {
    /// Markets with registry index in `[start, end)`.
    async fn get_markets(&self, start: u64, end: u64) -> Result<Vec<MarketProps>>;
}

#[async_trait]
pub trait MarketFactory: Send + Sync {
    /// Deploys a market and waits for it to be included. Callers are responsible for
    /// not creating the same triple twice.
    async fn create_market(&self, index_token: Address, long_token: Address, short_token: Address, market_type: B256) -> Result<()>;
}
