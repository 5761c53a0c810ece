use crate::utils::constants::DEFAULT_MARKET_PAGE_SIZE;
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use url::Url;

/// Connection settings and deployed contract addresses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    /// HTTP RPC URL used for calls and transactions
    pub rpc_http_url: String,
    /// Hex private key of the config keeper. Not needed for dry runs.
    #[serde(skip_serializing)]
    pub private_key: Option<String>,
    pub data_store_address: Option<Address>,
    pub reader_address: Option<Address>,
    pub market_factory_address: Option<Address>,
    /// Markets requested per Reader.getMarkets page
    pub market_page_size: u64,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            rpc_http_url: "http://127.0.0.1:8545".to_string(),
            private_key: None,
            data_store_address: None,
            reader_address: None,
            market_factory_address: None,
            market_page_size: DEFAULT_MARKET_PAGE_SIZE,
        }
    }
}

impl RpcConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> eyre::Result<Self> {
        dotenvy::dotenv().ok();
        let mut config = Self::default();

        if let Ok(rpc_http_url) = std::env::var("RPC_HTTP_URL") {
            let _url = Url::parse(&rpc_http_url).map_err(|e| eyre::eyre!("Invalid RPC_HTTP_URL: {}", e))?;
            config.rpc_http_url = rpc_http_url;
        }

        if let Ok(private_key) = std::env::var("PRIVATE_KEY") {
            config.private_key = Some(private_key);
        }

        config.data_store_address = address_from_env("DATA_STORE_ADDRESS")?;
        config.reader_address = address_from_env("READER_ADDRESS")?;
        config.market_factory_address = address_from_env("MARKET_FACTORY_ADDRESS")?;

        if let Ok(page_size_str) = std::env::var("MARKET_PAGE_SIZE") {
            config.market_page_size = page_size_str.parse().map_err(|e| eyre::eyre!("Invalid MARKET_PAGE_SIZE: {}", e))?;
        }

        Ok(config)
    }

    pub fn rpc_url(&self) -> eyre::Result<Url> {
        Url::parse(&self.rpc_http_url).map_err(|e| eyre::eyre!("Invalid RPC URL {}: {}", self.rpc_http_url, e))
    }

    /// Names of the deployment components whose addresses are known.
    pub fn provided_components(&self) -> HashSet<&'static str> {
        let mut provided = HashSet::new();
        if self.data_store_address.is_some() {
            provided.insert("DataStore");
        }
        if self.reader_address.is_some() {
            provided.insert("Reader");
        }
        if self.market_factory_address.is_some() {
            provided.insert("MarketFactory");
        }
        provided
    }
}

fn address_from_env(name: &str) -> eyre::Result<Option<Address>> {
    match std::env::var(name) {
        Ok(value) => value.parse::<Address>().map(Some).map_err(|e| eyre::eyre!("Invalid {}: {}", name, e)),
        Err(_) => Ok(None),
    }
}
