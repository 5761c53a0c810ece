use crate::error::ProvisionError;
use crate::onchain::config::RpcConfig;
use crate::onchain::contracts::{IDataStore, IMarketFactory, IReader};
use crate::onchain::store::{ConfigStore, MarketFactory, MarketProps, MarketRegistry};
use alloy_network::{EthereumWallet, ReceiptResponse};
use alloy_primitives::{Address, B256, Bytes, U256};
use alloy_provider::{DynProvider, Provider, ProviderBuilder};
use alloy_rpc_types_eth::{TransactionInput, TransactionRequest};
use alloy_signer_local::PrivateKeySigner;
use alloy_sol_types::SolCall;
use alloy_transport::{RpcError, TransportResult};
use async_trait::async_trait;
use eyre::Result;
use tracing::{debug, info};

/// DataStore, Reader and MarketFactory reached over JSON-RPC.
#[derive(Clone)]
pub struct RpcChain {
    provider: DynProvider,
    data_store: Address,
    reader: Address,
    market_factory: Address,
}

impl RpcChain {
    pub fn new(provider: DynProvider, data_store: Address, reader: Address, market_factory: Address) -> Self {
        Self { provider, data_store, reader, market_factory }
    }

    /// Build a provider from `config`. Without a private key the chain is read-only and
    /// every transaction fails at submission.
    pub fn connect(config: &RpcConfig) -> Result<Self> {
        let url = config.rpc_url()?;
        let provider = match &config.private_key {
            Some(private_key) => {
                let signer: PrivateKeySigner = private_key.parse().map_err(|e| eyre::eyre!("Invalid PRIVATE_KEY: {}", e))?;
                info!("Sending transactions from {}", signer.address());
                ProviderBuilder::new().wallet(EthereumWallet::from(signer)).connect_http(url).erased()
            }
            None => ProviderBuilder::new().connect_http(url).erased(),
        };

        let data_store = config.data_store_address.ok_or_else(|| eyre::eyre!("DATA_STORE_ADDRESS is not set"))?;
        let reader = config.reader_address.ok_or_else(|| eyre::eyre!("READER_ADDRESS is not set"))?;
        let market_factory = config.market_factory_address.ok_or_else(|| eyre::eyre!("MARKET_FACTORY_ADDRESS is not set"))?;

        Ok(Self::new(provider, data_store, reader, market_factory))
    }

    fn request(to: Address, call_data: Vec<u8>) -> TransactionRequest {
        TransactionRequest::default().to(to).input(TransactionInput::new(Bytes::from(call_data)))
    }

    /// `eth_call` against `to`. An error response from the node counts as a revert.
    async fn call_contract(&self, to: Address, call_data: Vec<u8>, method: &str) -> Result<Bytes> {
        let result: TransportResult<Bytes> = self.provider.call(Self::request(to, call_data)).await;
        match result {
            Ok(output) => Ok(output),
            Err(RpcError::ErrorResp(payload)) => Err(ProvisionError::Reverted(format!("{method}: {}", payload.message)).into()),
            Err(e) => Err(e.into()),
        }
    }

    /// Submit a transaction and wait for its receipt. A failed receipt is an error.
    async fn send_transaction(&self, to: Address, call_data: Vec<u8>, method: &str) -> Result<()> {
        let pending = self.provider.send_transaction(Self::request(to, call_data)).await?;
        let receipt = pending.get_receipt().await?;
        let tx_hash = receipt.transaction_hash();
        if !receipt.status() {
            return Err(ProvisionError::Reverted(format!("{method} ({tx_hash})")).into());
        }
        debug!("{} included in block {:?} ({})", method, receipt.block_number(), tx_hash);
        Ok(())
    }
}

#[async_trait]
impl ConfigStore for RpcChain {
    async fn get_uint(&self, key: B256) -> Result<U256> {
        let output = self.call_contract(self.data_store, IDataStore::getUintCall { key }.abi_encode(), "getUint").await?;
        Ok(IDataStore::getUintCall::abi_decode_returns(&output)?)
    }

    async fn get_bytes32(&self, key: B256) -> Result<B256> {
        let output = self.call_contract(self.data_store, IDataStore::getBytes32Call { key }.abi_encode(), "getBytes32").await?;
        Ok(IDataStore::getBytes32Call::abi_decode_returns(&output)?)
    }

    async fn set_uint(&self, key: B256, value: U256) -> Result<()> {
        self.send_transaction(self.data_store, IDataStore::setUintCall { key, value }.abi_encode(), "setUint").await
    }

    async fn set_bytes32(&self, key: B256, value: B256) -> Result<()> {
        self.send_transaction(self.data_store, IDataStore::setBytes32Call { key, value }.abi_encode(), "setBytes32").await
    }
}

#[async_trait]
impl MarketRegistry for RpcChain {
    async fn get_markets(&self, start: u64, end: u64) -> Result<Vec<MarketProps>> {
        let call = IReader::getMarketsCall { dataStore: self.data_store, start: U256::from(start), end: U256::from(end) };
        let output = self.call_contract(self.reader, call.abi_encode(), "getMarkets").await?;
        let markets = IReader::getMarketsCall::abi_decode_returns(&output)?;
        Ok(markets
            .into_iter()
            .map(|market| MarketProps {
                market_token: market.marketToken,
                index_token: market.indexToken,
                long_token: market.longToken,
                short_token: market.shortToken,
            })
            .collect())
    }
}

#[async_trait]
impl MarketFactory for RpcChain {
    async fn create_market(&self, index_token: Address, long_token: Address, short_token: Address, market_type: B256) -> Result<()> {
        let call = IMarketFactory::createMarketCall { indexToken: index_token, longToken: long_token, shortToken: short_token, marketType: market_type };
        self.send_transaction(self.market_factory, call.abi_encode(), "createMarket").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_targets_contract() {
        let to = Address::repeat_byte(0x42);
        let request = RpcChain::request(to, IDataStore::getUintCall { key: B256::ZERO }.abi_encode());
        assert_eq!(request.to, Some(to.into()));
        assert_eq!(request.input.input().map(|input| input.len()), Some(36));
    }

    #[test]
    fn test_connect_requires_addresses() {
        let config = RpcConfig::default();
        let err = match RpcChain::connect(&config) {
            Ok(_) => panic!("connect succeeded without contract addresses"),
            Err(err) => err,
        };
        assert!(err.to_string().contains("DATA_STORE_ADDRESS"));
    }

    #[test]
    fn test_connect_rejects_bad_key() {
        let config = RpcConfig { private_key: Some("0xnotakey".to_string()), ..RpcConfig::default() };
        assert!(RpcChain::connect(&config).is_err());
    }
}
