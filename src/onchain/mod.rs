/// On-chain access layer
///
/// The provisioner only talks to the protocol through the traits in [`store`]:
/// - `ConfigStore` for DataStore reads and writes
/// - `MarketRegistry` for the Reader's market enumeration
/// - `MarketFactory` for market deployment
///
/// [`rpc::RpcChain`] implements them over JSON-RPC and [`memory::InMemoryChain`]
/// in process memory.
pub mod config;
pub mod contracts;
pub mod memory;
pub mod rpc;
pub mod store;

pub use config::RpcConfig;
pub use memory::{ChainStats, InMemoryChain};
pub use rpc::RpcChain;
pub use store::{ConfigStore, MarketFactory, MarketProps, MarketRegistry};
