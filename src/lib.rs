// Layers
pub mod markets; // Config Layer: market definitions, on-chain identity resolution
pub mod onchain; // Access Layer: DataStore, Reader and MarketFactory bindings
pub mod execution; // Execution Layer: market creation and idempotent config writes

// Deployment step metadata
pub mod deploy;

// Common utilities and types
pub mod error;
pub mod keys;
pub mod utils;

// Re-export key components from each layer
pub use deploy::{MARKETS_STEP, StepDescriptor, check_dependencies, order_steps};
pub use error::ProvisionError;
pub use execution::{ConfigEntry, ConfigValue, ConfigWriter, ProvisionReport, Provisioner, ProvisionerBuilder, WriteMode, WriterStats};
pub use markets::{GeneralConfigSection, MarketDefinition, MarketTriple, OnchainMarkets, ProvisionConfig, ResolvedMarket};
pub use onchain::{ConfigStore, InMemoryChain, MarketFactory, MarketProps, MarketRegistry, RpcChain, RpcConfig};
pub use utils::{Amount, Token, TokenRegistry};
