pub mod market_config;
pub mod resolver;

pub use market_config::{GeneralConfigSection, MarketDefinition, MarketTokensConfig, ProvisionConfig};
pub use resolver::{MarketTriple, OnchainMarkets, ResolvedMarket, fetch_onchain_markets};
