use alloy_primitives::Address;

/// Index token used for swap-only markets.
pub const SWAP_ONLY_INDEX_TOKEN: Address = Address::ZERO;

/// Label hashed into the default market type tag.
pub const DEFAULT_MARKET_TYPE_LABEL: &str = "basic-v1";

/// Prefix of the create2 salt used by the market factory.
pub const MARKET_SALT_PREFIX: &str = "GMX_MARKET";

/// Number of markets requested per registry page.
pub const DEFAULT_MARKET_PAGE_SIZE: u64 = 1000;
