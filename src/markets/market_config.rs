use crate::error::ProvisionError;
use crate::keys::{PnlFactorType, default_market_type, hash_string};
use crate::markets::MarketTriple;
use crate::utils::amount::Amount;
use crate::utils::config_loader::{ConfigLoader, ConfigLoaderSync, LoadConfigError, load_from_file, load_from_file_sync};
use crate::utils::constants::SWAP_ONLY_INDEX_TOKEN;
use crate::utils::token::TokenRegistry;
use alloy_primitives::B256;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Root of a provisioning file.
#[derive(Clone, Deserialize, Serialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct ProvisionConfig {
    #[serde(default)]
    pub general: GeneralConfigSection,
    #[serde(default)]
    pub tokens: TokenRegistry,
    #[serde(default)]
    pub markets: Vec<MarketDefinition>,
}

/// Network-wide values applied to every market.
#[derive(Clone, Deserialize, Serialize, Debug, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GeneralConfigSection {
    pub token_transfer_gas_limit: Option<Amount>,
}

#[derive(Clone, Deserialize, Serialize, Debug, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct MarketTokensConfig {
    /// Ignored for swap-only markets.
    pub index_token: Option<String>,
    pub long_token: String,
    pub short_token: String,
}

/// Desired configuration of one market. Every parameter is optional and absent ones are never written.
#[derive(Clone, Deserialize, Serialize, Debug, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct MarketDefinition {
    pub tokens: MarketTokensConfig,
    #[serde(default)]
    pub swap_only: bool,
    /// Label hashed into the market type. Defaults to `basic-v1`.
    pub market_type: Option<String>,

    pub reserve_factor_longs: Option<Amount>,
    pub reserve_factor_shorts: Option<Amount>,

    pub min_collateral_factor: Option<Amount>,

    pub max_long_token_pool_amount: Option<Amount>,
    pub max_short_token_pool_amount: Option<Amount>,

    pub max_open_interest_for_longs: Option<Amount>,
    pub max_open_interest_for_shorts: Option<Amount>,

    pub max_pnl_factor_for_traders_longs: Option<Amount>,
    pub max_pnl_factor_for_traders_shorts: Option<Amount>,
    pub max_pnl_factor_for_adl_longs: Option<Amount>,
    pub max_pnl_factor_for_adl_shorts: Option<Amount>,
    pub min_pnl_factor_after_adl_longs: Option<Amount>,
    pub min_pnl_factor_after_adl_shorts: Option<Amount>,
    pub max_pnl_factor_for_deposits_longs: Option<Amount>,
    pub max_pnl_factor_for_deposits_shorts: Option<Amount>,
    pub max_pnl_factor_for_withdrawals_longs: Option<Amount>,
    pub max_pnl_factor_for_withdrawals_shorts: Option<Amount>,

    pub position_fee_factor: Option<Amount>,
    pub position_impact_exponent_factor: Option<Amount>,
    pub swap_fee_factor: Option<Amount>,
    pub swap_impact_exponent_factor: Option<Amount>,

    pub funding_factor: Option<Amount>,
    pub funding_exponent_factor: Option<Amount>,

    pub borrowing_factor_for_longs: Option<Amount>,
    pub borrowing_factor_for_shorts: Option<Amount>,
    pub borrowing_exponent_factor_for_longs: Option<Amount>,
    pub borrowing_exponent_factor_for_shorts: Option<Amount>,

    pub positive_position_impact_factor: Option<Amount>,
    pub negative_position_impact_factor: Option<Amount>,
    pub positive_max_position_impact_factor: Option<Amount>,
    pub negative_max_position_impact_factor: Option<Amount>,
    pub positive_swap_impact_factor: Option<Amount>,
    pub negative_swap_impact_factor: Option<Amount>,

    /// Virtual market linkage, written as bytes32.
    pub token_market_id: Option<B256>,
}

impl MarketDefinition {
    /// A definition with the given token symbols and no parameters set.
    pub fn new(index_token: Option<&str>, long_token: &str, short_token: &str) -> Self {
        Self {
            tokens: MarketTokensConfig {
                index_token: index_token.map(str::to_string),
                long_token: long_token.to_string(),
                short_token: short_token.to_string(),
            },
            swap_only: index_token.is_none(),
            market_type: None,
            reserve_factor_longs: None,
            reserve_factor_shorts: None,
            min_collateral_factor: None,
            max_long_token_pool_amount: None,
            max_short_token_pool_amount: None,
            max_open_interest_for_longs: None,
            max_open_interest_for_shorts: None,
            max_pnl_factor_for_traders_longs: None,
            max_pnl_factor_for_traders_shorts: None,
            max_pnl_factor_for_adl_longs: None,
            max_pnl_factor_for_adl_shorts: None,
            min_pnl_factor_after_adl_longs: None,
            min_pnl_factor_after_adl_shorts: None,
            max_pnl_factor_for_deposits_longs: None,
            max_pnl_factor_for_deposits_shorts: None,
            max_pnl_factor_for_withdrawals_longs: None,
            max_pnl_factor_for_withdrawals_shorts: None,
            position_fee_factor: None,
            position_impact_exponent_factor: None,
            swap_fee_factor: None,
            swap_impact_exponent_factor: None,
            funding_factor: None,
            funding_exponent_factor: None,
            borrowing_factor_for_longs: None,
            borrowing_factor_for_shorts: None,
            borrowing_exponent_factor_for_longs: None,
            borrowing_exponent_factor_for_shorts: None,
            positive_position_impact_factor: None,
            negative_position_impact_factor: None,
            positive_max_position_impact_factor: None,
            negative_max_position_impact_factor: None,
            positive_swap_impact_factor: None,
            negative_swap_impact_factor: None,
            token_market_id: None,
        }
    }

    /// Resolve token symbols into the on-chain identity of this market.
    pub fn resolve_triple(&self, tokens: &TokenRegistry) -> Result<MarketTriple, ProvisionError> {
        let index_token = if self.swap_only {
            SWAP_ONLY_INDEX_TOKEN
        } else {
            let symbol = self.tokens.index_token.as_deref().ok_or(ProvisionError::MissingIndexToken)?;
            tokens.address_of(symbol)?
        };
        let long_token = tokens.address_of(&self.tokens.long_token)?;
        let short_token = tokens.address_of(&self.tokens.short_token)?;
        Ok(MarketTriple::new(index_token, long_token, short_token))
    }

    /// Configured (longs, shorts) caps of one PnL factor category.
    pub fn pnl_factor(&self, pnl_factor_type: PnlFactorType) -> (Option<Amount>, Option<Amount>) {
        match pnl_factor_type {
            PnlFactorType::MaxPnlFactorForTraders => (self.max_pnl_factor_for_traders_longs, self.max_pnl_factor_for_traders_shorts),
            PnlFactorType::MaxPnlFactorForAdl => (self.max_pnl_factor_for_adl_longs, self.max_pnl_factor_for_adl_shorts),
            PnlFactorType::MinPnlFactorAfterAdl => (self.min_pnl_factor_after_adl_longs, self.min_pnl_factor_after_adl_shorts),
            PnlFactorType::MaxPnlFactorForDeposits => (self.max_pnl_factor_for_deposits_longs, self.max_pnl_factor_for_deposits_shorts),
            PnlFactorType::MaxPnlFactorForWithdrawals => {
                (self.max_pnl_factor_for_withdrawals_longs, self.max_pnl_factor_for_withdrawals_shorts)
            }
        }
    }

    pub fn market_type(&self) -> B256 {
        match &self.market_type {
            Some(label) => hash_string(label),
            None => default_market_type(),
        }
    }
}

#[async_trait]
impl ConfigLoader for ProvisionConfig {
    type SectionType = ProvisionConfig;

    async fn load_section_from_file(file_name: String) -> Result<Self::SectionType, LoadConfigError> {
        load_from_file(file_name).await
    }
}

impl ConfigLoaderSync for ProvisionConfig {
    type SectionType = ProvisionConfig;

    fn load_section_from_file_sync(file_name: String) -> Result<Self::SectionType, LoadConfigError> {
        load_from_file_sync(file_name)
    }
}
