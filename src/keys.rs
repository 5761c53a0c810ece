//! Storage key derivation for the DataStore.
//!
//! Every parameter lives under `keccak256(abi.encode(...))` of its name hash
//! followed by the market, token or side it applies to. Name hashes are
//! `keccak256(abi.encode(name))`.

use crate::utils::constants::{DEFAULT_MARKET_TYPE_LABEL, MARKET_SALT_PREFIX};
use alloy_primitives::{keccak256, Address, B256};
use alloy_sol_types::SolValue;
use strum_macros::{AsRefStr, Display, EnumIter};

pub const MIN_COLLATERAL_FACTOR: &str = "MIN_COLLATERAL_FACTOR";
pub const MAX_POOL_AMOUNT: &str = "MAX_POOL_AMOUNT";
pub const MAX_OPEN_INTEREST: &str = "MAX_OPEN_INTEREST";
pub const RESERVE_FACTOR: &str = "RESERVE_FACTOR";
pub const MAX_PNL_FACTOR: &str = "MAX_PNL_FACTOR";
pub const TOKEN_TRANSFER_GAS_LIMIT: &str = "TOKEN_TRANSFER_GAS_LIMIT";
pub const POSITION_FEE_FACTOR: &str = "POSITION_FEE_FACTOR";
pub const POSITION_IMPACT_EXPONENT_FACTOR: &str = "POSITION_IMPACT_EXPONENT_FACTOR";
pub const SWAP_FEE_FACTOR: &str = "SWAP_FEE_FACTOR";
pub const SWAP_IMPACT_EXPONENT_FACTOR: &str = "SWAP_IMPACT_EXPONENT_FACTOR";
pub const FUNDING_FACTOR: &str = "FUNDING_FACTOR";
pub const FUNDING_EXPONENT_FACTOR: &str = "FUNDING_EXPONENT_FACTOR";
pub const BORROWING_FACTOR: &str = "BORROWING_FACTOR";
pub const BORROWING_EXPONENT_FACTOR: &str = "BORROWING_EXPONENT_FACTOR";
pub const POSITION_IMPACT_FACTOR: &str = "POSITION_IMPACT_FACTOR";
pub const MAX_POSITION_IMPACT_FACTOR: &str = "MAX_POSITION_IMPACT_FACTOR";
pub const SWAP_IMPACT_FACTOR: &str = "SWAP_IMPACT_FACTOR";
pub const VIRTUAL_MARKET_ID: &str = "VIRTUAL_MARKET_ID";

/// PnL cap categories. Each one is combined with `MAX_PNL_FACTOR` to form the key,
/// including the "min after ADL" floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, EnumIter)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum PnlFactorType {
    MaxPnlFactorForTraders,
    MaxPnlFactorForAdl,
    MinPnlFactorAfterAdl,
    MaxPnlFactorForDeposits,
    MaxPnlFactorForWithdrawals,
}

impl PnlFactorType {
    pub fn hash(&self) -> B256 {
        hash_string(self.as_ref())
    }

    pub fn label(&self) -> &'static str {
        match self {
            PnlFactorType::MaxPnlFactorForTraders => "max pnl factor for traders",
            PnlFactorType::MaxPnlFactorForAdl => "max pnl factor for adl",
            PnlFactorType::MinPnlFactorAfterAdl => "min pnl factor after adl",
            PnlFactorType::MaxPnlFactorForDeposits => "max pnl factor for deposits",
            PnlFactorType::MaxPnlFactorForWithdrawals => "max pnl factor for withdrawals",
        }
    }
}

/// `keccak256(abi.encode(value))` for a single string.
pub fn hash_string(value: &str) -> B256 {
    keccak256(value.to_string().abi_encode())
}

/// `keccak256(abi.encode(values...))` for a tuple of static values.
pub fn hash_data<T: SolValue>(values: &T) -> B256 {
    keccak256(values.abi_encode())
}

pub fn default_market_type() -> B256 {
    hash_string(DEFAULT_MARKET_TYPE_LABEL)
}

pub fn market_salt(index_token: Address, long_token: Address, short_token: Address, market_type: B256) -> B256 {
    // the string member makes the tuple dynamic, so encode it as a parameter list
    keccak256((MARKET_SALT_PREFIX.to_string(), index_token, long_token, short_token, market_type).abi_encode_params())
}

fn market_key(name: &str, market: Address) -> B256 {
    hash_data(&(hash_string(name), market))
}

fn market_side_key(name: &str, market: Address, flag: bool) -> B256 {
    hash_data(&(hash_string(name), market, flag))
}

pub fn min_collateral_factor_key(market: Address) -> B256 {
    market_key(MIN_COLLATERAL_FACTOR, market)
}

pub fn max_pool_amount_key(market: Address, token: Address) -> B256 {
    hash_data(&(hash_string(MAX_POOL_AMOUNT), market, token))
}

pub fn max_open_interest_key(market: Address, is_long: bool) -> B256 {
    market_side_key(MAX_OPEN_INTEREST, market, is_long)
}

pub fn reserve_factor_key(market: Address, is_long: bool) -> B256 {
    market_side_key(RESERVE_FACTOR, market, is_long)
}

pub fn max_pnl_factor_key(pnl_factor_type: PnlFactorType, market: Address, is_long: bool) -> B256 {
    hash_data(&(hash_string(MAX_PNL_FACTOR), pnl_factor_type.hash(), market, is_long))
}

pub fn token_transfer_gas_limit_key(token: Address) -> B256 {
    market_key(TOKEN_TRANSFER_GAS_LIMIT, token)
}

pub fn position_fee_factor_key(market: Address) -> B256 {
    market_key(POSITION_FEE_FACTOR, market)
}

pub fn position_impact_exponent_factor_key(market: Address) -> B256 {
    market_key(POSITION_IMPACT_EXPONENT_FACTOR, market)
}

pub fn swap_fee_factor_key(market: Address) -> B256 {
    market_key(SWAP_FEE_FACTOR, market)
}

pub fn swap_impact_exponent_factor_key(market: Address) -> B256 {
    market_key(SWAP_IMPACT_EXPONENT_FACTOR, market)
}

pub fn funding_factor_key(market: Address) -> B256 {
    market_key(FUNDING_FACTOR, market)
}

pub fn funding_exponent_factor_key(market: Address) -> B256 {
    market_key(FUNDING_EXPONENT_FACTOR, market)
}

pub fn borrowing_factor_key(market: Address, is_long: bool) -> B256 {
    market_side_key(BORROWING_FACTOR, market, is_long)
}

pub fn borrowing_exponent_factor_key(market: Address, is_long: bool) -> B256 {
    market_side_key(BORROWING_EXPONENT_FACTOR, market, is_long)
}

pub fn position_impact_factor_key(market: Address, is_positive: bool) -> B256 {
    market_side_key(POSITION_IMPACT_FACTOR, market, is_positive)
}

pub fn max_position_impact_factor_key(market: Address, is_positive: bool) -> B256 {
    market_side_key(MAX_POSITION_IMPACT_FACTOR, market, is_positive)
}

pub fn swap_impact_factor_key(market: Address, is_positive: bool) -> B256 {
    market_side_key(SWAP_IMPACT_FACTOR, market, is_positive)
}

pub fn virtual_market_id_key(market: Address) -> B256 {
    market_key(VIRTUAL_MARKET_ID, market)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use strum::IntoEnumIterator;

    #[test]
    fn test_hash_string_matches_abi_encoding() {
        // abi.encode(string): offset, length, right-padded data
        let mut encoded = vec![0u8; 96];
        encoded[31] = 0x20;
        encoded[63] = 8;
        encoded[64..72].copy_from_slice(b"basic-v1");

        assert_eq!(hash_string("basic-v1"), keccak256(&encoded));
        assert_eq!(default_market_type(), keccak256(&encoded));
    }

    #[test]
    fn test_market_side_key_layout() {
        let market = Address::repeat_byte(0x11);

        let mut encoded = Vec::with_capacity(96);
        encoded.extend_from_slice(hash_string(RESERVE_FACTOR).as_slice());
        encoded.extend_from_slice(&[0u8; 12]);
        encoded.extend_from_slice(market.as_slice());
        let mut flag = [0u8; 32];
        flag[31] = 1;
        encoded.extend_from_slice(&flag);

        assert_eq!(reserve_factor_key(market, true), keccak256(&encoded));
    }

    #[test]
    fn test_side_changes_key() {
        let market = Address::repeat_byte(0x11);
        assert_ne!(reserve_factor_key(market, true), reserve_factor_key(market, false));
        assert_ne!(borrowing_factor_key(market, true), borrowing_exponent_factor_key(market, true));
        assert_ne!(position_impact_factor_key(market, true), max_position_impact_factor_key(market, true));
    }

    #[test]
    fn test_pnl_factor_keys_are_distinct() {
        let market = Address::repeat_byte(0x22);
        let keys: HashSet<B256> = PnlFactorType::iter()
            .flat_map(|pnl_type| [max_pnl_factor_key(pnl_type, market, true), max_pnl_factor_key(pnl_type, market, false)])
            .collect();
        assert_eq!(keys.len(), 10);
    }

    #[test]
    fn test_pnl_factor_type_names() {
        assert_eq!(PnlFactorType::MaxPnlFactorForAdl.as_ref(), "MAX_PNL_FACTOR_FOR_ADL");
        assert_eq!(PnlFactorType::MinPnlFactorAfterAdl.to_string(), "MIN_PNL_FACTOR_AFTER_ADL");
        assert_eq!(PnlFactorType::MaxPnlFactorForTraders.hash(), hash_string("MAX_PNL_FACTOR_FOR_TRADERS"));
    }

    #[test]
    fn test_market_salt_depends_on_token_order() {
        let a = Address::repeat_byte(1);
        let b = Address::repeat_byte(2);
        let c = Address::repeat_byte(3);
        let market_type = default_market_type();
        assert_eq!(market_salt(a, b, c, market_type), market_salt(a, b, c, market_type));
        assert_ne!(market_salt(a, b, c, market_type), market_salt(a, c, b, market_type));
    }
}
