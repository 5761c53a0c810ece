use crate::execution::config_writer::ConfigEntry;
use crate::keys::{self, PnlFactorType};
use crate::markets::{GeneralConfigSection, MarketDefinition, ResolvedMarket};
use crate::utils::amount::Amount;
use alloy_primitives::{Address, B256};
use strum::IntoEnumIterator;
use tracing::warn;

fn side(is_long: bool) -> &'static str {
    if is_long { "long" } else { "short" }
}

/// Collects entries for present values only.
struct EntryList {
    entries: Vec<ConfigEntry>,
}

impl EntryList {
    fn uint(&mut self, value: Option<Amount>, key: impl FnOnce() -> B256, label: impl FnOnce() -> String) {
        if let Some(value) = value {
            self.entries.push(ConfigEntry::uint(key(), value.value(), label()));
        }
    }
}

/// Expand a market definition into DataStore entries, in write order.
///
/// Absent parameters produce no entry. The order is fixed: scalar limits, PnL caps,
/// the token transfer gas limit, fee and impact factors, then the virtual market id.
pub fn market_entries(definition: &MarketDefinition, market: &ResolvedMarket, general: &GeneralConfigSection) -> Vec<ConfigEntry> {
    let market_token = market.market_token;
    let triple = market.triple;
    let mut list = EntryList { entries: Vec::new() };

    list.uint(definition.min_collateral_factor, || keys::min_collateral_factor_key(market_token), || {
        format!("min collateral factor {market_token}")
    });

    for (token, amount) in [
        (triple.long_token, definition.max_long_token_pool_amount),
        (triple.short_token, definition.max_short_token_pool_amount),
    ] {
        list.uint(amount, || keys::max_pool_amount_key(market_token, token), || format!("max pool amount {market_token} {token}"));
    }

    for (is_long, amount) in [(true, definition.max_open_interest_for_longs), (false, definition.max_open_interest_for_shorts)] {
        list.uint(amount, || keys::max_open_interest_key(market_token, is_long), || {
            format!("max open interest {market_token} {}", side(is_long))
        });
    }

    for (is_long, amount) in [(true, definition.reserve_factor_longs), (false, definition.reserve_factor_shorts)] {
        list.uint(amount, || keys::reserve_factor_key(market_token, is_long), || format!("reserve factor {market_token} {}", side(is_long)));
    }

    // variant order is the write order
    for pnl_factor_type in PnlFactorType::iter() {
        let (longs, shorts) = definition.pnl_factor(pnl_factor_type);
        for (is_long, amount) in [(true, longs), (false, shorts)] {
            list.uint(amount, || keys::max_pnl_factor_key(pnl_factor_type, market_token, is_long), || {
                format!("{} {market_token} {}", pnl_factor_type.label(), side(is_long))
            });
        }
    }

    list.uint(general.token_transfer_gas_limit, || keys::token_transfer_gas_limit_key(market_token), || {
        format!("market token transfer gas limit {market_token}")
    });

    let market_factors: [(&str, Option<Amount>, fn(Address) -> B256); 5] = [
        ("position fee factor", definition.position_fee_factor, keys::position_fee_factor_key),
        ("position impact exponent factor", definition.position_impact_exponent_factor, keys::position_impact_exponent_factor_key),
        ("swap fee factor", definition.swap_fee_factor, keys::swap_fee_factor_key),
        ("swap impact exponent factor", definition.swap_impact_exponent_factor, keys::swap_impact_exponent_factor_key),
        ("funding factor", definition.funding_factor, keys::funding_factor_key),
    ];
    for (name, amount, key_fn) in market_factors {
        list.uint(amount, || key_fn(market_token), || format!("{name} for {market_token}"));
    }

    list.uint(definition.borrowing_factor_for_longs, || keys::borrowing_factor_key(market_token, true), || {
        format!("borrowing factor for longs for {market_token}")
    });
    list.uint(definition.funding_exponent_factor, || keys::funding_exponent_factor_key(market_token), || {
        format!("funding exponent factor for {market_token}")
    });
    list.uint(definition.borrowing_factor_for_shorts, || keys::borrowing_factor_key(market_token, false), || {
        format!("borrowing factor for shorts for {market_token}")
    });
    list.uint(definition.borrowing_exponent_factor_for_longs, || keys::borrowing_exponent_factor_key(market_token, true), || {
        format!("borrowing exponent factor for longs for {market_token}")
    });
    list.uint(definition.borrowing_exponent_factor_for_shorts, || keys::borrowing_exponent_factor_key(market_token, false), || {
        format!("borrowing exponent factor for shorts for {market_token}")
    });

    let impact_factors: [(&str, Option<Amount>, Option<Amount>, fn(Address, bool) -> B256); 3] = [
        (
            "position impact factor",
            definition.positive_position_impact_factor,
            definition.negative_position_impact_factor,
            keys::position_impact_factor_key,
        ),
        (
            "max position impact factor",
            definition.positive_max_position_impact_factor,
            definition.negative_max_position_impact_factor,
            keys::max_position_impact_factor_key,
        ),
        ("swap impact factor", definition.positive_swap_impact_factor, definition.negative_swap_impact_factor, keys::swap_impact_factor_key),
    ];
    for (name, positive, negative, key_fn) in impact_factors {
        for (is_positive, amount) in [(true, positive), (false, negative)] {
            let sign = if is_positive { "positive" } else { "negative" };
            list.uint(amount, || key_fn(market_token, is_positive), || format!("{sign} {name} for {market_token}"));
        }
    }

    let mut entries = list.entries;
    if let Some(token_market_id) = definition.token_market_id {
        entries.push(ConfigEntry::bytes32(
            keys::virtual_market_id_key(market_token),
            token_market_id,
            format!("virtual market id for market {market_token}"),
        ));
    }
    entries
}

/// Fold `incoming` into `entries`. A key already present keeps its position and takes the
/// incoming value, so every key appears once and the last definition wins.
pub fn merge_entries(entries: &mut Vec<ConfigEntry>, incoming: Vec<ConfigEntry>) {
    for entry in incoming {
        match entries.iter_mut().find(|existing| existing.key == entry.key) {
            Some(existing) => {
                if existing.value != entry.value {
                    warn!("{} configured twice ({} and {}), using {}", entry.label, existing.value, entry.value, entry.value);
                }
                *existing = entry;
            }
            None => entries.push(entry),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::config_writer::ConfigValue;
    use crate::markets::MarketTriple;
    use alloy_primitives::{Address, U256};

    fn market() -> ResolvedMarket {
        ResolvedMarket {
            triple: MarketTriple::new(Address::repeat_byte(1), Address::repeat_byte(2), Address::repeat_byte(3)),
            market_token: Address::repeat_byte(0xaa),
        }
    }

    #[test]
    fn test_empty_definition_yields_nothing() {
        let definition = MarketDefinition::new(Some("ETH"), "ETH", "USDC");
        assert!(market_entries(&definition, &market(), &GeneralConfigSection::default()).is_empty());
    }

    #[test]
    fn test_write_order() {
        let mut definition = MarketDefinition::new(Some("ETH"), "ETH", "USDC");
        definition.token_market_id = Some(B256::with_last_byte(9));
        definition.negative_swap_impact_factor = Some(Amount::from(8u64));
        definition.funding_exponent_factor = Some(Amount::from(7u64));
        definition.borrowing_factor_for_longs = Some(Amount::from(6u64));
        definition.position_fee_factor = Some(Amount::from(5u64));
        definition.max_pnl_factor_for_withdrawals_shorts = Some(Amount::from(4u64));
        definition.max_pnl_factor_for_traders_longs = Some(Amount::from(3u64));
        definition.reserve_factor_shorts = Some(Amount::from(2u64));
        definition.min_collateral_factor = Some(Amount::from(1u64));
        let general = GeneralConfigSection { token_transfer_gas_limit: Some(Amount::from(200_000u64)) };

        let market = market();
        let token = market.market_token;
        let entries = market_entries(&definition, &market, &general);
        let written_keys: Vec<B256> = entries.iter().map(|entry| entry.key).collect();
        assert_eq!(
            written_keys,
            vec![
                keys::min_collateral_factor_key(token),
                keys::reserve_factor_key(token, false),
                keys::max_pnl_factor_key(PnlFactorType::MaxPnlFactorForTraders, token, true),
                keys::max_pnl_factor_key(PnlFactorType::MaxPnlFactorForWithdrawals, token, false),
                keys::token_transfer_gas_limit_key(token),
                keys::position_fee_factor_key(token),
                keys::borrowing_factor_key(token, true),
                keys::funding_exponent_factor_key(token),
                keys::swap_impact_factor_key(token, false),
                keys::virtual_market_id_key(token),
            ]
        );
        assert_eq!(entries[4].value, ConfigValue::Uint(U256::from(200_000)));
        assert_eq!(entries[9].value, ConfigValue::Bytes32(B256::with_last_byte(9)));
    }

    #[test]
    fn test_pool_amounts_use_long_and_short_tokens() {
        let mut definition = MarketDefinition::new(Some("ETH"), "ETH", "USDC");
        definition.max_long_token_pool_amount = Some(Amount::from(10u64));
        definition.max_short_token_pool_amount = Some(Amount::from(20u64));

        let market = market();
        let entries = market_entries(&definition, &market, &GeneralConfigSection::default());
        assert_eq!(entries[0].key, keys::max_pool_amount_key(market.market_token, market.triple.long_token));
        assert_eq!(entries[1].key, keys::max_pool_amount_key(market.market_token, market.triple.short_token));
        assert!(entries[1].label.contains(&market.triple.short_token.to_string()));
    }

    #[test]
    fn test_explicit_zero_produces_entry() {
        let mut definition = MarketDefinition::new(Some("ETH"), "ETH", "USDC");
        definition.borrowing_factor_for_shorts = Some(Amount::from(0u64));
        let entries = market_entries(&definition, &market(), &GeneralConfigSection::default());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].value, ConfigValue::Uint(U256::ZERO));
        assert_eq!(entries[0].label, format!("borrowing factor for shorts for {}", market().market_token));
    }

    #[test]
    fn test_merge_keeps_first_position_and_last_value() {
        let market = market();
        let mut first = MarketDefinition::new(Some("ETH"), "ETH", "USDC");
        first.min_collateral_factor = Some(Amount::from(1u64));
        first.reserve_factor_longs = Some(Amount::from(5u64));
        let mut second = MarketDefinition::new(Some("ETH"), "ETH", "USDC");
        second.reserve_factor_longs = Some(Amount::from(6u64));
        second.funding_factor = Some(Amount::from(2u64));

        let mut entries = market_entries(&first, &market, &GeneralConfigSection::default());
        merge_entries(&mut entries, market_entries(&second, &market, &GeneralConfigSection::default()));

        let token = market.market_token;
        let merged: Vec<(B256, ConfigValue)> = entries.iter().map(|entry| (entry.key, entry.value)).collect();
        assert_eq!(
            merged,
            vec![
                (keys::min_collateral_factor_key(token), ConfigValue::Uint(U256::from(1))),
                (keys::reserve_factor_key(token, true), ConfigValue::Uint(U256::from(6))),
                (keys::funding_factor_key(token), ConfigValue::Uint(U256::from(2))),
            ]
        );
    }

    #[test]
    fn test_pnl_labels() {
        let mut definition = MarketDefinition::new(Some("ETH"), "ETH", "USDC");
        definition.min_pnl_factor_after_adl_longs = Some(Amount::from(1u64));
        let entries = market_entries(&definition, &market(), &GeneralConfigSection::default());
        assert_eq!(entries[0].label, format!("min pnl factor after adl {} long", market().market_token));
    }
}
