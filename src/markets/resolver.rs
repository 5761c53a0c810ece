use crate::onchain::store::{MarketProps, MarketRegistry};
use alloy_primitives::Address;
use eyre::Result;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::{debug, warn};

/// Identity of a market: (index, long, short). Order sensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MarketTriple {
    pub index_token: Address,
    pub long_token: Address,
    pub short_token: Address,
}

impl MarketTriple {
    pub fn new(index_token: Address, long_token: Address, short_token: Address) -> Self {
        Self { index_token, long_token, short_token }
    }

    pub fn is_swap_only(&self) -> bool {
        self.index_token.is_zero()
    }
}

impl fmt::Display for MarketTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.index_token, self.long_token, self.short_token)
    }
}

/// A market that exists on-chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolvedMarket {
    pub triple: MarketTriple,
    pub market_token: Address,
}

impl From<MarketProps> for ResolvedMarket {
    fn from(props: MarketProps) -> Self {
        Self { triple: MarketTriple::new(props.index_token, props.long_token, props.short_token), market_token: props.market_token }
    }
}

/// Read-only snapshot of the market registry, keyed by triple.
#[derive(Debug, Clone, Default)]
pub struct OnchainMarkets {
    by_triple: HashMap<MarketTriple, ResolvedMarket>,
}

impl OnchainMarkets {
    pub fn from_markets(markets: impl IntoIterator<Item = ResolvedMarket>) -> Self {
        let mut by_triple: HashMap<MarketTriple, ResolvedMarket> = HashMap::new();
        for market in markets {
            if let Some(existing) = by_triple.get(&market.triple) {
                warn!("registry lists market {} twice ({} and {}), keeping the first", market.triple, existing.market_token, market.market_token);
                continue;
            }
            by_triple.insert(market.triple, market);
        }
        Self { by_triple }
    }

    pub fn get(&self, triple: &MarketTriple) -> Option<&ResolvedMarket> {
        self.by_triple.get(triple)
    }

    pub fn contains(&self, triple: &MarketTriple) -> bool {
        self.by_triple.contains_key(triple)
    }

    pub fn len(&self) -> usize {
        self.by_triple.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_triple.is_empty()
    }

    /// Desired triples not yet on-chain, deduplicated, in first-seen order.
    pub fn missing<'a>(&self, desired: impl IntoIterator<Item = &'a MarketTriple>) -> Vec<MarketTriple> {
        let mut seen = HashSet::new();
        desired.into_iter().filter(|triple| !self.contains(triple) && seen.insert(**triple)).copied().collect()
    }
}

/// Enumerate the whole registry, `page_size` markets at a time.
pub async fn fetch_onchain_markets(registry: &dyn MarketRegistry, page_size: u64) -> Result<OnchainMarkets> {
    if page_size == 0 {
        return Err(eyre::eyre!("market page size must be positive"));
    }

    let mut markets = Vec::new();
    let mut start = 0u64;
    loop {
        let end = start + page_size;
        let page = registry.get_markets(start, end).await?;
        let page_len = page.len() as u64;
        debug!("fetched {} markets in range [{}, {})", page_len, start, end);
        markets.extend(page.into_iter().map(ResolvedMarket::from));
        if page_len < page_size {
            break;
        }
        start = end;
    }

    Ok(OnchainMarkets::from_markets(markets))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::onchain::memory::InMemoryChain;
    use crate::onchain::store::MarketFactory;
    use crate::keys::default_market_type;

    fn triple(byte: u8) -> MarketTriple {
        MarketTriple::new(Address::repeat_byte(byte), Address::repeat_byte(byte + 1), Address::repeat_byte(byte + 2))
    }

    #[test]
    fn test_display_joins_with_colon() {
        let t = MarketTriple::new(Address::ZERO, Address::repeat_byte(1), Address::repeat_byte(2));
        let display = t.to_string();
        assert_eq!(display.matches(':').count(), 2);
        assert!(display.starts_with(&Address::ZERO.to_string()));
        assert!(t.is_swap_only());
    }

    #[test]
    fn test_triple_is_order_sensitive() {
        let a = Address::repeat_byte(1);
        let b = Address::repeat_byte(2);
        let c = Address::repeat_byte(3);
        let markets = OnchainMarkets::from_markets([ResolvedMarket { triple: MarketTriple::new(a, b, c), market_token: Address::repeat_byte(9) }]);
        assert!(markets.contains(&MarketTriple::new(a, b, c)));
        assert!(!markets.contains(&MarketTriple::new(a, c, b)));
    }

    #[test]
    fn test_missing_deduplicates() {
        let existing = triple(1);
        let markets = OnchainMarkets::from_markets([ResolvedMarket { triple: existing, market_token: Address::repeat_byte(0xaa) }]);
        let desired = [triple(10), existing, triple(20), triple(10)];
        assert_eq!(markets.missing(desired.iter()), vec![triple(10), triple(20)]);
    }

    #[test]
    fn test_duplicate_registry_entry_keeps_first() {
        let t = triple(1);
        let markets = OnchainMarkets::from_markets([
            ResolvedMarket { triple: t, market_token: Address::repeat_byte(0xaa) },
            ResolvedMarket { triple: t, market_token: Address::repeat_byte(0xbb) },
        ]);
        assert_eq!(markets.len(), 1);
        assert_eq!(markets.get(&t).unwrap().market_token, Address::repeat_byte(0xaa));
    }

    #[tokio::test]
    async fn test_fetch_walks_all_pages() -> Result<()> {
        let chain = InMemoryChain::new();
        for i in 0..5u8 {
            chain.create_market(Address::repeat_byte(i * 3 + 1), Address::repeat_byte(i * 3 + 2), Address::repeat_byte(i * 3 + 3), default_market_type()).await?;
        }

        let markets = fetch_onchain_markets(&chain, 2).await?;
        assert_eq!(markets.len(), 5);
        // 3 full or partial pages: [0,2) [2,4) [4,6)
        assert_eq!(chain.stats().registry_pages(), 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_fetch_exact_multiple_requests_extra_page() -> Result<()> {
        let chain = InMemoryChain::new();
        for i in 0..4u8 {
            chain.create_market(Address::repeat_byte(i * 3 + 1), Address::repeat_byte(i * 3 + 2), Address::repeat_byte(i * 3 + 3), default_market_type()).await?;
        }

        let markets = fetch_onchain_markets(&chain, 2).await?;
        assert_eq!(markets.len(), 4);
        assert_eq!(chain.stats().registry_pages(), 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_fetch_rejects_zero_page_size() {
        let chain = InMemoryChain::new();
        assert!(fetch_onchain_markets(&chain, 0).await.is_err());
    }
}
