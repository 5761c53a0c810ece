use crate::error::ProvisionError;
use crate::execution::config_writer::{ConfigEntry, ConfigWriter, WriteMode, WriterStats};
use crate::execution::field_expansion::{market_entries, merge_entries};
use crate::markets::{MarketTriple, OnchainMarkets, ProvisionConfig, fetch_onchain_markets};
use crate::onchain::store::{ConfigStore, MarketFactory, MarketRegistry};
use crate::utils::constants::DEFAULT_MARKET_PAGE_SIZE;
use alloy_primitives::B256;
use eyre::Result;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Outcome of one provisioning run
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProvisionReport {
    /// No market definitions were configured
    pub skipped: bool,
    pub markets_existing: usize,
    pub markets_created: Vec<MarketTriple>,
    /// Markets a dry run would have created
    pub markets_planned: Vec<MarketTriple>,
    pub markets_synced: usize,
    pub writer: WriterStats,
    /// Writes a dry run would have sent
    pub pending_writes: Vec<ConfigEntry>,
}

impl ProvisionReport {
    /// Report of a run with no market definitions.
    pub fn skipped() -> Self {
        Self { skipped: true, ..Self::default() }
    }

    pub fn is_converged(&self) -> bool {
        self.markets_created.is_empty() && self.markets_planned.is_empty() && self.writer.writes == 0
    }
}

/// Creates missing markets and synchronizes their DataStore configuration.
///
/// All calls are issued one after another: market creations first, then every field of
/// every market in configuration order.
pub struct Provisioner {
    store: Arc<dyn ConfigStore>,
    registry: Arc<dyn MarketRegistry>,
    factory: Arc<dyn MarketFactory>,
    page_size: u64,
    mode: WriteMode,
}

impl Provisioner {
    pub fn new(store: Arc<dyn ConfigStore>, registry: Arc<dyn MarketRegistry>, factory: Arc<dyn MarketFactory>) -> Self {
        Self { store, registry, factory, page_size: DEFAULT_MARKET_PAGE_SIZE, mode: WriteMode::Apply }
    }

    pub fn mode(&self) -> WriteMode {
        self.mode
    }

    /// Whether the markets step has nothing to do for `config`.
    pub fn should_skip(config: &ProvisionConfig) -> bool {
        config.markets.is_empty()
    }

    pub async fn provision(&self, config: &ProvisionConfig) -> Result<ProvisionReport> {
        if Self::should_skip(config) {
            warn!("no markets configured, skipping market provisioning");
            return Ok(ProvisionReport::skipped());
        }

        let triples = config.markets.iter().map(|definition| definition.resolve_triple(&config.tokens)).collect::<Result<Vec<_>, ProvisionError>>()?;

        let mut report = ProvisionReport::default();
        let onchain = fetch_onchain_markets(self.registry.as_ref(), self.page_size).await?;
        info!("{} markets on-chain, {} configured", onchain.len(), config.markets.len());

        let onchain = self.create_missing_markets(config, &triples, onchain, &mut report).await?;

        // one entry list per market, so a triple defined twice writes each key once
        let mut per_market: Vec<(MarketTriple, Vec<ConfigEntry>)> = Vec::new();
        for (definition, triple) in config.markets.iter().zip(&triples) {
            let Some(market) = onchain.get(triple) else {
                if report.markets_planned.contains(triple) {
                    warn!("market {} does not exist yet, skipping its fields in dry run", triple);
                    continue;
                }
                return Err(ProvisionError::MarketNotResolved(*triple).into());
            };

            let entries = market_entries(definition, market, &config.general);
            match per_market.iter_mut().find(|(synced, _)| *synced == *triple) {
                Some((_, existing)) => merge_entries(existing, entries),
                None => per_market.push((*triple, entries)),
            }
        }

        let mut writer = ConfigWriter::new(self.store.as_ref(), self.mode);
        for (_, entries) in &per_market {
            for entry in entries {
                writer.apply(entry).await?;
            }
            report.markets_synced += 1;
        }

        report.writer = writer.stats();
        report.pending_writes = writer.pending().to_vec();
        info!(
            "market provisioning done: {} created, {} synced, {} writes, {} unchanged",
            report.markets_created.len(),
            report.markets_synced,
            report.writer.writes,
            report.writer.unchanged
        );
        Ok(report)
    }

    /// Create every configured triple absent from `onchain`, then take a fresh snapshot.
    async fn create_missing_markets(
        &self,
        config: &ProvisionConfig,
        triples: &[MarketTriple],
        onchain: OnchainMarkets,
        report: &mut ProvisionReport,
    ) -> Result<OnchainMarkets> {
        // the first definition of a triple decides its market type
        let mut market_types: HashMap<MarketTriple, B256> = HashMap::new();
        for (definition, triple) in config.markets.iter().zip(triples) {
            market_types.entry(*triple).or_insert_with(|| definition.market_type());
            if let Some(market) = onchain.get(triple) {
                info!("market {} already exists at {}", triple, market.market_token);
            }
        }

        let missing = onchain.missing(triples.iter());
        report.markets_existing = market_types.len() - missing.len();
        if missing.is_empty() {
            return Ok(onchain);
        }

        for triple in missing {
            let market_type = market_types.get(&triple).copied().unwrap_or_default();
            if self.mode == WriteMode::DryRun {
                info!("would create market {}:{}", triple, market_type);
                report.markets_planned.push(triple);
                continue;
            }

            info!("creating market {}:{}", triple, market_type);
            self.factory.create_market(triple.index_token, triple.long_token, triple.short_token, market_type).await?;
            report.markets_created.push(triple);
        }

        if report.markets_created.is_empty() {
            return Ok(onchain);
        }
        fetch_onchain_markets(self.registry.as_ref(), self.page_size).await
    }
}

/// Builder for [`Provisioner`]
#[derive(Default)]
pub struct ProvisionerBuilder {
    store: Option<Arc<dyn ConfigStore>>,
    registry: Option<Arc<dyn MarketRegistry>>,
    factory: Option<Arc<dyn MarketFactory>>,
    page_size: Option<u64>,
    mode: WriteMode,
}

impl ProvisionerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use one backend for the store, the registry and the factory.
    pub fn with_chain<C>(self, chain: Arc<C>) -> Self
    where
        C: ConfigStore + MarketRegistry + MarketFactory + 'static,
    {
        self.with_store(chain.clone()).with_registry(chain.clone()).with_factory(chain)
    }

    pub fn with_store(mut self, store: Arc<dyn ConfigStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_registry(mut self, registry: Arc<dyn MarketRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn with_factory(mut self, factory: Arc<dyn MarketFactory>) -> Self {
        self.factory = Some(factory);
        self
    }

    pub fn with_page_size(mut self, page_size: u64) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.mode = if dry_run { WriteMode::DryRun } else { WriteMode::Apply };
        self
    }

    pub fn build(self) -> Result<Provisioner> {
        let store = self.store.ok_or_else(|| eyre::eyre!("Provisioner needs a config store"))?;
        let registry = self.registry.ok_or_else(|| eyre::eyre!("Provisioner needs a market registry"))?;
        let factory = self.factory.ok_or_else(|| eyre::eyre!("Provisioner needs a market factory"))?;

        let mut provisioner = Provisioner::new(store, registry, factory);
        provisioner.mode = self.mode;
        if let Some(page_size) = self.page_size {
            provisioner.page_size = page_size;
        }
        Ok(provisioner)
    }
}
