use crate::markets::MarketTriple;

/// Failures that abort a provisioning run before or between external calls.
#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    #[error("unknown token symbol: {0}")]
    UnknownToken(String),
    #[error("invalid numeric value: {0}")]
    InvalidValue(String),
    #[error("market {0} is not resolved on-chain after the creation phase")]
    MarketNotResolved(MarketTriple),
    #[error("market definition is not swap-only but has no index token")]
    MissingIndexToken,
    #[error("step {step} depends on {dependency}, which is not provided")]
    MissingDependency { step: String, dependency: String },
    #[error("dependency cycle between deployment steps: {0}")]
    DependencyCycle(String),
    #[error("transaction {0} reverted")]
    Reverted(String),
}
