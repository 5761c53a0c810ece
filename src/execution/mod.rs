/// Execution Layer
///
/// Turns market definitions into on-chain state:
/// - Market creation for triples missing from the registry
/// - Expansion of each definition into DataStore keys and values
/// - Read-compare-write of every key, skipping values already in place

pub mod config_writer;
pub mod field_expansion;
pub mod provisioner;


pub use config_writer::{ConfigEntry, ConfigValue, ConfigWriter, WriteMode, WriterStats};
pub use field_expansion::market_entries;
pub use provisioner::{ProvisionReport, Provisioner, ProvisionerBuilder};
