pub mod amount;
pub mod config_loader;
pub mod constants;
pub mod token;

pub use amount::{Amount, FLOAT_PRECISION, expand_decimals, parse_amount};
pub use config_loader::*;
pub use constants::*;
pub use token::{Token, TokenRegistry};
