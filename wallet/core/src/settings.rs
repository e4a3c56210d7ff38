//!
//! Wallet engine settings, loaded from a TOML file.
//!

use crate::result::Result;
use kastx_addresses::Prefix;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Largest number of inputs a built transaction may spend.
pub const DEFAULT_MAX_INPUTS: usize = 84;

/// Minimum value locked into a KRC20 commit output, 0.2 KAS.
pub const DEFAULT_DUST_SOMPI: u64 = 20_000_000;

/// Mass assumed for a reveal transaction when estimating its fee before the commit exists.
pub const DEFAULT_REVEAL_TRANSACTION_MASS: u64 = 4_100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Settings {
    /// Address prefix of the network the wallet operates on
    pub network: Prefix,
    pub max_inputs: usize,
    pub dust_sompi: u64,
    pub reveal_transaction_mass: u64,
    /// Logger filter expression, `RUST_LOG` syntax
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            network: Prefix::Mainnet,
            max_inputs: DEFAULT_MAX_INPUTS,
            dust_sompi: DEFAULT_DUST_SOMPI,
            reveal_transaction_mass: DEFAULT_REVEAL_TRANSACTION_MASS,
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    pub fn testnet() -> Self {
        Self { network: Prefix::Testnet, ..Default::default() }
    }

    pub fn from_toml_str(toml: &str) -> Result<Self> {
        Ok(toml::from_str::<Settings>(toml)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_toml_str(&std::fs::read_to_string(path)?)
    }

    /// Installs the console logger with the configured filter.
    pub fn init_logger(&self) {
        kastx_core::log::init_logger(&self.log_level);
    }
}
