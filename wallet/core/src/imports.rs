//!
//! This file contains most common imports that
//! are used internally in the wallet engine.
//!

pub use crate::error::Error;
pub use crate::result::Result;
pub use crate::settings::Settings;

pub use async_trait::async_trait;
pub use borsh::{BorshDeserialize, BorshSerialize};
pub use dashmap::DashMap;
pub use kastx_addresses::{Address, Prefix};
pub use kastx_consensus_core::tx::{ScriptPublicKey, TransactionId};
pub use kastx_core::log::{debug, info, trace, warn};
pub use kastx_hashes::Hash;
pub use kastx_txscript::STANDARD_SCRIPT_VERSION;
pub use parking_lot::{Mutex, RwLock};
pub use serde::{Deserialize, Serialize};
pub use std::sync::Arc;
