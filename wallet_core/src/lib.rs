//! Wallet boundary for satoshi-bound assets.
//!
//! Sits between the accounting records in `sat-outputs` and the rest of a
//! wallet:
//! - Decoding indexer output records ([`indexer`])
//! - Combining inputs and cutting payments ([`assemble`])
//! - Advisory locks on outputs used by in-flight builds ([`locker`])
//! - TOML configuration ([`config`])

pub mod assemble;
pub mod config;
pub mod error;
pub mod indexer;
pub mod locker;

pub use assemble::{combine_and_split, combine_and_split_native, combined_asset_offset};
pub use config::WalletConfig;
pub use error::WalletError;
pub use indexer::{IndexerAsset, IndexerOffset, IndexerOutput};
pub use locker::{LockedUtxo, UtxoLocker};

