//! Fundamental types for the satoshi-bound asset wallet.
//!
//! This crate defines the value types shared by every other crate in the workspace:
//! arbitrary-precision decimals, asset names and asset lists, outpoints, the wire
//! output shape, and the network identifier.

pub mod asset;
pub mod decimal;
pub mod error;
pub mod network;
pub mod outpoint;
pub mod wire;

pub use asset::{binding_sat_num, is_multiple_of, AssetInfo, AssetListError, AssetName, TxAssets};
pub use decimal::{Decimal, DEFAULT_PRECISION, MAX_PRECISION};
pub use error::ParseError;
pub use network::NetworkId;
pub use outpoint::{tx_id_from_utxo, OutPoint, UtxoId};
pub use wire::TxOut;
