//! Parse errors for the text forms of the fundamental types.

use thiserror::Error;

/// Malformed input in one of the text forms accepted by this crate.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty decimal string")]
    EmptyDecimal,

    #[error("invalid decimal format: {0}")]
    InvalidDecimal(String),

    #[error("decimal {value} exceeds maximum precision {max}")]
    PrecisionExceeded { value: String, max: u8 },

    #[error("precision {0} is above the supported maximum of 18")]
    PrecisionOutOfRange(u8),

    #[error("invalid asset name: {0}")]
    InvalidAssetName(String),

    #[error("invalid outpoint: {0}")]
    InvalidOutPoint(String),

    #[error("utxo id component out of range: height {height}, tx {tx}, vout {vout}")]
    UtxoIdOutOfRange { height: u64, tx: u64, vout: u64 },

    #[error("unknown network: {0}")]
    UnknownNetwork(String),
}
