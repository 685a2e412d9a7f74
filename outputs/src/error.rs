//! Output-record errors.

use sat_types::{AssetListError, AssetName, Decimal};
use thiserror::Error;

/// Failure to locate an asset amount inside an offset set.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum OffsetError {
    #[error("offset set is empty")]
    Empty,

    #[error("requested {requested} sats but offsets only cover {covered}")]
    Exceeds { requested: i64, covered: i64 },

    #[error("offsets cover {covered} sats but the amount needs {expected}")]
    Mismatch { expected: i64, covered: i64 },

    #[error("offsets are not sorted and disjoint within value {limit}")]
    Malformed { limit: i64 },
}

/// Recoverable failures of output-record operations. The record is left
/// unchanged whenever one of these is returned.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum OutputError {
    #[error("output value too small: need {needed}, have {available}")]
    ValueTooSmall { needed: i64, available: i64 },

    #[error("amount too large: requested {requested}, available {available}")]
    AmountTooLarge {
        requested: Decimal,
        available: Decimal,
    },

    #[error("amount {amount} must be a multiple of {divisor}")]
    NotMultipleOfDivisor { amount: Decimal, divisor: u32 },

    #[error("not enough sats: need {needed}, have {available}")]
    NotEnoughSats { needed: i64, available: i64 },

    #[error("asset {0} not found in output")]
    AssetNotFound(AssetName),

    #[error("no asset {name} in {outpoint}")]
    NoAssetInOutput { name: AssetName, outpoint: String },

    #[error("offsets of {name} are inconsistent with its amount: {source}")]
    OffsetsInconsistent {
        name: AssetName,
        #[source]
        source: OffsetError,
    },

    #[error("cut at {value} leaves {name} sats between {boundary} and the cut")]
    CutInsideAsset {
        name: AssetName,
        boundary: i64,
        value: i64,
    },

    #[error("output value out of bounds")]
    ValueOverflow,

    #[error(transparent)]
    Assets(#[from] AssetListError),
}
