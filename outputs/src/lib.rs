//! Output records for satoshi-bound assets.
//!
//! - [`offsets`]: half-open satoshi ranges inside one output and the split,
//!   append and locate operations on them.
//! - [`RangeTrackedOutput`]: base-layer output with an explicit offset set
//!   per binding asset.
//! - [`NativeOutput`]: second-layer output whose assets are carried natively.
//! - [`AssetQuery`]: the read surface both kinds share.
//!
//! Nothing here logs or locks; records are plain values owned by the caller.

pub mod convert;
pub mod error;
pub mod native;
pub mod offsets;
pub mod query;
pub mod range_tracked;

pub use error::{OffsetError, OutputError};
pub use native::NativeOutput;
pub use offsets::{AssetOffsets, OffsetRange};
pub use query::{sats_at, sum_asset, AssetQuery};
pub use range_tracked::{RangeTrackedOutput, DEFAULT_STUB_VALUE};
