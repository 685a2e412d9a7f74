//! Combining selected inputs into one record and cutting a payment from it.

use sat_outputs::{AssetQuery, NativeOutput, RangeTrackedOutput};
use sat_types::{AssetName, Decimal};
use tracing::debug;

use crate::WalletError;

/// Append every input, in order, into a fresh record and split `amt` of
/// `name` backed by `value` sats off the front.
///
/// Returns the payment part and the change part.
pub fn combine_and_split(
    inputs: &[RangeTrackedOutput],
    name: &AssetName,
    value: i64,
    amt: &Decimal,
) -> Result<(RangeTrackedOutput, RangeTrackedOutput), WalletError> {
    let mut combined = RangeTrackedOutput::new(0);
    for input in inputs {
        combined.append(input)?;
    }
    debug!(
        inputs = inputs.len(),
        value = combined.value,
        asset = %name,
        available = %combined.get_asset(name),
        "combined inputs"
    );
    Ok(combined.split(name, value, amt)?)
}

/// Second-layer counterpart of [`combine_and_split`].
pub fn combine_and_split_native(
    inputs: &[NativeOutput],
    name: &AssetName,
    value: i64,
    amt: &Decimal,
) -> Result<(NativeOutput, NativeOutput), WalletError> {
    let mut combined = NativeOutput::new(0);
    for input in inputs {
        combined.merge(input)?;
    }
    debug!(
        inputs = inputs.len(),
        value = combined.value,
        asset = %name,
        "combined native inputs"
    );
    Ok(combined.split(name, value, amt)?)
}

/// Offset of the first `amt` units of `name` in the combined inputs, using
/// `stub_value` for assets that do not bind sats.
pub fn combined_asset_offset(
    inputs: &[RangeTrackedOutput],
    name: &AssetName,
    amt: &Decimal,
    stub_value: i64,
) -> Result<i64, WalletError> {
    let mut combined = RangeTrackedOutput::new(0);
    for input in inputs {
        combined.append(input)?;
    }
    Ok(combined.get_asset_offset_with_stub(name, amt, stub_value)?)
}
