//! Moving an output record from the base layer to the second layer.

use crate::native::NativeOutput;
use crate::range_tracked::RangeTrackedOutput;

impl From<&RangeTrackedOutput> for NativeOutput {
    /// Offsets are dropped; the asset list is carried over as is.
    fn from(output: &RangeTrackedOutput) -> Self {
        NativeOutput {
            utxo_id: output.utxo_id,
            outpoint: output.outpoint,
            value: output.value,
            pk_script: output.pk_script.clone(),
            assets: output.assets.clone(),
        }
    }
}

impl From<RangeTrackedOutput> for NativeOutput {
    fn from(output: RangeTrackedOutput) -> Self {
        NativeOutput {
            utxo_id: output.utxo_id,
            outpoint: output.outpoint,
            value: output.value,
            pk_script: output.pk_script,
            assets: output.assets,
        }
    }
}

impl RangeTrackedOutput {
    pub fn to_native(&self) -> NativeOutput {
        NativeOutput::from(self)
    }
}
