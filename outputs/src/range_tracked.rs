//! Base-layer output record with explicit per-asset offset sets.
//!
//! Every binding asset of a [`RangeTrackedOutput`] has an [`AssetOffsets`]
//! entry telling which satoshis of the output back it. Non-binding assets are
//! tracked by amount only.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use num_traits::ToPrimitive;
use sat_types::asset::{
    ASSET_TYPE_NFT, PROTOCOL_NAME_BRC20, PROTOCOL_NAME_ORDX, PROTOCOL_NAME_RUNES,
};
use sat_types::{
    binding_sat_num, is_multiple_of, AssetInfo, AssetName, Decimal, OutPoint, TxAssets, TxOut,
    UtxoId,
};

use crate::error::{OffsetError, OutputError};
use crate::offsets::AssetOffsets;
use crate::query::{sats_at, AssetQuery};

/// Offset reported for assets that do not bind satoshis: the smallest output
/// that can carry them.
pub const DEFAULT_STUB_VALUE: i64 = 330;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RangeTrackedOutput {
    pub utxo_id: UtxoId,
    /// Cleared whenever the record is combined with another.
    pub outpoint: Option<OutPoint>,
    pub value: i64,
    pub pk_script: Vec<u8>,
    pub assets: TxAssets,
    pub offsets: BTreeMap<AssetName, AssetOffsets>,
}

impl RangeTrackedOutput {
    /// An output of `value` plain satoshis with no on-chain position.
    pub fn new(value: i64) -> Self {
        Self {
            utxo_id: UtxoId::INVALID,
            outpoint: None,
            value,
            pk_script: Vec::new(),
            assets: TxAssets::new(),
            offsets: BTreeMap::new(),
        }
    }

    /// Wrap a base-layer wire output. Asset data has to be filled in
    /// separately from the indexer.
    pub fn from_tx_out(outpoint: Option<OutPoint>, tx_out: &TxOut) -> Self {
        Self {
            outpoint,
            pk_script: tx_out.pk_script.clone(),
            ..Self::new(tx_out.value)
        }
    }

    /// Base-layer wire shape; assets are implied by the satoshis.
    pub fn to_tx_out(&self) -> TxOut {
        TxOut::new(self.value, self.pk_script.clone())
    }

    /// Second-layer wire shape carrying the asset list natively.
    pub fn to_native_tx_out(&self) -> TxOut {
        TxOut::with_assets(self.value, self.pk_script.clone(), self.assets.clone())
    }

    pub fn height(&self) -> Option<u64> {
        self.utxo_id.height()
    }

    pub fn size_of_binding_sats(&self) -> i64 {
        self.assets.binding_sat_amount()
    }

    /// Merge `other` into `self`, placing its satoshis after the current ones.
    ///
    /// Offsets of `other` are shifted by the current value and coalesced with
    /// the existing set. The outpoint identity is cleared since the combined
    /// record no longer denotes one existing output. An asset held by both
    /// with different divisors is refused and leaves `self` unchanged.
    pub fn append(&mut self, other: &RangeTrackedOutput) -> Result<(), OutputError> {
        let shift = self.value;
        let value = shift
            .checked_add(other.value)
            .filter(|v| *v >= 0)
            .ok_or(OutputError::ValueOverflow)?;
        let mut assets = self.assets.clone();
        assets.try_merge(&other.assets)?;

        self.assets = assets;
        for asset in other.assets.iter() {
            let Some(offsets) = other.offsets.get(&asset.name) else {
                continue;
            };
            let mut shifted = offsets.clone();
            shifted.shift(shift);
            self.offsets
                .entry(asset.name.clone())
                .or_default()
                .append(shifted);
        }
        self.value = value;
        self.utxo_id = UtxoId::INVALID;
        self.outpoint = None;
        Ok(())
    }

    /// Split into two fresh records whose values are `value` and the rest.
    ///
    /// For plain satoshis this is a pure value partition and carries no
    /// assets. Otherwise the first part gets `amt` of `name` and the second
    /// the remainder; other assets are dropped (see [`Self::align_asset`]).
    /// A zero share leaves that part without the asset.
    ///
    /// Binding assets have their offsets cut at `value`, so each part keeps
    /// offsets relative to its own first satoshi. The satoshis before `value`
    /// must back exactly `amt`: a cut short of where the first `amt` units end
    /// is [`OutputError::ValueTooSmall`], and a cut past further asset
    /// satoshis is [`OutputError::CutInsideAsset`].
    pub fn split(
        &self,
        name: &AssetName,
        value: i64,
        amt: &Decimal,
    ) -> Result<(RangeTrackedOutput, RangeTrackedOutput), OutputError> {
        if value < 0 || self.value < value {
            return Err(OutputError::ValueTooSmall {
                needed: value,
                available: self.value,
            });
        }
        let mut part1 = RangeTrackedOutput::new(value);
        let mut part2 = RangeTrackedOutput::new(self.value - value);

        if name.is_plain() {
            let available = sats_at(self.value, amt.precision());
            if amt.compare(&available).is_gt() {
                return Err(OutputError::AmountTooLarge {
                    requested: amt.clone(),
                    available,
                });
            }
            return Ok((part1, part2));
        }

        let asset = self
            .assets
            .find(name)
            .ok_or_else(|| OutputError::AssetNotFound(name.clone()))?;
        let n = asset.binding_sat;
        if n != 0 {
            if !is_multiple_of(amt, n) {
                return Err(OutputError::NotMultipleOfDivisor {
                    amount: amt.clone(),
                    divisor: n,
                });
            }
            let required = binding_sat_num(amt, n);
            if required > value {
                return Err(OutputError::ValueTooSmall {
                    needed: required,
                    available: value,
                });
            }
        }
        if amt.compare(&asset.amount).is_gt() {
            return Err(OutputError::AmountTooLarge {
                requested: amt.clone(),
                available: asset.amount.clone(),
            });
        }

        let rest = &asset.amount - amt;
        if !amt.is_zero() {
            part1.assets = TxAssets::single(AssetInfo::new(name.clone(), amt.clone(), n));
        }
        if !rest.is_zero() {
            part2.assets = TxAssets::single(AssetInfo::new(name.clone(), rest, n));
        }

        if !asset.is_binding() {
            return Ok((part1, part2));
        }

        let offsets = self.asset_offsets(name)?;
        let boundary = offsets
            .locate(amt, n)
            .map_err(|source| OutputError::OffsetsInconsistent {
                name: name.clone(),
                source,
            })?;
        let (left, right) = offsets.split(value);
        match left.total_len().cmp(&binding_sat_num(amt, n)) {
            Ordering::Less => {
                return Err(OutputError::ValueTooSmall {
                    needed: boundary,
                    available: value,
                })
            }
            Ordering::Greater => {
                return Err(OutputError::CutInsideAsset {
                    name: name.clone(),
                    boundary,
                    value,
                })
            }
            Ordering::Equal => {}
        }
        if !left.is_empty() {
            part1.offsets.insert(name.clone(), left);
        }
        if !right.is_empty() {
            part2.offsets.insert(name.clone(), right);
        }
        Ok((part1, part2))
    }

    /// Satoshi offset just past the first `amt` units of `name`.
    ///
    /// Non-binding assets report [`DEFAULT_STUB_VALUE`]; plain satoshis
    /// report `amt` itself once checked against the value.
    pub fn get_asset_offset(&self, name: &AssetName, amt: &Decimal) -> Result<i64, OutputError> {
        self.get_asset_offset_with_stub(name, amt, DEFAULT_STUB_VALUE)
    }

    /// [`Self::get_asset_offset`] with a caller-chosen stub size.
    pub fn get_asset_offset_with_stub(
        &self,
        name: &AssetName,
        amt: &Decimal,
        stub_value: i64,
    ) -> Result<i64, OutputError> {
        if !name.is_binding_protocol() {
            return Ok(stub_value);
        }

        if name.is_plain() {
            let available = sats_at(self.value, amt.precision());
            if amt.compare(&available).is_gt() {
                return Err(OutputError::AmountTooLarge {
                    requested: amt.clone(),
                    available,
                });
            }
            return amt
                .integer_part()
                .to_i64()
                .ok_or(OutputError::ValueOverflow);
        }

        let offsets = self.asset_offsets(name)?;
        let asset = self
            .assets
            .find(name)
            .ok_or_else(|| OutputError::AssetNotFound(name.clone()))?;
        if amt.compare(&asset.amount).is_gt() {
            return Err(OutputError::AmountTooLarge {
                requested: amt.clone(),
                available: asset.amount.clone(),
            });
        }
        offsets
            .locate(amt, asset.binding_sat)
            .map_err(|source| OutputError::OffsetsInconsistent {
                name: name.clone(),
                source,
            })
    }

    /// Reduce the record to `name` alone, dropping every other asset and its
    /// offsets. Aligning to plain satoshis drops all assets.
    pub fn align_asset(&mut self, name: &AssetName) -> Result<(), OutputError> {
        if name.is_plain() {
            self.assets = TxAssets::new();
            self.offsets.clear();
            return Ok(());
        }

        let asset = self
            .assets
            .find(name)
            .cloned()
            .ok_or_else(|| OutputError::AssetNotFound(name.clone()))?;
        let offsets = self.offsets.remove(name);
        if asset.is_binding() && offsets.as_ref().map_or(true, AssetOffsets::is_empty) {
            if let Some(offsets) = offsets {
                self.offsets.insert(name.clone(), offsets);
            }
            return Err(self.no_asset(name));
        }

        self.assets = TxAssets::single(asset);
        self.offsets.clear();
        if let Some(offsets) = offsets {
            self.offsets.insert(name.clone(), offsets);
        }
        Ok(())
    }

    /// Plain satoshis before the first and after the last range of `name`.
    pub fn get_plain_offset(&self, name: &AssetName) -> Result<(i64, i64), OutputError> {
        let asset = self
            .assets
            .find(name)
            .ok_or_else(|| OutputError::AssetNotFound(name.clone()))?;
        if asset.binding_sat_num() == self.value {
            return Ok((0, 0));
        }
        let offsets = self.asset_offsets(name)?;
        let (Some(first), Some(last)) = (offsets.first(), offsets.last()) else {
            return Err(self.no_asset(name));
        };
        Ok((first.start, self.value - last.end))
    }

    /// Drop ordx NFTs, which the wallet cannot transfer selectively.
    pub fn remove_nft_assets(&mut self) {
        let is_ordx_nft =
            |name: &AssetName| name.protocol == PROTOCOL_NAME_ORDX && name.asset_type == ASSET_TYPE_NFT;
        self.offsets.retain(|name, _| !is_ordx_nft(name));
        self.assets.retain(|asset| !is_ordx_nft(&asset.name));
    }

    /// Whether two or more fungible assets share the output. Ordx NFTs are
    /// not counted.
    pub fn has_multi_asset(&self) -> bool {
        self.assets
            .iter()
            .filter(|asset| match asset.name.protocol.as_str() {
                PROTOCOL_NAME_BRC20 | PROTOCOL_NAME_RUNES => true,
                PROTOCOL_NAME_ORDX => asset.name.asset_type != ASSET_TYPE_NFT,
                _ => false,
            })
            .count()
            >= 2
    }

    /// Check that every binding asset's offsets cover exactly its backing
    /// length inside the output, and that the backing fits in the value.
    pub fn check_invariants(&self) -> Result<(), OutputError> {
        for asset in self.assets.iter().filter(|a| a.is_binding()) {
            let offsets = self.asset_offsets(&asset.name)?;
            let inconsistent = |source| OutputError::OffsetsInconsistent {
                name: asset.name.clone(),
                source,
            };
            if !offsets.is_well_formed(self.value) {
                return Err(inconsistent(OffsetError::Malformed { limit: self.value }));
            }
            let expected = asset.binding_sat_num();
            let covered = offsets.total_len();
            if covered != expected {
                return Err(inconsistent(OffsetError::Mismatch { expected, covered }));
            }
        }
        let needed = self.size_of_binding_sats();
        if needed > self.value {
            return Err(OutputError::NotEnoughSats {
                needed,
                available: self.value,
            });
        }
        Ok(())
    }

    fn asset_offsets(&self, name: &AssetName) -> Result<&AssetOffsets, OutputError> {
        match self.offsets.get(name) {
            Some(offsets) if !offsets.is_empty() => Ok(offsets),
            _ => Err(self.no_asset(name)),
        }
    }

    fn no_asset(&self, name: &AssetName) -> OutputError {
        OutputError::NoAssetInOutput {
            name: name.clone(),
            outpoint: self.outpoint_str(),
        }
    }
}

impl AssetQuery for RangeTrackedOutput {
    fn value(&self) -> i64 {
        self.value
    }

    fn pk_script(&self) -> &[u8] {
        &self.pk_script
    }

    fn assets(&self) -> &TxAssets {
        &self.assets
    }

    fn outpoint(&self) -> Option<&OutPoint> {
        self.outpoint.as_ref()
    }
}
