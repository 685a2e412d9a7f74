//! Second-layer output record whose asset list travels on the output itself.
//!
//! There are no offset sets here: binding assets are backed by the leading
//! satoshis of the output, so the only invariant to keep is that the value
//! covers the aggregate backing length.

use num_traits::ToPrimitive;
use sat_types::{
    binding_sat_num, is_multiple_of, AssetInfo, AssetName, Decimal, OutPoint, TxAssets, TxOut,
    UtxoId,
};

use crate::error::OutputError;
use crate::query::{sats_at, AssetQuery};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NativeOutput {
    pub utxo_id: UtxoId,
    pub outpoint: Option<OutPoint>,
    pub value: i64,
    pub pk_script: Vec<u8>,
    pub assets: TxAssets,
}

impl NativeOutput {
    pub fn new(value: i64) -> Self {
        Self {
            value,
            ..Self::default()
        }
    }

    pub fn from_tx_out(outpoint: Option<OutPoint>, tx_out: &TxOut) -> Self {
        Self {
            utxo_id: UtxoId::INVALID,
            outpoint,
            value: tx_out.value,
            pk_script: tx_out.pk_script.clone(),
            assets: tx_out.assets.clone(),
        }
    }

    pub fn to_tx_out(&self) -> TxOut {
        TxOut::with_assets(self.value, self.pk_script.clone(), self.assets.clone())
    }

    /// Add `other`'s value and assets to `self`.
    pub fn merge(&mut self, other: &NativeOutput) -> Result<(), OutputError> {
        let value = checked_value(self.value.checked_add(other.value))?;
        let mut assets = self.assets.clone();
        assets.try_merge(&other.assets)?;
        self.value = value;
        self.assets = assets;
        self.clear_identity();
        Ok(())
    }

    /// Remove `other`'s value and assets from `self`. The remaining value must
    /// still back the remaining binding assets. Nothing changes on error.
    pub fn subtract(&mut self, other: &NativeOutput) -> Result<(), OutputError> {
        if self.value < other.value {
            return Err(OutputError::NotEnoughSats {
                needed: other.value,
                available: self.value,
            });
        }
        let mut assets = self.assets.clone();
        assets.split(&other.assets)?;
        let value = self.value - other.value;
        ensure_backed(value, &assets)?;

        self.value = value;
        self.assets = assets;
        self.clear_identity();
        Ok(())
    }

    /// Add one asset entry.
    ///
    /// Plain satoshis raise the value directly. A binding asset raises the
    /// value by its whole-unit amount, one satoshi per unit, and the result
    /// must still back every binding asset. A non-binding asset only changes
    /// the asset list.
    pub fn add_asset(&mut self, asset: &AssetInfo) -> Result<(), OutputError> {
        if asset.name.is_plain() {
            let sats = whole_units(&asset.amount)?;
            self.value = checked_value(self.value.checked_add(sats))?;
            return Ok(());
        }

        if !asset.is_binding() {
            self.assets.try_add(asset)?;
            return Ok(());
        }

        let mut assets = self.assets.clone();
        assets.try_add(asset)?;
        let value = checked_value(self.value.checked_add(whole_units(&asset.amount)?))?;
        ensure_backed(value, &assets)?;
        self.value = value;
        self.assets = assets;
        Ok(())
    }

    /// Remove one asset entry; the inverse of [`Self::add_asset`].
    ///
    /// Removing a non-binding asset does not recheck the value against the
    /// remaining binding assets, since it does not change the value.
    pub fn sub_asset(&mut self, asset: &AssetInfo) -> Result<(), OutputError> {
        if asset.name.is_plain() {
            let sats = whole_units(&asset.amount)?;
            if self.value < sats {
                return Err(OutputError::NotEnoughSats {
                    needed: sats,
                    available: self.value,
                });
            }
            let value = self.value - sats;
            ensure_backed(value, &self.assets)?;
            self.value = value;
            return Ok(());
        }

        if !asset.is_binding() {
            self.assets.subtract(asset)?;
            return Ok(());
        }

        let mut assets = self.assets.clone();
        assets.subtract(asset)?;
        let sats = whole_units(&asset.amount)?;
        if self.value < sats {
            return Err(OutputError::NotEnoughSats {
                needed: sats,
                available: self.value,
            });
        }
        let value = self.value - sats;
        ensure_backed(value, &assets)?;
        self.value = value;
        self.assets = assets;
        Ok(())
    }

    /// Split into two fresh records whose values are `value` and the rest.
    ///
    /// Same contract as [`crate::RangeTrackedOutput::split`] without the
    /// offset bookkeeping.
    pub fn split(
        &self,
        name: &AssetName,
        value: i64,
        amt: &Decimal,
    ) -> Result<(NativeOutput, NativeOutput), OutputError> {
        if value < 0 || self.value < value {
            return Err(OutputError::ValueTooSmall {
                needed: value,
                available: self.value,
            });
        }
        let mut part1 = NativeOutput::new(value);
        let mut part2 = NativeOutput::new(self.value - value);

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
        Ok((part1, part2))
    }

    /// Separate the plain satoshis from the asset-carrying part. Either half
    /// is `None` when it would be empty.
    pub fn split_plain(&self) -> (Option<NativeOutput>, Option<NativeOutput>) {
        let plain = self.plain_sats();
        let plain_part = (plain != 0).then(|| NativeOutput::new(plain));
        let asset_part = (!self.assets.is_empty()).then(|| NativeOutput {
            assets: self.assets.clone(),
            ..NativeOutput::new(self.value - plain)
        });
        (plain_part, asset_part)
    }

    fn clear_identity(&mut self) {
        self.utxo_id = UtxoId::INVALID;
        self.outpoint = None;
    }
}

impl AssetQuery for NativeOutput {
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

fn checked_value(value: Option<i64>) -> Result<i64, OutputError> {
    value.filter(|v| *v >= 0).ok_or(OutputError::ValueOverflow)
}

fn ensure_backed(value: i64, assets: &TxAssets) -> Result<(), OutputError> {
    let needed = assets.binding_sat_amount();
    if value < needed {
        return Err(OutputError::NotEnoughSats {
            needed,
            available: value,
        });
    }
    Ok(())
}

/// Satoshi count of an amount moved in or out of the value.
fn whole_units(amount: &Decimal) -> Result<i64, OutputError> {
    amount
        .integer_part()
        .to_i64()
        .ok_or(OutputError::ValueOverflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sat_types::AssetListError;

    fn pearl() -> AssetName {
        AssetName::new("ordx", "f", "pearl")
    }

    fn runes() -> AssetName {
        AssetName::new("runes", "f", "dog")
    }

    fn units(n: i64) -> Decimal {
        Decimal::new(n, 0)
    }

    fn info(name: AssetName, amount: i64, n: u32) -> AssetInfo {
        AssetInfo::new(name, units(amount), n)
    }

    fn output(value: i64, assets: &[AssetInfo]) -> NativeOutput {
        NativeOutput {
            assets: assets.iter().cloned().collect(),
            ..NativeOutput::new(value)
        }
    }

    #[test]
    fn merge_sums_value_and_assets() {
        let mut a = output(500, &[info(pearl(), 300, 1)]);
        a.outpoint = Some(OutPoint::new([9; 32], 0));
        let b = output(200, &[info(pearl(), 100, 1), info(runes(), 7, 0)]);
        a.merge(&b).unwrap();
        assert_eq!(a.value, 700);
        assert_eq!(a.get_asset(&pearl()), units(400));
        assert_eq!(a.get_asset(&runes()), units(7));
        assert!(a.outpoint.is_none());
    }

    #[test]
    fn merge_rejects_overflow() {
        let mut a = NativeOutput::new(i64::MAX);
        let before = a.clone();
        assert_eq!(a.merge(&NativeOutput::new(1)), Err(OutputError::ValueOverflow));
        assert_eq!(a, before);
    }

    #[test]
    fn subtract_commits_value_and_assets_together() {
        let mut a = output(1000, &[info(pearl(), 600, 1)]);
        a.subtract(&output(300, &[info(pearl(), 200, 1)])).unwrap();
        assert_eq!(a.value, 700);
        assert_eq!(a.get_asset(&pearl()), units(400));
    }

    #[test]
    fn subtract_failures_leave_record_unchanged() {
        let mut a = output(1000, &[info(pearl(), 600, 1)]);
        let before = a.clone();

        assert!(matches!(
            a.subtract(&NativeOutput::new(1001)),
            Err(OutputError::NotEnoughSats { needed: 1001, available: 1000 })
        ));
        assert!(matches!(
            a.subtract(&output(0, &[info(pearl(), 601, 1)])),
            Err(OutputError::Assets(AssetListError::Insufficient { .. }))
        ));
        // 600 bound sats cannot fit in the remaining 500.
        assert!(matches!(
            a.subtract(&NativeOutput::new(500)),
            Err(OutputError::NotEnoughSats { needed: 600, available: 500 })
        ));
        assert_eq!(a, before);
    }

    #[test]
    fn add_and_sub_plain_sats() {
        let mut a = output(1000, &[info(pearl(), 600, 1)]);
        a.add_asset(&info(AssetName::PLAIN, 50, 0)).unwrap();
        assert_eq!(a.value, 1050);
        a.sub_asset(&info(AssetName::PLAIN, 450, 0)).unwrap();
        assert_eq!(a.value, 600);
        assert!(matches!(
            a.sub_asset(&info(AssetName::PLAIN, 1, 0)),
            Err(OutputError::NotEnoughSats { needed: 600, available: 599 })
        ));
        assert_eq!(a.value, 600);
    }

    #[test]
    fn add_binding_asset_raises_value_by_amount() {
        let mut a = NativeOutput::new(100);
        a.add_asset(&info(pearl(), 300, 1)).unwrap();
        assert_eq!(a.value, 400);
        assert_eq!(a.get_asset(&pearl()), units(300));

        let big = AssetName::new("ordx", "f", "big");
        a.add_asset(&info(big.clone(), 1000, 100)).unwrap();
        assert_eq!(a.value, 1400);
        assert_eq!(a.binding_sat_amount(), 310);
        assert_eq!(a.plain_sats(), 1090);
    }

    #[test]
    fn sub_binding_asset_lowers_value_by_amount() {
        let mut a = output(1000, &[info(pearl(), 600, 1)]);
        a.sub_asset(&info(pearl(), 200, 1)).unwrap();
        assert_eq!(a.value, 800);
        assert_eq!(a.get_asset(&pearl()), units(400));

        let before = a.clone();
        assert!(a.sub_asset(&info(pearl(), 401, 1)).is_err());
        assert_eq!(a, before);

        let big = AssetName::new("ordx", "f", "big");
        let mut b = output(2000, &[info(big.clone(), 1000, 100)]);
        b.sub_asset(&info(big.clone(), 500, 100)).unwrap();
        assert_eq!(b.value, 1500);
        assert_eq!(b.get_asset(&big), units(500));
    }

    #[test]
    fn divisor_mismatch_is_refused() {
        let mut a = output(1000, &[info(pearl(), 600, 1)]);
        let before = a.clone();
        assert!(matches!(
            a.add_asset(&info(pearl(), 100, 10)),
            Err(OutputError::Assets(AssetListError::DivisorMismatch { .. }))
        ));
        assert!(matches!(
            a.merge(&output(100, &[info(pearl(), 100, 10)])),
            Err(OutputError::Assets(AssetListError::DivisorMismatch { .. }))
        ));
        assert_eq!(a, before);
    }

    #[test]
    fn non_binding_asset_only_touches_list() {
        let mut a = NativeOutput::new(330);
        a.add_asset(&info(runes(), 1000, 0)).unwrap();
        assert_eq!(a.value, 330);
        a.sub_asset(&info(runes(), 400, 0)).unwrap();
        assert_eq!(a.get_asset(&runes()), units(600));
        assert_eq!(a.value, 330);
    }

    /// Removing a non-binding asset never rechecks the value, even when the
    /// output is already short of sats for its binding assets. Whether such
    /// assets are meant to be exempt is an open design question; this pins
    /// the current behaviour.
    #[test]
    fn sub_asset_non_binding_skips_value_check() {
        let mut a = output(100, &[info(pearl(), 300, 1), info(runes(), 10, 0)]);
        assert!(a.value < a.binding_sat_amount());
        a.sub_asset(&info(runes(), 10, 0)).unwrap();
        assert!(a.get_asset(&runes()).is_zero());
        assert_eq!(a.value, 100);
    }

    #[test]
    fn split_plain_value() {
        let a = NativeOutput::new(1000);
        let (p1, p2) = a.split(&AssetName::PLAIN, 300, &units(300)).unwrap();
        assert_eq!((p1.value, p2.value), (300, 700));
    }

    #[test]
    fn split_binding_asset() {
        let a = output(500, &[info(pearl(), 500, 1)]);
        let (p1, p2) = a.split(&pearl(), 200, &units(200)).unwrap();
        assert_eq!((p1.value, p2.value), (200, 300));
        assert_eq!(p1.get_asset(&pearl()), units(200));
        assert_eq!(p2.get_asset(&pearl()), units(300));

        let (p1, p2) = a.split(&pearl(), 500, &units(500)).unwrap();
        assert_eq!(p1.get_asset(&pearl()), units(500));
        assert!(p2.is_zero());
    }

    #[test]
    fn split_of_zero_amount_leaves_first_part_without_asset() {
        let a = output(500, &[info(pearl(), 500, 1)]);
        let (p1, p2) = a.split(&pearl(), 0, &units(0)).unwrap();
        assert!(p1.assets.is_empty());
        assert_eq!(p1.value, 0);
        assert_eq!(p2.get_asset(&pearl()), units(500));
        assert_eq!(p2.value, 500);
    }

    #[test]
    fn split_rejects_insufficiency_without_mutation() {
        let a = output(1000, &[info(pearl(), 400, 1)]);
        let before = a.clone();
        assert!(matches!(
            a.split(&pearl(), 1000, &units(500)),
            Err(OutputError::AmountTooLarge { .. })
        ));
        assert!(matches!(
            a.split(&pearl(), 100, &units(200)),
            Err(OutputError::ValueTooSmall { needed: 200, available: 100 })
        ));
        assert_eq!(a, before);
    }

    #[test]
    fn split_plain_separates_plain_and_assets() {
        let a = output(1000, &[info(pearl(), 600, 1)]);
        let (plain, assets) = a.split_plain();
        assert_eq!(plain, Some(NativeOutput::new(400)));
        let assets = assets.unwrap();
        assert_eq!(assets.value, 600);
        assert_eq!(assets.get_asset(&pearl()), units(600));

        let (plain, assets) = NativeOutput::new(10).split_plain();
        assert_eq!(plain, Some(NativeOutput::new(10)));
        assert!(assets.is_none());

        let (plain, _) = output(600, &[info(pearl(), 600, 1)]).split_plain();
        assert!(plain.is_none());
    }

    #[test]
    fn wire_round_trip() {
        let mut a = output(546, &[info(pearl(), 100, 1)]);
        a.pk_script = vec![0x00, 0x14];
        let op = OutPoint::new([3; 32], 2);
        let back = NativeOutput::from_tx_out(Some(op), &a.to_tx_out());
        assert_eq!(back.value, 546);
        assert_eq!(back.assets, a.assets);
        assert_eq!(back.pk_script, a.pk_script);
        assert_eq!(back.outpoint, Some(op));
    }
}
