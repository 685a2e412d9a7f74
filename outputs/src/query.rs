//! The value-and-asset query surface shared by both output kinds.

use num_bigint::BigInt;
use sat_types::decimal::pow10;
use sat_types::{tx_id_from_utxo, AssetName, Decimal, OutPoint, TxAssets, DEFAULT_PRECISION};

/// Read access to an output's value and assets.
///
/// Implemented by [`crate::RangeTrackedOutput`] and [`crate::NativeOutput`];
/// their combining operations differ and stay on the concrete types.
pub trait AssetQuery {
    /// Output value in satoshis.
    fn value(&self) -> i64;

    fn pk_script(&self) -> &[u8];

    fn assets(&self) -> &TxAssets;

    /// `txid:vout` of the on-chain position this record denotes, if any.
    fn outpoint(&self) -> Option<&OutPoint>;

    /// Satoshis backing binding assets.
    fn binding_sat_amount(&self) -> i64 {
        self.assets().binding_sat_amount()
    }

    /// Satoshis not backing any asset.
    fn plain_sats(&self) -> i64 {
        self.value() - self.binding_sat_amount()
    }

    fn has_plain_sat(&self) -> bool {
        self.plain_sats() > 0
    }

    /// Amount of `name` carried by the output. Plain satoshis are reported at
    /// precision 0; an absent asset is zero.
    fn get_asset(&self, name: &AssetName) -> Decimal {
        if name.is_plain() {
            return Decimal::new(self.plain_sats(), DEFAULT_PRECISION);
        }
        match self.assets().find(name) {
            Some(asset) => asset.amount.clone(),
            None => Decimal::zero(DEFAULT_PRECISION),
        }
    }

    /// No value and no assets.
    fn is_zero(&self) -> bool {
        self.value() == 0 && self.assets().is_empty()
    }

    fn outpoint_str(&self) -> String {
        self.outpoint().map(ToString::to_string).unwrap_or_default()
    }

    /// Transaction id of the outpoint, or the empty string.
    fn tx_id(&self) -> String {
        let text = self.outpoint_str();
        tx_id_from_utxo(&text).unwrap_or_default().to_string()
    }
}

/// Total amount of `name` across `outputs`. Plain satoshis sum the plain
/// balance of each output.
///
/// # Panics
///
/// Panics if the outputs carry `name` at different precisions.
pub fn sum_asset<'a, T, I>(outputs: I, name: &AssetName) -> Decimal
where
    T: AssetQuery + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut total: Option<Decimal> = None;
    for output in outputs {
        let amount = output.get_asset(name);
        if amount.is_zero() {
            continue;
        }
        total = Some(match total {
            Some(sum) => sum + amount,
            None => amount,
        });
    }
    total.unwrap_or_default()
}

/// `sats` expressed as a decimal at `precision`, for comparing a plain
/// satoshi count against a requested amount.
pub fn sats_at(sats: i64, precision: u8) -> Decimal {
    Decimal::from_raw(BigInt::from(sats) * pow10(precision as u32), precision)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::NativeOutput;
    use sat_types::AssetInfo;

    fn pearl() -> AssetName {
        AssetName::new("ordx", "f", "pearl")
    }

    fn output(value: i64, amount: i64) -> NativeOutput {
        let mut out = NativeOutput::new(value);
        if amount > 0 {
            out.assets.add(&AssetInfo::new(pearl(), Decimal::new(amount, 0), 1));
        }
        out
    }

    #[test]
    fn plain_balance_excludes_binding_sats() {
        let out = output(1000, 400);
        assert_eq!(out.binding_sat_amount(), 400);
        assert_eq!(out.plain_sats(), 600);
        assert!(out.has_plain_sat());
        assert_eq!(out.get_asset(&AssetName::PLAIN), Decimal::new(600, 0));
        assert_eq!(out.get_asset(&pearl()), Decimal::new(400, 0));
        assert!(out.get_asset(&AssetName::new("runes", "f", "x")).is_zero());
    }

    #[test]
    fn fully_bound_output_has_no_plain_sats() {
        let out = output(400, 400);
        assert!(!out.has_plain_sat());
        assert!(!out.is_zero());
        assert!(NativeOutput::new(0).is_zero());
    }

    #[test]
    fn tx_id_is_empty_without_outpoint() {
        let mut out = output(10, 0);
        assert_eq!(out.tx_id(), "");
        assert_eq!(out.outpoint_str(), "");
        out.outpoint = Some(OutPoint::new([0xab; 32], 3));
        assert_eq!(out.tx_id(), "ab".repeat(32));
        assert_eq!(out.outpoint_str(), format!("{}:3", "ab".repeat(32)));
    }

    #[test]
    fn sum_asset_adds_across_outputs() {
        let outs = vec![output(1000, 400), output(500, 0), output(300, 300)];
        assert_eq!(sum_asset(&outs, &pearl()), Decimal::new(700, 0));
        assert_eq!(sum_asset(&outs, &AssetName::PLAIN), Decimal::new(1100, 0));
        let none: Vec<NativeOutput> = Vec::new();
        assert!(sum_asset(&none, &pearl()).is_zero());
    }

    #[test]
    fn sats_at_scales_to_precision() {
        assert_eq!(sats_at(5, 2), Decimal::new(500, 2));
        assert_eq!(sats_at(5, 0), Decimal::new(5, 0));
    }
}
