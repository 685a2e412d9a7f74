use proptest::prelude::*;

use sat_types::{AssetInfo, AssetName, Decimal, OutPoint, TxAssets, UtxoId};

/// Canonical rendering of a decimal literal: no trailing fractional zeros,
/// no fractional point when the fraction is zero, no sign on zero, and no
/// redundant leading integer zeros.
fn canonical(negative: bool, integer: &str, fraction: &str) -> String {
    let integer = integer.trim_start_matches('0');
    let integer = if integer.is_empty() { "0" } else { integer };
    let fraction = fraction.trim_end_matches('0');
    let is_zero = integer == "0" && fraction.is_empty();
    let sign = if negative && !is_zero { "-" } else { "" };
    if fraction.is_empty() {
        format!("{sign}{integer}")
    } else {
        format!("{sign}{integer}.{fraction}")
    }
}

proptest! {
    /// Parsing then rendering yields the canonical form of the input.
    #[test]
    fn decimal_string_round_trip(
        negative in any::<bool>(),
        integer in "[0-9]{1,30}",
        fraction in "[0-9]{0,18}",
        extra in 0u8..=18,
    ) {
        let precision = (fraction.len() as u8).saturating_add(extra).min(18);
        let text = if fraction.is_empty() {
            format!("{}{}", if negative { "-" } else { "" }, integer)
        } else {
            format!("{}{}.{}", if negative { "-" } else { "" }, integer, fraction)
        };
        let d = Decimal::from_str_with_precision(&text, precision).unwrap();
        prop_assert_eq!(d.precision(), precision);
        prop_assert_eq!(d.to_string(), canonical(negative, &integer, &fraction));
    }

    /// Rendering then parsing at the same precision gives back the same value.
    #[test]
    fn decimal_render_parse_identity(raw in any::<i64>(), precision in 0u8..=18) {
        let d = Decimal::new(raw, precision);
        let back = Decimal::from_str_with_precision(&d.to_string(), precision).unwrap();
        prop_assert_eq!(back, d);
    }

    /// Addition and subtraction are inverse at equal precision.
    #[test]
    fn decimal_add_sub_inverse(a in any::<i64>(), b in any::<i64>(), precision in 0u8..=18) {
        let a = Decimal::new(a, precision);
        let b = Decimal::new(b, precision);
        prop_assert_eq!(&(&a + &b) - &b, a);
    }

    /// The i64 compression preserves ordering for any max.
    #[test]
    fn i64_compression_is_monotonic(
        max in 1u128..u128::MAX,
        x in any::<u128>(),
        y in any::<u128>(),
    ) {
        let max_d = Decimal::from_u128(max, 0);
        let (x, y) = (x % (max + 1), y % (max + 1));
        let dx = Decimal::from_u128(x, 0);
        let dy = Decimal::from_u128(y, 0);
        let cx = dx.to_i64_with_max(&max_d);
        let cy = dy.to_i64_with_max(&max_d);
        if x <= y {
            prop_assert!(cx <= cy);
        } else {
            prop_assert!(cx >= cy);
        }
        prop_assert!(cx >= 0);
    }

    /// Compressing an expanded value gives the compressed value back.
    #[test]
    fn i64_compression_inverse(max in 1u128..u128::MAX, v in 0i64..i64::MAX) {
        let max_d = Decimal::from_u128(max, 0);
        let expanded = Decimal::from_i64_with_max(v, &max_d);
        if expanded.compare(&max_d) != std::cmp::Ordering::Greater {
            prop_assert_eq!(expanded.to_i64_with_max(&max_d), v);
        }
    }

    /// Asset names survive their text form.
    #[test]
    fn asset_name_round_trip(
        protocol in "[a-z0-9]{1,8}",
        asset_type in "[a-z]{1,2}",
        ticker in "[a-zA-Z0-9.]{1,16}",
    ) {
        let name = AssetName::new(&protocol, &asset_type, &ticker);
        let parsed: AssetName = name.to_string().parse().unwrap();
        prop_assert_eq!(parsed, name);
    }

    /// Outpoints survive their text form.
    #[test]
    fn outpoint_round_trip(txid in prop::array::uniform32(0u8..), vout in any::<u32>()) {
        let op = OutPoint::new(txid, vout);
        let parsed: OutPoint = op.to_string().parse().unwrap();
        prop_assert_eq!(parsed, op);
    }

    /// UtxoId packing is lossless inside the component ranges.
    #[test]
    fn utxo_id_round_trip(height in 0u64..0x2000_0000, tx in 0u64..0x2_0000, vout in 0u64..0x4_0000) {
        let id = UtxoId::new(height, tx, vout).unwrap();
        prop_assert_eq!(id.parts(), (height, tx, vout));
    }

    /// Adding then subtracting an entry restores the list.
    #[test]
    fn tx_assets_add_subtract_inverse(base in 1i64..1_000_000, delta in 1i64..1_000_000) {
        let name = AssetName::new("ordx", "f", "pearl");
        let mut assets = TxAssets::single(AssetInfo::new(name.clone(), Decimal::new(base, 0), 1));
        let before = assets.clone();
        let delta = AssetInfo::new(name, Decimal::new(delta, 0), 1);
        assets.add(&delta);
        assets.subtract(&delta).unwrap();
        prop_assert_eq!(assets, before);
    }
}
