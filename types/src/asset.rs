//! Asset identifiers, per-output asset entries and asset lists.

use std::fmt;
use std::str::FromStr;

use num_bigint::BigInt;
use num_traits::{ToPrimitive, Zero};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decimal::Decimal;
use crate::error::ParseError;

pub const PROTOCOL_NAME_ORD: &str = "ord";
pub const PROTOCOL_NAME_ORDX: &str = "ordx";
pub const PROTOCOL_NAME_BRC20: &str = "brc20";
pub const PROTOCOL_NAME_RUNES: &str = "runes";

pub const ASSET_TYPE_NFT: &str = "o";
pub const ASSET_TYPE_FT: &str = "f";
pub const ASSET_TYPE_EXOTIC: &str = "e";
pub const ASSET_TYPE_NS: &str = "n";

/// Identifies an asset by `{protocol, type, ticker}`.
///
/// The all-empty value is the plain-satoshi sentinel ([`AssetName::PLAIN`]).
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AssetName {
    pub protocol: String,
    #[serde(rename = "type")]
    pub asset_type: String,
    pub ticker: String,
}

impl AssetName {
    /// Plain satoshis, i.e. no asset.
    pub const PLAIN: AssetName = AssetName {
        protocol: String::new(),
        asset_type: String::new(),
        ticker: String::new(),
    };

    pub fn new(protocol: &str, asset_type: &str, ticker: &str) -> Self {
        Self {
            protocol: protocol.to_string(),
            asset_type: asset_type.to_string(),
            ticker: ticker.to_string(),
        }
    }

    pub fn is_plain(&self) -> bool {
        self.protocol.is_empty() && self.asset_type.is_empty() && self.ticker.is_empty()
    }

    /// Whether this protocol anchors asset units to specific satoshis.
    pub fn is_binding_protocol(&self) -> bool {
        matches!(
            self.protocol.as_str(),
            "" | PROTOCOL_NAME_ORD | PROTOCOL_NAME_ORDX
        )
    }

    pub fn is_nft(&self) -> bool {
        self.asset_type == ASSET_TYPE_NFT || self.asset_type == ASSET_TYPE_NS
    }

    pub fn is_fungible(&self) -> bool {
        self.asset_type == ASSET_TYPE_FT
    }

    pub fn is_ordx_ft(&self) -> bool {
        self.protocol == PROTOCOL_NAME_ORDX && self.asset_type == ASSET_TYPE_FT
    }
}

/// `protocol:type:ticker`, or the empty string for plain satoshis.
impl fmt::Display for AssetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_plain() {
            return Ok(());
        }
        write!(f, "{}:{}:{}", self.protocol, self.asset_type, self.ticker)
    }
}

impl FromStr for AssetName {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Self::PLAIN);
        }
        let parts: Vec<&str> = s.split(':').collect();
        match parts.as_slice() {
            [protocol, asset_type, ticker] => {
                let name = Self::new(protocol, asset_type, ticker);
                if !name.is_plain() && ticker.is_empty() {
                    return Err(ParseError::InvalidAssetName(s.to_string()));
                }
                Ok(name)
            }
            _ => Err(ParseError::InvalidAssetName(s.to_string())),
        }
    }
}

/// Number of satoshis needed to back `amount` units at `divisor` units per
/// satoshi: `ceil(amount / divisor)`. Zero for non-binding assets
/// (`divisor == 0`) and for non-positive amounts.
pub fn binding_sat_num(amount: &Decimal, divisor: u32) -> i64 {
    if divisor == 0 || !amount.is_positive() {
        return 0;
    }
    let n = BigInt::from(divisor);
    let sats = (amount.raw() + &n - 1u32) / &n;
    sats.to_i64().unwrap_or(i64::MAX)
}

/// Whether `amount` is a whole multiple of `divisor` units.
pub fn is_multiple_of(amount: &Decimal, divisor: u32) -> bool {
    if divisor == 0 {
        return true;
    }
    (amount.raw() % BigInt::from(divisor)).is_zero()
}

/// One asset entry carried by an output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetInfo {
    pub name: AssetName,
    pub amount: Decimal,
    /// Asset units backed by one satoshi; `0` for non-binding assets.
    pub binding_sat: u32,
}

impl AssetInfo {
    pub fn new(name: AssetName, amount: Decimal, binding_sat: u32) -> Self {
        Self {
            name,
            amount,
            binding_sat,
        }
    }

    pub fn is_binding(&self) -> bool {
        self.binding_sat > 0
    }

    /// Satoshis needed to back this entry.
    pub fn binding_sat_num(&self) -> i64 {
        binding_sat_num(&self.amount, self.binding_sat)
    }
}

/// Why an asset-list operation was refused.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum AssetListError {
    #[error("asset {0} not found")]
    NotFound(AssetName),

    #[error("not enough {name}: need {needed}, have {available}")]
    Insufficient {
        name: AssetName,
        needed: Decimal,
        available: Decimal,
    },

    #[error("{name} binds {expected} units per sat here but {found} in the other entry")]
    DivisorMismatch {
        name: AssetName,
        expected: u32,
        found: u32,
    },
}

/// The assets carried by one output, sorted by name, one entry per name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<AssetInfo>", into = "Vec<AssetInfo>")]
pub struct TxAssets(Vec<AssetInfo>);

impl TxAssets {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn single(asset: AssetInfo) -> Self {
        Self(vec![asset])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AssetInfo> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[AssetInfo] {
        &self.0
    }

    pub fn find(&self, name: &AssetName) -> Option<&AssetInfo> {
        self.position(name).ok().map(|i| &self.0[i])
    }

    /// Add `asset` to the matching entry, inserting it if absent. An existing
    /// entry keeps its divisor; use [`Self::try_add`] when the two may differ.
    pub fn add(&mut self, asset: &AssetInfo) {
        match self.position(&asset.name) {
            Ok(i) => self.0[i].amount += &asset.amount,
            Err(i) => self.0.insert(i, asset.clone()),
        }
    }

    /// [`Self::add`], refusing an entry whose divisor differs from the one
    /// already held for the same name.
    pub fn try_add(&mut self, asset: &AssetInfo) -> Result<(), AssetListError> {
        self.check_divisor(asset)?;
        self.add(asset);
        Ok(())
    }

    /// Subtract `asset` from the matching entry. An entry reduced to zero is
    /// removed. The list is unchanged on error.
    pub fn subtract(&mut self, asset: &AssetInfo) -> Result<(), AssetListError> {
        let i = match self.position(&asset.name) {
            Ok(i) => i,
            Err(_) if asset.amount.is_zero() => return Ok(()),
            Err(_) => return Err(AssetListError::NotFound(asset.name.clone())),
        };
        let remaining = &self.0[i].amount - &asset.amount;
        if remaining.is_negative() {
            return Err(AssetListError::Insufficient {
                name: asset.name.clone(),
                needed: asset.amount.clone(),
                available: self.0[i].amount.clone(),
            });
        }
        if remaining.is_zero() {
            self.0.remove(i);
        } else {
            self.0[i].amount = remaining;
        }
        Ok(())
    }

    /// Add every entry of `other`.
    pub fn merge(&mut self, other: &TxAssets) {
        for asset in other.iter() {
            self.add(asset);
        }
    }

    /// [`Self::merge`] with divisor checks. The list is unchanged on error.
    pub fn try_merge(&mut self, other: &TxAssets) -> Result<(), AssetListError> {
        for asset in other.iter() {
            self.check_divisor(asset)?;
        }
        self.merge(other);
        Ok(())
    }

    /// Subtract every entry of `other`. Either all entries are subtracted or
    /// the list is left unchanged.
    pub fn split(&mut self, other: &TxAssets) -> Result<(), AssetListError> {
        let mut tmp = self.clone();
        for asset in other.iter() {
            tmp.subtract(asset)?;
        }
        *self = tmp;
        Ok(())
    }

    /// Keep only the entries for which `keep` returns true.
    pub fn retain(&mut self, keep: impl FnMut(&AssetInfo) -> bool) {
        self.0.retain(keep);
    }

    /// Total satoshis needed to back every binding asset in the list.
    pub fn binding_sat_amount(&self) -> i64 {
        self.0
            .iter()
            .map(AssetInfo::binding_sat_num)
            .fold(0i64, |acc, n| acc.saturating_add(n))
    }

    fn check_divisor(&self, asset: &AssetInfo) -> Result<(), AssetListError> {
        match self.find(&asset.name) {
            Some(held) if held.binding_sat != asset.binding_sat => {
                Err(AssetListError::DivisorMismatch {
                    name: asset.name.clone(),
                    expected: held.binding_sat,
                    found: asset.binding_sat,
                })
            }
            _ => Ok(()),
        }
    }

    fn position(&self, name: &AssetName) -> Result<usize, usize> {
        self.0.binary_search_by(|a| a.name.cmp(name))
    }
}

impl FromIterator<AssetInfo> for TxAssets {
    fn from_iter<I: IntoIterator<Item = AssetInfo>>(iter: I) -> Self {
        let mut assets = TxAssets::new();
        for asset in iter {
            assets.add(&asset);
        }
        assets
    }
}

impl From<Vec<AssetInfo>> for TxAssets {
    fn from(assets: Vec<AssetInfo>) -> Self {
        assets.into_iter().collect()
    }
}

impl From<TxAssets> for Vec<AssetInfo> {
    fn from(assets: TxAssets) -> Self {
        assets.0
    }
}

impl<'a> IntoIterator for &'a TxAssets {
    type Item = &'a AssetInfo;
    type IntoIter = std::slice::Iter<'a, AssetInfo>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ordx(ticker: &str) -> AssetName {
        AssetName::new(PROTOCOL_NAME_ORDX, ASSET_TYPE_FT, ticker)
    }

    fn runes(ticker: &str) -> AssetName {
        AssetName::new(PROTOCOL_NAME_RUNES, ASSET_TYPE_FT, ticker)
    }

    fn info(name: AssetName, amount: i64, n: u32) -> AssetInfo {
        AssetInfo::new(name, Decimal::new(amount, 0), n)
    }

    #[test]
    fn asset_name_text_round_trip() {
        let name: AssetName = "ordx:f:pearl".parse().unwrap();
        assert_eq!(name, ordx("pearl"));
        assert_eq!(name.to_string(), "ordx:f:pearl");
    }

    #[test]
    fn empty_string_is_plain() {
        let name: AssetName = "".parse().unwrap();
        assert!(name.is_plain());
        assert_eq!(name, AssetName::PLAIN);
        assert_eq!(AssetName::PLAIN.to_string(), "");
        assert_eq!("::".parse::<AssetName>().unwrap(), AssetName::PLAIN);
    }

    #[test]
    fn malformed_asset_names_are_rejected() {
        for bad in ["pearl", "ordx:pearl", "ordx:f:pearl:x", "ordx:f:"] {
            assert!(bad.parse::<AssetName>().is_err(), "{bad:?}");
        }
    }

    #[test]
    fn binding_protocol_classification() {
        assert!(ordx("a").is_binding_protocol());
        assert!(AssetName::new(PROTOCOL_NAME_ORD, ASSET_TYPE_NFT, "x").is_binding_protocol());
        assert!(AssetName::PLAIN.is_binding_protocol());
        assert!(!runes("a").is_binding_protocol());
        assert!(!AssetName::new(PROTOCOL_NAME_BRC20, ASSET_TYPE_FT, "x").is_binding_protocol());
    }

    #[test]
    fn binding_sat_num_rounds_up() {
        assert_eq!(binding_sat_num(&Decimal::new(500, 0), 1), 500);
        assert_eq!(binding_sat_num(&Decimal::new(1001, 0), 10), 101);
        assert_eq!(binding_sat_num(&Decimal::new(1000, 0), 10), 100);
        assert_eq!(binding_sat_num(&Decimal::new(1000, 0), 0), 0);
        assert_eq!(binding_sat_num(&Decimal::new(0, 0), 3), 0);
    }

    #[test]
    fn add_combines_same_name_and_keeps_order() {
        let mut assets = TxAssets::new();
        assets.add(&info(runes("b"), 5, 0));
        assets.add(&info(ordx("a"), 10, 1));
        assets.add(&info(ordx("a"), 7, 1));
        assert_eq!(assets.len(), 2);
        assert_eq!(assets.find(&ordx("a")).unwrap().amount, Decimal::new(17, 0));
        let names: Vec<_> = assets.iter().map(|a| a.name.to_string()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn subtract_removes_exhausted_entries() {
        let mut assets = TxAssets::single(info(ordx("a"), 10, 1));
        assets.subtract(&info(ordx("a"), 4, 1)).unwrap();
        assert_eq!(assets.find(&ordx("a")).unwrap().amount, Decimal::new(6, 0));
        assets.subtract(&info(ordx("a"), 6, 1)).unwrap();
        assert!(assets.is_empty());
    }

    #[test]
    fn subtract_rejects_overdraw_without_mutation() {
        let mut assets = TxAssets::single(info(ordx("a"), 10, 1));
        let err = assets.subtract(&info(ordx("a"), 11, 1)).unwrap_err();
        assert!(matches!(err, AssetListError::Insufficient { .. }));
        assert_eq!(assets.find(&ordx("a")).unwrap().amount, Decimal::new(10, 0));

        let err = assets.subtract(&info(runes("z"), 1, 0)).unwrap_err();
        assert_eq!(err, AssetListError::NotFound(runes("z")));
    }

    #[test]
    fn split_is_all_or_nothing() {
        let mut assets: TxAssets = vec![info(ordx("a"), 10, 1), info(runes("b"), 3, 0)]
            .into_iter()
            .collect();
        let other: TxAssets = vec![info(ordx("a"), 5, 1), info(runes("b"), 4, 0)]
            .into_iter()
            .collect();
        let before = assets.clone();
        assert!(assets.split(&other).is_err());
        assert_eq!(assets, before);
    }

    #[test]
    fn checked_add_refuses_divisor_mismatch() {
        let mut assets = TxAssets::single(info(ordx("a"), 10, 1));
        assert_eq!(
            assets.try_add(&info(ordx("a"), 10, 10)),
            Err(AssetListError::DivisorMismatch {
                name: ordx("a"),
                expected: 1,
                found: 10,
            })
        );
        assert_eq!(assets.find(&ordx("a")).unwrap().amount, Decimal::new(10, 0));
        assets.try_add(&info(ordx("a"), 5, 1)).unwrap();
        assets.try_add(&info(ordx("b"), 5, 10)).unwrap();
        assert_eq!(assets.len(), 2);

        let other: TxAssets = vec![info(runes("c"), 1, 0), info(ordx("b"), 5, 1)]
            .into_iter()
            .collect();
        let before = assets.clone();
        assert!(assets.try_merge(&other).is_err());
        assert_eq!(assets, before);
    }

    #[test]
    fn binding_sat_amount_sums_binding_assets_only() {
        let assets: TxAssets = vec![
            info(ordx("a"), 100, 1),
            info(ordx("b"), 1000, 10),
            info(runes("c"), 99999, 0),
        ]
        .into_iter()
        .collect();
        assert_eq!(assets.binding_sat_amount(), 200);
    }
}
