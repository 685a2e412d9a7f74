//! Output records as returned by the indexer, and their conversion into the
//! accounting records.
//!
//! The indexer reports amounts as decimal strings, scripts as hex and offsets
//! as `{start, end}` pairs. Anything that does not parse, or whose offsets do
//! not match the declared amounts, is rejected as
//! [`WalletError::InvalidIndexerRecord`].

use sat_outputs::{AssetOffsets, NativeOutput, OffsetRange, RangeTrackedOutput};
use sat_types::{AssetInfo, AssetName, Decimal, OutPoint, TxAssets, UtxoId};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::WalletError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexerOffset {
    pub start: i64,
    pub end: i64,
}

/// One asset entry of an indexer output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexerAsset {
    pub name: AssetName,
    /// Fixed-point text, e.g. `"1000"` or `"0.25"`.
    pub amount: String,
    #[serde(default)]
    pub precision: u8,
    /// Asset units per satoshi; `0` for assets that do not bind sats.
    #[serde(default, rename = "bindingsat")]
    pub binding_sat: u32,
    #[serde(default)]
    pub offsets: Vec<IndexerOffset>,
}

/// An output as reported by the indexer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexerOutput {
    /// `txid:vout`; empty for outputs not yet on chain.
    #[serde(default)]
    pub outpoint: String,
    #[serde(default, rename = "utxoid")]
    pub utxo_id: Option<u64>,
    pub value: i64,
    /// Hex-encoded locking script.
    #[serde(default, rename = "pkscript")]
    pub pk_script: String,
    #[serde(default)]
    pub assets: Vec<IndexerAsset>,
}

impl IndexerOutput {
    pub fn from_json(json: &str) -> Result<Self, WalletError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Decode a JSON array of outputs.
    pub fn list_from_json(json: &str) -> Result<Vec<Self>, WalletError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Base-layer record with offsets, validated against the declared
    /// amounts.
    pub fn to_range_tracked(&self) -> Result<RangeTrackedOutput, WalletError> {
        let mut output = RangeTrackedOutput::new(self.value);
        output.outpoint = self.parse_outpoint()?;
        output.utxo_id = self.utxo_id.map(UtxoId::from_raw).unwrap_or_default();
        output.pk_script = self.parse_script()?;

        for asset in &self.assets {
            let info = self.parse_asset(asset)?;
            let offsets: AssetOffsets = asset
                .offsets
                .iter()
                .map(|o| OffsetRange::new(o.start, o.end))
                .collect();
            if !offsets.is_empty() {
                output.offsets.insert(info.name.clone(), offsets);
            }
            output.assets.add(&info);
        }

        if let Err(e) = output.check_invariants() {
            warn!(outpoint = %self.outpoint, error = %e, "indexer output failed offset check");
            return Err(self.invalid(e.to_string()));
        }
        debug!(
            outpoint = %self.outpoint,
            value = self.value,
            assets = output.assets.len(),
            "decoded range-tracked output"
        );
        Ok(output)
    }

    /// Second-layer record. Offsets are ignored; the value must still back
    /// every binding asset.
    pub fn to_native(&self) -> Result<NativeOutput, WalletError> {
        let assets = self
            .assets
            .iter()
            .map(|a| self.parse_asset(a))
            .collect::<Result<TxAssets, _>>()?;
        let needed = assets.binding_sat_amount();
        if needed > self.value {
            warn!(outpoint = %self.outpoint, needed, value = self.value, "indexer output under-backed");
            return Err(self.invalid(format!(
                "value {} cannot back {} bound sats",
                self.value, needed
            )));
        }
        Ok(NativeOutput {
            utxo_id: self.utxo_id.map(UtxoId::from_raw).unwrap_or_default(),
            outpoint: self.parse_outpoint()?,
            value: self.value,
            pk_script: self.parse_script()?,
            assets,
        })
    }

    fn parse_outpoint(&self) -> Result<Option<OutPoint>, WalletError> {
        if self.outpoint.is_empty() {
            return Ok(None);
        }
        self.outpoint
            .parse()
            .map(Some)
            .map_err(|e: sat_types::ParseError| self.invalid(e.to_string()))
    }

    fn parse_script(&self) -> Result<Vec<u8>, WalletError> {
        hex::decode(&self.pk_script).map_err(|e| self.invalid(format!("bad script hex: {e}")))
    }

    fn parse_asset(&self, asset: &IndexerAsset) -> Result<AssetInfo, WalletError> {
        if asset.name.is_plain() {
            return Err(self.invalid("asset entry with plain name".to_string()));
        }
        let amount = Decimal::from_str_with_precision(&asset.amount, asset.precision)
            .map_err(|e| self.invalid(format!("{}: {e}", asset.name)))?;
        if !amount.is_positive() {
            return Err(self.invalid(format!("{}: non-positive amount", asset.name)));
        }
        Ok(AssetInfo::new(asset.name.clone(), amount, asset.binding_sat))
    }

    fn invalid(&self, reason: String) -> WalletError {
        WalletError::InvalidIndexerRecord {
            outpoint: self.outpoint.clone(),
            reason,
        }
    }
}

impl From<&RangeTrackedOutput> for IndexerOutput {
    fn from(output: &RangeTrackedOutput) -> Self {
        let assets = output
            .assets
            .iter()
            .map(|a| IndexerAsset {
                name: a.name.clone(),
                amount: a.amount.to_string(),
                precision: a.amount.precision(),
                binding_sat: a.binding_sat,
                offsets: output
                    .offsets
                    .get(&a.name)
                    .map(|set| {
                        set.iter()
                            .map(|r| IndexerOffset {
                                start: r.start,
                                end: r.end,
                            })
                            .collect()
                    })
                    .unwrap_or_default(),
            })
            .collect();
        IndexerOutput {
            outpoint: output.outpoint.map(|o| o.to_string()).unwrap_or_default(),
            utxo_id: output.utxo_id.is_valid().then(|| output.utxo_id.raw()),
            value: output.value,
            pk_script: hex::encode(&output.pk_script),
            assets,
        }
    }
}
