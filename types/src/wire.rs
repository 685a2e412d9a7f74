//! Transaction output as it appears on the wire.

use serde::{Deserialize, Serialize};

use crate::asset::TxAssets;

/// A transaction output: value in satoshis, locking script, and the asset
/// list carried natively by second-layer outputs (empty on the base chain).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOut {
    pub value: i64,
    #[serde(with = "hex_bytes")]
    pub pk_script: Vec<u8>,
    #[serde(default, skip_serializing_if = "TxAssets::is_empty")]
    pub assets: TxAssets,
}

impl TxOut {
    pub fn new(value: i64, pk_script: Vec<u8>) -> Self {
        Self {
            value,
            pk_script,
            assets: TxAssets::new(),
        }
    }

    pub fn with_assets(value: i64, pk_script: Vec<u8>, assets: TxAssets) -> Self {
        Self {
            value,
            pk_script,
            assets,
        }
    }
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(d)?;
        hex::decode(text).map_err(serde::de::Error::custom)
    }
}
