//! Outpoints (`txid:vout`) and packed UTXO ids.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// A reference to one transaction output.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OutPoint {
    txid: [u8; 32],
    vout: u32,
}

impl OutPoint {
    pub fn new(txid: [u8; 32], vout: u32) -> Self {
        Self { txid, vout }
    }

    pub fn txid(&self) -> &[u8; 32] {
        &self.txid
    }

    /// The txid in its hex text form.
    pub fn txid_hex(&self) -> String {
        hex::encode(self.txid)
    }

    pub fn vout(&self) -> u32 {
        self.vout
    }
}

impl fmt::Debug for OutPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OutPoint({}:{})", hex::encode(&self.txid[..4]), self.vout)
    }
}

impl fmt::Display for OutPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.txid_hex(), self.vout)
    }
}

impl FromStr for OutPoint {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseError::InvalidOutPoint(s.to_string());
        let (txid, vout) = s.split_once(':').ok_or_else(invalid)?;
        if vout.contains(':') {
            return Err(invalid());
        }
        let bytes = hex::decode(txid).map_err(|_| invalid())?;
        let txid: [u8; 32] = bytes.try_into().map_err(|_| invalid())?;
        let vout = vout.parse::<u32>().map_err(|_| invalid())?;
        Ok(Self { txid, vout })
    }
}

/// The txid portion of a `txid:vout` string, or `None` if the string is not
/// of that shape. No hex validation is done.
pub fn tx_id_from_utxo(utxo: &str) -> Option<&str> {
    match utxo.split_once(':') {
        Some((txid, vout)) if !vout.contains(':') => Some(txid),
        _ => None,
    }
}

const HEIGHT_MAX: u64 = 0x1fff_ffff;
const TX_MAX: u64 = 0x1_ffff;
const VOUT_MAX: u64 = 0x3_ffff;

/// Position of an output in the chain packed into 64 bits:
/// 29 bits of height, 17 bits of tx index, 18 bits of vout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UtxoId(u64);

impl UtxoId {
    /// Marks an output that is not (yet) placed in a block.
    pub const INVALID: Self = Self(u64::MAX);

    pub fn new(height: u64, tx: u64, vout: u64) -> Result<Self, ParseError> {
        if height > HEIGHT_MAX || tx > TX_MAX || vout > VOUT_MAX {
            return Err(ParseError::UtxoIdOutOfRange { height, tx, vout });
        }
        Ok(Self(height << 35 | tx << 18 | vout))
    }

    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }

    pub fn is_valid(&self) -> bool {
        *self != Self::INVALID
    }

    /// `(height, tx, vout)`.
    pub fn parts(&self) -> (u64, u64, u64) {
        (self.0 >> 35, (self.0 >> 18) & TX_MAX, self.0 & VOUT_MAX)
    }

    /// Block height, or `None` for [`UtxoId::INVALID`].
    pub fn height(&self) -> Option<u64> {
        self.is_valid().then(|| self.parts().0)
    }
}

impl Default for UtxoId {
    fn default() -> Self {
        Self::INVALID
    }
}
