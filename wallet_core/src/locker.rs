//! Advisory locks on outputs picked for in-flight transactions.
//!
//! Concurrent transaction builds must not spend the same output. A build
//! locks its inputs before constructing records from indexer data and
//! unlocks them when the transaction is dropped or its inputs are seen spent.
//! The lock table lives here; the accounting records stay lock-free.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use sat_outputs::AssetQuery;
use sat_types::{NetworkId, OutPoint, TxAssets};
use sat_utils::{format_duration, now_millis};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{WalletConfig, WalletError};

/// What is known about a locked output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockedUtxo {
    pub locked_at_ms: u64,
    pub reason: String,
    /// Zero until filled from the output record.
    #[serde(default)]
    pub value: i64,
    #[serde(default)]
    pub assets: TxAssets,
}

type LockKey = (NetworkId, OutPoint);

#[derive(Debug, Default)]
pub struct UtxoLocker {
    /// Locks older than this are dropped by [`UtxoLocker::expire_stale`].
    expiry_ms: Option<u64>,
    entries: RwLock<HashMap<LockKey, LockedUtxo>>,
}

impl UtxoLocker {
    pub fn new(expiry_ms: Option<u64>) -> Self {
        Self {
            expiry_ms,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// A locker using the expiry from `config`.
    pub fn from_config(config: &WalletConfig) -> Self {
        Self::new(config.lock_expiry_ms())
    }

    /// Lock one output. Returns `false` if it was already locked, in which
    /// case the existing entry is kept.
    pub fn lock(&self, network: NetworkId, outpoint: OutPoint, reason: &str) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        Self::insert(&mut entries, network, outpoint, reason, 0, TxAssets::new())
    }

    /// Lock several outputs at once. Returns how many were newly locked.
    pub fn lock_many<'a, I>(&self, network: NetworkId, outpoints: I, reason: &str) -> usize
    where
        I: IntoIterator<Item = &'a OutPoint>,
    {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        outpoints
            .into_iter()
            .filter(|op| Self::insert(&mut entries, network, **op, reason, 0, TxAssets::new()))
            .count()
    }

    /// Lock an output record, remembering its value and assets.
    pub fn lock_output<T: AssetQuery>(
        &self,
        network: NetworkId,
        output: &T,
        reason: &str,
    ) -> Result<bool, WalletError> {
        let outpoint = *output.outpoint().ok_or(WalletError::NoOutpoint)?;
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        Ok(Self::insert(
            &mut entries,
            network,
            outpoint,
            reason,
            output.value(),
            output.assets().clone(),
        ))
    }

    /// Release one output. Returns `false` if it was not locked.
    pub fn unlock(&self, network: NetworkId, outpoint: &OutPoint) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let removed = entries.remove(&(network, *outpoint)).is_some();
        if removed {
            info!(%network, %outpoint, "utxo unlocked");
        }
        removed
    }

    /// Release every locked output among `spent`, e.g. the inputs of a newly
    /// seen block. Returns how many were released.
    pub fn unlock_spent<'a, I>(&self, network: NetworkId, spent: I) -> usize
    where
        I: IntoIterator<Item = &'a OutPoint>,
    {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let released = spent
            .into_iter()
            .filter(|op| entries.remove(&(network, **op)).is_some())
            .count();
        if released > 0 {
            info!(%network, released, "released spent utxos");
        }
        released
    }

    pub fn is_locked(&self, network: NetworkId, outpoint: &OutPoint) -> bool {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.contains_key(&(network, *outpoint))
    }

    /// The first of `candidates` that is locked, if any.
    pub fn first_locked<'a, I>(&self, network: NetworkId, candidates: I) -> Option<OutPoint>
    where
        I: IntoIterator<Item = &'a OutPoint>,
    {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        candidates
            .into_iter()
            .find(|op| entries.contains_key(&(network, **op)))
            .copied()
    }

    /// Fail with [`WalletError::Locked`] if any of `candidates` is locked.
    pub fn ensure_unlocked<'a, I>(&self, network: NetworkId, candidates: I) -> Result<(), WalletError>
    where
        I: IntoIterator<Item = &'a OutPoint>,
    {
        match self.first_locked(network, candidates) {
            Some(op) => Err(WalletError::Locked(op.to_string())),
            None => Ok(()),
        }
    }

    /// Snapshot of the locks held on `network`, sorted by outpoint.
    pub fn locked(&self, network: NetworkId) -> Vec<(OutPoint, LockedUtxo)> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let mut list: Vec<_> = entries
            .iter()
            .filter(|((net, _), _)| *net == network)
            .map(|((_, op), lock)| (*op, lock.clone()))
            .collect();
        list.sort_by(|a, b| a.0.cmp(&b.0));
        list
    }

    /// Drop locks older than the configured expiry as of `now_ms`. Returns how
    /// many were dropped; always zero when locks never expire.
    pub fn expire_stale(&self, now_ms: u64) -> usize {
        let Some(expiry) = self.expiry_ms else {
            return 0;
        };
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|(network, outpoint), lock| {
            let age = now_ms.saturating_sub(lock.locked_at_ms);
            let keep = age < expiry;
            if !keep {
                debug!(
                    %network,
                    %outpoint,
                    age = %format_duration(age / 1000),
                    reason = %lock.reason,
                    "expiring stale lock"
                );
            }
            keep
        });
        before - entries.len()
    }

    fn insert(
        entries: &mut HashMap<LockKey, LockedUtxo>,
        network: NetworkId,
        outpoint: OutPoint,
        reason: &str,
        value: i64,
        assets: TxAssets,
    ) -> bool {
        if entries.contains_key(&(network, outpoint)) {
            debug!(%network, %outpoint, "utxo already locked");
            return false;
        }
        entries.insert(
            (network, outpoint),
            LockedUtxo {
                locked_at_ms: now_millis(),
                reason: reason.to_string(),
                value,
                assets,
            },
        );
        info!(%network, %outpoint, reason, "utxo locked");
        true
    }
}
