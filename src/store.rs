use std::fs;
use std::path::PathBuf;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Balance, DEMO_SEED, Error, LedgerStore, TxKind, TxRecord, TxStatus};

/// Serialized form of the whole ledger: the balance plus the journal that
/// explains it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub balance: Balance,
    pub journal: Vec<TxRecord>,
}

#[derive(Debug)]
pub struct MemoryStore {
    balance: Balance,
    journal: Vec<TxRecord>,
}

impl MemoryStore {
    /// Fresh ledger. The demo seed is journaled as the first deposit so the
    /// journal explains the balance from the start.
    pub fn new() -> Self {
        let mut balance = Balance::new();
        let before = balance.snapshot();
        balance.available = DEMO_SEED;
        balance.sync_total();

        let seed = TxRecord {
            id: Uuid::new_v4(),
            kind: TxKind::Deposit,
            amount: DEMO_SEED,
            timestamp: Utc::now(),
            status: TxStatus::Completed,
            product_id: None,
            bid_id: None,
            related_id: None,
            balance_before: before,
            balance_after: balance.snapshot(),
        };

        Self {
            balance,
            journal: vec![seed],
        }
    }

    pub fn from_snapshot(snapshot: LedgerSnapshot) -> Self {
        Self {
            balance: snapshot.balance,
            journal: snapshot.journal,
        }
    }

    fn to_snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            balance: self.balance.clone(),
            journal: self.journal.clone(),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerStore for MemoryStore {
    fn balance(&mut self) -> &mut Balance {
        &mut self.balance
    }

    fn append(&mut self, record: TxRecord) -> Result<(), Error> {
        self.journal.push(record);
        Ok(())
    }

    fn active_hold(&self, bid_id: &str) -> Option<&TxRecord> {
        self.journal.iter().find(|r| {
            r.kind == TxKind::Hold
                && r.status == TxStatus::Active
                && r.bid_id.as_deref() == Some(bid_id)
        })
    }

    fn settle_hold(&mut self, id: Uuid, status: TxStatus) {
        if let Some(hold) = self.journal.iter_mut().find(|r| r.id == id) {
            hold.status = status;
        }
    }

    fn journal(&self) -> &[TxRecord] {
        &self.journal
    }

    fn flush(&mut self) -> Result<(), Error> {
        println!("total,held,available,active_holds");
        println!(
            "{:.4},{:.4},{:.4},{}",
            self.balance.total, self.balance.held, self.balance.available, self.balance.active_holds
        );
        Ok(())
    }
}

/// File-backed ledger: a [`MemoryStore`] that loads a JSON snapshot on open
/// and writes it back on flush. Writes go through a sibling temp file and a
/// rename so a crash never leaves a half-written ledger behind.
pub struct JsonStore {
    inner: MemoryStore,
    path: PathBuf,
}

impl JsonStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, Error> {
        let path = path.into();
        let inner = match fs::read_to_string(&path) {
            Ok(raw) => {
                let snapshot: LedgerSnapshot = serde_json::from_str(&raw).map_err(|e| {
                    Error::Storage(format!("corrupt ledger file {}: {}", path.display(), e))
                })?;
                tracing::debug!(
                    path = %path.display(),
                    entries = snapshot.journal.len(),
                    "loaded ledger"
                );
                MemoryStore::from_snapshot(snapshot)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => MemoryStore::new(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self { inner, path })
    }

    /// Discard whatever the file holds and start over from the demo seed.
    pub fn fresh(path: impl Into<PathBuf>) -> Self {
        Self {
            inner: MemoryStore::new(),
            path: path.into(),
        }
    }
}

impl LedgerStore for JsonStore {
    fn balance(&mut self) -> &mut Balance {
        self.inner.balance()
    }

    fn append(&mut self, record: TxRecord) -> Result<(), Error> {
        self.inner.append(record)
    }

    fn active_hold(&self, bid_id: &str) -> Option<&TxRecord> {
        self.inner.active_hold(bid_id)
    }

    fn settle_hold(&mut self, id: Uuid, status: TxStatus) {
        self.inner.settle_hold(id, status)
    }

    fn journal(&self) -> &[TxRecord] {
        self.inner.journal()
    }

    fn flush(&mut self) -> Result<(), Error> {
        let raw = serde_json::to_string_pretty(&self.inner.to_snapshot())
            .map_err(|e| Error::Storage(e.to_string()))?;

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, raw)?;
        fs::rename(&tmp, &self.path)?;
        tracing::debug!(path = %self.path.display(), "ledger persisted");

        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn fresh_store_is_seeded_with_the_demo_balance() {
        let mut store = MemoryStore::new();

        assert_eq!(store.balance().available, DEMO_SEED);
        assert_eq!(store.balance().total, DEMO_SEED);
        assert_eq!(store.journal().len(), 1);
        assert_eq!(store.journal()[0].kind, TxKind::Deposit);
    }

    #[test]
    fn snapshot_roundtrips_through_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");

        let mut store = JsonStore::open(&path).unwrap();
        store.balance().available += Decimal::new(50, 0);
        store.balance().sync_total();
        store.flush().unwrap();

        let mut reopened = JsonStore::open(&path).unwrap();
        assert_eq!(reopened.balance().available, Decimal::new(1050, 0));
        assert_eq!(reopened.balance().total, Decimal::new(1050, 0));
        assert_eq!(reopened.journal().len(), 1);
    }

    #[test]
    fn corrupt_file_is_a_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        fs::write(&path, "not json").unwrap();

        assert!(matches!(JsonStore::open(&path), Err(Error::Storage(_))));
    }

    #[test]
    fn fresh_ignores_existing_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");

        let mut store = JsonStore::open(&path).unwrap();
        store.balance().available += Decimal::new(500, 0);
        store.balance().sync_total();
        store.flush().unwrap();

        let mut reset = JsonStore::fresh(&path);
        assert_eq!(reset.balance().available, DEMO_SEED);
    }
}
