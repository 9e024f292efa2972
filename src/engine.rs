use chrono::Utc;
use futures::StreamExt;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::{
    Command, DeadLetterQueue, Error, LedgerStore, TxKind, TxRecord, TxStatus,
    traits::CommandStream,
};

pub struct Engine<I, S, D>
where
    I: CommandStream,
    S: LedgerStore,
    D: DeadLetterQueue,
{
    ingestion: I,
    store: S,
    dlq: D,
}

impl<I, S, D> Engine<I, S, D>
where
    I: CommandStream,
    S: LedgerStore,
    D: DeadLetterQueue,
{
    pub fn new(ingestion: I, store: S, dlq: D) -> Self {
        Self {
            ingestion,
            store,
            dlq,
        }
    }

    /// Drain the command stream. A rejected command goes to the DLQ and the
    /// run continues; the ledger is left exactly as it was before that
    /// command.
    pub async fn process(&mut self) -> Result<(), Error> {
        let mut commands = self.ingestion.stream();

        while let Some(cmd) = commands.next().await {
            match cmd {
                Ok(cmd) => match self.apply(cmd) {
                    Ok(_) => {}
                    Err(e) => self.dlq.report(&e),
                },
                Err(e) => self.dlq.report(&e),
            }
        }

        Ok(())
    }

    pub fn apply(&mut self, cmd: Command) -> Result<TxRecord, Error> {
        tracing::debug!(command = %cmd, "applying command");

        let record = match cmd {
            Command::Deposit { amount } => self.deposit(amount),
            Command::Hold {
                amount,
                product_id,
                bid_id,
            } => self.hold(amount, product_id, bid_id),
            Command::Release { bid_id } => self.settle(&bid_id, TxKind::Release),
            Command::Payment { bid_id } => self.settle(&bid_id, TxKind::Payment),
        }?;

        tracing::info!(
            kind = ?record.kind,
            amount = %record.amount,
            available = %record.balance_after.available,
            held = %record.balance_after.held,
            total = %record.balance_after.total,
            "balance updated"
        );

        Ok(record)
    }

    fn deposit(&mut self, amount: Decimal) -> Result<TxRecord, Error> {
        check_amount(amount)?;

        let balance = self.store.balance();
        let before = balance.snapshot();
        balance.available += amount;
        balance.sync_total();

        let record = TxRecord {
            id: Uuid::new_v4(),
            kind: TxKind::Deposit,
            amount,
            timestamp: Utc::now(),
            status: TxStatus::Completed,
            product_id: None,
            bid_id: None,
            related_id: None,
            balance_before: before,
            balance_after: balance.snapshot(),
        };
        self.store.append(record.clone())?;
        Ok(record)
    }

    fn hold(
        &mut self,
        amount: Decimal,
        product_id: Option<String>,
        bid_id: String,
    ) -> Result<TxRecord, Error> {
        check_amount(amount)?;

        if self.store.active_hold(&bid_id).is_some() {
            return Err(Error::DuplicateBid(bid_id));
        }

        let balance = self.store.balance();
        if balance.available < amount {
            return Err(Error::InsufficientFunds {
                requested: amount,
                available: balance.available,
            });
        }

        let before = balance.snapshot();
        balance.available -= amount;
        balance.held += amount;
        balance.active_holds += 1;
        balance.sync_total();

        let record = TxRecord {
            id: Uuid::new_v4(),
            kind: TxKind::Hold,
            amount,
            timestamp: Utc::now(),
            status: TxStatus::Active,
            product_id,
            bid_id: Some(bid_id),
            related_id: None,
            balance_before: before,
            balance_after: balance.snapshot(),
        };
        self.store.append(record.clone())?;
        Ok(record)
    }

    /// Release and payment share everything except where the held amount
    /// goes: a release returns it to `available`, a payment drops it from
    /// the ledger entirely.
    fn settle(&mut self, bid_id: &str, kind: TxKind) -> Result<TxRecord, Error> {
        let hold = self
            .store
            .active_hold(bid_id)
            .ok_or_else(|| Error::HoldNotFound(bid_id.to_string()))?;

        let amount = hold.amount;
        let hold_id = hold.id;
        let product_id = hold.product_id.clone();
        let hold_status = if kind == TxKind::Release {
            TxStatus::Released
        } else {
            TxStatus::Captured
        };

        let balance = self.store.balance();
        let before = balance.snapshot();
        balance.held -= amount;
        if kind == TxKind::Release {
            balance.available += amount;
        }
        balance.active_holds -= 1;
        balance.sync_total();
        let after = balance.snapshot();

        self.store.settle_hold(hold_id, hold_status);

        let record = TxRecord {
            id: Uuid::new_v4(),
            kind,
            amount,
            timestamp: Utc::now(),
            status: TxStatus::Completed,
            product_id,
            bid_id: Some(bid_id.to_string()),
            related_id: Some(hold_id),
            balance_before: before,
            balance_after: after,
        };
        self.store.append(record.clone())?;
        Ok(record)
    }

    pub fn flush(&mut self) -> Result<(), Error> {
        self.store.flush()
    }

    pub fn balance(&mut self) -> &crate::domain::Balance {
        self.store.balance()
    }

    pub fn journal(&self) -> &[TxRecord] {
        self.store.journal()
    }
}

fn check_amount(amount: Decimal) -> Result<(), Error> {
    if amount <= Decimal::ZERO {
        return Err(Error::InvalidAmount(amount));
    }
    Ok(())
}
