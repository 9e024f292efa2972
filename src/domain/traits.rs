use futures::Stream;
use uuid::Uuid;

use crate::domain::{Balance, Command, Error, TxRecord, TxStatus};

pub trait CommandStream {
    type CmdStream: Stream<Item = Result<Command, Error>> + Send + Unpin + 'static;
    fn stream(&mut self) -> Self::CmdStream;
}

pub trait DeadLetterQueue {
    fn report(&self, error: &Error);
}

/// Balance aggregate plus append-only journal. Implementations seed a fresh
/// ledger with the demo balance so the journal explains the state from the
/// first entry.
pub trait LedgerStore {
    fn balance(&mut self) -> &mut Balance;

    fn append(&mut self, record: TxRecord) -> Result<(), Error>;

    /// The `Active` hold journaled for this bid, if any.
    fn active_hold(&self, bid_id: &str) -> Option<&TxRecord>;

    /// Move a hold out of `Active` (to `Released` or `Captured`).
    fn settle_hold(&mut self, id: Uuid, status: TxStatus);

    fn journal(&self) -> &[TxRecord];

    fn flush(&mut self) -> Result<(), Error>;
}
