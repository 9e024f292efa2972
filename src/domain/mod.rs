pub mod balance;
pub mod error;
pub mod traits;
pub mod transaction;

pub use balance::{Balance, BalanceSnapshot, DEMO_SEED};
pub use error::Error;
pub use traits::{CommandStream, DeadLetterQueue, LedgerStore};
pub use transaction::{Command, TxKind, TxRecord, TxStatus};
