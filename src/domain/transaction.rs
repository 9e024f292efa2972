use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::balance::BalanceSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxKind {
    Deposit,
    Hold,
    Release,
    Payment,
}

/// Deposits, releases and payments are `Completed` as soon as they are
/// journaled. Holds start `Active` and settle exactly once, to `Released`
/// (bid lost) or `Captured` (auction won, hold converted into a payment).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxStatus {
    Completed,
    Active,
    Released,
    Captured,
}

/// Append-only journal entry. `balance_before` / `balance_after` bracket the
/// mutation; `related_id` on a release or payment points at the hold it
/// settled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxRecord {
    pub id: Uuid,
    pub kind: TxKind,
    pub amount: Decimal,
    pub timestamp: DateTime<Utc>,
    pub status: TxStatus,
    pub product_id: Option<String>,
    pub bid_id: Option<String>,
    pub related_id: Option<Uuid>,
    pub balance_before: BalanceSnapshot,
    pub balance_after: BalanceSnapshot,
}

#[derive(Debug, Clone)]
pub enum Command {
    Deposit {
        amount: Decimal,
    },
    Hold {
        amount: Decimal,
        product_id: Option<String>,
        bid_id: String,
    },
    Release {
        bid_id: String,
    },
    Payment {
        bid_id: String,
    },
}

impl core::fmt::Display for Command {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Command::Deposit { amount } => write!(f, "deposit,amount={}", amount),
            Command::Hold {
                amount,
                product_id,
                bid_id,
            } => write!(
                f,
                "hold,amount={},product={},bid={}",
                amount,
                product_id.as_deref().unwrap_or("-"),
                bid_id
            ),
            Command::Release { bid_id } => write!(f, "release,bid={}", bid_id),
            Command::Payment { bid_id } => write!(f, "payment,bid={}", bid_id),
        }
    }
}
