use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Demo accounts start with this many units available.
pub const DEMO_SEED: Decimal = Decimal::from_parts(1000, 0, 0, false, 0);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Balance {
    pub available: Decimal, // funds free to hold or spend
    pub held: Decimal,      // funds earmarked by active holds
    pub total: Decimal,     // total funds = available + held
    pub active_holds: u32,
}

impl Balance {
    pub fn new() -> Self {
        Self {
            available: Decimal::ZERO,
            held: Decimal::ZERO,
            total: Decimal::ZERO,
            active_holds: 0,
        }
    }

    pub fn sync_total(&mut self) {
        self.total = self.available + self.held;
    }

    pub fn snapshot(&self) -> BalanceSnapshot {
        BalanceSnapshot {
            available: self.available,
            held: self.held,
            total: self.total,
        }
    }
}

impl Default for Balance {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of the three balance figures, recorded on journal
/// entries as `balance_before` / `balance_after`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    pub available: Decimal,
    pub held: Decimal,
    pub total: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_is_derived_from_available_and_held() {
        let mut balance = Balance::new();
        balance.available = Decimal::new(7500, 1);
        balance.held = Decimal::new(2500, 1);
        balance.sync_total();
        assert_eq!(balance.total, Decimal::new(1000, 0));
    }

    #[test]
    fn demo_seed_is_one_thousand() {
        assert_eq!(DEMO_SEED, Decimal::new(1000, 0));
    }
}
