//! Account balances. Stream: `balances` (compacted).

use chrono::{DateTime, Utc};
use ledgerstream_core::event::Event;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Current balance of an account.
///
/// Published keyed by `account_id`: the compacted stream keeps only the
/// newest balance per account, and the latest-value projection mirrors that.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    /// Account this balance belongs to.
    pub account_id: String,
    /// Current booked balance.
    pub current: Decimal,
    /// Amount blocked by holds and pending operations.
    pub blocked: Decimal,
    /// Overdraft/credit limit granted to the account.
    pub limit: Decimal,
    /// When this balance was produced.
    pub updated_at: DateTime<Utc>,
    /// ISO 4217 currency code.
    pub currency: String,
}

impl Balance {
    /// Balance available for spending: current minus blocked.
    #[must_use]
    pub fn available(&self) -> Decimal {
        self.current - self.blocked
    }

    /// Total spending power: current balance plus the granted limit.
    #[must_use]
    pub fn total_with_limit(&self) -> Decimal {
        self.current + self.limit
    }
}

impl Event for Balance {
    fn event_type(&self) -> &'static str {
        "Balance.v1"
    }

    fn partition_key(&self) -> &str {
        &self.account_id
    }
}
