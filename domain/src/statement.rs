//! Statement entries. Stream: `statements` (event log).

use chrono::{DateTime, Utc};
use ledgerstream_core::event::Event;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Direction of a statement movement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Movement {
    /// Funds left the account.
    Debit,
    /// Funds entered the account.
    Credit,
}

/// One line of an account statement.
///
/// Mirrors a settled transaction from the point of view of a single account,
/// with the balance before and after the movement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatementEntry {
    /// Unique statement entry identifier.
    pub entry_id: String,
    /// Account whose statement this entry belongs to.
    pub account_id: String,
    /// Transaction that produced the movement.
    pub transaction_id: String,
    /// Debit or credit.
    pub movement: Movement,
    /// Movement amount.
    pub amount: Decimal,
    /// Balance before the movement was applied.
    pub balance_before: Decimal,
    /// Balance after the movement was applied.
    pub balance_after: Decimal,
    /// When the movement happened.
    pub occurred_at: DateTime<Utc>,
    /// Free-form description.
    pub description: String,
    /// Counterparty account, when there is one.
    pub counterparty: Option<String>,
}

impl Event for StatementEntry {
    fn event_type(&self) -> &'static str {
        "StatementEntry.v1"
    }

    fn partition_key(&self) -> &str {
        &self.entry_id
    }
}
