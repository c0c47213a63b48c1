//! Financial transactions. Stream: `transactions` (event log).

use chrono::{DateTime, Utc};
use ledgerstream_core::event::Event;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Kind of transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    /// Transfer between two accounts.
    Transfer,
    /// Cash or incoming deposit.
    Deposit,
    /// Cash withdrawal.
    Withdrawal,
    /// Bill or merchant payment.
    Payment,
    /// Real-time instant transfer.
    InstantTransfer,
    /// Bank wire transfer.
    WireTransfer,
}

/// Processing status of a transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionStatus {
    /// Accepted, not yet picked up for processing.
    Pending,
    /// Being processed.
    Processing,
    /// Settled successfully.
    Completed,
    /// Rejected or errored during processing.
    Failed,
    /// Cancelled before settlement.
    Cancelled,
    /// Settled and later reversed.
    Reversed,
}

/// A single financial transaction.
///
/// Published keyed by `transaction_id`: every transaction is retained
/// individually in the event-log stream and the append-history projection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique transaction identifier.
    pub transaction_id: String,
    /// Account the funds leave.
    pub source_account: String,
    /// Account the funds arrive at.
    pub destination_account: String,
    /// Transaction amount.
    pub amount: Decimal,
    /// Kind of transaction.
    pub kind: TransactionKind,
    /// Current processing status.
    pub status: TransactionStatus,
    /// When the transaction happened.
    pub occurred_at: DateTime<Utc>,
    /// Free-form description.
    pub description: String,
    /// Spending category.
    pub category: String,
}

impl Transaction {
    /// Whether the given account participates in this transaction, on either
    /// side.
    #[must_use]
    pub fn involves(&self, account_id: &str) -> bool {
        self.source_account == account_id || self.destination_account == account_id
    }
}

impl Event for Transaction {
    fn event_type(&self) -> &'static str {
        "Transaction.v1"
    }

    fn partition_key(&self) -> &str {
        &self.transaction_id
    }
}
