//! The financial read model: one projection table per stream.

use crate::pipeline::{IngestError, StreamProjection};
use crate::store::{HistoryRecord, HistoryTable, LatestTable};
use chrono::{DateTime, Utc};
use ledgerstream_core::event::SerializedEvent;
use ledgerstream_core::topic;
use ledgerstream_domain::{
    Account, AuditEvent, Balance, Notification, StatementEntry, Transaction,
};

impl HistoryRecord for Transaction {
    fn record_id(&self) -> &str {
        &self.transaction_id
    }

    fn recorded_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}

impl HistoryRecord for StatementEntry {
    fn record_id(&self) -> &str {
        &self.entry_id
    }

    fn recorded_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}

impl HistoryRecord for Notification {
    fn record_id(&self) -> &str {
        &self.notification_id
    }

    fn recorded_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}

impl HistoryRecord for AuditEvent {
    fn record_id(&self) -> &str {
        &self.event_id
    }

    fn recorded_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}

/// Record counts per stream, for introspection and health reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordCounts {
    /// Accounts currently projected.
    pub accounts: usize,
    /// Balances currently projected.
    pub balances: usize,
    /// Transactions retained.
    pub transactions: usize,
    /// Statement entries retained.
    pub statements: usize,
    /// Notifications retained.
    pub notifications: usize,
    /// Audit events retained.
    pub audit_events: usize,
}

/// All projection tables of the financial read model.
///
/// Compacted streams project into [`LatestTable`]s, event-log streams into
/// [`HistoryTable`]s. The ingest pipeline routes each event here by stream
/// name; the query service reads from the same tables concurrently.
#[derive(Debug, Default)]
pub struct FinancialProjections {
    /// Account master data, by account id.
    pub accounts: LatestTable<Account>,
    /// Current balances, by account id.
    pub balances: LatestTable<Balance>,
    /// Transaction history.
    pub transactions: HistoryTable<Transaction>,
    /// Statement entries.
    pub statements: HistoryTable<StatementEntry>,
    /// Notifications.
    pub notifications: HistoryTable<Notification>,
    /// Audit trail.
    pub audit_events: HistoryTable<AuditEvent>,
}

impl FinancialProjections {
    /// Create an empty read model.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record counts per stream.
    #[must_use]
    pub fn counts(&self) -> RecordCounts {
        RecordCounts {
            accounts: self.accounts.len(),
            balances: self.balances.len(),
            transactions: self.transactions.len(),
            statements: self.statements.len(),
            notifications: self.notifications.len(),
            audit_events: self.audit_events.len(),
        }
    }

    /// Drop all projected state, ahead of a full replay.
    pub fn clear(&self) {
        self.accounts.clear();
        self.balances.clear();
        self.transactions.clear();
        self.statements.clear();
        self.notifications.clear();
        self.audit_events.clear();
    }
}

impl StreamProjection for FinancialProjections {
    fn apply(&self, topic: &str, event: &SerializedEvent) -> Result<(), IngestError> {
        let decode_err = |e: ledgerstream_core::event::EventError| IngestError::Decode {
            topic: topic.to_string(),
            reason: e.to_string(),
        };

        match topic {
            t if t == topic::ACCOUNTS.name => {
                let account: Account = event.decode().map_err(decode_err)?;
                self.accounts.put(event.key.clone(), account);
            }
            t if t == topic::BALANCES.name => {
                let balance: Balance = event.decode().map_err(decode_err)?;
                self.balances.put(event.key.clone(), balance);
            }
            t if t == topic::TRANSACTIONS.name => {
                let tx: Transaction = event.decode().map_err(decode_err)?;
                self.transactions.append(event.key.clone(), tx);
            }
            t if t == topic::STATEMENTS.name => {
                let entry: StatementEntry = event.decode().map_err(decode_err)?;
                self.statements.append(event.key.clone(), entry);
            }
            t if t == topic::NOTIFICATIONS.name => {
                let notification: Notification = event.decode().map_err(decode_err)?;
                self.notifications.append(event.key.clone(), notification);
            }
            t if t == topic::AUDIT.name => {
                let audit: AuditEvent = event.decode().map_err(decode_err)?;
                self.audit_events.append(event.key.clone(), audit);
            }
            other => {
                return Err(IngestError::UnknownTopic {
                    topic: other.to_string(),
                });
            }
        }
        Ok(())
    }
}
