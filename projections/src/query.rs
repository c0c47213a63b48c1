//! Read-only query facade over the financial read model.
//!
//! Every operation reads the live projection snapshot. Nothing here mutates
//! store state; listings copy matching records out under shard read locks so
//! the ingest path is never blocked for longer than a snapshot copy.
//!
//! Absent keys are `None`, never errors. Averaged monetary figures are
//! rounded to two decimal places, half-up.

use crate::financial::{FinancialProjections, RecordCounts};
use ledgerstream_domain::{
    Account, AuditEvent, Balance, Notification, StatementEntry, Transaction, TransactionKind,
    TransactionStatus,
};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

/// Aggregate statistics over the balance projection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalanceStats {
    /// Number of accounts with a projected balance.
    pub accounts: usize,
    /// Sum of current balances.
    pub total: Decimal,
    /// Average current balance, two decimals, half-up. Zero when empty.
    pub average: Decimal,
}

/// Aggregate statistics over the transaction projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionStats {
    /// Total number of retained transactions.
    pub total: usize,
    /// Count of transactions per processing status.
    pub by_status: HashMap<TransactionStatus, u64>,
    /// Count of transactions per kind.
    pub by_kind: HashMap<TransactionKind, u64>,
}

/// Read-only facade over the projections.
///
/// Cheap to clone; safe to call from any number of concurrent readers while
/// ingestion is running.
#[derive(Debug, Clone)]
pub struct QueryService {
    projections: Arc<FinancialProjections>,
}

impl QueryService {
    /// Create a query service over the given read model.
    #[must_use]
    pub fn new(projections: Arc<FinancialProjections>) -> Self {
        Self { projections }
    }

    // --- balances -------------------------------------------------------

    /// Current balance of an account, or `None` if never seen.
    #[must_use]
    pub fn balance(&self, account_id: &str) -> Option<Balance> {
        self.projections.balances.get(account_id)
    }

    /// All balances, ordered by account id.
    #[must_use]
    pub fn balances(&self) -> Vec<Balance> {
        self.projections.balances.list(|_| true)
    }

    /// Balances at or above a minimum current amount, highest first.
    #[must_use]
    pub fn balances_with_min(&self, minimum: Decimal) -> Vec<Balance> {
        self.projections
            .balances
            .list_by(|b| b.current >= minimum, |a, b| b.current.cmp(&a.current))
    }

    /// Account count, total and average balance over the current snapshot.
    #[must_use]
    pub fn balance_stats(&self) -> BalanceStats {
        let (accounts, total) = self
            .projections
            .balances
            .fold((0_usize, Decimal::ZERO), |(n, sum), b| {
                (n + 1, sum + b.current)
            });

        let average = if accounts == 0 {
            Decimal::ZERO
        } else {
            (total / Decimal::from(accounts))
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        };

        BalanceStats {
            accounts,
            total,
            average,
        }
    }

    // --- accounts -------------------------------------------------------

    /// Account master data, or `None` if never seen.
    #[must_use]
    pub fn account(&self, account_id: &str) -> Option<Account> {
        self.projections.accounts.get(account_id)
    }

    /// All accounts, ordered by account id.
    #[must_use]
    pub fn accounts(&self) -> Vec<Account> {
        self.projections.accounts.list(|_| true)
    }

    // --- transactions ---------------------------------------------------

    /// One transaction by identifier, or `None` if never seen.
    #[must_use]
    pub fn transaction(&self, transaction_id: &str) -> Option<Transaction> {
        // Event-log streams are keyed by the record's own identifier.
        self.projections
            .transactions
            .get(transaction_id, transaction_id)
    }

    /// All transactions, newest first.
    #[must_use]
    pub fn transactions(&self) -> Vec<Transaction> {
        self.projections.transactions.list(|_| true)
    }

    /// Transactions where the account is either side, newest first.
    #[must_use]
    pub fn transactions_for_account(&self, account_id: &str) -> Vec<Transaction> {
        self.projections
            .transactions
            .list(|t| t.involves(account_id))
    }

    /// Transactions in a given status, newest first.
    #[must_use]
    pub fn transactions_by_status(&self, status: TransactionStatus) -> Vec<Transaction> {
        self.projections.transactions.list(|t| t.status == status)
    }

    /// Transaction totals, grouped by status and by kind.
    #[must_use]
    pub fn transaction_stats(&self) -> TransactionStats {
        self.projections.transactions.fold(
            TransactionStats {
                total: 0,
                by_status: HashMap::new(),
                by_kind: HashMap::new(),
            },
            |mut stats, t| {
                stats.total += 1;
                *stats.by_status.entry(t.status).or_insert(0) += 1;
                *stats.by_kind.entry(t.kind).or_insert(0) += 1;
                stats
            },
        )
    }

    // --- statements, notifications, audit -------------------------------

    /// Statement entries for an account, newest first.
    #[must_use]
    pub fn statements_for_account(&self, account_id: &str) -> Vec<StatementEntry> {
        self.projections
            .statements
            .list(|e| e.account_id == account_id)
    }

    /// Notifications raised for an account, newest first.
    #[must_use]
    pub fn notifications_for_account(&self, account_id: &str) -> Vec<Notification> {
        self.projections
            .notifications
            .list(|n| n.account_id == account_id)
    }

    /// Audit trail entries touching an account, newest first.
    #[must_use]
    pub fn audit_trail_for_account(&self, account_id: &str) -> Vec<AuditEvent> {
        self.projections
            .audit_events
            .list(|a| a.account_id == account_id)
    }

    /// Record counts per stream.
    #[must_use]
    pub fn counts(&self) -> RecordCounts {
        self.projections.counts()
    }
}
