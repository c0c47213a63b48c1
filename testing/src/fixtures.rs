//! Ready-made domain records for tests.
//!
//! Every builder takes the fields a test usually cares about and fills the
//! rest with plausible defaults. Amounts are given in cents to keep call
//! sites short.

use chrono::{DateTime, TimeZone, Utc};
use ledgerstream_domain::{
    Account, AccountKind, AccountStatus, AuditEvent, AuditKind, Balance, Channel, Movement,
    Notification, NotificationKind, Priority, StatementEntry, Transaction, TransactionKind,
    TransactionStatus,
};
use rust_decimal::Decimal;

/// A fixed instant offset by `secs` seconds, for deterministic ordering.
///
/// # Panics
///
/// Panics if `secs` is outside the representable timestamp range, which does
/// not happen for the small offsets tests use.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_735_689_600 + secs, 0).single().unwrap()
}

/// A balance of `cents` for the account, no blocks, no limit.
#[must_use]
pub fn balance(account_id: &str, cents: i64) -> Balance {
    Balance {
        account_id: account_id.to_string(),
        current: Decimal::new(cents, 2),
        blocked: Decimal::ZERO,
        limit: Decimal::ZERO,
        updated_at: at(0),
        currency: "USD".to_string(),
    }
}

/// An active checking account.
#[must_use]
pub fn account(account_id: &str) -> Account {
    Account {
        account_id: account_id.to_string(),
        holder_name: "Jane Holder".to_string(),
        holder_document: "000.000.000-00".to_string(),
        branch: "0001".to_string(),
        number: "12345-6".to_string(),
        kind: AccountKind::Checking,
        status: AccountStatus::Active,
        created_at: at(0),
        updated_at: at(0),
    }
}

/// A completed transfer of `cents` between two accounts, occurring at
/// [`at`]`(secs)`.
#[must_use]
pub fn transaction(id: &str, from: &str, to: &str, cents: i64, secs: i64) -> Transaction {
    Transaction {
        transaction_id: id.to_string(),
        source_account: from.to_string(),
        destination_account: to.to_string(),
        amount: Decimal::new(cents, 2),
        kind: TransactionKind::Transfer,
        status: TransactionStatus::Completed,
        occurred_at: at(secs),
        description: "test transfer".to_string(),
        category: "transfers".to_string(),
    }
}

/// A debit statement entry tied to a transaction.
#[must_use]
pub fn statement_entry(id: &str, account_id: &str, transaction_id: &str, secs: i64) -> StatementEntry {
    StatementEntry {
        entry_id: id.to_string(),
        account_id: account_id.to_string(),
        transaction_id: transaction_id.to_string(),
        movement: Movement::Debit,
        amount: Decimal::new(1_000, 2),
        balance_before: Decimal::new(10_000, 2),
        balance_after: Decimal::new(9_000, 2),
        occurred_at: at(secs),
        description: "test entry".to_string(),
        counterparty: None,
    }
}

/// A medium-priority in-app notification.
#[must_use]
pub fn notification(id: &str, account_id: &str, secs: i64) -> Notification {
    Notification {
        notification_id: id.to_string(),
        account_id: account_id.to_string(),
        transaction_id: None,
        kind: NotificationKind::TransactionCompleted,
        title: "Transaction completed".to_string(),
        message: "Your transaction completed".to_string(),
        priority: Priority::Medium,
        read: false,
        occurred_at: at(secs),
        channel: Channel::InApp,
    }
}

/// A successful login audit event.
#[must_use]
pub fn audit_event(id: &str, account_id: &str, secs: i64) -> AuditEvent {
    AuditEvent {
        event_id: id.to_string(),
        user_id: "user-1".to_string(),
        account_id: account_id.to_string(),
        transaction_id: None,
        kind: AuditKind::Login,
        action: "login".to_string(),
        details: String::new(),
        occurred_at: at(secs),
        source_ip: "203.0.113.7".to_string(),
        device: "test-device".to_string(),
        success: true,
        failure_reason: None,
    }
}
