//! # Ledgerstream Domain
//!
//! The closed set of domain record kinds carried by the streams:
//!
//! | Record | Stream | Policy | Partition key |
//! |---|---|---|---|
//! | [`Account`] | `accounts` | compacted | account id |
//! | [`Balance`] | `balances` | compacted | account id |
//! | [`Transaction`] | `transactions` | event log | transaction id |
//! | [`StatementEntry`] | `statements` | event log | entry id |
//! | [`Notification`] | `notifications` | event log | notification id |
//! | [`AuditEvent`] | `audit` | event log | audit event id |
//!
//! Monetary amounts are exact decimals (`rust_decimal`), never floats.
//! Derived quantities (available balance, total with limit) are computed on
//! access, never stored.

pub mod account;
pub mod audit;
pub mod balance;
pub mod notification;
pub mod statement;
pub mod transaction;

pub use account::{Account, AccountKind, AccountStatus};
pub use audit::{AuditEvent, AuditKind};
pub use balance::Balance;
pub use notification::{Channel, Notification, NotificationKind, Priority};
pub use statement::{Movement, StatementEntry};
pub use transaction::{Transaction, TransactionKind, TransactionStatus};
