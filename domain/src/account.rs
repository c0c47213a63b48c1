//! Account master data. Stream: `accounts` (compacted).

use chrono::{DateTime, Utc};
use ledgerstream_core::event::Event;
use serde::{Deserialize, Serialize};

/// Kind of bank account.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountKind {
    /// Everyday checking account.
    Checking,
    /// Interest-bearing savings account.
    Savings,
    /// Salary-receiving account with restricted operations.
    Salary,
    /// Investment account.
    Investment,
}

/// Lifecycle status of an account.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountStatus {
    /// Open and operating normally.
    Active,
    /// Dormant; no recent activity.
    Inactive,
    /// Operations suspended (fraud hold, court order).
    Blocked,
    /// Permanently closed.
    Closed,
}

/// Master data for a bank account.
///
/// Published keyed by `account_id` so the compacted stream holds the current
/// version of each account.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Unique account identifier.
    pub account_id: String,
    /// Legal name of the holder.
    pub holder_name: String,
    /// Holder's identity document number.
    pub holder_document: String,
    /// Branch code.
    pub branch: String,
    /// Account number within the branch.
    pub number: String,
    /// Kind of account.
    pub kind: AccountKind,
    /// Current lifecycle status.
    pub status: AccountStatus,
    /// When the account was opened.
    pub created_at: DateTime<Utc>,
    /// When this version of the record was produced.
    pub updated_at: DateTime<Utc>,
}

impl Event for Account {
    fn event_type(&self) -> &'static str {
        "Account.v1"
    }

    fn partition_key(&self) -> &str {
        &self.account_id
    }
}
