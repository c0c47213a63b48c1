//! Audit trail events. Stream: `audit` (event log).

use chrono::{DateTime, Utc};
use ledgerstream_core::event::Event;
use serde::{Deserialize, Serialize};

/// Category of audited action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuditKind {
    /// User signed in.
    Login,
    /// User signed out.
    Logout,
    /// Funds transfer attempted or completed.
    Transfer,
    /// Balance was queried.
    BalanceInquiry,
    /// Account data was changed.
    DataChange,
    /// Account was blocked.
    Block,
    /// Account was unblocked.
    Unblock,
    /// Fraud attempt detected.
    FraudAttempt,
}

/// One entry of the audit trail.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Unique audit event identifier.
    pub event_id: String,
    /// User who performed the action.
    pub user_id: String,
    /// Account the action concerned.
    pub account_id: String,
    /// Transaction involved, when applicable.
    pub transaction_id: Option<String>,
    /// Category of action.
    pub kind: AuditKind,
    /// Short action name.
    pub action: String,
    /// Free-form detail.
    pub details: String,
    /// When the action happened.
    pub occurred_at: DateTime<Utc>,
    /// Originating IP address.
    pub source_ip: String,
    /// Originating device description.
    pub device: String,
    /// Whether the action succeeded.
    pub success: bool,
    /// Failure reason when `success` is false.
    pub failure_reason: Option<String>,
}

impl Event for AuditEvent {
    fn event_type(&self) -> &'static str {
        "AuditEvent.v1"
    }

    fn partition_key(&self) -> &str {
        &self.event_id
    }
}
