//! Customer notifications. Stream: `notifications` (event log).

use chrono::{DateTime, Utc};
use ledgerstream_core::event::Event;
use serde::{Deserialize, Serialize};

/// What the notification is about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NotificationKind {
    /// A transaction completed.
    TransactionCompleted,
    /// Balance fell below the configured threshold.
    LowBalance,
    /// Spending limit reached.
    LimitReached,
    /// Suspicious activity detected.
    SuspiciousActivity,
    /// A scheduled payment is due.
    ScheduledPayment,
    /// A withdrawal was made.
    WithdrawalMade,
    /// A deposit arrived.
    DepositReceived,
}

/// Urgency of a notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    /// Informational.
    Low,
    /// Normal priority.
    Medium,
    /// Needs attention soon.
    High,
    /// Needs immediate attention.
    Urgent,
}

/// Delivery channel for a notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    /// Electronic mail.
    Email,
    /// Text message.
    Sms,
    /// Mobile push notification.
    Push,
    /// In-app message center.
    InApp,
}

/// A notification raised for an account holder.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Unique notification identifier.
    pub notification_id: String,
    /// Account the notification concerns.
    pub account_id: String,
    /// Transaction that triggered it, when applicable.
    pub transaction_id: Option<String>,
    /// What this notification is about.
    pub kind: NotificationKind,
    /// Short title.
    pub title: String,
    /// Full message body.
    pub message: String,
    /// Urgency.
    pub priority: Priority,
    /// Whether the holder has read it.
    pub read: bool,
    /// When it was raised.
    pub occurred_at: DateTime<Utc>,
    /// Channel it was (or will be) delivered through.
    pub channel: Channel,
}

impl Event for Notification {
    fn event_type(&self) -> &'static str {
        "Notification.v1"
    }

    fn partition_key(&self) -> &str {
        &self.notification_id
    }
}
