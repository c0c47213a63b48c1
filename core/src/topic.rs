//! Catalog of the named streams and their retention policies.
//!
//! Each stream is declared once, with the policy that drives both broker
//! configuration (compacted vs. delete retention) and the projection applied
//! by the ingest pipeline (latest-value vs. append-history).

/// Retention/projection policy of a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TopicPolicy {
    /// Compacted stream: only the newest event per key matters. Projected as
    /// a latest-value map (key -> current record).
    Compacted,
    /// Event-log stream: every event is retained individually. Projected as
    /// an append-history map (key -> {record id -> record}).
    EventLog,
}

/// A named stream with a declared policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Topic {
    /// Logical stream name as known to the transport.
    pub name: &'static str,
    /// Retention/projection policy.
    pub policy: TopicPolicy,
}

impl Topic {
    const fn new(name: &'static str, policy: TopicPolicy) -> Self {
        Self { name, policy }
    }
}

/// Account master data, keyed by account id. Compacted.
pub const ACCOUNTS: Topic = Topic::new("accounts", TopicPolicy::Compacted);

/// Account balances, keyed by account id. Compacted.
pub const BALANCES: Topic = Topic::new("balances", TopicPolicy::Compacted);

/// Financial transactions, keyed by transaction id.
pub const TRANSACTIONS: Topic = Topic::new("transactions", TopicPolicy::EventLog);

/// Statement entries, keyed by statement entry id.
pub const STATEMENTS: Topic = Topic::new("statements", TopicPolicy::EventLog);

/// Customer notifications, keyed by notification id.
pub const NOTIFICATIONS: Topic = Topic::new("notifications", TopicPolicy::EventLog);

/// Audit trail events, keyed by audit event id.
pub const AUDIT: Topic = Topic::new("audit", TopicPolicy::EventLog);

/// Every stream the system consumes, in subscription order.
pub const ALL: [Topic; 6] = [
    ACCOUNTS,
    BALANCES,
    TRANSACTIONS,
    STATEMENTS,
    NOTIFICATIONS,
    AUDIT,
];
