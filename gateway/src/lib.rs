//! # Ledgerstream Gateway
//!
//! Publish gateway: the single write entry point for domain facts.
//!
//! The gateway accepts an application-level request to record a new fact,
//! fills in what the caller left absent (identifier, timestamp, default
//! status), and submits the event to the transport asynchronously. The
//! partition key comes from the record itself: account id for compacted
//! streams, the fact's own identifier for event-log streams, so per-key
//! ordering and compaction are correct by construction.
//!
//! Publishing never touches the projection store. The only path into state
//! is the ingest pipeline, so a writer observes its own write only after it
//! round-trips through the stream (eventually consistent read-after-write).
//!
//! # Delivery notification
//!
//! Submission is fire-and-forget from the caller's perspective: each publish
//! returns a [`DeliveryReceipt`] the caller can await for the transport's
//! accept/reject outcome, or drop to ignore it. Failures are never silently
//! swallowed: an unobserved failure is still logged. The gateway does not
//! retry; retry policy belongs to transport configuration.
//!
//! # Example
//!
//! ```ignore
//! let gateway = PublishGateway::new(bus, Arc::new(SystemClock));
//!
//! let (transaction, receipt) = gateway.publish_transaction(TransactionRequest {
//!     transaction_id: None,                   // assigned by the gateway
//!     source_account: "A1".into(),
//!     destination_account: "A2".into(),
//!     amount: Decimal::new(10_000, 2),
//!     kind: TransactionKind::Transfer,
//!     status: None,                           // defaults to Pending
//!     description: "rent".into(),
//!     category: "housing".into(),
//! })?;
//!
//! receipt.settled().await?;                   // or drop it
//! ```

use chrono::{DateTime, Utc};
use ledgerstream_core::environment::Clock;
use ledgerstream_core::event::{Event, SerializedEvent};
use ledgerstream_core::event_bus::{EventBus, EventBusError};
use ledgerstream_core::topic;
use ledgerstream_domain::{
    Account, AuditEvent, Balance, Notification, StatementEntry, Transaction, TransactionKind,
    TransactionStatus,
};
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::oneshot;
use uuid::Uuid;

/// Errors from the publish gateway.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// The request is not a publishable fact.
    #[error("Invalid publish request: {0}")]
    Invalid(String),

    /// The event payload could not be serialized.
    #[error("Failed to serialize event: {0}")]
    Serialization(String),

    /// The transport rejected the submission or timed out.
    #[error(transparent)]
    Delivery(#[from] EventBusError),

    /// The submission task was torn down before reporting an outcome.
    #[error("Delivery outcome was lost before it could be reported")]
    OutcomeLost,
}

/// Asynchronous delivery notification for one submitted event.
///
/// Await [`settled`](Self::settled) for the transport outcome, or drop the
/// receipt to ignore it (the submission still completes).
#[derive(Debug)]
pub struct DeliveryReceipt {
    rx: oneshot::Receiver<Result<(), GatewayError>>,
}

impl DeliveryReceipt {
    /// Wait for the transport to accept or reject the submission.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Delivery`] if the transport rejected the
    /// event, or [`GatewayError::OutcomeLost`] if the submission task was
    /// torn down first.
    pub async fn settled(self) -> Result<(), GatewayError> {
        self.rx.await.unwrap_or(Err(GatewayError::OutcomeLost))
    }
}

/// Request to record a new transaction.
///
/// Fields the caller may leave absent are `Option`s: the gateway assigns a
/// fresh identifier, stamps the current time, and defaults the status to
/// [`TransactionStatus::Pending`].
#[derive(Debug, Clone)]
pub struct TransactionRequest {
    /// Transaction identifier; assigned when `None`.
    pub transaction_id: Option<String>,
    /// Account the funds leave.
    pub source_account: String,
    /// Account the funds arrive at.
    pub destination_account: String,
    /// Transaction amount; must be positive.
    pub amount: Decimal,
    /// Kind of transaction.
    pub kind: TransactionKind,
    /// Initial status; defaults to `Pending` when `None`.
    pub status: Option<TransactionStatus>,
    /// Free-form description.
    pub description: String,
    /// Spending category.
    pub category: String,
}

/// The write entry point: validates, completes and submits domain facts.
pub struct PublishGateway {
    bus: Arc<dyn EventBus>,
    clock: Arc<dyn Clock>,
}

impl PublishGateway {
    /// Create a gateway over the given transport and clock.
    #[must_use]
    pub fn new(bus: Arc<dyn EventBus>, clock: Arc<dyn Clock>) -> Self {
        Self { bus, clock }
    }

    /// Record a new transaction on the `transactions` stream.
    ///
    /// Returns the completed transaction (with assigned identifier, status
    /// and timestamp) together with its delivery receipt.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Invalid`] for a non-positive amount or a
    /// missing account, [`GatewayError::Serialization`] if the payload
    /// cannot be encoded.
    pub fn publish_transaction(
        &self,
        request: TransactionRequest,
    ) -> Result<(Transaction, DeliveryReceipt), GatewayError> {
        if request.amount <= Decimal::ZERO {
            return Err(GatewayError::Invalid(format!(
                "amount must be positive, got {}",
                request.amount
            )));
        }
        if request.source_account.is_empty() || request.destination_account.is_empty() {
            return Err(GatewayError::Invalid(
                "source and destination accounts are required".to_string(),
            ));
        }

        let transaction = Transaction {
            transaction_id: request
                .transaction_id
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            source_account: request.source_account,
            destination_account: request.destination_account,
            amount: request.amount,
            kind: request.kind,
            status: request.status.unwrap_or(TransactionStatus::Pending),
            occurred_at: self.clock.now(),
            description: request.description,
            category: request.category,
        };

        tracing::info!(
            transaction_id = %transaction.transaction_id,
            kind = ?transaction.kind,
            amount = %transaction.amount,
            "Publishing transaction"
        );
        let receipt = self.submit(topic::TRANSACTIONS.name, &transaction)?;
        Ok((transaction, receipt))
    }

    /// Record a balance update on the compacted `balances` stream.
    ///
    /// Stamps `updated_at` with the gateway clock. The partition key is the
    /// account id, so compaction keeps the newest balance per account.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Invalid`] for a missing account id,
    /// [`GatewayError::Serialization`] if the payload cannot be encoded.
    pub fn publish_balance(
        &self,
        mut balance: Balance,
    ) -> Result<(Balance, DeliveryReceipt), GatewayError> {
        if balance.account_id.is_empty() {
            return Err(GatewayError::Invalid("account id is required".to_string()));
        }
        balance.updated_at = self.clock.now();

        tracing::info!(
            account_id = %balance.account_id,
            current = %balance.current,
            "Publishing balance"
        );
        let receipt = self.submit(topic::BALANCES.name, &balance)?;
        Ok((balance, receipt))
    }

    /// Record an account update on the compacted `accounts` stream.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Invalid`] for a missing account id,
    /// [`GatewayError::Serialization`] if the payload cannot be encoded.
    pub fn publish_account(
        &self,
        mut account: Account,
    ) -> Result<(Account, DeliveryReceipt), GatewayError> {
        if account.account_id.is_empty() {
            return Err(GatewayError::Invalid("account id is required".to_string()));
        }
        account.updated_at = self.clock.now();

        tracing::info!(account_id = %account.account_id, "Publishing account");
        let receipt = self.submit(topic::ACCOUNTS.name, &account)?;
        Ok((account, receipt))
    }

    /// Record a statement entry on the `statements` stream.
    ///
    /// Assigns an entry identifier when the caller left it empty.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Serialization`] if the payload cannot be
    /// encoded.
    pub fn publish_statement(
        &self,
        mut entry: StatementEntry,
    ) -> Result<(StatementEntry, DeliveryReceipt), GatewayError> {
        if entry.entry_id.is_empty() {
            entry.entry_id = Uuid::new_v4().to_string();
        }

        tracing::info!(entry_id = %entry.entry_id, "Publishing statement entry");
        let receipt = self.submit(topic::STATEMENTS.name, &entry)?;
        Ok((entry, receipt))
    }

    /// Record a notification on the `notifications` stream.
    ///
    /// Assigns a notification identifier when the caller left it empty;
    /// `occurred_at` is taken as given, since it describes when the
    /// triggering fact happened, not when it was published.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Serialization`] if the payload cannot be
    /// encoded.
    pub fn publish_notification(
        &self,
        mut notification: Notification,
    ) -> Result<(Notification, DeliveryReceipt), GatewayError> {
        if notification.notification_id.is_empty() {
            notification.notification_id = Uuid::new_v4().to_string();
        }

        tracing::info!(
            notification_id = %notification.notification_id,
            kind = ?notification.kind,
            "Publishing notification"
        );
        let receipt = self.submit(topic::NOTIFICATIONS.name, &notification)?;
        Ok((notification, receipt))
    }

    /// Record an audit event on the `audit` stream.
    ///
    /// Assigns an event identifier when the caller left it empty.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Serialization`] if the payload cannot be
    /// encoded.
    pub fn publish_audit(
        &self,
        mut event: AuditEvent,
    ) -> Result<(AuditEvent, DeliveryReceipt), GatewayError> {
        if event.event_id.is_empty() {
            event.event_id = Uuid::new_v4().to_string();
        }

        tracing::info!(
            event_id = %event.event_id,
            kind = ?event.kind,
            "Publishing audit event"
        );
        let receipt = self.submit(topic::AUDIT.name, &event)?;
        Ok((event, receipt))
    }

    /// The current gateway time, as stamped on published facts.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Serialize and hand the event to the transport from a spawned task,
    /// reporting the outcome through a receipt.
    fn submit<E>(&self, stream: &'static str, event: &E) -> Result<DeliveryReceipt, GatewayError>
    where
        E: Event + Serialize,
    {
        let serialized = SerializedEvent::from_event(event, None)
            .map_err(|e| GatewayError::Serialization(e.to_string()))?;

        let bus = Arc::clone(&self.bus);
        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let outcome = bus
                .publish(stream, &serialized)
                .await
                .map_err(GatewayError::from);
            if let Err(e) = &outcome {
                tracing::error!(stream, key = %serialized.key, error = %e, "Publish failed");
            }
            if tx.send(outcome).is_err() {
                // Caller dropped the receipt; the failure above is still logged.
                tracing::debug!(stream, "Delivery receipt dropped before settlement");
            }
        });

        Ok(DeliveryReceipt { rx })
    }
}
