//! End-to-end tests: publish gateway -> event bus -> ingest pipeline ->
//! query service, over the in-memory bus.
//!
//! The in-memory bus mirrors the production transport contract (retained
//! per-topic logs, replay from earliest on subscribe, at-least-once
//! redelivery), so these tests exercise the same paths production runs.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use ledgerstream_core::event::{Event, SerializedEvent};
use ledgerstream_core::event_bus::EventBus;
use ledgerstream_core::topic;
use ledgerstream_gateway::{PublishGateway, TransactionRequest};
use ledgerstream_projections::{FinancialProjections, IngestPipeline, QueryService};
use ledgerstream_testing::{InMemoryEventBus, fixtures, test_clock};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;

const CATCHUP_IDLE: Duration = Duration::from_millis(50);

async fn start_pipeline(
    bus: &Arc<InMemoryEventBus>,
) -> (Arc<FinancialProjections>, QueryService, IngestPipeline) {
    let projections = Arc::new(FinancialProjections::new());
    let query = QueryService::new(Arc::clone(&projections));
    let pipeline = IngestPipeline::start_with(
        Arc::clone(bus) as Arc<dyn EventBus>,
        Arc::clone(&projections),
        &topic::ALL,
        CATCHUP_IDLE,
    )
    .await
    .expect("pipeline start");
    (projections, query, pipeline)
}

/// Poll until the predicate holds or five seconds pass.
async fn wait_until(mut predicate: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while !predicate() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not reached within deadline"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

async fn publish<E: Event + serde::Serialize>(bus: &InMemoryEventBus, stream: &str, record: &E) {
    let event = SerializedEvent::from_event(record, None).expect("encode");
    bus.publish(stream, &event).await.expect("publish");
}

#[tokio::test]
async fn latest_balance_wins_per_account() {
    let bus = Arc::new(InMemoryEventBus::new());
    publish(&bus, topic::BALANCES.name, &fixtures::balance("A1", 10_000)).await;
    publish(&bus, topic::BALANCES.name, &fixtures::balance("A1", 15_000)).await;
    publish(&bus, topic::BALANCES.name, &fixtures::balance("A2", 7_000)).await;

    let (_, query, pipeline) = start_pipeline(&bus).await;
    wait_until(|| query.counts().balances == 2).await;

    assert_eq!(query.balance("A1").unwrap().current, Decimal::new(15_000, 2));
    assert_eq!(query.balance("A2").unwrap().current, Decimal::new(7_000, 2));
    pipeline.shutdown().await;
}

#[tokio::test]
async fn transaction_history_retains_every_record_newest_first() {
    let bus = Arc::new(InMemoryEventBus::new());
    let t1 = fixtures::transaction("t1", "A1", "A2", 1_000, 100);
    let t2 = fixtures::transaction("t2", "A2", "A1", 2_000, 200);
    publish(&bus, topic::TRANSACTIONS.name, &t1).await;
    publish(&bus, topic::TRANSACTIONS.name, &t2).await;

    let (_, query, pipeline) = start_pipeline(&bus).await;
    wait_until(|| query.counts().transactions == 2).await;

    let ids: Vec<String> = query
        .transactions_for_account("A1")
        .into_iter()
        .map(|t| t.transaction_id)
        .collect();
    assert_eq!(ids, vec!["t2", "t1"]);
    assert_eq!(query.transaction("t1").unwrap().transaction_id, "t1");
    pipeline.shutdown().await;
}

#[tokio::test]
async fn statement_notification_and_audit_streams_project_per_account() {
    let bus = Arc::new(InMemoryEventBus::new());
    publish(
        &bus,
        topic::STATEMENTS.name,
        &fixtures::statement_entry("s1", "A1", "t1", 100),
    )
    .await;
    publish(
        &bus,
        topic::STATEMENTS.name,
        &fixtures::statement_entry("s2", "A1", "t2", 200),
    )
    .await;
    publish(
        &bus,
        topic::STATEMENTS.name,
        &fixtures::statement_entry("s3", "A2", "t3", 300),
    )
    .await;
    publish(&bus, topic::NOTIFICATIONS.name, &fixtures::notification("n1", "A1", 100)).await;
    publish(&bus, topic::NOTIFICATIONS.name, &fixtures::notification("n2", "A1", 200)).await;
    publish(&bus, topic::AUDIT.name, &fixtures::audit_event("e1", "A1", 100)).await;
    publish(&bus, topic::AUDIT.name, &fixtures::audit_event("e2", "A1", 200)).await;
    publish(&bus, topic::AUDIT.name, &fixtures::audit_event("e3", "A2", 300)).await;

    let (_, query, pipeline) = start_pipeline(&bus).await;
    wait_until(|| {
        let counts = query.counts();
        counts.statements == 3 && counts.notifications == 2 && counts.audit_events == 3
    })
    .await;

    let statement_ids: Vec<String> = query
        .statements_for_account("A1")
        .into_iter()
        .map(|e| e.entry_id)
        .collect();
    assert_eq!(statement_ids, vec!["s2", "s1"]);

    let notification_ids: Vec<String> = query
        .notifications_for_account("A1")
        .into_iter()
        .map(|n| n.notification_id)
        .collect();
    assert_eq!(notification_ids, vec!["n2", "n1"]);

    let audit_ids: Vec<String> = query
        .audit_trail_for_account("A1")
        .into_iter()
        .map(|a| a.event_id)
        .collect();
    assert_eq!(audit_ids, vec!["e2", "e1"]);

    // Records for other accounts never leak into a per-account listing.
    assert!(query.statements_for_account("A3").is_empty());
    pipeline.shutdown().await;
}

#[tokio::test]
async fn transactions_by_status_filters_the_history() {
    let bus = Arc::new(InMemoryEventBus::new());
    let mut pending_old = fixtures::transaction("t1", "A1", "A2", 1_000, 100);
    pending_old.status = ledgerstream_domain::TransactionStatus::Pending;
    let completed = fixtures::transaction("t2", "A1", "A2", 2_000, 200);
    let mut pending_new = fixtures::transaction("t3", "A2", "A1", 3_000, 300);
    pending_new.status = ledgerstream_domain::TransactionStatus::Pending;
    publish(&bus, topic::TRANSACTIONS.name, &pending_old).await;
    publish(&bus, topic::TRANSACTIONS.name, &completed).await;
    publish(&bus, topic::TRANSACTIONS.name, &pending_new).await;

    let (_, query, pipeline) = start_pipeline(&bus).await;
    wait_until(|| query.counts().transactions == 3).await;

    let pending_ids: Vec<String> = query
        .transactions_by_status(ledgerstream_domain::TransactionStatus::Pending)
        .into_iter()
        .map(|t| t.transaction_id)
        .collect();
    assert_eq!(pending_ids, vec!["t3", "t1"]);

    let completed_ids: Vec<String> = query
        .transactions_by_status(ledgerstream_domain::TransactionStatus::Completed)
        .into_iter()
        .map(|t| t.transaction_id)
        .collect();
    assert_eq!(completed_ids, vec!["t2"]);
    pipeline.shutdown().await;
}

#[tokio::test]
async fn malformed_event_is_skipped_without_poisoning_the_stream() {
    let bus = Arc::new(InMemoryEventBus::new());
    let garbage = SerializedEvent::new(
        "Balance.v1".to_string(),
        "BAD".to_string(),
        vec![0xFF, 0x00],
        None,
    );
    bus.publish(topic::BALANCES.name, &garbage).await.unwrap();
    publish(&bus, topic::BALANCES.name, &fixtures::balance("A1", 5_000)).await;

    let (_, query, pipeline) = start_pipeline(&bus).await;
    wait_until(|| query.counts().balances == 1).await;

    assert!(query.balance("BAD").is_none());
    assert_eq!(query.balance("A1").unwrap().current, Decimal::new(5_000, 2));
    pipeline.shutdown().await;
}

#[tokio::test]
async fn replaying_the_same_log_rebuilds_identical_state() {
    let bus = Arc::new(InMemoryEventBus::new());
    publish(&bus, topic::BALANCES.name, &fixtures::balance("A1", 10_000)).await;
    publish(&bus, topic::BALANCES.name, &fixtures::balance("A1", 15_000)).await;
    publish(
        &bus,
        topic::TRANSACTIONS.name,
        &fixtures::transaction("t1", "A1", "A2", 1_000, 100),
    )
    .await;

    let (_, first, first_pipeline) = start_pipeline(&bus).await;
    wait_until(|| first.counts().balances == 1 && first.counts().transactions == 1).await;

    // A second consumer starting later replays the same retained log.
    let (_, second, second_pipeline) = start_pipeline(&bus).await;
    wait_until(|| second.counts().balances == 1 && second.counts().transactions == 1).await;

    assert_eq!(
        first.balance("A1").unwrap().current,
        second.balance("A1").unwrap().current
    );
    assert_eq!(
        first.transactions().len(),
        second.transactions().len()
    );
    first_pipeline.shutdown().await;
    second_pipeline.shutdown().await;
}

#[tokio::test]
async fn readiness_flips_after_the_initial_replay_drains() {
    let bus = Arc::new(InMemoryEventBus::new());
    for i in 0..20 {
        publish(
            &bus,
            topic::BALANCES.name,
            &fixtures::balance(&format!("A{i}"), 1_000),
        )
        .await;
    }

    let (_, query, pipeline) = start_pipeline(&bus).await;
    let mut gate = pipeline.readiness();

    tokio::time::timeout(Duration::from_secs(5), gate.ready())
        .await
        .expect("readiness gate never flipped");
    assert!(gate.is_ready());
    // Everything retained before startup is visible once ready.
    assert_eq!(query.counts().balances, 20);
    pipeline.shutdown().await;
}

#[tokio::test]
async fn queries_answer_from_partial_state_before_readiness() {
    let bus = Arc::new(InMemoryEventBus::new());
    publish(&bus, topic::BALANCES.name, &fixtures::balance("A1", 3_000)).await;

    let (_, query, pipeline) = start_pipeline(&bus).await;
    // No gate await here: the query surface works during replay.
    wait_until(|| query.balance("A1").is_some()).await;
    pipeline.shutdown().await;
}

#[tokio::test]
async fn shutdown_stops_consumption() {
    let bus = Arc::new(InMemoryEventBus::new());
    let (projections, query, pipeline) = start_pipeline(&bus).await;
    publish(&bus, topic::BALANCES.name, &fixtures::balance("A1", 1_000)).await;
    wait_until(|| query.counts().balances == 1).await;

    pipeline.shutdown().await;
    publish(&bus, topic::BALANCES.name, &fixtures::balance("A2", 2_000)).await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(projections.counts().balances, 1);
}

#[tokio::test]
async fn redelivered_history_records_are_not_double_counted() {
    let bus = Arc::new(InMemoryEventBus::new());
    let (_, query, pipeline) = start_pipeline(&bus).await;

    publish(
        &bus,
        topic::TRANSACTIONS.name,
        &fixtures::transaction("t1", "A1", "A2", 1_000, 100),
    )
    .await;
    wait_until(|| query.counts().transactions == 1).await;

    // At-least-once: the same retained record delivered again.
    bus.redeliver(topic::TRANSACTIONS.name, 0);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(query.counts().transactions, 1);
    pipeline.shutdown().await;
}

#[tokio::test]
async fn gateway_writes_become_queryable_through_the_pipeline() {
    let bus = Arc::new(InMemoryEventBus::new());
    let (_, query, pipeline) = start_pipeline(&bus).await;
    let gateway = PublishGateway::new(
        Arc::clone(&bus) as Arc<dyn EventBus>,
        Arc::new(test_clock()),
    );

    let (transaction, receipt) = gateway
        .publish_transaction(TransactionRequest {
            transaction_id: None,
            source_account: "A1".to_string(),
            destination_account: "A2".to_string(),
            amount: Decimal::new(25_000, 2),
            kind: ledgerstream_domain::TransactionKind::Transfer,
            status: None,
            description: "rent".to_string(),
            category: "housing".to_string(),
        })
        .expect("publish");
    receipt.settled().await.expect("delivery");

    // Read-after-write is eventual: the fact arrives via the stream.
    wait_until(|| query.transaction(&transaction.transaction_id).is_some()).await;
    let projected = query.transaction(&transaction.transaction_id).unwrap();
    assert_eq!(projected.amount, Decimal::new(25_000, 2));
    assert_eq!(
        projected.status,
        ledgerstream_domain::TransactionStatus::Pending
    );
    pipeline.shutdown().await;
}
