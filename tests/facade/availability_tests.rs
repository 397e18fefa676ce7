//! Degraded results, re-probe recovery, and failure classification.

use crate::facade::helpers::{offline, online};
use crate::test_helpers::store::{ALICE, Harness, InjectedFailure, player};
use craftmessage::message::domain::{MessageId, NewMessage};
use craftmessage::store::{StoreOutcome, StoreState};
use rstest::rstest;

#[rstest]
#[tokio::test]
async fn unreachable_store_degrades_every_operation(offline: Harness) {
    let service = &offline.service;

    assert!(!service.submit_message(ALICE, "hello").await);
    assert!(service.list_all().await.is_empty());
    assert!(service.list_for_player(player(ALICE)).await.is_empty());
    assert_eq!(service.count().await, 0);
    assert_eq!(service.find_message(MessageId::new(1)).await, None);
    assert!(!service.message_exists(MessageId::new(1)).await);
    assert!(!service.delete_message(MessageId::new(1)).await);
    assert!(!service.is_available().await);
}

#[rstest]
#[tokio::test]
async fn unreachable_store_reports_unavailable_outcome(offline: Harness) {
    assert_eq!(
        offline.service.fetch_count().await,
        StoreOutcome::Unavailable
    );
    assert_eq!(offline.service.state(), StoreState::Unavailable);
}

#[rstest]
#[tokio::test]
async fn failed_probe_never_builds_a_session(offline: Harness) {
    assert!(!offline.service.submit_message(ALICE, "hello").await);

    assert_eq!(offline.connector.probes(), 2, "initial probe plus one re-probe");
    assert_eq!(offline.connector.connects(), 0);
}

#[rstest]
#[tokio::test]
async fn store_recovery_is_picked_up_by_next_submission(offline: Harness) {
    let service = &offline.service;
    assert!(!service.submit_message(ALICE, "lost").await);

    offline.connector.set_reachable(true);

    assert!(service.submit_message(ALICE, "kept").await);
    assert_eq!(service.state(), StoreState::Available);
    let texts: Vec<_> = service
        .list_for_player(player(ALICE))
        .await
        .into_iter()
        .map(|m| m.text().as_str().to_owned())
        .collect();
    assert_eq!(texts, vec!["kept"]);
}

#[rstest]
#[tokio::test]
async fn connection_loss_closes_the_handle_and_next_call_reconnects(online: Harness) {
    let service = &online.service;
    assert!(service.submit_message(ALICE, "before").await);
    assert_eq!(online.connector.connects(), 1);

    online
        .connector
        .repository()
        .fail_next(InjectedFailure::ConnectionLost);
    let during = NewMessage::parse(ALICE, "during").expect("valid message");
    assert_eq!(service.save(during).await, StoreOutcome::TransientFailure);
    assert_eq!(service.state(), StoreState::Uninitialized);

    assert!(service.submit_message(ALICE, "after").await);
    assert_eq!(online.connector.connects(), 2);
    assert_eq!(service.count().await, 2);
}

#[rstest]
#[tokio::test]
async fn operation_local_failure_keeps_the_store_available(online: Harness) {
    let service = &online.service;
    assert!(service.is_available().await);

    online
        .connector
        .repository()
        .fail_next(InjectedFailure::Database);

    assert!(!service.submit_message(ALICE, "rejected").await);
    assert_eq!(service.state(), StoreState::Available);
    assert_eq!(online.connector.connects(), 1);
    assert!(service.submit_message(ALICE, "accepted").await);
}

#[rstest]
#[tokio::test]
async fn read_failures_degrade_to_empty(online: Harness) {
    let service = &online.service;
    assert!(service.submit_message(ALICE, "hello").await);

    online
        .connector
        .repository()
        .fail_next(InjectedFailure::Database);

    assert!(service.list_all().await.is_empty());
    assert_eq!(service.list_all().await.len(), 1);
}

#[rstest]
#[tokio::test]
async fn close_is_idempotent(online: Harness) {
    let service = &online.service;
    service.close().await;
    assert_eq!(service.state(), StoreState::Uninitialized);

    assert!(service.is_available().await);
    service.close().await;
    service.close().await;

    assert_eq!(service.state(), StoreState::Uninitialized);
}

#[rstest]
#[tokio::test]
async fn initialization_happens_once(online: Harness) {
    let service = &online.service;
    for _ in 0..3 {
        assert!(service.is_available().await);
    }
    assert_eq!(online.connector.probes(), 1);
    assert_eq!(online.connector.connects(), 1);
}
