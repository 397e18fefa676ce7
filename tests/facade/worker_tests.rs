//! The background submission worker drains in order and closes the store.

use crate::facade::helpers::{offline, online};
use crate::test_helpers::store::{ALICE, BOB, Harness, player};
use craftmessage::message::domain::NewMessage;
use craftmessage::store::StoreState;
use craftmessage::worker::SubmissionWorker;
use rstest::rstest;

fn message(player_id: &str, text: &str) -> NewMessage {
    NewMessage::parse(player_id, text).expect("valid message")
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn worker_drains_every_queued_submission_before_shutdown(online: Harness) {
    let worker = SubmissionWorker::spawn(online.service.clone(), 16);
    let submitter = worker.submitter();

    for n in 0..10 {
        let who = if n < 5 { ALICE } else { BOB };
        assert!(submitter.submit(message(who, &format!("queued {n}"))));
    }
    drop(submitter);
    worker.shutdown().await;

    assert_eq!(online.connector.repository().len(), 10);
    assert_eq!(online.service.state(), StoreState::Uninitialized);
}

#[rstest]
#[tokio::test]
async fn worker_preserves_submission_order(online: Harness) {
    let worker = SubmissionWorker::spawn(online.service.clone(), 8);
    let submitter = worker.submitter();
    for text in ["one", "two", "three"] {
        assert!(submitter.submit(message(ALICE, text)));
    }
    drop(submitter);
    worker.shutdown().await;

    let texts: Vec<_> = online
        .service
        .list_for_player(player(ALICE))
        .await
        .into_iter()
        .map(|m| m.text().as_str().to_owned())
        .collect();
    assert_eq!(texts, vec!["three", "two", "one"]);
}

#[rstest]
#[tokio::test]
async fn full_queue_rejects_without_blocking(online: Harness) {
    let worker = SubmissionWorker::spawn(online.service.clone(), 1);
    let submitter = worker.submitter();

    // The worker task has not been polled yet on this single-threaded runtime.
    assert!(submitter.submit(message(ALICE, "fits")));
    assert!(!submitter.submit(message(ALICE, "overflow")));

    drop(submitter);
    worker.shutdown().await;
    assert_eq!(online.connector.repository().len(), 1);
}

#[rstest]
#[tokio::test]
async fn waiting_submitter_learns_the_store_is_down(offline: Harness) {
    let worker = SubmissionWorker::spawn(offline.service.clone(), 4);

    assert!(!worker.submitter().submit_and_wait(message(ALICE, "hi")).await);

    offline.connector.set_reachable(true);
    assert!(worker.submitter().submit_and_wait(message(ALICE, "hi again")).await);

    worker.shutdown().await;
}
