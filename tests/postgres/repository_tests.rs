//! CRUD, ordering and pool behaviour of the Diesel message repository.

use crate::postgres::helpers::{TestDatabase, test_runtime};
use craftmessage::config::SchemaMode;
use craftmessage::message::adapters::postgres::PostgresMessageRepository;
use craftmessage::message::domain::{MessageId, NewMessage, PlayerId};
use craftmessage::message::ports::{MessageRepository, MessageStoreError};
use craftmessage::store::{PgStoreConnector, StoreConnector};
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use pg_embedded_setup_unpriv::TestCluster;
use pg_embedded_setup_unpriv::test_support::shared_test_cluster;
use rstest::rstest;
use std::time::Duration;

const ALICE: &str = "11111111-1111-4111-8111-111111111111";
const BOB: &str = "22222222-2222-4222-8222-222222222222";

fn message(player: &str, text: &str) -> NewMessage {
    NewMessage::parse(player, text).expect("valid message")
}

#[rstest]
fn save_find_list_delete_round_trip(shared_test_cluster: &'static TestCluster) {
    let db = TestDatabase::create(shared_test_cluster, "round_trip").expect("test database");
    let rt = test_runtime();

    rt.block_on(async {
        let session = PgStoreConnector::new()
            .connect(&db.config(SchemaMode::None))
            .await
            .expect("session builds");
        let repo = session.repository();

        let first = repo.save(&message(ALICE, "first")).await.expect("saved");
        let other = repo.save(&message(BOB, "other")).await.expect("saved");
        let second = repo.save(&message(ALICE, "second")).await.expect("saved");

        assert!(first.id() < other.id() && other.id() < second.id());
        assert_eq!(repo.count().await.expect("counted"), 3);
        assert_eq!(
            repo.find_by_id(second.id()).await.expect("found"),
            Some(second.clone())
        );

        let alice = PlayerId::parse(ALICE).expect("valid player");
        let mine: Vec<_> = repo
            .find_by_player(alice)
            .await
            .expect("listed")
            .into_iter()
            .map(|m| m.id())
            .collect();
        assert_eq!(mine, vec![second.id(), first.id()]);

        let all: Vec<_> = repo
            .find_all()
            .await
            .expect("listed")
            .into_iter()
            .map(|m| m.id())
            .collect();
        assert_eq!(all, vec![second.id(), other.id(), first.id()]);

        assert!(repo.delete_by_id(other.id()).await.expect("ran"));
        assert!(!repo.exists_by_id(other.id()).await.expect("ran"));
        assert_eq!(repo.count().await.expect("counted"), 2);
    });
}

#[rstest]
fn deleting_a_missing_row_changes_nothing(shared_test_cluster: &'static TestCluster) {
    let db = TestDatabase::create(shared_test_cluster, "missing_delete").expect("test database");
    let rt = test_runtime();

    rt.block_on(async {
        let session = PgStoreConnector::new()
            .connect(&db.config(SchemaMode::None))
            .await
            .expect("session builds");
        let repo = session.repository();
        let kept = repo.save(&message(ALICE, "kept")).await.expect("saved");

        assert!(!repo.delete_by_id(MessageId::new(i64::MAX)).await.expect("ran"));
        assert_eq!(repo.count().await.expect("counted"), 1);
        assert!(repo.exists_by_id(kept.id()).await.expect("ran"));

        // The rolled-back transaction leaves the pooled connection usable.
        let next = repo.save(&message(ALICE, "next")).await.expect("saved");
        assert!(next.id() > kept.id());
    });
}

#[rstest]
fn identifiers_are_not_reused_after_delete(shared_test_cluster: &'static TestCluster) {
    let db = TestDatabase::create(shared_test_cluster, "id_reuse").expect("test database");
    let rt = test_runtime();

    rt.block_on(async {
        let session = PgStoreConnector::new()
            .connect(&db.config(SchemaMode::None))
            .await
            .expect("session builds");
        let repo = session.repository();

        let first = repo.save(&message(ALICE, "gone")).await.expect("saved");
        assert!(repo.delete_by_id(first.id()).await.expect("ran"));
        let next = repo.save(&message(ALICE, "next")).await.expect("saved");

        assert!(next.id() > first.id());
    });
}

#[rstest]
fn statement_logging_leaves_queries_intact(shared_test_cluster: &'static TestCluster) {
    let db = TestDatabase::create(shared_test_cluster, "show_sql").expect("test database");
    let rt = test_runtime();
    let mut config = db.config(SchemaMode::Validate);
    config.show_sql = true;

    rt.block_on(async {
        let session = PgStoreConnector::new()
            .connect(&config)
            .await
            .expect("session builds");
        let repo = session.repository();

        let saved = repo.save(&message(BOB, "logged")).await.expect("saved");
        assert_eq!(
            repo.find_by_id(saved.id()).await.expect("found"),
            Some(saved)
        );
    });
}

#[rstest]
fn saturated_pool_is_not_connection_loss(shared_test_cluster: &'static TestCluster) {
    let db = TestDatabase::create(shared_test_cluster, "saturated").expect("test database");
    let rt = test_runtime();
    let pool = Pool::builder()
        .max_size(1)
        .connection_timeout(Duration::from_millis(500))
        .build(ConnectionManager::<PgConnection>::new(db.url()))
        .expect("pool builds");
    let repo = PostgresMessageRepository::new(pool.clone());

    let held = pool.get().expect("checkout");
    let err = rt
        .block_on(repo.count())
        .expect_err("no connection is free");
    drop(held);

    assert!(matches!(err, MessageStoreError::PoolExhausted(_)));
    assert!(!err.is_connection_lost());
}
