//! A store connector whose reachability and failures tests can steer.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use craftmessage::config::StoreConfig;
use craftmessage::message::{
    adapters::memory::InMemoryMessageRepository,
    domain::{Message, MessageId, NewMessage, PlayerId},
    ports::{MessageRepository, MessageStoreError, MessageStoreResult},
    services::MessageService,
};
use craftmessage::store::{StoreConnector, StoreHandle, StoreResult, StoreSession};

/// Failure injected into the next repository call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectedFailure {
    /// The connection dropped mid-operation.
    ConnectionLost,
    /// The statement failed but the connection survived.
    Database,
}

impl InjectedFailure {
    fn to_error(self) -> MessageStoreError {
        match self {
            Self::ConnectionLost => MessageStoreError::connection_lost(std::io::Error::other(
                "terminating connection due to administrator command",
            )),
            Self::Database => MessageStoreError::database(std::io::Error::other(
                "value too long for type character varying(256)",
            )),
        }
    }
}

/// In-memory repository that fails on demand.
#[derive(Debug, Clone, Default)]
pub struct FlakyRepository {
    inner: InMemoryMessageRepository,
    next_failure: Arc<Mutex<Option<InjectedFailure>>>,
}

impl FlakyRepository {
    /// Makes the next repository call fail.
    pub fn fail_next(&self, failure: InjectedFailure) {
        *self
            .next_failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(failure);
    }

    /// Returns the number of stored messages, bypassing the store handle.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    fn check(&self) -> MessageStoreResult<()> {
        let failure = self
            .next_failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        failure.map_or(Ok(()), |kind| Err(kind.to_error()))
    }
}

#[async_trait]
impl MessageRepository for FlakyRepository {
    async fn save(&self, message: &NewMessage) -> MessageStoreResult<Message> {
        self.check()?;
        self.inner.save(message).await
    }

    async fn find_by_id(&self, id: MessageId) -> MessageStoreResult<Option<Message>> {
        self.check()?;
        self.inner.find_by_id(id).await
    }

    async fn find_by_player(&self, player_id: PlayerId) -> MessageStoreResult<Vec<Message>> {
        self.check()?;
        self.inner.find_by_player(player_id).await
    }

    async fn find_all(&self) -> MessageStoreResult<Vec<Message>> {
        self.check()?;
        self.inner.find_all().await
    }

    async fn delete_by_id(&self, id: MessageId) -> MessageStoreResult<bool> {
        self.check()?;
        self.inner.delete_by_id(id).await
    }

    async fn count(&self) -> MessageStoreResult<u64> {
        self.check()?;
        self.inner.count().await
    }
}

/// Connector over a shared [`FlakyRepository`] with switchable reachability.
#[derive(Debug, Default)]
pub struct FakeConnector {
    reachable: AtomicBool,
    probes: AtomicUsize,
    connects: AtomicUsize,
    repository: FlakyRepository,
}

impl FakeConnector {
    /// Creates a connector that starts reachable or not.
    pub fn new(reachable: bool) -> Self {
        Self {
            reachable: AtomicBool::new(reachable),
            ..Self::default()
        }
    }

    /// Switches reachability for subsequent probes.
    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    /// Number of probes performed so far.
    pub fn probes(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }

    /// Number of sessions built so far.
    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    /// The repository every session shares.
    pub fn repository(&self) -> &FlakyRepository {
        &self.repository
    }
}

#[async_trait]
impl StoreConnector for FakeConnector {
    async fn probe(&self, _config: &StoreConfig) -> bool {
        self.probes.fetch_add(1, Ordering::SeqCst);
        self.reachable.load(Ordering::SeqCst)
    }

    async fn connect(&self, _config: &StoreConfig) -> StoreResult<StoreSession> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(StoreSession::new(Arc::new(self.repository.clone())))
    }
}

/// A façade wired to a [`FakeConnector`].
pub struct Harness {
    /// The controllable connector.
    pub connector: Arc<FakeConnector>,
    /// The façade under test.
    pub service: MessageService,
}

impl Harness {
    /// Builds a harness whose store starts reachable or not.
    pub fn new(reachable: bool) -> Self {
        let connector = Arc::new(FakeConnector::new(reachable));
        let handle = StoreHandle::new(
            StoreConfig::default(),
            Arc::clone(&connector) as Arc<dyn StoreConnector>,
        );
        Self {
            connector,
            service: MessageService::new(Arc::new(handle)),
        }
    }
}

/// First test player.
pub const ALICE: &str = "11111111-1111-4111-8111-111111111111";

/// Second test player.
pub const BOB: &str = "22222222-2222-4222-8222-222222222222";

/// Parses a test player identifier.
pub fn player(raw: &str) -> PlayerId {
    PlayerId::parse(raw).expect("test player ids are valid")
}
