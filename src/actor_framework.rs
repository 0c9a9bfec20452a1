use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, instrument, warn};

use crate::clock::{Clock, SystemClock};

// =============================================================================
// 1. THE ABSTRACTION (Traits with Hooks and DTOs)
// =============================================================================

/// Trait that any stored record must implement to be managed by [`ResourceActor`].
///
/// The actor plays the part of one table of the hosted backend: it assigns ids
/// and creation timestamps, applies patches, and fans out change events.
pub trait Entity: Clone + Send + Sync + 'static {
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug;
    type CreatePayload: Send + Sync + Debug;
    type Patch: Send + Sync + Debug;

    /// Get the ID of the entity
    fn id(&self) -> &Self::Id;

    /// Construct the full record from the server-assigned id, timestamp and payload.
    ///
    /// This is the store boundary: required fields are checked here.
    fn from_create(
        id: Self::Id,
        created_at: DateTime<Utc>,
        payload: Self::CreatePayload,
    ) -> Result<Self, String>;

    /// Monotonic revision used by change-feed consumers to discard stale updates.
    fn revision(&self) -> u64 {
        0
    }

    // --- Lifecycle Hooks ---

    fn on_create(&mut self) -> Result<(), String> {
        Ok(())
    }
    fn on_update(&mut self, patch: Self::Patch) -> Result<(), String>;
    fn on_delete(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Failures of the store collaborator, opaque to the domain layer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FrameworkError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Rejected by store: {0}")]
    Rejected(String),
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped")]
    ActorDropped,
}

// =============================================================================
// 2. CHANGE FEED
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// One change-feed notification. For deletes `record` holds the removed row.
#[derive(Debug, Clone)]
pub struct ChangeEvent<T> {
    pub kind: ChangeKind,
    pub record: T,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sub_{}", self.0)
    }
}

/// Receiving end of a change-feed subscription.
///
/// Delivery is at-least-once and unordered; see [`crate::live_view::LiveCollection`]
/// for a consumer that tolerates both. A subscriber that falls more than one
/// event behind a full buffer is dropped by the store: `recv` then returns
/// `None` once the queued events are drained, and the consumer should
/// refetch and subscribe again.
#[derive(Debug)]
pub struct Subscription<T> {
    id: SubscriptionId,
    receiver: mpsc::Receiver<ChangeEvent<T>>,
}

impl<T> Subscription<T> {
    pub fn new(id: SubscriptionId, receiver: mpsc::Receiver<ChangeEvent<T>>) -> Self {
        Self { id, receiver }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Waits for the next event. `None` once the store has shut down or unsubscribed us.
    pub async fn recv(&mut self) -> Option<ChangeEvent<T>> {
        self.receiver.recv().await
    }

    /// Non-blocking variant of [`Subscription::recv`].
    pub fn try_recv(&mut self) -> Option<ChangeEvent<T>> {
        self.receiver.try_recv().ok()
    }
}

// =============================================================================
// 3. THE GENERIC MESSAGES
// =============================================================================

pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

/// Store-side handle of one subscriber.
struct Subscriber<T> {
    sender: mpsc::Sender<ChangeEvent<T>>,
    // Set while a background send for an overflowing event is parked.
    in_flight: Arc<AtomicBool>,
}

#[derive(Debug)]
pub enum ResourceRequest<T: Entity> {
    Create {
        payload: T::CreatePayload,
        respond_to: Response<T>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<T>>,
    },
    List {
        respond_to: Response<Vec<T>>,
    },
    Update {
        id: T::Id,
        patch: T::Patch,
        respond_to: Response<T>,
    },
    Delete {
        id: T::Id,
        respond_to: Response<()>,
    },
    Subscribe {
        respond_to: Response<Subscription<T>>,
    },
    Unsubscribe {
        id: SubscriptionId,
        respond_to: Response<()>,
    },
}

// =============================================================================
// 4. THE GENERIC ACTOR SERVER
// =============================================================================

pub struct ResourceActor<T: Entity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: HashMap<T::Id, T>,
    // Insertion order, so listings come back oldest first like the hosted tables.
    order: Vec<T::Id>,
    subscribers: HashMap<SubscriptionId, Subscriber<T>>,
    next_subscription: u64,
    feed_buffer: usize,
    next_id_fn: Box<dyn Fn() -> T::Id + Send + Sync>,
    clock: Arc<dyn Clock>,
}

impl<T: Entity> ResourceActor<T> {
    pub fn new(
        buffer_size: usize,
        next_id_fn: impl Fn() -> T::Id + Send + Sync + 'static,
    ) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            store: HashMap::new(),
            order: Vec::new(),
            subscribers: HashMap::new(),
            next_subscription: 1,
            feed_buffer: buffer_size,
            next_id_fn: Box::new(next_id_fn),
            clock: Arc::new(SystemClock),
        };
        let client = ResourceClient::new(sender);
        (actor, client)
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Capacity of each subscriber's change-feed channel.
    pub fn with_feed_buffer(mut self, feed_buffer: usize) -> Self {
        self.feed_buffer = feed_buffer.max(1);
        self
    }

    #[instrument(name = "resource_actor", skip(self), fields(entity = std::any::type_name::<T>()))]
    pub async fn run(mut self) {
        debug!("Resource actor starting");
        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Create { payload, respond_to } => {
                    let _ = respond_to.send(self.handle_create(payload));
                }
                ResourceRequest::Get { id, respond_to } => {
                    let _ = respond_to.send(Ok(self.store.get(&id).cloned()));
                }
                ResourceRequest::List { respond_to } => {
                    let items = self
                        .order
                        .iter()
                        .filter_map(|id| self.store.get(id).cloned())
                        .collect();
                    let _ = respond_to.send(Ok(items));
                }
                ResourceRequest::Update { id, patch, respond_to } => {
                    let _ = respond_to.send(self.handle_update(id, patch));
                }
                ResourceRequest::Delete { id, respond_to } => {
                    let _ = respond_to.send(self.handle_delete(id));
                }
                ResourceRequest::Subscribe { respond_to } => {
                    let _ = respond_to.send(Ok(self.handle_subscribe()));
                }
                ResourceRequest::Unsubscribe { id, respond_to } => {
                    // Unknown ids are fine: unsubscribe must be idempotent.
                    if self.subscribers.remove(&id).is_some() {
                        debug!(subscription = %id, "Subscriber removed");
                    }
                    let _ = respond_to.send(Ok(()));
                }
            }
        }
        debug!("Resource actor stopped");
    }

    fn handle_create(&mut self, payload: T::CreatePayload) -> Result<T, FrameworkError> {
        let id = (self.next_id_fn)();
        let mut item =
            T::from_create(id.clone(), self.clock.now(), payload).map_err(FrameworkError::Rejected)?;
        item.on_create().map_err(FrameworkError::Rejected)?;
        self.store.insert(id.clone(), item.clone());
        self.order.push(id);
        self.publish(ChangeKind::Insert, &item);
        Ok(item)
    }

    fn handle_update(&mut self, id: T::Id, patch: T::Patch) -> Result<T, FrameworkError> {
        let Some(item) = self.store.get_mut(&id) else {
            return Err(FrameworkError::NotFound(id.to_string()));
        };
        // Patch a copy so a rejected patch leaves the stored row untouched.
        let mut updated = item.clone();
        updated.on_update(patch).map_err(FrameworkError::Rejected)?;
        *item = updated.clone();
        self.publish(ChangeKind::Update, &updated);
        Ok(updated)
    }

    fn handle_delete(&mut self, id: T::Id) -> Result<(), FrameworkError> {
        let Some(item) = self.store.get(&id) else {
            return Err(FrameworkError::NotFound(id.to_string()));
        };
        item.on_delete().map_err(FrameworkError::Rejected)?;
        if let Some(removed) = self.store.remove(&id) {
            self.order.retain(|existing| existing != &id);
            self.publish(ChangeKind::Delete, &removed);
        }
        Ok(())
    }

    fn handle_subscribe(&mut self) -> Subscription<T> {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        let (sender, receiver) = mpsc::channel(self.feed_buffer);
        self.subscribers.insert(
            id,
            Subscriber {
                sender,
                in_flight: Arc::new(AtomicBool::new(false)),
            },
        );
        debug!(subscription = %id, "Subscriber added");
        Subscription::new(id, receiver)
    }

    /// Fans a change out to every subscriber without ever blocking the actor.
    ///
    /// A full buffer gets one parked background send. A subscriber that is
    /// still full while that send is parked is dropped, so at most one extra
    /// event per subscriber is ever held outside its channel.
    fn publish(&mut self, kind: ChangeKind, record: &T) {
        self.subscribers.retain(|id, subscriber| {
            let event = ChangeEvent {
                kind,
                record: record.clone(),
            };
            match subscriber.sender.try_send(event) {
                Ok(()) => true,
                Err(TrySendError::Full(_)) if subscriber.in_flight.load(Ordering::Acquire) => {
                    warn!(subscription = %id, "Subscriber lagging behind change feed, dropping it");
                    false
                }
                Err(TrySendError::Full(event)) => {
                    warn!(subscription = %id, "Change feed buffer full, delivering in background");
                    subscriber.in_flight.store(true, Ordering::Release);
                    let sender = subscriber.sender.clone();
                    let in_flight = subscriber.in_flight.clone();
                    tokio::spawn(async move {
                        let _ = sender.send(event).await;
                        in_flight.store(false, Ordering::Release);
                    });
                    true
                }
                Err(TrySendError::Closed(_)) => {
                    debug!(subscription = %id, "Dropping closed subscriber");
                    false
                }
            }
        });
    }
}

// =============================================================================
// 5. THE GENERIC CLIENT
// =============================================================================

pub struct ResourceClient<T: Entity> {
    sender: mpsc::Sender<ResourceRequest<T>>,
}

// Manual impl: a derive would require `T: Clone` on the sender's message type.
impl<T: Entity> Clone for ResourceClient<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<T: Entity> ResourceClient<T> {
    pub fn new(sender: mpsc::Sender<ResourceRequest<T>>) -> Self {
        Self { sender }
    }

    async fn request<R>(
        &self,
        build: impl FnOnce(Response<R>) -> ResourceRequest<T>,
    ) -> Result<R, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    /// Inserts a record; the store assigns id and creation time.
    pub async fn create(&self, payload: T::CreatePayload) -> Result<T, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Create { payload, respond_to })
            .await
    }

    pub async fn get(&self, id: T::Id) -> Result<Option<T>, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Get { id, respond_to })
            .await
    }

    /// All records, oldest first.
    pub async fn list(&self) -> Result<Vec<T>, FrameworkError> {
        self.request(|respond_to| ResourceRequest::List { respond_to })
            .await
    }

    pub async fn update(&self, id: T::Id, patch: T::Patch) -> Result<T, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Update { id, patch, respond_to })
            .await
    }

    pub async fn delete(&self, id: T::Id) -> Result<(), FrameworkError> {
        self.request(|respond_to| ResourceRequest::Delete { id, respond_to })
            .await
    }

    pub async fn subscribe(&self) -> Result<Subscription<T>, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Subscribe { respond_to })
            .await
    }

    /// Releases a subscription. Safe to call twice, and safe to call after the
    /// store has already shut down.
    pub async fn unsubscribe(&self, id: SubscriptionId) -> Result<(), FrameworkError> {
        match self
            .request(|respond_to| ResourceRequest::Unsubscribe { id, respond_to })
            .await
        {
            Err(FrameworkError::ActorClosed) | Err(FrameworkError::ActorDropped) => Ok(()),
            other => other,
        }
    }
}

// =============================================================================
// 6. EXAMPLE USAGE (Test)
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::test_clock;
    use std::sync::atomic::{AtomicU64, Ordering};

    #[derive(Clone, Debug, PartialEq)]
    struct Note {
        id: String,
        text: String,
        created_at: DateTime<Utc>,
        edits: u64,
    }

    #[derive(Debug)]
    struct NoteCreate {
        text: String,
    }

    #[derive(Debug)]
    struct NotePatch {
        text: String,
    }

    impl Entity for Note {
        type Id = String;
        type CreatePayload = NoteCreate;
        type Patch = NotePatch;

        fn id(&self) -> &String {
            &self.id
        }

        fn from_create(id: String, created_at: DateTime<Utc>, payload: NoteCreate) -> Result<Self, String> {
            if payload.text.is_empty() {
                return Err("text required".to_string());
            }
            Ok(Self {
                id,
                text: payload.text,
                created_at,
                edits: 0,
            })
        }

        fn revision(&self) -> u64 {
            self.edits
        }

        fn on_update(&mut self, patch: NotePatch) -> Result<(), String> {
            if patch.text.is_empty() {
                return Err("text required".to_string());
            }
            self.text = patch.text;
            self.edits += 1;
            Ok(())
        }
    }

    fn spawn_store(feed_buffer: usize) -> ResourceClient<Note> {
        let counter = Arc::new(AtomicU64::new(1));
        let next_id = move || format!("note_{}", counter.fetch_add(1, Ordering::SeqCst));
        let (actor, client) = ResourceActor::new(10, next_id);
        let actor = actor
            .with_clock(Arc::new(test_clock()))
            .with_feed_buffer(feed_buffer);
        tokio::spawn(actor.run());
        client
    }

    #[tokio::test]
    async fn test_crud_assigns_id_and_timestamp() {
        let client = spawn_store(8);

        let created = client.create(NoteCreate { text: "a".into() }).await.unwrap();
        assert_eq!(created.id, "note_1");
        assert_eq!(created.created_at, test_clock().now());

        client.create(NoteCreate { text: "b".into() }).await.unwrap();
        let listed: Vec<String> = client.list().await.unwrap().into_iter().map(|n| n.text).collect();
        assert_eq!(listed, vec!["a", "b"]);

        let updated = client.update("note_1".into(), NotePatch { text: "c".into() }).await.unwrap();
        assert_eq!(updated.text, "c");

        client.delete("note_1".into()).await.unwrap();
        assert_eq!(client.get("note_1".into()).await.unwrap(), None);
        assert_eq!(
            client.delete("note_1".into()).await,
            Err(FrameworkError::NotFound("note_1".into()))
        );
    }

    #[tokio::test]
    async fn test_rejected_patch_leaves_record_untouched() {
        let client = spawn_store(8);
        client.create(NoteCreate { text: "a".into() }).await.unwrap();

        let result = client.update("note_1".into(), NotePatch { text: String::new() }).await;
        assert!(matches!(result, Err(FrameworkError::Rejected(_))));

        let stored = client.get("note_1".into()).await.unwrap().unwrap();
        assert_eq!(stored.text, "a");
        assert_eq!(stored.edits, 0);
    }

    #[tokio::test]
    async fn test_rejected_create_is_reported() {
        let client = spawn_store(8);
        let result = client.create(NoteCreate { text: String::new() }).await;
        assert_eq!(result, Err(FrameworkError::Rejected("text required".into())));
        assert!(client.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_change_feed_sees_every_mutation() {
        let client = spawn_store(8);
        let mut sub = client.subscribe().await.unwrap();

        client.create(NoteCreate { text: "a".into() }).await.unwrap();
        client.update("note_1".into(), NotePatch { text: "b".into() }).await.unwrap();
        client.delete("note_1".into()).await.unwrap();

        let kinds: Vec<ChangeKind> = vec![
            sub.recv().await.unwrap().kind,
            sub.recv().await.unwrap().kind,
            sub.recv().await.unwrap().kind,
        ];
        assert_eq!(kinds, vec![ChangeKind::Insert, ChangeKind::Update, ChangeKind::Delete]);
    }

    #[tokio::test]
    async fn test_full_feed_does_not_block_store() {
        let client = spawn_store(1);
        let mut sub = client.subscribe().await.unwrap();

        for text in ["a", "b"] {
            client.create(NoteCreate { text: text.into() }).await.unwrap();
        }

        let mut seen = vec![
            sub.recv().await.unwrap().record.text,
            sub.recv().await.unwrap().record.text,
        ];
        seen.sort();
        assert_eq!(seen, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_stalled_subscriber_backlog_is_bounded() {
        let client = spawn_store(1);
        let mut stalled = client.subscribe().await.unwrap();
        let mut healthy = client.subscribe().await.unwrap();

        for i in 0..200 {
            client.create(NoteCreate { text: format!("n{i}") }).await.unwrap();
            // Keep the second subscriber current so only the first one lags.
            healthy.recv().await.unwrap();
        }
        assert_eq!(client.list().await.unwrap().len(), 200);

        // One buffered event plus at most one parked send, then the feed closes.
        let mut delivered = 0;
        while stalled.recv().await.is_some() {
            delivered += 1;
        }
        assert!(delivered <= 2, "stalled subscriber received {delivered} events");

        client.create(NoteCreate { text: "after".into() }).await.unwrap();
        assert_eq!(healthy.recv().await.unwrap().record.text, "after");
    }

    #[tokio::test]
    async fn test_unsubscribe_is_idempotent() {
        let client = spawn_store(8);
        let mut sub = client.subscribe().await.unwrap();

        client.unsubscribe(sub.id()).await.unwrap();
        client.unsubscribe(sub.id()).await.unwrap();

        client.create(NoteCreate { text: "a".into() }).await.unwrap();
        assert!(sub.recv().await.is_none());
    }
}
