use crate::*;

use std::{
    sync::{Arc, Mutex, Weak},
    time::Duration,
};

use indexmap::IndexMap;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio_util::sync::CancellationToken;

/// The set of live notifications.
///
/// This is a cheap, cloneable handle; all clones refer to the same store. Every operation takes
/// the store's lock for its whole duration, which keeps id allocation and event order consistent
/// no matter how many callers there are.
///
/// Notifications with a timeout get an expiry timer, which runs as a tokio task. Those are only
/// scheduled when a tokio runtime is available, so a store used outside of one simply never
/// expires anything.
#[derive(Debug, Clone)]
pub struct NotificationStore {
    // Intentionally using std::sync::Mutex instead of tokio's async mutex, since we don't need to
    // hold the mutex across an await.
    inner: Arc<Mutex<StoreInner>>,
}

#[derive(Debug)]
struct StoreInner {
    next_id: u32,
    next_generation: u64,
    notifications: IndexMap<u32, Entry>,
    // receivers that were dropped are pruned on the next emit
    subscribers: Vec<UnboundedSender<NotificationEvent>>,
}

#[derive(Debug)]
struct Entry {
    notification: Notification,
    expiry: Option<Expiry>,
}

/// A pending expiry timer. The generation tells apart timers that were scheduled for the same id,
/// so that a timer that lost the race against an update can't close the updated notification.
#[derive(Debug)]
struct Expiry {
    generation: u64,
    token: CancellationToken,
}

impl Entry {
    fn cancel_expiry(&mut self) {
        if let Some(expiry) = self.expiry.take() {
            expiry.token.cancel();
        }
    }
}

impl Default for NotificationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationStore {
    pub fn new() -> Self {
        let inner = StoreInner { next_id: 0, next_generation: 0, notifications: IndexMap::new(), subscribers: Vec::new() };
        NotificationStore { inner: Arc::new(Mutex::new(inner)) }
    }

    /// Start receiving lifecycle events. Drop the receiver to unsubscribe.
    pub fn subscribe(&self) -> UnboundedReceiver<NotificationEvent> {
        let (send, recv) = mpsc::unbounded_channel();
        self.inner.lock().unwrap().subscribers.push(send); // unwrap: mutex poisoning is okay
        recv
    }

    /// Post a notification, returning its id.
    ///
    /// If `request.replaces_id` names a live notification, that one is updated in place: it keeps
    /// its id and position, its contents are replaced, and its expiry timer starts over.
    /// Otherwise a new notification is created with a fresh id, no matter what id was asked for.
    pub fn notify(&self, request: NotificationRequest) -> u32 {
        let mut inner = self.inner.lock().unwrap(); // unwrap: mutex poisoning is okay

        let replaces_id = request.replaces_id;
        let (id, is_update) = if inner.notifications.contains_key(&replaces_id) {
            (replaces_id, true)
        } else {
            (inner.allocate_id(), false)
        };

        let notification = Notification::from_request(id, request);
        let expiry = notification.timeout.and_then(|after| self.schedule_expiry(&mut inner, id, after));

        let snapshot = notification.clone();
        match inner.notifications.get_mut(&id) {
            Some(entry) => {
                entry.cancel_expiry();
                entry.notification = notification;
                entry.expiry = expiry;
            }
            None => {
                inner.notifications.insert(id, Entry { notification, expiry });
            }
        }

        if is_update {
            log::debug!("updated notification {} from {:?}", id, snapshot.app_name);
            inner.emit(NotificationEvent::Updated(snapshot));
        } else {
            log::debug!("new notification {} from {:?}", id, snapshot.app_name);
            inner.emit(NotificationEvent::Added(snapshot));
        }
        id
    }

    /// Close the notification with the given id. Returns `false` if there is no such notification,
    /// in which case nothing happens.
    pub fn close(&self, id: u32, reason: CloseReason) -> bool {
        let mut inner = self.inner.lock().unwrap(); // unwrap: mutex poisoning is okay
        inner.remove(id, reason)
    }

    /// Called by an expiry timer once it fires.
    fn expire(&self, id: u32, generation: u64) -> bool {
        let mut inner = self.inner.lock().unwrap(); // unwrap: mutex poisoning is okay
        let is_current = inner
            .notifications
            .get(&id)
            .and_then(|entry| entry.expiry.as_ref())
            .is_some_and(|expiry| expiry.generation == generation);
        if !is_current {
            log::debug!("stale expiry timer for notification {}", id);
            return false;
        }
        inner.remove(id, CloseReason::Expired)
    }

    fn schedule_expiry(&self, inner: &mut StoreInner, id: u32, after: Duration) -> Option<Expiry> {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            log::warn!("no async runtime available, notification {} will not expire", id);
            return None;
        };

        let generation = inner.next_generation;
        inner.next_generation += 1;

        let token = CancellationToken::new();
        let store = Arc::downgrade(&self.inner);
        let deadline = tokio::time::Instant::now() + after;
        runtime.spawn(run_expiry(store, id, generation, deadline, token.clone()));

        Some(Expiry { generation, token })
    }

    /// A snapshot of the notification with the given id, if it is live.
    pub fn get(&self, id: u32) -> Option<Notification> {
        let inner = self.inner.lock().unwrap(); // unwrap: mutex poisoning is okay
        inner.notifications.get(&id).map(|entry| entry.notification.clone())
    }

    /// Snapshots of all live notifications, oldest first.
    pub fn notifications(&self) -> Vec<Notification> {
        let inner = self.inner.lock().unwrap(); // unwrap: mutex poisoning is okay
        inner.notifications.values().map(|entry| entry.notification.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().notifications.len() // unwrap: mutex poisoning is okay
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capabilities(&self) -> &'static [&'static str] {
        &CAPABILITIES
    }

    pub fn server_information(&self) -> ServerInformation {
        SERVER_INFORMATION
    }
}

impl StoreInner {
    /// Ids count up from 1 and are never handed out twice, skipping 0 (which means "new
    /// notification" on the wire) and anything still live should the counter ever wrap around.
    fn allocate_id(&mut self) -> u32 {
        loop {
            self.next_id = self.next_id.wrapping_add(1);
            if self.next_id != 0 && !self.notifications.contains_key(&self.next_id) {
                return self.next_id;
            }
        }
    }

    fn remove(&mut self, id: u32, reason: CloseReason) -> bool {
        match self.notifications.shift_remove(&id) {
            Some(mut entry) => {
                entry.cancel_expiry();
                log::debug!("closed notification {} ({})", id, reason);
                self.emit(NotificationEvent::Closed { id, reason });
                true
            }
            None => false,
        }
    }

    fn emit(&mut self, event: NotificationEvent) {
        // a failed send means that receiver was dropped
        self.subscribers.retain(|subscriber| subscriber.send(event.clone()).is_ok());
    }
}

impl Drop for StoreInner {
    fn drop(&mut self) {
        self.notifications.values_mut().for_each(Entry::cancel_expiry);
    }
}

async fn run_expiry(
    store: Weak<Mutex<StoreInner>>,
    id: u32,
    generation: u64,
    deadline: tokio::time::Instant,
    token: CancellationToken,
) {
    tokio::select! {
        _ = token.cancelled() => {}
        _ = tokio::time::sleep_until(deadline) => {
            if let Some(inner) = store.upgrade() {
                NotificationStore { inner }.expire(id, generation);
            }
        }
    }
}
