//! Callback registration and a bounded in-memory event log.
//!
//! Listeners are invoked synchronously, in registration order, on the thread
//! that detected the event. The registry lock is not held while callbacks run,
//! so a callback may subscribe or unsubscribe other listeners.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

/// Handle returned by [`Listeners::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Callback<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// Ordered list of callbacks for one event type.
pub struct Listeners<E> {
    next_id: AtomicU64,
    entries: Mutex<Vec<(ListenerId, Callback<E>)>>,
}

impl<E> Default for Listeners<E> {
    fn default() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            entries: Mutex::new(Vec::new()),
        }
    }
}

impl<E> std::fmt::Debug for Listeners<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners").field("len", &self.len()).finish()
    }
}

impl<E> Listeners<E> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback.
    pub fn subscribe<F>(&self, callback: F) -> ListenerId
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.entries.lock().push((id, Arc::new(callback)));
        id
    }

    /// Remove a callback. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|(entry_id, _)| *entry_id != id);
        entries.len() != before
    }

    /// Detach every callback.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Number of registered callbacks.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether no callbacks are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Invoke every callback with `event`.
    pub fn emit(&self, event: &E) {
        let snapshot: Vec<Callback<E>> = self
            .entries
            .lock()
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();
        for callback in snapshot {
            callback(event);
        }
    }
}

impl<E> Listeners<E>
where
    E: Clone + Send + 'static,
{
    /// Deliver events through an unbounded channel instead of a callback.
    ///
    /// The subscription lives until [`Listeners::unsubscribe`] or
    /// [`Listeners::clear`]; sends to a dropped receiver are ignored.
    pub fn subscribe_channel(&self) -> (ListenerId, crossbeam_channel::Receiver<E>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        let id = self.subscribe(move |event: &E| {
            let _ = tx.send(event.clone());
        });
        (id, rx)
    }
}

/// Bounded recorder; drops the oldest event when full.
#[derive(Debug)]
pub struct EventLog<E> {
    events: Mutex<VecDeque<E>>,
    max_events: usize,
}

impl<E: Clone> EventLog<E> {
    /// Create a log holding at most `max_events`.
    pub fn new(max_events: usize) -> Self {
        Self {
            events: Mutex::new(VecDeque::with_capacity(max_events)),
            max_events,
        }
    }

    /// Append an event.
    pub fn record(&self, event: E) {
        if self.max_events == 0 {
            return;
        }
        let mut events = self.events.lock();
        if events.len() >= self.max_events {
            events.pop_front();
        }
        events.push_back(event);
    }

    /// Snapshot of stored events, oldest first.
    pub fn events(&self) -> Vec<E> {
        self.events.lock().iter().cloned().collect()
    }

    /// Number of stored events.
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<E: Clone + Send + Sync + 'static> EventLog<E> {
    /// Subscribe a shared log to `listeners`.
    pub fn attach(log: &Arc<Self>, listeners: &Listeners<E>) -> ListenerId {
        let log = Arc::clone(log);
        listeners.subscribe(move |event: &E| log.record(event.clone()))
    }
}
