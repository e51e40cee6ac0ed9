//! Per-subscriber event fan-out used for mutation observers and key listeners.
//!
//! Every subscription owns a bounded ring buffer. The hub only keeps weak
//! references, so dropping an [`EventCursor`] disconnects it.

use std::{
    collections::VecDeque,
    fmt,
    sync::{
        Arc, Weak,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
};

use parking_lot::Mutex;
use tokio::{
    sync::Notify,
    time::{Instant as TokioInstant, timeout_at},
};

/// Default per-subscriber event ring capacity.
pub(crate) const DEFAULT_EVENT_CAPACITY: usize = 4_096;

/// Predicate applied before an event enters a subscriber's buffer.
pub type EventFilter<E> = Arc<dyn Fn(&E) -> bool + Send + Sync>;

/// Sequenced entry in a subscriber buffer.
struct EventEntry<E> {
    /// Global sequence number.
    seq: u64,
    /// Payload.
    event: E,
}

/// Bounded buffer of pending events for one subscriber.
struct EventBuffer<E> {
    /// Pending events, oldest first.
    events: VecDeque<EventEntry<E>>,
    /// Events dropped because the buffer was full.
    lost_count: u64,
    /// Maximum number of pending events.
    capacity: usize,
}

impl<E> EventBuffer<E> {
    /// Create an empty buffer.
    fn new(capacity: usize) -> Self {
        Self {
            events: VecDeque::new(),
            lost_count: 0,
            capacity,
        }
    }

    /// Push an event, evicting the oldest when full.
    fn push(&mut self, seq: u64, event: E) {
        if self.events.len() == self.capacity {
            self.events.pop_front();
            self.lost_count = self.lost_count.saturating_add(1);
        }
        self.events.push_back(EventEntry { seq, event });
    }
}

/// Shared state behind one subscription.
struct StreamInner<E> {
    /// Pending events.
    buffer: Mutex<EventBuffer<E>>,
    /// Wakes a waiting cursor.
    notify: Notify,
    /// Set when the hub goes away or the subscriber disconnects.
    closed: AtomicBool,
    /// Optional admission filter.
    filter: Option<EventFilter<E>>,
}

impl<E: Clone> StreamInner<E> {
    /// Allocate a new stream.
    fn new(capacity: usize, filter: Option<EventFilter<E>>) -> Arc<Self> {
        Arc::new(Self {
            buffer: Mutex::new(EventBuffer::new(capacity)),
            notify: Notify::new(),
            closed: AtomicBool::new(false),
            filter,
        })
    }

    /// Offer an event to this stream.
    fn push(&self, seq: u64, event: &E) {
        if self.closed.load(Ordering::Acquire) {
            return;
        }
        if let Some(filter) = &self.filter
            && !filter(event)
        {
            return;
        }
        let mut buffer = self.buffer.lock();
        buffer.push(seq, event.clone());
        drop(buffer);
        self.notify.notify_waiters();
    }

    /// Pop the next pending event, if any.
    fn try_next(&self, cursor_seq: &mut u64, lost: &mut u64) -> Option<E> {
        let mut buffer = self.buffer.lock();
        *lost = buffer.lost_count;
        let entry = buffer.events.pop_front()?;
        *cursor_seq = entry.seq.saturating_add(1);
        Some(entry.event)
    }

    /// Close the stream and wake any waiter.
    fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.buffer.lock().events.clear();
        self.notify.notify_waiters();
    }

    /// True once closed.
    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

/// Cursor tracking progress through one subscription.
pub struct EventCursor<E> {
    /// Global sequence number of the next event to consume.
    pub next_index: u64,
    /// Total number of events dropped for this cursor due to overflow.
    pub lost_count: u64,
    /// Backing stream.
    stream: Arc<StreamInner<E>>,
}

impl<E: Clone> EventCursor<E> {
    /// True when the underlying stream has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.stream.is_closed()
    }

    /// Await the next event. Returns `None` once the stream is closed.
    pub async fn next(&mut self) -> Option<E> {
        loop {
            let notified = self.stream.notify.notified();
            if let Some(event) = self
                .stream
                .try_next(&mut self.next_index, &mut self.lost_count)
            {
                return Some(event);
            }
            if self.stream.is_closed() {
                return None;
            }
            notified.await;
        }
    }

    /// Await the next event until `deadline`, returning `None` on timeout or close.
    pub async fn next_until(&mut self, deadline: TokioInstant) -> Option<E> {
        timeout_at(deadline, self.next()).await.ok().flatten()
    }
}

impl<E> Drop for EventCursor<E> {
    fn drop(&mut self) {
        // Mark closed so the hub prunes it and counts it as gone immediately.
        self.stream.closed.store(true, Ordering::Release);
    }
}

impl<E> fmt::Debug for EventCursor<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventCursor")
            .field("next_index", &self.next_index)
            .field("lost_count", &self.lost_count)
            .finish_non_exhaustive()
    }
}

/// Lightweight event fan-out with per-subscriber ring buffers.
pub(crate) struct EventHub<E> {
    /// Next sequence number.
    seq: AtomicU64,
    /// Per-subscriber capacity.
    capacity: usize,
    /// Weak handles to live subscriptions.
    subscribers: Mutex<Vec<Weak<StreamInner<E>>>>,
}

impl<E: Clone> EventHub<E> {
    /// Create a new hub with the given per-subscriber capacity.
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            seq: AtomicU64::new(0),
            capacity: capacity.max(8),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Subscribe with an optional admission filter.
    pub(crate) fn subscribe(&self, filter: Option<EventFilter<E>>) -> EventCursor<E> {
        let start = self.seq.load(Ordering::SeqCst);
        let stream = StreamInner::new(self.capacity, filter);
        self.subscribers.lock().push(Arc::downgrade(&stream));
        EventCursor {
            next_index: start,
            lost_count: 0,
            stream,
        }
    }

    /// Publish an event to all subscribers.
    pub(crate) fn publish(&self, event: &E) {
        let seq = self.seq.fetch_add(1, Ordering::SeqCst);
        let mut stale = false;
        {
            let subscribers = self.subscribers.lock();
            for weak in subscribers.iter() {
                match weak.upgrade() {
                    Some(stream) if !stream.is_closed() => stream.push(seq, event),
                    _ => stale = true,
                }
            }
        }
        if stale {
            self.prune();
        }
    }

    /// Number of subscriptions that are still connected.
    pub(crate) fn live(&self) -> usize {
        self.subscribers
            .lock()
            .iter()
            .filter_map(Weak::upgrade)
            .filter(|stream| !stream.is_closed())
            .count()
    }

    /// Close every subscription.
    pub(crate) fn close_all(&self) {
        let subscribers = self.subscribers.lock();
        for weak in subscribers.iter() {
            if let Some(stream) = weak.upgrade() {
                stream.close();
            }
        }
    }

    /// Drop dead subscriptions.
    fn prune(&self) {
        self.subscribers
            .lock()
            .retain(|weak| weak.upgrade().is_some_and(|stream| !stream.is_closed()));
    }
}

impl<E> Drop for EventHub<E> {
    fn drop(&mut self) {
        let subscribers = self.subscribers.lock();
        for weak in subscribers.iter() {
            if let Some(stream) = weak.upgrade() {
                stream.closed.store(true, Ordering::Release);
                stream.notify.notify_waiters();
            }
        }
    }
}
