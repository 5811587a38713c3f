//! # Event Queue Module
//!
//! Change events and the bounded queue that carries them from the update path
//! to any number of consumers.
//!
//! ## Full-Queue Policy
//!
//! The queue drops the **newest** event when it is full. The update path never
//! blocks on a slow consumer; dropped events are counted and logged.
//!
//! ## Reading
//!
//! Every [`EventReceiver`] drains the same queue, so each event is delivered to
//! exactly one consumer. Three read modes are available:
//!
//! - [`EventReceiver::try_next`]: non-blocking, for polling consumers
//! - [`EventReceiver::next_blocking`] / [`EventReceiver::next_timeout`]: block the thread
//! - [`EventReceiver::next_async`]: awaitable, for async consumers
//!
//! ```
//! use switch_pro_controller::controller::event::EventQueue;
//!
//! let queue = EventQueue::new(8);
//! let events = queue.receiver();
//! assert!(events.try_next().is_none());
//! ```

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError, TrySendError};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tracing::warn;

use super::button::Button;
use super::stick::Stick;

/// Default number of events buffered before new ones are dropped.
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// One observed change of exactly one stick or one button.
///
/// Carries a copy of the entity as it was right after the change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    Stick(Stick),
    Button(Button),
}

/// State shared between the queue and its receivers for async wake-ups.
#[derive(Debug, Default)]
struct Signal {
    notify: Notify,
    closed: AtomicBool,
}

/// Bounded, drop-newest event queue. Owned by the controller.
#[derive(Debug)]
pub struct EventQueue {
    sender: Sender<Event>,
    receiver: Receiver<Event>,
    signal: Arc<Signal>,
    dropped: AtomicU64,
}

impl EventQueue {
    /// Creates a queue holding at most `capacity` events (minimum 1).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = crossbeam_channel::bounded(capacity.max(1));
        Self {
            sender,
            receiver,
            signal: Arc::new(Signal::default()),
            dropped: AtomicU64::new(0),
        }
    }

    /// Appends an event without blocking.
    ///
    /// # Returns
    ///
    /// `false` if the queue was full and the event was dropped.
    pub fn push(&self, event: Event) -> bool {
        match self.sender.try_send(event) {
            Ok(()) => {
                self.signal.notify.notify_waiters();
                true
            }
            Err(TrySendError::Full(event)) => {
                let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                warn!(?event, dropped, "Event queue full, dropping event");
                false
            }
            // The queue keeps its own receiver, so it cannot disconnect
            Err(TrySendError::Disconnected(_)) => false,
        }
    }

    /// Creates a new handle for draining the queue.
    #[must_use]
    pub fn receiver(&self) -> EventReceiver {
        EventReceiver {
            receiver: self.receiver.clone(),
            signal: Arc::clone(&self.signal),
        }
    }

    /// Number of events currently buffered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    /// Maximum number of buffered events.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.receiver.capacity().unwrap_or(DEFAULT_QUEUE_CAPACITY)
    }

    /// Total number of events dropped because the queue was full.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new(DEFAULT_QUEUE_CAPACITY)
    }
}

impl Drop for EventQueue {
    fn drop(&mut self) {
        self.signal.closed.store(true, Ordering::Release);
        self.signal.notify.notify_waiters();
    }
}

/// Consumer handle for an [`EventQueue`]. Clone it to add consumers.
#[derive(Debug, Clone)]
pub struct EventReceiver {
    receiver: Receiver<Event>,
    signal: Arc<Signal>,
}

impl EventReceiver {
    /// Takes the next event if one is available.
    #[must_use]
    pub fn try_next(&self) -> Option<Event> {
        self.receiver.try_recv().ok()
    }

    /// Blocks until an event is available.
    ///
    /// Returns `None` once the queue has been dropped and drained.
    pub fn next_blocking(&self) -> Option<Event> {
        loop {
            match self.next_timeout(Duration::from_millis(100)) {
                Some(event) => return Some(event),
                None if self.is_closed() => return self.try_next(),
                None => continue,
            }
        }
    }

    /// Blocks until an event is available or `timeout` elapses.
    pub fn next_timeout(&self, timeout: Duration) -> Option<Event> {
        match self.receiver.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Waits for the next event without blocking the thread.
    ///
    /// Returns `None` once the queue has been dropped and drained. Cancelling
    /// the future never loses an event.
    pub async fn next_async(&self) -> Option<Event> {
        loop {
            let notified = self.signal.notify.notified();
            tokio::pin!(notified);
            // Register before checking so a push in between still wakes us
            notified.as_mut().enable();

            match self.receiver.try_recv() {
                Ok(event) => return Some(event),
                Err(TryRecvError::Disconnected) => return None,
                Err(TryRecvError::Empty) if self.is_closed() => return None,
                Err(TryRecvError::Empty) => {}
            }

            notified.await;
        }
    }

    /// Whether the owning queue has been dropped.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.signal.closed.load(Ordering::Acquire)
    }
}
