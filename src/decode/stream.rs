//! Bounded streaming collection shared by producers and a consumer.
//!
//! A [`Stream`] blocks its consumer while it is empty and still open, and a
//! [`Publisher`] blocks while the buffer is full. The stream ends once every
//! publisher has been dropped.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender, TryRecvError};
use std::time::Duration;

/// Create a bounded stream holding at most `capacity` undelivered items.
pub fn bounded<T>(capacity: usize) -> (Publisher<T>, Stream<T>) {
    let capacity = capacity.max(1);
    let (tx, rx) = mpsc::sync_channel(capacity);
    (Publisher { tx }, Stream { rx, capacity })
}

/// Producer half; clone one per task.
#[derive(Debug)]
pub struct Publisher<T> {
    tx: SyncSender<T>,
}

impl<T> Clone for Publisher<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<T> Publisher<T> {
    /// Push an item, blocking while the buffer is full.
    ///
    /// Returns `false` once the consumer has gone away.
    pub fn publish(&self, item: T) -> bool {
        self.tx.send(item).is_ok()
    }
}

/// Consumer half, iterated in arrival order.
#[derive(Debug)]
pub struct Stream<T> {
    rx: Receiver<T>,
    capacity: usize,
}

impl<T> Stream<T> {
    /// Block until the next item arrives; `None` at end of stream.
    pub fn next_item(&self) -> Option<T> {
        self.rx.recv().ok()
    }

    /// Take an item if one is ready.
    pub fn try_next(&self) -> Poll<T> {
        match self.rx.try_recv() {
            Ok(item) => Poll::Ready(item),
            Err(TryRecvError::Empty) => Poll::Pending,
            Err(TryRecvError::Disconnected) => Poll::Done,
        }
    }

    /// Wait up to `timeout` for the next item.
    pub fn next_timeout(&self, timeout: Duration) -> Poll<T> {
        match self.rx.recv_timeout(timeout) {
            Ok(item) => Poll::Ready(item),
            Err(RecvTimeoutError::Timeout) => Poll::Pending,
            Err(RecvTimeoutError::Disconnected) => Poll::Done,
        }
    }

    /// Blocking iterator over the remaining items.
    pub fn iter(&self) -> mpsc::Iter<'_, T> {
        self.rx.iter()
    }

    /// Buffer size producers block at.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<T> Iterator for Stream<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.next_item()
    }
}

/// Outcome of a non-blocking or timed receive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Poll<T> {
    /// An item was received
    Ready(T),
    /// Nothing yet, but producers are still running
    Pending,
    /// All producers are gone and the buffer is drained
    Done,
}
