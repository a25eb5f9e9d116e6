//! In-process message queue between request handlers and background workers
//!
//! [`QueueChannel`] is the seam: producers and the
//! [`QuantityUpdateWorker`](crate::product::QuantityUpdateWorker) only see the
//! trait, so a durable broker can replace [`UnboundedQueueChannel`] without
//! touching either side.

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};
use thiserror::Error;
use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    #[error("Queue channel is closed")]
    Closed,

    #[error("Queue operation was cancelled")]
    Cancelled,
}

/// FIFO channel shared by any number of producers and consumers
#[async_trait]
pub trait QueueChannel<T: Send + 'static>: Send + Sync {
    /// Enqueue an item. Fails only once the channel is closed.
    async fn write(&self, item: T) -> Result<(), QueueError>;

    /// Wait for the next item.
    ///
    /// Returns [`QueueError::Cancelled`] when `cancel` fires first and
    /// [`QueueError::Closed`] once the channel is closed and drained. An item
    /// is never consumed by a read that reports an error.
    async fn read(&self, cancel: &CancellationToken) -> Result<T, QueueError>;

    /// Stop accepting items; pending items can still be read
    fn close(&self);

    fn is_closed(&self) -> bool;

    /// Items written but not yet read
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every subsequent item, until `cancel` fires or the channel is closed
    /// and drained. Each call starts an independent stream.
    fn read_all<'a>(&'a self, cancel: &'a CancellationToken) -> BoxStream<'a, T> {
        stream::unfold((), move |()| async move {
            self.read(cancel).await.ok().map(|item| (item, ()))
        })
        .boxed()
    }
}

/// Unbounded in-memory [`QueueChannel`] over a tokio mpsc channel.
///
/// There is no backpressure: a producer that outpaces the consumers grows
/// memory without limit, and items still queued are lost when the process
/// exits.
///
/// Closing drops the only sender, so the receiver reports the end of the
/// channel exactly when every accepted item has been read.
pub struct UnboundedQueueChannel<T> {
    sender: RwLock<Option<mpsc::UnboundedSender<T>>>,
    receiver: Mutex<mpsc::UnboundedReceiver<T>>,
    pending: AtomicUsize,
}

impl<T> UnboundedQueueChannel<T> {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            sender: RwLock::new(Some(sender)),
            receiver: Mutex::new(receiver),
            pending: AtomicUsize::new(0),
        }
    }

    fn taken(&self, item: T) -> T {
        self.pending.fetch_sub(1, Ordering::SeqCst);
        item
    }
}

impl<T> Default for UnboundedQueueChannel<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + 'static> fmt::Debug for UnboundedQueueChannel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnboundedQueueChannel")
            .field("pending", &self.pending.load(Ordering::SeqCst))
            .field("closed", &self.is_closed())
            .finish()
    }
}

#[async_trait]
impl<T: Send + 'static> QueueChannel<T> for UnboundedQueueChannel<T> {
    async fn write(&self, item: T) -> Result<(), QueueError> {
        // held across the send so `close` cannot slip in between
        let sender = self.sender.read().unwrap_or_else(PoisonError::into_inner);
        let Some(sender) = sender.as_ref() else {
            return Err(QueueError::Closed);
        };
        self.pending.fetch_add(1, Ordering::SeqCst);
        sender.send(item).map_err(|_| {
            self.pending.fetch_sub(1, Ordering::SeqCst);
            QueueError::Closed
        })
    }

    async fn read(&self, cancel: &CancellationToken) -> Result<T, QueueError> {
        let mut receiver = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(QueueError::Cancelled),
            guard = self.receiver.lock() => guard,
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(QueueError::Cancelled),
            item = receiver.recv() => item.map(|item| self.taken(item)).ok_or(QueueError::Closed),
        }
    }

    fn close(&self) {
        self.sender
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    fn is_closed(&self) -> bool {
        self.sender
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    fn len(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }
}
