//! Background consumer applying queued quantity updates

use crate::entity::StoreProvider;
use crate::product::dto::{ProductDetail, ProductUpdateQty};
use crate::product::repository::ProductRepository;
use crate::product::service::is_not_found;
use crate::queue::QueueChannel;
use anyhow::Result;
use futures::StreamExt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Idle,
    /// Waiting on the queue for the next message
    Draining,
    /// Writing one update to the store
    Applying,
    Stopped,
}

/// Per-message outcomes since the worker started
#[derive(Debug, Default)]
pub struct WorkerStats {
    applied: AtomicU64,
    not_found: AtomicU64,
    failed: AtomicU64,
}

impl WorkerStats {
    pub fn applied(&self) -> u64 {
        self.applied.load(Ordering::SeqCst)
    }

    pub fn not_found(&self) -> u64 {
        self.not_found.load(Ordering::SeqCst)
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::SeqCst)
    }

    pub fn processed(&self) -> u64 {
        self.applied() + self.not_found() + self.failed()
    }
}

/// Drains the quantity-update queue into the product store.
///
/// Each message gets its own store scope. A message that fails (missing
/// product, storage error) is logged and dropped; it is never retried and
/// never stops the loop.
pub struct QuantityUpdateWorker<P, Q> {
    provider: P,
    queue: Arc<Q>,
    stats: Arc<WorkerStats>,
    state: watch::Sender<WorkerState>,
}

impl<P, Q> QuantityUpdateWorker<P, Q>
where
    P: StoreProvider,
    Q: QueueChannel<ProductUpdateQty> + 'static,
{
    pub fn new(provider: P, queue: Arc<Q>) -> Self {
        let (state, _) = watch::channel(WorkerState::Idle);
        Self {
            provider,
            queue,
            stats: Arc::new(WorkerStats::default()),
            state,
        }
    }

    pub fn stats(&self) -> Arc<WorkerStats> {
        self.stats.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<WorkerState> {
        self.state.subscribe()
    }

    /// Process messages until `cancel` fires or the queue is closed and
    /// drained. `read_all` only ends on one of those two, so a single pass
    /// covers the worker's whole life.
    pub async fn run(&self, cancel: CancellationToken) {
        info!("Quantity update worker started");

        self.state.send_replace(WorkerState::Draining);
        let mut messages = self.queue.read_all(&cancel);
        while let Some(update) = messages.next().await {
            self.process(update).await;
        }
        drop(messages);

        if self.queue.is_closed() {
            debug!("Queue closed, worker has nothing left to drain");
        }
        self.state.send_replace(WorkerState::Stopped);
        info!(
            "Quantity update worker stopped ({} applied, {} not found, {} failed)",
            self.stats.applied(),
            self.stats.not_found(),
            self.stats.failed()
        );
    }

    /// Apply one update. Never fails; the outcome is counted and logged.
    pub async fn process(&self, update: ProductUpdateQty) {
        info!("Processing product update: {}", update.guid);
        self.state.send_replace(WorkerState::Applying);

        match self.apply(&update).await {
            Ok(product) => {
                self.stats.applied.fetch_add(1, Ordering::SeqCst);
                info!(
                    "Successfully updated quantity for product with ID: {}, updated Qty = {}",
                    product.guid, product.quantity
                );
            }
            Err(err) if is_not_found(&err) => {
                self.stats.not_found.fetch_add(1, Ordering::SeqCst);
                error!("Product not found. ID: {}", update.guid);
            }
            Err(err) => {
                self.stats.failed.fetch_add(1, Ordering::SeqCst);
                error!(
                    "An error occurred while updating quantity for product with ID {}: {:#}",
                    update.guid, err
                );
            }
        }

        self.state.send_replace(WorkerState::Draining);
    }

    async fn apply(&self, update: &ProductUpdateQty) -> Result<ProductDetail> {
        let scope = self.provider.create_scope()?;
        debug!("Applying update {} in scope {}", update.guid, scope.scope_id());
        ProductRepository::new(&scope).update_product_qty(update).await
    }

    /// Run the worker on the tokio runtime
    pub fn spawn(self: Arc<Self>, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move { self.run(cancel).await })
    }
}
