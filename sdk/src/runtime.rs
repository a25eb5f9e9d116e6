use crate::config::CatalogConfig;
use crate::entity::StoreProvider;
use crate::product::{
    ProductCatalogService, ProductUpdateQty, QuantityUpdateWorker, WorkerState, WorkerStats,
};
use crate::queue::{QueueChannel, UnboundedQueueChannel};
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Queue carrying quantity updates from the service to the worker
pub type UpdateQueue = UnboundedQueueChannel<ProductUpdateQty>;

/// Command line arguments shared by catalog binaries
#[derive(Parser, Debug, Clone, Default)]
pub struct RuntimeArgs {
    /// Path to a catalog.yaml file (or a directory containing one)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug/verbose logging
    #[arg(short, long, global = true, action = clap::ArgAction::SetTrue)]
    pub debug: bool,
}

impl RuntimeArgs {
    /// Configuration from `--config`, defaults when none was given
    pub fn load_config(&self) -> Result<CatalogConfig> {
        match &self.config {
            Some(path) => CatalogConfig::load_from_path(path),
            None => Ok(CatalogConfig::default()),
        }
    }
}

/// Initialize logging based on debug flag
/// Gracefully handles cases where a global subscriber is already initialized
pub fn init_logging(debug: bool) {
    let level = if debug { "debug" } else { "info" };

    let result = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| level.into()),
        )
        .with_target(false)
        .with_thread_ids(debug)
        .with_line_number(debug)
        .with_file(debug)
        .try_init();

    if result.is_err() {
        // someone else installed a subscriber first; keep theirs
        debug!("Global tracing subscriber already set");
    }
}

/// Catalog service plus the background quantity worker, wired to one store
/// provider and one update queue
pub struct CatalogRuntime<P: StoreProvider + Clone> {
    config: CatalogConfig,
    queue: Arc<UpdateQueue>,
    service: ProductCatalogService<P, UpdateQueue>,
    worker: Arc<QuantityUpdateWorker<P, UpdateQueue>>,
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl<P: StoreProvider + Clone> CatalogRuntime<P> {
    pub fn new(provider: P, config: CatalogConfig) -> Self {
        let queue = Arc::new(UpdateQueue::new());
        let service = ProductCatalogService::new(provider.clone(), queue.clone(), &config);
        let worker = QuantityUpdateWorker::new(provider, queue.clone());

        Self {
            config,
            queue,
            service,
            worker: Arc::new(worker),
            cancel: CancellationToken::new(),
            handle: None,
        }
    }

    /// Spawn the quantity worker. Must be called from within a tokio runtime.
    pub fn start(&mut self) {
        if self.handle.is_some() {
            warn!("Catalog runtime already started");
            return;
        }
        info!("🚀 Starting catalog runtime");
        debug!("Runtime configuration: {:?}", self.config);
        self.handle = Some(self.worker.clone().spawn(self.cancel.clone()));
    }

    pub fn service(&self) -> &ProductCatalogService<P, UpdateQueue> {
        &self.service
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    pub fn worker_stats(&self) -> Arc<WorkerStats> {
        self.worker.stats()
    }

    pub fn worker_state(&self) -> watch::Receiver<WorkerState> {
        self.worker.subscribe()
    }

    /// Stop taking updates, let the worker apply what is already queued, then
    /// wait for it to exit
    pub async fn shutdown(mut self) -> Result<()> {
        info!("Shutting down catalog runtime ({} queued updates)", self.queue.len());
        self.queue.close();
        if let Some(handle) = self.handle.take() {
            handle.await?;
        }
        Ok(())
    }

    /// Stop the worker right away; queued updates are dropped
    pub async fn abort(mut self) -> Result<()> {
        let dropped = self.queue.len();
        if dropped > 0 {
            warn!("Aborting catalog runtime with {} unprocessed updates", dropped);
        }
        self.cancel.cancel();
        self.queue.close();
        if let Some(handle) = self.handle.take() {
            handle.await?;
        }
        Ok(())
    }
}

impl<P: StoreProvider + Clone> Drop for CatalogRuntime<P> {
    fn drop(&mut self) {
        // a worker left running would wait on the queue forever
        self.cancel.cancel();
    }
}
