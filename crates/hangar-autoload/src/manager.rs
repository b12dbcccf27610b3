//! Auto-load manager
//!
//! Supervises the whole pipeline: resolves the watched root, performs the
//! initial bulk load, runs the event-consumption task, and shuts it all
//! down deterministically.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::task::JoinHandle;
use tracing::{error, info};

use hangar_kernel::module::{DirectoryResolver, ModuleRuntime};

use crate::config::AutoloadConfig;
use crate::controller::LifecycleController;
use crate::error::AutoloadError;
use crate::registry::PathRegistry;
use crate::watcher::{ChangeStream, DirectoryWatcher};

/// Directory-driven module auto-loader.
///
/// `start` brings the registry in sync with the watched root and keeps it
/// that way until `stop`. Exactly one background task consumes change
/// events; all per-archive faults are contained inside it.
pub struct AutoloadManager {
    config: AutoloadConfig,
    resolver: Arc<dyn DirectoryResolver>,
    registry: Arc<PathRegistry>,
    controller: Arc<LifecycleController>,
    watcher: Option<DirectoryWatcher>,
    /// Gate for the background task, and the discriminator between a
    /// requested shutdown and an unexpected watch closure.
    running: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
}

impl AutoloadManager {
    /// Create a manager over the given runtime adapter and root resolver.
    pub fn new(
        config: AutoloadConfig,
        runtime: Arc<dyn ModuleRuntime>,
        resolver: Arc<dyn DirectoryResolver>,
    ) -> Self {
        let registry = Arc::new(PathRegistry::new());
        let controller = Arc::new(LifecycleController::new(
            runtime,
            registry.clone(),
            config.clone(),
        ));

        Self {
            config,
            resolver,
            registry,
            controller,
            watcher: None,
            running: Arc::new(AtomicBool::new(false)),
            task: None,
        }
    }

    /// The shared path registry, for external inspection.
    pub fn registry(&self) -> Arc<PathRegistry> {
        self.registry.clone()
    }

    /// Whether the background consumption task is supposed to be running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Start supervision.
    ///
    /// Resolves the root, opens the watch, bulk-loads existing archives,
    /// then spawns the event-consumption task. Any fault in these steps is
    /// fatal, returns the startup error, and leaves the manager stopped.
    pub async fn start(&mut self) -> Result<(), AutoloadError> {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(AutoloadError::AlreadyRunning);
        }

        info!("Starting module auto-loader");

        match self.try_start().await {
            Ok(()) => {
                info!("Module auto-loader started");
                Ok(())
            }
            Err(e) => {
                self.running.store(false, Ordering::SeqCst);
                if let Some(mut watcher) = self.watcher.take() {
                    watcher.close();
                }
                Err(e)
            }
        }
    }

    async fn try_start(&mut self) -> Result<(), AutoloadError> {
        let root = self
            .resolver
            .resolve_watched_root()
            .map_err(|source| AutoloadError::RootResolution { source })?;

        // Watch before scanning so archives dropped mid-scan still produce
        // events; the controller tolerates the resulting duplicates.
        let mut watcher = DirectoryWatcher::open(&root, self.config.event_capacity)?;
        let stream = watcher
            .take_event_stream()
            .expect("stream is present on a freshly opened watcher");
        self.watcher = Some(watcher);

        self.controller
            .bulk_load(&root)
            .await
            .map_err(|source| AutoloadError::InitialScan { source })?;

        self.task = Some(self.spawn_consumer(stream));
        Ok(())
    }

    fn spawn_consumer(&self, mut stream: ChangeStream) -> JoinHandle<()> {
        let controller = self.controller.clone();
        let running = self.running.clone();

        tokio::spawn(async move {
            loop {
                match stream.next().await {
                    Ok(batch) => controller.apply_batch(batch).await,
                    Err(e) => {
                        // A closed stream during a requested stop is the
                        // normal exit; anything else means the watch died
                        // under us.
                        if running.swap(false, Ordering::SeqCst) {
                            error!("Watch subscription failed while running: {}", e);
                        } else {
                            info!("Event consumption stopped");
                        }
                        return;
                    }
                }
            }
        })
    }

    /// Stop supervision.
    ///
    /// Clears the running flag, closes the watch so the blocked consumer
    /// unblocks, and waits for the task to exit. Idempotent; modules stay
    /// installed and active in the runtime.
    pub async fn stop(&mut self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }

        info!("Stopping module auto-loader");

        if let Some(mut watcher) = self.watcher.take() {
            watcher.close();
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }

        info!("Module auto-loader stopped");
    }
}
