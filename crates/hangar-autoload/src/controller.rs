//! Lifecycle controller
//!
//! Applies directory change events to the module runtime: decides per
//! affected path whether to add, restart, or remove, and keeps the path
//! registry in step with what the runtime actually holds.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use hangar_kernel::module::ModuleRuntime;

use crate::config::AutoloadConfig;
use crate::convergence::converge;
use crate::registry::PathRegistry;
use crate::watcher::ChangeEvent;

/// Drives module lifecycle transitions from change events.
///
/// All methods take `&self`; the controller is shared between the event
/// loop and the supervisor behind an `Arc`. Event application is
/// single-consumer, so two events for the same path never race.
pub struct LifecycleController {
    runtime: Arc<dyn ModuleRuntime>,
    registry: Arc<PathRegistry>,
    config: AutoloadConfig,
}

impl LifecycleController {
    /// Create a controller over the given runtime and registry.
    pub fn new(
        runtime: Arc<dyn ModuleRuntime>,
        registry: Arc<PathRegistry>,
        config: AutoloadConfig,
    ) -> Self {
        Self {
            runtime,
            registry,
            config,
        }
    }

    /// Apply one batch of change events in delivery order.
    pub async fn apply_batch(&self, batch: Vec<ChangeEvent>) {
        for event in batch {
            self.apply(event).await;
        }
    }

    async fn apply(&self, event: ChangeEvent) {
        match event {
            ChangeEvent::Created(path) => {
                if !self.config.is_archive(&path) {
                    debug!("Ignoring non-archive entry {:?}", path);
                } else if self.registry.contains(&path).await {
                    // Duplicate create notifications show up around
                    // copy-then-rename drops; replace instead of leaking
                    // the superseded handle.
                    self.restart_module(&path).await;
                } else {
                    self.add_module(&path).await;
                }
            }
            ChangeEvent::Modified(path) => {
                if !self.config.is_archive(&path) {
                    debug!("Ignoring non-archive entry {:?}", path);
                } else if self.registry.contains(&path).await {
                    self.restart_module(&path).await;
                } else {
                    debug!("Ignoring change to unregistered path {:?}", path);
                }
            }
            ChangeEvent::Deleted(path) => {
                if self.registry.contains(&path).await {
                    self.remove_module(&path).await;
                } else {
                    debug!("Ignoring delete of unregistered path {:?}", path);
                }
            }
            ChangeEvent::Overflow => {
                warn!(
                    "Notification overflow: events were dropped, registry may \
                     lag the directory until the next change"
                );
            }
        }
    }

    /// Install the archive, register its handle, and try to activate it.
    ///
    /// An install fault leaves the path unregistered. A start fault leaves
    /// the handle registered for later convergence. Either way other events
    /// keep flowing.
    pub async fn add_module(&self, path: &Path) {
        info!("Adding module from {:?}", path);

        let handle = match self.runtime.install(path).await {
            Ok(handle) => handle,
            Err(e) => {
                error!("Failed to install {:?}: {}", path, e);
                return;
            }
        };

        self.registry.put(path.to_path_buf(), handle.clone()).await;

        if handle.is_fragment() {
            debug!("Installed fragment {:?}, leaving it unstarted", path);
        } else if let Err(e) = self.runtime.start(handle.as_ref()).await {
            warn!("Module {:?} failed to start: {}", path, e);
        }

        converge(&self.runtime, &self.registry).await;
    }

    /// Tear the module down and load it again from the (changed) archive.
    ///
    /// The old handle is discarded rather than refreshed in place: the
    /// archive content may have changed incompatibly.
    pub async fn restart_module(&self, path: &Path) {
        info!("Restarting module at {:?}", path);
        self.remove_module(path).await;
        self.add_module(path).await;
    }

    /// Unregister the path and tear its module down.
    ///
    /// Teardown is best effort: a stop or uninstall fault is logged and the
    /// registry entry stays removed.
    pub async fn remove_module(&self, path: &Path) {
        info!("Removing module at {:?}", path);

        let handle = match self.registry.remove(path).await {
            Some(handle) => handle,
            None => return,
        };

        if let Err(e) = self.runtime.stop(handle.as_ref()).await {
            warn!("Failed to stop module {:?}: {}", path, e);
        }
        if let Err(e) = self.runtime.uninstall(handle.as_ref()).await {
            warn!("Failed to uninstall module {:?}: {}", path, e);
        }
    }

    /// Initial bulk load of the watched root.
    ///
    /// Installs every archive before starting any, so modules can reference
    /// each other once all are present. Fragments are installed but never
    /// started. Only the directory listing itself can fail; per-archive
    /// faults are logged and skipped.
    pub async fn bulk_load(&self, root: &Path) -> std::io::Result<()> {
        info!("Scanning {:?} for module archives", root);

        let mut archives = Vec::new();
        for entry in std::fs::read_dir(root)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_file() && self.config.is_archive(&path) {
                archives.push(path);
            }
        }
        debug!("Found {} archive(s) in {:?}", archives.len(), root);

        for path in &archives {
            // A restarted supervisor scans over a still-populated registry.
            if self.registry.contains(path).await {
                debug!("Archive {:?} already registered, skipping install", path);
                continue;
            }
            match self.runtime.install(path).await {
                Ok(handle) => {
                    self.registry.put(path.clone(), handle).await;
                }
                Err(e) => error!("Failed to install {:?}: {}", path, e),
            }
        }

        for (path, handle) in self.registry.snapshot().await {
            if handle.is_fragment() {
                debug!("Skipping start of fragment {:?}", path);
                continue;
            }
            if handle.state().is_active() {
                continue;
            }
            if let Err(e) = self.runtime.start(handle.as_ref()).await {
                warn!("Module {:?} failed to start: {}", path, e);
            }
        }

        converge(&self.runtime, &self.registry).await;
        Ok(())
    }
}
