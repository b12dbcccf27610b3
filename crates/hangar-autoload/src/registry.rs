//! Path registry
//!
//! Maps archive paths to live module handles. This is the single source of
//! truth for which archives the loader currently considers installed.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use hangar_kernel::module::SharedModuleHandle;

/// Registry of archive path to module handle associations.
///
/// All accessors take `&self`; the registry is shared across the event loop
/// and the public inspection API behind an `Arc`.
pub struct PathRegistry {
    entries: Arc<RwLock<HashMap<PathBuf, SharedModuleHandle>>>,
}

impl PathRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Associate a path with a handle, returning the previous handle if the
    /// path was already registered.
    pub async fn put(
        &self,
        path: PathBuf,
        handle: SharedModuleHandle,
    ) -> Option<SharedModuleHandle> {
        debug!("Registering module path: {:?}", path);
        let mut entries = self.entries.write().await;
        entries.insert(path, handle)
    }

    /// Remove a path, returning the handle it mapped to if any.
    pub async fn remove(&self, path: &Path) -> Option<SharedModuleHandle> {
        debug!("Unregistering module path: {:?}", path);
        let mut entries = self.entries.write().await;
        entries.remove(path)
    }

    /// Get the handle for a path.
    pub async fn get(&self, path: &Path) -> Option<SharedModuleHandle> {
        let entries = self.entries.read().await;
        entries.get(path).cloned()
    }

    /// Check whether a path is registered.
    pub async fn contains(&self, path: &Path) -> bool {
        let entries = self.entries.read().await;
        entries.contains_key(path)
    }

    /// Snapshot of all current entries.
    ///
    /// The snapshot is a point-in-time copy; iteration never holds the
    /// registry lock, so handles observed here may be removed concurrently.
    pub async fn snapshot(&self) -> Vec<(PathBuf, SharedModuleHandle)> {
        let entries = self.entries.read().await;
        entries
            .iter()
            .map(|(p, h)| (p.clone(), h.clone()))
            .collect()
    }

    /// Number of registered paths.
    pub async fn len(&self) -> usize {
        let entries = self.entries.read().await;
        entries.len()
    }

    /// Whether the registry is empty.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for PathRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hangar_kernel::module::{ModuleHandle, ModuleState};
    use std::any::Any;

    struct FakeHandle;

    impl ModuleHandle for FakeHandle {
        fn state(&self) -> ModuleState {
            ModuleState::Active
        }

        fn is_fragment(&self) -> bool {
            false
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    fn handle() -> SharedModuleHandle {
        Arc::new(FakeHandle)
    }

    #[tokio::test]
    async fn test_put_get_remove() {
        let registry = PathRegistry::new();
        let path = PathBuf::from("/deploy/a.jar");

        assert!(registry.get(&path).await.is_none());
        assert!(registry.put(path.clone(), handle()).await.is_none());
        assert!(registry.contains(&path).await);
        assert!(registry.get(&path).await.is_some());
        assert_eq!(registry.len().await, 1);

        assert!(registry.remove(&path).await.is_some());
        assert!(!registry.contains(&path).await);
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_put_replaces_and_returns_previous() {
        let registry = PathRegistry::new();
        let path = PathBuf::from("/deploy/a.jar");

        let first = handle();
        registry.put(path.clone(), first.clone()).await;

        let previous = registry.put(path.clone(), handle()).await;
        assert!(previous.is_some());
        assert!(Arc::ptr_eq(&previous.unwrap(), &first));
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_remove_unknown_path_is_none() {
        let registry = PathRegistry::new();
        assert!(registry.remove(Path::new("/deploy/ghost.jar")).await.is_none());
    }

    #[tokio::test]
    async fn test_snapshot_is_a_copy() {
        let registry = PathRegistry::new();
        registry.put(PathBuf::from("/deploy/a.jar"), handle()).await;
        registry.put(PathBuf::from("/deploy/b.jar"), handle()).await;

        let snapshot = registry.snapshot().await;
        assert_eq!(snapshot.len(), 2);

        // Mutating after the snapshot must not affect it.
        registry.remove(Path::new("/deploy/a.jar")).await;
        assert_eq!(snapshot.len(), 2);
        assert_eq!(registry.len().await, 1);
    }
}
