use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub mod error;
pub use error::ModuleError;

/// Module operation result type using the typed [`ModuleError`].
pub type ModuleResult<T> = Result<T, ModuleError>;

/// Shared, clonable handle to a live module.
pub type SharedModuleHandle = Arc<dyn ModuleHandle>;

// ============================================================================
// Module state
// ============================================================================

/// Lifecycle state of a module as reported by its handle.
///
/// The state is read live from the handle, never cached by the loader, so a
/// module that transitions on its own (crash, external stop) is always
/// observed in its current state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ModuleState {
    /// Installed into the runtime but not running.
    Installed,
    /// Running.
    Active,
    /// An activation attempt failed; the module stays installed.
    Failed,
    /// Removed from the runtime; the handle is defunct.
    Uninstalled,
}

impl fmt::Display for ModuleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ModuleState::Installed => "installed",
            ModuleState::Active => "active",
            ModuleState::Failed => "failed",
            ModuleState::Uninstalled => "uninstalled",
        };
        f.write_str(s)
    }
}

impl ModuleState {
    /// Whether the module is running.
    pub fn is_active(&self) -> bool {
        matches!(self, ModuleState::Active)
    }
}

// ============================================================================
// Module handle
// ============================================================================

/// Opaque handle to a module installed in the host runtime.
///
/// The auto-loader never inspects module internals; it reads the live
/// [`ModuleState`] and the fragment flag through this trait and passes the
/// handle back to the [`ModuleRuntime`] for lifecycle transitions.
pub trait ModuleHandle: Send + Sync {
    /// Current lifecycle state, read live from the runtime.
    fn state(&self) -> ModuleState;

    /// Whether this module is a fragment: a library-style module that
    /// attaches to a host and must never be started directly.
    fn is_fragment(&self) -> bool;

    /// Human-readable identity for logging.
    fn describe(&self) -> String {
        format!("module(fragment={}, state={})", self.is_fragment(), self.state())
    }

    /// Convert to `Any` for downcasting by runtime adapters.
    fn as_any(&self) -> &dyn Any;
}

// ============================================================================
// Module runtime
// ============================================================================

/// Host runtime adapter the auto-loader drives.
///
/// Implementations wrap a concrete module system. Each operation maps to one
/// lifecycle transition; the loader sequences them and owns the policy for
/// what happens on failure.
#[async_trait::async_trait]
pub trait ModuleRuntime: Send + Sync {
    /// Install the archive at `archive` into the runtime, returning a live
    /// handle. On error nothing is considered installed.
    async fn install(&self, archive: &Path) -> ModuleResult<SharedModuleHandle>;

    /// Start an installed module. Must not be called on fragments.
    async fn start(&self, handle: &dyn ModuleHandle) -> ModuleResult<()>;

    /// Stop an active module.
    async fn stop(&self, handle: &dyn ModuleHandle) -> ModuleResult<()>;

    /// Remove a module from the runtime. After this returns the handle is
    /// defunct regardless of success.
    async fn uninstall(&self, handle: &dyn ModuleHandle) -> ModuleResult<()>;
}

// ============================================================================
// Directory resolution
// ============================================================================

/// Resolves the directory the auto-loader watches.
///
/// Kept behind a trait so hosts can derive the directory from their own
/// configuration or data area instead of a fixed path.
pub trait DirectoryResolver: Send + Sync {
    /// Resolve the watched root. Called once at startup; an error here is
    /// fatal to startup.
    fn resolve_watched_root(&self) -> ModuleResult<PathBuf>;
}

/// The simplest resolver: a fixed directory supplied up front.
#[derive(Debug, Clone)]
pub struct FixedRoot(pub PathBuf);

impl FixedRoot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }
}

impl DirectoryResolver for FixedRoot {
    fn resolve_watched_root(&self) -> ModuleResult<PathBuf> {
        Ok(self.0.clone())
    }
}
