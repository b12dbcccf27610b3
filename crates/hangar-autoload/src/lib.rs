//! # hangar-autoload
//!
//! Directory-driven module auto-loading:
//! - Initial scan and two-phase bulk load of existing archives
//! - Filesystem change notifications translated into add/restart/remove
//! - Path-to-handle registry as the single record of loaded modules
//! - Activation convergence that retries failed starts to a fixed point
//! - Deterministic background supervision with clean shutdown
//!
//! The host module runtime stays behind the `hangar-kernel` traits; this
//! crate never inspects module internals.

mod config;
mod controller;
mod convergence;
mod error;
mod manager;
mod registry;
mod watcher;

pub use config::AutoloadConfig;
pub use controller::LifecycleController;
pub use error::AutoloadError;
pub use manager::AutoloadManager;
pub use registry::PathRegistry;
pub use watcher::{ChangeEvent, ChangeStream, DirectoryWatcher, WatchError};

// Re-export the runtime boundary so hosts can depend on one crate.
pub use hangar_kernel::module::{
    DirectoryResolver, FixedRoot, ModuleError, ModuleHandle, ModuleResult, ModuleRuntime,
    ModuleState, SharedModuleHandle,
};
