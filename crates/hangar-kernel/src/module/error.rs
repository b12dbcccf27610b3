//! Typed errors for module runtime operations.

use thiserror::Error;

/// Errors that can occur during module lifecycle operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ModuleError {
    /// The archive could not be installed into the runtime.
    #[error("Module install failed: {0}")]
    InstallFailed(String),

    /// The module was installed but refused to start.
    #[error("Module start failed: {0}")]
    StartFailed(String),

    /// The module could not be stopped cleanly.
    #[error("Module stop failed: {0}")]
    StopFailed(String),

    /// The module could not be removed from the runtime.
    #[error("Module uninstall failed: {0}")]
    UninstallFailed(String),

    /// The watched directory could not be resolved.
    #[error("Directory resolution failed: {0}")]
    ResolutionFailed(String),

    /// An operation was attempted while the module was in an incompatible state.
    #[error("Module not in valid state: expected {expected}, got {actual}")]
    InvalidState {
        /// The state(s) that were expected.
        expected: String,
        /// The state the module was actually in.
        actual: String,
    },

    /// An I/O error surfaced during a module operation.
    #[error("Module I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// Catch-all for runtime-specific errors that don't fit the above.
    #[error("{0}")]
    Other(String),
}
