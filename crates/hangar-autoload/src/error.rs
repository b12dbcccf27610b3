//! Typed errors for the auto-loader.
//!
//! Only startup faults surface as `Err`; faults scoped to a single archive
//! are logged by the controller and never abort event processing.

use thiserror::Error;

use hangar_kernel::module::ModuleError;

use crate::watcher::WatchError;

/// Errors that can abort the auto-loader's startup.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AutoloadError {
    /// `start` was called while the loader was already running.
    #[error("Auto-loader is already running")]
    AlreadyRunning,

    /// The directory resolver could not supply a watched root.
    #[error("Failed to resolve watched root: {source}")]
    RootResolution {
        #[source]
        source: ModuleError,
    },

    /// The watch subscription could not be established.
    #[error("Failed to watch directory: {source}")]
    Watch {
        #[from]
        source: WatchError,
    },

    /// The initial directory listing failed.
    #[error("Initial scan failed: {source}")]
    InitialScan {
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            AutoloadError::AlreadyRunning.to_string(),
            "Auto-loader is already running"
        );

        let e = AutoloadError::RootResolution {
            source: ModuleError::ResolutionFailed("no data area".to_string()),
        };
        assert!(e.to_string().contains("no data area"));

        let e = AutoloadError::InitialScan {
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(e.to_string().starts_with("Initial scan failed"));
    }
}
