//! Activation convergence
//!
//! Retries failed module activations until a full pass over the registry
//! makes no further progress.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

use hangar_kernel::module::ModuleRuntime;

use crate::registry::PathRegistry;

/// Attempt to activate every registered, non-active, non-fragment module,
/// repeating full passes until the set of failing archive paths stops
/// changing between passes.
///
/// Failure sets are keyed on archive path, never handle identity, so an
/// adapter that mints a fresh handle per attempt cannot defeat the
/// fixed-point check. With N registered paths the loop runs at most N+1
/// passes: each non-terminal pass shrinks or reshapes the failure set, and
/// the set is bounded by N.
pub(crate) async fn converge(runtime: &Arc<dyn ModuleRuntime>, registry: &PathRegistry) {
    let mut previous: HashSet<PathBuf> = HashSet::new();

    loop {
        let mut current: HashSet<PathBuf> = HashSet::new();

        for (path, handle) in registry.snapshot().await {
            if handle.is_fragment() {
                continue;
            }
            if handle.state().is_active() {
                continue;
            }

            match runtime.start(handle.as_ref()).await {
                Ok(()) => info!("Activated module {:?}", path),
                Err(e) => {
                    debug!("Module {:?} not yet startable: {}", path, e);
                    current.insert(path);
                }
            }
        }

        if current == previous {
            if !current.is_empty() {
                warn!(
                    "Activation converged with {} module(s) still inactive",
                    current.len()
                );
            }
            return;
        }

        previous = current;
    }
}
