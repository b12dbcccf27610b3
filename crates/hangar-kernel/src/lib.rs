//! # hangar-kernel
//!
//! Interface boundary between the Hangar auto-loader and the host module
//! runtime. The auto-loader never inspects module internals; it only
//! invokes the lifecycle operations defined here and reads live state
//! through an opaque handle, so any concrete module-loading mechanism can
//! be substituted behind [`ModuleRuntime`].

// module runtime boundary
pub mod module;
pub use module::*;
