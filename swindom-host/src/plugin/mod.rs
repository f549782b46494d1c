//! Plugin loading and the hosted plugin binding
//!
//! The host keeps exactly one plugin per process:
//!
//! - [`PluginLoader`] opens the library and calls its factory once
//! - [`PluginBinding`] owns the instance, initializes it and guarantees
//!   `destruction` runs at most once, before the library is unloaded

mod binding;
mod error;
mod loader;

pub use binding::PluginBinding;
pub use error::LoadError;
pub use loader::PluginLoader;

#[cfg(test)]
pub(crate) use binding::tests::{Record, RecordingPlugin};
