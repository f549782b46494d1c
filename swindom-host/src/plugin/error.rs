//! Plugin load error types

use std::path::PathBuf;
use thiserror::Error;

/// Anything that prevents a working plugin binding. Always fatal for the host.
#[derive(Error, Debug)]
pub enum LoadError {
    /// Plugin library file does not exist
    #[error("Plugin file not found: {path}")]
    PluginNotFound { path: PathBuf },

    /// Settings directory does not exist
    #[error("Settings directory not found: {path}")]
    SettingsDirNotFound { path: PathBuf },

    /// Failed to load dynamic library
    #[error("Failed to load plugin library: {0}")]
    LibraryLoad(#[from] libloading::Error),

    /// The library does not export one of the plugin entry points
    #[error("Plugin entry point `{symbol}` not found: {source}")]
    MissingEntryPoint {
        symbol: String,
        source: libloading::Error,
    },

    /// API version mismatch between host and plugin
    #[error("API version mismatch: host expects {expected}, plugin has {found}")]
    ApiVersionMismatch { expected: u32, found: u32 },

    /// The factory returned a null instance
    #[error("Plugin factory returned no instance")]
    NullInstance,

    /// Plugin initialization returned an error
    #[error("Plugin initialization failed: {0}")]
    InitFailed(#[from] swindom_plugin_api::PluginError),

    /// Plugin initialization panicked
    #[error("Plugin panicked during initialization")]
    InitPanicked,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plugin_not_found_display() {
        let err = LoadError::PluginNotFound {
            path: PathBuf::from("/plugins/clock.dll"),
        };
        assert!(err.to_string().contains("/plugins/clock.dll"));
    }

    #[test]
    fn test_api_version_mismatch_display() {
        let err = LoadError::ApiVersionMismatch {
            expected: 1,
            found: 7,
        };
        let msg = err.to_string();
        assert!(msg.contains("1"));
        assert!(msg.contains("7"));
    }

    #[test]
    fn test_init_error_conversion() {
        let err: LoadError = swindom_plugin_api::PluginError::custom("no settings").into();
        assert!(matches!(err, LoadError::InitFailed(_)));
        assert!(err.to_string().contains("no settings"));
    }
}
