//! Plugin loader - opens the plugin library and creates its single instance
//!
//! A plugin library registers itself with `export_plugin!`, which emits two
//! well-known symbols. The loader never scans the library: it reads the API
//! version symbol first, then calls the factory symbol exactly once.

use std::path::Path;

use libloading::{Library, Symbol};
use swindom_plugin_api::{API_VERSION, API_VERSION_SYMBOL, CREATE_SYMBOL, EventTypeNotifier, Plugin};

use super::binding::PluginBinding;
use super::error::LoadError;
use crate::args::HostArguments;

/// Loads one plugin library per host process
pub struct PluginLoader;

impl PluginLoader {
    /// Load the plugin named by the host arguments, initialize it and register
    /// `notifier` for its event-type changes.
    pub fn load(
        args: &HostArguments,
        notifier: EventTypeNotifier,
    ) -> Result<PluginBinding, LoadError> {
        let (library, instance) = Self::open(args.plugin_path(), args.settings_dir())?;
        tracing::info!(plugin = %args.plugin_path().display(), "Plugin library loaded");

        PluginBinding::bind(
            instance,
            Some(library),
            args.settings_dir(),
            args.language(),
            notifier,
        )
    }

    /// Open the library and create the plugin instance, without initializing it.
    pub fn open(
        plugin_path: &Path,
        settings_dir: &Path,
    ) -> Result<(Library, Box<dyn Plugin>), LoadError> {
        if !plugin_path.is_file() {
            return Err(LoadError::PluginNotFound {
                path: plugin_path.to_path_buf(),
            });
        }
        if !settings_dir.is_dir() {
            return Err(LoadError::SettingsDirNotFound {
                path: settings_dir.to_path_buf(),
            });
        }

        // SAFETY: The parent application chose this library for us to host.
        // It is expected to follow the export_plugin! contract.
        let library = unsafe { Library::new(plugin_path)? };

        let found = {
            // SAFETY: Looking up a C function exported by export_plugin!.
            let api_version_fn: Symbol<extern "C" fn() -> u32> =
                unsafe { library.get(API_VERSION_SYMBOL) }
                    .map_err(|source| missing_entry_point(API_VERSION_SYMBOL, source))?;
            api_version_fn()
        };
        if found != API_VERSION {
            return Err(LoadError::ApiVersionMismatch {
                expected: API_VERSION,
                found,
            });
        }

        let raw = {
            // SAFETY: Looking up the factory exported by export_plugin!, which
            // hands out ownership of a boxed trait object as a raw pointer.
            let create_fn: Symbol<extern "C" fn() -> *mut dyn Plugin> =
                unsafe { library.get(CREATE_SYMBOL) }
                    .map_err(|source| missing_entry_point(CREATE_SYMBOL, source))?;
            create_fn()
        };
        if raw.is_null() {
            return Err(LoadError::NullInstance);
        }

        // SAFETY: The pointer came from Box::into_raw in export_plugin! and is
        // owned by nobody else.
        let instance = unsafe { Box::from_raw(raw) };

        Ok((library, instance))
    }
}

fn missing_entry_point(symbol: &[u8], source: libloading::Error) -> LoadError {
    LoadError::MissingEntryPoint {
        symbol: String::from_utf8_lossy(symbol).into_owned(),
        source,
    }
}
