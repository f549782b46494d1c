//! swindom-plugin-api - Plugin API for swindom-run-plugin
//!
//! A plugin is a native Rust dynamic library hosted alone in its own
//! `swindom-run-plugin` process. The host initializes it, forwards the
//! window events it asks for, and shows its window when the parent
//! application says so.
//!
//! # Example
//!
//! ```ignore
//! use swindom_plugin_api::{
//!     export_plugin, EventTypeNotifier, Plugin, PluginContext, PluginError, WindowEventType,
//!     WindowHandle,
//! };
//!
//! #[derive(Default)]
//! pub struct MyPlugin {
//!     notifier: Option<EventTypeNotifier>,
//! }
//!
//! impl Plugin for MyPlugin {
//!     fn initialize(&mut self, ctx: &mut PluginContext) -> Result<(), PluginError> {
//!         ctx.log_info("Plugin loaded!");
//!         Ok(())
//!     }
//!
//!     fn show_window(&mut self) {}
//!
//!     fn destruction(&mut self) {}
//!
//!     fn do_event_processing(&mut self, hwnd: WindowHandle, event_type: WindowEventType) {
//!         tracing::info!(%hwnd, ?event_type, "window event");
//!     }
//!
//!     fn window_event_type(&self) -> WindowEventType {
//!         WindowEventType::FOREGROUND
//!     }
//! }
//!
//! export_plugin!(MyPlugin);
//! ```

pub mod context;
pub mod error;
pub mod types;

pub use context::{EventTypeNotifier, PluginContext};
pub use error::PluginError;
pub use types::*;

/// Current plugin API version. Plugins must match this exactly.
/// This is checked when loading plugins to ensure compatibility.
pub const API_VERSION: u32 = 1;

/// Symbol of the factory generated by [`export_plugin!`]
pub const CREATE_SYMBOL: &[u8] = b"_swindom_plugin_create";

/// Symbol of the API version query generated by [`export_plugin!`]
pub const API_VERSION_SYMBOL: &[u8] = b"_swindom_plugin_api_version";

/// The plugin capability interface.
///
/// The host calls every method from a single thread, one call at a time, so
/// implementations need no internal locking against the host.
pub trait Plugin: Send {
    /// Called exactly once, right after the plugin is created.
    fn initialize(&mut self, ctx: &mut PluginContext) -> Result<(), PluginError>;

    /// Show the plugin's window. Sent by the parent application.
    fn show_window(&mut self);

    /// Release everything the plugin holds. Called exactly once before unload.
    fn destruction(&mut self);

    /// Handle one window event of a category requested by [`Plugin::window_event_type`].
    ///
    /// `hwnd` is the top-level ancestor window when
    /// [`Plugin::is_window_only_event_processing`] is true, and the raw
    /// reported window otherwise.
    fn do_event_processing(&mut self, hwnd: WindowHandle, event_type: WindowEventType);

    /// Window-event categories this plugin currently wants
    fn window_event_type(&self) -> WindowEventType {
        WindowEventType::NONE
    }

    /// Only receive events for windows that are currently visible
    fn is_window_only_event_processing(&self) -> bool {
        false
    }

    /// Called once after [`Plugin::initialize`]. Keep the notifier and call
    /// [`EventTypeNotifier::notify`] whenever `window_event_type` changes.
    fn subscribe_event_type_changed(&mut self, _notifier: EventTypeNotifier) {}
}

/// Export a plugin type for dynamic loading.
///
/// Generates the C ABI entry points the host looks up by name. A library can
/// export only one plugin; a second invocation fails to link.
///
/// # Usage
///
/// ```ignore
/// swindom_plugin_api::export_plugin!(MyPlugin);
/// ```
///
/// # Generated Functions
///
/// - `_swindom_plugin_create()`: Creates the plugin instance
/// - `_swindom_plugin_api_version()`: Returns the API version
#[macro_export]
macro_rules! export_plugin {
    ($plugin_type:ty) => {
        #[unsafe(no_mangle)]
        #[allow(improper_ctypes_definitions)]
        pub extern "C" fn _swindom_plugin_create() -> *mut dyn $crate::Plugin {
            let plugin: Box<dyn $crate::Plugin> = Box::new(<$plugin_type>::default());
            Box::into_raw(plugin)
        }

        #[unsafe(no_mangle)]
        pub extern "C" fn _swindom_plugin_api_version() -> u32 {
            $crate::API_VERSION
        }
    };
}
