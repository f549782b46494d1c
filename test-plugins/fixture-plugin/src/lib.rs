//! Fixture plugin for the host's loader and binary tests
//!
//! Every call is appended to `<settings dir>/calls.log`, one line per call,
//! so a test in another process can see what the host did.
//!
//! The default build registers itself with `export_plugin!`. The features
//! replace the exported symbols to break the contract:
//!
//! - `version-mismatch`: reports `API_VERSION + 1`
//! - `missing-entry-point`: exports no factory
//! - `null-instance`: the factory returns null
//! - `init-fails`: `initialize` returns an error

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use swindom_plugin_api::{
    EventTypeNotifier, Plugin, PluginContext, PluginError, WindowEventType, WindowHandle,
};

/// Name of the call log inside the settings directory
pub const CALL_LOG: &str = "calls.log";

static INSTANCES: AtomicUsize = AtomicUsize::new(0);

pub struct FixturePlugin {
    log: Option<PathBuf>,
}

impl Default for FixturePlugin {
    fn default() -> Self {
        INSTANCES.fetch_add(1, Ordering::SeqCst);
        Self { log: None }
    }
}

impl FixturePlugin {
    fn record(&self, line: &str) {
        let Some(path) = &self.log else {
            return;
        };
        if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) {
            let _ = writeln!(file, "{line}");
        }
    }
}

impl Plugin for FixturePlugin {
    fn initialize(&mut self, ctx: &mut PluginContext) -> Result<(), PluginError> {
        self.log = Some(ctx.settings_dir().join(CALL_LOG));
        self.record(&format!(
            "initialize {} instances={}",
            ctx.language(),
            INSTANCES.load(Ordering::SeqCst)
        ));
        if cfg!(feature = "init-fails") {
            return Err(PluginError::initialization("fixture refuses to start"));
        }
        Ok(())
    }

    fn show_window(&mut self) {
        self.record("show_window");
    }

    fn destruction(&mut self) {
        self.record("destruction");
    }

    fn do_event_processing(&mut self, hwnd: WindowHandle, event_type: WindowEventType) {
        self.record(&format!("event {hwnd} {event_type}"));
    }

    fn window_event_type(&self) -> WindowEventType {
        WindowEventType::FOREGROUND
    }

    fn subscribe_event_type_changed(&mut self, _notifier: EventTypeNotifier) {
        self.record("subscribe");
    }
}

#[cfg(not(any(
    feature = "version-mismatch",
    feature = "missing-entry-point",
    feature = "null-instance"
)))]
swindom_plugin_api::export_plugin!(FixturePlugin);

#[cfg(any(
    feature = "version-mismatch",
    feature = "missing-entry-point",
    feature = "null-instance"
))]
mod broken {
    use swindom_plugin_api::{API_VERSION, Plugin};

    #[unsafe(no_mangle)]
    pub extern "C" fn _swindom_plugin_api_version() -> u32 {
        if cfg!(feature = "version-mismatch") {
            API_VERSION + 1
        } else {
            API_VERSION
        }
    }

    #[cfg(not(feature = "missing-entry-point"))]
    #[unsafe(no_mangle)]
    #[allow(improper_ctypes_definitions)]
    pub extern "C" fn _swindom_plugin_create() -> *mut dyn Plugin {
        use super::FixturePlugin;

        if cfg!(feature = "null-instance") {
            return std::ptr::null_mut::<FixturePlugin>() as *mut dyn Plugin;
        }
        let plugin: Box<dyn Plugin> = Box::new(FixturePlugin::default());
        Box::into_raw(plugin)
    }
}
