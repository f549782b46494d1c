//! Hello Plugin - A simple example plugin for swindom
//!
//! This plugin demonstrates:
//! - Basic plugin structure with the `export_plugin!` macro
//! - Requesting window events and changing the request at runtime
//! - Window-only processing, where the host resolves top-level windows
//!
//! `ShowWindow` from the parent toggles foreground tracking on and off.
//!
//! ## Building
//!
//! ```bash
//! cargo build --release
//! ```
//!
//! ## Running
//!
//! ```bash
//! swindom-run-plugin target/release/libhello_plugin.so ~/.config/swindom/hello en-US hello-channel $PPID
//! ```

use swindom_plugin_api::{
    EventTypeNotifier, Plugin, PluginContext, PluginError, WindowEventType, WindowHandle,
    export_plugin,
};

/// Counts foreground changes while tracking is on
#[derive(Default)]
pub struct HelloPlugin {
    tracking: bool,
    foreground_changes: u64,
    last_window: Option<WindowHandle>,
    notifier: Option<EventTypeNotifier>,
}

impl Plugin for HelloPlugin {
    fn initialize(&mut self, ctx: &mut PluginContext) -> Result<(), PluginError> {
        if !ctx.settings_dir().is_dir() {
            return Err(PluginError::config(format!(
                "settings directory {} is missing",
                ctx.settings_dir().display()
            )));
        }
        self.tracking = true;
        ctx.log_info(&format!("Hello plugin loaded ({})", ctx.language()));
        Ok(())
    }

    fn show_window(&mut self) {
        self.tracking = !self.tracking;
        tracing::info!(tracking = self.tracking, "Foreground tracking toggled");
        if let Some(notifier) = &self.notifier {
            notifier.notify();
        }
    }

    fn destruction(&mut self) {
        tracing::info!(
            changes = self.foreground_changes,
            "Hello plugin shutting down"
        );
    }

    fn do_event_processing(&mut self, hwnd: WindowHandle, event_type: WindowEventType) {
        if self.last_window == Some(hwnd) {
            return;
        }
        self.last_window = Some(hwnd);
        self.foreground_changes += 1;
        tracing::info!(%hwnd, ?event_type, count = self.foreground_changes, "Foreground window changed");
    }

    fn window_event_type(&self) -> WindowEventType {
        if self.tracking {
            WindowEventType::FOREGROUND
        } else {
            WindowEventType::NONE
        }
    }

    fn is_window_only_event_processing(&self) -> bool {
        true
    }

    fn subscribe_event_type_changed(&mut self, notifier: EventTypeNotifier) {
        self.notifier = Some(notifier);
    }
}

export_plugin!(HelloPlugin);
