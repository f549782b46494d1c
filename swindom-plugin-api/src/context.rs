//! PluginContext - what the host hands a plugin at initialization

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Handle a plugin uses to tell the host its requested window-event type changed.
///
/// The host re-reads [`crate::Plugin::window_event_type`] after each
/// notification and re-targets its OS hook. Notifying is cheap and never
/// calls back into the plugin synchronously, so it is safe to call from inside
/// any plugin method.
#[derive(Clone)]
pub struct EventTypeNotifier {
    notify: Arc<dyn Fn() + Send + Sync>,
}

impl EventTypeNotifier {
    pub fn new(notify: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            notify: Arc::new(notify),
        }
    }

    /// A notifier that drops every notification
    pub fn noop() -> Self {
        Self::new(|| {})
    }

    pub fn notify(&self) {
        (self.notify)();
    }
}

impl fmt::Debug for EventTypeNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventTypeNotifier").finish_non_exhaustive()
    }
}

/// Plugin's view of the host at initialization time.
pub struct PluginContext {
    settings_dir: PathBuf,
    language: String,
}

impl PluginContext {
    pub fn new(settings_dir: impl Into<PathBuf>, language: impl Into<String>) -> Self {
        Self {
            settings_dir: settings_dir.into(),
            language: language.into(),
        }
    }

    /// Directory the plugin reads and writes its settings in
    pub fn settings_dir(&self) -> &Path {
        &self.settings_dir
    }

    /// UI language tag chosen by the parent application (e.g. `en-US`, `ja-JP`)
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Log an info message
    pub fn log_info(&self, message: &str) {
        tracing::info!(settings = %self.settings_dir.display(), "{}", message);
    }

    /// Log a warning message
    pub fn log_warn(&self, message: &str) {
        tracing::warn!(settings = %self.settings_dir.display(), "{}", message);
    }

    /// Log a debug message
    pub fn log_debug(&self, message: &str) {
        tracing::debug!(settings = %self.settings_dir.display(), "{}", message);
    }
}
