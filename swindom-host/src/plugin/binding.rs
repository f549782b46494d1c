//! PluginBinding - the one live plugin instance and the library backing it

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::Path;

use libloading::Library;
use swindom_plugin_api::{EventTypeNotifier, Plugin, PluginContext, WindowEventType, WindowHandle};

use super::error::LoadError;

/// The hosted plugin.
///
/// Every call into the plugin is isolated with `catch_unwind`; a panicking
/// plugin call is logged and reported as `None`, never propagated.
pub struct PluginBinding {
    /// Dropped before `_library`
    instance: Option<Box<dyn Plugin>>,
    /// Keep the library loaded while the instance lives
    _library: Option<Library>,
}

impl PluginBinding {
    /// Initialize `instance` once, then register `notifier` for its
    /// event-type changes.
    ///
    /// On failure the instance is dropped without `destruction` and before
    /// the library is unloaded.
    pub fn bind(
        instance: Box<dyn Plugin>,
        library: Option<Library>,
        settings_dir: &Path,
        language: &str,
        notifier: EventTypeNotifier,
    ) -> Result<Self, LoadError> {
        let mut binding = Self {
            instance: Some(instance),
            _library: library,
        };
        let mut ctx = PluginContext::new(settings_dir, language);

        let Some(plugin) = binding.instance.as_mut() else {
            return Err(LoadError::NullInstance);
        };
        let initialized = catch_unwind(AssertUnwindSafe(|| plugin.initialize(&mut ctx)));
        let result = match initialized {
            Ok(Ok(())) => {
                let subscribed = catch_unwind(AssertUnwindSafe(|| {
                    plugin.subscribe_event_type_changed(notifier)
                }));
                subscribed.map_err(|_| LoadError::InitPanicked)
            }
            Ok(Err(e)) => Err(LoadError::InitFailed(e)),
            Err(_) => Err(LoadError::InitPanicked),
        };

        if let Err(e) = result {
            binding.instance = None;
            return Err(e);
        }

        tracing::debug!(language, "Plugin initialized");
        Ok(binding)
    }

    /// Whether [`PluginBinding::destroy`] already ran
    pub fn is_destroyed(&self) -> bool {
        self.instance.is_none()
    }

    pub fn show_window(&mut self) -> Option<()> {
        self.call("show_window", |plugin| plugin.show_window())
    }

    pub fn do_event_processing(
        &mut self,
        hwnd: WindowHandle,
        event_type: WindowEventType,
    ) -> Option<()> {
        self.call("do_event_processing", |plugin| {
            plugin.do_event_processing(hwnd, event_type)
        })
    }

    pub fn window_event_type(&mut self) -> Option<WindowEventType> {
        self.call("window_event_type", |plugin| plugin.window_event_type())
    }

    pub fn is_window_only_event_processing(&mut self) -> Option<bool> {
        self.call("is_window_only_event_processing", |plugin| {
            plugin.is_window_only_event_processing()
        })
    }

    /// Call `destruction` and drop the instance. Runs at most once.
    pub fn destroy(&mut self) {
        let Some(mut plugin) = self.instance.take() else {
            return;
        };
        if catch_unwind(AssertUnwindSafe(|| plugin.destruction())).is_err() {
            tracing::error!("Plugin panicked in destruction");
        }
        tracing::debug!("Plugin destroyed");
    }

    fn call<T>(&mut self, name: &str, f: impl FnOnce(&mut dyn Plugin) -> T) -> Option<T> {
        let plugin = self.instance.as_deref_mut()?;
        match catch_unwind(AssertUnwindSafe(|| f(plugin))) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::error!(call = name, "Plugin panicked");
                None
            }
        }
    }
}

impl Drop for PluginBinding {
    fn drop(&mut self) {
        // The instance may hold code from the library; destroy it first
        self.destroy();
    }
}
