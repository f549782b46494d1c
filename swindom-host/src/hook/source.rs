//! OS window-event source abstraction

use std::sync::Arc;

use swindom_plugin_api::{WindowEventType, WindowHandle};
use thiserror::Error;

/// One firing of an OS window-event hook
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowEvent {
    /// Window the OS reported
    pub hwnd: WindowHandle,
    /// The single category this firing belongs to
    pub event_type: WindowEventType,
}

/// Callback the event source invokes for each firing, on whatever thread the
/// OS delivers it.
pub type WindowEventSink = Arc<dyn Fn(WindowEvent) + Send + Sync>;

#[derive(Error, Debug)]
pub enum HookError {
    #[error("Failed to create hook subscription: {0}")]
    Subscribe(String),

    #[error("Failed to hook {category}: {reason}")]
    Hook {
        category: WindowEventType,
        reason: String,
    },

    #[error("Failed to resolve window {hwnd}: {reason}")]
    Resolve { hwnd: WindowHandle, reason: String },
}

/// A live OS hook. Dropping it unhooks and detaches the callback.
pub trait HookSubscription: Send {
    fn hook(&mut self, category: WindowEventType) -> Result<(), HookError>;

    fn unhook(&mut self);
}

/// Provider of OS window events and window queries
pub trait WindowEventSource: Send {
    /// Create a subscription that reports firings to `sink`. Nothing is hooked yet.
    fn create_subscription(
        &mut self,
        sink: WindowEventSink,
    ) -> Result<Box<dyn HookSubscription>, HookError>;

    /// Ancestor window that owns `hwnd` for this kind of event
    fn ancestor_window(
        &self,
        hwnd: WindowHandle,
        event_type: WindowEventType,
    ) -> Result<WindowHandle, HookError>;

    /// Whether `hwnd` counts as a visible window for this kind of event
    fn is_window_visible(
        &self,
        hwnd: WindowHandle,
        event_type: WindowEventType,
    ) -> Result<bool, HookError>;
}

/// Event source for platforms without OS window events. Accepts hooks and
/// never fires.
#[derive(Debug, Default)]
pub struct NullEventSource;

struct NullSubscription;

impl HookSubscription for NullSubscription {
    fn hook(&mut self, category: WindowEventType) -> Result<(), HookError> {
        tracing::debug!(%category, "No window events on this platform; hook is inert");
        Ok(())
    }

    fn unhook(&mut self) {}
}

impl WindowEventSource for NullEventSource {
    fn create_subscription(
        &mut self,
        _sink: WindowEventSink,
    ) -> Result<Box<dyn HookSubscription>, HookError> {
        Ok(Box::new(NullSubscription))
    }

    fn ancestor_window(
        &self,
        hwnd: WindowHandle,
        _event_type: WindowEventType,
    ) -> Result<WindowHandle, HookError> {
        Ok(hwnd)
    }

    fn is_window_visible(
        &self,
        _hwnd: WindowHandle,
        _event_type: WindowEventType,
    ) -> Result<bool, HookError> {
        Ok(true)
    }
}

/// The event source for the current platform
pub fn platform_event_source() -> Box<dyn WindowEventSource> {
    #[cfg(windows)]
    {
        Box::new(super::win::WinEventSource::new())
    }

    #[cfg(not(windows))]
    {
        Box::new(NullEventSource)
    }
}
