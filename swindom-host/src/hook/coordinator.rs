//! Event-hook coordinator - keeps the OS hook in line with what the plugin wants

use swindom_plugin_api::{WindowEventType, WindowHandle};

use super::source::{HookError, HookSubscription, WindowEvent, WindowEventSink, WindowEventSource};
use super::state::{HookAction, HookState, transition};
use crate::plugin::PluginBinding;

/// What happened to one window event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Forwarded to the plugin with this handle
    Forwarded(WindowHandle),
    /// Window-only processing and the ancestor window is hidden
    SkippedInvisible,
    /// No plugin, or the plugin was already destroyed
    NoPlugin,
    /// Resolution or the plugin call failed; the event was dropped
    Dropped,
}

/// Owns the single hook subscription slot.
pub struct HookCoordinator {
    source: Box<dyn WindowEventSource>,
    sink: WindowEventSink,
    state: HookState,
    subscription: Option<Box<dyn HookSubscription>>,
}

impl HookCoordinator {
    pub fn new(source: Box<dyn WindowEventSource>, sink: WindowEventSink) -> Self {
        Self {
            source,
            sink,
            state: HookState::Unhooked,
            subscription: None,
        }
    }

    pub fn state(&self) -> HookState {
        self.state
    }

    /// Re-read the plugin's requested category and re-target the hook.
    ///
    /// Without a live plugin this is a no-op.
    pub fn refresh(&mut self, binding: Option<&mut PluginBinding>) {
        let Some(binding) = binding else {
            return;
        };
        match binding.window_event_type() {
            Some(requested) => self.apply(requested),
            None => tracing::warn!("Could not read plugin event type; keeping current hook"),
        }
    }

    /// Move to the state for `requested`. A failed hook leaves the
    /// coordinator unhooked.
    pub fn apply(&mut self, requested: WindowEventType) {
        let (next, action) = transition(self.state, requested);
        if let Err(e) = self.perform(action) {
            tracing::warn!(error = %e, %requested, "Window event hook failed");
            self.subscription = None;
            self.state = HookState::Unhooked;
            return;
        }
        if next != self.state {
            tracing::debug!(from = ?self.state, to = ?next, "Window event hook changed");
        }
        self.state = next;
    }

    fn perform(&mut self, action: HookAction) -> Result<(), HookError> {
        match action {
            HookAction::Nothing => Ok(()),
            HookAction::Subscribe(category) => {
                let mut subscription = self.source.create_subscription(self.sink.clone())?;
                subscription.hook(category)?;
                self.subscription = Some(subscription);
                Ok(())
            }
            HookAction::Retarget { to, .. } => {
                if let Some(subscription) = self.subscription.as_mut() {
                    subscription.unhook();
                    return subscription.hook(to);
                }
                // Lost the subscription after an earlier failure
                self.perform(HookAction::Subscribe(to))
            }
            HookAction::Release { .. } => {
                if let Some(mut subscription) = self.subscription.take() {
                    subscription.unhook();
                }
                Ok(())
            }
        }
    }

    /// Unhook and release the subscription, if any
    pub fn release(&mut self) {
        self.apply(WindowEventType::NONE);
    }

    /// Forward one OS firing to the plugin.
    ///
    /// With window-only processing the event goes through only when the
    /// ancestor window is visible, and carries the ancestor handle. Otherwise
    /// it always goes through with the raw handle.
    pub fn dispatch(
        &self,
        binding: Option<&mut PluginBinding>,
        event: WindowEvent,
    ) -> DispatchOutcome {
        let Some(binding) = binding else {
            return DispatchOutcome::NoPlugin;
        };
        let Some(window_only) = binding.is_window_only_event_processing() else {
            return DispatchOutcome::NoPlugin;
        };

        let target = if window_only {
            match self.resolve_visible_ancestor(event) {
                Ok(Some(ancestor)) => ancestor,
                Ok(None) => return DispatchOutcome::SkippedInvisible,
                Err(e) => {
                    tracing::debug!(error = %e, hwnd = %event.hwnd, "Dropping window event");
                    return DispatchOutcome::Dropped;
                }
            }
        } else {
            event.hwnd
        };

        match binding.do_event_processing(target, event.event_type) {
            Some(()) => DispatchOutcome::Forwarded(target),
            None => DispatchOutcome::Dropped,
        }
    }

    fn resolve_visible_ancestor(
        &self,
        event: WindowEvent,
    ) -> Result<Option<WindowHandle>, HookError> {
        let ancestor = self.source.ancestor_window(event.hwnd, event.event_type)?;
        let visible = self.source.is_window_visible(ancestor, event.event_type)?;
        Ok(visible.then_some(ancestor))
    }
}

impl Drop for HookCoordinator {
    fn drop(&mut self) {
        self.release();
    }
}
