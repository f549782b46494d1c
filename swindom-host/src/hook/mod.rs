//! Window-event hooking
//!
//! - [`state`]: the pure Unhooked/Hooked transition function
//! - [`HookCoordinator`]: applies transitions to a [`WindowEventSource`] and
//!   forwards firings to the plugin
//! - [`NullEventSource`] and, on Windows, `WinEventSource`

mod coordinator;
mod source;
pub mod state;
#[cfg(windows)]
mod win;

pub use coordinator::{DispatchOutcome, HookCoordinator};
pub use source::{
    HookError, HookSubscription, NullEventSource, WindowEvent, WindowEventSink,
    WindowEventSource, platform_event_source,
};
pub use state::{HookAction, HookState};
#[cfg(windows)]
pub use win::WinEventSource;

#[cfg(test)]
pub(crate) use coordinator::tests::{MockSource, MockStats};
