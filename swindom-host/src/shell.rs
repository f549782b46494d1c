//! Host shell - owns the plugin binding and serializes every call into it
//!
//! Hook callbacks, the command channel, the plugin's event-type notifier and
//! the parent watchdog all run elsewhere. None of them touch the plugin; they
//! post a [`HostMessage`] to the shell's queue, and the shell's main loop
//! makes the plugin calls one at a time.

use std::sync::Arc;
use std::time::Duration;

use swindom_plugin_api::EventTypeNotifier;
use tokio::sync::mpsc;

use crate::channel::{ChannelOutcome, CommandListener};
use crate::hook::{HookCoordinator, HookState, WindowEvent, WindowEventSink, WindowEventSource};
use crate::plugin::PluginBinding;
use crate::watchdog::{ExitSignal, ParentExit, Watchdog};

/// Work posted to the host's main loop
#[derive(Debug)]
pub enum HostMessage {
    /// The parent asked for the plugin window
    ShowWindow,
    /// The plugin's requested window-event type changed
    EventTypeChanged,
    /// An OS window event fired
    WindowEvent(WindowEvent),
    /// The parent is gone; shut down
    ParentExited(ParentExit),
    /// A background task ended
    TaskFinished {
        task: &'static str,
        result: Result<(), String>,
    },
}

/// Cloneable sender side of the host's queue
#[derive(Clone, Debug)]
pub struct HostHandle {
    tx: mpsc::UnboundedSender<HostMessage>,
}

impl HostHandle {
    pub fn send(&self, message: HostMessage) {
        // Only fails once the shell is gone, and then nobody cares
        let _ = self.tx.send(message);
    }

    pub fn show_window(&self) {
        self.send(HostMessage::ShowWindow);
    }

    /// Notifier handed to the plugin for its event-type changes
    pub fn event_type_notifier(&self) -> EventTypeNotifier {
        let handle = self.clone();
        EventTypeNotifier::new(move || handle.send(HostMessage::EventTypeChanged))
    }

    /// Sink the OS event source reports firings to
    pub fn window_event_sink(&self) -> WindowEventSink {
        let handle = self.clone();
        Arc::new(move |event| handle.send(HostMessage::WindowEvent(event)))
    }

    fn task_finished(&self, task: &'static str, result: Result<(), String>) {
        self.send(HostMessage::TaskFinished { task, result });
    }
}

pub struct HostShell {
    binding: Option<PluginBinding>,
    coordinator: HookCoordinator,
    handle: HostHandle,
    receiver: mpsc::UnboundedReceiver<HostMessage>,
    exit_signal: ExitSignal,
    disposed: bool,
}

impl HostShell {
    pub fn new(source: Box<dyn WindowEventSource>) -> Self {
        let (tx, receiver) = mpsc::unbounded_channel();
        let handle = HostHandle { tx };
        let coordinator = HookCoordinator::new(source, handle.window_event_sink());
        let exit_signal = {
            let handle = handle.clone();
            ExitSignal::new(move |reason| handle.send(HostMessage::ParentExited(reason)))
        };

        Self {
            binding: None,
            coordinator,
            handle,
            receiver,
            exit_signal,
            disposed: false,
        }
    }

    pub fn handle(&self) -> HostHandle {
        self.handle.clone()
    }

    /// The "parent exited" event. Firing it ends [`HostShell::run`].
    pub fn exit_signal(&self) -> ExitSignal {
        self.exit_signal.clone()
    }

    /// Take ownership of the plugin and hook what it asks for
    pub fn attach(&mut self, binding: PluginBinding) {
        self.binding = Some(binding);
        self.coordinator.refresh(self.binding.as_mut());
    }

    pub fn has_plugin(&self) -> bool {
        self.binding.as_ref().is_some_and(|b| !b.is_destroyed())
    }

    pub fn hook_state(&self) -> HookState {
        self.coordinator.state()
    }

    /// Run the command channel as a supervised task. `ExitProcess` terminates
    /// the process with exit code 0 right away.
    pub fn spawn_channel_listener(&self, listener: CommandListener) -> tokio::task::JoinHandle<()> {
        self.spawn_channel_listener_with(listener, || std::process::exit(0))
    }

    /// Like [`HostShell::spawn_channel_listener`] with a custom exit action
    pub fn spawn_channel_listener_with(
        &self,
        listener: CommandListener,
        exit: impl FnOnce() + Send + 'static,
    ) -> tokio::task::JoinHandle<()> {
        let handle = self.handle();
        tokio::spawn(async move {
            let channel = listener.name().to_string();
            let show = handle.clone();
            match listener.run(move || show.show_window()).await {
                Ok(ChannelOutcome::ExitRequested) => {
                    tracing::info!(%channel, "Exit requested by parent");
                    exit();
                }
                Ok(ChannelOutcome::Closed) => {
                    tracing::debug!(%channel, "Command channel closed");
                    handle.task_finished("command-channel", Ok(()));
                }
                Err(e) => {
                    tracing::debug!(%channel, error = %e, "Command channel ended");
                    handle.task_finished("command-channel", Err(e.to_string()));
                }
            }
        })
    }

    /// Watch the parent process on a dedicated thread
    pub fn start_watchdog(
        &self,
        parent_pid: u32,
        poll_interval: Duration,
    ) -> Option<std::thread::JoinHandle<()>> {
        Watchdog::watch(parent_pid, poll_interval, self.exit_signal())
    }

    /// Process messages until the parent exits
    pub async fn run(&mut self) -> ParentExit {
        while let Some(message) = self.receiver.recv().await {
            if let Some(reason) = self.handle_message(message) {
                return reason;
            }
        }
        // The shell holds a sender itself, so the queue never closes first
        ParentExit::WaitFailed("host queue closed".to_string())
    }

    /// Process every message already queued without waiting for more
    pub fn drain_pending(&mut self) -> Option<ParentExit> {
        while let Ok(message) = self.receiver.try_recv() {
            if let Some(reason) = self.handle_message(message) {
                return Some(reason);
            }
        }
        None
    }

    /// Handle one message; returns the reason when the host should shut down
    pub fn handle_message(&mut self, message: HostMessage) -> Option<ParentExit> {
        if self.disposed {
            return None;
        }
        match message {
            HostMessage::ShowWindow => {
                if let Some(binding) = self.binding.as_mut() {
                    binding.show_window();
                }
            }
            HostMessage::EventTypeChanged => {
                self.coordinator.refresh(self.binding.as_mut());
            }
            HostMessage::WindowEvent(event) => {
                let outcome = self.coordinator.dispatch(self.binding.as_mut(), event);
                tracing::trace!(hwnd = %event.hwnd, ?outcome, "Window event");
            }
            HostMessage::ParentExited(reason) => {
                tracing::info!(%reason, "Shutting down");
                return Some(reason);
            }
            HostMessage::TaskFinished { task, result } => match result {
                Ok(()) => tracing::debug!(task, "Background task finished"),
                Err(error) => tracing::debug!(task, %error, "Background task failed"),
            },
        }
        None
    }

    /// Release the hook and destroy the plugin. Safe to call repeatedly.
    pub fn shutdown(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;

        self.coordinator.release();
        if let Some(mut binding) = self.binding.take() {
            binding.destroy();
        }
    }
}

impl Drop for HostShell {
    fn drop(&mut self) {
        self.shutdown();
    }
}
