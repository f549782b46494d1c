//! End-to-end tests for the host shell
//!
//! These drive a shell through its public surface only:
//! - window events posted from a foreign thread reach the plugin in order
//! - the command channel relays ShowWindow and ExitProcess
//! - parent exit ends the main loop and tears the plugin down once

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use swindom_host::hook::{
    HookError, HookState, HookSubscription, WindowEvent, WindowEventSink, WindowEventSource,
};
use swindom_host::{HostShell, ParentExit, PluginBinding};
use swindom_plugin_api::{
    EventTypeNotifier, Plugin, PluginContext, PluginError, WindowEventType, WindowHandle,
};

#[derive(Default)]
struct Calls {
    shown: usize,
    destroyed: usize,
    events: Vec<(WindowHandle, WindowEventType)>,
}

/// Minimal plugin that logs every call
struct CountingPlugin {
    calls: Arc<Mutex<Calls>>,
    event_type: WindowEventType,
}

impl Plugin for CountingPlugin {
    fn initialize(&mut self, _ctx: &mut PluginContext) -> Result<(), PluginError> {
        Ok(())
    }

    fn show_window(&mut self) {
        self.calls.lock().unwrap().shown += 1;
    }

    fn destruction(&mut self) {
        self.calls.lock().unwrap().destroyed += 1;
    }

    fn do_event_processing(&mut self, hwnd: WindowHandle, event_type: WindowEventType) {
        self.calls.lock().unwrap().events.push((hwnd, event_type));
    }

    fn window_event_type(&self) -> WindowEventType {
        self.event_type
    }

    fn subscribe_event_type_changed(&mut self, _notifier: EventTypeNotifier) {}
}

/// Source that hands its sink to the test so it can play the OS
#[derive(Clone, Default)]
struct CapturingSource {
    sink: Arc<Mutex<Option<WindowEventSink>>>,
}

struct CapturingSubscription;

impl HookSubscription for CapturingSubscription {
    fn hook(&mut self, _category: WindowEventType) -> Result<(), HookError> {
        Ok(())
    }

    fn unhook(&mut self) {}
}

impl WindowEventSource for CapturingSource {
    fn create_subscription(
        &mut self,
        sink: WindowEventSink,
    ) -> Result<Box<dyn HookSubscription>, HookError> {
        *self.sink.lock().unwrap() = Some(sink);
        Ok(Box::new(CapturingSubscription))
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

fn create_shell(event_type: WindowEventType) -> (HostShell, CapturingSource, Arc<Mutex<Calls>>) {
    let source = CapturingSource::default();
    let mut shell = HostShell::new(Box::new(source.clone()));

    let calls = Arc::new(Mutex::new(Calls::default()));
    let plugin = CountingPlugin {
        calls: calls.clone(),
        event_type,
    };
    let binding = PluginBinding::bind(
        Box::new(plugin),
        None,
        Path::new("/settings"),
        "ja-JP",
        shell.handle().event_type_notifier(),
    )
    .unwrap();
    shell.attach(binding);

    (shell, source, calls)
}

#[tokio::test]
async fn events_from_hook_thread_are_delivered_in_order() {
    let (mut shell, source, calls) = create_shell(WindowEventType::LOCATION_CHANGE);
    assert_eq!(
        shell.hook_state(),
        HookState::Hooked(WindowEventType::LOCATION_CHANGE)
    );
    let sink = source.sink.lock().unwrap().clone().unwrap();
    let signal = shell.exit_signal();

    std::thread::spawn(move || {
        for raw in 1..=3 {
            sink(WindowEvent {
                hwnd: WindowHandle(raw),
                event_type: WindowEventType::LOCATION_CHANGE,
            });
        }
        signal.fire(ParentExit::Exited);
    })
    .join()
    .unwrap();

    let reason = shell.run().await;

    assert_eq!(reason, ParentExit::Exited);
    let handles: Vec<isize> = calls.lock().unwrap().events.iter().map(|(h, _)| h.0).collect();
    assert_eq!(handles, vec![1, 2, 3]);
}

#[tokio::test]
async fn shutdown_after_run_destroys_plugin_once() {
    let (mut shell, _source, calls) = create_shell(WindowEventType::NONE);

    shell.exit_signal().fire(ParentExit::Exited);
    shell.run().await;
    shell.shutdown();
    drop(shell);

    assert_eq!(calls.lock().unwrap().destroyed, 1);
}

#[cfg(unix)]
mod channel {
    use super::*;
    use swindom_host::channel::CommandListener;
    use tokio::io::AsyncWriteExt;
    use tokio::net::UnixListener;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn channel_commands_reach_the_plugin() {
        let (mut shell, _source, calls) = create_shell(WindowEventType::NONE);
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("host.sock");
        let server = UnixListener::bind(&path).unwrap();

        let (exit_tx, exit_rx) = oneshot::channel();
        let listener =
            CommandListener::new(path.to_string_lossy(), Some(Duration::from_secs(2)), 1024);
        let task = shell.spawn_channel_listener_with(listener, move || {
            let _ = exit_tx.send(());
        });

        let (mut stream, _) = server.accept().await.unwrap();
        stream
            .write_all(b"ShowWindow\nPing\nShowWindow\nExitProcess\n")
            .await
            .unwrap();

        tokio::time::timeout(Duration::from_secs(5), exit_rx)
            .await
            .unwrap()
            .unwrap();
        task.await.unwrap();

        shell.exit_signal().fire(ParentExit::Exited);
        shell.run().await;

        assert_eq!(calls.lock().unwrap().shown, 2);
    }

    #[tokio::test]
    async fn closed_channel_keeps_host_running() {
        let (mut shell, _source, calls) = create_shell(WindowEventType::NONE);
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("host.sock");
        let server = UnixListener::bind(&path).unwrap();

        let listener =
            CommandListener::new(path.to_string_lossy(), Some(Duration::from_secs(2)), 1024);
        let task = shell.spawn_channel_listener_with(listener, || panic!("no exit requested"));

        let (mut stream, _) = server.accept().await.unwrap();
        stream.write_all(b"ShowWindow\n").await.unwrap();
        drop(stream);
        task.await.unwrap();

        assert_eq!(shell.drain_pending(), None);
        assert!(shell.has_plugin());
        assert_eq!(calls.lock().unwrap().shown, 1);
    }

    #[tokio::test]
    async fn parent_exit_ends_the_host() {
        let (mut shell, _source, calls) = create_shell(WindowEventType::NONE);
        let mut parent = std::process::Command::new("sleep")
            .arg("0.2")
            .spawn()
            .unwrap();

        let _watchdog = shell.start_watchdog(parent.id(), Duration::from_millis(10));
        parent.wait().unwrap();

        let reason = tokio::time::timeout(Duration::from_secs(5), shell.run())
            .await
            .unwrap();
        shell.shutdown();

        assert_eq!(reason, ParentExit::Exited);
        assert_eq!(calls.lock().unwrap().destroyed, 1);
    }

    #[tokio::test]
    async fn missing_parent_shuts_down_immediately() {
        let (mut shell, _source, _calls) = create_shell(WindowEventType::NONE);
        let mut gone = std::process::Command::new("true").spawn().unwrap();
        let pid = gone.id();
        gone.wait().unwrap();

        assert!(shell.start_watchdog(pid, Duration::from_millis(10)).is_none());
        let reason = shell.run().await;

        assert!(matches!(reason, ParentExit::Unavailable(_)));
    }
}
