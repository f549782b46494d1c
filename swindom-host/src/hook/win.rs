//! Windows event source: `SetWinEventHook` on a dedicated hook thread
//!
//! Out-of-context WinEvent hooks are delivered through the message queue of
//! the thread that installed them, so the subscription owns a thread that
//! does nothing but install/remove hooks on request and pump messages. The
//! hook procedure has no user data slot; the active sink lives in a static,
//! which is fine because the host keeps at most one subscription.

use std::ptr::null_mut;
use std::sync::{Mutex, mpsc};
use std::thread::JoinHandle;
use std::time::Duration;

use swindom_plugin_api::{WindowEventType, WindowHandle};
use windows_sys::Win32::Foundation::HWND;
use windows_sys::Win32::System::Threading::GetCurrentThreadId;
use windows_sys::Win32::UI::Accessibility::{HWINEVENTHOOK, SetWinEventHook, UnhookWinEvent};
use windows_sys::Win32::UI::WindowsAndMessaging::{
    CHILDID_SELF, DispatchMessageW, EVENT_OBJECT_CREATE, EVENT_OBJECT_DESTROY, EVENT_OBJECT_HIDE,
    EVENT_OBJECT_LOCATIONCHANGE, EVENT_OBJECT_NAMECHANGE, EVENT_OBJECT_SHOW,
    EVENT_SYSTEM_FOREGROUND, EVENT_SYSTEM_MINIMIZEEND, EVENT_SYSTEM_MINIMIZESTART,
    EVENT_SYSTEM_MOVESIZEEND, EVENT_SYSTEM_MOVESIZESTART, GA_ROOT, GetAncestor, GetMessageW,
    IsWindow, IsWindowVisible, MSG, OBJID_WINDOW, PM_NOREMOVE, PeekMessageW, PostThreadMessageW,
    TranslateMessage, WINEVENT_OUTOFCONTEXT, WINEVENT_SKIPOWNPROCESS, WM_APP, WM_QUIT, WM_USER,
};

use super::source::{HookError, HookSubscription, WindowEvent, WindowEventSink, WindowEventSource};

const WM_HOOK: u32 = WM_APP + 1;
const WM_UNHOOK: u32 = WM_APP + 2;

const REPLY_TIMEOUT: Duration = Duration::from_secs(2);

static SINK: Mutex<Option<WindowEventSink>> = Mutex::new(None);

const EVENT_MAP: [(WindowEventType, u32); 11] = [
    (WindowEventType::FOREGROUND, EVENT_SYSTEM_FOREGROUND),
    (WindowEventType::MOVE_SIZE_START, EVENT_SYSTEM_MOVESIZESTART),
    (WindowEventType::MOVE_SIZE_END, EVENT_SYSTEM_MOVESIZEEND),
    (WindowEventType::MINIMIZE_START, EVENT_SYSTEM_MINIMIZESTART),
    (WindowEventType::MINIMIZE_END, EVENT_SYSTEM_MINIMIZEEND),
    (WindowEventType::CREATE, EVENT_OBJECT_CREATE),
    (WindowEventType::SHOW, EVENT_OBJECT_SHOW),
    (WindowEventType::DESTROY, EVENT_OBJECT_DESTROY),
    (WindowEventType::HIDE, EVENT_OBJECT_HIDE),
    (WindowEventType::NAME_CHANGE, EVENT_OBJECT_NAMECHANGE),
    (WindowEventType::LOCATION_CHANGE, EVENT_OBJECT_LOCATIONCHANGE),
];

fn os_event(category: WindowEventType) -> Option<u32> {
    EVENT_MAP
        .iter()
        .find(|(c, _)| *c == category)
        .map(|(_, event)| *event)
}

fn category_of(event: u32) -> WindowEventType {
    EVENT_MAP
        .iter()
        .find(|(_, e)| *e == event)
        .map(|(c, _)| *c)
        .unwrap_or(WindowEventType::NONE)
}

unsafe extern "system" fn win_event_proc(
    _hook: HWINEVENTHOOK,
    event: u32,
    hwnd: HWND,
    id_object: i32,
    id_child: i32,
    _event_thread: u32,
    _event_time: u32,
) {
    if hwnd.is_null() || id_object != OBJID_WINDOW || id_child != CHILDID_SELF as i32 {
        return;
    }
    let event_type = category_of(event);
    if event_type.is_none() {
        return;
    }
    let sink = SINK.lock().ok().and_then(|sink| sink.clone());
    if let Some(sink) = sink {
        sink(WindowEvent {
            hwnd: WindowHandle(hwnd as isize),
            event_type,
        });
    }
}

/// Window events from the Win32 WinEvent hooks
#[derive(Debug, Default)]
pub struct WinEventSource;

impl WinEventSource {
    pub fn new() -> Self {
        Self
    }
}

impl WindowEventSource for WinEventSource {
    fn create_subscription(
        &mut self,
        sink: WindowEventSink,
    ) -> Result<Box<dyn HookSubscription>, HookError> {
        let (ready_tx, ready_rx) = mpsc::channel();
        let (reply_tx, reply_rx) = mpsc::channel();

        let thread = std::thread::Builder::new()
            .name("win-event-hook".to_string())
            .spawn(move || hook_thread(ready_tx, reply_tx))
            .map_err(|e| HookError::Subscribe(e.to_string()))?;

        let thread_id = ready_rx
            .recv_timeout(REPLY_TIMEOUT)
            .map_err(|e| HookError::Subscribe(format!("hook thread did not start: {e}")))?;

        if let Ok(mut slot) = SINK.lock() {
            *slot = Some(sink);
        }

        Ok(Box::new(WinEventSubscription {
            thread_id,
            thread: Some(thread),
            replies: reply_rx,
        }))
    }

    fn ancestor_window(
        &self,
        hwnd: WindowHandle,
        _event_type: WindowEventType,
    ) -> Result<WindowHandle, HookError> {
        // SAFETY: GetAncestor tolerates stale handles and returns null for them
        let root = unsafe { GetAncestor(hwnd.0 as HWND, GA_ROOT) };
        if root.is_null() {
            return Err(HookError::Resolve {
                hwnd,
                reason: "no root ancestor".to_string(),
            });
        }
        Ok(WindowHandle(root as isize))
    }

    fn is_window_visible(
        &self,
        hwnd: WindowHandle,
        event_type: WindowEventType,
    ) -> Result<bool, HookError> {
        // Hidden and destroyed windows were visible up to the event itself
        if event_type == WindowEventType::HIDE || event_type == WindowEventType::DESTROY {
            return Ok(true);
        }
        let handle = hwnd.0 as HWND;
        // SAFETY: both calls only inspect the handle value
        let visible = unsafe { IsWindow(handle) != 0 && IsWindowVisible(handle) != 0 };
        Ok(visible)
    }
}

struct WinEventSubscription {
    thread_id: u32,
    thread: Option<JoinHandle<()>>,
    replies: mpsc::Receiver<Result<(), String>>,
}

impl WinEventSubscription {
    fn post(&self, message: u32, wparam: usize) -> bool {
        // SAFETY: posting to a thread we own; it created its queue before
        // publishing its id
        unsafe { PostThreadMessageW(self.thread_id, message, wparam, 0) != 0 }
    }
}

impl HookSubscription for WinEventSubscription {
    fn hook(&mut self, category: WindowEventType) -> Result<(), HookError> {
        let failed = |reason: String| HookError::Hook { category, reason };

        if !self.post(WM_HOOK, category.bits() as usize) {
            return Err(failed("hook thread is gone".to_string()));
        }
        match self.replies.recv_timeout(REPLY_TIMEOUT) {
            Ok(Ok(())) => Ok(()),
            Ok(Err(reason)) => Err(failed(reason)),
            Err(e) => Err(failed(e.to_string())),
        }
    }

    fn unhook(&mut self) {
        if self.post(WM_UNHOOK, 0) {
            let _ = self.replies.recv_timeout(REPLY_TIMEOUT);
        }
    }
}

impl Drop for WinEventSubscription {
    fn drop(&mut self) {
        self.post(WM_QUIT, 0);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
        if let Ok(mut slot) = SINK.lock() {
            *slot = None;
        }
    }
}

fn hook_thread(ready: mpsc::Sender<u32>, replies: mpsc::Sender<Result<(), String>>) {
    // SAFETY: MSG is plain data
    let mut msg: MSG = unsafe { std::mem::zeroed() };
    // SAFETY: creates this thread's message queue so PostThreadMessageW works
    unsafe { PeekMessageW(&mut msg, null_mut(), WM_USER, WM_USER, PM_NOREMOVE) };
    // SAFETY: no preconditions
    if ready.send(unsafe { GetCurrentThreadId() }).is_err() {
        return;
    }

    let mut hooks: Vec<HWINEVENTHOOK> = Vec::new();
    loop {
        // SAFETY: msg is a valid out-pointer
        let got = unsafe { GetMessageW(&mut msg, null_mut(), 0, 0) };
        if got == 0 || got == -1 {
            break;
        }
        match msg.message {
            WM_HOOK => {
                let category = WindowEventType::from_bits(msg.wParam as u32);
                let result = install(&mut hooks, category);
                let _ = replies.send(result);
            }
            WM_UNHOOK => {
                uninstall(&mut hooks);
                let _ = replies.send(Ok(()));
            }
            _ => {
                // SAFETY: msg came from GetMessageW
                unsafe {
                    TranslateMessage(&msg);
                    DispatchMessageW(&msg);
                }
            }
        }
    }

    uninstall(&mut hooks);
}

fn install(hooks: &mut Vec<HWINEVENTHOOK>, category: WindowEventType) -> Result<(), String> {
    for single in category.categories() {
        let Some(event) = os_event(single) else {
            continue;
        };
        // SAFETY: out-of-context hook with a 'static callback
        let hook = unsafe {
            SetWinEventHook(
                event,
                event,
                null_mut(),
                Some(win_event_proc),
                0,
                0,
                WINEVENT_OUTOFCONTEXT | WINEVENT_SKIPOWNPROCESS,
            )
        };
        if hook.is_null() {
            uninstall(hooks);
            return Err(format!("SetWinEventHook failed for {single}"));
        }
        hooks.push(hook);
    }
    if hooks.is_empty() {
        return Err(format!("no OS events for {category}"));
    }
    Ok(())
}

fn uninstall(hooks: &mut Vec<HWINEVENTHOOK>) {
    for hook in hooks.drain(..) {
        // SAFETY: every handle came from SetWinEventHook on this thread
        unsafe { UnhookWinEvent(hook) };
    }
}
