//! Raw-input message pump for Windows.
//!
//! A dedicated thread creates a message-only `STATIC` window, replaces its
//! window procedure (subclassing via `SetWindowLongPtrW`), registers it as the
//! raw-input sink for keyboards (usage 0x01/0x06) and mice (0x01/0x02), and
//! runs a standard message loop.  `WM_INPUT` payloads are decoded into
//! [`RawInputRecord`]s and handed to the installed callback; every message is
//! then passed to the original window procedure.
//!
//! # Safety
//!
//! This module uses `unsafe` code exclusively for Windows API FFI calls.
//! All `unsafe` blocks are annotated with `// SAFETY:` comments.

#![cfg(target_os = "windows")]

use std::cell::RefCell;
use std::ffi::c_void;
use std::mem::size_of;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Sender};
use std::sync::Mutex;
use std::thread::{self, JoinHandle};

use chroma_input_core::{DeviceHandle, RawInputRecord, RawKeyboardRecord, RawMouseRecord};
use tracing::{debug, error, info};
use windows::core::w;
use windows::Win32::Foundation::{GetLastError, HWND, LPARAM, LRESULT, WPARAM};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::System::Threading::GetCurrentThreadId;
use windows::Win32::UI::Input::{
    GetRawInputData, RegisterRawInputDevices, HRAWINPUT, RAWINPUT, RAWINPUTDEVICE,
    RAWINPUTHEADER, RIDEV_INPUTSINK, RIDEV_REMOVE, RID_INPUT, RIM_TYPEKEYBOARD, RIM_TYPEMOUSE,
};
use windows::Win32::UI::WindowsAndMessaging::{
    CallWindowProcW, CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW,
    GetMessageW, PostThreadMessageW, SetWindowLongPtrW, GWLP_WNDPROC, HWND_MESSAGE, MSG,
    WINDOW_EX_STYLE, WINDOW_STYLE, WM_INPUT, WM_QUIT, WNDPROC,
};

use super::{NativeCallback, NativeHookError, NativeMessagePump};

const USAGE_PAGE_GENERIC_DESKTOP: u16 = 0x01;
const USAGE_MOUSE: u16 = 0x02;
const USAGE_KEYBOARD: u16 = 0x06;

/// Per-thread hook state; only the pump thread ever touches it.
struct HookContext {
    callback: NativeCallback,
    original: WNDPROC,
}

thread_local! {
    static HOOK: RefCell<Option<HookContext>> = const { RefCell::new(None) };
}

struct PumpThread {
    thread_id: u32,
    thread: JoinHandle<Result<(), NativeHookError>>,
}

/// Windows raw-input pump.
///
/// At most one callback can be installed at a time.
#[derive(Default)]
pub struct RawInputWindowPump {
    running: Mutex<Option<PumpThread>>,
}

impl RawInputWindowPump {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NativeMessagePump for RawInputWindowPump {
    fn install(&self, callback: NativeCallback) -> Result<(), NativeHookError> {
        let mut running = self.running.lock().unwrap_or_else(|e| e.into_inner());
        if running.is_some() {
            return Err(NativeHookError::AlreadyInstalled);
        }

        let (ready_tx, ready_rx) = mpsc::channel();
        let thread = thread::Builder::new()
            .name("chroma-raw-input".to_string())
            .spawn(move || run_pump_thread(callback, ready_tx))
            .map_err(|e| NativeHookError::WindowCreation(e.to_string()))?;

        match ready_rx.recv() {
            Ok(Ok(thread_id)) => {
                info!("raw input pump running on thread {thread_id}");
                *running = Some(PumpThread { thread_id, thread });
                Ok(())
            }
            Ok(Err(e)) => {
                let _ = thread.join();
                Err(e)
            }
            Err(_) => {
                let _ = thread.join();
                Err(NativeHookError::WindowCreation(
                    "pump thread exited during setup".to_string(),
                ))
            }
        }
    }

    fn uninstall(&self) -> Result<(), NativeHookError> {
        let Some(pump) = self
            .running
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
        else {
            return Ok(());
        };

        // SAFETY: posting WM_QUIT to a thread we own; its queue exists because
        // it created a window before reporting ready.
        unsafe { PostThreadMessageW(pump.thread_id, WM_QUIT, WPARAM(0), LPARAM(0)) }
            .map_err(|e| NativeHookError::Restore(e.to_string()))?;

        match pump.thread.join() {
            Ok(result) => result,
            Err(_) => Err(NativeHookError::Restore("pump thread panicked".to_string())),
        }
    }

    fn is_installed(&self) -> bool {
        self.running
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }
}

/// Entry point for the dedicated pump thread.
fn run_pump_thread(
    callback: NativeCallback,
    ready: Sender<Result<u32, NativeHookError>>,
) -> Result<(), NativeHookError> {
    let hwnd = match create_hooked_window(callback) {
        Ok(hwnd) => hwnd,
        Err(e) => {
            HOOK.with(|hook| hook.borrow_mut().take());
            let _ = ready.send(Err(e));
            return Ok(());
        }
    };

    // SAFETY: no preconditions.
    let thread_id = unsafe { GetCurrentThreadId() };
    let _ = ready.send(Ok(thread_id));

    let mut msg = MSG::default();
    loop {
        // SAFETY: `msg` is a valid out-pointer; a null window reads every
        // message posted to this thread.
        let rc = unsafe { GetMessageW(&mut msg, None, 0, 0) };
        match classify_get_message(rc.0) {
            PumpStep::Dispatch => {
                // SAFETY: `msg` was filled by the successful GetMessageW above.
                unsafe { DispatchMessageW(&msg) };
            }
            PumpStep::Quit => break,
            PumpStep::Failed => {
                // SAFETY: no preconditions.
                let code = unsafe { GetLastError() };
                error!("GetMessageW failed ({code:?}), stopping raw input pump");
                break;
            }
        }
    }

    teardown(hwnd)
}

/// Outcome of one `GetMessageW` call.
#[derive(Debug, PartialEq, Eq)]
enum PumpStep {
    Dispatch,
    Quit,
    Failed,
}

/// `GetMessageW` returns a positive value for a message, zero for `WM_QUIT`
/// and -1 on error.
fn classify_get_message(rc: i32) -> PumpStep {
    match rc {
        0 => PumpStep::Quit,
        rc if rc > 0 => PumpStep::Dispatch,
        _ => PumpStep::Failed,
    }
}

fn create_hooked_window(callback: NativeCallback) -> Result<HWND, NativeHookError> {
    // SAFETY: a null module name returns the handle of the current executable.
    let instance = unsafe { GetModuleHandleW(None) }
        .map_err(|e| NativeHookError::WindowCreation(e.to_string()))?;

    // SAFETY: the predefined STATIC class needs no registration; HWND_MESSAGE
    // makes the window message-only (never shown, never enumerated).
    let hwnd = unsafe {
        CreateWindowExW(
            WINDOW_EX_STYLE(0),
            w!("STATIC"),
            w!("ChromaInputRawInput"),
            WINDOW_STYLE(0),
            0,
            0,
            0,
            0,
            Some(HWND_MESSAGE),
            None,
            Some(instance.into()),
            None,
        )
    }
    .map_err(|e| NativeHookError::WindowCreation(e.to_string()))?;

    HOOK.with(|hook| {
        *hook.borrow_mut() = Some(HookContext {
            callback,
            original: None,
        });
    });

    // SAFETY: hwnd was created on this thread; subclass_proc matches the
    // WNDPROC signature.  The previous value is a WNDPROC stored as isize.
    let previous = unsafe { SetWindowLongPtrW(hwnd, GWLP_WNDPROC, subclass_proc as usize as isize) };
    if previous == 0 {
        // SAFETY: hwnd is ours and still valid.
        let _ = unsafe { DestroyWindow(hwnd) };
        return Err(NativeHookError::Subclass(
            windows::core::Error::from_win32().to_string(),
        ));
    }
    // SAFETY: a non-zero GWLP_WNDPROC value is a valid window procedure pointer.
    let original: WNDPROC = unsafe { std::mem::transmute::<isize, WNDPROC>(previous) };
    HOOK.with(|hook| {
        if let Some(ctx) = hook.borrow_mut().as_mut() {
            ctx.original = original;
        }
    });

    if let Err(e) = register_raw_input(hwnd) {
        restore_window_proc(hwnd);
        // SAFETY: hwnd is ours and still valid.
        let _ = unsafe { DestroyWindow(hwnd) };
        return Err(e);
    }

    debug!("raw input window created");
    Ok(hwnd)
}

fn register_raw_input(hwnd: HWND) -> Result<(), NativeHookError> {
    let devices = [
        RAWINPUTDEVICE {
            usUsagePage: USAGE_PAGE_GENERIC_DESKTOP,
            usUsage: USAGE_KEYBOARD,
            dwFlags: RIDEV_INPUTSINK,
            hwndTarget: hwnd,
        },
        RAWINPUTDEVICE {
            usUsagePage: USAGE_PAGE_GENERIC_DESKTOP,
            usUsage: USAGE_MOUSE,
            dwFlags: RIDEV_INPUTSINK,
            hwndTarget: hwnd,
        },
    ];
    // SAFETY: the slice outlives the call and the size matches the element type.
    unsafe { RegisterRawInputDevices(&devices, size_of::<RAWINPUTDEVICE>() as u32) }
        .map_err(|e| NativeHookError::Registration(e.to_string()))
}

fn unregister_raw_input() {
    let devices = [USAGE_KEYBOARD, USAGE_MOUSE].map(|usage| RAWINPUTDEVICE {
        usUsagePage: USAGE_PAGE_GENERIC_DESKTOP,
        usUsage: usage,
        dwFlags: RIDEV_REMOVE,
        hwndTarget: HWND::default(),
    });
    // SAFETY: as in register_raw_input; RIDEV_REMOVE requires a null target.
    if let Err(e) = unsafe { RegisterRawInputDevices(&devices, size_of::<RAWINPUTDEVICE>() as u32) } {
        error!("failed to unregister raw input devices: {e}");
    }
}

/// Puts the original window procedure back.  Returns `false` on failure.
fn restore_window_proc(hwnd: HWND) -> bool {
    let original = HOOK.with(|hook| hook.borrow().as_ref().and_then(|ctx| ctx.original));
    let Some(original) = original else {
        return true;
    };
    // SAFETY: restoring the value SetWindowLongPtrW returned on this thread.
    let previous = unsafe { SetWindowLongPtrW(hwnd, GWLP_WNDPROC, original as usize as isize) };
    previous != 0
}

fn teardown(hwnd: HWND) -> Result<(), NativeHookError> {
    unregister_raw_input();
    let restored = restore_window_proc(hwnd);
    HOOK.with(|hook| hook.borrow_mut().take());

    // SAFETY: hwnd was created on this thread and has not been destroyed.
    if let Err(e) = unsafe { DestroyWindow(hwnd) } {
        error!("failed to destroy raw input window: {e}");
    }
    info!("raw input pump stopped");

    if restored {
        Ok(())
    } else {
        Err(NativeHookError::Restore(
            windows::core::Error::from_win32().to_string(),
        ))
    }
}

/// Replacement window procedure.
///
/// # Safety
///
/// Called by Windows on the pump thread only.
unsafe extern "system" fn subclass_proc(
    hwnd: HWND,
    msg: u32,
    w_param: WPARAM,
    l_param: LPARAM,
) -> LRESULT {
    if msg == WM_INPUT {
        if let Some(record) = read_raw_input(HRAWINPUT(l_param.0 as *mut c_void)) {
            HOOK.with(|hook| {
                let Ok(hook) = hook.try_borrow() else {
                    return;
                };
                if let Some(ctx) = hook.as_ref() {
                    // A panic must not unwind across the FFI boundary.
                    if panic::catch_unwind(AssertUnwindSafe(|| (ctx.callback)(record))).is_err() {
                        error!("raw input callback panicked");
                    }
                }
            });
        }
    }

    let original = HOOK.with(|hook| {
        hook.try_borrow()
            .ok()
            .and_then(|hook| hook.as_ref().and_then(|ctx| ctx.original))
    });
    match original {
        // SAFETY: forwarding to the procedure we replaced, with unchanged arguments.
        Some(original) => CallWindowProcW(Some(original), hwnd, msg, w_param, l_param),
        // SAFETY: default handling for a window we own.
        None => DefWindowProcW(hwnd, msg, w_param, l_param),
    }
}

/// Decodes one `WM_INPUT` payload.  Returns `None` for HID and unreadable data.
///
/// # Safety
///
/// `handle` must be the `lParam` of a `WM_INPUT` message being processed.
unsafe fn read_raw_input(handle: HRAWINPUT) -> Option<RawInputRecord> {
    let mut raw = RAWINPUT::default();
    let mut size = size_of::<RAWINPUT>() as u32;
    let read = GetRawInputData(
        handle,
        RID_INPUT,
        Some(&mut raw as *mut RAWINPUT as *mut c_void),
        &mut size,
        size_of::<RAWINPUTHEADER>() as u32,
    );
    if read == 0 || read == u32::MAX {
        return None;
    }

    let device = DeviceHandle(raw.header.hDevice.0 as usize as u64);
    match raw.header.dwType {
        t if t == RIM_TYPEKEYBOARD.0 => {
            let keyboard = raw.data.keyboard;
            Some(RawInputRecord::Keyboard(RawKeyboardRecord {
                device,
                virtual_code: keyboard.VKey,
                scan_code: keyboard.MakeCode,
                flags: keyboard.Flags,
            }))
        }
        t if t == RIM_TYPEMOUSE.0 => {
            let mouse = raw.data.mouse;
            let buttons = mouse.Anonymous.Anonymous;
            Some(RawInputRecord::Mouse(RawMouseRecord {
                device,
                button_flags: buttons.usButtonFlags,
                button_data: buttons.usButtonData as i16,
                delta_x: mouse.lLastX,
                delta_y: mouse.lLastY,
            }))
        }
        _ => None,
    }
}
