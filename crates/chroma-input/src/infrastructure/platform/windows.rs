//! Windows platform probes.
//!
//! # Safety
//!
//! This module uses `unsafe` code exclusively for Windows API FFI calls.
//! All `unsafe` blocks are annotated with `// SAFETY:` comments.

#![cfg(target_os = "windows")]

use std::ffi::c_void;
use std::path::Path;

use chroma_input_core::{
    DeviceHandle, DevicePathSource, DeviceResolutionError, LockKey, LockKeyProbe,
};
use windows::core::PWSTR;
use windows::Win32::Foundation::{CloseHandle, HANDLE, POINT};
use windows::Win32::System::Threading::{
    OpenProcess, QueryFullProcessImageNameW, PROCESS_NAME_WIN32,
    PROCESS_QUERY_LIMITED_INFORMATION,
};
use windows::Win32::UI::Input::KeyboardAndMouse::{GetKeyState, VK_CAPITAL, VK_NUMLOCK, VK_SCROLL};
use windows::Win32::UI::Input::{GetRawInputDeviceInfoW, RIDI_DEVICENAME};
use windows::Win32::UI::WindowsAndMessaging::{
    GetCursorPos, GetForegroundWindow, GetWindowThreadProcessId,
};

use crate::application::dispatch_input::CursorPosition;
use crate::application::focus_monitor::{ForegroundProcessProbe, ProbeError};

/// Name reported for pid 0, which owns the secure desktop and idle time.
const IDLE_PROCESS_NAME: &str = "Idle";

/// Longest image path `QueryFullProcessImageNameW` is asked for.
const MAX_IMAGE_PATH: usize = 1024;

/// Win32 implementation of every platform probe.
#[derive(Debug, Default, Clone, Copy)]
pub struct WindowsPlatform;

impl WindowsPlatform {
    pub fn new() -> Self {
        Self
    }
}

impl DevicePathSource for WindowsPlatform {
    fn device_path(&self, handle: DeviceHandle) -> Result<Option<String>, DeviceResolutionError> {
        let device = HANDLE(handle.0 as usize as *mut c_void);
        let failed = |reason: &str| DeviceResolutionError {
            handle,
            reason: reason.to_string(),
        };

        let mut len: u32 = 0;
        // SAFETY: size query; a null buffer makes the call write only `len`.
        let rc = unsafe { GetRawInputDeviceInfoW(Some(device), RIDI_DEVICENAME, None, &mut len) };
        if rc == u32::MAX {
            return Err(failed("size query rejected"));
        }
        if len == 0 {
            return Ok(None);
        }

        let mut buffer = vec![0u16; len as usize];
        // SAFETY: `buffer` holds `len` UTF-16 units as the size query requested.
        let rc = unsafe {
            GetRawInputDeviceInfoW(
                Some(device),
                RIDI_DEVICENAME,
                Some(buffer.as_mut_ptr().cast()),
                &mut len,
            )
        };
        if rc == u32::MAX {
            return Err(failed("name query rejected"));
        }

        let end = buffer.iter().position(|&c| c == 0).unwrap_or(buffer.len());
        let path = String::from_utf16_lossy(&buffer[..end]);
        Ok((!path.is_empty()).then_some(path))
    }
}

impl LockKeyProbe for WindowsPlatform {
    fn is_toggled(&self, key: LockKey) -> bool {
        let vk = match key {
            LockKey::NumLock => VK_NUMLOCK,
            LockKey::CapsLock => VK_CAPITAL,
            LockKey::ScrollLock => VK_SCROLL,
        };
        // SAFETY: no preconditions; the low bit is the toggle state.
        let state = unsafe { GetKeyState(i32::from(vk.0)) };
        state & 1 != 0
    }
}

impl CursorPosition for WindowsPlatform {
    fn cursor_position(&self) -> Option<(i32, i32)> {
        let mut point = POINT::default();
        // SAFETY: `point` is a valid out-pointer for the duration of the call.
        unsafe { GetCursorPos(&mut point) }.ok()?;
        Some((point.x, point.y))
    }
}

impl ForegroundProcessProbe for WindowsPlatform {
    fn foreground_process_id(&self) -> Result<u32, ProbeError> {
        // SAFETY: no preconditions.  Returns a null window while the secure
        // desktop is active, which maps to pid 0.
        let hwnd = unsafe { GetForegroundWindow() };
        if hwnd.is_invalid() {
            return Ok(0);
        }

        let mut pid: u32 = 0;
        // SAFETY: `pid` is a valid out-pointer for the duration of the call.
        let thread = unsafe { GetWindowThreadProcessId(hwnd, Some(&mut pid)) };
        if thread == 0 {
            return Err(ProbeError::Foreground(
                windows::core::Error::from_win32().to_string(),
            ));
        }
        Ok(pid)
    }

    fn process_name(&self, pid: u32) -> Result<Option<String>, ProbeError> {
        if pid == 0 {
            return Ok(Some(IDLE_PROCESS_NAME.to_string()));
        }

        let process_error = |e: windows::core::Error| ProbeError::Process {
            pid,
            reason: e.to_string(),
        };

        // SAFETY: limited query rights are enough for the image name.
        let process = unsafe { OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, false, pid) }
            .map_err(process_error)?;

        let mut buffer = vec![0u16; MAX_IMAGE_PATH];
        let mut len = buffer.len() as u32;
        // SAFETY: `buffer` holds `len` UTF-16 units; `process` is open.
        let queried = unsafe {
            QueryFullProcessImageNameW(
                process,
                PROCESS_NAME_WIN32,
                PWSTR(buffer.as_mut_ptr()),
                &mut len,
            )
        };
        // SAFETY: `process` was opened above and is closed exactly once.
        let _ = unsafe { CloseHandle(process) };
        queried.map_err(process_error)?;

        let image = String::from_utf16_lossy(&buffer[..len as usize]);
        Ok(Path::new(&image)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned()))
    }
}
