//! Win32 primitives: the `runas` elevation request and clipboard reading.

use std::thread;
use std::time::Duration;

use encoding_rs::WINDOWS_1252;
use windows::core::PCWSTR;
use windows::Win32::Foundation::{CloseHandle, HANDLE, WAIT_OBJECT_0, WAIT_TIMEOUT};
use windows::Win32::System::DataExchange::{
    CloseClipboard, GetClipboardData, IsClipboardFormatAvailable, OpenClipboard,
};
use windows::Win32::System::Memory::{GlobalLock, GlobalUnlock, HGLOBAL};
use windows::Win32::System::Threading::{GetExitCodeProcess, WaitForSingleObject};
use windows::Win32::UI::Shell::{ShellExecuteExW, SHELLEXECUTEINFOW};
use windows::Win32::UI::WindowsAndMessaging::{SW_HIDE, SW_SHOWNORMAL};

use crate::error::{CheckError, Result};

const SEE_MASK_NOCLOSEPROCESS: u32 = 0x0000_0040;
// HRESULT form of ERROR_CANCELLED (1223): the user dismissed the UAC prompt.
const E_CANCELLED: i32 = 0x8007_04C7_u32 as i32;
const CF_TEXT: u32 = 1;
const CF_UNICODETEXT: u32 = 13;

fn to_wide(text: &str) -> Vec<u16> {
    text.encode_utf16().chain(std::iter::once(0)).collect()
}

struct ProcessHandle(HANDLE);

impl Drop for ProcessHandle {
    fn drop(&mut self) {
        unsafe {
            let _ = CloseHandle(self.0);
        }
    }
}

/// Requests elevated execution via ShellExecuteEx with the `runas` verb,
/// waits for the process to exit, and returns its exit code.
///
/// A dismissed consent prompt maps to [`CheckError::ElevationCancelled`],
/// which callers must treat as a user decision rather than a retryable
/// failure. Exceeding `timeout` maps to [`CheckError::Timeout`].
pub fn run_elevated(
    executable: &str,
    parameters: &str,
    hidden: bool,
    timeout: Duration,
) -> Result<i32> {
    let verb = to_wide("runas");
    let file = to_wide(executable);
    let params = to_wide(parameters);

    let mut info = SHELLEXECUTEINFOW {
        cbSize: std::mem::size_of::<SHELLEXECUTEINFOW>() as u32,
        fMask: SEE_MASK_NOCLOSEPROCESS,
        lpVerb: PCWSTR::from_raw(verb.as_ptr()),
        lpFile: PCWSTR::from_raw(file.as_ptr()),
        lpParameters: PCWSTR::from_raw(params.as_ptr()),
        nShow: if hidden { SW_HIDE.0 } else { SW_SHOWNORMAL.0 },
        ..Default::default()
    };

    unsafe {
        if let Err(err) = ShellExecuteExW(&mut info) {
            if err.code().0 == E_CANCELLED {
                return Err(CheckError::ElevationCancelled);
            }
            return Err(CheckError::LaunchFailed(format!(
                "ShellExecuteEx failed: {err}"
            )));
        }
    }

    if info.hProcess.is_invalid() {
        return Err(CheckError::LaunchFailed(
            "ShellExecuteEx did not return a process handle".to_string(),
        ));
    }
    let process = ProcessHandle(info.hProcess);

    let timeout_ms = timeout.as_millis().max(1).min(u32::MAX as u128) as u32;
    unsafe {
        let wait = WaitForSingleObject(process.0, timeout_ms);
        if wait == WAIT_TIMEOUT {
            return Err(CheckError::Timeout(format!(
                "elevated process did not exit within {}s",
                timeout.as_secs()
            )));
        }
        if wait != WAIT_OBJECT_0 {
            return Err(CheckError::System(format!(
                "unexpected wait result: {:#x}",
                wait.0
            )));
        }

        let mut exit_code = 0u32;
        GetExitCodeProcess(process.0, &mut exit_code)
            .map_err(|e| CheckError::System(format!("GetExitCodeProcess failed: {e}")))?;
        Ok(exit_code as i32)
    }
}

struct ClipboardGuard;

impl Drop for ClipboardGuard {
    fn drop(&mut self) {
        unsafe {
            let _ = CloseClipboard();
        }
    }
}

unsafe fn clipboard_handle_text(format: u32) -> Option<String> {
    let handle = GetClipboardData(format).ok()?;
    if handle.is_invalid() {
        return None;
    }
    let hglobal = HGLOBAL(handle.0 as *mut core::ffi::c_void);
    let pointer = GlobalLock(hglobal);
    if pointer.is_null() {
        return None;
    }

    let text = if format == CF_UNICODETEXT {
        let mut units: Vec<u16> = Vec::new();
        let mut cursor = pointer as *const u16;
        while *cursor != 0 {
            units.push(*cursor);
            cursor = cursor.add(1);
        }
        String::from_utf16_lossy(&units)
    } else {
        let mut bytes: Vec<u8> = Vec::new();
        let mut cursor = pointer as *const u8;
        while *cursor != 0 {
            bytes.push(*cursor);
            cursor = cursor.add(1);
        }
        let (decoded, _, _) = WINDOWS_1252.decode(&bytes);
        decoded.into_owned()
    };

    let _ = GlobalUnlock(hglobal);
    let text = text.trim().to_string();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Current clipboard text, Unicode format preferred, legacy 8-bit format as
/// fallback. Returns `None` when the clipboard is busy, empty, or non-text.
pub fn read_clipboard_text() -> Option<String> {
    let mut opened = false;
    for _ in 0..20 {
        if unsafe { OpenClipboard(None) }.is_ok() {
            opened = true;
            break;
        }
        thread::sleep(Duration::from_millis(50));
    }
    if !opened {
        return None;
    }
    let _guard = ClipboardGuard;

    unsafe {
        if IsClipboardFormatAvailable(CF_UNICODETEXT).is_ok() {
            return clipboard_handle_text(CF_UNICODETEXT);
        }
        if IsClipboardFormatAvailable(CF_TEXT).is_ok() {
            return clipboard_handle_text(CF_TEXT);
        }
    }
    None
}
