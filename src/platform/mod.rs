#[cfg(target_os = "windows")]
pub mod windows;

#[cfg(target_os = "windows")]
pub use self::windows::{read_clipboard_text, run_elevated};

/// Elevated execution is a Windows-only capability; other platforms fail
/// with a system error so callers surface a clean message.
#[cfg(not(target_os = "windows"))]
pub fn run_elevated(
    _executable: &str,
    _parameters: &str,
    _hidden: bool,
    _timeout: std::time::Duration,
) -> crate::error::Result<i32> {
    Err(crate::error::CheckError::System(
        "Elevated launch is only available on Windows".to_string(),
    ))
}

#[cfg(not(target_os = "windows"))]
pub fn read_clipboard_text() -> Option<String> {
    None
}
