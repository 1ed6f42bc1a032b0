//! Elevated launch strategies for the diagnostic tool.
//!
//! Each strategy is one self-contained way to get the tool running with
//! administrative rights, ideally without flashing a window. They are tried
//! in a fixed order by the acquisition driver; only the cancellation of the
//! consent prompt stops the sequence.

use std::path::Path;
use std::time::Duration;

use crate::error::Result;

/// One mechanism for elevated execution of `executable argument`.
///
/// `launch` returns the wrapper's exit code; a nonzero code is a diagnostic
/// hint, not a failure, since the wrapped tool signals success through its
/// output channels rather than its exit status.
pub trait LaunchStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// How long the output channels are polled after this strategy ran.
    fn wait_budget(&self) -> Duration {
        Duration::from_secs(10)
    }

    fn launch(&self, executable: &Path, argument: &str, timeout: Duration) -> Result<i32>;
}

#[cfg(target_os = "windows")]
mod windows_strategies {
    use super::LaunchStrategy;
    use std::path::Path;
    use std::time::Duration;

    use uuid::Uuid;

    use crate::error::{CheckError, Result};
    use crate::platform;
    use crate::utils::script::{build_command_line, vbs_string_literal, TempScript};

    // Exit codes the scheduled-task wrapper script reserves for its own
    // failure modes, distinct from the tool's exit codes.
    pub const TASK_CREATE_FAILED: i32 = 11;
    pub const TASK_RUN_FAILED: i32 = 12;

    /// Elevated `wscript.exe` running a temporary VBScript that starts the
    /// tool with its window hidden and waits for it synchronously.
    pub struct HiddenScriptStrategy;

    impl LaunchStrategy for HiddenScriptStrategy {
        fn name(&self) -> &'static str {
            "vbs-hidden"
        }

        fn launch(&self, executable: &Path, argument: &str, timeout: Duration) -> Result<i32> {
            let exe_name = executable
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| {
                    CheckError::LaunchFailed("executable path has no file name".to_string())
                })?;
            let exe_dir = executable.parent().unwrap_or_else(|| Path::new("."));
            let command_line = build_command_line(exe_name, argument);

            let script_text = format!(
                "Set sh = CreateObject(\"WScript.Shell\")\r\n\
                 sh.CurrentDirectory = {}\r\n\
                 WScript.Quit sh.Run({}, 0, True)\r\n",
                vbs_string_literal(&exe_dir.display().to_string()),
                vbs_string_literal(&command_line),
            );
            let script = TempScript::write_utf16("vbs", &script_text)?;

            let params = format!("//B //NoLogo \"{}\"", script.path().display());
            platform::run_elevated("wscript.exe", &params, true, timeout)
        }
    }

    /// Elevated `cmd.exe` running a temporary batch script that registers and
    /// fires a one-shot scheduled task under the SYSTEM account.
    pub struct ScheduledTaskStrategy;

    impl LaunchStrategy for ScheduledTaskStrategy {
        fn name(&self) -> &'static str {
            "scheduled-task-hidden"
        }

        fn launch(&self, executable: &Path, argument: &str, timeout: Duration) -> Result<i32> {
            let task_name = format!("DiskChecker_CDI_{}", Uuid::new_v4().simple());
            let task_command = build_command_line(&executable.display().to_string(), argument);

            let script_text = format!(
                "@echo off\r\n\
                 set \"DISK_CHECKER_TASK_COMMAND={task_command}\"\r\n\
                 schtasks /Create /TN \"{task_name}\" /TR \"%DISK_CHECKER_TASK_COMMAND%\" \
                 /SC ONCE /ST 00:00 /RU SYSTEM /RL HIGHEST /F /Z >nul\r\n\
                 if errorlevel 1 exit /b {TASK_CREATE_FAILED}\r\n\
                 schtasks /Run /TN \"{task_name}\" >nul\r\n\
                 if errorlevel 1 exit /b {TASK_RUN_FAILED}\r\n\
                 exit /b 0\r\n"
            );
            let script = TempScript::write("cmd", script_text.as_bytes())?;

            let params = format!("/C \"{}\"", script.path().display());
            platform::run_elevated("cmd.exe", &params, true, timeout)
        }
    }

    /// Direct elevated launch of the tool itself. May flash a visible window
    /// but has no moving parts, so it runs last as the dependable fallback.
    pub struct DirectStrategy;

    impl LaunchStrategy for DirectStrategy {
        fn name(&self) -> &'static str {
            "direct-elevated"
        }

        fn wait_budget(&self) -> Duration {
            // The visible-window path is slower to settle.
            Duration::from_secs(25)
        }

        fn launch(&self, executable: &Path, argument: &str, timeout: Duration) -> Result<i32> {
            platform::run_elevated(&executable.display().to_string(), argument, false, timeout)
        }
    }
}

#[cfg(target_os = "windows")]
pub use windows_strategies::{DirectStrategy, HiddenScriptStrategy, ScheduledTaskStrategy};

/// The fixed strategy order: hidden wrappers first, window-flashing direct
/// launch as last resort.
#[cfg(target_os = "windows")]
pub fn default_strategies() -> Vec<Box<dyn LaunchStrategy>> {
    vec![
        Box::new(HiddenScriptStrategy),
        Box::new(ScheduledTaskStrategy),
        Box::new(DirectStrategy),
    ]
}

#[cfg(not(target_os = "windows"))]
pub fn default_strategies() -> Vec<Box<dyn LaunchStrategy>> {
    Vec::new()
}
