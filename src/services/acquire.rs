//! Acquisition orchestrator: locates the tool, drives the strategy sequence,
//! and turns the first qualifying dump into normalized records.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use lazy_static::lazy_static;
use tracing::{info, warn};

use crate::error::{CheckError, Result};
use crate::models::{DiskHealthRecord, HealthReport};
use crate::parser;
use crate::services::launch::{self, LaunchStrategy};
use crate::services::report::build_report;
use crate::services::watch::{self, ChannelBaseline, DiskInfoChannels, ReportChannels};

/// The flag instructing the tool to dump its report and exit.
pub const DUMP_ARGUMENT: &str = "/CopyExit";
/// Fixed-name output file written beside the tool executable.
pub const OUTPUT_FILE_NAME: &str = "DiskInfo.txt";

const EXECUTABLE_CANDIDATES: [&str; 3] = ["DiskInfo64.exe", "DiskInfo32.exe", "DiskInfo.exe"];
const RESOURCE_DIRS: [&str; 2] = ["CdiResource", "Smart"];
// Upper bound on one elevated wrapper run; the per-strategy output wait is
// much shorter and governs the usual pace.
const LAUNCH_TIMEOUT: Duration = Duration::from_secs(180);

/// Where the CrystalDiskInfo installation lives and which files matter.
#[derive(Debug, Clone)]
pub struct ToolLocation {
    pub root: PathBuf,
    pub executable: PathBuf,
    pub output_path: PathBuf,
}

impl ToolLocation {
    /// Validates the installation root: one of the known executables plus
    /// both resource directories must exist.
    pub fn discover(root: &Path) -> Result<Self> {
        let executable = EXECUTABLE_CANDIDATES
            .iter()
            .map(|name| root.join(name))
            .find(|path| path.is_file())
            .ok_or_else(|| {
                CheckError::DependencyMissing(format!(
                    "CrystalDiskInfo executable not found under {}",
                    root.display()
                ))
            })?;

        for dir in RESOURCE_DIRS {
            if !root.join(dir).is_dir() {
                return Err(CheckError::DependencyMissing(format!(
                    "CrystalDiskInfo resource directory '{}' is missing under {}",
                    dir,
                    root.display()
                )));
            }
        }

        let output_path = executable
            .parent()
            .unwrap_or(root)
            .join(OUTPUT_FILE_NAME);
        Ok(ToolLocation {
            root: root.to_path_buf(),
            executable,
            output_path,
        })
    }

    /// Default installation root: `bin/crystaldiskinfo` beside the running
    /// executable.
    pub fn default_root() -> PathBuf {
        let base = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."));
        base.join("bin").join("crystaldiskinfo")
    }
}

/// Diagnostic note for one strategy's outcome, aggregated into the operator
/// log when every strategy comes up empty.
#[derive(Debug, Clone)]
pub struct LaunchAttempt {
    pub strategy: &'static str,
    pub note: String,
}

impl LaunchAttempt {
    fn new(strategy: &'static str, note: impl Into<String>) -> Self {
        LaunchAttempt {
            strategy,
            note: note.into(),
        }
    }
}

/// Drives the ordered strategy sequence against the output channels.
pub struct ReportAcquisition<C: ReportChannels> {
    channels: C,
    strategies: Vec<Box<dyn LaunchStrategy>>,
    executable: PathBuf,
    argument: String,
}

impl ReportAcquisition<DiskInfoChannels> {
    pub fn for_tool(tool: &ToolLocation) -> Self {
        ReportAcquisition::new(
            DiskInfoChannels::new(tool.output_path.clone()),
            launch::default_strategies(),
            tool.executable.clone(),
            DUMP_ARGUMENT,
        )
    }
}

impl<C: ReportChannels> ReportAcquisition<C> {
    pub fn new(
        channels: C,
        strategies: Vec<Box<dyn LaunchStrategy>>,
        executable: PathBuf,
        argument: &str,
    ) -> Self {
        ReportAcquisition {
            channels,
            strategies,
            executable,
            argument: argument.to_string(),
        }
    }

    /// Returns the first qualifying report text, or the terminal error once
    /// every strategy has been tried. Cancellation of the consent prompt
    /// aborts the sequence immediately.
    pub fn acquire_text(&self) -> Result<String> {
        if self.strategies.is_empty() {
            return Err(CheckError::System(
                "no launch strategies are available on this platform".to_string(),
            ));
        }

        let mut baseline = self.snapshot_baseline();
        let mut attempts: Vec<LaunchAttempt> = Vec::new();

        for strategy in &self.strategies {
            let name = strategy.name();
            info!("Trying launch strategy {name}");

            match strategy.launch(&self.executable, &self.argument, LAUNCH_TIMEOUT) {
                Err(CheckError::ElevationCancelled) => {
                    info!("Elevation prompt cancelled; aborting acquisition");
                    return Err(CheckError::ElevationCancelled);
                }
                Err(err) => {
                    attempts.push(LaunchAttempt::new(name, format!("launch failed ({err})")));
                    continue;
                }
                Ok(code) if code != 0 => {
                    attempts.push(LaunchAttempt::new(name, format!("exit code {code}")));
                }
                Ok(_) => {}
            }

            if let Some(text) = watch::await_report(&self.channels, &baseline, strategy.wait_budget())
            {
                info!("Strategy {name} produced report output ({} chars)", text.len());
                return Ok(text);
            }

            attempts.push(LaunchAttempt::new(name, "no output"));
            // A failed attempt may still have replaced the clipboard; rebase
            // so the next attempt's change detection stays meaningful.
            if let Some(text) = self.channels.read_clipboard() {
                baseline.clipboard_text = text;
            }
        }

        let issues: Vec<String> = attempts
            .iter()
            .take(6)
            .map(|attempt| format!("{}: {}", attempt.strategy, attempt.note))
            .collect();
        warn!("Disk check launch issues: {}", issues.join(" | "));
        Err(CheckError::Exhausted)
    }

    fn snapshot_baseline(&self) -> ChannelBaseline {
        let mut file_bytes = self.channels.read_output_file().unwrap_or_default();
        if !file_bytes.is_empty() {
            // Delete the stale dump so a later read unambiguously reflects a
            // fresh run; on failure keep the bytes for content comparison.
            if self.channels.delete_output_file() {
                file_bytes.clear();
            }
        }
        ChannelBaseline {
            file_bytes,
            clipboard_text: self.channels.read_clipboard().unwrap_or_default(),
        }
    }

    /// Acquires and parses a report. Zero parsed records is its own error
    /// so a format mismatch is distinguishable from a launch failure.
    pub fn collect_records(&self) -> Result<Vec<DiskHealthRecord>> {
        let text = self.acquire_text()?;
        let records = parser::parse_report(&text);
        if records.is_empty() {
            return Err(CheckError::ParseEmpty);
        }
        Ok(records)
    }
}

lazy_static! {
    static ref CHECK_ACTIVE: Mutex<bool> = Mutex::new(false);
}

/// Single-flight guard: only one acquisition may be in flight system-wide,
/// since two would race over the same output file, clipboard, and elevation
/// prompts. Released on drop along every exit path.
pub struct CheckGuard {
    _private: (),
}

impl CheckGuard {
    pub fn try_acquire() -> Option<CheckGuard> {
        let mut active = CHECK_ACTIVE
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if *active {
            return None;
        }
        *active = true;
        Some(CheckGuard { _private: () })
    }
}

impl Drop for CheckGuard {
    fn drop(&mut self) {
        let mut active = CHECK_ACTIVE
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *active = false;
    }
}

/// Everything one successful acquisition yields.
#[derive(Debug, Clone)]
pub struct CheckOutcome {
    pub records: Vec<DiskHealthRecord>,
    pub report: HealthReport,
}

fn run_pipeline(tool_root: Option<PathBuf>) -> Result<CheckOutcome> {
    let root = tool_root.unwrap_or_else(ToolLocation::default_root);
    let tool = ToolLocation::discover(&root)?;
    info!("Using tool at {}", tool.executable.display());

    let acquisition = ReportAcquisition::for_tool(&tool);
    let records = acquisition.collect_records()?;
    let report = build_report(&records);
    Ok(CheckOutcome { records, report })
}

/// Runs one acquisition on the calling thread, rejecting a second trigger
/// while another is active.
pub fn run_check(tool_root: Option<PathBuf>) -> Result<CheckOutcome> {
    let _guard = CheckGuard::try_acquire().ok_or(CheckError::AlreadyRunning)?;
    run_pipeline(tool_root)
}

/// Runs one acquisition on a dedicated worker thread and hands the outcome
/// to `present`. Returns the already-running error instead of queueing when
/// an acquisition is in flight.
pub fn spawn_check<F>(tool_root: Option<PathBuf>, present: F) -> Result<thread::JoinHandle<()>>
where
    F: FnOnce(Result<CheckOutcome>) + Send + 'static,
{
    let guard = CheckGuard::try_acquire().ok_or(CheckError::AlreadyRunning)?;
    let handle = thread::Builder::new()
        .name("disk-check".to_string())
        .spawn(move || {
            let _guard = guard;
            present(run_pipeline(tool_root));
        })?;
    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use crate::services::watch::tests::{TestChannels, SAMPLE_REPORT};

    type LaunchFn = Box<dyn Fn() -> Result<i32> + Send + Sync>;

    struct TestStrategy {
        name: &'static str,
        calls: Arc<AtomicUsize>,
        action: LaunchFn,
    }

    impl TestStrategy {
        fn new(
            name: &'static str,
            action: impl Fn() -> Result<i32> + Send + Sync + 'static,
        ) -> (Box<dyn LaunchStrategy>, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let strategy = TestStrategy {
                name,
                calls: calls.clone(),
                action: Box::new(action),
            };
            (Box::new(strategy), calls)
        }
    }

    impl LaunchStrategy for TestStrategy {
        fn name(&self) -> &'static str {
            self.name
        }

        fn wait_budget(&self) -> Duration {
            Duration::ZERO
        }

        fn launch(&self, _executable: &Path, _argument: &str, _timeout: Duration) -> Result<i32> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.action)()
        }
    }

    fn acquisition(
        channels: TestChannels,
        strategies: Vec<Box<dyn LaunchStrategy>>,
    ) -> ReportAcquisition<TestChannels> {
        ReportAcquisition::new(
            channels,
            strategies,
            PathBuf::from("DiskInfo64.exe"),
            DUMP_ARGUMENT,
        )
    }

    #[test]
    fn cancellation_short_circuits_remaining_strategies() {
        let channels = TestChannels::default();
        let (first, first_calls) =
            TestStrategy::new("cancelled", || Err(CheckError::ElevationCancelled));
        let (second, second_calls) = TestStrategy::new("never-reached", || Ok(0));

        let result = acquisition(channels, vec![first, second]).acquire_text();
        assert!(matches!(result, Err(CheckError::ElevationCancelled)));
        assert_eq!(first_calls.load(Ordering::SeqCst), 1);
        assert_eq!(second_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn later_strategy_rescues_the_acquisition() {
        let channels = TestChannels::default();
        let clipboard = channels.clipboard.clone();

        let (first, _) = TestStrategy::new("silent-one", || Ok(0));
        let (second, _) = TestStrategy::new("silent-two", || Ok(3));
        let (third, third_calls) = TestStrategy::new("producer", move || {
            *clipboard.lock().unwrap() = Some(SAMPLE_REPORT.to_string());
            Ok(0)
        });

        let records = acquisition(channels, vec![first, second, third])
            .collect_records()
            .unwrap();
        assert_eq!(third_calls.load(Ordering::SeqCst), 1);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].friendly_name, "Test Disk");
        assert_eq!(records[0].health_percent, Some(100));
    }

    #[test]
    fn exhaustion_is_terminal_and_generic() {
        let channels = TestChannels::default();
        let (first, _) = TestStrategy::new("silent-one", || Ok(1));
        let (second, _) =
            TestStrategy::new("broken", || Err(CheckError::LaunchFailed("nope".into())));

        let result = acquisition(channels, vec![first, second]).acquire_text();
        assert!(matches!(result, Err(CheckError::Exhausted)));
    }

    #[test]
    fn unparseable_output_is_distinct_from_exhaustion() {
        let channels = TestChannels::default();
        let clipboard = channels.clipboard.clone();
        // Passes the signature check but resolves to zero named records.
        let junk = "CrystalDiskInfo 9.2.2\n (1)   \n Health Status : Good\n";
        let (only, _) = TestStrategy::new("producer", move || {
            *clipboard.lock().unwrap() = Some(junk.to_string());
            Ok(0)
        });

        let result = acquisition(channels, vec![only]).collect_records();
        assert!(matches!(result, Err(CheckError::ParseEmpty)));
    }

    #[test]
    fn stale_output_file_is_removed_from_baseline() {
        let channels = TestChannels::default();
        *channels.file.lock().unwrap() = Some(b"old dump".to_vec());

        let (only, _) = TestStrategy::new("silent", || Ok(0));
        let acq = acquisition(channels.clone(), vec![only]);
        let baseline = acq.snapshot_baseline();
        assert!(baseline.file_bytes.is_empty());
        assert!(channels.file.lock().unwrap().is_none());
    }

    #[test]
    fn second_trigger_is_rejected_while_active() {
        let guard = CheckGuard::try_acquire().expect("first acquire");
        assert!(CheckGuard::try_acquire().is_none());
        drop(guard);
        assert!(CheckGuard::try_acquire().is_some());
    }
}
