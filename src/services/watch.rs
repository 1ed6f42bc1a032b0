//! Output channel reader: polls the tool's output file and the system
//! clipboard for a fresh report, with change detection against a baseline
//! snapshot so a stale dump from an earlier run is never reprocessed.

use std::fs;
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use crate::parser;
use crate::platform;
use crate::utils::encoding::decode_report_bytes;

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// The two observation points a dump can land on. Abstracted so the
/// acquisition loop can be driven with in-memory channels in tests.
pub trait ReportChannels {
    /// Raw bytes of the output file, `None` when absent or unreadable.
    fn read_output_file(&self) -> Option<Vec<u8>>;
    /// Best-effort delete; returns whether the file is gone.
    fn delete_output_file(&self) -> bool;
    /// Current clipboard text, `None` when empty or unavailable.
    fn read_clipboard(&self) -> Option<String>;
}

/// Filesystem output file plus the system clipboard.
pub struct DiskInfoChannels {
    output_path: PathBuf,
}

impl DiskInfoChannels {
    pub fn new(output_path: PathBuf) -> Self {
        DiskInfoChannels { output_path }
    }
}

impl ReportChannels for DiskInfoChannels {
    fn read_output_file(&self) -> Option<Vec<u8>> {
        fs::read(&self.output_path).ok()
    }

    fn delete_output_file(&self) -> bool {
        fs::remove_file(&self.output_path).is_ok() || !self.output_path.exists()
    }

    fn read_clipboard(&self) -> Option<String> {
        platform::read_clipboard_text()
    }
}

/// Snapshot of both channels taken before launching the tool.
#[derive(Debug, Clone, Default)]
pub struct ChannelBaseline {
    pub file_bytes: Vec<u8>,
    pub clipboard_text: String,
}

fn check_output_file<C: ReportChannels>(channels: &C, baseline: &ChannelBaseline) -> Option<String> {
    let data = channels.read_output_file()?;
    if data.is_empty() {
        return None;
    }
    let text = decode_report_bytes(&data);
    if !parser::looks_like_report(&text) {
        return None;
    }
    if baseline.file_bytes.is_empty() || data != baseline.file_bytes {
        Some(text)
    } else {
        None
    }
}

fn check_clipboard<C: ReportChannels>(channels: &C, baseline: &ChannelBaseline) -> Option<String> {
    let text = channels.read_clipboard()?;
    if text.trim().is_empty() {
        return None;
    }
    if !baseline.clipboard_text.is_empty() && text == baseline.clipboard_text {
        return None;
    }
    if parser::looks_like_report(&text) {
        Some(text)
    } else {
        None
    }
}

fn poll_once<C: ReportChannels>(channels: &C, baseline: &ChannelBaseline) -> Option<String> {
    check_output_file(channels, baseline).or_else(|| check_clipboard(channels, baseline))
}

/// Polls both channels until one yields a qualifying report or `max_wait`
/// elapses; a final check runs past the deadline before giving up.
pub fn await_report<C: ReportChannels>(
    channels: &C,
    baseline: &ChannelBaseline,
    max_wait: Duration,
) -> Option<String> {
    let deadline = Instant::now() + max_wait;
    while Instant::now() < deadline {
        if let Some(text) = poll_once(channels, baseline) {
            return Some(text);
        }
        thread::sleep(POLL_INTERVAL);
    }
    poll_once(channels, baseline)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    pub(crate) const SAMPLE_REPORT: &str = "\
CrystalDiskInfo 9.2.2\n\
 (1) Test Disk\n\
 Model : Test Disk\n\
 Health Status : Good (100%)\n";

    /// In-memory channels for driving the poll loop and the orchestrator.
    #[derive(Clone, Default)]
    pub(crate) struct TestChannels {
        pub file: Arc<Mutex<Option<Vec<u8>>>>,
        pub clipboard: Arc<Mutex<Option<String>>>,
    }

    impl ReportChannels for TestChannels {
        fn read_output_file(&self) -> Option<Vec<u8>> {
            self.file.lock().unwrap().clone()
        }

        fn delete_output_file(&self) -> bool {
            *self.file.lock().unwrap() = None;
            true
        }

        fn read_clipboard(&self) -> Option<String> {
            self.clipboard.lock().unwrap().clone()
        }
    }

    #[test]
    fn file_channel_requires_change_and_signature() {
        let channels = TestChannels::default();
        let baseline = ChannelBaseline {
            file_bytes: SAMPLE_REPORT.as_bytes().to_vec(),
            clipboard_text: String::new(),
        };

        // Same bytes as the baseline: stale, ignored.
        *channels.file.lock().unwrap() = Some(SAMPLE_REPORT.as_bytes().to_vec());
        assert_eq!(await_report(&channels, &baseline, Duration::ZERO), None);

        // Different bytes but not a report: ignored.
        *channels.file.lock().unwrap() = Some(b"grocery list".to_vec());
        assert_eq!(await_report(&channels, &baseline, Duration::ZERO), None);

        // Fresh qualifying dump: returned.
        let fresh = format!("{} Temperature : 35 C\n", SAMPLE_REPORT);
        *channels.file.lock().unwrap() = Some(fresh.as_bytes().to_vec());
        assert_eq!(
            await_report(&channels, &baseline, Duration::ZERO),
            Some(fresh)
        );
    }

    #[test]
    fn clipboard_channel_ignores_baseline_text() {
        let channels = TestChannels::default();
        let baseline = ChannelBaseline {
            file_bytes: Vec::new(),
            clipboard_text: SAMPLE_REPORT.to_string(),
        };

        *channels.clipboard.lock().unwrap() = Some(SAMPLE_REPORT.to_string());
        assert_eq!(await_report(&channels, &baseline, Duration::ZERO), None);

        let fresh = format!("{} Temperature : 35 C\n", SAMPLE_REPORT);
        *channels.clipboard.lock().unwrap() = Some(fresh.clone());
        assert_eq!(
            await_report(&channels, &baseline, Duration::ZERO),
            Some(fresh)
        );
    }

    #[test]
    fn file_wins_over_clipboard() {
        let channels = TestChannels::default();
        let baseline = ChannelBaseline::default();
        let file_report = SAMPLE_REPORT.replace("Test Disk", "File Disk");

        *channels.file.lock().unwrap() = Some(file_report.as_bytes().to_vec());
        *channels.clipboard.lock().unwrap() = Some(SAMPLE_REPORT.to_string());
        assert_eq!(
            await_report(&channels, &baseline, Duration::ZERO),
            Some(file_report)
        );
    }

    #[test]
    fn reads_real_output_file_with_bom() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("DiskInfo.txt");
        let mut data = vec![0xFF, 0xFE];
        for unit in SAMPLE_REPORT.encode_utf16() {
            data.extend_from_slice(&unit.to_le_bytes());
        }
        std::fs::write(&path, &data).unwrap();

        let channels = DiskInfoChannels::new(path);
        let baseline = ChannelBaseline::default();
        assert_eq!(
            await_report(&channels, &baseline, Duration::ZERO),
            Some(SAMPLE_REPORT.to_string())
        );
    }
}
