//! Locale-tolerant text extraction helpers for the report parser.
//!
//! Every function here is total: malformed input yields `None` (or a
//! sentinel string), never an error. The upstream tool's formatting is not a
//! controlled contract, so these lean on loose regex matching.

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::HealthCode;

lazy_static! {
    static ref INT_RE: Regex = Regex::new(r"-?\d+").unwrap();
    static ref FLOAT_RE: Regex = Regex::new(r"-?\d+(?:[.,]\d+)?").unwrap();
    static ref PERCENT_RE: Regex = Regex::new(r"(\d{1,3})\s*%").unwrap();
    static ref SIZE_RE: Regex =
        Regex::new(r"(?i)([0-9][0-9\s.,]*)\s*(B|KB|MB|GB|TB|PB)\b").unwrap();
    static ref TEMP_RE: Regex = Regex::new(r"(?i)(-?\d+)\s*C\b").unwrap();
    static ref RPM_RE: Regex = Regex::new(r"(?i)(\d+)\s*RPM").unwrap();
}

const HEALTH_GOOD_KEYWORDS: [&str; 3] = ["good", "healthy", "ok"];
const HEALTH_WARN_KEYWORDS: [&str; 3] = ["caution", "warning", "degraded"];
const HEALTH_BAD_KEYWORDS: [&str; 4] = ["bad", "failed", "critical", "error"];

const SIZE_UNITS: [(&str, u64); 6] = [
    ("B", 1),
    ("KB", 1_000),
    ("MB", 1_000_000),
    ("GB", 1_000_000_000),
    ("TB", 1_000_000_000_000),
    ("PB", 1_000_000_000_000_000),
];

/// First signed integer found in `text`, full-string parse tried first.
pub fn parse_int(text: &str) -> Option<i64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(value) = text.parse::<i64>() {
        return Some(value);
    }
    INT_RE.find(text)?.as_str().parse().ok()
}

/// First signed decimal found in `text`, accepting `,` as fraction separator.
pub fn parse_float(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    FLOAT_RE
        .find(text)?
        .as_str()
        .replace(',', ".")
        .parse()
        .ok()
}

/// Number plus unit suffix (B..PB, case-insensitive) to a decimal byte count.
pub fn parse_size_bytes(text: &str) -> Option<u64> {
    let caps = SIZE_RE.captures(text.trim())?;
    let value = parse_float(caps.get(1)?.as_str())?;
    let unit = caps.get(2)?.as_str().to_ascii_uppercase();
    let multiplier = SIZE_UNITS
        .iter()
        .find(|(name, _)| *name == unit)
        .map(|(_, m)| *m)?;
    if value < 0.0 {
        return None;
    }
    Some((value * multiplier as f64).round() as u64)
}

/// `<int> C` or a bare integer; readings outside [-40, 150] are rejected.
pub fn parse_temperature(text: &str) -> Option<i32> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let value = match TEMP_RE.captures(text) {
        Some(caps) => parse_int(caps.get(1)?.as_str())?,
        None => parse_int(text)?,
    };
    if (-40..=150).contains(&value) {
        Some(value as i32)
    } else {
        None
    }
}

/// `<int> RPM`, case-insensitive.
pub fn parse_rotation_rate(text: &str) -> Option<u32> {
    let caps = RPM_RE.captures(text.trim())?;
    parse_int(caps.get(1)?.as_str()).and_then(|v| u32::try_from(v).ok())
}

fn contains_any(lowered: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| lowered.contains(k))
}

/// Health percentage from a status phrase. An embedded `NN%` wins over the
/// keyword cascade; keywords map bad -> 0, warning -> 50, good -> 100, with
/// bad checked first so "critical error (was good)" stays bad.
pub fn parse_health_percent(status_text: &str) -> Option<u8> {
    let text = status_text.trim();
    if text.is_empty() {
        return None;
    }
    if let Some(caps) = PERCENT_RE.captures(text) {
        let value = parse_int(caps.get(1)?.as_str())?;
        return Some(value.clamp(0, 100) as u8);
    }

    let lowered = text.to_lowercase();
    if contains_any(&lowered, &HEALTH_BAD_KEYWORDS) {
        Some(0)
    } else if contains_any(&lowered, &HEALTH_WARN_KEYWORDS) {
        Some(50)
    } else if contains_any(&lowered, &HEALTH_GOOD_KEYWORDS) {
        Some(100)
    } else {
        None
    }
}

/// Health classification: keyword cascade first, then a threshold on the
/// already-derived percentage (>= 80 is Good, below is Warning).
pub fn parse_health_code(status_text: &str, health_percent: Option<u8>) -> Option<HealthCode> {
    let lowered = status_text.trim().to_lowercase();
    if !lowered.is_empty() {
        if contains_any(&lowered, &HEALTH_BAD_KEYWORDS) {
            return Some(HealthCode::Bad);
        }
        if contains_any(&lowered, &HEALTH_WARN_KEYWORDS) {
            return Some(HealthCode::Warning);
        }
        if contains_any(&lowered, &HEALTH_GOOD_KEYWORDS) {
            return Some(HealthCode::Good);
        }
    }
    health_percent.map(|percent| {
        if percent >= 80 {
            HealthCode::Good
        } else {
            HealthCode::Warning
        }
    })
}

/// Media type from the section's interface, rotation rate and model fields.
/// A positive rotation rate always wins over interface keywords.
pub fn infer_media_type(interface_text: &str, rotation_text: &str, model_name: &str) -> String {
    if let Some(rpm) = parse_rotation_rate(rotation_text) {
        if rpm > 0 {
            return format!("HDD ({} RPM)", rpm);
        }
    }

    let combined = format!("{} {}", interface_text, model_name).to_uppercase();
    if combined.contains("NVME") || combined.contains("NVM EXPRESS") || combined.contains("SSD") {
        return "SSD".to_string();
    }
    "no data".to_string()
}

/// Human-readable size with binary (1024) scaling and two decimals.
pub fn format_size(size_bytes: Option<u64>) -> String {
    let size = match size_bytes {
        Some(size) => size,
        None => return "no data".to_string(),
    };
    if size == 0 {
        return "0 B".to_string();
    }
    let units = ["B", "KB", "MB", "GB", "TB", "PB"];
    let mut value = size as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < units.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.2} {}", value, units[unit])
}
