//! Renders normalized disk records into the summary line and detail blocks
//! handed to the presentation layer. Pure functions of their input.

use crate::models::{DiskHealthRecord, HealthCode, HealthReport};
use crate::utils::display_or;

/// Alert heuristic: degraded health percentage, a non-good classification,
/// or a temperature at or past 60 C.
pub fn is_bad_health(record: &DiskHealthRecord) -> bool {
    if let Some(percent) = record.health_percent {
        if percent < 80 {
            return true;
        }
    }
    if matches!(
        record.health_code,
        Some(HealthCode::Warning) | Some(HealthCode::Bad)
    ) {
        return true;
    }
    if let Some(temperature) = record.temperature_c {
        if temperature >= 60 {
            return true;
        }
    }
    false
}

fn render_record(record: &DiskHealthRecord, alert: bool) -> String {
    let state_label = if alert { "ALERT" } else { "OK" };
    let number = display_or(record.number, "?");
    let name = if record.friendly_name.is_empty() {
        "no data".to_string()
    } else {
        record.friendly_name.clone()
    };
    let health = record
        .health_percent
        .map(|p| format!("{p}%"))
        .unwrap_or_else(|| "no data".to_string());
    let temperature = record
        .temperature_c
        .map(|t| format!("{t} C"))
        .unwrap_or_else(|| "no data".to_string());

    let mut parts = vec![
        format!("[{state_label}] Disk {number}: {name}"),
        format!("  Health: {health}"),
        format!("  Temperature: {temperature}"),
    ];
    for (key, value) in &record.properties {
        let key = key.trim();
        let value = value.trim();
        if key.is_empty() || value.is_empty() {
            continue;
        }
        parts.push(format!("  {key}: {value}"));
    }
    parts.join("\n")
}

/// Builds the two presentation strings from the record list. Records are
/// rendered sorted by disk number, unknown numbers last.
pub fn build_report(records: &[DiskHealthRecord]) -> HealthReport {
    if records.is_empty() {
        return HealthReport {
            summary: "No physical disks were detected.".to_string(),
            details: "The tool did not return any physical disks.".to_string(),
        };
    }

    let mut sorted: Vec<&DiskHealthRecord> = records.iter().collect();
    sorted.sort_by_key(|record| (record.number.is_none(), record.number));

    let mut alerts = 0;
    let mut blocks = Vec::with_capacity(sorted.len());
    for record in sorted {
        let alert = is_bad_health(record);
        if alert {
            alerts += 1;
        }
        blocks.push(render_record(record, alert));
    }

    let healthy = records.len() - alerts;
    HealthReport {
        summary: format!(
            "Disks: {}. Healthy: {}. Alerts: {}.",
            records.len(),
            healthy,
            alerts
        ),
        details: blocks.join("\n\n"),
    }
}
