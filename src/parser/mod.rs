//! Parser for CrystalDiskInfo's free-form text report.
//!
//! The dump is a loose sequence of `(N) <label>` disk sections holding
//! `key : value` lines, preceded by a disk-picker listing whose entries look
//! almost like section headers. The grammar is versioned by example only, so
//! unrecognized lines are ignored rather than rejected.

pub mod text;

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::DiskHealthRecord;

lazy_static! {
    // Picker entries carry further text after "name: " on the same line.
    // They must be filtered before header matching or they would open
    // phantom sections.
    static ref DISK_LIST_ENTRY_RE: Regex = Regex::new(r"^\s*\(\d{1,3}\)\s+.+?:\s+").unwrap();
    static ref DISK_HEADER_RE: Regex = Regex::new(r"^\s*\((\d{1,3})\)\s+(.+?)\s*$").unwrap();
    static ref KEY_VALUE_RE: Regex =
        Regex::new(r"^\s*([A-Za-z][A-Za-z0-9 #/_().+-]{1,60})\s*:\s*(.+?)\s*$").unwrap();
}

/// Transient parse unit: one disk's header plus the raw lines below it.
struct ReportSection {
    number: Option<u32>,
    header_name: String,
    lines: Vec<String>,
}

fn split_disk_sections(raw_text: &str) -> Vec<ReportSection> {
    let mut sections = Vec::new();
    let mut current: Option<ReportSection> = None;

    for raw_line in raw_text.lines() {
        let line = raw_line.trim_end();
        if DISK_LIST_ENTRY_RE.is_match(line) {
            continue;
        }

        if let Some(caps) = DISK_HEADER_RE.captures(line) {
            if let Some(section) = current.take() {
                sections.push(section);
            }
            current = Some(ReportSection {
                number: caps.get(1).and_then(|m| m.as_str().parse().ok()),
                header_name: caps.get(2).map_or(String::new(), |m| m.as_str().to_string()),
                lines: Vec::new(),
            });
            continue;
        }

        if let Some(section) = current.as_mut() {
            section.lines.push(line.to_string());
        }
    }

    if let Some(section) = current {
        sections.push(section);
    }
    sections
}

/// `key : value` lines of a section. Returns the first-wins lookup value per
/// lower-cased key alongside the display list in first-occurrence order.
fn parse_section_properties(lines: &[String]) -> Vec<(String, String)> {
    let mut ordered: Vec<(String, String)> = Vec::new();
    for line in lines {
        let caps = match KEY_VALUE_RE.captures(line) {
            Some(caps) => caps,
            None => continue,
        };
        let key_display = caps.get(1).map_or("", |m| m.as_str()).trim();
        let value = caps.get(2).map_or("", |m| m.as_str()).trim();
        if key_display.is_empty() || value.is_empty() {
            continue;
        }
        let seen = ordered
            .iter()
            .any(|(key, _)| key.eq_ignore_ascii_case(key_display));
        if !seen {
            ordered.push((key_display.to_string(), value.to_string()));
        }
    }
    ordered
}

fn property<'a>(properties: &'a [(String, String)], key: &str) -> &'a str {
    properties
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map_or("", |(_, v)| v.as_str())
}

fn build_record_from_section(section: &ReportSection) -> DiskHealthRecord {
    let properties = parse_section_properties(&section.lines);

    let model = property(&properties, "model");
    let friendly_name = if model.is_empty() {
        section.header_name.trim().to_string()
    } else {
        model.to_string()
    };
    let serial_number = property(&properties, "serial number").to_string();
    let size_bytes = text::parse_size_bytes(property(&properties, "disk size"));
    let interface = property(&properties, "interface");
    let rotation = property(&properties, "rotation rate");

    let health_status = {
        let raw = property(&properties, "health status");
        if raw.is_empty() { "Unknown" } else { raw }.to_string()
    };
    let health_percent = text::parse_health_percent(&health_status);
    let health_code = text::parse_health_code(&health_status, health_percent);
    let temperature_c = text::parse_temperature(property(&properties, "temperature"));
    let power_on_hours = text::parse_int(property(&properties, "power on hours"));

    let media_type = text::infer_media_type(interface, rotation, &friendly_name);
    let wear_percent = health_percent.map(|percent| 100 - percent.min(100));

    DiskHealthRecord {
        number: section.number,
        friendly_name,
        serial_number,
        size_bytes,
        bus_type: if interface.is_empty() {
            "no data".to_string()
        } else {
            interface.to_string()
        },
        media_type,
        health_status,
        health_percent,
        temperature_c,
        wear_percent,
        power_on_hours,
        health_code,
        properties,
    }
}

/// Parses a raw multi-disk report into normalized records, in section
/// discovery order. Sections without a resolvable model name are dropped.
pub fn parse_report(raw_text: &str) -> Vec<DiskHealthRecord> {
    split_disk_sections(raw_text)
        .iter()
        .map(build_record_from_section)
        .filter(|record| !record.friendly_name.is_empty())
        .collect()
}

/// Heuristic confirming a text blob is a genuine CrystalDiskInfo dump rather
/// than unrelated clipboard or file content.
pub fn looks_like_report(raw_text: &str) -> bool {
    let raw = raw_text.trim();
    if raw.is_empty() || !raw.contains("CrystalDiskInfo") {
        return false;
    }
    raw.lines().any(|line| DISK_HEADER_RE.is_match(line))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HealthCode;

    const TWO_DISK_REPORT: &str = "\
CrystalDiskInfo 9.2.2 (C) 2008-2024 hiyohiyo\r\n\
-- Disk List ---------------------------------------------------------------\r\n\
 (1) Samsung SSD 970 EVO 500GB : 500.1 GB [0/0/0, pd1]\r\n\
 (2) WDC WD10EZEX-08WN4A0 : 1000.2 GB [1/0/0, pd1]\r\n\
\r\n\
 (1) Samsung SSD 970 EVO 500GB\r\n\
           Model : Samsung SSD 970 EVO 500GB\r\n\
   Serial Number : S466NX0M123456\r\n\
       Disk Size : 500.1 GB\r\n\
       Interface : NVM Express\r\n\
   Health Status : Good (100%)\r\n\
     Temperature : 41 C\r\n\
  Power On Hours : 1234 hours\r\n\
\r\n\
 (2) WDC WD10EZEX-08WN4A0\r\n\
           Model : WDC WD10EZEX-08WN4A0\r\n\
   Serial Number : WD-WCC6Y4123456\r\n\
       Disk Size : 1000.2 GB\r\n\
       Interface : Serial ATA\r\n\
   Rotation Rate : 7200 RPM\r\n\
   Health Status : Good (100%)\r\n\
     Temperature : 33 C\r\n";

    #[test]
    fn parses_two_disk_report_in_header_order() {
        let records = parse_report(TWO_DISK_REPORT);
        assert_eq!(records.len(), 2);

        let first = &records[0];
        assert_eq!(first.number, Some(1));
        assert_eq!(first.friendly_name, "Samsung SSD 970 EVO 500GB");
        assert_eq!(first.serial_number, "S466NX0M123456");
        assert_eq!(first.size_bytes, Some(500_100_000_000));
        assert_eq!(first.bus_type, "NVM Express");
        assert_eq!(first.media_type, "SSD");
        assert_eq!(first.health_percent, Some(100));
        assert_eq!(first.health_code, Some(HealthCode::Good));
        assert_eq!(first.wear_percent, Some(0));
        assert_eq!(first.temperature_c, Some(41));
        assert_eq!(first.power_on_hours, Some(1234));

        let second = &records[1];
        assert_eq!(second.number, Some(2));
        assert_eq!(second.media_type, "HDD (7200 RPM)");
        assert_eq!(second.health_percent, Some(100));
        assert_eq!(second.wear_percent, Some(0));
    }

    #[test]
    fn picker_entries_do_not_open_sections() {
        // The two "(N) name : size" picker lines above the sections would
        // otherwise be taken for headers and swallow the real ones.
        let records = parse_report(TWO_DISK_REPORT);
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| !r.friendly_name.contains(':')));
    }

    #[test]
    fn first_occurrence_of_a_key_wins() {
        let report = "\
CrystalDiskInfo test\n\
 (1) Disk\n\
 Model : First\n\
 model : Second\n\
 Temperature : 35 C\n";
        let records = parse_report(report);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].friendly_name, "First");
        assert_eq!(
            records[0].properties,
            vec![
                ("Model".to_string(), "First".to_string()),
                ("Temperature".to_string(), "35 C".to_string()),
            ]
        );
    }

    #[test]
    fn section_without_name_is_dropped() {
        // Second section has a blank header label and no Model line, so its
        // name resolves empty and the record is discarded.
        let report = "\
CrystalDiskInfo test\n\
 (1) Good Disk\n\
 Model : Keeper\n\
 (2)   \n\
 Health Status : Good\n";
        let records = parse_report(report);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].friendly_name, "Keeper");
    }

    #[test]
    fn unknown_status_yields_no_health_data() {
        let report = "\
CrystalDiskInfo test\n\
 (1) Mystery Disk\n\
 Model : Mystery\n";
        let records = parse_report(report);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].health_status, "Unknown");
        assert_eq!(records[0].health_percent, None);
        assert_eq!(records[0].health_code, None);
        assert_eq!(records[0].wear_percent, None);
        assert_eq!(records[0].bus_type, "no data");
        assert_eq!(records[0].media_type, "no data");
    }

    #[test]
    fn signature_requires_banner_and_header() {
        assert!(looks_like_report(TWO_DISK_REPORT));
        assert!(!looks_like_report(""));
        assert!(!looks_like_report("CrystalDiskInfo 9.2.2 but no sections"));
        assert!(!looks_like_report(" (1) Disk\n Model : X\n"));
    }
}
