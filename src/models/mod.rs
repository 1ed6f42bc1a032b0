use serde::{Deserialize, Serialize};

/// Coarse health classification derived from the tool's status phrase,
/// falling back to a threshold on the health percentage.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthCode {
    Good,
    Warning,
    Bad,
}

/// One physical disk's normalized state, built once from a parsed report
/// section and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DiskHealthRecord {
    /// Disk index as reported; `None` when the header index was unparseable.
    pub number: Option<u32>,
    /// Model name. Sections resolving to an empty name are discarded.
    pub friendly_name: String,
    pub serial_number: String,
    /// Decimal (1000-based) byte count.
    pub size_bytes: Option<u64>,
    /// Interface label, or the "no data" sentinel.
    pub bus_type: String,
    /// "SSD", "HDD (<n> RPM)", or "no data".
    pub media_type: String,
    /// Raw status phrase from the source tool.
    pub health_status: String,
    /// Clamped to [0, 100].
    pub health_percent: Option<u8>,
    /// Accepted only inside [-40, 150]; out-of-range readings parse as None.
    pub temperature_c: Option<i32>,
    /// Derived as `100 - health_percent`; never read from source text.
    pub wear_percent: Option<u8>,
    pub power_on_hours: Option<i64>,
    pub health_code: Option<HealthCode>,
    /// Every `key : value` line of the disk's section, first occurrence of a
    /// key wins, insertion order preserved for display.
    pub properties: Vec<(String, String)>,
}

/// Rendered output of one successful acquisition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthReport {
    pub summary: String,
    pub details: String,
}
