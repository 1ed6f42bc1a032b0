pub mod encoding;
pub mod log;
pub mod script;

/// Display form of an optional value with a "no data" style fallback.
pub fn display_or<T: std::fmt::Display>(value: Option<T>, fallback: &str) -> String {
    match value {
        Some(value) => value.to_string(),
        None => fallback.to_string(),
    }
}
