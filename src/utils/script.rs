//! Temporary wrapper scripts for the elevated launch strategies.
//!
//! Each script is exclusively owned by the strategy that wrote it and must
//! disappear on every exit path, so deletion lives in `Drop`.

use std::fs;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::error::Result;

/// A temp-directory script file removed when the owner goes out of scope.
pub struct TempScript {
    path: PathBuf,
}

impl TempScript {
    /// Writes `contents` verbatim to a uniquely named file in the system
    /// temp directory.
    pub fn write(extension: &str, contents: &[u8]) -> Result<Self> {
        let file_name = format!("disk-checker-{}.{}", Uuid::new_v4().simple(), extension);
        let path = std::env::temp_dir().join(file_name);
        fs::write(&path, contents)?;
        Ok(TempScript { path })
    }

    /// Writes text re-encoded as UTF-16LE with a BOM, which is what
    /// wscript.exe expects for Unicode VBScript sources.
    pub fn write_utf16(extension: &str, text: &str) -> Result<Self> {
        let mut data: Vec<u8> = vec![0xFF, 0xFE];
        for unit in text.encode_utf16() {
            data.extend_from_slice(&unit.to_le_bytes());
        }
        Self::write(extension, &data)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempScript {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

/// Minimal Windows command-line quoting: wrap in quotes when the argument
/// contains whitespace, doubling embedded quotes.
pub fn quote_arg(arg: &str) -> String {
    if !arg.is_empty() && !arg.chars().any(|c| c.is_whitespace() || c == '"') {
        return arg.to_string();
    }
    format!("\"{}\"", arg.replace('"', "\"\""))
}

/// Joins program and argument into one command line for script embedding.
pub fn build_command_line(program: &str, argument: &str) -> String {
    if argument.is_empty() {
        quote_arg(program)
    } else {
        format!("{} {}", quote_arg(program), quote_arg(argument))
    }
}

/// VBScript string literal with embedded quotes doubled.
pub fn vbs_string_literal(text: &str) -> String {
    format!("\"{}\"", text.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_file_is_removed_on_drop() {
        let path = {
            let script = TempScript::write("cmd", b"@echo off\r\n").unwrap();
            assert!(script.path().is_file());
            script.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn utf16_script_carries_bom() {
        let script = TempScript::write_utf16("vbs", "WScript.Quit 0").unwrap();
        let data = fs::read(script.path()).unwrap();
        assert_eq!(&data[..2], &[0xFF, 0xFE]);
    }

    #[test]
    fn quoting_only_when_needed() {
        assert_eq!(quote_arg("/CopyExit"), "/CopyExit");
        assert_eq!(
            quote_arg(r"C:\Program Files\DiskInfo64.exe"),
            r#""C:\Program Files\DiskInfo64.exe""#
        );
        assert_eq!(
            build_command_line("DiskInfo64.exe", "/CopyExit"),
            "DiskInfo64.exe /CopyExit"
        );
        assert_eq!(vbs_string_literal(r#"say "hi""#), r#""say ""hi""""#);
    }
}
