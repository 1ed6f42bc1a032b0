use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CheckError>;

#[derive(Error, Debug)]
pub enum CheckError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Missing dependency: {0}")]
    DependencyMissing(String),

    #[error("Elevation prompt was cancelled by the user")]
    ElevationCancelled,

    #[error("Elevated launch failed: {0}")]
    LaunchFailed(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("The tool produced no readable output")]
    NoOutput,

    #[error("All launch strategies were exhausted without output")]
    Exhausted,

    #[error("The report did not contain readable disk data")]
    ParseEmpty,

    #[error("A disk health check is already running")]
    AlreadyRunning,

    #[error("System error: {0}")]
    System(String),
}

impl CheckError {
    pub fn io(err: io::Error) -> Self {
        CheckError::Io(err.to_string())
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, CheckError::ElevationCancelled)
    }
}

impl From<io::Error> for CheckError {
    fn from(err: io::Error) -> Self {
        CheckError::io(err)
    }
}
