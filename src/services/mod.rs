pub mod acquire;
pub mod launch;
pub mod report;
pub mod watch;
