// Library root: re-exports all modules so integration tests and the binary
// share one public API.

pub mod cli;
pub mod config;
pub mod estimates;
pub mod inputs;
pub mod report;
pub mod runner;
