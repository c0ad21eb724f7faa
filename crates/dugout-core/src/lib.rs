// Shared plumbing for the dashboard: configuration, raw season rows, and the
// store they are read from.

pub mod config;
pub mod db;
pub mod records;
pub mod source;
