//! Expense tracker front end: configuration, backend access, snapshot
//! caching, command handling and backups.

pub mod backend;
pub mod backup;
pub mod cache;
pub mod commands;
pub mod config;
pub mod scheduler;
pub mod telemetry;
