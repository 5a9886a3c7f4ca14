//! Nagios-style checks for btrfs volumes.
//!
//! Both checks run `btrfs filesystem usage -b <mount>`, parse the report and
//! compare the extracted numbers against warning and critical limits. See
//! the `check-btrfs-usage` and `check-btrfs-fragmentation` binaries.

pub mod alerts;
pub mod checks;
pub mod cli;
pub mod collectors;
pub mod config;
pub mod error;
pub mod limits;
pub mod logging;
pub mod models;
pub mod runner;
pub mod util;
