//! Check free space of a btrfs volume
//!
//! Looks at the global reserve, the unallocated device space and the free
//! space left to the Data, Metadata and System pools.

use clap::Parser;

use btrfs_checks::checks::usage::{self, UsageLimits};
use btrfs_checks::cli::{self, CommonArgs};
use btrfs_checks::runner;

/// Check free space of a btrfs volume
///
/// LIMIT is a percentage of the metric's maximum (10%) or a size with an
/// optional K, KiB, M, MiB, G or GiB suffix (512M, 2GiB, 1048576).
#[derive(Parser, Debug)]
#[command(name = "check-btrfs-usage", version)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    #[command(flatten)]
    limits: UsageLimits,
}

fn main() {
    let cli: Cli = cli::parse();
    let status = runner::run(&cli.common, |report, cfg| {
        let limits = cli.limits.clone().or(cfg.usage.clone());
        usage::evaluate(report, &limits)
    });
    status.exit();
}
