//! Check how much free space of a btrfs volume is stuck in allocated chunks

use clap::Parser;

use btrfs_checks::checks::fragmentation::{self, FragmentationLimits};
use btrfs_checks::cli::{self, CommonArgs};
use btrfs_checks::runner;

/// Check fragmentation of the free space of a btrfs volume
///
/// Free space inside allocated chunks can only be used by the pool owning
/// the chunk; `btrfs balance` gives it back. LIMIT is a percentage of the
/// metric's maximum (50%) or a size (512M, 2GiB, 1048576).
#[derive(Parser, Debug)]
#[command(name = "check-btrfs-fragmentation", version)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    #[command(flatten)]
    limits: FragmentationLimits,
}

fn main() {
    let cli: Cli = cli::parse();
    let status = runner::run(&cli.common, |report, cfg| {
        let limits = cli.limits.clone().or(cfg.fragmentation.clone());
        fragmentation::evaluate(report, &limits)
    });
    status.exit();
}
