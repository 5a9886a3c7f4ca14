use crate::alerts::{CheckResult, Status};
use crate::cli::CommonArgs;
use crate::collectors::btrfs;
use crate::config::Config;
use crate::logging;
use crate::models::usage::UsageReport;
use anyhow::{Context, Result};

/// Run a check end to end and print its status line.
///
/// Any error along the way (config, command, report format) is printed as an
/// `UNKNOWN` status line.
pub fn run<F>(common: &CommonArgs, evaluate: F) -> Status
where
    F: FnOnce(&UsageReport, &Config) -> CheckResult,
{
    logging::init_tracing(common.verbose);
    match try_run(common, evaluate) {
        Ok(status) => status,
        Err(err) => {
            tracing::debug!("{:?}", err);
            println!("{}: {:#}", Status::Unknown.label(), err);
            Status::Unknown
        }
    }
}

fn try_run<F>(common: &CommonArgs, evaluate: F) -> Result<Status>
where
    F: FnOnce(&UsageReport, &Config) -> CheckResult,
{
    let cfg = Config::load(common.config.as_deref()).context("loading configuration")?;
    let report = btrfs::read_usage(&cfg.command, &common.mount)
        .with_context(|| format!("reading usage of {}", common.mount.display()))?;

    if common.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(Status::Ok);
    }

    let result = evaluate(&report, &cfg);
    println!("{}", result.status_line());
    Ok(result.status())
}
