//! Fragmentation check
//!
//! btrfs hands out space in chunks. Once a chunk is allocated to a pool, its
//! free space can only be used by that pool, so free space scattered across
//! half empty chunks is what makes a volume run out early. A balance packs
//! the chunks again and returns the space to the unallocated area.

use crate::alerts::{CheckResult, Metric, Trigger};
use crate::limits::Limit;
use crate::models::usage::{UsageReport, DATA, METADATA};
use serde::Deserialize;

#[derive(clap::Args, Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FragmentationLimits {
    /// Warn when free space stuck in allocated chunks exceeds LIMIT
    /// (percentages are of the estimated free space)
    #[arg(short = 'f', long, value_name = "LIMIT")]
    pub stranded_free_warning:  Option<Limit>,
    /// Go critical when free space stuck in allocated chunks exceeds LIMIT
    #[arg(short = 'F', long, value_name = "LIMIT")]
    pub stranded_free_critical: Option<Limit>,

    /// Warn when unused space in data chunks exceeds LIMIT
    /// (percentages are of the data pool size)
    #[arg(short = 'd', long, value_name = "LIMIT")]
    pub data_slack_warning:  Option<Limit>,
    /// Go critical when unused space in data chunks exceeds LIMIT
    #[arg(short = 'D', long, value_name = "LIMIT")]
    pub data_slack_critical: Option<Limit>,

    /// Warn when unused space in metadata chunks exceeds LIMIT
    #[arg(short = 'm', long, value_name = "LIMIT")]
    pub metadata_slack_warning:  Option<Limit>,
    /// Go critical when unused space in metadata chunks exceeds LIMIT
    #[arg(short = 'M', long, value_name = "LIMIT")]
    pub metadata_slack_critical: Option<Limit>,
}

impl FragmentationLimits {
    /// Limits set here, falling back to `other` for the ones that are not.
    pub fn or(self, other: FragmentationLimits) -> FragmentationLimits {
        FragmentationLimits {
            stranded_free_warning:   self.stranded_free_warning.or(other.stranded_free_warning),
            stranded_free_critical:  self.stranded_free_critical.or(other.stranded_free_critical),
            data_slack_warning:      self.data_slack_warning.or(other.data_slack_warning),
            data_slack_critical:     self.data_slack_critical.or(other.data_slack_critical),
            metadata_slack_warning:  self.metadata_slack_warning.or(other.metadata_slack_warning),
            metadata_slack_critical: self.metadata_slack_critical.or(other.metadata_slack_critical),
        }
    }
}

pub fn evaluate(report: &UsageReport, limits: &FragmentationLimits) -> CheckResult {
    let mut result = CheckResult::new();

    let stranded = report.stranded_free();
    if stranded.max > 0 {
        tracing::info!(
            "{:.2}% of the free space is inside allocated chunks",
            stranded.value as f64 / stranded.max as f64 * 100.0
        );
    }
    result.evaluate(
        &Metric::new("stranded_free", "stranded free space", stranded, Trigger::Above),
        limits.stranded_free_warning,
        limits.stranded_free_critical,
    );

    let pools = [
        (DATA,     "data_slack",     "data slack",     limits.data_slack_warning,     limits.data_slack_critical),
        (METADATA, "metadata_slack", "metadata slack", limits.metadata_slack_warning, limits.metadata_slack_critical),
    ];
    for (pool, key, label, warning, critical) in pools {
        match report.pool_slack(pool) {
            Some(measure) => {
                result.evaluate(&Metric::new(key, label, measure, Trigger::Above), warning, critical)
            }
            None => tracing::warn!("no {} pool in the report, skipping {}", pool, key),
        }
    }

    result
}
