//! Free space check
//!
//! Every pool is measured by how much it can still store: what is left in
//! its allocated chunks plus the unallocated device space it may grow into.
//! The global reserve and the unallocated space are checked on their own.

use crate::alerts::{CheckResult, Metric, Trigger};
use crate::limits::Limit;
use crate::models::usage::{UsageReport, DATA, METADATA, SYSTEM};
use serde::Deserialize;

/// Limits of the free space check. Percentages are relative to the maximum
/// each metric could reach.
#[derive(clap::Args, Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UsageLimits {
    /// Warn when the unused global reserve drops below LIMIT
    #[arg(short = 'g', long, value_name = "LIMIT")]
    pub global_reserve_warning:  Option<Limit>,
    /// Go critical when the unused global reserve drops below LIMIT
    #[arg(short = 'G', long, value_name = "LIMIT")]
    pub global_reserve_critical: Option<Limit>,

    /// Warn when unallocated device space drops below LIMIT
    #[arg(short = 'u', long, value_name = "LIMIT")]
    pub unallocated_warning:  Option<Limit>,
    /// Go critical when unallocated device space drops below LIMIT
    #[arg(short = 'U', long, value_name = "LIMIT")]
    pub unallocated_critical: Option<Limit>,

    /// Warn when free data space drops below LIMIT
    #[arg(short = 'd', long, value_name = "LIMIT")]
    pub data_warning:  Option<Limit>,
    /// Go critical when free data space drops below LIMIT
    #[arg(short = 'D', long, value_name = "LIMIT")]
    pub data_critical: Option<Limit>,

    /// Warn when free metadata space drops below LIMIT
    #[arg(short = 'm', long, value_name = "LIMIT")]
    pub metadata_warning:  Option<Limit>,
    /// Go critical when free metadata space drops below LIMIT
    #[arg(short = 'M', long, value_name = "LIMIT")]
    pub metadata_critical: Option<Limit>,

    /// Warn when free system space drops below LIMIT
    #[arg(short = 's', long, value_name = "LIMIT")]
    pub system_warning:  Option<Limit>,
    /// Go critical when free system space drops below LIMIT
    #[arg(short = 'S', long, value_name = "LIMIT")]
    pub system_critical: Option<Limit>,
}

impl UsageLimits {
    /// Limits set here, falling back to `other` for the ones that are not.
    pub fn or(self, other: UsageLimits) -> UsageLimits {
        UsageLimits {
            global_reserve_warning:  self.global_reserve_warning.or(other.global_reserve_warning),
            global_reserve_critical: self.global_reserve_critical.or(other.global_reserve_critical),
            unallocated_warning:     self.unallocated_warning.or(other.unallocated_warning),
            unallocated_critical:    self.unallocated_critical.or(other.unallocated_critical),
            data_warning:            self.data_warning.or(other.data_warning),
            data_critical:           self.data_critical.or(other.data_critical),
            metadata_warning:        self.metadata_warning.or(other.metadata_warning),
            metadata_critical:       self.metadata_critical.or(other.metadata_critical),
            system_warning:          self.system_warning.or(other.system_warning),
            system_critical:         self.system_critical.or(other.system_critical),
        }
    }
}

pub fn evaluate(report: &UsageReport, limits: &UsageLimits) -> CheckResult {
    let mut result = CheckResult::new();

    result.evaluate(
        &Metric::new("global_reserve_free", "global reserve free", report.global_reserve_free(), Trigger::Below),
        limits.global_reserve_warning,
        limits.global_reserve_critical,
    );
    result.evaluate(
        &Metric::new("unallocated", "unallocated", report.unallocated(), Trigger::Below),
        limits.unallocated_warning,
        limits.unallocated_critical,
    );

    let pools = [
        (DATA,     "data_free",     "data free",     limits.data_warning,     limits.data_critical),
        (METADATA, "metadata_free", "metadata free", limits.metadata_warning, limits.metadata_critical),
        (SYSTEM,   "system_free",   "system free",   limits.system_warning,   limits.system_critical),
    ];
    for (pool, key, label, warning, critical) in pools {
        match report.pool_free(pool) {
            Some(measure) => {
                result.evaluate(&Metric::new(key, label, measure, Trigger::Below), warning, critical)
            }
            None => tracing::warn!("no {} pool in the report, skipping {}", pool, key),
        }
    }

    result.record(&Metric::new("free_estimated", "free", report.free_estimated(), Trigger::Below));
    result
}
