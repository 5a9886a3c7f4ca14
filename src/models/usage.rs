use serde::Serialize;
use std::collections::BTreeMap;

pub const DATA:     &str = "Data";
pub const METADATA: &str = "Metadata";
pub const SYSTEM:   &str = "System";

/// Size and usage of one block group type, summed over its profiles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PoolUsage {
    pub size: u64,
    pub used: u64,
}

impl PoolUsage {
    /// Bytes allocated to the pool but not holding anything.
    pub fn slack(&self) -> u64 {
        self.size.saturating_sub(self.used)
    }
}

/// The numbers reported by `btrfs filesystem usage -b`.
///
/// The "Overall" figures are raw device bytes, so they include the
/// duplication factor of the profiles; pool sizes are logical bytes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageReport {
    pub device_size:         u64,
    pub device_allocated:    u64,
    pub device_unallocated:  u64,
    pub device_missing:      u64,
    pub device_slack:        Option<u64>,
    pub used:                u64,
    pub free_estimated:      u64,
    pub free_estimated_min:  u64,
    pub free_statfs:         Option<u64>,
    pub data_ratio:          f64,
    pub metadata_ratio:      f64,
    pub global_reserve:      u64,
    pub global_reserve_used: u64,
    pub pools:               BTreeMap<String, PoolUsage>,
}

/// A value together with the maximum it could reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Measure {
    pub value: u64,
    pub max:   u64,
}

impl UsageReport {
    pub fn pool(&self, name: &str) -> Option<&PoolUsage> {
        self.pools.get(name)
    }

    pub fn global_reserve_free(&self) -> Measure {
        Measure {
            value: self.global_reserve.saturating_sub(self.global_reserve_used),
            max:   self.global_reserve,
        }
    }

    pub fn unallocated(&self) -> Measure {
        Measure { value: self.device_unallocated, max: self.device_size }
    }

    /// Unallocated device space expressed in bytes the pool could still get,
    /// given the replication ratio of its profile.
    pub fn unallocated_for(&self, pool: &str) -> u64 {
        let ratio = if pool == DATA || pool.starts_with("Data+") {
            self.data_ratio
        } else {
            self.metadata_ratio
        };
        let ratio = if ratio > 0.0 { ratio } else { 1.0 };
        (self.device_unallocated as f64 / ratio) as u64
    }

    /// Free space of a pool, counting the unallocated space it could grow into.
    pub fn pool_free(&self, name: &str) -> Option<Measure> {
        let pool  = self.pool(name)?;
        let extra = self.unallocated_for(name);
        Some(Measure {
            value: pool.slack().saturating_add(extra),
            max:   pool.size.saturating_add(extra),
        })
    }

    pub fn pool_slack(&self, name: &str) -> Option<Measure> {
        let pool = self.pool(name)?;
        Some(Measure { value: pool.slack(), max: pool.size })
    }

    /// Free space that lives inside already allocated chunks. Only a balance
    /// hands it back to the unallocated pool.
    pub fn stranded_free(&self) -> Measure {
        Measure {
            value: self.free_estimated.saturating_sub(self.unallocated_for(DATA)),
            max:   self.free_estimated,
        }
    }

    pub fn free_estimated(&self) -> Measure {
        Measure { value: self.free_estimated, max: self.device_size }
    }
}
