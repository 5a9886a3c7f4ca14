//! Warning and critical limits
//!
//! A limit is either a percentage of some reference maximum (`15%`) or an
//! absolute byte count with an optional binary suffix (`512M`, `2GiB`,
//! `1048576`). Limits are parsed once from the command line or the config
//! file and resolved against the maximum of the metric they apply to.

use std::fmt;
use std::str::FromStr;

use lazy_regex::regex_captures;
use serde::Deserialize;

use crate::error::{Error, Result};

const KIB: f64 = 1024.0;
const MIB: f64 = 1024.0 * 1024.0;
const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "String")]
pub enum Limit {
    /// Percentage of the reference maximum, `15` for `15%`
    Percent(f64),
    Bytes(u64),
}

impl Limit {
    /// The limit as a byte count relative to `max`
    pub fn resolve(&self, max: u64) -> u64 {
        match *self {
            Limit::Percent(pct) => (pct / 100.0 * max as f64).round() as u64,
            Limit::Bytes(bytes) => bytes,
        }
    }
}

impl FromStr for Limit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Limit> {
        let (_, number, suffix) = regex_captures!(r"^(\d+(?:\.\d+)?)(%|K|KiB|M|MiB|G|GiB)?$", s.trim())
            .ok_or_else(|| Error::InvalidLimit(s.to_string()))?;
        let number: f64 = number.parse().map_err(|_| Error::InvalidLimit(s.to_string()))?;
        let multiplier = match suffix {
            "%"          => return Ok(Limit::Percent(number)),
            ""           => 1.0,
            "K" | "KiB"  => KIB,
            "M" | "MiB"  => MIB,
            "G" | "GiB"  => GIB,
            _            => return Err(Error::InvalidLimit(s.to_string())),
        };
        Ok(Limit::Bytes((number * multiplier).trunc() as u64))
    }
}

impl TryFrom<String> for Limit {
    type Error = Error;

    fn try_from(s: String) -> Result<Limit> {
        s.parse()
    }
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Limit::Percent(pct) => write!(f, "{}%", pct),
            Limit::Bytes(bytes) => write!(f, "{}", bytes),
        }
    }
}

/// Parse `text` and resolve it against `max` in one go.
///
/// `None` means no limit was configured, so nothing should be checked.
pub fn parse_limit(text: Option<&str>, max: u64) -> Result<Option<u64>> {
    text.map(|t| t.parse::<Limit>().map(|limit| limit.resolve(max)))
        .transpose()
}
