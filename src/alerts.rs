use crate::limits::Limit;
use crate::models::usage::Measure;
use crate::util::human::fmt_bytes;

/// Nagios service state, in increasing order of badness for the two
/// threshold states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Status {
    Ok,
    Warning,
    Critical,
    Unknown,
}

impl Status {
    pub fn label(&self) -> &'static str {
        match self {
            Status::Ok       => "OK",
            Status::Warning  => "WARNING",
            Status::Critical => "CRITICAL",
            Status::Unknown  => "UNKNOWN",
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            Status::Ok       => 0,
            Status::Warning  => 1,
            Status::Critical => 2,
            Status::Unknown  => 3,
        }
    }

    pub fn exit(self) -> ! {
        std::process::exit(self.exit_code())
    }
}

/// Which side of the limit is bad.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Free space style metrics: alert when the value drops under the limit
    Below,
    /// Waste style metrics: alert when the value climbs over the limit
    Above,
}

impl Trigger {
    fn fires(&self, value: u64, limit: u64) -> bool {
        match self {
            Trigger::Below => value < limit,
            Trigger::Above => value > limit,
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            Trigger::Below => "<",
            Trigger::Above => ">",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metric {
    /// Perfdata label
    pub key:     &'static str,
    /// Human label used in status messages
    pub label:   &'static str,
    pub measure: Measure,
    pub trigger: Trigger,
}

impl Metric {
    pub fn new(key: &'static str, label: &'static str, measure: Measure, trigger: Trigger) -> Self {
        Metric { key, label, measure, trigger }
    }

    pub fn perfdata(&self) -> String {
        format!("{}={}B;;;0;{}", self.key, self.measure.value, self.measure.max)
    }

    fn message(&self, limit: u64) -> String {
        format!(
            "{} {} {} {}",
            self.label,
            fmt_bytes(self.measure.value),
            self.trigger.symbol(),
            fmt_bytes(limit)
        )
    }
}

/// Messages and perfdata gathered over one run of a check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckResult {
    pub critical: Vec<String>,
    pub warning:  Vec<String>,
    pub perfdata: Vec<String>,
}

impl CheckResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare `metric` against its limits. Critical wins over warning for the
    /// same metric; perfdata is recorded either way.
    pub fn evaluate(&mut self, metric: &Metric, warning: Option<Limit>, critical: Option<Limit>) {
        let max      = metric.measure.max;
        let warning  = warning.map(|l| l.resolve(max));
        let critical = critical.map(|l| l.resolve(max));
        tracing::debug!(
            "{}: {} of {} (warning {:?}, critical {:?})",
            metric.key, metric.measure.value, max, warning, critical
        );

        let fires = |limit: Option<u64>| limit.filter(|&l| metric.trigger.fires(metric.measure.value, l));
        if let Some(limit) = fires(critical) {
            self.critical.push(metric.message(limit));
        } else if let Some(limit) = fires(warning) {
            self.warning.push(metric.message(limit));
        }
        self.perfdata.push(metric.perfdata());
    }

    /// Record perfdata for a metric nobody sets limits on.
    pub fn record(&mut self, metric: &Metric) {
        self.perfdata.push(metric.perfdata());
    }

    pub fn status(&self) -> Status {
        if !self.critical.is_empty() {
            Status::Critical
        } else if !self.warning.is_empty() {
            Status::Warning
        } else {
            Status::Ok
        }
    }

    /// `OK|perf`, or `CRITICAL: crit, ..., warn, ...|perf`
    pub fn status_line(&self) -> String {
        let perfdata = self.perfdata.join(" ");
        match self.status() {
            Status::Ok => format!("OK|{}", perfdata),
            status => {
                let messages: Vec<&str> = self.critical.iter()
                    .chain(self.warning.iter())
                    .map(String::as_str)
                    .collect();
                format!("{}: {}|{}", status.label(), messages.join(", "), perfdata)
            }
        }
    }
}
