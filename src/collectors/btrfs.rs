use crate::config::CommandConfig;
use crate::error::{Error, Result};
use crate::models::usage::{PoolUsage, UsageReport};
use lazy_regex::{regex, Captures};
use std::collections::BTreeMap;
use std::path::Path;
use std::process::Command;
use std::str::FromStr;

/// Run the usage command against `mount` and return its stdout.
pub fn run_usage(cmd: &CommandConfig, mount: &Path) -> Result<String> {
    tracing::info!("running {} {} {}", cmd.program, cmd.args.join(" "), mount.display());
    let out = Command::new(&cmd.program)
        .args(&cmd.args)
        .arg(mount)
        .output()
        .map_err(|source| Error::CantExecute { exe: cmd.program.clone(), source })?;

    if !out.status.success() {
        return Err(Error::CommandFailed {
            exe:    cmd.program.clone(),
            status: out.status,
            stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
        });
    }

    String::from_utf8(out.stdout).map_err(|_| Error::UnexpectedFormat("output is not UTF-8"))
}

/// Run the usage command and parse its report.
pub fn read_usage(cmd: &CommandConfig, mount: &Path) -> Result<UsageReport> {
    let text   = run_usage(cmd, mount)?;
    let report = parse_usage(&text)?;
    tracing::debug!(
        "{}: size {} allocated {} used {} free {} ({} pools)",
        mount.display(),
        report.device_size,
        report.device_allocated,
        report.used,
        report.free_estimated,
        report.pools.len(),
    );
    Ok(report)
}

/// Parse the text of `btrfs filesystem usage -b`.
///
/// The "Overall" block must be the first thing in the output and contain
/// every field in order; "Device slack" and "Free (statfs, df)" only exist in
/// newer btrfs-progs and may be missing.
pub fn parse_usage(text: &str) -> Result<UsageReport> {
    let overall = regex!(
        r"(?x)
        ^Overall:[\ \t]*\n
        \s*Device[\ ]size:\s+(?P<device_size>\d+)[\ \t]*\n
        \s*Device[\ ]allocated:\s+(?P<device_allocated>\d+)[\ \t]*\n
        \s*Device[\ ]unallocated:\s+(?P<device_unallocated>\d+)[\ \t]*\n
        \s*Device[\ ]missing:\s+(?P<device_missing>\d+)[\ \t]*\n
        (?:\s*Device[\ ]slack:\s+(?P<device_slack>\d+)[\ \t]*\n)?
        \s*Used:\s+(?P<used>\d+)[\ \t]*\n
        \s*Free[\ ]\(estimated\):\s+(?P<free_estimated>\d+)\s+\(min:[\ ](?P<free_estimated_min>\d+)\)[\ \t]*\n
        (?:\s*Free[\ ]\(statfs,[\ ]df\):\s+(?P<free_statfs>\d+)[\ \t]*\n)?
        \s*Data[\ ]ratio:\s+(?P<data_ratio>\d+(?:\.\d+)?)[\ \t]*\n
        \s*Metadata[\ ]ratio:\s+(?P<metadata_ratio>\d+(?:\.\d+)?)[\ \t]*\n
        \s*Global[\ ]reserve:\s+(?P<global_reserve>\d+)\s+\(used:[\ ](?P<global_reserve_used>\d+)\)
        "
    );
    let caps = overall
        .captures(text)
        .ok_or(Error::UnexpectedFormat("no \"Overall\" section at the start of the report"))?;

    Ok(UsageReport {
        device_size:         field(&caps, "device_size")?,
        device_allocated:    field(&caps, "device_allocated")?,
        device_unallocated:  field(&caps, "device_unallocated")?,
        device_missing:      field(&caps, "device_missing")?,
        device_slack:        optional_field(&caps, "device_slack")?,
        used:                field(&caps, "used")?,
        free_estimated:      field(&caps, "free_estimated")?,
        free_estimated_min:  field(&caps, "free_estimated_min")?,
        free_statfs:         optional_field(&caps, "free_statfs")?,
        data_ratio:          field(&caps, "data_ratio")?,
        metadata_ratio:      field(&caps, "metadata_ratio")?,
        global_reserve:      field(&caps, "global_reserve")?,
        global_reserve_used: field(&caps, "global_reserve_used")?,
        pools:               parse_pools(text)?,
    })
}

/// Collect the `Data,single: Size:..., Used:...` lines, summing pools that
/// show up under several profiles.
fn parse_pools(text: &str) -> Result<BTreeMap<String, PoolUsage>> {
    let pool_line = regex!(
        r"(?m)^(?P<name>Data\+Metadata|Data|Metadata|System),[^:]*:\s+Size:(?P<size>\d+),\s+Used:(?P<used>\d+)"
    );
    let mut pools: BTreeMap<String, PoolUsage> = BTreeMap::new();
    for caps in pool_line.captures_iter(text) {
        let size: u64 = field(&caps, "size")?;
        let used: u64 = field(&caps, "used")?;
        let pool = pools.entry(caps["name"].to_string()).or_default();
        pool.size = pool.size.saturating_add(size);
        pool.used = pool.used.saturating_add(used);
    }
    Ok(pools)
}

fn field<T: FromStr>(caps: &Captures, name: &'static str) -> Result<T> {
    optional_field(caps, name)?.ok_or(Error::InvalidField { field: name, value: String::new() })
}

fn optional_field<T: FromStr>(caps: &Captures, name: &'static str) -> Result<Option<T>> {
    caps.name(name)
        .map(|m| {
            m.as_str()
                .parse()
                .map_err(|_| Error::InvalidField { field: name, value: m.as_str().to_string() })
        })
        .transpose()
}

#[cfg(test)]
mod test {
    use super::{parse_usage, run_usage};
    use crate::config::CommandConfig;
    use crate::error::Error;
    use crate::models::usage::{test::sample, PoolUsage, DATA, METADATA, SYSTEM};
    use std::path::Path;

    /// btrfs-progs 6.x layout, tab separated like the real thing
    const REPORT: &str = "Overall:
    Device size:\t\t\t 107374182400
    Device allocated:\t\t  12901679104
    Device unallocated:\t\t  94472503296
    Device missing:\t\t\t            0
    Device slack:\t\t\t            0
    Used:\t\t\t\t   4563435520
    Free (estimated):\t\t 100914954240\t(min: 53678702592)
    Free (statfs, df):\t\t 100914937856
    Data ratio:\t\t\t         1.00
    Metadata ratio:\t\t         2.00
    Global reserve:\t\t     16777216\t(used: 0)
    Multiple profiles:\t\t           no

Data,single: Size:10737418240, Used:4294967296 (40.00%)
   /dev/sdb1\t10737418240

Metadata,DUP: Size:1073741824, Used:134217728 (12.50%)
   /dev/sdb1\t2147483648

System,DUP: Size:8388608, Used:16384 (0.20%)
   /dev/sdb1\t16777216

Unallocated:
   /dev/sdb1\t94472503296
";

    /// btrfs-progs 4.x: no slack, no statfs line, no percentages
    const OLD_REPORT: &str = "Overall:
    Device size:                 107374182400
    Device allocated:             12901679104
    Device unallocated:           94472503296
    Device missing:                         0
    Used:                          4563435520
    Free (estimated):            100914954240      (min: 53678702592)
    Data ratio:                          1.00
    Metadata ratio:                      2.00
    Global reserve:                  16777216      (used: 0)

Data,single: Size:10737418240, Used:4294967296
   /dev/sdb1   10737418240

Metadata,DUP: Size:1073741824, Used:134217728
   /dev/sdb1    2147483648

System,DUP: Size:8388608, Used:16384
   /dev/sdb1      16777216

Unallocated:
   /dev/sdb1   94472503296
";

    #[test]
    fn parses_current_report() {
        assert_eq!(parse_usage(REPORT).unwrap(), sample());
    }

    #[test]
    fn parses_report_without_optional_lines() {
        let report = parse_usage(OLD_REPORT).unwrap();
        assert_eq!(report.device_slack, None);
        assert_eq!(report.free_statfs, None);
        assert_eq!(report.free_estimated_min, 53_678_702_592);
        assert_eq!(report.pools, sample().pools);
    }

    #[test]
    fn sums_pools_with_several_profiles() {
        let text = format!(
            "{}\nData,RAID1: Size:1073741824, Used:1048576 (0.10%)\n   /dev/sdb1\t1073741824\n",
            REPORT
        );
        let report = parse_usage(&text).unwrap();
        assert_eq!(
            report.pool(DATA),
            Some(&PoolUsage { size: 11_811_160_064, used: 4_296_015_872 })
        );
        assert_eq!(report.pool(METADATA), sample().pool(METADATA));
    }

    #[test]
    fn huge_pool_sums_saturate() {
        let text = REPORT.replace(
            "Size:10737418240, Used:4294967296",
            "Size:18446744073709551615, Used:18446744073709551615",
        ) + "\nData,RAID1: Size:1, Used:1\n";
        let report = parse_usage(&text).unwrap();
        assert_eq!(report.pool(DATA), Some(&PoolUsage { size: u64::MAX, used: u64::MAX }));
    }

    #[test]
    fn mixed_block_groups() {
        let text = REPORT
            .replace("Data,single: Size:10737418240", "Data+Metadata,single: Size:10737418240")
            .replace("Metadata,DUP: Size:1073741824, Used:134217728 (12.50%)\n", "");
        let report = parse_usage(&text).unwrap();
        assert!(report.pool(DATA).is_none());
        assert!(report.pool("Data+Metadata").is_some());
        assert!(report.pool(SYSTEM).is_some());
    }

    #[test]
    fn overall_must_come_first() {
        let text = format!("WARNING: something odd\n{}", REPORT);
        match parse_usage(&text) {
            Err(Error::UnexpectedFormat(_)) => {}
            other => panic!("expected a format error, got {:?}", other),
        }
    }

    #[test]
    fn missing_field_is_a_format_error() {
        let text: String = REPORT
            .lines()
            .filter(|line| !line.contains("Device missing"))
            .map(|line| format!("{}\n", line))
            .collect();
        assert!(matches!(parse_usage(&text), Err(Error::UnexpectedFormat(_))));
        assert!(matches!(parse_usage(""), Err(Error::UnexpectedFormat(_))));
    }

    #[test]
    fn oversized_number_is_an_invalid_field() {
        let text = REPORT.replace("107374182400", "99999999999999999999999");
        match parse_usage(&text) {
            Err(Error::InvalidField { field, value }) => {
                assert_eq!(field, "device_size");
                assert_eq!(value, "99999999999999999999999");
            }
            other => panic!("expected an invalid field, got {:?}", other),
        }
    }

    #[test]
    fn failing_command_is_reported() {
        let cmd = CommandConfig { program: "false".into(), args: vec![] };
        match run_usage(&cmd, Path::new("/")) {
            Err(Error::CommandFailed { exe, .. }) => assert_eq!(exe, "false"),
            other => panic!("expected a command failure, got {:?}", other),
        }
    }

    #[test]
    fn missing_command_is_reported() {
        let cmd = CommandConfig { program: "/nonexistent/btrfs".into(), args: vec![] };
        assert!(matches!(run_usage(&cmd, Path::new("/")), Err(Error::CantExecute { .. })));
    }
}
