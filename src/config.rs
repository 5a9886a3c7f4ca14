use crate::checks::fragmentation::FragmentationLimits;
use crate::checks::usage::UsageLimits;
use crate::error::{Error, Result};
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Settings read from `config.toml`.
///
/// Example:
/// ```toml
/// [command]
/// program = "sudo"
/// args    = ["btrfs", "filesystem", "usage", "-b"]
///
/// [usage]
/// data_warning  = "10%"
/// data_critical = "5%"
///
/// [fragmentation]
/// stranded_free_warning = "50%"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub command: CommandConfig,

    #[serde(default)]
    pub usage: UsageLimits,

    #[serde(default)]
    pub fragmentation: FragmentationLimits,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommandConfig {
    /// Executable printing the usage report
    pub program: String,
    /// Arguments placed before the mount point
    #[serde(default = "default_args")]
    pub args:    Vec<String>,
}

// ── Defaults ─────────────────────────────────────────────────────────

impl Default for CommandConfig {
    fn default() -> Self {
        Self { program: "btrfs".into(), args: default_args() }
    }
}

fn default_args() -> Vec<String> {
    vec!["filesystem".into(), "usage".into(), "-b".into()]
}

// ── Load ──────────────────────────────────────────────────────────────

impl Config {
    /// Load the explicit config file, or the default one if it exists.
    ///
    /// Only a missing *default* file falls back to built-in settings; an
    /// explicit path has to exist.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }
        let Some(path) = Self::config_path() else {
            tracing::debug!("no config directory, using defaults");
            return Ok(Config::default());
        };
        match Self::load_from(&path) {
            Err(Error::CantReadConfig { source, .. }) if source.kind() == ErrorKind::NotFound => {
                tracing::debug!("{} not found, using defaults", path.display());
                Ok(Config::default())
            }
            other => other,
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|source| Error::CantReadConfig { path: path.to_path_buf(), source })?;
        let cfg = Self::parse(&text)
            .map_err(|source| Error::ParseConfig { path: path.to_path_buf(), source })?;
        tracing::info!("loaded config from {}", path.display());
        Ok(cfg)
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("btrfs-checks").join("config.toml"))
    }
}

#[cfg(test)]
mod test {
    use super::{CommandConfig, Config};
    use crate::error::Error;
    use crate::limits::Limit;
    use std::io::Write;
    use std::path::Path;

    #[test]
    fn empty_config_is_default() {
        assert_eq!(Config::parse("").unwrap(), Config::default());
        assert_eq!(Config::default().command.program, "btrfs");
        assert_eq!(Config::default().command.args, vec!["filesystem", "usage", "-b"]);
    }

    #[test]
    fn limits_and_command() {
        let cfg = Config::parse(
            r#"
            [command]
            program = "sudo"
            args    = ["btrfs", "filesystem", "usage", "-b"]

            [usage]
            data_warning         = "10%"
            unallocated_critical = "2GiB"

            [fragmentation]
            stranded_free_warning = "50%"
            "#,
        )
        .unwrap();
        assert_eq!(
            cfg.command,
            CommandConfig { program: "sudo".into(), args: vec!["btrfs".into(), "filesystem".into(), "usage".into(), "-b".into()] }
        );
        assert_eq!(cfg.usage.data_warning, Some(Limit::Percent(10.0)));
        assert_eq!(cfg.usage.data_critical, None);
        assert_eq!(cfg.usage.unallocated_critical, Some(Limit::Bytes(2 * 1024 * 1024 * 1024)));
        assert_eq!(cfg.fragmentation.stranded_free_warning, Some(Limit::Percent(50.0)));
    }

    #[test]
    fn program_alone_keeps_default_args() {
        let cfg = Config::parse("[command]\nprogram = \"/usr/local/sbin/btrfs\"\n").unwrap();
        assert_eq!(cfg.command.program, "/usr/local/sbin/btrfs");
        assert_eq!(cfg.command.args, CommandConfig::default().args);
    }

    #[test]
    fn bad_limit_is_rejected() {
        let err = Config::parse("[usage]\ndata_warning = \"ten percent\"\n").unwrap_err();
        assert!(err.to_string().contains("ten percent"), "{}", err);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Config::parse("[usage]\ndata_warn = \"10%\"\n").is_err());
        assert!(Config::parse("[command]\nprogram = \"btrfs\"\nargz = [\"x\"]\n").is_err());
    }

    #[test]
    fn misspelled_section_is_rejected() {
        let err = Config::parse("[usgae]\ndata_critical = \"5%\"\n").unwrap_err();
        assert!(err.to_string().contains("usgae"), "{}", err);
        assert!(Config::parse("[fragmentaton]\nstranded_free_warning = \"50%\"\n").is_err());
    }

    #[test]
    fn explicit_path_must_exist() {
        match Config::load(Some(Path::new("/nonexistent/btrfs-checks.toml"))) {
            Err(Error::CantReadConfig { .. }) => {}
            other => panic!("expected a read error, got {:?}", other),
        }
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[command]\nprogram = \"cat\"\nargs = []").unwrap();
        let cfg = Config::load(Some(file.path())).unwrap();
        assert_eq!(cfg.command.program, "cat");
        assert!(cfg.command.args.is_empty());
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[command\n").unwrap();
        assert!(matches!(Config::load(Some(file.path())), Err(Error::ParseConfig { .. })));
    }
}
