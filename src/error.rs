use std::path::PathBuf;
use std::process::ExitStatus;

/// btrfs-checks error type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("couldn't execute {exe}")]
    CantExecute {
        exe:    String,
        #[source]
        source: std::io::Error,
    },

    #[error("{exe} failed ({status}): {stderr}")]
    CommandFailed {
        exe:    String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("unexpected report format: {0}")]
    UnexpectedFormat(&'static str),

    #[error("invalid value {value:?} for {field}")]
    InvalidField {
        field: &'static str,
        value: String,
    },

    #[error("invalid limit {0:?}: expected a percentage (10%) or a size (512M, 2GiB, 1048576)")]
    InvalidLimit(String),

    #[error("couldn't read config file {path:?}")]
    CantReadConfig {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("couldn't parse config file {path:?}")]
    ParseConfig {
        path:   PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
