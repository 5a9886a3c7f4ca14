use crate::alerts::Status;
use clap::Parser;
use std::path::PathBuf;

/// Arguments shared by both checks.
#[derive(clap::Args, Debug, Clone)]
pub struct CommonArgs {
    /// Mount point of the btrfs volume
    #[arg(value_name = "MOUNT")]
    pub mount: PathBuf,

    /// Increase logging on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Read settings from this file instead of the default config.toml
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print the parsed usage report as JSON and exit
    #[arg(long)]
    pub json: bool,
}

/// Parse the command line. Usage errors leave with the UNKNOWN state so the
/// monitoring system doesn't mistake a typo for a critical volume.
pub fn parse<C: Parser>() -> C {
    parse_from(std::env::args_os())
}

pub fn parse_from<C, I, T>(args: I) -> C
where
    C: Parser,
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    match C::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) if e.use_stderr() => {
            let _ = e.print();
            Status::Unknown.exit()
        }
        Err(e) => e.exit(),
    }
}
