//! Arguments and setup shared by every subcommand.

use camino::Utf8PathBuf;
use clap::{Args, ValueEnum};
use f1db::Result;
use f1db::config::Config;

/// Log level for diagnostic output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    None,
    /// Only error messages
    Error,
    /// Warning and error messages
    Warn,
    /// Info, warning, and error messages
    Info,
    /// Debug and above messages
    Debug,
    /// All messages including trace
    Trace,
}

/// Arguments accepted by every subcommand
#[derive(Args, Debug)]
pub struct CommonArgs {
    /// Path to configuration file [default: f1db.toml in the working directory]
    #[arg(long, short = 'c', value_name = "PATH", global = true)]
    pub config: Option<Utf8PathBuf>,

    /// Set the logging level for diagnostic output
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    pub log_level: LogLevel,
}

impl CommonArgs {
    /// Initializes logging and loads the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file cannot be read or is invalid
    pub fn setup(&self) -> Result<Config> {
        init_logging(self.log_level);
        Config::load(&Utf8PathBuf::from("."), self.config.as_ref())
    }
}

/// Initialize logger based on log level
fn init_logging(log_level: LogLevel) {
    let level = match log_level {
        LogLevel::None => return,
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    };

    let env = env_logger::Env::default().filter_or("RUST_LOG", level);

    env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(matches!(log_level, LogLevel::Debug | LogLevel::Trace))
        .init();
}
