pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::core::RequestFields;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::logger::LogFormat;
#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "dispatch-pool")]
#[command(about = "Resolve cmd/map directives into module method calls")]
pub struct CliConfig {
    /// Targets and methods, e.g. "user/login-user/logout"
    #[arg(long)]
    pub cmd: Option<String>,

    /// Mapping rules, e.g. "user/login/login/token:session"
    #[arg(long)]
    pub map: Option<String>,

    /// Output format: raw or structured
    #[arg(long)]
    pub format: Option<String>,

    /// Input field as key=value (repeatable)
    #[arg(short, long = "field", value_name = "KEY=VALUE")]
    pub fields: Vec<String>,

    /// File field as name=path (repeatable)
    #[arg(long = "file", value_name = "NAME=PATH")]
    pub files: Vec<String>,

    /// Path to the dispatch TOML configuration
    #[arg(short, long)]
    pub config: Option<String>,

    /// Run without safe-zone checks
    #[arg(long)]
    pub insecure: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    pub fn request_fields(&self) -> Result<RequestFields> {
        cli::collect_fields(
            self.cmd.as_deref(),
            self.map.as_deref(),
            self.format.as_deref(),
            &self.fields,
            &self.files,
        )
    }

    pub fn log_format(&self) -> LogFormat {
        if self.json_logs {
            LogFormat::Json
        } else {
            LogFormat::Compact
        }
    }
}
