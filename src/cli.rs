//! CLI argument parsing with clap.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::run::RunOptions;

#[derive(Parser)]
#[command(name = "vpnroutes")]
#[command(author, version, about = "Update route directives in an OpenVPN client config")]
pub struct Cli {
    /// OpenVPN client config to update, or '-' to read from stdin
    pub file: String,

    /// File with one hostname or CIDR per line ('#' starts a comment); repeatable
    #[arg(short = 'e', long = "extra-routes", value_name = "FILE")]
    pub extra_routes: Vec<PathBuf>,

    /// Add a hostname or CIDR directly; repeatable
    #[arg(short = 'r', long = "route", value_name = "HOST|CIDR")]
    pub route: Vec<String>,

    /// Also pull published endpoint ranges for this service instance
    #[arg(long, value_name = "INSTANCE")]
    pub endpoints: Option<String>,

    /// Rewrite the config file in place instead of printing to stdout
    #[arg(short = 'i', long)]
    pub in_place: bool,

    /// Skip IPv4 routes
    #[arg(long, conflicts_with = "no_ipv6")]
    pub no_ipv4: bool,

    /// Skip IPv6 routes
    #[arg(long)]
    pub no_ipv6: bool,

    /// Treat an unresolvable hostname as a fatal error
    #[arg(long)]
    pub strict: bool,

    /// Collapse adjacent and contained networks before writing
    #[arg(long)]
    pub aggregate: bool,

    /// Log verbosity on stderr
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

impl Cli {
    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            file: self.file.clone(),
            extra_route_files: self.extra_routes.clone(),
            inline_routes: self.route.clone(),
            endpoints_instance: self.endpoints.clone(),
            in_place: self.in_place,
            include_ipv4: !self.no_ipv4,
            include_ipv6: !self.no_ipv6,
            strict: self.strict,
            aggregate: self.aggregate,
        }
    }
}
