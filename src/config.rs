//! Server configuration from command-line flags and environment variables
//!
//! Every flag falls back to an environment variable, then to a default:
//! - `--host` / `HOST` (default `0.0.0.0`)
//! - `--port` / `PORT` (default `3000`)
//! - `--report-threshold` / `BAN_REPORT_THRESHOLD` (default `3`, at least `1`)
//! - `--ban-duration-secs` / `BAN_DURATION_SECS` (default `600`)

use std::time::Duration;

use clap::Parser;

use crate::ban::{BanPolicy, DEFAULT_BAN_DURATION, DEFAULT_REPORT_THRESHOLD};

/// Default listening host
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default listening port
pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(name = "stranger_chat", version, about = "Anonymous 1:1 stranger chat server")]
pub struct Config {
    /// Address to listen on
    #[arg(long, env = "HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Reports against one address before it is banned
    #[arg(
        long,
        env = "BAN_REPORT_THRESHOLD",
        default_value_t = DEFAULT_REPORT_THRESHOLD,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub report_threshold: u32,

    /// Ban length in seconds
    #[arg(long, env = "BAN_DURATION_SECS", default_value_t = DEFAULT_BAN_DURATION.as_secs())]
    pub ban_duration_secs: u64,
}

impl Config {
    /// Ban policy described by this configuration
    pub fn ban_policy(&self) -> BanPolicy {
        BanPolicy {
            report_threshold: self.report_threshold,
            ban_duration: Duration::from_secs(self.ban_duration_secs),
        }
    }

    /// Address to bind the listener to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
