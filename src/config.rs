//! Command-line configuration for the supervisor binary.

use std::path::PathBuf;

use clap::Parser;

use crate::error::{Error, Result};

/// Prefork HTTP origin server with a hot-reloadable request-processing module.
#[derive(Debug, Parser)]
#[command(name = "foreman", version, about)]
pub struct Config {
    /// Address to bind the listening socket to. A value containing `;` is bound as
    /// IPv6 rather than IPv4 — see [`crate::net::tcp::is_ipv6`].
    #[arg(short, long)]
    pub address: String,

    /// Port to bind, 1-65535.
    #[arg(short, long, value_parser = parse_port)]
    pub port: u16,

    /// Enable debug-level logging.
    #[arg(short, long, default_value_t = false)]
    pub debug: bool,

    /// Path to the shared object implementing the hot-reloadable processing module.
    #[arg(short = 'l', long = "library", default_value = "./libhttp.so")]
    pub library: PathBuf,

    /// Initial/target number of worker processes.
    #[arg(short, long, default_value_t = 3)]
    pub workers: usize,

    /// Root directory served for GET/HEAD/POST requests.
    #[arg(short = 's', long = "public-dir", default_value = "./public/")]
    pub public_dir: PathBuf,
}

fn parse_port(s: &str) -> std::result::Result<u16, String> {
    s.parse::<u16>()
        .ok()
        .filter(|p| *p != 0)
        .ok_or_else(|| "port must be between 1 and 65535".to_string())
}

impl Config {
    /// Parses `std::env::args`, exiting the process per `clap`'s own usage/help
    /// handling on a bad invocation.
    pub fn from_args() -> Self {
        Config::parse()
    }

    /// Level the logger should be initialized at, derived from `-d`.
    pub fn log_level(&self) -> log::LevelFilter {
        if self.debug {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        }
    }

    /// Validates that `workers` is nonzero, the one argument `clap`'s own type
    /// system cannot enforce declaratively.
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(Error::InvalidArgument(
                "workers must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
