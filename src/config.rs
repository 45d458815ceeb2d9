//! Command-line configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::compute::Backend;

/// Run a cellular automaton live in the terminal.
#[derive(Debug, Clone, Parser)]
#[command(name = "spark-life", version, about)]
pub struct Args {
    /// Initial map: one row per line, `.` dead, anything else alive.
    pub map_file: PathBuf,

    /// Number of generations to show.
    #[arg(value_parser = clap::value_parser!(u64).range(1..))]
    pub generations: u64,

    /// Delay between frames, in microseconds.
    #[arg(value_parser = clap::value_parser!(u64).range(1..))]
    pub delay_microseconds: u64,

    /// Compute backend.
    #[arg(long, value_enum, default_value_t = Backend::Auto)]
    pub device: Backend,
}

/// Validated settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub map_path: PathBuf,
    pub generations: u64,
    pub delay: Duration,
    pub backend: Backend,
}

impl From<Args> for RunConfig {
    fn from(args: Args) -> Self {
        Self {
            map_path: args.map_file,
            generations: args.generations,
            delay: Duration::from_micros(args.delay_microseconds),
            backend: args.device,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Result<RunConfig, clap::Error> {
        Args::try_parse_from(argv).map(RunConfig::from)
    }

    #[test]
    fn test_positional_arguments() {
        let config = parse(&["spark-life", "glider.map", "100", "50000"]).unwrap();
        assert_eq!(config.map_path, PathBuf::from("glider.map"));
        assert_eq!(config.generations, 100);
        assert_eq!(config.delay, Duration::from_millis(50));
        assert_eq!(config.backend, Backend::Auto);
    }

    #[test]
    fn test_device_flag() {
        let config = parse(&["spark-life", "m", "1", "1", "--device", "cpu"]).unwrap();
        assert_eq!(config.backend, Backend::Cpu);
    }

    #[test]
    fn test_zero_rejected() {
        assert!(parse(&["spark-life", "m", "0", "10"]).is_err());
        assert!(parse(&["spark-life", "m", "10", "0"]).is_err());
    }

    #[test]
    fn test_missing_and_garbage_rejected() {
        assert!(parse(&["spark-life", "m", "10"]).is_err());
        assert!(parse(&["spark-life", "m", "ten", "10"]).is_err());
        assert!(parse(&["spark-life", "m", "-5", "10"]).is_err());
    }
}
