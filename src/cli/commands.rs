//! Command definitions for the athan CLI.
//!
//! Uses clap derive macro for argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::source::DEFAULT_BASE_URL;
use crate::types::{AthanConfig, Location};

// ============================================================================
// CLI Structure
// ============================================================================

/// Athan CLI - prayer times with an automatic call to prayer
#[derive(Parser, Debug)]
#[command(
    name = "athan",
    version,
    about = "Prayer times, countdown and automatic athan playback",
    long_about = "Shows today's five prayer times and the countdown to the next one,\n\
                  and plays the athan once when each prayer begins.",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute (defaults to `run`)
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the live clock and play the athan at each prayer (press Enter to play now)
    Run(RunArgs),

    /// Print today's schedule and the next prayer, then exit
    Today(TodayArgs),
}

// ============================================================================
// Arguments
// ============================================================================

/// Where and how prayer times are fetched
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// City to fetch prayer times for
    #[arg(long, default_value = "BayShore", value_parser = validate_place)]
    pub city: String,

    /// Country of the city
    #[arg(long, default_value = "USA", value_parser = validate_place)]
    pub country: String,

    /// Calculation method id (0-99)
    #[arg(
        short,
        long,
        default_value = "2",
        value_parser = clap::value_parser!(u8).range(0..=99)
    )]
    pub method: u8,

    /// Request timeout in seconds (1-300)
    #[arg(
        short,
        long,
        default_value = "15",
        value_parser = clap::value_parser!(u64).range(1..=300)
    )]
    pub timeout: u64,

    /// Base URL of the prayer-time API
    #[arg(long, default_value = DEFAULT_BASE_URL, hide = true)]
    pub api_url: String,
}

impl Default for SourceArgs {
    fn default() -> Self {
        Self {
            city: "BayShore".to_string(),
            country: "USA".to_string(),
            method: 2,
            timeout: 15,
            api_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl SourceArgs {
    pub fn location(&self) -> Location {
        Location {
            city: self.city.clone(),
            country: self.country.clone(),
            method: self.method,
        }
    }
}

/// Arguments for the run command
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Trigger window in seconds after each prayer begins (1-3599)
    #[arg(
        short,
        long,
        default_value = "45",
        value_parser = clap::value_parser!(u32).range(1..=3599)
    )]
    pub window: u32,

    /// Seconds between schedule refreshes (60-86400)
    #[arg(
        short,
        long,
        default_value = "3600",
        value_parser = clap::value_parser!(u64).range(60..=86_400)
    )]
    pub refresh: u64,

    /// Directory containing athan.mp3 and athanFajr.mp3
    #[arg(short, long)]
    pub sounds_dir: Option<PathBuf>,

    /// Disable athan playback
    #[arg(long)]
    pub no_sound: bool,

    /// Print each snapshot as a JSON line instead of the status line
    #[arg(long)]
    pub json: bool,
}

impl Default for RunArgs {
    fn default() -> Self {
        Self {
            source: SourceArgs::default(),
            window: 45,
            refresh: 3600,
            sounds_dir: None,
            no_sound: false,
            json: false,
        }
    }
}

impl RunArgs {
    /// Builds the engine configuration from the parsed flags.
    pub fn to_config(&self) -> AthanConfig {
        let mut config = AthanConfig {
            location: self.source.location(),
            ..AthanConfig::default()
        }
        .with_window_seconds(self.window)
        .with_refresh_interval_secs(self.refresh)
        .with_request_timeout_secs(self.source.timeout);
        if let Some(dir) = &self.sounds_dir {
            config = config.with_sounds_dir(dir);
        }
        config
    }
}

/// Arguments for the today command
#[derive(Args, Debug, Clone, Default)]
pub struct TodayArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Print the snapshot as JSON
    #[arg(long)]
    pub json: bool,
}

impl TodayArgs {
    pub fn to_config(&self) -> AthanConfig {
        AthanConfig {
            location: self.source.location(),
            ..AthanConfig::default()
        }
        .with_request_timeout_secs(self.source.timeout)
    }
}

// ============================================================================
// Validation Functions
// ============================================================================

/// Validates a city or country name.
///
/// - Must not be blank
/// - Must not exceed 100 characters
fn validate_place(s: &str) -> Result<String, String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err("must not be empty".to_string());
    }
    if trimmed.chars().count() > 100 {
        return Err("must be 100 characters or fewer".to_string());
    }
    Ok(trimmed.to_string())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // ------------------------------------------------------------------------
    // Cli Tests
    // ------------------------------------------------------------------------

    mod cli_tests {
        use super::*;

        #[test]
        fn test_parse_no_args() {
            let cli = Cli::parse_from(["athan"]);
            assert!(cli.command.is_none());
            assert!(!cli.verbose);
        }

        #[test]
        fn test_parse_verbose_flag() {
            let cli = Cli::parse_from(["athan", "--verbose"]);
            assert!(cli.verbose);
        }

        #[test]
        fn test_parse_verbose_after_subcommand() {
            let cli = Cli::parse_from(["athan", "today", "-v"]);
            assert!(cli.verbose);
            assert!(matches!(cli.command, Some(Commands::Today(_))));
        }

        #[test]
        fn test_parse_run_defaults() {
            let cli = Cli::parse_from(["athan", "run"]);
            let Some(Commands::Run(args)) = cli.command else {
                panic!("Expected Run command");
            };
            assert_eq!(args.window, 45);
            assert_eq!(args.refresh, 3600);
            assert_eq!(args.source.timeout, 15);
            assert_eq!(args.source.city, "BayShore");
            assert_eq!(args.source.country, "USA");
            assert_eq!(args.source.method, 2);
            assert!(args.sounds_dir.is_none());
            assert!(!args.no_sound);
            assert!(!args.json);
        }

        #[test]
        fn test_parse_run_with_options() {
            let cli = Cli::parse_from([
                "athan",
                "run",
                "--window",
                "60",
                "--city",
                "Chicago",
                "--method",
                "4",
                "--sounds-dir",
                "/tmp/sounds",
                "--no-sound",
                "--json",
            ]);
            let Some(Commands::Run(args)) = cli.command else {
                panic!("Expected Run command");
            };
            assert_eq!(args.window, 60);
            assert_eq!(args.source.city, "Chicago");
            assert_eq!(args.source.method, 4);
            assert_eq!(args.sounds_dir, Some(PathBuf::from("/tmp/sounds")));
            assert!(args.no_sound);
            assert!(args.json);
        }

        #[test]
        fn test_parse_today_json() {
            let cli = Cli::parse_from(["athan", "today", "--json", "--country", "Egypt"]);
            let Some(Commands::Today(args)) = cli.command else {
                panic!("Expected Today command");
            };
            assert!(args.json);
            assert_eq!(args.source.country, "Egypt");
        }
    }

    // ------------------------------------------------------------------------
    // Validation Tests
    // ------------------------------------------------------------------------

    mod validation_tests {
        use super::*;

        #[test]
        fn test_window_out_of_range() {
            assert!(Cli::try_parse_from(["athan", "run", "--window", "0"]).is_err());
            assert!(Cli::try_parse_from(["athan", "run", "--window", "3600"]).is_err());
            assert!(Cli::try_parse_from(["athan", "run", "--window", "3599"]).is_ok());
        }

        #[test]
        fn test_refresh_out_of_range() {
            assert!(Cli::try_parse_from(["athan", "run", "--refresh", "59"]).is_err());
            assert!(Cli::try_parse_from(["athan", "run", "--refresh", "86401"]).is_err());
        }

        #[test]
        fn test_timeout_out_of_range() {
            assert!(Cli::try_parse_from(["athan", "today", "--timeout", "0"]).is_err());
        }

        #[test]
        fn test_blank_city_rejected() {
            assert!(Cli::try_parse_from(["athan", "today", "--city", "  "]).is_err());
        }

        #[test]
        fn test_validate_place() {
            assert_eq!(validate_place(" Cairo "), Ok("Cairo".to_string()));
            assert!(validate_place("").is_err());
            assert!(validate_place(&"a".repeat(101)).is_err());
        }
    }

    // ------------------------------------------------------------------------
    // Config Tests
    // ------------------------------------------------------------------------

    mod config_tests {
        use super::*;

        #[test]
        fn test_run_args_to_config() {
            let cli = Cli::parse_from([
                "athan", "run", "-w", "30", "-r", "600", "-t", "5", "-s", "/opt/athan",
            ]);
            let Some(Commands::Run(args)) = cli.command else {
                panic!("Expected Run command");
            };
            let config = args.to_config();
            assert_eq!(config.window_seconds, 30);
            assert_eq!(config.refresh_interval_secs, 600);
            assert_eq!(config.request_timeout_secs, 5);
            assert_eq!(config.sounds_dir, PathBuf::from("/opt/athan"));
            assert!(config.validate().is_ok());
        }

        #[test]
        fn test_today_args_to_config() {
            let cli = Cli::parse_from(["athan", "today", "--city", "Cairo", "--country", "Egypt"]);
            let Some(Commands::Today(args)) = cli.command else {
                panic!("Expected Today command");
            };
            let config = args.to_config();
            assert_eq!(config.location.city, "Cairo");
            assert_eq!(config.location.country, "Egypt");
            assert_eq!(config.location.method, 2);
        }

        #[test]
        fn test_default_run_args_match_default_config() {
            let cli = Cli::parse_from(["athan", "run"]);
            let Some(Commands::Run(args)) = cli.command else {
                panic!("Expected Run command");
            };
            assert_eq!(args.to_config(), AthanConfig::default());
        }
    }
}
