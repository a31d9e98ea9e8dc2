//! Command-line argument definitions for the event manager
//!
//! A single command: read a roster, write letters, a phone list and a time
//! overview. Everything here overrides the layered configuration.

use crate::app::services::time_analysis::MalformedTimestampPolicy;
use crate::config::Config;
use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for the event manager
///
/// Turns an attendee roster into personalized thank-you letters, a phone
/// directory and a registration-time overview.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "event-manager",
    version,
    about = "Generate thank-you letters, a phone list and a registration overview from an attendee roster",
    long_about = "Reads an event attendee roster (CSV) and writes three artifacts: one thank-you \
                  letter per attendee naming their national legislators, a normalized phone \
                  directory, and an overview of registrations by hour and weekday.\n\n\
                  Representative lookups need an API key in CIVIC_API_KEY or the config file; \
                  without one every letter carries a pointer to find representatives instead."
)]
pub struct Args {
    /// Attendee roster CSV
    ///
    /// Defaults to event_attendees.csv in the current directory.
    #[arg(value_name = "ROSTER")]
    pub roster: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// TOML configuration file. If not specified, looks for
    /// <config dir>/event-manager/config.toml
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    pub config_file: Option<PathBuf>,

    /// Root directory for the generated artifacts
    #[arg(
        short = 'o',
        long = "output-root",
        value_name = "DIR",
        help = "Directory the output/, phone_list/ and time_overview/ folders are created in"
    )]
    pub output_root: Option<PathBuf>,

    /// Directory holding the three HTML templates
    #[arg(long = "templates-dir", value_name = "DIR")]
    pub templates_dir: Option<PathBuf>,

    /// The roster has no header row; use the standard column order
    #[arg(long = "no-header")]
    pub no_header: bool,

    /// Leave rows with malformed registration timestamps out of the overview
    ///
    /// By default a malformed timestamp stops the run.
    #[arg(long = "skip-malformed-timestamps")]
    pub skip_malformed_timestamps: bool,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Suppress output (quiet mode)
    ///
    /// Only show errors. Overrides verbose settings.
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

impl Args {
    /// Log level derived from `-v` / `-q`
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }

    /// Log level requested on the command line, if any
    pub fn log_level_override(&self) -> Option<&'static str> {
        (self.quiet || self.verbose > 0).then(|| self.get_log_level())
    }

    /// Apply explicitly given arguments on top of a loaded configuration
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(roster) = &self.roster {
            config.input.roster_path = roster.clone();
        }
        if self.no_header {
            config.input.has_header_row = false;
        }
        if let Some(root) = &self.output_root {
            config.output.root = root.clone();
        }
        if let Some(dir) = &self.templates_dir {
            config.templates.dir = dir.clone();
        }
        if self.skip_malformed_timestamps {
            config.analysis.malformed_timestamps = MalformedTimestampPolicy::Skip;
        }

        if let Some(level) = self.log_level_override() {
            config.logging.level = level.to_string();
        }
        if self.quiet {
            config.logging.quiet = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_defaults_leave_config_untouched() {
        let args = Args::parse_from(["event-manager"]);
        let mut config = Config::default();
        args.apply_overrides(&mut config);

        assert_eq!(config.input, Config::default().input);
        assert_eq!(config.output, Config::default().output);
        assert_eq!(config.logging, Config::default().logging);
        assert_eq!(args.log_level_override(), None);
    }

    #[test]
    fn test_logging_from_file_survives_without_flags() {
        let mut config = Config::default();
        config.logging.level = "debug".to_string();

        Args::parse_from(["event-manager"]).apply_overrides(&mut config);
        assert_eq!(config.logging.level, "debug");

        Args::parse_from(["event-manager", "-v"]).apply_overrides(&mut config);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_overrides_are_applied() {
        let args = Args::parse_from([
            "event-manager",
            "attendees.csv",
            "--output-root",
            "/tmp/out",
            "--templates-dir",
            "tpl",
            "--no-header",
            "--skip-malformed-timestamps",
            "-vv",
        ]);
        let mut config = Config::default();
        args.apply_overrides(&mut config);

        assert_eq!(config.input.roster_path, PathBuf::from("attendees.csv"));
        assert!(!config.input.has_header_row);
        assert_eq!(config.output.root, PathBuf::from("/tmp/out"));
        assert_eq!(config.templates.dir, PathBuf::from("tpl"));
        assert_eq!(config.analysis.malformed_timestamps, MalformedTimestampPolicy::Skip);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Args::try_parse_from(["event-manager", "-q", "-v"]).is_err());

        let args = Args::parse_from(["event-manager", "-q"]);
        assert_eq!(args.log_level_override(), Some("error"));

        let mut config = Config::default();
        args.apply_overrides(&mut config);
        assert!(config.logging.quiet);
        assert_eq!(config.logging.level, "error");
    }
}
