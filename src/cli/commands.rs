//! Command implementation for the event manager CLI
//!
//! Sets up logging, builds the layered configuration, runs the processor and
//! prints the run summary.

use crate::cli::args::Args;
use crate::config::{Config, LoggingConfig};
use crate::processor::{EventProcessor, RunSummary};
use crate::Result;
use colored::Colorize;
use indicatif::HumanDuration;
use std::path::PathBuf;
use tracing::{debug, info};

/// Main command runner
///
/// 1. Load configuration (defaults -> file -> environment -> arguments)
/// 2. Set up logging from the merged `[logging]` section
/// 3. Run the letters, phone list and time overview passes
/// 4. Report what was written
pub async fn run(args: Args) -> Result<RunSummary> {
    let config = load_configuration(&args)?;
    setup_logging(&config.logging);

    info!("Starting event manager");
    debug!("Command line arguments: {:?}", args);
    debug!("Loaded configuration: {:?}", config);
    info!("Reading roster {}", config.input.roster_path.display());

    let show_progress = !config.logging.quiet;
    let processor = EventProcessor::from_config(config)?.with_progress(show_progress);
    let summary = processor.run().await?;

    if show_progress {
        print_summary(&summary);
    }

    Ok(summary)
}

/// Set up structured logging on stderr
pub fn setup_logging(logging: &LoggingConfig) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = &logging.level;

    // RUST_LOG wins over -v/-q
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("event_manager={}", log_level)));

    let result = if logging.quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };

    if result.is_ok() {
        debug!("Logging initialized at level: {}", log_level);
    }
}

/// Config file to read: the explicit one, else the default if it exists
fn resolve_config_file(args: &Args) -> Option<PathBuf> {
    match &args.config_file {
        Some(path) => Some(path.clone()),
        None => Config::default_config_path()
            .ok()
            .filter(|path| path.exists()),
    }
}

/// Load configuration using the layered approach (file -> env -> args)
pub fn load_configuration(args: &Args) -> Result<Config> {
    let config_file = resolve_config_file(args);
    match &config_file {
        Some(path) => debug!("Using config file: {}", path.display()),
        None => debug!("No config file found, using defaults and environment variables"),
    }

    let mut config = Config::load_layered(config_file.as_deref())?;
    args.apply_overrides(&mut config);
    config.validate()?;
    Ok(config)
}

/// Format a byte count in human-readable units
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.2} {}", size, UNITS[unit_index])
    }
}

fn print_summary(summary: &RunSummary) {
    println!("\n{}", "🎉 Event Manager: Done".bright_green().bold());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("📊 Summary:");
    println!("   • Attendees read: {}", summary.records_loaded);
    println!("   • Letters written: {}", summary.letters.letters_written);
    println!("   • Phone directory entries: {}", summary.phone_entries);
    println!(
        "   • Registration hours / days: {} / {}",
        summary.hour_buckets, summary.day_buckets
    );
    println!(
        "   • Total output size: {}",
        format_size(summary.total_output_size())
    );
    println!(
        "   • Processing time: {}",
        HumanDuration(summary.processing_time)
    );

    if summary.letters.lookups_unavailable > 0 {
        println!(
            "{}",
            format!(
                "⚠️  Letters without representative data: {}",
                summary.letters.lookups_unavailable
            )
            .yellow()
        );
    }
    if summary.phones_rejected > 0 {
        println!(
            "⚠️  Phone numbers left out of the directory: {}",
            summary.phones_rejected
        );
    }
    if summary.timestamps_skipped > 0 {
        println!(
            "⚠️  Registrations with malformed timestamps: {}",
            summary.timestamps_skipped
        );
    }

    println!("\n📁 Output:");
    if let Some(first_letter) = summary.letters.files.first() {
        let letters_dir = first_letter
            .path
            .parent()
            .map(|dir| dir.display().to_string())
            .unwrap_or_default();
        println!(
            "   • {} ({} letters)",
            letters_dir.bright_cyan(),
            summary.letters.files.len()
        );
    }
    for file in summary.phone_list.iter().chain(summary.time_overview.iter()) {
        println!(
            "   • {}: {}",
            file.path.display().to_string().bright_cyan(),
            format_size(file.bytes)
        );
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.00 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.00 MB");
    }

    #[test]
    fn test_load_configuration_layers_file_and_args() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[input]\nroster_path = \"from-file.csv\"\n\n[output]\nletters_dir = \"letters\""
        )
        .unwrap();

        let config_path = file.path().to_string_lossy().into_owned();
        let args = Args::parse_from(["event-manager", "--config", &config_path, "cli.csv"]);
        let config = load_configuration(&args).unwrap();

        assert_eq!(config.input.roster_path, PathBuf::from("cli.csv"));
        assert_eq!(config.output.letters_dir, PathBuf::from("letters"));
    }

    #[test]
    fn test_logging_section_applies_unless_flags_override_it() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[logging]\nlevel = \"debug\"").unwrap();
        let config_path = file.path().to_string_lossy().into_owned();

        let args = Args::parse_from(["event-manager", "--config", &config_path]);
        let config = load_configuration(&args).unwrap();
        assert_eq!(config.logging.level, "debug");
        assert!(!config.logging.quiet);

        let args = Args::parse_from(["event-manager", "--config", &config_path, "-q"]);
        let config = load_configuration(&args).unwrap();
        assert_eq!(config.logging.level, "error");
        assert!(config.logging.quiet);
    }

    #[test]
    fn test_unknown_log_level_is_a_configuration_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[logging]\nlevel = \"loud\"").unwrap();
        let config_path = file.path().to_string_lossy().into_owned();

        let args = Args::parse_from(["event-manager", "--config", &config_path]);
        assert_eq!(load_configuration(&args).unwrap_err().exit_code(), 6);
    }

    #[test]
    fn test_load_configuration_missing_explicit_file_fails() {
        let args = Args::parse_from(["event-manager", "--config", "/nonexistent/config.toml"]);
        let err = load_configuration(&args).unwrap_err();
        assert_eq!(err.exit_code(), 6);
    }
}
