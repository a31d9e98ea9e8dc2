//! Top-level driver for a roster run.
//!
//! Loads the roster and the three templates, then runs the letters, phone
//! directory and time overview passes in that order over the same buffered
//! roster. The first fatal error stops the run.

use crate::app::adapters::filesystem::{OutputWriter, WrittenFile};
use crate::app::services::civic_lookup::{CivicInfoClient, RepresentativeLookup};
use crate::app::services::letters::{LETTER_PLACEHOLDERS, LetterGenerator, LetterReport};
use crate::app::services::phone_directory::{
    PHONE_LIST_PLACEHOLDERS, build_phone_directory, render_phone_directory,
};
use crate::app::services::roster::Roster;
use crate::app::services::template::Template;
use crate::app::services::time_analysis::{
    TIME_OVERVIEW_PLACEHOLDERS, day_statistics, hour_statistics, render_time_overview,
};
use crate::config::Config;
use crate::constants::{PHONE_LIST_FILE_NAME, TIME_OVERVIEW_FILE_NAME};
use crate::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Counts and files produced by a run
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub records_loaded: usize,
    pub letters: LetterReport,
    pub phone_entries: usize,
    pub phones_rejected: usize,
    pub hour_buckets: usize,
    pub day_buckets: usize,
    /// Rows left out of the time overview under the skip policy
    pub timestamps_skipped: usize,
    pub phone_list: Option<WrittenFile>,
    pub time_overview: Option<WrittenFile>,
    pub processing_time: Duration,
}

impl RunSummary {
    /// Every file written by the run, letters first
    pub fn output_files(&self) -> Vec<&WrittenFile> {
        self.letters
            .files
            .iter()
            .chain(self.phone_list.iter())
            .chain(self.time_overview.iter())
            .collect()
    }

    pub fn total_output_size(&self) -> u64 {
        self.output_files().iter().map(|file| file.bytes).sum()
    }
}

/// The three templates a run renders
#[derive(Debug, Clone)]
pub struct TemplateSet {
    pub form_letter: Template,
    pub phone_list: Template,
    pub time_overview: Template,
}

impl TemplateSet {
    /// Load every template named by the configuration and check that each
    /// only uses placeholders its pass provides
    pub fn load(config: &Config) -> Result<Self> {
        let templates = Self {
            form_letter: Template::from_file(config.templates.form_letter_path())?,
            phone_list: Template::from_file(config.templates.phone_list_path())?,
            time_overview: Template::from_file(config.templates.time_overview_path())?,
        };

        templates.form_letter.check_placeholders(LETTER_PLACEHOLDERS)?;
        templates.phone_list.check_placeholders(PHONE_LIST_PLACEHOLDERS)?;
        templates
            .time_overview
            .check_placeholders(TIME_OVERVIEW_PLACEHOLDERS)?;
        Ok(templates)
    }
}

/// Runs the three passes over an attendee roster
pub struct EventProcessor<L> {
    config: Config,
    lookup: L,
    show_progress: bool,
}

impl EventProcessor<CivicInfoClient> {
    /// Processor backed by the civic information HTTP client
    pub fn from_config(config: Config) -> Result<Self> {
        let lookup = CivicInfoClient::new(&config.lookup)?;
        if !lookup.has_api_key() {
            warn!("No civic API key configured; letters will carry the fallback text");
        }
        Ok(Self::new(config, lookup))
    }
}

impl<L: RepresentativeLookup> EventProcessor<L> {
    pub fn new(config: Config, lookup: L) -> Self {
        Self {
            config,
            lookup,
            show_progress: false,
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Load inputs and run every pass
    pub async fn run(&self) -> Result<RunSummary> {
        let start_time = Instant::now();

        // Templates first so a missing file fails before any lookups happen
        let templates = TemplateSet::load(&self.config)?;
        let roster = Roster::open(
            &self.config.input.roster_path,
            self.config.input.has_header_row,
        )?;

        let mut summary = self.run_with(&roster, &templates).await?;
        summary.processing_time = start_time.elapsed();

        info!(
            "Processed {} attendees in {:.2?}",
            summary.records_loaded, summary.processing_time
        );
        Ok(summary)
    }

    /// Run every pass over an already loaded roster
    pub async fn run_with(&self, roster: &Roster, templates: &TemplateSet) -> Result<RunSummary> {
        let writer = OutputWriter::new(&self.config.output.root);
        let mut summary = RunSummary {
            records_loaded: roster.len(),
            ..RunSummary::default()
        };

        summary.letters = self
            .generate_letters(roster, &writer, &templates.form_letter)
            .await?;
        self.generate_phone_list(roster, &writer, &templates.phone_list, &mut summary)?;
        self.generate_time_overview(roster, &writer, &templates.time_overview, &mut summary)?;

        Ok(summary)
    }

    async fn generate_letters(
        &self,
        roster: &Roster,
        writer: &OutputWriter,
        template: &Template,
    ) -> Result<LetterReport> {
        info!("Generating thank-you letters");
        LetterGenerator::new(&self.lookup, writer, &self.config.output.letters_dir)
            .with_progress(self.letters_progress_bar())
            .generate(roster, template)
            .await
    }

    fn generate_phone_list(
        &self,
        roster: &Roster,
        writer: &OutputWriter,
        template: &Template,
        summary: &mut RunSummary,
    ) -> Result<()> {
        info!("Building phone directory");
        let directory = build_phone_directory(roster);
        let content = render_phone_directory(&directory, template)?;
        let written = writer.write(
            self.config.output.phone_list_dir.join(PHONE_LIST_FILE_NAME),
            &content,
        )?;

        summary.phone_entries = directory.len();
        summary.phones_rejected = directory.rejected;
        summary.phone_list = Some(written);
        Ok(())
    }

    fn generate_time_overview(
        &self,
        roster: &Roster,
        writer: &OutputWriter,
        template: &Template,
        summary: &mut RunSummary,
    ) -> Result<()> {
        info!("Analyzing registration times");
        let policy = self.config.analysis.malformed_timestamps;
        let hours = hour_statistics(roster, policy)?;
        let days = day_statistics(roster, policy)?;

        let content = render_time_overview(&hours, &days, template)?;
        let written = writer.write(
            self.config
                .output
                .time_overview_dir
                .join(TIME_OVERVIEW_FILE_NAME),
            &content,
        )?;

        summary.hour_buckets = hours.entries.len();
        summary.day_buckets = days.entries.len();
        summary.timestamps_skipped = hours.skipped_rows;
        summary.time_overview = Some(written);
        Ok(())
    }

    fn letters_progress_bar(&self) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");
        let bar = ProgressBar::new(0);
        bar.set_style(style);
        bar
    }
}
