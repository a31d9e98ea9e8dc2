//! Thank-you letter generation
//!
//! One letter per attendee, each naming the attendee's national legislators.
//! Lookups run one at a time in roster order.

use crate::app::adapters::filesystem::{OutputWriter, WrittenFile};
use crate::app::models::{AttendeeRecord, LookupOutcome, Official};
use crate::app::services::civic_lookup::RepresentativeLookup;
use crate::app::services::roster::Roster;
use crate::app::services::template::{Template, TemplateContext, html_escape};
use crate::app::services::zipcode::normalize_zipcode;
use crate::constants::letter_file_name;
use crate::{Error, Result};
use indicatif::ProgressBar;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};

/// Outcome of the letters pass
#[derive(Debug, Clone, Default)]
pub struct LetterReport {
    pub letters_written: usize,
    /// Letters that carry the fallback text instead of officials
    pub lookups_unavailable: usize,
    pub files: Vec<WrittenFile>,
}

/// Placeholders the form letter template may use
pub const LETTER_PLACEHOLDERS: &[&str] =
    &["id", "name", "full_name", "zipcode", "lookup_status", "officials"];

/// Render the officials part of a letter as an HTML fragment
pub fn render_officials(outcome: &LookupOutcome) -> String {
    match outcome.officials() {
        Some(officials) => {
            let mut html = String::from("<ul class=\"officials\">\n");
            for official in officials {
                html.push_str("  <li>");
                html.push_str(&describe_official(official));
                html.push_str("</li>\n");
            }
            html.push_str("</ul>");
            html
        }
        None => html_escape(outcome.fallback_text().unwrap_or_default()),
    }
}

/// Letter file name for an attendee, or `None` if the id is not a plain
/// file name component
fn letter_file(id: &str) -> Option<String> {
    if id.contains(['/', '\\']) {
        return None;
    }

    let file_name = letter_file_name(id);
    let mut components = Path::new(&file_name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Some(file_name),
        _ => None,
    }
}

fn describe_official(official: &Official) -> String {
    let mut line = html_escape(&official.name);
    if let Some(office) = &official.office {
        line.push_str(", ");
        line.push_str(&html_escape(office));
    }
    if let Some(party) = &official.party {
        line.push_str(" (");
        line.push_str(&html_escape(party));
        line.push(')');
    }
    line
}

/// Context handed to the letter template for one attendee
pub fn letter_context(record: &AttendeeRecord, zipcode: &str, outcome: &LookupOutcome) -> TemplateContext {
    let status = if outcome.is_found() { "found" } else { "unavailable" };

    TemplateContext::new()
        .text("id", &record.id)
        .text("name", &record.first_name)
        .text("full_name", &record.display_name())
        .text("zipcode", zipcode)
        .text("lookup_status", status)
        .html("officials", render_officials(outcome))
}

/// Writes one thank-you letter per roster record
pub struct LetterGenerator<'a, L> {
    lookup: &'a L,
    writer: &'a OutputWriter,
    letters_dir: PathBuf,
    progress: ProgressBar,
}

impl<'a, L: RepresentativeLookup> LetterGenerator<'a, L> {
    pub fn new(lookup: &'a L, writer: &'a OutputWriter, letters_dir: impl Into<PathBuf>) -> Self {
        Self {
            lookup,
            writer,
            letters_dir: letters_dir.into(),
            progress: ProgressBar::hidden(),
        }
    }

    /// Report progress on `progress` instead of a hidden bar
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Generate letters for every record; an id that is not a plain file
    /// name, a render failure or a write failure is fatal
    pub async fn generate(&self, roster: &Roster, template: &Template) -> Result<LetterReport> {
        let mut report = LetterReport::default();
        self.writer.ensure_dir(&self.letters_dir)?;
        self.progress.set_length(roster.len() as u64);

        for record in roster.records() {
            let file_name = letter_file(&record.id).ok_or_else(|| {
                Error::roster(
                    roster.path(),
                    format!(
                        "attendee id '{}' on line {} is not usable as a file name",
                        record.id, record.line_number
                    ),
                    None,
                )
            })?;
            self.progress
                .set_message(format!("letter for {}", record.first_name));

            let zipcode = normalize_zipcode(&record.zipcode);
            let outcome = self.lookup.lookup(&zipcode).await;
            if !outcome.is_found() {
                report.lookups_unavailable += 1;
            }

            let letter = template.render(&letter_context(record, &zipcode, &outcome))?;
            let written = self
                .writer
                .write(self.letters_dir.join(&file_name), &letter)?;

            debug!(
                "Letter for attendee {} written to {}",
                record.id,
                written.path.display()
            );
            report.files.push(written);
            report.letters_written += 1;
            self.progress.inc(1);
        }

        self.progress.finish_and_clear();
        info!(
            "Wrote {} letters ({} without representative data)",
            report.letters_written, report.lookups_unavailable
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::LOOKUP_FALLBACK_TEXT;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Lookup stub that resolves only listed postal codes and records calls
    struct StubLookup {
        known: Vec<(&'static str, Vec<Official>)>,
        calls: Mutex<Vec<String>>,
    }

    impl StubLookup {
        fn new(known: Vec<(&'static str, Vec<Official>)>) -> Self {
            Self {
                known,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl RepresentativeLookup for StubLookup {
        async fn lookup(&self, zipcode: &str) -> LookupOutcome {
            self.calls.lock().unwrap().push(zipcode.to_string());
            self.known
                .iter()
                .find(|(zip, _)| *zip == zipcode)
                .map(|(_, officials)| LookupOutcome::Found(officials.clone()))
                .unwrap_or_else(|| LookupOutcome::unavailable("simulated outage"))
        }
    }

    fn record(id: &str, name: &str, zipcode: &str) -> AttendeeRecord {
        AttendeeRecord {
            id: id.to_string(),
            first_name: name.to_string(),
            zipcode: zipcode.to_string(),
            ..AttendeeRecord::default()
        }
    }

    fn letter_template() -> Template {
        Template::new(
            "form_letter.html",
            "<p>Thanks {{name}} ({{id}}, {{zipcode}})</p>\n{{officials}}",
        )
    }

    #[tokio::test]
    async fn test_generate_writes_one_letter_per_record() {
        let temp_dir = TempDir::new().unwrap();
        let writer = OutputWriter::new(temp_dir.path());
        let lookup = StubLookup::new(vec![(
            "20010",
            vec![Official::new("Eleanor Holmes Norton").with_office("Delegate")],
        )]);
        let roster = Roster::from_records(
            "fixture.csv",
            vec![record("1", "Allison", "20010"), record("2", "Sarah", "2202")],
        );

        let report = LetterGenerator::new(&lookup, &writer, "output")
            .generate(&roster, &letter_template())
            .await
            .unwrap();

        assert_eq!(report.letters_written, 2);
        assert_eq!(report.lookups_unavailable, 1);
        assert_eq!(
            *lookup.calls.lock().unwrap(),
            vec!["20010".to_string(), "02202".to_string()]
        );

        let first = std::fs::read_to_string(temp_dir.path().join("output/thanks_1.html")).unwrap();
        assert!(first.starts_with("<p>Thanks Allison (1, 20010)</p>"));
        assert!(first.contains("<li>Eleanor Holmes Norton, Delegate</li>"));
        assert!(first.ends_with("</ul>\n"));
    }

    #[tokio::test]
    async fn test_lookup_failure_still_writes_letter_with_fallback() {
        let temp_dir = TempDir::new().unwrap();
        let writer = OutputWriter::new(temp_dir.path());
        let lookup = StubLookup::new(Vec::new());
        let roster = Roster::from_records("fixture.csv", vec![record("9", "Jenny", "")]);

        let report = LetterGenerator::new(&lookup, &writer, "output")
            .generate(&roster, &letter_template())
            .await
            .unwrap();

        assert_eq!(report.letters_written, 1);
        assert_eq!(report.lookups_unavailable, 1);

        let letter = std::fs::read_to_string(temp_dir.path().join("output/thanks_9.html")).unwrap();
        assert!(letter.contains(LOOKUP_FALLBACK_TEXT));
        assert!(letter.contains("(9, 00000)"));
    }

    #[tokio::test]
    async fn test_template_error_aborts_the_pass() {
        let temp_dir = TempDir::new().unwrap();
        let writer = OutputWriter::new(temp_dir.path());
        let lookup = StubLookup::new(Vec::new());
        let roster = Roster::from_records("fixture.csv", vec![record("1", "Allison", "20010")]);
        let template = Template::new("form_letter.html", "{{ legislators }}");

        let err = LetterGenerator::new(&lookup, &writer, "output")
            .generate(&roster, &template)
            .await
            .unwrap_err();

        assert_eq!(err.exit_code(), 5);
        assert!(!temp_dir.path().join("output/thanks_1.html").exists());
    }

    #[tokio::test]
    async fn test_id_with_path_segments_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("root");
        let writer = OutputWriter::new(&root);
        let lookup = StubLookup::new(Vec::new());
        let mut escaping = record("/../../../escaped", "Mallory", "20010");
        escaping.line_number = 4;
        let roster = Roster::from_records("fixture.csv", vec![escaping]);

        let err = LetterGenerator::new(&lookup, &writer, "output")
            .generate(&roster, &letter_template())
            .await
            .unwrap_err();

        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("line 4"));
        assert!(lookup.calls.lock().unwrap().is_empty());
        assert!(!temp_dir.path().join("escaped.html").exists());
        assert!(!root.join("escaped.html").exists());
    }

    #[test]
    fn test_letter_file_accepts_plain_ids_only() {
        assert_eq!(letter_file("17").as_deref(), Some("thanks_17.html"));
        assert_eq!(letter_file("a.b").as_deref(), Some("thanks_a.b.html"));
        assert_eq!(letter_file("").as_deref(), Some("thanks_.html"));
        assert_eq!(letter_file("../x"), None);
        assert_eq!(letter_file("x/y"), None);
        assert_eq!(letter_file("x\\y"), None);
    }

    #[test]
    fn test_render_officials_escapes_names_and_lists_party() {
        let outcome = LookupOutcome::Found(vec![
            Official::new("A <B>").with_office("Senator").with_party("Independent"),
        ]);
        assert_eq!(
            render_officials(&outcome),
            "<ul class=\"officials\">\n  <li>A &lt;B&gt;, Senator (Independent)</li>\n</ul>"
        );
    }

    #[test]
    fn test_letter_context_exposes_status() {
        let context = letter_context(
            &record("3", "Sarah", "33703"),
            "33703",
            &LookupOutcome::unavailable("down"),
        );
        assert_eq!(context.get("lookup_status"), Some("unavailable"));
        assert_eq!(context.get("officials"), Some(LOOKUP_FALLBACK_TEXT));
    }
}
