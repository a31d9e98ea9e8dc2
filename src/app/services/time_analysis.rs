//! Registration time statistics
//!
//! Tabulates when attendees registered, by hour of day and by weekday.
//! Both tallies are ordered by count, highest first; equal counts keep the
//! order in which the key was first seen.

use crate::app::models::AttendeeRecord;
use crate::app::services::template::{Template, TemplateContext, html_escape};
use crate::constants::REGDATE_FORMAT;
use crate::{Error, Result};
use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;
use tracing::{debug, info, warn};

/// Placeholders the time overview template may use
pub const TIME_OVERVIEW_PLACEHOLDERS: &[&str] = &["hour_rows", "day_rows", "skipped_rows"];

/// What to do with a registration timestamp that does not parse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedTimestampPolicy {
    /// Fail the whole time-analysis pass on the first bad row
    #[default]
    Abort,
    /// Leave bad rows out of the tallies and count them
    Skip,
}

/// Parse a roster timestamp such as `11/12/08 10:47` or `2/2/09  9:05`
///
/// Two-digit years follow the POSIX pivot: `69`-`99` are 19xx, `00`-`68`
/// are 20xx.
pub fn parse_registration_time(raw: &str) -> std::result::Result<NaiveDateTime, chrono::ParseError> {
    // Space-padded hours collapse to a single separator
    let compact = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    let parsed = NaiveDateTime::parse_from_str(&compact, REGDATE_FORMAT)?;

    // chrono pivots at 70, so `69` comes back as 2069
    if parsed.year() == 2069 {
        return Ok(parsed.with_year(1969).unwrap_or(parsed));
    }
    Ok(parsed)
}

/// Ordered key -> count tally
#[derive(Debug, Clone)]
pub struct Histogram<K> {
    counts: Vec<(K, usize)>,
    positions: HashMap<K, usize>,
}

impl<K> Default for Histogram<K> {
    fn default() -> Self {
        Self {
            counts: Vec::new(),
            positions: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash + Clone> Histogram<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, key: K) {
        match self.positions.get(&key) {
            Some(&position) => self.counts[position].1 += 1,
            None => {
                self.positions.insert(key.clone(), self.counts.len());
                self.counts.push((key, 1));
            }
        }
    }

    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, count)| count).sum()
    }

    /// Pairs sorted by count descending; the sort is stable
    pub fn sorted_desc(&self) -> Vec<(K, usize)> {
        let mut sorted = self.counts.clone();
        sorted.sort_by(|a, b| b.1.cmp(&a.1));
        sorted
    }
}

/// A sorted tally plus the rows left out of it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeTally<K> {
    pub entries: Vec<(K, usize)>,
    pub skipped_rows: usize,
}

fn tabulate<'a, K, F>(
    records: impl IntoIterator<Item = &'a AttendeeRecord>,
    policy: MalformedTimestampPolicy,
    key_of: F,
) -> Result<TimeTally<K>>
where
    K: Eq + Hash + Clone,
    F: Fn(&NaiveDateTime) -> K,
{
    let mut histogram = Histogram::new();
    let mut skipped_rows = 0;

    for record in records {
        match parse_registration_time(&record.registered_at_raw) {
            Ok(registered_at) => histogram.increment(key_of(&registered_at)),
            Err(source) => match policy {
                MalformedTimestampPolicy::Abort => {
                    return Err(Error::timestamp(
                        record.line_number,
                        &record.registered_at_raw,
                        source,
                    ));
                }
                MalformedTimestampPolicy::Skip => {
                    warn!(
                        "Skipping malformed registration timestamp '{}' on line {}",
                        record.registered_at_raw, record.line_number
                    );
                    skipped_rows += 1;
                }
            },
        }
    }

    debug!(
        "Tabulated {} registrations into {} buckets",
        histogram.total(),
        histogram.counts.len()
    );
    Ok(TimeTally {
        entries: histogram.sorted_desc(),
        skipped_rows,
    })
}

/// Registrations per hour of day (0-23)
pub fn hour_statistics<'a>(
    records: impl IntoIterator<Item = &'a AttendeeRecord>,
    policy: MalformedTimestampPolicy,
) -> Result<TimeTally<u32>> {
    tabulate(records, policy, |registered_at| registered_at.hour())
}

/// Registrations per weekday, by full English name
pub fn day_statistics<'a>(
    records: impl IntoIterator<Item = &'a AttendeeRecord>,
    policy: MalformedTimestampPolicy,
) -> Result<TimeTally<String>> {
    tabulate(records, policy, |registered_at| {
        registered_at.format("%A").to_string()
    })
}

fn histogram_rows<K: Display>(entries: &[(K, usize)]) -> String {
    entries
        .iter()
        .map(|(key, count)| {
            format!(
                "    <tr><td>{}</td><td>{}</td></tr>",
                html_escape(&key.to_string()),
                count
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render both tallies through the overview template
pub fn render_time_overview(
    hours: &TimeTally<u32>,
    days: &TimeTally<String>,
    template: &Template,
) -> Result<String> {
    let skipped = hours.skipped_rows.max(days.skipped_rows);
    if skipped > 0 {
        info!("{} registrations left out of the time overview", skipped);
    }

    let context = TemplateContext::new()
        .html("hour_rows", histogram_rows(&hours.entries))
        .html("day_rows", histogram_rows(&days.entries))
        .text("skipped_rows", &skipped.to_string());

    template.render(&context)
}
