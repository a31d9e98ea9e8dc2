//! Phone directory of attendees keyed by first name

use crate::app::models::AttendeeRecord;
use crate::app::services::template::{Template, TemplateContext, html_escape};
use crate::constants::{PHONE_COUNTRY_CODE, PHONE_LENGTH};
use crate::Result;
use std::collections::HashMap;
use tracing::debug;

/// Placeholders the phone list template may use
pub const PHONE_LIST_PLACEHOLDERS: &[&str] = &["phone_rows", "entry_count"];

/// Reduce a raw phone field to ten characters, or `None` if it cannot be.
///
/// Everything outside `[0-9A-Za-z]` is dropped. Eleven characters are
/// accepted only with a leading `1`, which is removed.
pub fn clean_phone_number(raw: &str) -> Option<String> {
    let cleaned: String = raw.chars().filter(char::is_ascii_alphanumeric).collect();

    match cleaned.len() {
        PHONE_LENGTH => Some(cleaned),
        len if len == PHONE_LENGTH + 1 && cleaned.starts_with(PHONE_COUNTRY_CODE) => {
            Some(cleaned[1..].to_string())
        }
        _ => None,
    }
}

/// First name -> normalized phone, in first-seen name order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhoneDirectory {
    entries: Vec<(String, String)>,
    positions: HashMap<String, usize>,
    /// Records whose phone failed the shape check
    pub rejected: usize,
}

impl PhoneDirectory {
    /// Record `phone` for `name`; an existing name is overwritten in place
    pub fn insert(&mut self, name: impl Into<String>, phone: impl Into<String>) {
        let name = name.into();
        let phone = phone.into();
        match self.positions.get(&name) {
            Some(&position) => self.entries[position].1 = phone,
            None => {
                self.positions.insert(name.clone(), self.entries.len());
                self.entries.push((name, phone));
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.positions
            .get(name)
            .map(|&position| self.entries[position].1.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, phone)| (name.as_str(), phone.as_str()))
    }
}

/// Build the directory; invalid numbers are skipped without error
pub fn build_phone_directory<'a>(
    records: impl IntoIterator<Item = &'a AttendeeRecord>,
) -> PhoneDirectory {
    let mut directory = PhoneDirectory::default();

    for record in records {
        match clean_phone_number(&record.home_phone) {
            Some(phone) => directory.insert(record.first_name.as_str(), phone),
            None => directory.rejected += 1,
        }
    }

    debug!(
        "Phone directory has {} entries, {} numbers rejected",
        directory.len(),
        directory.rejected
    );
    directory
}

/// Render the directory through the phone list template
pub fn render_phone_directory(directory: &PhoneDirectory, template: &Template) -> Result<String> {
    let rows: String = directory
        .entries()
        .map(|(name, phone)| {
            format!(
                "    <tr><td>{}</td><td>{}</td></tr>\n",
                html_escape(name),
                html_escape(phone)
            )
        })
        .collect();

    let context = TemplateContext::new()
        .html("phone_rows", rows.trim_end_matches('\n'))
        .text("entry_count", &directory.len().to_string());

    template.render(&context)
}
