//! Attendee roster reader
//!
//! Loads the roster CSV once into memory and hands out restartable
//! iterations over it. Header names are normalized to symbolic keys
//! (`first_Name` -> `first_name`) and required columns are checked up front,
//! so a renamed column fails the load instead of yielding empty fields.

use crate::app::models::AttendeeRecord;
use crate::constants::columns;
use crate::{Error, Result};
use csv::{ReaderBuilder, StringRecord};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Normalize a header cell to its symbolic key.
///
/// Lowercases, drops everything that is neither a word character nor
/// whitespace, trims, then joins whitespace runs with `_`.
pub fn symbolic_key(header: &str) -> String {
    let cleaned: String = header
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect();

    cleaned.split_whitespace().collect::<Vec<_>>().join("_")
}

/// Column positions resolved from the header
#[derive(Debug, Clone)]
struct ColumnIndex {
    positions: HashMap<String, usize>,
}

impl ColumnIndex {
    fn from_keys<'a>(keys: impl IntoIterator<Item = &'a str>) -> Self {
        let mut positions = HashMap::new();
        for (position, key) in keys.into_iter().enumerate() {
            // First occurrence wins for duplicate header names
            positions.entry(key.to_string()).or_insert(position);
        }
        Self { positions }
    }

    fn from_header(header: &StringRecord) -> Self {
        let keys: Vec<String> = header.iter().map(symbolic_key).collect();
        Self::from_keys(keys.iter().map(String::as_str))
    }

    fn require(&self, path: &Path) -> Result<()> {
        for column in columns::REQUIRED {
            if !self.positions.contains_key(*column) {
                return Err(Error::schema(path, *column));
            }
        }
        Ok(())
    }

    fn field(&self, row: &StringRecord, key: &str) -> String {
        self.positions
            .get(key)
            .and_then(|&position| row.get(position))
            .unwrap_or_default()
            .to_string()
    }

    fn build_record(&self, row: &StringRecord, line_number: u64) -> AttendeeRecord {
        AttendeeRecord {
            id: row.get(0).unwrap_or_default().to_string(),
            first_name: self.field(row, columns::FIRST_NAME),
            last_name: self.field(row, columns::LAST_NAME),
            email: self.field(row, columns::EMAIL),
            home_phone: self.field(row, columns::HOME_PHONE),
            street: self.field(row, columns::STREET),
            city: self.field(row, columns::CITY),
            state: self.field(row, columns::STATE),
            zipcode: self.field(row, columns::ZIPCODE),
            registered_at_raw: self.field(row, columns::REGDATE),
            line_number,
        }
    }
}

/// The attendee roster, buffered in file order
#[derive(Debug, Clone)]
pub struct Roster {
    path: PathBuf,
    records: Vec<AttendeeRecord>,
}

impl Roster {
    /// Read and validate the roster at `path`
    pub fn open(path: impl AsRef<Path>, has_header_row: bool) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = ReaderBuilder::new()
            .has_headers(has_header_row)
            .flexible(true)
            .from_path(path)
            .map_err(|e| Error::roster(path, "failed to open roster", Some(e)))?;

        let index = if has_header_row {
            let header = reader
                .headers()
                .map_err(|e| Error::roster(path, "failed to read header row", Some(e)))?;
            ColumnIndex::from_header(header)
        } else {
            ColumnIndex::from_keys(columns::HEADERLESS_LAYOUT.iter().copied())
        };
        index.require(path)?;

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row.map_err(|e| Error::roster(path, "malformed roster row", Some(e)))?;
            let line_number = row.position().map(|p| p.line()).unwrap_or_default();

            if row.iter().all(|field| field.trim().is_empty()) {
                debug!("Skipping blank roster line {}", line_number);
                continue;
            }

            records.push(index.build_record(&row, line_number));
        }

        info!(
            "Loaded {} attendee records from {}",
            records.len(),
            path.display()
        );

        Ok(Self {
            path: path.to_path_buf(),
            records,
        })
    }

    /// Build a roster from records already in memory
    pub fn from_records(path: impl Into<PathBuf>, records: Vec<AttendeeRecord>) -> Self {
        Self {
            path: path.into(),
            records,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate from the first record; every call starts over
    pub fn records(&self) -> std::slice::Iter<'_, AttendeeRecord> {
        self.records.iter()
    }

    /// A cursor over the roster that can be rewound explicitly
    pub fn cursor(&self) -> RosterCursor<'_> {
        RosterCursor {
            records: &self.records,
            position: 0,
        }
    }
}

impl<'a> IntoIterator for &'a Roster {
    type Item = &'a AttendeeRecord;
    type IntoIter = std::slice::Iter<'a, AttendeeRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records()
    }
}

/// Sequential reader over a [`Roster`] with an explicit rewind
#[derive(Debug, Clone)]
pub struct RosterCursor<'a> {
    records: &'a [AttendeeRecord],
    position: usize,
}

impl RosterCursor<'_> {
    /// Reset iteration to the first data row
    pub fn rewind(&mut self) {
        self.position = 0;
    }

    pub fn position(&self) -> usize {
        self.position
    }
}

impl<'a> Iterator for RosterCursor<'a> {
    type Item = &'a AttendeeRecord;

    fn next(&mut self) -> Option<Self::Item> {
        let record = self.records.get(self.position)?;
        self.position += 1;
        Some(record)
    }
}
