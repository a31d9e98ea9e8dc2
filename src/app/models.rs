//! Data models for roster processing
//!
//! This module contains the attendee record read from the roster and the
//! representative data returned by the civic lookup.

use crate::constants::LOOKUP_FALLBACK_TEXT;
use serde::{Deserialize, Serialize};

// =============================================================================
// Attendee Record
// =============================================================================

/// One row of the attendee roster
///
/// Built by the schema-aware roster reader; columns absent from an optional
/// position come through as empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AttendeeRecord {
    /// Value of the first column, used to name the letter file
    pub id: String,

    pub first_name: String,
    pub last_name: String,
    pub email: String,

    /// Home phone exactly as written in the roster
    pub home_phone: String,

    pub street: String,
    pub city: String,
    pub state: String,

    /// Raw postal code, not yet normalized
    pub zipcode: String,

    /// Raw registration timestamp (`MM/DD/YY H:MM`)
    pub registered_at_raw: String,

    /// 1-based line in the source file
    pub line_number: u64,
}

impl AttendeeRecord {
    /// Full display name, falling back to the first name alone
    pub fn display_name(&self) -> String {
        if self.last_name.is_empty() {
            self.first_name.clone()
        } else {
            format!("{} {}", self.first_name, self.last_name)
        }
    }
}

// =============================================================================
// Representatives
// =============================================================================

/// An elected official returned by the civic lookup
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Official {
    pub name: String,

    /// Office held, e.g. "U.S. Senator"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub office: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub party: Option<String>,

    #[serde(default)]
    pub phones: Vec<String>,

    #[serde(default)]
    pub urls: Vec<String>,

    #[serde(default)]
    pub emails: Vec<String>,
}

impl Official {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_office(mut self, office: impl Into<String>) -> Self {
        self.office = Some(office.into());
        self
    }

    pub fn with_party(mut self, party: impl Into<String>) -> Self {
        self.party = Some(party.into());
        self
    }
}

/// Result of resolving representatives for one postal code
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    /// Officials resolved by the directory service
    Found(Vec<Official>),
    /// Lookup failed; the reason is for logs, not for letters
    Unavailable { reason: String },
}

impl LookupOutcome {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// Officials when found, otherwise `None`
    pub fn officials(&self) -> Option<&[Official]> {
        match self {
            Self::Found(officials) => Some(officials),
            Self::Unavailable { .. } => None,
        }
    }

    /// Human-readable text shown in place of officials on failure
    pub fn fallback_text(&self) -> Option<&'static str> {
        match self {
            Self::Found(_) => None,
            Self::Unavailable { .. } => Some(LOOKUP_FALLBACK_TEXT),
        }
    }
}
