//! Application constants for the event manager
//!
//! Default paths, roster column names, civic lookup parameters and the
//! fixed text substituted when a representative lookup fails.

// =============================================================================
// Roster Columns
// =============================================================================

/// Symbolic column keys read from the attendee roster
pub mod columns {
    pub const REGDATE: &str = "regdate";
    pub const FIRST_NAME: &str = "first_name";
    pub const LAST_NAME: &str = "last_name";
    pub const EMAIL: &str = "email_address";
    pub const HOME_PHONE: &str = "homephone";
    pub const STREET: &str = "street";
    pub const CITY: &str = "city";
    pub const STATE: &str = "state";
    pub const ZIPCODE: &str = "zipcode";

    /// Columns every roster must carry
    pub const REQUIRED: &[&str] = &[FIRST_NAME, ZIPCODE, HOME_PHONE, REGDATE];

    /// Column layout assumed when the roster has no header row.
    /// The first column is always the attendee id.
    pub const HEADERLESS_LAYOUT: &[&str] = &[
        "id", REGDATE, FIRST_NAME, LAST_NAME, EMAIL, HOME_PHONE, STREET, CITY, STATE, ZIPCODE,
    ];
}

// =============================================================================
// Default Paths
// =============================================================================

/// Roster read when no path is given on the command line
pub const DEFAULT_ROSTER_PATH: &str = "event_attendees.csv";

pub const DEFAULT_LETTERS_DIR: &str = "output";
pub const DEFAULT_PHONE_LIST_DIR: &str = "phone_list";
pub const DEFAULT_TIME_OVERVIEW_DIR: &str = "time_overview";

pub const PHONE_LIST_FILE_NAME: &str = "phone_list.html";
pub const TIME_OVERVIEW_FILE_NAME: &str = "time_overview.html";

pub const DEFAULT_TEMPLATES_DIR: &str = "templates";
pub const FORM_LETTER_TEMPLATE: &str = "form_letter.html";
pub const PHONE_LIST_TEMPLATE: &str = "phone_list.html";
pub const TIME_OVERVIEW_TEMPLATE: &str = "regtime_overview.html";

/// Config file name looked up under the user config directory
pub const CONFIG_DIR_NAME: &str = "event-manager";
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Letter file name for a given attendee id
pub fn letter_file_name(id: &str) -> String {
    format!("thanks_{}.html", id)
}

// =============================================================================
// Civic Lookup
// =============================================================================

pub const DEFAULT_CIVIC_API_BASE_URL: &str = "https://www.googleapis.com/civicinfo/v2";

/// Only national-level offices are requested
pub const CIVIC_LEVELS: &str = "country";

/// Upper and lower chamber legislators
pub const CIVIC_ROLES: &[&str] = &["legislatorUpperBody", "legislatorLowerBody"];

pub const ENV_CIVIC_API_KEY: &str = "CIVIC_API_KEY";
pub const ENV_CIVIC_API_BASE_URL: &str = "CIVIC_API_BASE_URL";

/// Text placed in a letter when representatives cannot be resolved
pub const LOOKUP_FALLBACK_TEXT: &str = "You can find your representatives by visiting www.commoncause.org/take-action/find-elected-officials";

// =============================================================================
// Normalization
// =============================================================================

/// Length of a normalized postal code
pub const ZIPCODE_LENGTH: usize = 5;

/// Length of a normalized phone number
pub const PHONE_LENGTH: usize = 10;

/// Country code that may prefix an 11-character phone number
pub const PHONE_COUNTRY_CODE: char = '1';

/// Registration timestamp layout, e.g. `11/12/08 10:47`
pub const REGDATE_FORMAT: &str = "%m/%d/%y %H:%M";
