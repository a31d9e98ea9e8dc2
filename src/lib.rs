//! Event Manager Library
//!
//! Turns an event attendee roster (CSV) into three artifacts:
//! - a thank-you letter per attendee naming their national legislators,
//!   resolved by postal code through a civic information service
//! - a phone directory of normalized ten-digit numbers keyed by first name
//! - an overview of registrations by hour of day and by weekday
//!
//! The roster is read once and every pass iterates the same buffered
//! records. Representative lookup failures never stop a run; they put a
//! fallback pointer into the affected letters instead.

pub mod config;
pub mod constants;
pub mod error;
pub mod processor;

// Core application modules
pub mod app {
    pub mod models;
    pub mod services {
        pub mod civic_lookup;
        pub mod letters;
        pub mod phone_directory;
        pub mod roster;
        pub mod template;
        pub mod time_analysis;
        pub mod zipcode;
    }
    pub mod adapters {
        pub mod filesystem;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use app::models::{AttendeeRecord, LookupOutcome, Official};
pub use app::services::roster::Roster;
pub use config::Config;
pub use error::{Error, Result};
pub use processor::{EventProcessor, RunSummary, TemplateSet};
