//! Representative lookup against a civic-information directory
//!
//! Resolves the national upper- and lower-chamber legislators for a postal
//! code. Every failure (missing key, transport, HTTP status, undecodable
//! body, no match) is reported as [`LookupOutcome::Unavailable`]; letter
//! generation decides what to print in that case and never aborts on it.

use crate::app::models::{LookupOutcome, Official};
use crate::config::LookupConfig;
use crate::constants::{CIVIC_LEVELS, CIVIC_ROLES};
use crate::{Error, Result};
use serde::Deserialize;
use std::future::Future;
use tracing::{debug, warn};

/// Source of elected officials for a normalized postal code
pub trait RepresentativeLookup {
    fn lookup(&self, zipcode: &str) -> impl Future<Output = LookupOutcome> + Send;
}

// Wire format of the `representatives` endpoint; only the fields we use.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RepresentativeInfoResponse {
    #[serde(default)]
    offices: Vec<OfficeEntry>,
    #[serde(default)]
    officials: Vec<OfficialEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OfficeEntry {
    name: String,
    #[serde(default)]
    official_indices: Vec<usize>,
}

#[derive(Debug, Deserialize)]
struct OfficialEntry {
    name: String,
    party: Option<String>,
    #[serde(default)]
    phones: Vec<String>,
    #[serde(default)]
    urls: Vec<String>,
    #[serde(default)]
    emails: Vec<String>,
}

impl RepresentativeInfoResponse {
    fn into_officials(self) -> Vec<Official> {
        let mut officials: Vec<Official> = self
            .officials
            .into_iter()
            .map(|entry| Official {
                name: entry.name,
                office: None,
                party: entry.party,
                phones: entry.phones,
                urls: entry.urls,
                emails: entry.emails,
            })
            .collect();

        for office in &self.offices {
            for &index in &office.official_indices {
                if let Some(official) = officials.get_mut(index) {
                    official.office.get_or_insert_with(|| office.name.clone());
                }
            }
        }

        officials
    }
}

/// HTTP client for a Google Civic Information compatible service
#[derive(Debug, Clone)]
pub struct CivicInfoClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl CivicInfoClient {
    pub fn new(config: &LookupConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("event-manager/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::configuration(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone().filter(|key| !key.trim().is_empty()),
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    async fn fetch(&self, zipcode: &str) -> std::result::Result<Vec<Official>, String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| "no civic API key configured".to_string())?;

        let url = format!("{}/representatives", self.base_url);
        let mut query: Vec<(&str, &str)> = vec![("address", zipcode), ("levels", CIVIC_LEVELS)];
        query.extend(CIVIC_ROLES.iter().map(|role| ("roles", *role)));
        query.push(("key", api_key));

        let response = self
            .http
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| format!("request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("directory returned HTTP {}", status));
        }

        let body: RepresentativeInfoResponse = response
            .json()
            .await
            .map_err(|e| format!("invalid response body: {}", e))?;

        let officials = body.into_officials();
        if officials.is_empty() {
            return Err(format!("no officials found for {}", zipcode));
        }

        Ok(officials)
    }
}

impl RepresentativeLookup for CivicInfoClient {
    async fn lookup(&self, zipcode: &str) -> LookupOutcome {
        match self.fetch(zipcode).await {
            Ok(officials) => {
                debug!("Resolved {} officials for {}", officials.len(), zipcode);
                LookupOutcome::Found(officials)
            }
            Err(reason) => {
                warn!("Representative lookup for {} failed: {}", zipcode, reason);
                LookupOutcome::unavailable(reason)
            }
        }
    }
}
