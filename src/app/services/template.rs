//! HTML templates with `{{ placeholder }}` substitution
//!
//! Rendering is a pure function of the template source and a context map.
//! A placeholder without a value is an error, never an empty string.

use crate::{Error, Result};
use regex::Regex;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").expect("placeholder pattern is valid")
});

/// Escape text for inclusion in HTML element content or attribute values
pub fn html_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Named values available to a template
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateContext {
    values: BTreeMap<String, String>,
}

impl TemplateContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert plain text; it is HTML-escaped on insertion
    pub fn text(mut self, key: impl Into<String>, value: &str) -> Self {
        self.values.insert(key.into(), html_escape(value));
        self
    }

    /// Insert a pre-rendered HTML fragment verbatim
    pub fn html(mut self, key: impl Into<String>, fragment: impl Into<String>) -> Self {
        self.values.insert(key.into(), fragment.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

/// A parsed template
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    source: String,
}

impl Template {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
        }
    }

    /// Load a template file; a missing file is a template error
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| {
            Error::template(
                path.display().to_string(),
                format!("failed to read template: {}", e),
            )
        })?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self { name, source })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Placeholder names in order of first appearance
    pub fn placeholders(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for captures in PLACEHOLDER.captures_iter(&self.source) {
            if let Some(name) = captures.get(1).map(|m| m.as_str()) {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names
    }

    /// Fail if the template uses a placeholder outside `known`
    pub fn check_placeholders(&self, known: &[&str]) -> Result<()> {
        match self.placeholders().into_iter().find(|name| !known.contains(name)) {
            Some(unknown) => Err(Error::template(
                &self.name,
                format!(
                    "unknown placeholder '{}' (expected one of: {})",
                    unknown,
                    known.join(", ")
                ),
            )),
            None => Ok(()),
        }
    }

    /// Substitute every placeholder from `context`
    pub fn render(&self, context: &TemplateContext) -> Result<String> {
        let mut rendered = String::with_capacity(self.source.len());
        let mut last_end = 0;

        for captures in PLACEHOLDER.captures_iter(&self.source) {
            let (Some(whole), Some(key)) = (captures.get(0), captures.get(1)) else {
                continue;
            };

            let value = context.get(key.as_str()).ok_or_else(|| {
                Error::template(
                    &self.name,
                    format!("no value for placeholder '{}'", key.as_str()),
                )
            })?;

            rendered.push_str(&self.source[last_end..whole.start()]);
            rendered.push_str(value);
            last_end = whole.end();
        }

        rendered.push_str(&self.source[last_end..]);
        Ok(rendered)
    }
}
