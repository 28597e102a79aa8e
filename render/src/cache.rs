//! Template discovery and compilation.
//!
//! Page templates are `*.page.html` files; shared layout fragments are
//! `*.layout.html` files in the same directory. Every page is compiled with
//! all layouts available, so a page may `{% extends %}` any of them (or
//! none, if the directory has no layouts). Templates are keyed by file
//! name, e.g. `"home.page.html"`.

use crate::error::{RenderError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tera::{Tera, Value};

/// Signature for a template helper registered as a Tera filter.
pub type FilterFn = fn(&Value, &HashMap<String, Value>) -> tera::Result<Value>;

/// The helper set compiled into every template.
///
/// Passed explicitly into [`TemplateCache::build`]; there is no ambient
/// registry.
#[derive(Debug, Clone)]
pub struct HelperSet {
    filters: Vec<(&'static str, FilterFn)>,
}

impl HelperSet {
    /// Empty helper set.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// The helpers the site's pages use: `human_date` and `date_with_time`.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            filters: vec![
                ("human_date", human_date as FilterFn),
                ("date_with_time", date_with_time as FilterFn),
            ],
        }
    }

    /// Add a named filter.
    #[must_use]
    pub fn with_filter(mut self, name: &'static str, filter: FilterFn) -> Self {
        self.filters.push((name, filter));
        self
    }

    fn register(&self, tera: &mut Tera) {
        for (name, filter) in &self.filters {
            tera.register_filter(name, *filter);
        }
    }
}

/// Format a date-ish value as `YYYY-MM-DD`.
///
/// Accepts RFC 3339 timestamps, `YYYY-MM-DDTHH:MM:SS`, or a bare date, and
/// passes anything else through unchanged rather than failing the page.
fn human_date(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    Ok(Value::String(format_temporal(value, "%Y-%m-%d")))
}

/// Format a timestamp as `YYYY-MM-DD HH:MM`.
fn date_with_time(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    Ok(Value::String(format_temporal(value, "%Y-%m-%d %H:%M")))
}

fn format_temporal(value: &Value, format: &str) -> String {
    let Some(raw) = value.as_str() else {
        return value.to_string();
    };
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return ts.format(format).to_string();
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return ts.format(format).to_string();
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        // A bare date has no time component to show.
        return date.format("%Y-%m-%d").to_string();
    }
    raw.to_string()
}

/// A compiled set of page templates.
#[derive(Debug)]
pub struct TemplateCache {
    tera: Tera,
}

impl TemplateCache {
    /// Discover and compile every page in `dir` together with the shared
    /// layouts found there.
    ///
    /// # Errors
    ///
    /// [`RenderError::Io`] if the directory cannot be read,
    /// [`RenderError::Compilation`] if any page or layout fails to parse.
    pub fn build(dir: &Path, helpers: &HelperSet) -> Result<Self> {
        let mut files: Vec<(PathBuf, Option<String>)> = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if name.ends_with(".page.html") || name.ends_with(".layout.html") {
                files.push((path.clone(), Some(name.to_string())));
            }
        }
        // Deterministic compile order, and a stable name → template map.
        files.sort();

        let mut tera = Tera::default();
        helpers.register(&mut tera);
        tera.add_template_files(files)
            .map_err(|e| RenderError::Compilation(e.to_string()))?;
        Ok(Self { tera })
    }

    /// Whether `name` is a compiled page.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.tera.get_template_names().any(|n| n == name)
    }

    /// Names of all compiled templates (pages and layouts).
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tera.get_template_names()
    }

    pub(crate) const fn tera(&self) -> &Tera {
        &self.tera
    }
}
