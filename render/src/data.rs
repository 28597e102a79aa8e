//! Per-response template data bag.

use bookings_core::Form;
use serde::Serialize;
use std::collections::BTreeMap;

/// Everything a page render can draw on.
///
/// Created fresh per request and discarded after the render. The one-shot
/// message slots (`flash`, `warning`, `error`), the CSRF token, and the
/// authenticated flag are filled in by the pipeline from the session; the
/// maps and form errors are supplied by the handler.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TemplateData {
    /// Named strings (dates, the admin `src` tag).
    pub string_map: BTreeMap<String, String>,
    /// Named integers.
    pub int_map: BTreeMap<String, i64>,
    /// Named floats.
    pub float_map: BTreeMap<String, f64>,
    /// Arbitrary keyed values (domain records for the page).
    pub data: BTreeMap<String, serde_json::Value>,
    /// Forgery-protection token for forms on this page.
    pub csrf_token: String,
    /// One-shot informational message.
    pub flash: String,
    /// One-shot warning message.
    pub warning: String,
    /// One-shot error message.
    pub error: String,
    /// Whether the visitor is logged in.
    pub is_authenticated: bool,
    /// Field → all validation messages, in rule order.
    pub form_errors: BTreeMap<String, Vec<String>>,
    /// Field → first validation message, what the page shows.
    pub errors_first: BTreeMap<String, String>,
    /// Field → submitted value, for re-populating a rejected form.
    pub form_values: BTreeMap<String, String>,
}

impl TemplateData {
    /// Empty bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a keyed domain value.
    ///
    /// Values that fail to serialize are skipped with a warning; a page
    /// missing one data key beats no page at all.
    #[must_use]
    pub fn with_data(mut self, key: &str, value: impl Serialize) -> Self {
        match serde_json::to_value(value) {
            Ok(value) => {
                self.data.insert(key.to_string(), value);
            }
            Err(err) => {
                tracing::warn!(key, error = %err, "dropping unserializable template value");
            }
        }
        self
    }

    /// Attach a named string.
    #[must_use]
    pub fn with_string(mut self, key: &str, value: impl Into<String>) -> Self {
        self.string_map.insert(key.to_string(), value.into());
        self
    }

    /// Attach a named integer.
    #[must_use]
    pub fn with_int(mut self, key: &str, value: i64) -> Self {
        self.int_map.insert(key.to_string(), value);
        self
    }

    /// Attach a validated form's errors and submitted values.
    #[must_use]
    pub fn with_form(mut self, form: &Form) -> Self {
        self.errors_first = form.errors.first_map();
        let fields: Vec<String> = self.errors_first.keys().cloned().collect();
        for field in fields {
            let all = form.errors.all(&field).to_vec();
            self.form_errors.insert(field, all);
        }
        for (field, values) in form.submission().iter() {
            if let Some(value) = values.first() {
                self.form_values.insert(field.clone(), value.clone());
            }
        }
        self
    }
}
