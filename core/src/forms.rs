//! Declarative form validation.
//!
//! A [`FormSubmission`] is the raw multi-valued field map parsed from a
//! urlencoded request body. A [`Form`] wraps one submission together with
//! the [`ValidationErrors`] accumulated by the rule methods. Rules are
//! independent and cumulative: a field may collect several errors, and the
//! form is valid only when no field has any.

use serde::Serialize;
use std::collections::BTreeMap;

/// Error message for a blank or absent required field.
const MSG_BLANK: &str = "This field cannot be blank.";
/// Error message for an invalid email address.
const MSG_EMAIL: &str = "Invalid email address.";

/// Raw multi-valued form submission: field name → submitted values.
///
/// Owned by the request that parsed it and immutable once validated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormSubmission {
    fields: BTreeMap<String, Vec<String>>,
}

impl FormSubmission {
    /// Create an empty submission (for rendering a blank form).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            fields: BTreeMap::new(),
        }
    }

    /// Parse a urlencoded body such as `first-name=Ali&email=a%40b.com`.
    ///
    /// Duplicate field names accumulate in submission order.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not valid urlencoded data.
    pub fn from_urlencoded(body: &str) -> Result<Self, serde_urlencoded::de::Error> {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(body)?;
        Ok(Self::from_pairs(pairs))
    }

    /// Build a submission from already-decoded key/value pairs.
    #[must_use]
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut fields: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (name, value) in pairs {
            fields.entry(name).or_default().push(value);
        }
        Self { fields }
    }

    /// First submitted value for `field`, if any.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields
            .get(field)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// First submitted value for `field`, or `""` when absent.
    #[must_use]
    pub fn value(&self, field: &str) -> &str {
        self.get(field).unwrap_or("")
    }

    /// All submitted values for `field`.
    #[must_use]
    pub fn values(&self, field: &str) -> &[String] {
        self.fields.get(field).map_or(&[], Vec::as_slice)
    }

    /// Whether `field` appeared in the submission at all.
    #[must_use]
    pub fn has(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Iterate over all fields and their values.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.fields.iter()
    }
}

/// Field name → ordered list of error messages.
///
/// Created empty, mutated only during the validation pass, read-only
/// afterward. A field with zero errors is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    errors: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    /// Append an error message for `field`.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// First error message for `field`, if any.
    ///
    /// Handlers render only the first message per field; the rest stay
    /// available through [`ValidationErrors::all`].
    #[must_use]
    pub fn first(&self, field: &str) -> Option<&str> {
        self.errors
            .get(field)
            .and_then(|messages| messages.first())
            .map(String::as_str)
    }

    /// All error messages for `field`.
    #[must_use]
    pub fn all(&self, field: &str) -> &[String] {
        self.errors.get(field).map_or(&[], Vec::as_slice)
    }

    /// Field → first error message, for template rendering.
    #[must_use]
    pub fn first_map(&self) -> BTreeMap<String, String> {
        self.errors
            .iter()
            .filter_map(|(field, messages)| {
                messages
                    .first()
                    .map(|message| (field.clone(), message.clone()))
            })
            .collect()
    }

    /// Whether any field has any error.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.values().all(Vec::is_empty)
    }
}

/// A form submission under validation.
#[derive(Debug, Clone, Default)]
pub struct Form {
    submission: FormSubmission,
    /// Errors accumulated so far.
    pub errors: ValidationErrors,
}

impl Form {
    /// Wrap a submission for validation.
    #[must_use]
    pub fn new(submission: FormSubmission) -> Self {
        Self {
            submission,
            errors: ValidationErrors::default(),
        }
    }

    /// An empty form, for rendering a page before any submission.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(FormSubmission::new())
    }

    /// The underlying submission.
    #[must_use]
    pub const fn submission(&self) -> &FormSubmission {
        &self.submission
    }

    /// First submitted value for `field`, or `""`.
    #[must_use]
    pub fn value(&self, field: &str) -> &str {
        self.submission.value(field)
    }

    /// Each named field must have at least one non-blank value.
    pub fn required(&mut self, fields: &[&str]) {
        for field in fields {
            let value = self.submission.get(field).unwrap_or("");
            if value.trim().is_empty() {
                self.errors.add(field, MSG_BLANK);
            }
        }
    }

    /// The field's value must be at least `min` characters long.
    pub fn min_length(&mut self, field: &str, min: usize) {
        let value = self.submission.value(field);
        if value.chars().count() < min {
            self.errors.add(
                field,
                format!("This field must be at least {min} characters long."),
            );
        }
    }

    /// The field's value must look like an email address.
    pub fn is_email(&mut self, field: &str) {
        if !is_email_address(self.submission.value(field)) {
            self.errors.add(field, MSG_EMAIL);
        }
    }

    /// `true` iff no field has accumulated any error.
    #[must_use]
    pub fn valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Conventional email grammar: non-empty local part, `@`, and a domain
/// containing at least one interior dot.
#[must_use]
pub fn is_email_address(value: &str) -> bool {
    if value.len() < 3 || value.len() > 255 {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }
    if local.contains(char::is_whitespace) || domain.contains(char::is_whitespace) {
        return false;
    }
    // The domain needs a dot with a label on each side.
    match domain.split_once('.') {
        Some((head, tail)) => !head.is_empty() && !tail.is_empty(),
        None => false,
    }
}
