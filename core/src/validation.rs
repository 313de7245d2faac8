use api_types::{Address, RegisterCredentials};
use once_cell::sync::Lazy;
use regex::Regex;
use time::OffsetDateTime;

use crate::bug_report::BugReport;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

pub const MIN_PASSWORD_LEN: usize = 6;

/// Per-field validation failures, in the order they were found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: Vec<(String, String)>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields.push((field.into(), message.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// First message recorded for a field.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(f, _)| f == field)
            .map(|(_, m)| m.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(f, m)| (f.as_str(), m.as_str()))
    }

    fn require(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.add(field, "is required");
        }
    }

    /// `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.iter().map(|(k, v)| format!("{k} {v}")).collect();
        write!(f, "{}", parts.join("; "))
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email.trim())
}

/// Validate the registration form.
pub fn validate_registration(form: &RegisterCredentials) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if form.email.trim().is_empty() {
        errors.add("email", "is required");
    } else if !is_valid_email(&form.email) {
        errors.add("email", "is not a valid address");
    }
    if form.password.is_empty() {
        errors.add("password", "is required");
    } else if form.password.chars().count() < MIN_PASSWORD_LEN {
        errors.add(
            "password",
            format!("must be at least {MIN_PASSWORD_LEN} characters"),
        );
    }
    if form.confirm_password.is_empty() {
        errors.add("confirmPassword", "is required");
    } else if form.confirm_password != form.password {
        errors.add("confirmPassword", "does not match password");
    }
    errors.require("firstname", &form.firstname);
    errors.require("lastname", &form.lastname);
    errors.require("bio", &form.bio);
    errors.require("nationality", &form.nationality);
    errors.require("avatar", &form.avatar);
    errors.into_result()
}

/// Fields of the create/edit event form before they become a request.
#[derive(Debug, Clone)]
pub struct EventForm {
    pub title: String,
    pub description: String,
    pub kind: api_types::EventType,
    pub start_date: OffsetDateTime,
    pub end_date: OffsetDateTime,
    pub cover_image: String,
    pub address: Address,
}

pub fn validate_event(form: &EventForm) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    errors.require("title", &form.title);
    errors.require("description", &form.description);
    if form.end_date < form.start_date {
        errors.add("endDate", "must be after the start date");
    }
    errors.require("coverImage", &form.cover_image);
    let a = &form.address;
    errors.require("address.number", &a.number);
    errors.require("address.street", &a.street);
    errors.require("address.city", &a.city);
    errors.require("address.postal_code", &a.postal_code);
    errors.require("address.country", &a.country);
    errors.into_result()
}

pub fn validate_bug_report(report: &BugReport) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    errors.require("title", &report.title);
    errors.require("description", &report.description);
    for (i, step) in report.steps.iter().enumerate() {
        errors.require(&format!("steps.{i}"), step);
    }
    errors.require("expectedBehavior", &report.expected_behavior);
    errors.require("actualBehavior", &report.actual_behavior);
    errors.into_result()
}
