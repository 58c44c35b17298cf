//! Wizard state machine — tracks which step a session is on and what it has collected.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use secrecy::SecretString;
use serde::Serialize;

use crate::fields::DATE_FORMAT;
use crate::gateway::{ProfileUpdate, RegisterRequest, RegisterResponse, UserId};

/// Field names the backend contract relies on.
pub mod field_names {
    pub const EMAIL: &str = "email";
    pub const PASSWORD: &str = "password";
    pub const BIRTHDATE: &str = "birthdate";
    pub const ADDRESS: &str = "address";
    /// Collected as `aboutMe`, sent to the backend as `about`.
    pub const ABOUT_ME: &str = "aboutMe";
}

/// Where a session is.
///
/// Progresses `Collecting(1) → … → Collecting(N) → Completed`, passing
/// through `Submitting` while a registration or profile update is in flight.
/// `Failed` is reached only by abandoning the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum WizardStep {
    /// Collecting the fields of the 1-based page at this position.
    Collecting(usize),
    Submitting,
    Completed,
    Failed(String),
}

impl WizardStep {
    /// Step reached by advancing out of `Collecting(index)` in a session of `total` pages.
    pub fn after(index: usize, total: usize) -> WizardStep {
        if index >= total {
            WizardStep::Completed
        } else {
            WizardStep::Collecting(index + 1)
        }
    }

    /// Whether this step ends the session.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed(_))
    }
}

impl std::fmt::Display for WizardStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Collecting(i) => write!(f, "collecting page {i}"),
            Self::Submitting => write!(f, "submitting"),
            Self::Completed => write!(f, "completed"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// Per-session record of progress and collected values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WizardState {
    pub step: WizardStep,
    /// Collected values keyed by field name.
    pub fields: BTreeMap<String, String>,
    /// Whether a submission is in flight. Filled in on snapshots.
    pub submitting: bool,
    /// Assigned by a successful registration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
}

impl Default for WizardState {
    fn default() -> Self {
        Self {
            step: WizardStep::Collecting(1),
            fields: BTreeMap::new(),
            submitting: false,
            user_id: None,
        }
    }
}

impl WizardState {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn set_field(&mut self, name: &str, value: &str) {
        self.fields.insert(name.to_string(), value.to_string());
    }

    fn value(&self, name: &str) -> String {
        self.field(name).unwrap_or_default().to_string()
    }

    /// Body for the registration call.
    pub fn registration_request(&self) -> RegisterRequest {
        RegisterRequest {
            email: self.value(field_names::EMAIL),
            password: SecretString::from(self.value(field_names::PASSWORD)),
        }
    }

    /// Body for the profile update, carrying every collected field.
    pub fn profile_update(&self) -> ProfileUpdate {
        ProfileUpdate {
            email: self.value(field_names::EMAIL),
            password: SecretString::from(self.value(field_names::PASSWORD)),
            birthdate: self.value(field_names::BIRTHDATE),
            address: self.value(field_names::ADDRESS),
            about: self.value(field_names::ABOUT_ME),
        }
    }

    /// Apply a registration response: keep the user id and take over every
    /// profile field the server returned non-empty.
    pub fn merge_registration(&mut self, response: &RegisterResponse) {
        self.user_id = Some(response.user_id.clone());

        let echoed = [
            (field_names::EMAIL, response.email.clone()),
            (
                field_names::BIRTHDATE,
                response.birthdate.as_deref().map(normalize_date),
            ),
            (field_names::ADDRESS, response.address.clone()),
            (field_names::ABOUT_ME, response.about.clone()),
        ];
        for (name, value) in echoed {
            if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
                self.fields.insert(name.to_string(), value);
            }
        }
    }
}

/// Reduce a server timestamp to the `YYYY-MM-DD` form date fields accept.
/// Values that are not recognizable dates are kept as they are.
fn normalize_date(raw: &str) -> String {
    let raw = raw.trim();
    if NaiveDate::parse_from_str(raw, DATE_FORMAT).is_ok() {
        return raw.to_string();
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.date_naive().format(DATE_FORMAT).to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return dt.date().format(DATE_FORMAT).to_string();
    }
    raw.to_string()
}
