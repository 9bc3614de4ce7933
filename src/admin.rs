use chrono::{Duration, NaiveDate};
use polars::prelude::PolarsError;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::RosterConfig;
use crate::entry::{RosterEntry, UNBOOKED};
use crate::persistence::{PersistenceError, RosterStore};
use crate::roster::Roster;

/// Only dates within this many days of today are editable.
pub const EDIT_HORIZON_DAYS: i64 = 90;

/// The three-way admin choice: one of the configured regulars, a freely typed
/// guest name, or clearing the slot back to the sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EditChoice {
    Regular { name: String },
    Guest { name: String },
    Clear,
}

impl EditChoice {
    fn resolve(&self, config: &RosterConfig) -> Result<String, EditError> {
        match self {
            EditChoice::Regular { name } => {
                if config.is_regular(name) {
                    Ok(name.clone())
                } else {
                    Err(EditError::NotARegular(name.clone()))
                }
            }
            EditChoice::Guest { name } => {
                let trimmed = name.trim();
                if trimmed.is_empty() {
                    return Err(EditError::EmptyGuestName);
                }
                Ok(trimmed.to_string())
            }
            EditChoice::Clear => Ok(UNBOOKED.to_string()),
        }
    }
}

#[derive(Debug)]
pub enum EditError {
    WrongPin,
    UnknownDate(NaiveDate),
    OutsideEditWindow(NaiveDate),
    NotARegular(String),
    EmptyGuestName,
    Roster(PolarsError),
    Persistence(PersistenceError),
}

impl fmt::Display for EditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditError::WrongPin => write!(f, "wrong PIN"),
            EditError::UnknownDate(date) => write!(f, "no roster entry for {date}"),
            EditError::OutsideEditWindow(date) => write!(
                f,
                "{date} is outside the editable window of {EDIT_HORIZON_DAYS} days"
            ),
            EditError::NotARegular(name) => {
                write!(f, "'{name}' is not one of the configured regulars")
            }
            EditError::EmptyGuestName => write!(f, "guest name must not be empty"),
            EditError::Roster(err) => write!(f, "roster error: {err}"),
            EditError::Persistence(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for EditError {}

impl From<PolarsError> for EditError {
    fn from(value: PolarsError) -> Self {
        Self::Roster(value)
    }
}

impl From<PersistenceError> for EditError {
    fn from(value: PersistenceError) -> Self {
        Self::Persistence(value)
    }
}

/// Authorize and apply one single-field edit, then persist the full
/// collection. The PIN check runs first: on a mismatch nothing is mutated and
/// the store is never called. The mutation targets the full roster, never a
/// filtered display subset, so entries outside the display window survive the
/// save.
pub fn apply_edit(
    roster: &mut Roster,
    store: &dyn RosterStore,
    config: &RosterConfig,
    today: NaiveDate,
    pin: &str,
    date: NaiveDate,
    choice: &EditChoice,
) -> Result<RosterEntry, EditError> {
    if !config.pin_matches(pin) {
        return Err(EditError::WrongPin);
    }
    let khatib = choice.resolve(config)?;
    if date < today || date > today + Duration::days(EDIT_HORIZON_DAYS) {
        return Err(EditError::OutsideEditWindow(date));
    }
    if !roster.set_khatib(date, &khatib)? {
        return Err(EditError::UnknownDate(date));
    }
    store.save_roster(roster)?;
    Ok(RosterEntry::new(date, khatib))
}
