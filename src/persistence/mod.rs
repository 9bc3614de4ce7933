use crate::entry::RosterEntry;
use crate::roster::Roster;
use polars::prelude::PolarsError;
use serde_json::Error as SerdeJsonError;
use std::collections::HashSet;
use std::fmt;
use std::io;

#[derive(Debug)]
pub enum PersistenceError {
    Serialization(SerdeJsonError),
    DataFrame(PolarsError),
    Io(io::Error),
    #[cfg(feature = "sqlite")]
    Sqlite(rusqlite::Error),
    Csv(csv::Error),
    InvalidData(String),
    /// The store could not be reached. Distinct from "no data yet" so that an
    /// outage never degrades into a full all-unbooked regeneration overwriting
    /// remote state.
    Unavailable(String),
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistenceError::Serialization(err) => write!(f, "serialization error: {err}"),
            PersistenceError::DataFrame(err) => write!(f, "dataframe conversion error: {err}"),
            PersistenceError::Io(err) => write!(f, "io error: {err}"),
            #[cfg(feature = "sqlite")]
            PersistenceError::Sqlite(err) => write!(f, "sqlite error: {err}"),
            PersistenceError::Csv(err) => write!(f, "csv error: {err}"),
            PersistenceError::InvalidData(msg) => write!(f, "invalid data: {msg}"),
            PersistenceError::Unavailable(msg) => write!(f, "store unavailable: {msg}"),
        }
    }
}

impl std::error::Error for PersistenceError {}

impl From<SerdeJsonError> for PersistenceError {
    fn from(value: SerdeJsonError) -> Self {
        Self::Serialization(value)
    }
}

impl From<PolarsError> for PersistenceError {
    fn from(value: PolarsError) -> Self {
        Self::DataFrame(value)
    }
}

impl From<io::Error> for PersistenceError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for PersistenceError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<csv::Error> for PersistenceError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// The schedule store contract: load the whole collection, save the whole
/// collection. There is no partial-update API; a save overwrites everything.
pub trait RosterStore {
    fn save_roster(&self, roster: &Roster) -> PersistenceResult<()>;
    fn load_roster(&self) -> PersistenceResult<Option<Roster>>;
}

/// Every persisted collection must keep dates unique.
pub fn validate_entries(entries: &[RosterEntry]) -> PersistenceResult<()> {
    let mut seen = HashSet::with_capacity(entries.len());
    for entry in entries {
        if !seen.insert(entry.date) {
            return Err(PersistenceError::InvalidData(format!(
                "duplicate roster date {}",
                entry.date
            )));
        }
    }
    Ok(())
}

pub fn validate_roster(roster: &Roster) -> PersistenceResult<()> {
    let entries = roster.entries()?;
    validate_entries(&entries)
}

pub mod file;
#[cfg(feature = "remote")]
pub mod remote;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file::{
    FileRosterStore, load_roster_from_csv, load_roster_from_json, save_roster_to_csv,
    save_roster_to_json,
};

pub const STORE_FILE_ENV: &str = "KHUTBA_FILE";
#[cfg(feature = "sqlite")]
pub const STORE_DB_ENV: &str = "KHUTBA_DB";
#[cfg(feature = "remote")]
pub const STORE_URL_ENV: &str = "KHUTBA_STORE_URL";
#[cfg(feature = "remote")]
pub const STORE_KEY_ENV: &str = "KHUTBA_STORE_KEY";

/// Pick a store from the environment: remote bin URL first, then SQLite path,
/// then JSON file (default `khutba-roster.json`).
pub fn store_from_env() -> PersistenceResult<Box<dyn RosterStore + Send + Sync>> {
    #[cfg(feature = "remote")]
    if let Ok(url) = std::env::var(STORE_URL_ENV) {
        let api_key = std::env::var(STORE_KEY_ENV).ok();
        return Ok(Box::new(remote::RemoteRosterStore::new(url, api_key)));
    }
    #[cfg(feature = "sqlite")]
    if let Ok(path) = std::env::var(STORE_DB_ENV) {
        return Ok(Box::new(sqlite::SqliteRosterStore::new(path)?));
    }
    let path =
        std::env::var(STORE_FILE_ENV).unwrap_or_else(|_| "khutba-roster.json".to_string());
    Ok(Box::new(FileRosterStore::new(path)))
}
