use super::{PersistenceError, PersistenceResult, RosterStore};
use crate::entry::RosterEntry;
use crate::roster::Roster;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Serialize, Deserialize)]
struct RosterSnapshot {
    entries: Vec<RosterEntry>,
}

impl RosterSnapshot {
    fn from_roster(roster: &Roster) -> PersistenceResult<Self> {
        let entries = roster.entries()?;
        super::validate_entries(&entries)?;
        Ok(Self { entries })
    }

    fn into_roster(self) -> PersistenceResult<Roster> {
        super::validate_entries(&self.entries)?;
        Ok(Roster::from_entries(self.entries)?)
    }
}

pub fn save_roster_to_json<P: AsRef<Path>>(roster: &Roster, path: P) -> PersistenceResult<()> {
    let snapshot = RosterSnapshot::from_roster(roster)?;
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, &snapshot)?;
    Ok(())
}

pub fn load_roster_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<Roster> {
    let file = File::open(path)?;
    let snapshot: RosterSnapshot = serde_json::from_reader(file)?;
    snapshot.into_roster()
}

#[derive(Serialize, Deserialize)]
struct RosterCsvRecord {
    date: String,
    khatib: String,
}

impl From<&RosterEntry> for RosterCsvRecord {
    fn from(entry: &RosterEntry) -> Self {
        Self {
            date: format_date(entry.date),
            khatib: entry.khatib.clone(),
        }
    }
}

impl RosterCsvRecord {
    fn into_entry(self) -> PersistenceResult<RosterEntry> {
        Ok(RosterEntry {
            date: parse_date(&self.date)?,
            khatib: self.khatib,
        })
    }
}

pub fn save_roster_to_csv<P: AsRef<Path>>(roster: &Roster, path: P) -> PersistenceResult<()> {
    super::validate_roster(roster)?;
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    for entry in roster.entries()? {
        writer.serialize(RosterCsvRecord::from(&entry))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn load_roster_from_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<Roster> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);
    let mut entries = Vec::new();
    for record in reader.deserialize::<RosterCsvRecord>() {
        entries.push(record?.into_entry()?);
    }
    super::validate_entries(&entries)?;
    Ok(Roster::from_entries(entries)?)
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn parse_date(input: &str) -> PersistenceResult<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|e| PersistenceError::InvalidData(format!("invalid date '{input}': {e}")))
}

/// JSON-file-backed store. A missing file reads as "no data yet", not as an
/// error.
pub struct FileRosterStore {
    path: PathBuf,
}

impl FileRosterStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RosterStore for FileRosterStore {
    fn save_roster(&self, roster: &Roster) -> PersistenceResult<()> {
        save_roster_to_json(roster, &self.path)
    }

    fn load_roster(&self) -> PersistenceResult<Option<Roster>> {
        match File::open(&self.path) {
            Ok(file) => {
                let snapshot: RosterSnapshot = serde_json::from_reader(file)?;
                Ok(Some(snapshot.into_roster()?))
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}
