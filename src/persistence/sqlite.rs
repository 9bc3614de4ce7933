use super::{PersistenceError, PersistenceResult, RosterStore};
use crate::entry::RosterEntry;
use crate::roster::Roster;
use chrono::NaiveDate;
use rusqlite::{Connection, params};
use std::sync::Mutex;

pub struct SqliteRosterStore {
    connection: Mutex<Connection>,
}

impl SqliteRosterStore {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> PersistenceResult<Self> {
        let connection = Connection::open(path)?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            CREATE TABLE IF NOT EXISTS roster_entries (
                date TEXT PRIMARY KEY,
                khatib TEXT NOT NULL
            );
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }
}

impl RosterStore for SqliteRosterStore {
    fn save_roster(&self, roster: &Roster) -> PersistenceResult<()> {
        let entries = roster.entries()?;
        super::validate_entries(&entries)?;

        let mut conn = self.connection.lock().expect("sqlite mutex poisoned");
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM roster_entries", [])?;
        {
            let mut stmt =
                tx.prepare("INSERT INTO roster_entries (date, khatib) VALUES (?1, ?2)")?;
            for entry in &entries {
                stmt.execute(params![entry.date.format("%Y-%m-%d").to_string(), entry.khatib])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn load_roster(&self) -> PersistenceResult<Option<Roster>> {
        let conn = self.connection.lock().expect("sqlite mutex poisoned");

        let mut stmt = conn.prepare("SELECT date, khatib FROM roster_entries ORDER BY date ASC")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut entries = Vec::new();
        for row in rows {
            let (date_text, khatib) = row?;
            let date = NaiveDate::parse_from_str(&date_text, "%Y-%m-%d").map_err(|e| {
                PersistenceError::InvalidData(format!("invalid stored date '{date_text}': {e}"))
            })?;
            entries.push(RosterEntry { date, khatib });
        }

        if entries.is_empty() {
            return Ok(None);
        }

        super::validate_entries(&entries)?;
        Ok(Some(Roster::from_entries(entries)?))
    }
}
