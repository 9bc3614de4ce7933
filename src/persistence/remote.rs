use super::{PersistenceError, PersistenceResult, RosterStore};
use crate::entry::RosterEntry;
use crate::roster::Roster;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON-bin convention; harmless when the bin needs no key.
const API_KEY_HEADER: &str = "X-Master-Key";

#[derive(Serialize, Deserialize)]
struct RemoteSnapshot {
    entries: Vec<RosterEntry>,
}

/// Remote JSON document store: GET reads the whole document, PUT overwrites
/// it. Transport failures surface as `Unavailable` rather than an empty
/// collection, so callers can block writes instead of regenerating the whole
/// window over live data.
pub struct RemoteRosterStore {
    client: Client,
    url: String,
    api_key: Option<String>,
}

impl RemoteRosterStore {
    pub fn new(url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
            api_key,
        }
    }

    fn authorized(&self, request: reqwest::blocking::RequestBuilder) -> reqwest::blocking::RequestBuilder {
        match &self.api_key {
            Some(key) => request.header(API_KEY_HEADER, key),
            None => request,
        }
    }
}

impl RosterStore for RemoteRosterStore {
    fn save_roster(&self, roster: &Roster) -> PersistenceResult<()> {
        let entries = roster.entries()?;
        super::validate_entries(&entries)?;
        let snapshot = RemoteSnapshot { entries };

        let response = self
            .authorized(self.client.put(&self.url))
            .json(&snapshot)
            .send()
            .map_err(|e| PersistenceError::Unavailable(e.to_string()))?;
        response
            .error_for_status()
            .map_err(|e| PersistenceError::Unavailable(e.to_string()))?;
        Ok(())
    }

    fn load_roster(&self) -> PersistenceResult<Option<Roster>> {
        let response = self
            .authorized(self.client.get(&self.url))
            .send()
            .map_err(|e| PersistenceError::Unavailable(e.to_string()))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = response
            .error_for_status()
            .map_err(|e| PersistenceError::Unavailable(e.to_string()))?;

        let value: Value = response
            .json()
            .map_err(|e| PersistenceError::InvalidData(format!("malformed remote document: {e}")))?;
        // Some bin services wrap reads in a "record" envelope.
        let document = match value {
            Value::Object(mut map) if map.contains_key("record") => {
                map.remove("record").unwrap_or(Value::Null)
            }
            other => other,
        };
        if document.is_null() {
            return Ok(None);
        }

        let snapshot: RemoteSnapshot = serde_json::from_value(document)
            .map_err(|e| PersistenceError::InvalidData(format!("malformed remote document: {e}")))?;
        super::validate_entries(&snapshot.entries)?;
        Ok(Some(Roster::from_entries(snapshot.entries)?))
    }
}
