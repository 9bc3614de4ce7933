pub mod admin;
pub mod classify;
pub mod config;
pub mod entry;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod persistence;
pub mod roster;
pub mod window;

pub use admin::{EDIT_HORIZON_DAYS, EditChoice, EditError, apply_edit};
pub use classify::SpeakerKind;
pub use config::{ConfigError, RosterConfig};
pub use entry::{RosterEntry, UNBOOKED};
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqliteRosterStore;
pub use persistence::{
    FileRosterStore, PersistenceError, PersistenceResult, RosterStore, load_roster_from_csv,
    load_roster_from_json, save_roster_to_csv, save_roster_to_json, validate_entries,
};
#[cfg(feature = "remote")]
pub use persistence::remote::RemoteRosterStore;
pub use roster::{ReconcileSummary, Roster};
pub use window::{DEFAULT_WINDOW_WEEKS, next_friday_offset, upcoming_fridays};
