use chrono::{Duration, NaiveDate};
use khutba_roster::persistence::{PersistenceResult, RosterStore};
use khutba_roster::{
    DEFAULT_WINDOW_WEEKS, EditChoice, EditError, FileRosterStore, Roster, RosterConfig, UNBOOKED,
    apply_edit, upcoming_fridays,
};
use std::sync::Mutex;

struct RecordingStore {
    saves: Mutex<u32>,
}

impl RecordingStore {
    fn new() -> Self {
        Self {
            saves: Mutex::new(0),
        }
    }

    fn save_count(&self) -> u32 {
        *self.saves.lock().unwrap()
    }
}

impl RosterStore for RecordingStore {
    fn save_roster(&self, _roster: &Roster) -> PersistenceResult<()> {
        *self.saves.lock().unwrap() += 1;
        Ok(())
    }

    fn load_roster(&self) -> PersistenceResult<Option<Roster>> {
        Ok(None)
    }
}

fn config() -> RosterConfig {
    RosterConfig::new(
        [
            "Ahmed".to_string(),
            "Bilal".to_string(),
            "Chafik".to_string(),
        ],
        "1234",
    )
    .unwrap()
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 9, 2).unwrap()
}

fn reconciled_roster() -> Roster {
    let mut roster = Roster::new();
    roster.reconcile(today(), DEFAULT_WINDOW_WEEKS).unwrap();
    roster
}

#[test]
fn wrong_pin_changes_nothing_and_never_saves() {
    let mut roster = reconciled_roster();
    let store = RecordingStore::new();
    let target = upcoming_fridays(today(), 1)[0];

    let err = apply_edit(
        &mut roster,
        &store,
        &config(),
        today(),
        "9999",
        target,
        &EditChoice::Guest {
            name: "Guest X".to_string(),
        },
    )
    .unwrap_err();

    assert!(matches!(err, EditError::WrongPin));
    assert_eq!(store.save_count(), 0);
    let entry = roster.find_entry(target).unwrap().unwrap();
    assert_eq!(entry.khatib, UNBOOKED);
}

#[test]
fn guest_edit_changes_one_entry_and_saves_once() {
    let mut roster = reconciled_roster();
    let store = RecordingStore::new();
    let fridays = upcoming_fridays(today(), 4);

    let updated = apply_edit(
        &mut roster,
        &store,
        &config(),
        today(),
        "1234",
        fridays[1],
        &EditChoice::Guest {
            name: "Visiting Imam".to_string(),
        },
    )
    .unwrap();

    assert_eq!(updated.khatib, "Visiting Imam");
    assert_eq!(store.save_count(), 1);
    for friday in [fridays[0], fridays[2], fridays[3]] {
        assert_eq!(roster.find_entry(friday).unwrap().unwrap().khatib, UNBOOKED);
    }
}

#[test]
fn regular_choice_must_name_a_configured_regular() {
    let mut roster = reconciled_roster();
    let store = RecordingStore::new();
    let target = upcoming_fridays(today(), 1)[0];

    let err = apply_edit(
        &mut roster,
        &store,
        &config(),
        today(),
        "1234",
        target,
        &EditChoice::Regular {
            name: "Nobody".to_string(),
        },
    )
    .unwrap_err();

    assert!(matches!(err, EditError::NotARegular(_)));
    assert_eq!(store.save_count(), 0);
}

#[test]
fn empty_guest_name_is_rejected() {
    let mut roster = reconciled_roster();
    let store = RecordingStore::new();
    let target = upcoming_fridays(today(), 1)[0];

    for name in ["", "   "] {
        let err = apply_edit(
            &mut roster,
            &store,
            &config(),
            today(),
            "1234",
            target,
            &EditChoice::Guest {
                name: name.to_string(),
            },
        )
        .unwrap_err();
        assert!(matches!(err, EditError::EmptyGuestName));
    }
    assert_eq!(store.save_count(), 0);
}

#[test]
fn dates_beyond_the_edit_horizon_are_rejected() {
    let mut roster = reconciled_roster();
    let store = RecordingStore::new();
    // The window spans a year, so late entries exist but are not editable
    let far = upcoming_fridays(today(), 20)[19];
    assert!(far > today() + Duration::days(90));

    let err = apply_edit(
        &mut roster,
        &store,
        &config(),
        today(),
        "1234",
        far,
        &EditChoice::Clear,
    )
    .unwrap_err();

    assert!(matches!(err, EditError::OutsideEditWindow(_)));
    assert_eq!(store.save_count(), 0);
}

#[test]
fn unknown_dates_are_rejected() {
    let mut roster = reconciled_roster();
    let store = RecordingStore::new();
    // A Saturday inside the horizon, never part of the roster
    let saturday = NaiveDate::from_ymd_opt(2026, 9, 5).unwrap();

    let err = apply_edit(
        &mut roster,
        &store,
        &config(),
        today(),
        "1234",
        saturday,
        &EditChoice::Clear,
    )
    .unwrap_err();

    assert!(matches!(err, EditError::UnknownDate(_)));
    assert_eq!(store.save_count(), 0);
}

#[test]
fn clear_resets_a_booked_slot_to_unbooked() {
    let mut roster = reconciled_roster();
    let store = RecordingStore::new();
    let target = upcoming_fridays(today(), 1)[0];
    roster.set_khatib(target, "Guest X").unwrap();

    apply_edit(
        &mut roster,
        &store,
        &config(),
        today(),
        "1234",
        target,
        &EditChoice::Clear,
    )
    .unwrap();

    assert_eq!(roster.find_entry(target).unwrap().unwrap().khatib, UNBOOKED);
}

#[test]
fn edit_survives_a_store_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileRosterStore::new(dir.path().join("roster.json"));
    let mut roster = reconciled_roster();
    store.save_roster(&roster).unwrap();
    let target = upcoming_fridays(today(), 2)[1];

    apply_edit(
        &mut roster,
        &store,
        &config(),
        today(),
        "1234",
        target,
        &EditChoice::Guest {
            name: "Guest X".to_string(),
        },
    )
    .unwrap();

    let reloaded = store.load_roster().unwrap().unwrap();
    assert_eq!(reloaded.len(), roster.len());
    assert_eq!(
        reloaded.find_entry(target).unwrap().unwrap().khatib,
        "Guest X"
    );
    let changed = reloaded
        .entries()
        .unwrap()
        .into_iter()
        .filter(|entry| entry.khatib != UNBOOKED)
        .count();
    assert_eq!(changed, 1);
}
