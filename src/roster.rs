use chrono::{Duration, NaiveDate};
use polars::prelude::PlSmallStr;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::entry::RosterEntry;
use crate::window::upcoming_fridays;

/// Outcome of one reconciliation pass. A non-empty `appended` list is the
/// "schedule extended" event: callers must persist the roster before display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileSummary {
    pub appended: Vec<NaiveDate>,
    pub total: usize,
}

impl ReconcileSummary {
    pub fn extended(&self) -> bool {
        !self.appended.is_empty()
    }

    pub fn to_cli_summary(&self) -> String {
        let mut parts = Vec::new();
        parts.push(format!("entries={}", self.total));
        parts.push(format!("appended={}", self.appended.len()));
        if let (Some(first), Some(last)) = (self.appended.first(), self.appended.last()) {
            parts.push(format!("range={first}..{last}"));
        }
        parts.join(", ")
    }
}

/// The full roster collection, backed by a two-column dataframe
/// (`date: Date`, `khatib: String`). Dates are unique; storage order is not
/// significant.
#[derive(Debug)]
pub struct Roster {
    df: DataFrame,
}

impl Default for Roster {
    fn default() -> Self {
        Self::new()
    }
}

impl Roster {
    pub fn new() -> Self {
        Self {
            df: DataFrame::empty_with_schema(&Self::default_schema()),
        }
    }

    pub fn from_entries(entries: Vec<RosterEntry>) -> PolarsResult<Self> {
        let mut seen: HashSet<NaiveDate> = HashSet::with_capacity(entries.len());
        let mut roster = Self::new();
        for entry in entries {
            if !seen.insert(entry.date) {
                return Err(PolarsError::ComputeError(
                    format!("duplicate roster date {}", entry.date).into(),
                ));
            }
            roster.append_entry(&entry)?;
        }
        Ok(roster)
    }

    fn default_schema() -> Schema {
        Schema::from_iter(vec![
            Field::new("date".into(), DataType::Date),
            Field::new("khatib".into(), DataType::String),
        ])
    }

    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    pub fn len(&self) -> usize {
        self.df.height()
    }

    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    pub fn entries(&self) -> PolarsResult<Vec<RosterEntry>> {
        let mut entries = Vec::with_capacity(self.df.height());
        for idx in 0..self.df.height() {
            entries.push(RosterEntry::from_dataframe_row(&self.df, idx)?);
        }
        Ok(entries)
    }

    pub fn dates(&self) -> PolarsResult<HashSet<NaiveDate>> {
        let mut dates = HashSet::with_capacity(self.df.height());
        let date_ca = self.df.column("date")?.date()?;
        for idx in 0..self.df.height() {
            if let Some(days) = date_ca.get(idx) {
                dates.insert(RosterEntry::date_from_i32(days));
            }
        }
        Ok(dates)
    }

    pub fn find_entry(&self, date: NaiveDate) -> PolarsResult<Option<RosterEntry>> {
        if self.df.height() == 0 {
            return Ok(None);
        }
        let target = RosterEntry::date_to_i32(date);
        let date_ca = self.df.column("date")?.date()?;
        for idx in 0..self.df.height() {
            if date_ca.get(idx) == Some(target) {
                return Ok(Some(RosterEntry::from_dataframe_row(&self.df, idx)?));
            }
        }
        Ok(None)
    }

    fn append_entry(&mut self, entry: &RosterEntry) -> PolarsResult<()> {
        let row = entry.to_dataframe_row()?;
        self.df = self.df.vstack(&row)?;
        Ok(())
    }

    /// Ensure an entry exists for every Friday in the forward window. Missing
    /// dates are appended as unbooked; existing rows are never touched, so the
    /// operation is idempotent.
    pub fn reconcile(&mut self, today: NaiveDate, weeks: usize) -> PolarsResult<ReconcileSummary> {
        let existing = self.dates()?;
        let mut appended = Vec::new();
        for friday in upcoming_fridays(today, weeks) {
            if existing.contains(&friday) {
                continue;
            }
            self.append_entry(&RosterEntry::unbooked(friday))?;
            appended.push(friday);
        }
        Ok(ReconcileSummary {
            appended,
            total: self.df.height(),
        })
    }

    /// Overwrite the speaker of the entry at `date`, leaving every other row
    /// untouched. Returns false (and changes nothing) when no entry has that
    /// date.
    pub fn set_khatib(&mut self, date: NaiveDate, khatib: &str) -> PolarsResult<bool> {
        if self.df.height() == 0 {
            return Ok(false);
        }
        let target = RosterEntry::date_to_i32(date);
        let date_ca = self.df.column("date")?.date()?;
        let khatib_ca = self.df.column("khatib")?.str()?;

        let mut found = false;
        let mut values: Vec<Option<String>> = Vec::with_capacity(self.df.height());
        for idx in 0..self.df.height() {
            if date_ca.get(idx) == Some(target) {
                found = true;
                values.push(Some(khatib.to_string()));
            } else {
                values.push(khatib_ca.get(idx).map(ToOwned::to_owned));
            }
        }
        if !found {
            return Ok(false);
        }

        let series = Series::new(PlSmallStr::from_static("khatib"), values);
        self.df.replace("khatib", series)?;
        Ok(true)
    }

    /// Display subset: `today <= date <= today + horizon_days`, sorted
    /// ascending.
    pub fn upcoming_frame(&self, today: NaiveDate, horizon_days: i64) -> PolarsResult<DataFrame> {
        let horizon = today + Duration::days(horizon_days);
        self.df
            .clone()
            .lazy()
            .filter(
                col("date")
                    .gt_eq(lit(today).cast(DataType::Date))
                    .and(col("date").lt_eq(lit(horizon).cast(DataType::Date))),
            )
            .sort(["date"], SortMultipleOptions::default())
            .collect()
    }

    pub fn upcoming(&self, today: NaiveDate, horizon_days: i64) -> PolarsResult<Vec<RosterEntry>> {
        let frame = self.upcoming_frame(today, horizon_days)?;
        let mut entries = Vec::with_capacity(frame.height());
        for idx in 0..frame.height() {
            entries.push(RosterEntry::from_dataframe_row(&frame, idx)?);
        }
        Ok(entries)
    }
}
