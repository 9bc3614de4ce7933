use chrono::{Duration, NaiveDate};
use polars::prelude::PlSmallStr;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Placeholder speaker value for a Friday nobody has been booked for yet.
pub const UNBOOKED: &str = "Unbooked";

/// One roster record: a Friday and the speaker assigned to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub date: NaiveDate,
    pub khatib: String,
}

impl RosterEntry {
    pub fn new(date: NaiveDate, khatib: impl Into<String>) -> Self {
        Self {
            date,
            khatib: khatib.into(),
        }
    }

    pub fn unbooked(date: NaiveDate) -> Self {
        Self::new(date, UNBOOKED)
    }

    pub fn is_unbooked(&self) -> bool {
        self.khatib == UNBOOKED
    }

    pub fn to_dataframe_row(&self) -> PolarsResult<DataFrame> {
        let date_data: [Option<i32>; 1] = [Some(Self::date_to_i32(self.date))];
        let date_series =
            Series::new(PlSmallStr::from_static("date"), date_data).cast(&DataType::Date)?;

        let khatib_data: [&str; 1] = [self.khatib.as_str()];
        let khatib_series = Series::new(PlSmallStr::from_static("khatib"), khatib_data);

        DataFrame::new(vec![date_series.into_column(), khatib_series.into_column()])
    }

    pub fn from_dataframe_row(df: &DataFrame, row_idx: usize) -> PolarsResult<Self> {
        let date = df
            .column("date")?
            .date()?
            .get(row_idx)
            .map(Self::date_from_i32)
            .ok_or_else(|| PolarsError::ComputeError("roster row missing date".into()))?;

        let khatib = df
            .column("khatib")?
            .str()?
            .get(row_idx)
            .unwrap_or(UNBOOKED)
            .to_string();

        Ok(Self { date, khatib })
    }

    pub(crate) fn date_to_i32(date: NaiveDate) -> i32 {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        (date - epoch).num_days() as i32
    }

    pub(crate) fn date_from_i32(days: i32) -> NaiveDate {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        epoch + Duration::days(days as i64)
    }
}
