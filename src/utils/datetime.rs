use chrono::{DateTime, NaiveDate};

pub const SECS_PER_DAY: i64 = 24 * 60 * 60;

pub fn date_to_str(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// UTC calendar date of an epoch-millisecond instant, formatted `YYYY-MM-DD`.
pub fn epoch_millis_to_date_str(millis: i64) -> Option<String> {
    DateTime::from_timestamp_millis(millis).map(|datetime| date_to_str(&datetime.date_naive()))
}

pub fn epoch_secs_to_date_str(secs: i64) -> Option<String> {
    secs.checked_mul(1000).and_then(epoch_millis_to_date_str)
}
