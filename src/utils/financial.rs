use crate::{
    data::dividend::DividendRecord,
    utils::{datetime::SECS_PER_DAY, stats},
};

pub const DAYS_PER_MONTH: i64 = 30;
pub const DAYS_PER_WEEK: i64 = 7;

/// How far back a trailing return looks from the last point of a series.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReturnHorizon {
    Week,
    Months(u32),
}

impl ReturnHorizon {
    pub fn secs(&self) -> i64 {
        match self {
            ReturnHorizon::Week => DAYS_PER_WEEK * SECS_PER_DAY,
            ReturnHorizon::Months(months) => *months as i64 * DAYS_PER_MONTH * SECS_PER_DAY,
        }
    }
}

/// Percentage change from the close nearest to `last timestamp - horizon` up to the last close.
///
/// Month horizons scan forward and keep the earliest of equally near points; the week horizon
/// scans backward and keeps the latest. `None` when there are fewer than two points, the arrays
/// differ in length, or either price is not positive.
pub fn calc_return(closes: &[f64], timestamps: &[i64], horizon: ReturnHorizon) -> Option<f64> {
    if closes.len() < 2 || closes.len() != timestamps.len() {
        return None;
    }

    let current_price = *closes.last()?;
    let current_time = *timestamps.last()?;
    let target_time = current_time.saturating_sub(horizon.secs());

    let past_index = match horizon {
        ReturnHorizon::Week => nearest_index_backward(timestamps, target_time),
        ReturnHorizon::Months(_) => nearest_index_forward(timestamps, target_time),
    };
    let past_price = closes[past_index];

    if is_positive(past_price) && is_positive(current_price) {
        Some((current_price - past_price) / past_price * 100.0)
    } else {
        None
    }
}

/// Mean per-payment amount. `payments_per_year` is only used by callers that annualize.
pub fn calc_average_dividend(dividends: &[DividendRecord], _payments_per_year: u32) -> Option<f64> {
    let amounts: Vec<f64> = dividends.iter().map(|d| d.dividend).collect();
    stats::mean(&amounts)
}

pub fn calc_annual_dividend(
    average_dividend: Option<f64>,
    payments_per_year: Option<u32>,
) -> Option<f64> {
    match (average_dividend, payments_per_year) {
        (Some(average), Some(payments)) => Some(average * payments as f64),
        _ => None,
    }
}

/// Annual dividend as a percentage of price, or `fallback` when either input is unavailable.
pub fn calc_forward_yield(
    annual_dividend: Option<f64>,
    current_price: Option<f64>,
    fallback: Option<f64>,
) -> Option<f64> {
    match (annual_dividend, current_price) {
        (Some(annual), Some(price)) if is_positive(price) => Some(annual / price * 100.0),
        _ => fallback,
    }
}

fn is_positive(value: f64) -> bool {
    value > 0.0
}

fn nearest_index_forward(timestamps: &[i64], target: i64) -> usize {
    let mut closest_index = 0;
    let mut closest_diff = timestamps[0].abs_diff(target);

    for (i, timestamp) in timestamps.iter().enumerate().skip(1) {
        let diff = timestamp.abs_diff(target);
        if diff < closest_diff {
            closest_diff = diff;
            closest_index = i;
        }
    }

    closest_index
}

fn nearest_index_backward(timestamps: &[i64], target: i64) -> usize {
    let mut closest_index = timestamps.len() - 1;
    let mut closest_diff = u64::MAX;

    for (i, timestamp) in timestamps.iter().enumerate().rev() {
        let diff = timestamp.abs_diff(target);
        if diff < closest_diff {
            closest_diff = diff;
            closest_index = i;
        }
    }

    closest_index
}
