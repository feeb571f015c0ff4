use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Parallel, chronologically ordered timestamps (epoch seconds) and closing prices.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct PriceSeries {
    pub timestamps: Vec<i64>,
    pub closes: Vec<f64>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Chart {
    pub symbol: String,
    pub timeframe: String,

    #[serde(flatten)]
    pub series: PriceSeries,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct ComparisonCharts {
    pub symbols: Vec<String>,
    pub timeframe: String,
    pub data: HashMap<String, PriceSeries>,
}

/// Point-by-point view of one symbol's chart.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct EtfChart {
    pub symbol: String,
    pub data: Vec<ChartPoint>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ChartPoint {
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PriceSeries {
    /// Pairs the raw provider arrays row by row, dropping any row whose timestamp is missing
    /// or whose close is missing or NaN. Surviving rows keep their original order.
    pub fn from_raw(timestamps: &[Option<i64>], closes: &[Option<f64>]) -> Self {
        let (timestamps, closes): (Vec<i64>, Vec<f64>) = timestamps
            .iter()
            .zip(closes)
            .filter_map(|(timestamp, close)| match (timestamp, close) {
                (Some(timestamp), Some(close)) if !close.is_nan() => Some((*timestamp, *close)),
                _ => None,
            })
            .unzip();

        Self { timestamps, closes }
    }

    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty() || self.timestamps.is_empty()
    }

    pub fn last_close(&self) -> Option<f64> {
        self.closes.last().copied()
    }

    /// Display points; the series carries closes only, so open, high and low repeat the close.
    pub fn points(&self) -> Vec<ChartPoint> {
        self.timestamps
            .iter()
            .zip(&self.closes)
            .map(|(timestamp, close)| ChartPoint {
                timestamp: *timestamp,
                open: *close,
                high: *close,
                low: *close,
                close: *close,
                volume: 0.0,
            })
            .collect()
    }
}

impl Chart {
    pub fn empty(symbol: &str, timeframe: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            timeframe: timeframe.to_string(),
            series: PriceSeries::default(),
        }
    }
}
