use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct DividendRecord {
    pub date: String,
    pub dividend: f64,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct DividendHistory {
    pub symbol: String,
    pub dividends: Vec<DividendRecord>,
}

/// A dividend as reported, before any split adjustment.
#[derive(Clone, Debug, PartialEq)]
pub struct DividendEvent {
    pub date_ms: i64,
    pub amount: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SplitEvent {
    pub date_ms: i64,
    pub ratio: f64,
}

impl DividendHistory {
    pub fn empty(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            dividends: vec![],
        }
    }

    pub fn amounts(&self) -> Vec<f64> {
        self.dividends.iter().map(|d| d.dividend).collect()
    }
}
