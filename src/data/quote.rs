use serde::{Deserialize, Serialize};

/// Headline quote for one symbol. Every field the provider omits stays `None`, never zero.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub symbol: String,
    pub price: Option<f64>,
    pub price_change: Option<f64>,
    pub previous_close: Option<f64>,
    pub currency: Option<String>,
    pub exchange: Option<String>,
}

impl Quote {
    pub fn empty(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            ..Default::default()
        }
    }
}
