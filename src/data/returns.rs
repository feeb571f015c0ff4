use serde::{Deserialize, Serialize};

use crate::{
    data::series::PriceSeries,
    utils::{
        financial::{ReturnHorizon, calc_return},
        stats::round_to,
    },
};

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct TrailingReturns {
    pub one_week: Option<f64>,
    pub one_month: Option<f64>,
    pub three_months: Option<f64>,
    pub six_months: Option<f64>,
    pub twelve_months: Option<f64>,
    pub three_years: Option<f64>,
}

/// Price returns next to the quote they were computed for. Total returns repeat the price
/// returns since no reinvestment data is fetched.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnsReport {
    pub symbol: String,
    pub current_price: Option<f64>,
    pub price_change: Option<f64>,
    pub price_return_1_wk: Option<f64>,
    pub price_return_1_mo: Option<f64>,
    pub price_return_3_mo: Option<f64>,
    pub price_return_6_mo: Option<f64>,
    pub price_return_12_mo: Option<f64>,
    pub price_return_3_yr: Option<f64>,
    pub total_return_1_wk: Option<f64>,
    pub total_return_1_mo: Option<f64>,
    pub total_return_3_mo: Option<f64>,
    pub total_return_6_mo: Option<f64>,
    pub total_return_12_mo: Option<f64>,
    pub total_return_3_yr: Option<f64>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalReturns {
    pub symbol: String,
    pub total_return_3_mo: Option<f64>,
    pub total_return_6_mo: Option<f64>,
    pub total_return_12_mo: Option<f64>,
    pub total_return_3_yr: Option<f64>,
}

impl TrailingReturns {
    pub fn from_series(series: &PriceSeries) -> Self {
        let calc = |horizon| calc_return(&series.closes, &series.timestamps, horizon);

        Self {
            one_week: calc(ReturnHorizon::Week),
            one_month: calc(ReturnHorizon::Months(1)),
            three_months: calc(ReturnHorizon::Months(3)),
            six_months: calc(ReturnHorizon::Months(6)),
            twelve_months: calc(ReturnHorizon::Months(12)),
            three_years: calc(ReturnHorizon::Months(36)),
        }
    }
}

impl ReturnsReport {
    pub fn new(
        symbol: &str,
        current_price: Option<f64>,
        price_change: Option<f64>,
        returns: &TrailingReturns,
    ) -> Self {
        Self {
            symbol: symbol.to_string(),
            current_price,
            price_change,
            price_return_1_wk: returns.one_week,
            price_return_1_mo: returns.one_month,
            price_return_3_mo: returns.three_months,
            price_return_6_mo: returns.six_months,
            price_return_12_mo: returns.twelve_months,
            price_return_3_yr: returns.three_years,
            total_return_1_wk: returns.one_week,
            total_return_1_mo: returns.one_month,
            total_return_3_mo: returns.three_months,
            total_return_6_mo: returns.six_months,
            total_return_12_mo: returns.twelve_months,
            total_return_3_yr: returns.three_years,
        }
    }
}

impl TotalReturns {
    pub fn from_series(symbol: &str, series: &PriceSeries) -> Self {
        let returns = TrailingReturns::from_series(series);

        Self {
            symbol: symbol.to_string(),
            total_return_3_mo: returns.three_months,
            total_return_6_mo: returns.six_months,
            total_return_12_mo: returns.twelve_months,
            total_return_3_yr: returns.three_years,
        }
    }

    pub fn rounded(&self, decimals: u32) -> Self {
        let round = |value: Option<f64>| value.map(|v| round_to(v, decimals));

        Self {
            symbol: self.symbol.clone(),
            total_return_3_mo: round(self.total_return_3_mo),
            total_return_6_mo: round(self.total_return_6_mo),
            total_return_12_mo: round(self.total_return_12_mo),
            total_return_3_yr: round(self.total_return_3_yr),
        }
    }
}
