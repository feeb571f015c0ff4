use std::{collections::HashMap, str::FromStr};

use futures::future::join_all;
use log::error;

use crate::{
    cache::{CHART_TTL, cache_key},
    data::series::{Chart, ComparisonCharts, EtfChart, PriceSeries},
    ds::yahoo::ChartEnvelope,
    error::DfResult,
    financial::MarketData,
};

/// Display windows the front end knows about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display, strum::EnumIter, strum::EnumString)]
pub enum Timeframe {
    #[strum(serialize = "1D")]
    OneDay,
    #[strum(serialize = "1W")]
    OneWeek,
    #[strum(serialize = "1M")]
    OneMonth,
    #[strum(serialize = "3M")]
    ThreeMonths,
    #[strum(serialize = "6M")]
    SixMonths,
    #[strum(serialize = "YTD")]
    YearToDate,
    #[strum(serialize = "1Y")]
    OneYear,
    #[strum(serialize = "3Y")]
    ThreeYears,
    #[strum(serialize = "5Y")]
    FiveYears,
    #[strum(serialize = "10Y")]
    TenYears,
    #[strum(serialize = "20Y")]
    TwentyYears,
    #[strum(serialize = "MAX")]
    Max,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChartParams {
    pub range: &'static str,
    pub interval: &'static str,
}

impl Timeframe {
    pub fn chart_params(&self) -> ChartParams {
        let (range, interval) = match self {
            Timeframe::OneDay => ("1d", "5m"),
            Timeframe::OneWeek => ("5d", "30m"),
            Timeframe::OneMonth => ("1mo", "1d"),
            Timeframe::ThreeMonths => ("3mo", "1d"),
            Timeframe::SixMonths => ("6mo", "1d"),
            Timeframe::YearToDate => ("ytd", "1d"),
            Timeframe::OneYear => ("1y", "1d"),
            Timeframe::ThreeYears => ("3y", "1wk"),
            Timeframe::FiveYears => ("5y", "1wk"),
            Timeframe::TenYears | Timeframe::TwentyYears | Timeframe::Max => ("max", "1mo"),
        };

        ChartParams { range, interval }
    }
}

impl Default for ChartParams {
    fn default() -> Self {
        Self {
            range: "1mo",
            interval: "1d",
        }
    }
}

/// Provider range and interval for a timeframe label; unknown labels get one month of dailies.
pub fn map_timeframe(timeframe: &str) -> ChartParams {
    Timeframe::from_str(timeframe)
        .map(|tf| tf.chart_params())
        .unwrap_or_default()
}

impl MarketData {
    /// Cleaned close series for `symbol` over `timeframe`, cached for 60 seconds.
    ///
    /// Charts are supplementary, so a failed fetch is logged and yields an empty series
    /// instead of an error. Failed fetches are not cached.
    pub async fn fetch_chart(&self, symbol: &str, timeframe: &str) -> Chart {
        let params = map_timeframe(timeframe);
        let key = cache_key(
            "chart",
            &format!("{symbol}:{}:{}", params.range, params.interval),
        );

        if let Some(series) = self.caches.charts.get(&key, CHART_TTL) {
            return Chart {
                symbol: symbol.to_string(),
                timeframe: timeframe.to_string(),
                series,
            };
        }

        match self.request_chart(symbol, &params).await {
            Ok(series) => {
                self.caches.charts.set(&key, series.clone());

                Chart {
                    symbol: symbol.to_string(),
                    timeframe: timeframe.to_string(),
                    series,
                }
            }
            Err(err) => {
                error!("[Chart] Fetch failed for {symbol}: {err}");
                Chart::empty(symbol, timeframe)
            }
        }
    }

    /// Charts for several symbols fetched side by side; never fails.
    pub async fn fetch_comparison_charts(
        &self,
        symbols: &[String],
        timeframe: &str,
    ) -> ComparisonCharts {
        let charts = join_all(
            symbols
                .iter()
                .map(|symbol| self.fetch_chart(symbol, timeframe)),
        )
        .await;

        let data: HashMap<String, PriceSeries> = charts
            .into_iter()
            .map(|chart| (chart.symbol, chart.series))
            .collect();

        ComparisonCharts {
            symbols: symbols.to_vec(),
            timeframe: timeframe.to_string(),
            data,
        }
    }

    /// Display points for one symbol, with open, high and low filled from the close.
    pub async fn fetch_etf_chart(&self, symbol: &str, timeframe: &str) -> EtfChart {
        let chart = self.fetch_chart(symbol, timeframe).await;

        EtfChart {
            data: chart.series.points(),
            symbol: chart.symbol,
        }
    }

    async fn request_chart(&self, symbol: &str, params: &ChartParams) -> DfResult<PriceSeries> {
        let url = self.client.chart_url(
            symbol,
            &[("range", params.range), ("interval", params.interval)],
        )?;
        let response = self.client.call_api_ok(&url).await?;
        let envelope: ChartEnvelope = response.json()?;

        Ok(envelope.into_first_result().price_series())
    }
}
