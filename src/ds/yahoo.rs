use std::{collections::HashMap, sync::Arc};

use log::warn;
use reqwest::header::HeaderMap;
use serde::Deserialize;
use url::Url;

use crate::{
    data::{
        dividend::{DividendEvent, SplitEvent},
        quote::Quote,
        series::PriceSeries,
    },
    error::{DfError, DfResult},
    utils::net::{HttpResponse, HttpTransport, RetryOptions, join_url, request_with_retry},
};

pub const DEFAULT_API_BASE: &str = "https://query1.finance.yahoo.com";

const QUOTE_PATH: &str = "/v7/finance/quote";
const CHART_PATH: &str = "/v8/finance/chart";

pub struct YahooClient {
    transport: Arc<dyn HttpTransport>,
    api_base: String,
    retry: RetryOptions,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteEnvelope {
    pub quote_response: Option<QuoteResponse>,
}

#[derive(Debug, Default, Deserialize)]
pub struct QuoteResponse {
    pub result: Option<Vec<QuoteResult>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResult {
    pub regular_market_price: Option<f64>,
    pub regular_market_change: Option<f64>,
    pub regular_market_previous_close: Option<f64>,
    pub currency: Option<String>,
    pub full_exchange_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChartEnvelope {
    pub chart: Option<ChartBody>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChartBody {
    pub result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChartResult {
    pub timestamp: Option<Vec<Option<i64>>>,
    pub indicators: Option<ChartIndicators>,
    pub events: Option<ChartEvents>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChartIndicators {
    pub quote: Option<Vec<IndicatorQuote>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct IndicatorQuote {
    pub close: Option<Vec<Option<f64>>>,
}

/// Event maps are keyed by the event's epoch-second timestamp rendered as a string.
#[derive(Debug, Default, Deserialize)]
pub struct ChartEvents {
    pub dividends: Option<HashMap<String, RawDividend>>,
    pub splits: Option<HashMap<String, RawSplit>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawDividend {
    pub amount: Option<f64>,
    pub date: Option<i64>,
    pub timestamp: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawSplit {
    pub numerator: Option<f64>,
    pub denominator: Option<f64>,
    pub date: Option<i64>,
    pub timestamp: Option<i64>,
}

impl YahooClient {
    pub fn new(transport: Arc<dyn HttpTransport>, api_base: &str, retry: RetryOptions) -> Self {
        Self {
            transport,
            api_base: api_base.to_string(),
            retry,
        }
    }

    pub fn quote_url(&self, symbol: &str) -> DfResult<Url> {
        let mut url = join_url(&self.api_base, QUOTE_PATH)?;
        url.query_pairs_mut().append_pair("symbols", symbol);

        Ok(url)
    }

    pub fn chart_url(&self, symbol: &str, params: &[(&str, &str)]) -> DfResult<Url> {
        let mut url = join_url(&self.api_base, CHART_PATH)?;
        url.path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .push(symbol);
        url.query_pairs_mut().extend_pairs(params);

        Ok(url)
    }

    pub async fn call_api(&self, url: &Url) -> DfResult<HttpResponse> {
        request_with_retry(self.transport.as_ref(), url, &HeaderMap::new(), &self.retry).await
    }

    /// Like `call_api`, but a final response outside 2xx becomes an error.
    pub async fn call_api_ok(&self, url: &Url) -> DfResult<HttpResponse> {
        let response = self.call_api(url).await?;

        if response.is_success() {
            Ok(response)
        } else {
            Err(DfError::http_status(response.status, url.as_str()))
        }
    }
}

impl QuoteEnvelope {
    pub fn into_quote(self, symbol: &str) -> Quote {
        let result = self
            .quote_response
            .and_then(|r| r.result)
            .and_then(|results| results.into_iter().next())
            .unwrap_or_default();

        Quote {
            symbol: symbol.to_string(),
            price: result.regular_market_price,
            price_change: result.regular_market_change,
            previous_close: result.regular_market_previous_close,
            currency: result.currency,
            exchange: result.full_exchange_name,
        }
    }
}

impl ChartEnvelope {
    pub fn into_first_result(self) -> ChartResult {
        self.chart
            .and_then(|c| c.result)
            .and_then(|results| results.into_iter().next())
            .unwrap_or_default()
    }
}

impl ChartResult {
    pub fn price_series(&self) -> PriceSeries {
        let timestamps = self.timestamp.as_deref().unwrap_or_default();
        let closes = self
            .indicators
            .as_ref()
            .and_then(|i| i.quote.as_ref())
            .and_then(|quotes| quotes.first())
            .and_then(|q| q.close.as_deref())
            .unwrap_or_default();

        PriceSeries::from_raw(timestamps, closes)
    }

    pub fn dividend_events(&self) -> Vec<DividendEvent> {
        let Some(dividends) = self.events.as_ref().and_then(|e| e.dividends.as_ref()) else {
            return vec![];
        };

        dividends
            .iter()
            .filter_map(|(key, item)| {
                let Some(secs) = event_secs(item.date, item.timestamp, key) else {
                    warn!("[Dividend] Skip event without a usable date '{key}'");
                    return None;
                };

                Some(DividendEvent {
                    date_ms: secs.checked_mul(1000)?,
                    amount: item.amount.unwrap_or(0.0),
                })
            })
            .collect()
    }

    pub fn split_events(&self) -> Vec<SplitEvent> {
        let Some(splits) = self.events.as_ref().and_then(|e| e.splits.as_ref()) else {
            return vec![];
        };

        splits
            .iter()
            .filter_map(|(key, item)| {
                let Some(secs) = event_secs(item.date, item.timestamp, key) else {
                    warn!("[Split] Skip event without a usable date '{key}'");
                    return None;
                };

                let ratio = item.numerator.unwrap_or(1.0) / item.denominator.unwrap_or(1.0);
                if !ratio.is_finite() || ratio <= 0.0 {
                    warn!("[Split] Skip event '{key}' with unusable ratio {ratio}");
                    return None;
                }

                Some(SplitEvent {
                    date_ms: secs.checked_mul(1000)?,
                    ratio,
                })
            })
            .collect()
    }
}

/// Event date in epoch seconds: the `date` field, else `timestamp`, else the map key.
/// Zero counts as absent.
fn event_secs(date: Option<i64>, timestamp: Option<i64>, key: &str) -> Option<i64> {
    date.filter(|d| *d != 0)
        .or(timestamp.filter(|t| *t != 0))
        .or_else(|| key.trim().parse::<i64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::net::tests::{ScriptedTransport, Step};

    fn client(transport: Arc<ScriptedTransport>) -> YahooClient {
        YahooClient::new(transport, DEFAULT_API_BASE, RetryOptions::default())
    }

    #[test]
    fn test_urls() {
        let client = client(Arc::new(ScriptedTransport::new(vec![])));

        assert_eq!(
            client.quote_url("SCHD").unwrap().as_str(),
            "https://query1.finance.yahoo.com/v7/finance/quote?symbols=SCHD"
        );
        assert_eq!(
            client
                .chart_url("BRK B", &[("range", "1y"), ("interval", "1d")])
                .unwrap()
                .as_str(),
            "https://query1.finance.yahoo.com/v8/finance/chart/BRK%20B?range=1y&interval=1d"
        );
    }

    #[test]
    fn test_quote_envelope_maps_missing_fields_to_none() {
        let envelope: QuoteEnvelope = serde_json::from_str(
            r#"{"quoteResponse":{"result":[{"regularMarketPrice":27.91,"currency":"USD"}]}}"#,
        )
        .unwrap();
        let quote = envelope.into_quote("SCHD");

        assert_eq!(quote.symbol, "SCHD");
        assert_eq!(quote.price, Some(27.91));
        assert_eq!(quote.currency.as_deref(), Some("USD"));
        assert_eq!(quote.price_change, None);
        assert_eq!(quote.exchange, None);

        let empty: QuoteEnvelope = serde_json::from_str(r#"{"quoteResponse":{"result":[]}}"#).unwrap();
        assert_eq!(empty.into_quote("XYZ"), Quote::empty("XYZ"));
    }

    #[test]
    fn test_chart_result_price_series() {
        let envelope: ChartEnvelope = serde_json::from_str(
            r#"{"chart":{"result":[{"timestamp":[10,20,null],"indicators":{"quote":[{"close":[1.0,null,3.0]}]}}]}}"#,
        )
        .unwrap();
        let series = envelope.into_first_result().price_series();

        assert_eq!(series.timestamps, vec![10]);
        assert_eq!(series.closes, vec![1.0]);

        let missing: ChartEnvelope = serde_json::from_str(r#"{"chart":{"result":null}}"#).unwrap();
        assert!(missing.into_first_result().price_series().is_empty());
    }

    #[test]
    fn test_chart_result_events() {
        let envelope: ChartEnvelope = serde_json::from_str(
            r#"{"chart":{"result":[{"events":{
                "dividends":{"1577836800":{"amount":1.0,"date":1577836800},"1609459200":{"amount":0.5}},
                "splits":{"1590969600":{"numerator":2,"denominator":1,"date":1590969600},"1":{"numerator":1,"denominator":0,"date":1}}
            }}]}}"#,
        )
        .unwrap();
        let result = envelope.into_first_result();

        let mut dividends = result.dividend_events();
        dividends.sort_by_key(|d| d.date_ms);
        assert_eq!(
            dividends,
            vec![
                DividendEvent {
                    date_ms: 1_577_836_800_000,
                    amount: 1.0
                },
                DividendEvent {
                    date_ms: 1_609_459_200_000,
                    amount: 0.5
                },
            ]
        );

        assert_eq!(
            result.split_events(),
            vec![SplitEvent {
                date_ms: 1_590_969_600_000,
                ratio: 2.0
            }]
        );
    }

    #[test]
    fn test_event_secs_fallbacks() {
        assert_eq!(event_secs(Some(5), Some(6), "7"), Some(5));
        assert_eq!(event_secs(Some(0), Some(6), "7"), Some(6));
        assert_eq!(event_secs(None, None, "7"), Some(7));
        assert_eq!(event_secs(None, None, "n/a"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_call_api_ok_rejects_client_errors() {
        let transport = Arc::new(ScriptedTransport::new(vec![Step::Status(404, "")]));
        let client = client(transport.clone());
        let url = client.quote_url("NOPE").unwrap();

        let result = client.call_api_ok(&url).await;

        assert!(matches!(result, Err(DfError::HttpStatusError { .. })));
        assert_eq!(transport.call_count(), 1);
    }
}
