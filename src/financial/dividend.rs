use itertools::Itertools;
use log::{debug, error, warn};

use crate::{
    cache::{DIVIDEND_TTL, cache_key},
    data::dividend::{DividendEvent, DividendHistory, DividendRecord, SplitEvent},
    ds::yahoo::ChartEnvelope,
    error::DfResult,
    financial::MarketData,
    utils::datetime::epoch_millis_to_date_str,
};

impl MarketData {
    /// Full dividend history of `symbol`, adjusted for every later split, cached for 6 hours.
    ///
    /// A failed fetch is logged and yields an empty history, which is not cached.
    pub async fn fetch_dividend_history(&self, symbol: &str) -> DividendHistory {
        let key = cache_key("dividends", symbol);
        if let Some(history) = self.caches.dividends.get(&key, DIVIDEND_TTL) {
            return history;
        }

        match self.request_dividends(symbol).await {
            Ok(dividends) => {
                let history = DividendHistory {
                    symbol: symbol.to_string(),
                    dividends,
                };
                self.caches.dividends.set(&key, history.clone());

                history
            }
            Err(err) => {
                error!("[Dividend] Fetch failed for {symbol}: {err}");
                DividendHistory::empty(symbol)
            }
        }
    }

    async fn request_dividends(&self, symbol: &str) -> DfResult<Vec<DividendRecord>> {
        let url = self.client.chart_url(
            symbol,
            &[("range", "max"), ("interval", "1d"), ("events", "div,splits")],
        )?;
        let response = self.client.call_api_ok(&url).await?;
        let envelope: ChartEnvelope = response.json()?;
        let result = envelope.into_first_result();

        let dividends = result.dividend_events();
        let splits = result.split_events();
        debug!(
            "[Dividend] {symbol}: {} dividends, {} splits",
            dividends.len(),
            splits.len()
        );

        Ok(adjust_for_splits(&dividends, &splits))
    }
}

/// Rescales each dividend by the ratio of every split that happened after it, so amounts are
/// comparable with today's share count. Non-positive results are dropped and the records come
/// back ordered by date, payouts sharing a date ordered by their timestamps.
pub fn adjust_for_splits(dividends: &[DividendEvent], splits: &[SplitEvent]) -> Vec<DividendRecord> {
    let splits: Vec<&SplitEvent> = splits.iter().sorted_by_key(|s| s.date_ms).collect();

    dividends
        .iter()
        .sorted_by_key(|event| event.date_ms)
        .filter_map(|event| {
            let factor: f64 = splits
                .iter()
                .filter(|split| split.date_ms > event.date_ms)
                .map(|split| split.ratio)
                .product();
            let adjusted = event.amount * factor;

            if factor != 1.0 {
                debug!(
                    "[Dividend] Adjust {} -> {adjusted} at {}",
                    event.amount, event.date_ms
                );
            }

            if adjusted <= 0.0 || adjusted.is_nan() {
                return None;
            }

            let Some(date) = epoch_millis_to_date_str(event.date_ms) else {
                warn!("[Dividend] Skip event with out of range date {}", event.date_ms);
                return None;
            };

            Some(DividendRecord {
                date,
                dividend: adjusted,
            })
        })
        .sorted_by(|a, b| a.date.cmp(&b.date))
        .collect()
}
