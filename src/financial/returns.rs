use std::{collections::HashMap, time::Duration};

use futures::future::join_all;
use log::{debug, info, warn};
use tokio::time::sleep;

use crate::{
    cache::{TOTAL_RETURNS_TTL, cache_key},
    data::returns::{ReturnsReport, TotalReturns, TrailingReturns},
    error::DfResult,
    financial::MarketData,
};

pub const REFRESH_BATCH_SIZE: usize = 10;
pub const REFRESH_PAUSE: Duration = Duration::from_secs(2);

const RETURNS_TIMEFRAME: &str = "3Y";

impl MarketData {
    /// Current quote together with trailing price returns over three years of weekly closes.
    pub async fn fetch_returns(&self, symbol: &str) -> DfResult<ReturnsReport> {
        let quote = self.fetch_quote(symbol).await?;
        let chart = self.fetch_chart(symbol, RETURNS_TIMEFRAME).await;
        let returns = TrailingReturns::from_series(&chart.series);

        Ok(ReturnsReport::new(
            symbol,
            quote.price,
            quote.price_change,
            &returns,
        ))
    }

    /// 3M, 6M, 12M and 3Y total returns, cached for 6 hours. An empty price series is not cached.
    pub async fn fetch_total_returns(&self, symbol: &str) -> TotalReturns {
        let key = cache_key("total-returns", symbol);
        if let Some(totals) = self.caches.total_returns.get(&key, TOTAL_RETURNS_TTL) {
            return totals;
        }

        let chart = self.fetch_chart(symbol, RETURNS_TIMEFRAME).await;
        let totals = TotalReturns::from_series(symbol, &chart.series);

        if !chart.series.is_empty() {
            self.caches.total_returns.set(&key, totals.clone());
        }

        totals
    }

    /// Recomputes total returns for many symbols, `batch_size` at a time with a pause between
    /// batches to stay under provider rate limits. Symbols without price data are left out.
    ///
    /// Returned values are rounded to 2 decimals. The cache keeps the unrounded figures that
    /// `fetch_total_returns` would compute.
    pub async fn refresh_total_returns(
        &self,
        symbols: &[String],
        batch_size: usize,
        pause: Duration,
    ) -> HashMap<String, TotalReturns> {
        let mut results: HashMap<String, TotalReturns> = HashMap::new();
        let mut errors = 0;

        let batches: Vec<&[String]> = symbols.chunks(batch_size.max(1)).collect();
        for (i, batch) in batches.iter().enumerate() {
            debug!(
                "[Returns] Refresh batch {}/{} ({} symbols)",
                i + 1,
                batches.len(),
                batch.len()
            );

            let fetched = join_all(batch.iter().map(|symbol| async move {
                let chart = self.fetch_chart(symbol, RETURNS_TIMEFRAME).await;
                (symbol, chart.series)
            }))
            .await;

            for (symbol, series) in fetched {
                if series.is_empty() {
                    warn!("[Returns] No price data for {symbol}");
                    errors += 1;
                    continue;
                }

                let totals = TotalReturns::from_series(symbol, &series);
                self.caches
                    .total_returns
                    .set(&cache_key("total-returns", symbol), totals.clone());
                results.insert(symbol.to_string(), totals.rounded(2));
            }

            if i + 1 < batches.len() {
                sleep(pause).await;
            }
        }

        info!(
            "[Returns] Refreshed total returns: {} updated, {errors} errors",
            results.len()
        );

        results
    }
}
