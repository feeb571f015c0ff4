use std::collections::HashMap;

use futures::future::join_all;
use itertools::Itertools;
use log::{debug, warn};

use crate::{
    cache::{QUOTE_TTL, cache_key},
    data::quote::Quote,
    ds::yahoo::QuoteEnvelope,
    error::DfResult,
    financial::MarketData,
};

impl MarketData {
    /// Latest quote for `symbol`, served from cache for up to 10 seconds.
    ///
    /// Quotes back headline figures, so any failure (exhausted retries, a non-2xx response,
    /// an unparsable body) is returned to the caller rather than papered over.
    pub async fn fetch_quote(&self, symbol: &str) -> DfResult<Quote> {
        let key = cache_key("quote", symbol);
        if let Some(quote) = self.caches.quotes.get(&key, QUOTE_TTL) {
            return Ok(quote);
        }

        let url = self.client.quote_url(symbol)?;
        let response = self.client.call_api_ok(&url).await?;
        let envelope: QuoteEnvelope = response.json()?;
        let quote = envelope.into_quote(symbol);

        self.caches.quotes.set(&key, quote.clone());

        Ok(quote)
    }

    /// Quotes for all `symbols`, fetching cache misses concurrently. A symbol that cannot be
    /// fetched is still present, with every field but `symbol` empty.
    pub async fn fetch_batch_quotes(&self, symbols: &[String]) -> HashMap<String, Quote> {
        let mut results: HashMap<String, Quote> = HashMap::with_capacity(symbols.len());
        let mut misses: Vec<&str> = vec![];

        for symbol in symbols.iter().unique() {
            let key = cache_key("quote", symbol);
            match self.caches.quotes.get(&key, QUOTE_TTL) {
                Some(quote) => {
                    results.insert(symbol.to_string(), quote);
                }
                None => misses.push(symbol),
            }
        }

        debug!(
            "[Quote] Batch of {}: {} cached, {} to fetch",
            symbols.len(),
            results.len(),
            misses.len()
        );

        let fetched = join_all(misses.into_iter().map(|symbol| async move {
            (symbol, self.fetch_quote(symbol).await)
        }))
        .await;

        for (symbol, result) in fetched {
            let quote = result.unwrap_or_else(|err| {
                warn!("[Quote] Fetch failed for {symbol}: {err}");
                Quote::empty(symbol)
            });
            results.insert(symbol.to_string(), quote);
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        data::quote::Quote,
        error::DfError,
        financial::tests::market_data,
        utils::net::tests::Step,
    };

    const SCHD_BODY: &str = r#"{"quoteResponse":{"result":[{"regularMarketPrice":27.5,"regularMarketChange":0.12,"regularMarketPreviousClose":27.38,"currency":"USD","fullExchangeName":"NYSEArca"}]}}"#;

    #[tokio::test(start_paused = true)]
    async fn test_fetch_quote_maps_and_caches() {
        let (market, transport) = market_data(vec![Step::Status(200, SCHD_BODY)]);

        let quote = market.fetch_quote("SCHD").await.unwrap();
        assert_eq!(
            quote,
            Quote {
                symbol: "SCHD".to_string(),
                price: Some(27.5),
                price_change: Some(0.12),
                previous_close: Some(27.38),
                currency: Some("USD".to_string()),
                exchange: Some("NYSEArca".to_string()),
            }
        );

        let cached = market.fetch_quote("SCHD").await.unwrap();
        assert_eq!(cached, quote);
        assert_eq!(transport.call_count(), 1);

        let calls = transport.calls.lock().unwrap();
        assert!(calls[0].1.ends_with("/v7/finance/quote?symbols=SCHD"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_quote_without_result_is_all_none() {
        let (market, _) = market_data(vec![Step::Status(200, r#"{"quoteResponse":{}}"#)]);

        assert_eq!(market.fetch_quote("ZZZZ").await.unwrap(), Quote::empty("ZZZZ"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_quote_rejects_failures() {
        let (market, transport) = market_data(vec![Step::Status(404, "")]);
        assert!(matches!(
            market.fetch_quote("GONE").await,
            Err(DfError::HttpStatusError { .. })
        ));
        assert_eq!(transport.call_count(), 1);

        let (market, _) = market_data(vec![Step::Status(200, "<html>")]);
        assert!(matches!(
            market.fetch_quote("HTML").await,
            Err(DfError::SerdeJsonError(_))
        ));
        assert!(market.caches().quotes.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_batch_quotes_degrade_failed_symbol() {
        // the first request succeeds, the second symbol fails on every attempt
        let (market, transport) = market_data(vec![
            Step::Status(200, SCHD_BODY),
            Step::Fail,
            Step::Fail,
            Step::Fail,
            Step::Fail,
        ]);
        let symbols = vec!["AAA".to_string(), "BBB".to_string()];

        let quotes = market.fetch_batch_quotes(&symbols).await;

        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes["AAA"].price, Some(27.5));
        assert_eq!(quotes["AAA"].symbol, "AAA");
        assert_eq!(quotes["BBB"], Quote::empty("BBB"));
        assert_eq!(transport.call_count(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_batch_quotes_use_fresh_cache() {
        let (market, transport) = market_data(vec![]);
        market
            .caches()
            .quotes
            .set("quote:VYM", Quote::empty("VYM"));

        let quotes = market
            .fetch_batch_quotes(&["VYM".to_string(), "VYM".to_string()])
            .await;

        assert_eq!(quotes.len(), 1);
        assert_eq!(transport.call_count(), 0);
    }
}
