use std::{collections::HashMap, time::Duration};

use tokio::sync::OnceCell;

use crate::{
    CONFIG,
    config::DfConfig,
    data::{
        dividend::DividendHistory,
        quote::Quote,
        returns::{ReturnsReport, TotalReturns},
        series::{ComparisonCharts, EtfChart},
    },
    error::DfResult,
    financial::MarketData,
    utils::financial::calc_average_dividend,
};

static MARKET: OnceCell<MarketData> = OnceCell::const_new();

async fn market() -> DfResult<&'static MarketData> {
    MARKET
        .get_or_try_init(|| async {
            let config = CONFIG.read().await;
            MarketData::from_config(&config)
        })
        .await
}

fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

fn normalize_symbols(symbols: &[String]) -> Vec<String> {
    symbols
        .iter()
        .map(|s| normalize_symbol(s))
        .filter(|s| !s.is_empty())
        .collect()
}

pub async fn quote(symbol: &str) -> DfResult<Quote> {
    market().await?.fetch_quote(&normalize_symbol(symbol)).await
}

pub async fn batch_quotes(symbols: &[String]) -> DfResult<HashMap<String, Quote>> {
    Ok(market()
        .await?
        .fetch_batch_quotes(&normalize_symbols(symbols))
        .await)
}

pub async fn comparison_charts(symbols: &[String], timeframe: &str) -> DfResult<ComparisonCharts> {
    Ok(market()
        .await?
        .fetch_comparison_charts(&normalize_symbols(symbols), &timeframe.trim().to_uppercase())
        .await)
}

pub async fn etf_chart(symbol: &str, timeframe: &str) -> DfResult<EtfChart> {
    Ok(market()
        .await?
        .fetch_etf_chart(&normalize_symbol(symbol), &timeframe.trim().to_uppercase())
        .await)
}

pub async fn dividend_history(symbol: &str) -> DfResult<DividendHistory> {
    Ok(market()
        .await?
        .fetch_dividend_history(&normalize_symbol(symbol))
        .await)
}

pub async fn average_dividend(symbol: &str, payments_per_year: u32) -> DfResult<Option<f64>> {
    let history = dividend_history(symbol).await?;
    Ok(calc_average_dividend(&history.dividends, payments_per_year))
}

pub async fn returns(symbol: &str) -> DfResult<ReturnsReport> {
    market().await?.fetch_returns(&normalize_symbol(symbol)).await
}

pub async fn total_returns(symbol: &str) -> DfResult<TotalReturns> {
    Ok(market()
        .await?
        .fetch_total_returns(&normalize_symbol(symbol))
        .await)
}

pub async fn refresh_total_returns(
    symbols: &[String],
    batch_size: usize,
    pause: Duration,
) -> DfResult<HashMap<String, TotalReturns>> {
    Ok(market()
        .await?
        .refresh_total_returns(&normalize_symbols(symbols), batch_size, pause)
        .await)
}

pub async fn get_config() -> DfResult<DfConfig> {
    Ok(CONFIG.read().await.clone())
}

/// Persists one config field. The market data client keeps the settings it was built with until
/// the next start.
pub async fn set_config(key: &str, value: &str) -> DfResult<()> {
    let mut config = CONFIG.write().await;

    let mut updated = config.clone();
    updated.set(key, value)?;
    updated.store()?;
    *config = updated;

    Ok(())
}
