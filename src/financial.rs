use std::sync::Arc;

use crate::{
    cache::Cache,
    config::DfConfig,
    data::{dividend::DividendHistory, quote::Quote, returns::TotalReturns, series::PriceSeries},
    ds::yahoo::YahooClient,
    error::DfResult,
    utils::net::ReqwestTransport,
};

pub mod chart;
pub mod dividend;
pub mod quote;
pub mod returns;

/// One cache per kind of data; clones share the same underlying stores.
#[derive(Clone, Default)]
pub struct MarketCaches {
    pub quotes: Arc<Cache<Quote>>,
    pub charts: Arc<Cache<PriceSeries>>,
    pub dividends: Arc<Cache<DividendHistory>>,
    pub total_returns: Arc<Cache<TotalReturns>>,
}

/// Entry point for every fetch. Construct it once and share it; the provider client and the
/// caches are injected so that tests can swap either.
pub struct MarketData {
    client: YahooClient,
    caches: MarketCaches,
}

impl MarketData {
    pub fn new(client: YahooClient) -> Self {
        Self::with_caches(client, MarketCaches::default())
    }

    pub fn with_caches(client: YahooClient, caches: MarketCaches) -> Self {
        Self { client, caches }
    }

    pub fn from_config(config: &DfConfig) -> DfResult<Self> {
        let api_base = config.api_base()?;
        let client = YahooClient::new(
            Arc::new(ReqwestTransport::new()),
            api_base.as_str(),
            config.retry_options(),
        );

        Ok(Self::new(client))
    }

    pub fn caches(&self) -> &MarketCaches {
        &self.caches
    }
}
