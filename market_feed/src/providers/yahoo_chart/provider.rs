use std::time::Duration;

use async_trait::async_trait;
use indexmap::IndexMap;
use reqwest::{Client, StatusCode, header};
use tracing::{debug, warn};

use shared_utils::env::env_var_or;

use crate::models::request_params::HistoryRequest;
use crate::models::tick::{PricePoint, TickSeries};
use crate::providers::yahoo_chart::params::{construct_params, validate_request};
use crate::providers::yahoo_chart::response::{ChartResponse, close_points};
use crate::providers::PriceSource;
use crate::providers::errors::{FeedError, ProviderInitError};

const BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Environment variable that overrides the chart endpoint base URL.
const BASE_URL_ENV: &str = "QBIT5_FEED_BASE_URL";

/// The endpoint rejects requests without a browser-ish user agent.
const USER_AGENT: &str = "Mozilla/5.0 (compatible; qbit5-snapshot/0.1)";

/// Pause between per-symbol requests, so one run never hammers the API.
const COURTESY_PAUSE: Duration = Duration::from_millis(200);

/// Bounded retry applied to each symbol request.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Attempts per symbol, including the first.
    pub max_attempts: u32,
    /// Pause between attempts.
    pub pause: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            pause: Duration::from_millis(500),
        }
    }
}

/// [`PriceSource`] backed by the Yahoo Finance v8 chart endpoint.
///
/// One HTTP request per symbol. A symbol whose request keeps failing is
/// reported as missing rather than failing the whole fetch; callers already
/// treat partial coverage as a normal condition.
pub struct YahooChartProvider {
    client: Client,
    base_url: String,
    retry: RetryPolicy,
}

impl YahooChartProvider {
    /// Creates a provider against the production endpoint.
    ///
    /// The base URL can be overridden through the `QBIT5_FEED_BASE_URL`
    /// environment variable (integration tests point it at a local server).
    pub fn new(retry: RetryPolicy) -> Result<Self, ProviderInitError> {
        Self::with_base_url(env_var_or(BASE_URL_ENV, BASE_URL), retry)
    }

    /// Creates a provider against an explicit base URL.
    pub fn with_base_url(
        base_url: impl Into<String>,
        retry: RetryPolicy,
    ) -> Result<Self, ProviderInitError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::USER_AGENT, header::HeaderValue::from_static(USER_AGENT));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(20))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            retry,
        })
    }

    async fn fetch_symbol(
        &self,
        symbol: &str,
        req: &HistoryRequest,
    ) -> Result<Vec<PricePoint>, FeedError> {
        let url = format!("{}/{}", self.base_url, symbol);
        let query = construct_params(req);

        let mut attempt = 1u32;
        loop {
            match self.request_once(&url, &query).await {
                Ok(points) => return Ok(points),
                Err(err) if err.is_transient() && attempt < self.retry.max_attempts => {
                    warn!(symbol, attempt, error = %err, "chart request failed; retrying");
                    tokio::time::sleep(self.retry.pause).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn request_once(
        &self,
        url: &str,
        query: &[(String, String)],
    ) -> Result<Vec<PricePoint>, FeedError> {
        let response = self.client.get(url).query(query).send().await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            return Err(FeedError::Transient { status });
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown API error".to_string());
            return Err(FeedError::Api(body));
        }

        let payload = response.json::<ChartResponse>().await?;
        if let Some(err) = payload.chart.error {
            return Err(FeedError::Api(format!("{}: {}", err.code, err.description)));
        }

        let result = payload
            .chart
            .result
            .and_then(|mut results| (!results.is_empty()).then(|| results.remove(0)));

        Ok(result.as_ref().map(close_points).unwrap_or_default())
    }
}

#[async_trait]
impl PriceSource for YahooChartProvider {
    async fn fetch_history(
        &self,
        req: &HistoryRequest,
    ) -> Result<IndexMap<String, TickSeries>, FeedError> {
        validate_request(req)?;

        let mut series = IndexMap::new();
        for (index, symbol) in req.symbols.iter().enumerate() {
            if index > 0 {
                tokio::time::sleep(COURTESY_PAUSE).await;
            }

            match self.fetch_symbol(symbol, req).await {
                Ok(points) if !points.is_empty() => {
                    series.insert(
                        symbol.clone(),
                        TickSeries {
                            symbol: symbol.clone(),
                            granularity: req.granularity,
                            points,
                        },
                    );
                }
                Ok(_) => debug!(symbol = %symbol, "no usable observations returned"),
                Err(err) => {
                    warn!(symbol = %symbol, error = %err, "symbol fetch failed; treating as missing")
                }
            }
        }

        Ok(series)
    }
}
