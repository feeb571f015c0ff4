use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::{
    StatusCode,
    header::{ACCEPT, ACCEPT_LANGUAGE, CONNECTION, HeaderMap, HeaderValue, USER_AGENT},
};
use serde::de::DeserializeOwned;
use tokio::time::sleep;
use url::Url;

use crate::error::{DfError, DfResult};

pub const MAX_RETRIES: u32 = 3;
pub const INITIAL_BACKOFF: Duration = Duration::from_millis(500);

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";
const BROWSER_ACCEPT: &str = "application/json, text/javascript, */*; q=0.01";
const BROWSER_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

#[derive(Clone, Debug)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

/// The single network seam: everything upstream goes through one `get`.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, url: &Url, headers: &HeaderMap) -> DfResult<HttpResponse>;
}

pub struct ReqwestTransport {
    client: reqwest::Client,
}

#[derive(Clone, Debug)]
pub struct RetryOptions {
    pub max_retries: u32,
    pub initial_backoff: Duration,
}

impl HttpResponse {
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn json<T: DeserializeOwned>(&self) -> DfResult<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &Url, headers: &HeaderMap) -> DfResult<HttpResponse> {
        let response = self
            .client
            .get(url.clone())
            .headers(headers.clone())
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?.to_vec();

        Ok(HttpResponse { status, body })
    }
}

impl Default for RetryOptions {
    fn default() -> Self {
        Self {
            max_retries: MAX_RETRIES,
            initial_backoff: INITIAL_BACKOFF,
        }
    }
}

pub fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(ACCEPT, HeaderValue::from_static(BROWSER_ACCEPT));
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static(BROWSER_ACCEPT_LANGUAGE),
    );
    headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));

    headers
}

/// Default headers first, then the caller's; a caller header replaces every default value of
/// the same name.
pub fn merge_headers(headers: &HeaderMap) -> HeaderMap {
    let mut merged = default_headers();

    for name in headers.keys() {
        merged.remove(name);
    }
    for (name, value) in headers {
        merged.append(name.clone(), value.clone());
    }

    merged
}

pub fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Issues a GET, retrying rate-limited (429) and server-error (5xx) responses as well as
/// transport failures. Any other response, successful or not, is returned as-is.
///
/// The wait between attempts starts at `initial_backoff` and doubles each time. Once
/// `max_retries` extra attempts are spent the last remembered error is returned.
pub async fn request_with_retry(
    transport: &dyn HttpTransport,
    url: &Url,
    headers: &HeaderMap,
    options: &RetryOptions,
) -> DfResult<HttpResponse> {
    let headers = merge_headers(headers);
    let mut backoff = options.initial_backoff;
    let mut last_error: Option<DfError> = None;

    for attempt in 0..=options.max_retries {
        match transport.get(url, &headers).await {
            Ok(response) => {
                if !is_retryable_status(response.status) {
                    return Ok(response);
                }

                debug!("[HTTP Status Error] [{url}] {}", response.status);
                last_error = Some(DfError::http_status(response.status, url.as_str()));
            }
            Err(err) => {
                debug!("[HTTP Request Error] [{url}] {err}");
                last_error = Some(err);
            }
        }

        if attempt < options.max_retries {
            debug!(
                "Retry {}/{} for '{url}' in {}ms",
                attempt + 1,
                options.max_retries,
                backoff.as_millis()
            );
            sleep(backoff).await;
            backoff = backoff.saturating_mul(2);
        }
    }

    Err(last_error.unwrap_or_else(|| DfError::Invalid {
        code: "REQUEST_FAILED",
        message: format!("Request to '{url}' failed"),
    }))
}

pub fn join_url(base_url: &str, extend_url: &str) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(base_url)?;

    url.path_segments_mut()
        .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
        .pop_if_empty()
        .extend(extend_url.split('/').filter(|s| !s.is_empty()));

    Ok(url)
}

#[cfg(test)]
pub(crate) mod tests {
    use std::{collections::VecDeque, sync::Mutex};

    use tokio::time::Instant;

    use super::*;

    pub(crate) enum Step {
        Status(u16, &'static str),
        Fail,
    }

    /// Replays a fixed list of outcomes and records when and how it was called.
    pub(crate) struct ScriptedTransport {
        steps: Mutex<VecDeque<Step>>,
        pub(crate) calls: Mutex<Vec<(Instant, String, HeaderMap)>>,
    }

    impl ScriptedTransport {
        pub(crate) fn new(steps: Vec<Step>) -> Self {
            Self {
                steps: Mutex::new(steps.into()),
                calls: Mutex::new(vec![]),
            }
        }

        pub(crate) fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        fn gaps_ms(&self) -> Vec<u128> {
            let calls = self.calls.lock().unwrap();
            calls
                .windows(2)
                .map(|w| (w[1].0 - w[0].0).as_millis())
                .collect()
        }
    }

    #[async_trait]
    impl HttpTransport for ScriptedTransport {
        async fn get(&self, url: &Url, headers: &HeaderMap) -> DfResult<HttpResponse> {
            self.calls
                .lock()
                .unwrap()
                .push((Instant::now(), url.to_string(), headers.clone()));

            match self.steps.lock().unwrap().pop_front() {
                Some(Step::Status(code, body)) => Ok(HttpResponse::new(
                    StatusCode::from_u16(code).unwrap(),
                    body.as_bytes(),
                )),
                Some(Step::Fail) | None => Err(DfError::Invalid {
                    code: "CONNECTION_RESET",
                    message: "connection reset by peer".to_string(),
                }),
            }
        }
    }

    fn test_url() -> Url {
        Url::parse("https://query1.finance.yahoo.com/v7/finance/quote?symbols=SCHD").unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_rate_limited_then_success() {
        let transport = ScriptedTransport::new(vec![
            Step::Status(429, ""),
            Step::Status(429, ""),
            Step::Status(200, "{}"),
        ]);

        let response = request_with_retry(
            &transport,
            &test_url(),
            &HeaderMap::new(),
            &RetryOptions::default(),
        )
        .await
        .unwrap();

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(transport.call_count(), 3);
        assert_eq!(transport.gaps_ms(), vec![500, 1000]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_retry_on_client_error() {
        let transport = ScriptedTransport::new(vec![Step::Status(404, "not found")]);

        let response = request_with_retry(
            &transport,
            &test_url(),
            &HeaderMap::new(),
            &RetryOptions::default(),
        )
        .await
        .unwrap();

        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert!(!response.is_success());
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_retries_raise_last_error() {
        let transport = ScriptedTransport::new(vec![
            Step::Status(503, ""),
            Step::Status(500, ""),
            Step::Status(502, ""),
            Step::Status(503, ""),
        ]);

        let result = request_with_retry(
            &transport,
            &test_url(),
            &HeaderMap::new(),
            &RetryOptions::default(),
        )
        .await;

        match result {
            Err(DfError::HttpStatusError { status, .. }) => assert!(status.starts_with("503")),
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(transport.call_count(), 4);
        assert_eq!(transport.gaps_ms(), vec![500, 1000, 2000]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_failures_are_retried() {
        let transport =
            ScriptedTransport::new(vec![Step::Fail, Step::Fail, Step::Status(200, "{}")]);

        let response = request_with_retry(
            &transport,
            &test_url(),
            &HeaderMap::new(),
            &RetryOptions::default(),
        )
        .await
        .unwrap();

        assert!(response.is_success());
        assert_eq!(transport.call_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_failure_is_last_error() {
        let transport = ScriptedTransport::new(vec![Step::Status(429, ""), Step::Fail]);
        let options = RetryOptions {
            max_retries: 1,
            initial_backoff: Duration::from_millis(100),
        };

        let result = request_with_retry(&transport, &test_url(), &HeaderMap::new(), &options).await;

        assert!(matches!(
            result,
            Err(DfError::Invalid {
                code: "CONNECTION_RESET",
                ..
            })
        ));
        assert_eq!(transport.gaps_ms(), vec![100]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_retries_issues_single_request() {
        let transport = ScriptedTransport::new(vec![Step::Status(500, ""), Step::Status(200, "")]);
        let options = RetryOptions {
            max_retries: 0,
            initial_backoff: INITIAL_BACKOFF,
        };

        let result = request_with_retry(&transport, &test_url(), &HeaderMap::new(), &options).await;

        assert!(result.is_err());
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_caller_headers_override_defaults() {
        let transport = ScriptedTransport::new(vec![Step::Status(200, "{}")]);
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("divfeed-test"));

        request_with_retry(&transport, &test_url(), &headers, &RetryOptions::default())
            .await
            .unwrap();

        let calls = transport.calls.lock().unwrap();
        let sent = &calls[0].2;
        assert_eq!(sent.get_all(USER_AGENT).iter().count(), 1);
        assert_eq!(sent.get(USER_AGENT).unwrap(), "divfeed-test");
        assert_eq!(sent.get(ACCEPT).unwrap(), BROWSER_ACCEPT);
        assert_eq!(sent.get(CONNECTION).unwrap(), "keep-alive");
    }

    #[test]
    fn test_is_retryable_status() {
        assert!(is_retryable_status(StatusCode::TOO_MANY_REQUESTS));
        assert!(is_retryable_status(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(is_retryable_status(StatusCode::GATEWAY_TIMEOUT));
        assert!(!is_retryable_status(StatusCode::NOT_FOUND));
        assert!(!is_retryable_status(StatusCode::REQUEST_TIMEOUT));
        assert!(!is_retryable_status(StatusCode::OK));
    }

    #[test]
    fn test_response_json() {
        let response = HttpResponse::new(StatusCode::OK, r#"{"price":12.5}"#.as_bytes());
        let value: serde_json::Value = response.json().unwrap();
        assert_eq!(value["price"].as_f64(), Some(12.5));

        let broken = HttpResponse::new(StatusCode::OK, "<html>".as_bytes());
        assert!(broken.json::<serde_json::Value>().is_err());
    }

    #[test]
    fn test_join_url() {
        assert_eq!(
            join_url("https://query1.finance.yahoo.com/", "/v7/finance/quote")
                .unwrap()
                .as_str(),
            "https://query1.finance.yahoo.com/v7/finance/quote"
        );
        assert_eq!(
            join_url("http://127.0.0.1:8000", "v8/finance/chart")
                .unwrap()
                .as_str(),
            "http://127.0.0.1:8000/v8/finance/chart"
        );
    }
}
