//! HTTP client whose every request goes through the [`Dispatcher`].
//!
//! A `429 Too Many Requests` response becomes [`Attempt::RetryAfter`], so
//! throttling is absorbed by the dispatcher's re-admission loop. Any other
//! non-success status is a [`Error::Provider`].

use std::time::Duration;

use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::application::dispatcher::{Attempt, Dispatcher};
use crate::domain::{RequestId, ServiceName};
use crate::error::{Error, Result};

/// Delay used when a 429 response carries no usable retry hint.
const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(1);

/// Longest delay honored from a provider hint; larger hints are clamped.
const MAX_RETRY_AFTER: Duration = Duration::from_secs(15 * 60);

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Rate-limited JSON client for provider REST and GraphQL endpoints.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    dispatcher: Dispatcher,
}

impl HttpClient {
    /// Build a client with a default request timeout.
    ///
    /// # Errors
    ///
    /// Fails if the TLS backend cannot be initialized.
    pub fn new(dispatcher: Dispatcher) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self::with_client(client, dispatcher))
    }

    #[must_use]
    pub fn with_client(client: Client, dispatcher: Dispatcher) -> Self {
        Self { client, dispatcher }
    }

    /// GET `url` under `service`'s rate rule and decode the JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownService`](crate::error::ConfigError) for
    /// an unconfigured service, [`Error::Http`] on transport failure,
    /// [`Error::Provider`] on a non-success status, or [`Error::Http`] if the
    /// body is not the expected JSON.
    pub async fn get_json<T: DeserializeOwned>(&self, service: &ServiceName, url: &Url) -> Result<T> {
        self.send(service, || self.client.get(url.clone())).await
    }

    /// POST a JSON body (e.g. a GraphQL query) and decode the JSON response.
    ///
    /// # Errors
    ///
    /// See [`get_json`](Self::get_json).
    pub async fn post_json<B, T>(&self, service: &ServiceName, url: &Url, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        self.send(service, || self.client.post(url.clone()).json(body))
            .await
    }

    async fn send<T, F>(&self, service: &ServiceName, build: F) -> Result<T>
    where
        T: DeserializeOwned,
        F: Fn() -> RequestBuilder,
    {
        let id = RequestId::new();
        debug!(service = %service, request_id = %id, "Dispatching HTTP request");

        self.dispatcher
            .submit(service, id, || {
                let request = build();
                let service = service.clone();
                async move {
                    let response = request.send().await?;
                    let status = response.status();

                    if status == StatusCode::TOO_MANY_REQUESTS {
                        let headers = response.headers().clone();
                        let body = response.text().await.unwrap_or_default();
                        return Ok(Attempt::RetryAfter(retry_after(&headers, &body)));
                    }
                    if !status.is_success() {
                        let body = response.text().await.unwrap_or_default();
                        return Err(Error::Provider(format!(
                            "{service} returned {status}: {}",
                            truncate(&body, 200)
                        )));
                    }

                    Ok(Attempt::Done(response.json::<T>().await?))
                }
            })
            .await
    }
}

/// Extract the provider's retry hint from a 429 response.
///
/// Prefers the `Retry-After` header (seconds, fractions allowed), then a
/// JSON body of the form `{"parameters": {"retry_after": <seconds>}}`.
/// Hints longer than [`MAX_RETRY_AFTER`] are clamped to it.
pub(crate) fn retry_after(headers: &HeaderMap, body: &str) -> Duration {
    let from_header = headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<f64>().ok());

    let from_body = || {
        serde_json::from_str::<serde_json::Value>(body)
            .ok()?
            .pointer("/parameters/retry_after")?
            .as_f64()
    };

    from_header
        .or_else(from_body)
        .filter(|secs| secs.is_finite() && *secs >= 0.0)
        .map_or(DEFAULT_RETRY_AFTER, |secs| {
            Duration::try_from_secs_f64(secs)
                .map_or(MAX_RETRY_AFTER, |delay| delay.min(MAX_RETRY_AFTER))
        })
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
