//! Steam Web API client over `reqwest`.

use reqwest::StatusCode;
use url::Url;

use super::payload::Payload;
use super::{
    BadgesPayload, Endpoint, FetchOutcome, GamesPayload, LevelPayload, RateLimitGate, SteamApi,
    SummaryPayload,
};
use crate::config::{ApiConfig, Config, RetryConfig};
use crate::error::{Error, Result};
use crate::retry::retry_with_backoff;
use crate::steam_id::SteamId64;

/// Production [`SteamApi`] implementation
///
/// One attempt runs through these states:
/// - 2xx: decode the body (an undecodable body counts as a transport error)
/// - 429: trip the shared [`RateLimitGate`] and report [`FetchOutcome::RateLimited`]
/// - timeout, connect failure, other status: retry per [`RetryConfig`], then
///   [`Error::FetchFailed`]
pub struct SteamWebClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: String,
    retry: RetryConfig,
    gate: RateLimitGate,
}

impl SteamWebClient {
    /// Create a client from API and retry settings
    ///
    /// # Errors
    /// Returns [`Error::Config`] if the base URL does not parse, or
    /// [`Error::Network`] if the HTTP client cannot be built.
    pub fn new(api: &ApiConfig, retry: RetryConfig, gate: RateLimitGate) -> Result<Self> {
        let base_url = Url::parse(&api.base_url)
            .map_err(|e| Error::config("api_base_url", format!("{}: {e}", api.base_url)))?;

        let http = reqwest::Client::builder()
            .timeout(api.request_timeout)
            .user_agent(concat!("steam-sweep/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url,
            api_key: api.api_key.clone(),
            retry,
            gate,
        })
    }

    /// Create a client from a full configuration, with a gate sized from it
    pub fn from_config(config: &Config) -> Result<Self> {
        let gate = RateLimitGate::new(config.api.rate_limit_cooldown);
        Self::new(&config.api, config.retry.clone(), gate)
    }

    /// The rate-limit gate this client honours
    pub fn gate(&self) -> &RateLimitGate {
        &self.gate
    }

    fn endpoint_url(&self, endpoint: Endpoint) -> Result<Url> {
        self.base_url
            .join(endpoint.path())
            .map_err(|e| Error::config("api_base_url", format!("cannot join {endpoint}: {e}")))
    }

    /// Run one endpoint with bounded retry
    async fn fetch<P: Payload>(&self, id: SteamId64) -> Result<FetchOutcome<P>> {
        let endpoint = P::ENDPOINT;
        let url = self.endpoint_url(endpoint)?;
        let url = &url;

        match retry_with_backoff(&self.retry, move || self.attempt::<P>(url, id)).await {
            Ok(outcome) => Ok(outcome),
            Err(failure) if failure.exhausted() => {
                tracing::warn!(
                    %endpoint,
                    steam_id64 = %id,
                    attempts = failure.attempts,
                    error = %failure.error,
                    "Giving up on request"
                );
                Err(Error::FetchFailed {
                    endpoint,
                    attempts: failure.attempts,
                    reason: failure.error.to_string(),
                })
            }
            Err(failure) => Err(failure.error),
        }
    }

    /// A single request/response cycle
    async fn attempt<P: Payload>(&self, url: &Url, id: SteamId64) -> Result<FetchOutcome<P>> {
        let endpoint = P::ENDPOINT;
        self.gate.wait_ready().await;

        let id_value = id.to_string();
        tracing::debug!(%endpoint, steam_id64 = %id, "Issuing request");
        let response = self
            .http
            .get(url.clone())
            .query(&[
                ("key", self.api_key.as_str()),
                (endpoint.id_param(), id_value.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            self.gate.trip();
            return Ok(FetchOutcome::RateLimited);
        }
        if !status.is_success() {
            return Err(Error::HttpStatus {
                endpoint,
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        Ok(match P::decode(&body)? {
            Some(payload) => FetchOutcome::Payload(payload),
            None => FetchOutcome::AccountAbsent,
        })
    }
}

#[async_trait::async_trait]
impl SteamApi for SteamWebClient {
    async fn summary(&self, id: SteamId64) -> Result<FetchOutcome<SummaryPayload>> {
        self.fetch(id).await
    }

    async fn level(&self, id: SteamId64) -> Result<FetchOutcome<LevelPayload>> {
        self.fetch(id).await
    }

    async fn games(&self, id: SteamId64) -> Result<FetchOutcome<GamesPayload>> {
        self.fetch(id).await
    }

    async fn badges(&self, id: SteamId64) -> Result<FetchOutcome<BadgesPayload>> {
        self.fetch(id).await
    }
}
