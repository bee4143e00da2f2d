use async_trait::async_trait;
use reqwest::Url;
use tracing::{debug, instrument};

use crate::config::ApiConfig;
use crate::error::QueryError;
use crate::fetch::auth::{UrlParam, with_app_credentials};
use crate::fetch::{BasicClient, HttpClient, get};
use crate::models::{LiveResponse, StopCode};
use crate::services::live_departures::LiveDepartures;

/// Live departures from TransportAPI, authenticated with `app_id`/`app_key`
/// query parameters.
pub struct TransportApiClient<C> {
    base_url: Url,
    http: C,
}

impl TransportApiClient<UrlParam<UrlParam<BasicClient>>> {
    /// Builds a client over a fresh [`BasicClient`] carrying `config`'s credentials.
    pub fn new(config: &ApiConfig) -> anyhow::Result<Self> {
        let http = with_app_credentials(BasicClient::new()?, &config.credentials);
        Ok(Self::with_client(config.base_url.clone(), http))
    }
}

impl<C: HttpClient> TransportApiClient<C> {
    /// Uses `http` as is; it is responsible for any authentication.
    pub fn with_client(base_url: Url, http: C) -> Self {
        Self { base_url, http }
    }

    fn live_url(&self, stop: &StopCode) -> Result<Url, QueryError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| QueryError::Transport(format!("unusable base URL {}", self.base_url)))?
            .pop_if_empty()
            .extend(["uk", "bus", "stop", stop.as_str(), "live.json"]);
        Ok(url)
    }
}

/// Decodes a live departures body. JSON is tried whatever the status, since
/// error payloads arrive with 4xx codes.
fn decode_live(status: reqwest::StatusCode, body: &str) -> Result<LiveResponse, QueryError> {
    match serde_json::from_str::<LiveResponse>(body) {
        Ok(resp) => Ok(resp),
        Err(_) if !status.is_success() => Err(QueryError::Transport(format!("HTTP {status}"))),
        Err(e) => Err(QueryError::MalformedResponse(format!("invalid JSON ({e}): {body}"))),
    }
}

#[async_trait]
impl<C: HttpClient> LiveDepartures for TransportApiClient<C> {
    #[instrument(skip(self), fields(stop = %stop))]
    async fn live_departures(&self, stop: &StopCode) -> Result<LiveResponse, QueryError> {
        let url = self.live_url(stop)?;
        debug!(path = url.path(), "Requesting live departures");

        let response = get(&self.http, url)
            .await
            .map_err(|e| QueryError::Transport(format!("{e:#}")))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| QueryError::Transport(e.to_string()))?;

        debug!(%status, bytes = body.len(), "Live departures received");
        decode_live(status, &body)
    }
}
