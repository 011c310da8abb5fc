//! OpenSky Network client implementation.

use std::time::Duration;

use async_trait::async_trait;
use skyhop_core::{Flight, GatewayError};
use tracing::{debug, info};

use crate::gateway::{check_range, FlightGateway};
use crate::records::decode_departures;

/// Default OpenSky REST base URL.
pub const DEFAULT_BASE_URL: &str = "https://opensky-network.org/api";
const CONNECT_TIMEOUT_SECS: u64 = 10;
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Connection settings for [`OpenSkyClient`].
#[derive(Debug, Clone)]
pub struct OpenSkyConfig {
    /// Base URL of the REST API, without a trailing slash.
    pub base_url: String,

    /// Account name for basic auth.
    pub username: Option<String>,

    /// Account password for basic auth.
    pub password: Option<String>,

    /// Whole-request timeout.
    pub timeout: Duration,
}

impl Default for OpenSkyConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            username: None,
            password: None,
            timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
        }
    }
}

/// Client for the OpenSky departures endpoint.
#[derive(Clone)]
pub struct OpenSkyClient {
    /// Base URL of the API.
    base_url: String,

    /// Basic auth pair, sent only when both halves are present.
    credentials: Option<(String, String)>,

    /// HTTP client.
    http_client: reqwest::Client,
}

impl OpenSkyClient {
    /// Build a client from its configuration.
    pub fn new(config: OpenSkyConfig) -> Result<Self, GatewayError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .user_agent(concat!("skyhop/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GatewayError::transport(e.to_string()))?;

        let credentials = match (config.username, config.password) {
            (Some(user), Some(pass)) if !user.is_empty() && !pass.is_empty() => Some((user, pass)),
            _ => None,
        };

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            credentials,
            http_client,
        })
    }

    /// Returns true if requests are authenticated.
    pub fn is_authenticated(&self) -> bool {
        self.credentials.is_some()
    }

    fn departures_url(&self) -> String {
        format!("{}/flights/departure", self.base_url)
    }
}

fn transport_error(err: reqwest::Error) -> GatewayError {
    GatewayError::Transport {
        timed_out: err.is_timeout(),
        message: err.to_string(),
    }
}

#[async_trait]
impl FlightGateway for OpenSkyClient {
    async fn fetch_departures(
        &self,
        airport: &str,
        begin_utc: i64,
        end_utc: i64,
    ) -> Result<Vec<Flight>, GatewayError> {
        check_range(begin_utc, end_utc)?;

        let url = self.departures_url();
        debug!("GET {} airport={} begin={} end={}", url, airport, begin_utc, end_utc);

        let mut request = self.http_client.get(&url).query(&[
            ("airport", airport.to_string()),
            ("begin", begin_utc.to_string()),
            ("end", end_utc.to_string()),
        ]);
        if let Some((user, pass)) = &self.credentials {
            request = request.basic_auth(user, Some(pass));
        }

        let response = request.send().await.map_err(transport_error)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(transport_error)?;

        let flights = decode_departures(status, &body)?;
        info!(
            "Fetched {} departures from {} (HTTP {})",
            flights.len(),
            airport,
            status
        );
        Ok(flights)
    }
}
