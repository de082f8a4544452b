use skiload_common::{LiftRide, Result, SkiLoadError};
use std::time::Duration;
use tracing::debug;

/// Connect and request timeouts used when none are configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// SkiLoad client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base address of the ski API, e.g. `http://localhost:8080` or
    /// `http://host:8080/SkiServer`. A trailing `/` is ignored.
    pub base_url: String,
    pub connect_timeout: Duration,
    /// Upper bound on a whole request, response body included.
    pub request_timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            connect_timeout: DEFAULT_TIMEOUT,
            request_timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Ski API client.
///
/// Every call resolves to the HTTP status code the server answered with. Only
/// transport failures (refused connection, timeout, broken body) are errors;
/// classifying a status as success or failure is left to the caller.
pub struct Client {
    pub config: ClientConfig,
    base_url: String,
    http_client: reqwest::Client,
}

impl Client {
    /// Create a new client with the given configuration
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| SkiLoadError::NetworkError(e.to_string()))?;
        let base_url = config.base_url.trim_end_matches('/').to_string();
        Ok(Self { config, base_url, http_client })
    }

    /// URL of the lift ride write endpoint.
    pub fn build_lift_rides_url(&self) -> String {
        format!("{}/skiers/liftrides", self.base_url)
    }

    /// URL of the per-day vertical read for one skier.
    pub fn build_day_vertical_url(&self, resort_id: &str, day_id: &str, skier_id: &str) -> String {
        format!(
            "{}/skiers/{}/days/{}/skiers/{}",
            self.base_url, resort_id, day_id, skier_id
        )
    }

    /// URL of the resort totals read for one skier (resort filters go in the query).
    pub fn build_resort_totals_url(&self, skier_id: &str) -> String {
        format!("{}/skiers/{}/vertical", self.base_url, skier_id)
    }

    /// Record a lift ride. The server answers `201` when the ride was stored.
    pub async fn write_ride(&self, ride: &LiftRide) -> Result<u16> {
        let request = self.http_client.post(self.build_lift_rides_url()).json(ride);
        self.send(request).await
    }

    /// Read the vertical a skier accumulated on one day. `200` or `204` on success.
    pub async fn read_day_vertical(
        &self,
        resort_id: &str,
        day_id: &str,
        skier_id: &str,
    ) -> Result<u16> {
        let url = self.build_day_vertical_url(resort_id, day_id, skier_id);
        self.send(self.http_client.get(url)).await
    }

    /// Read a skier's season totals for the given resorts. `200` or `204` on success.
    pub async fn read_resort_totals(&self, skier_id: &str, resort_ids: &[String]) -> Result<u16> {
        let query: Vec<(&str, &str)> = resort_ids.iter().map(|r| ("resort", r.as_str())).collect();
        let request = self
            .http_client
            .get(self.build_resort_totals_url(skier_id))
            .query(&query);
        self.send(request).await
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<u16> {
        let response = request
            .send()
            .await
            .map_err(|e| SkiLoadError::NetworkError(e.to_string()))?;

        let status = response.status().as_u16();

        // Drain the body so the connection can go back to the pool.
        response
            .bytes()
            .await
            .map_err(|e| SkiLoadError::NetworkError(e.to_string()))?;

        debug!(status, "ski api call completed");
        Ok(status)
    }
}
