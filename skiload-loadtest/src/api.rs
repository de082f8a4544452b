use async_trait::async_trait;
use skiload_client::Client;
use skiload_common::{LiftRide, Result};

/// The calls a load worker makes. Each resolves to the HTTP status the server
/// answered with, or an error when no answer arrived.
#[async_trait]
pub trait SkiApi: Send + Sync {
    fn name(&self) -> &'static str;

    async fn write_ride(&self, ride: &LiftRide) -> Result<u16>;

    async fn read_day_vertical(&self, resort_id: &str, day_id: &str, skier_id: &str) -> Result<u16>;

    async fn read_resort_totals(&self, skier_id: &str, resort_ids: &[String]) -> Result<u16>;
}

#[async_trait]
impl SkiApi for Client {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn write_ride(&self, ride: &LiftRide) -> Result<u16> {
        Client::write_ride(self, ride).await
    }

    async fn read_day_vertical(&self, resort_id: &str, day_id: &str, skier_id: &str) -> Result<u16> {
        Client::read_day_vertical(self, resort_id, day_id, skier_id).await
    }

    async fn read_resort_totals(&self, skier_id: &str, resort_ids: &[String]) -> Result<u16> {
        Client::read_resort_totals(self, skier_id, resort_ids).await
    }
}
