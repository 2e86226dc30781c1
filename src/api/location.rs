// src/api/location.rs
use tracing::info;

use crate::core::ServiceClient;
use crate::error::ApiError;
use crate::types::reference::{LocationInfo, LocationRecord};

const IP_ENDPOINT: &str = "/ip";

impl ServiceClient {
    pub async fn get_user_latest_location(
        &self,
        user_id: &str,
    ) -> Result<Option<LocationRecord>, ApiError> {
        info!("Fetching latest location for user: {}", user_id);
        self.get(&format!("{}/user/{}/latest", IP_ENDPOINT, user_id))
            .await
    }

    pub async fn get_user_location_history(
        &self,
        user_id: &str,
    ) -> Result<Vec<LocationRecord>, ApiError> {
        info!("Fetching location history for user: {}", user_id);
        let history: Option<Vec<LocationRecord>> = self
            .get(&format!("{}/user/{}/history", IP_ENDPOINT, user_id))
            .await?;
        Ok(history.unwrap_or_default())
    }

    pub async fn get_ip_location_info(&self, ip: &str) -> Result<Option<LocationInfo>, ApiError> {
        info!("Fetching location info for IP: {}", ip);
        self.get(&format!("{}/info/{}", IP_ENDPOINT, ip)).await
    }
}
