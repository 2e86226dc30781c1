// src/services/location_service.rs
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info};

use crate::core::ServiceClient;
use crate::country::country_from_location;
use crate::types::reference::{Country, LocationInfo, LocationRecord};

#[derive(Default)]
struct CachedLocation {
    record: Option<LocationRecord>,
    fetched_user_id: Option<String>,
}

/// Latest IP-derived location of the user, used to pre-fill the country
pub struct LocationService {
    client: Arc<ServiceClient>,
    cache: RwLock<CachedLocation>,
}

impl LocationService {
    pub fn new(client: Arc<ServiceClient>) -> Self {
        Self {
            client,
            cache: RwLock::new(CachedLocation::default()),
        }
    }

    /// Only records that carry location info are kept; errors yield `None`
    pub async fn get_user_location(&self, user_id: Option<&str>) -> Option<LocationRecord> {
        let session = self.client.session();

        let user_id = match user_id {
            Some(id) if !id.is_empty() => Some(id.to_string()),
            _ => session.user_id().await.ok().flatten(),
        };
        let has_token = matches!(session.token().await, Ok(Some(_)));

        let Some(user_id) = user_id.filter(|_| has_token) else {
            error!("Cannot fetch location: missing user id or authentication token");
            return None;
        };

        {
            let cache = self.cache.read().await;
            if cache.fetched_user_id.as_deref() == Some(user_id.as_str()) && cache.record.is_some() {
                info!("Using cached location data for user {}", user_id);
                return cache.record.clone();
            }
        }

        match self.client.get_user_latest_location(&user_id).await {
            Ok(Some(record)) if record.location_info.is_some() => {
                info!("Location data successfully fetched for user {}", user_id);
                let mut cache = self.cache.write().await;
                cache.record = Some(record.clone());
                cache.fetched_user_id = Some(user_id);
                Some(record)
            }
            Ok(_) => {
                info!("No location data returned from IP endpoint");
                None
            }
            Err(e) => {
                error!("Error fetching user location: {}", e);
                None
            }
        }
    }

    pub async fn location_info(&self) -> Option<LocationInfo> {
        self.cache
            .read()
            .await
            .record
            .as_ref()
            .and_then(|record| record.location_info.clone())
    }

    pub async fn country_code(&self) -> Option<String> {
        self.location_info()
            .await
            .and_then(|info| info.country_code)
            .filter(|code| !code.is_empty())
    }

    pub async fn country_object(&self) -> Option<Country> {
        self.location_info()
            .await
            .as_ref()
            .and_then(country_from_location)
    }
}
