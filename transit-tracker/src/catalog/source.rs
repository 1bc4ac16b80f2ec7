//! Where the station catalog comes from.

use std::future::Future;

use crate::api::{ApiClient, ApiError};
use crate::domain::Station;

/// Trait for providing the full station listing.
///
/// This abstraction allows the catalog to be tested without the network.
pub trait CatalogSource: Send + Sync + 'static {
    /// Fetch every known station for the configured city.
    fn fetch_stations(&self) -> impl Future<Output = Result<Vec<Station>, ApiError>> + Send;
}

impl CatalogSource for ApiClient {
    async fn fetch_stations(&self) -> Result<Vec<Station>, ApiError> {
        self.fetch_all_stations().await
    }
}
