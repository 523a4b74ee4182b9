//! Get Assets Use Case
//!
//! The Finam API returns its asset listing whole. This use case fetches it
//! once per call and applies an [`AssetQuery`] in memory.

use std::sync::Arc;

use crate::application::dto::AssetInfo;
use crate::application::ports::{ApiError, FinamApiPort};
use crate::domain::asset_search::AssetQuery;

/// Use case for filtered, paginated asset search.
pub struct GetAssetsUseCase<P>
where
    P: FinamApiPort + ?Sized,
{
    api: Arc<P>,
}

impl<P> GetAssetsUseCase<P>
where
    P: FinamApiPort + ?Sized,
{
    /// Create a new `GetAssetsUseCase`.
    pub const fn new(api: Arc<P>) -> Self {
        Self { api }
    }

    /// Fetch the listing and return the requested page.
    pub async fn execute(&self, query: &AssetQuery) -> Result<Vec<AssetInfo>, ApiError> {
        let listing = self.api.assets().await?;
        let total = listing.assets.len();

        let page = query.apply(listing.assets);

        tracing::debug!(
            total,
            returned = page.len(),
            limit = query.limit,
            offset = query.offset,
            "Asset search completed"
        );

        Ok(page)
    }
}
