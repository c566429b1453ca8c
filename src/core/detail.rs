//! Detail view reads: `about` and `address` for one candidate.

use crate::config::toml_config::TimingConfig;
use crate::core::extract::non_blank;
use crate::core::wait::wait_for;
use crate::domain::model::{PlaceDetails, PlaceRecord};
use crate::domain::ports::MapSurface;
use crate::utils::error::{HarvestError, Result};
use std::future::Future;
use std::sync::Arc;
use tokio::time::timeout;

/// Loads a candidate's detail view and reads its free-text fields.
pub struct DetailEnricher<M: MapSurface> {
    surface: Arc<M>,
    timing: TimingConfig,
}

impl<M: MapSurface> DetailEnricher<M> {
    pub fn new(surface: Arc<M>, timing: TimingConfig) -> Self {
        Self { surface, timing }
    }

    /// Navigates to the place's link and reads `about` and `address`.
    ///
    /// An error means the detail view never loaded and the candidate must be
    /// dropped. Missing fields are not errors; they come back empty.
    pub async fn enrich(&self, place: &PlaceRecord) -> Result<PlaceDetails> {
        let bound = self.timing.navigation_timeout();
        match timeout(bound, self.surface.open_place(&place.link)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e),
            Err(_) => {
                return Err(HarvestError::Timeout {
                    operation: format!("Opening {}", place.link),
                    after_ms: bound.as_millis() as u64,
                })
            }
        }

        let surface = self.surface.as_ref();
        let title = place.title.as_str();
        let about = self
            .read_field("about", title, move || async move {
                Ok::<_, HarvestError>(non_blank(surface.about_text(title).await?))
            })
            .await;
        let address = self
            .read_field("address", title, move || async move {
                Ok::<_, HarvestError>(non_blank(surface.address_text(title).await?))
            })
            .await;

        Ok(PlaceDetails { about, address })
    }

    async fn read_field<F, Fut>(&self, field: &str, title: &str, probe: F) -> String
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Option<String>>>,
    {
        match wait_for(self.timing.field_timeout(), self.timing.poll_interval(), probe).await {
            Ok(Some(text)) => text,
            Ok(None) => {
                tracing::debug!("No {} shown for {}", field, title);
                String::new()
            }
            Err(e) => {
                tracing::debug!("Reading {} for {} failed: {}", field, title, e);
                String::new()
            }
        }
    }
}
