use crate::config::toml_config::{HarvestConfig, MissingGalleryPolicy, RunConfig};
use crate::core::detail::DetailEnricher;
use crate::core::gallery::{GalleryHarvester, GalleryOutcome};
use crate::core::list_collector::ListCollector;
use crate::core::regions::{narrow, pending_regions};
use crate::core::store::ResultStore;
use crate::domain::model::{CommitReport, PlaceRecord};
use crate::domain::ports::{MapSurface, RegionCatalog, RegionPipeline, Storage};
use crate::utils::error::Result;
use crate::utils::progress::{percent_done, render_bar};
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

/// Regions still to harvest, shuffled, then narrowed by the run limits.
///
/// Needs no browser, so a dry run can call it directly.
pub async fn plan_regions<S: Storage, C: RegionCatalog>(
    catalog: &C,
    store: &ResultStore<S>,
    run: &RunConfig,
) -> Result<Vec<String>> {
    let all = catalog.region_labels().await?;
    let log = store.load_region_log().await?;
    let known = all.len();

    let mut rng = StdRng::from_entropy();
    let pending = pending_regions(all, &log, &mut rng);
    tracing::debug!(
        "{} regions known, {} already harvested, {} pending",
        known,
        log.len(),
        pending.len()
    );

    Ok(narrow(pending, run.region_filter.as_deref(), run.max_regions))
}

/// The gather / enrich / commit phases over one browser session.
pub struct HarvestPipeline<M: MapSurface, S: Storage, C: RegionCatalog> {
    collector: ListCollector<M>,
    enricher: DetailEnricher<M>,
    gallery: GalleryHarvester<M>,
    store: ResultStore<S>,
    catalog: C,
    config: HarvestConfig,
}

impl<M: MapSurface, S: Storage, C: RegionCatalog> HarvestPipeline<M, S, C> {
    pub fn new(surface: Arc<M>, storage: S, catalog: C, config: HarvestConfig) -> Self {
        Self {
            collector: ListCollector::new(
                surface.clone(),
                config.locale.clone(),
                config.timing.clone(),
            ),
            enricher: DetailEnricher::new(surface.clone(), config.timing.clone()),
            gallery: GalleryHarvester::new(surface, config.gallery.clone(), config.timing.clone()),
            store: ResultStore::new(storage, config.places_path(), config.region_log_path()),
            catalog,
            config,
        }
    }

    /// Details then photos for one candidate; `None` drops it from the batch.
    async fn enrich_candidate(&self, candidate: PlaceRecord) -> Option<PlaceRecord> {
        let details = match self.enricher.enrich(&candidate).await {
            Ok(details) => details,
            Err(e) => {
                tracing::warn!("Skipping {}: {}", candidate.title, e);
                return None;
            }
        };
        let place = candidate.with_details(details);

        match self.gallery.harvest(&place).await {
            GalleryOutcome::Harvested { images, aborted } => {
                if aborted {
                    tracing::debug!("Keeping {} photos of {}", images.len(), place.title);
                }
                Some(place.with_images(images))
            }
            GalleryOutcome::NoEntryPoint => match self.config.gallery.missing_gallery {
                MissingGalleryPolicy::AcceptEmpty => Some(place),
                MissingGalleryPolicy::Skip => {
                    tracing::debug!("Skipping {}: no gallery", place.title);
                    None
                }
            },
            GalleryOutcome::Unavailable => {
                tracing::debug!("Skipping {}: gallery did not render", place.title);
                None
            }
        }
    }
}

#[async_trait]
impl<M: MapSurface, S: Storage, C: RegionCatalog> RegionPipeline for HarvestPipeline<M, S, C> {
    async fn pending_regions(&self) -> Result<Vec<String>> {
        plan_regions(&self.catalog, &self.store, &self.config.run).await
    }

    async fn gather(&self, region: &str) -> Result<Vec<PlaceRecord>> {
        let outcome = self.collector.collect(region).await?;
        if outcome.results_found {
            tracing::info!(
                "{} listings after {} scrolls, {} admitted, {} filtered out",
                outcome.listings_seen,
                outcome.scroll_rounds,
                outcome.candidates.len(),
                outcome.skipped_total()
            );
        }
        Ok(outcome.candidates)
    }

    async fn enrich(&self, region: &str, candidates: Vec<PlaceRecord>) -> Result<Vec<PlaceRecord>> {
        let total = candidates.len();
        let mut batch = Vec::with_capacity(total);

        for (index, candidate) in candidates.into_iter().enumerate() {
            tracing::info!("Progress: {}", render_bar(percent_done(index, total)));
            if let Some(place) = self.enrich_candidate(candidate).await {
                batch.push(place);
            }
        }

        tracing::debug!("{}: {} of {} candidates enriched", region, batch.len(), total);
        Ok(batch)
    }

    async fn commit(&self, region: &str, batch: Vec<PlaceRecord>) -> Result<CommitReport> {
        let places = batch.len();
        let images = batch.iter().map(|place| place.images.len()).sum();

        let store_size = self.store.merge_and_persist(batch).await?;
        self.store.append_region_log(region).await?;

        Ok(CommitReport {
            region: region.to_string(),
            places,
            images,
            store_size,
        })
    }
}
