use crate::domain::model::CommitReport;
use crate::domain::ports::RegionPipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;
use chrono::{DateTime, Local, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct HarvestSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub regions_pending: usize,
    pub regions_processed: usize,
    pub places_committed: usize,
    pub images_committed: usize,
    pub store_size: usize,
}

impl HarvestSummary {
    fn new(regions_pending: usize) -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            regions_pending,
            regions_processed: 0,
            places_committed: 0,
            images_committed: 0,
            store_size: 0,
        }
    }

    fn record(&mut self, report: &CommitReport) {
        self.regions_processed += 1;
        self.places_committed += report.places;
        self.images_committed += report.images;
        self.store_size = report.store_size;
    }
}

/// Drives a [`RegionPipeline`] over every pending region, one at a time.
///
/// Each region is gathered completely before any candidate is enriched, and
/// committed only after its whole batch is enriched.
pub struct HarvestEngine<P: RegionPipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: RegionPipeline> HarvestEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(false),
        }
    }

    pub fn new_with_monitoring(pipeline: P, enable_monitoring: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(enable_monitoring),
        }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    pub async fn run(&self) -> Result<HarvestSummary> {
        let regions = self.pipeline.pending_regions().await?;
        tracing::info!("Harvesting {} regions...", regions.len());

        let mut summary = HarvestSummary::new(regions.len());
        for region in &regions {
            let report = self.run_region(region).await?;
            summary.record(&report);
            self.monitor.log_stats(region);
        }

        summary.finished_at = Some(Utc::now());
        self.monitor.log_final_stats();
        Ok(summary)
    }

    /// Gather, enrich and commit a single region.
    pub async fn run_region(&self, region: &str) -> Result<CommitReport> {
        tracing::info!(
            "[{}] Scraping data for: {}",
            Local::now().format("%H:%M:%S"),
            region
        );

        let candidates = self.pipeline.gather(region).await?;
        tracing::info!("Populating details and images for {} candidates...", candidates.len());

        let batch = self.pipeline.enrich(region, candidates).await?;
        let report = self.pipeline.commit(region, batch).await?;

        tracing::info!(
            "✅ {}: {} places ({} photos) committed, store now holds {}",
            region,
            report.places,
            report.images,
            report.store_size
        );
        Ok(report)
    }
}
