//! Search-result harvesting: search, scroll the feed to its end, and turn
//! each listing into a provisional record.

use crate::config::toml_config::{LocaleConfig, TimingConfig};
use crate::core::extract::{non_blank, parse_rating, parse_reviewer_count};
use crate::core::wait::wait_until;
use crate::domain::model::PlaceRecord;
use crate::domain::ports::{ListingSnapshot, MapSurface};
use crate::utils::error::{HarvestError, Result};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::time::sleep;

/// Why a listing was not admitted as a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SkipReason {
    MissingAnchor,
    MissingRating,
    MissingReviewers,
    NoThumbnail,
    UnreadableRating,
    UnreadableReviewers,
    TooFewReviewers,
}

/// Admission filters, applied in order. The first failing filter decides.
pub fn admit(snapshot: &ListingSnapshot, region: &str) -> std::result::Result<PlaceRecord, SkipReason> {
    let link = non_blank(snapshot.link.clone()).ok_or(SkipReason::MissingAnchor)?;
    let rating_text = snapshot
        .rating_text
        .as_deref()
        .ok_or(SkipReason::MissingRating)?;
    let reviewer_text = snapshot
        .reviewer_text
        .as_deref()
        .ok_or(SkipReason::MissingReviewers)?;
    if snapshot.has_placeholder_thumbnail {
        return Err(SkipReason::NoThumbnail);
    }

    let rating = parse_rating(rating_text).ok_or(SkipReason::UnreadableRating)?;
    let reviewers = parse_reviewer_count(reviewer_text).ok_or(SkipReason::UnreadableReviewers)?;
    let title = non_blank(snapshot.title.clone()).unwrap_or_default();

    PlaceRecord::candidate(title, link, rating, reviewers, region).ok_or(SkipReason::TooFewReviewers)
}

/// Result of one region's list pass.
#[derive(Debug, Clone, Default)]
pub struct CollectOutcome {
    pub candidates: Vec<PlaceRecord>,
    pub skipped: BTreeMap<SkipReason, usize>,
    pub listings_seen: usize,
    pub scroll_rounds: usize,
    pub results_found: bool,
}

impl CollectOutcome {
    pub fn skipped_total(&self) -> usize {
        self.skipped.values().sum()
    }
}

pub struct ListCollector<M: MapSurface> {
    surface: Arc<M>,
    locale: LocaleConfig,
    timing: TimingConfig,
}

impl<M: MapSurface> ListCollector<M> {
    pub fn new(surface: Arc<M>, locale: LocaleConfig, timing: TimingConfig) -> Self {
        Self {
            surface,
            locale,
            timing,
        }
    }

    /// Runs search, scroll and extraction for `region`.
    ///
    /// Only an unreachable search surface is an error. A result container
    /// that never shows up yields an empty outcome.
    pub async fn collect(&self, region: &str) -> Result<CollectOutcome> {
        let query = self.locale.search_query(region);
        let mut outcome = CollectOutcome::default();

        self.search(&query).await?;

        let surface = self.surface.as_ref();
        let query_ref = query.as_str();
        let ready = wait_until(self.timing.search_timeout(), self.timing.poll_interval(), move || {
            surface.results_ready(query_ref)
        })
        .await
        .unwrap_or_else(|e| {
            tracing::warn!("Result list check failed for '{}': {}", query, e);
            false
        });
        if !ready {
            tracing::warn!("No result list appeared for '{}'", query);
            return Ok(outcome);
        }
        outcome.results_found = true;

        outcome.scroll_rounds = self.scroll_to_end(&query).await;

        let listings = match surface.result_items(&query).await {
            Ok(listings) => listings,
            Err(e) => {
                tracing::warn!("Could not read result list for '{}': {}", query, e);
                return Ok(outcome);
            }
        };
        outcome.listings_seen = listings.len();

        for snapshot in &listings {
            match admit(snapshot, region) {
                Ok(candidate) => outcome.candidates.push(candidate),
                Err(reason) => *outcome.skipped.entry(reason).or_default() += 1,
            }
        }

        tracing::debug!(
            "'{}': {} listings, {} candidates, skipped {:?}",
            query,
            outcome.listings_seen,
            outcome.candidates.len(),
            outcome.skipped
        );
        Ok(outcome)
    }

    async fn search(&self, query: &str) -> Result<()> {
        self.surface
            .open_home()
            .await
            .map_err(|e| HarvestError::SurfaceUnavailable {
                message: format!("start page failed to load: {}", e),
            })?;
        self.surface
            .submit_search(query)
            .await
            .map_err(|e| HarvestError::SurfaceUnavailable {
                message: format!("search box unusable: {}", e),
            })
    }

    /// Scrolls until the content height stops changing, or the round cap is
    /// hit. Returns the number of rounds taken.
    async fn scroll_to_end(&self, query: &str) -> usize {
        let max_rounds = self.timing.max_scroll_rounds;
        let mut previous_height = None;

        for round in 1..=max_rounds {
            let height = match self.surface.scroll_results(query).await {
                Ok(height) => height,
                Err(e) => {
                    tracing::warn!("Scrolling stopped for '{}': {}", query, e);
                    return round;
                }
            };
            sleep(self.timing.scroll_settle()).await;

            if previous_height == Some(height) {
                return round;
            }
            previous_height = Some(height);
        }

        tracing::warn!(
            "Result list for '{}' still growing after {} scrolls, extracting what loaded",
            query,
            max_rounds
        );
        max_rounds
    }
}
