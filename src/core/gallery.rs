//! Photo gallery traversal.
//!
//! For one place: open the gallery, drop video tiles, then visit photo tiles
//! in order until `max_photos` have been accepted or the tiles run out. A
//! photo is accepted only with a full-size URL and a named uploader.

use crate::config::toml_config::{GalleryConfig, TimingConfig};
use crate::core::extract::{canonical_photo_url, non_blank, strip_css_url};
use crate::core::wait::{wait_for, wait_until};
use crate::domain::model::{Author, ImageRecord, PlaceRecord};
use crate::domain::ports::{BylineKind, MapSurface, RawByline};
use crate::utils::error::Result;
use std::sync::Arc;
use tokio::time::sleep;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GalleryOutcome {
    /// The detail view has no gallery button.
    NoEntryPoint,
    /// The gallery panel never rendered within its bound.
    Unavailable,
    /// Photos accepted before the tiles ran out, the cap was reached, or an
    /// unexpected failure stopped the traversal (`aborted`).
    Harvested {
        images: Vec<ImageRecord>,
        aborted: bool,
    },
}

impl GalleryOutcome {
    fn aborted_empty() -> Self {
        Self::Harvested {
            images: Vec::new(),
            aborted: true,
        }
    }
}

pub struct GalleryHarvester<M: MapSurface> {
    surface: Arc<M>,
    gallery: GalleryConfig,
    timing: TimingConfig,
}

impl<M: MapSurface> GalleryHarvester<M> {
    pub fn new(surface: Arc<M>, gallery: GalleryConfig, timing: TimingConfig) -> Self {
        Self {
            surface,
            gallery,
            timing,
        }
    }

    /// Harvests photos for `place`, whose detail view must already be open.
    /// Never fails: every problem is folded into the outcome.
    pub async fn harvest(&self, place: &PlaceRecord) -> GalleryOutcome {
        let surface = self.surface.as_ref();
        let title = place.title.as_str();
        let poll = self.timing.poll_interval();
        let bound = self.timing.gallery_timeout();

        let has_entry = wait_until(bound, poll, move || surface.gallery_entry_present(title))
            .await
            .unwrap_or(false);
        if !has_entry {
            tracing::debug!("No gallery button for {}", title);
            return GalleryOutcome::NoEntryPoint;
        }

        if let Err(e) = surface.open_gallery(title).await {
            tracing::warn!("Could not open gallery for {}: {}", title, e);
            return GalleryOutcome::aborted_empty();
        }
        let ready = wait_until(bound, poll, move || surface.gallery_ready(title))
            .await
            .unwrap_or(false);
        if !ready {
            tracing::debug!("Gallery for {} never rendered", title);
            return GalleryOutcome::Unavailable;
        }

        let photo_tiles: Vec<usize> = match surface.gallery_items(title).await {
            Ok(items) => items
                .into_iter()
                .filter(|item| !item.is_video)
                .map(|item| item.index)
                .collect(),
            Err(e) => {
                tracing::warn!("Could not list gallery tiles for {}: {}", title, e);
                return GalleryOutcome::aborted_empty();
            }
        };

        let mut images = Vec::new();
        let mut aborted = false;
        for index in photo_tiles {
            if images.len() >= self.gallery.max_photos {
                break;
            }
            match self.photo_at(title, index).await {
                Ok(Some(image)) => images.push(image),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(
                        "Gallery for {} stopped at tile {} with {} photos: {}",
                        title,
                        index,
                        images.len(),
                        e
                    );
                    aborted = true;
                    break;
                }
            }
        }

        GalleryOutcome::Harvested { images, aborted }
    }

    /// Visits one tile. `Ok(None)` discards the tile; `Err` aborts the gallery.
    async fn photo_at(&self, title: &str, index: usize) -> Result<Option<ImageRecord>> {
        let surface = self.surface.as_ref();

        surface.select_gallery_item(title, index).await?;
        sleep(self.timing.item_settle()).await;

        let style = wait_for(
            self.timing.image_loaded_timeout(),
            self.timing.poll_interval(),
            move || surface.loaded_image_style(title, index),
        )
        .await?;
        let Some(style) = style else {
            tracing::debug!("Tile {} of {} never loaded", index, title);
            return Ok(None);
        };

        let raw_url = strip_css_url(&style);
        let Some(url) = canonical_photo_url(
            &raw_url,
            &self.gallery.required_marker,
            &self.gallery.canonical_size,
        ) else {
            tracing::debug!("Tile {} of {} is not a full-size photo: {}", index, title, raw_url);
            return Ok(None);
        };

        let Some((kind, byline)) = self.resolve_attribution().await else {
            tracing::debug!("No uploader byline for tile {} of {}", index, title);
            return Ok(None);
        };
        tracing::trace!("Tile {} of {} attributed via {:?}", index, title, kind);

        Ok(ImageRecord::accepted(url, author_from(byline)))
    }

    /// Probes both byline layouts concurrently under one shared bound.
    ///
    /// The first layout to render wins. When both are already present at the
    /// same poll, the place-owner byline takes priority.
    async fn resolve_attribution(&self) -> Option<(BylineKind, RawByline)> {
        let surface = self.surface.as_ref();
        let bound = self.timing.attribution_timeout();
        let poll = self.timing.poll_interval();

        let owner = wait_for(bound, poll, move || surface.byline(BylineKind::PlaceOwner));
        let contributor = wait_for(bound, poll, move || surface.byline(BylineKind::Contributor));

        tokio::select! {
            biased;
            Ok(Some(byline)) = owner => Some((BylineKind::PlaceOwner, byline)),
            Ok(Some(byline)) = contributor => Some((BylineKind::Contributor, byline)),
            else => None,
        }
    }
}

fn author_from(byline: RawByline) -> Author {
    let avatar_url = non_blank(byline.avatar_style)
        .map(|style| strip_css_url(&style))
        .filter(|url| !url.is_empty() && url != "none")
        .unwrap_or_default();

    Author {
        name: non_blank(byline.name).unwrap_or_default(),
        profile_link: non_blank(byline.profile_link).unwrap_or_default(),
        avatar_url,
    }
}
