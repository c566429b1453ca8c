#![allow(dead_code)]

use async_trait::async_trait;
use places_harvest::config::toml_config::TimingConfig;
use places_harvest::domain::ports::{
    BylineKind, GalleryItem, ListingSnapshot, MapSurface, RawByline, RegionCatalog,
};
use places_harvest::{HarvestConfig, HarvestError, Result};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

pub const PHOTO_URL: &str = "https://lh5.googleusercontent.com/p/AF1QipN=w203-h152-k-no";
pub const FULL_PHOTO_URL: &str = "https://lh5.googleusercontent.com/p/AF1QipN=s1080-k-no";

/// Millisecond-scale bounds so unhappy paths finish quickly.
pub fn fast_timing() -> TimingConfig {
    TimingConfig {
        search_timeout: 50,
        scroll_settle: 1,
        max_scroll_rounds: 10,
        navigation_timeout: 50,
        field_timeout: 10,
        gallery_timeout: 20,
        item_settle: 1,
        image_loaded_timeout: 10,
        attribution_timeout: 20,
        poll_interval: 2,
    }
}

pub fn test_config() -> HarvestConfig {
    let mut config = HarvestConfig::default();
    config.timing = fast_timing();
    config
}

pub fn listing(title: &str, rating: &str, reviewers: &str) -> ListingSnapshot {
    ListingSnapshot {
        link: Some(place_link(title)),
        title: Some(title.to_string()),
        rating_text: Some(rating.to_string()),
        reviewer_text: Some(reviewers.to_string()),
        has_placeholder_thumbnail: false,
    }
}

pub fn place_link(title: &str) -> String {
    format!("https://www.google.com/maps/place/{}", title.replace(' ', "+"))
}

pub fn byline(name: &str) -> RawByline {
    RawByline {
        name: Some(name.to_string()),
        profile_link: Some(format!("https://www.google.com/maps/contrib/{}", name.len())),
        avatar_style: Some(format!(
            r#"url("https://lh3.googleusercontent.com/a/{}=s40")"#,
            name.to_lowercase().replace(' ', "-")
        )),
    }
}

/// One gallery tile as the fake renders it.
#[derive(Debug, Clone, Default)]
pub struct FakeTile {
    pub is_video: bool,
    /// `background-image` value once loaded; `None` never loads.
    pub style: Option<String>,
    pub owner: Option<RawByline>,
    pub contributor: Option<RawByline>,
    /// Probes of the owner byline that come back empty before it renders.
    pub owner_delay_probes: usize,
    pub select_fails: bool,
}

impl FakeTile {
    pub fn photo(uploader: &str) -> Self {
        Self {
            style: Some(format!(r#"url("{}")"#, PHOTO_URL)),
            contributor: Some(byline(uploader)),
            ..Self::default()
        }
    }

    pub fn video() -> Self {
        Self {
            is_video: true,
            ..Self::photo("Video Uploader")
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakePlace {
    pub title: String,
    pub about: Option<String>,
    pub address: Option<String>,
    pub navigation_fails: bool,
    pub navigation_delay: Option<Duration>,
    /// `None` renders no gallery button at all.
    pub gallery: Option<Vec<FakeTile>>,
    /// Button present, but the panel never renders.
    pub gallery_never_renders: bool,
    /// Clicking the gallery button fails.
    pub gallery_open_fails: bool,
    /// Listing the rendered tiles fails.
    pub tile_listing_fails: bool,
}

impl FakePlace {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            about: Some(format!("Tentang {}", title)),
            address: Some("Jl. Raya No. 1".to_string()),
            gallery: Some(vec![FakeTile::photo("Budi Santoso")]),
            ..Self::default()
        }
    }
}

#[derive(Debug, Default)]
struct FakeState {
    query: Option<String>,
    ready_probes: usize,
    scroll_calls: usize,
    open_place: Option<String>,
    selected: Option<usize>,
    owner_probes: usize,
    calls: Vec<String>,
}

/// Scripted, in-memory map application.
#[derive(Debug, Default)]
pub struct FakeSurface {
    pub home_fails: bool,
    /// Listings per submitted query; a query not present never shows results.
    pub results: HashMap<String, Vec<ListingSnapshot>>,
    /// Readiness probes that fail before the result list shows up.
    pub results_delay_probes: usize,
    /// Content heights returned by successive scrolls; the last one repeats.
    pub heights: Vec<u64>,
    /// Places keyed by link.
    pub places: HashMap<String, FakePlace>,
    state: Mutex<FakeState>,
}

impl FakeSurface {
    pub fn new() -> Self {
        Self {
            heights: vec![1000, 2000, 2000],
            ..Self::default()
        }
    }

    pub fn with_results(mut self, query: &str, listings: Vec<ListingSnapshot>) -> Self {
        self.results.insert(query.to_string(), listings);
        self
    }

    pub fn with_place(mut self, place: FakePlace) -> Self {
        self.places.insert(place_link(&place.title), place);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn scroll_calls(&self) -> usize {
        self.state.lock().unwrap().scroll_calls
    }

    fn log(&self, call: String) {
        self.state.lock().unwrap().calls.push(call);
    }

    fn current_place(&self) -> Option<FakePlace> {
        let state = self.state.lock().unwrap();
        state
            .open_place
            .as_ref()
            .and_then(|link| self.places.get(link))
            .cloned()
    }

    fn place_titled(&self, title: &str) -> Option<FakePlace> {
        self.current_place().filter(|place| place.title == title)
    }

    fn tiles(&self, title: &str) -> Vec<FakeTile> {
        self.place_titled(title)
            .and_then(|place| place.gallery)
            .unwrap_or_default()
    }

    fn selected_tile(&self) -> Option<FakeTile> {
        let selected = self.state.lock().unwrap().selected?;
        self.current_place()
            .and_then(|place| place.gallery)
            .and_then(|tiles| tiles.get(selected).cloned())
    }
}

#[async_trait]
impl MapSurface for FakeSurface {
    async fn open_home(&self) -> Result<()> {
        self.log("open_home".to_string());
        if self.home_fails {
            return Err(HarvestError::processing("net::ERR_NAME_NOT_RESOLVED"));
        }
        Ok(())
    }

    async fn submit_search(&self, query: &str) -> Result<()> {
        self.log(format!("search {}", query));
        let mut state = self.state.lock().unwrap();
        state.query = Some(query.to_string());
        state.ready_probes = 0;
        state.scroll_calls = 0;
        Ok(())
    }

    async fn results_ready(&self, query: &str) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        state.ready_probes += 1;
        Ok(self.results.contains_key(query) && state.ready_probes > self.results_delay_probes)
    }

    async fn scroll_results(&self, _query: &str) -> Result<u64> {
        let mut state = self.state.lock().unwrap();
        let at = state.scroll_calls.min(self.heights.len().saturating_sub(1));
        state.scroll_calls += 1;
        Ok(self.heights.get(at).copied().unwrap_or_default())
    }

    async fn result_items(&self, query: &str) -> Result<Vec<ListingSnapshot>> {
        Ok(self.results.get(query).cloned().unwrap_or_default())
    }

    async fn open_place(&self, link: &str) -> Result<()> {
        self.log(format!("open_place {}", link));
        let place = self.places.get(link).cloned();
        if let Some(delay) = place.as_ref().and_then(|p| p.navigation_delay) {
            tokio::time::sleep(delay).await;
        }
        match place {
            Some(place) if !place.navigation_fails => {
                let mut state = self.state.lock().unwrap();
                state.open_place = Some(link.to_string());
                state.selected = None;
                state.owner_probes = 0;
                Ok(())
            }
            _ => Err(HarvestError::processing(format!("navigation to {} failed", link))),
        }
    }

    async fn about_text(&self, title: &str) -> Result<Option<String>> {
        Ok(self.place_titled(title).and_then(|place| place.about))
    }

    async fn address_text(&self, title: &str) -> Result<Option<String>> {
        Ok(self.place_titled(title).and_then(|place| place.address))
    }

    async fn gallery_entry_present(&self, title: &str) -> Result<bool> {
        Ok(self
            .place_titled(title)
            .is_some_and(|place| place.gallery.is_some()))
    }

    async fn open_gallery(&self, title: &str) -> Result<()> {
        self.log(format!("open_gallery {}", title));
        if self.place_titled(title).is_some_and(|place| place.gallery_open_fails) {
            return Err(HarvestError::processing("gallery button detached"));
        }
        Ok(())
    }

    async fn gallery_ready(&self, title: &str) -> Result<bool> {
        let Some(place) = self.place_titled(title) else {
            return Ok(false);
        };
        Ok(!place.gallery_never_renders && place.gallery.is_some_and(|tiles| !tiles.is_empty()))
    }

    async fn gallery_items(&self, title: &str) -> Result<Vec<GalleryItem>> {
        if self.place_titled(title).is_some_and(|place| place.tile_listing_fails) {
            return Err(HarvestError::processing("node detached while listing tiles"));
        }
        Ok(self
            .tiles(title)
            .iter()
            .enumerate()
            .map(|(index, tile)| GalleryItem {
                index,
                is_video: tile.is_video,
            })
            .collect())
    }

    async fn select_gallery_item(&self, title: &str, index: usize) -> Result<()> {
        self.log(format!("select {}", index));
        let tile = self
            .tiles(title)
            .get(index)
            .cloned()
            .ok_or_else(|| HarvestError::processing("tile detached"))?;
        if tile.select_fails {
            return Err(HarvestError::processing("tile detached"));
        }
        let mut state = self.state.lock().unwrap();
        state.selected = Some(index);
        state.owner_probes = 0;
        Ok(())
    }

    async fn loaded_image_style(&self, _title: &str, index: usize) -> Result<Option<String>> {
        let selected = self.state.lock().unwrap().selected;
        if selected != Some(index) {
            return Ok(None);
        }
        Ok(self.selected_tile().and_then(|tile| tile.style))
    }

    async fn byline(&self, kind: BylineKind) -> Result<Option<RawByline>> {
        let Some(tile) = self.selected_tile() else {
            return Ok(None);
        };
        match kind {
            BylineKind::PlaceOwner => {
                let mut state = self.state.lock().unwrap();
                state.owner_probes += 1;
                if state.owner_probes <= tile.owner_delay_probes {
                    return Ok(None);
                }
                Ok(tile.owner)
            }
            BylineKind::Contributor => Ok(tile.contributor),
        }
    }
}

/// Fixed list of region labels.
pub struct FakeCatalog(pub Vec<String>);

impl FakeCatalog {
    pub fn of(labels: &[&str]) -> Self {
        Self(labels.iter().map(|label| label.to_string()).collect())
    }
}

#[async_trait]
impl RegionCatalog for FakeCatalog {
    async fn region_labels(&self) -> Result<Vec<String>> {
        Ok(self.0.clone())
    }
}
