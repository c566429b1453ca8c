use crate::domain::model::{CommitReport, PlaceRecord};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn exists(&self, path: &str) -> impl std::future::Future<Output = Result<bool>> + Send;
}

/// Source of every region label that may be harvested.
#[async_trait]
pub trait RegionCatalog: Send + Sync {
    async fn region_labels(&self) -> Result<Vec<String>>;
}

/// Raw text read from one entry of the search result list, before parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingSnapshot {
    pub link: Option<String>,
    pub title: Option<String>,
    pub rating_text: Option<String>,
    pub reviewer_text: Option<String>,
    pub has_placeholder_thumbnail: bool,
}

/// One tile in the photo gallery, addressed by its position in the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GalleryItem {
    pub index: usize,
    pub is_video: bool,
}

/// The two byline layouts the photo viewer renders for an uploader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BylineKind {
    /// Title card byline, used when the place owner uploaded the photo.
    PlaceOwner,
    /// Body byline naming a separate contributor.
    Contributor,
}

/// Attribution fields as rendered; `avatar_style` is a raw CSS
/// `background-image` value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawByline {
    pub name: Option<String>,
    pub profile_link: Option<String>,
    pub avatar_style: Option<String>,
}

/// Everything the harvester reads from or does to the map application.
///
/// Each method is a single, immediate probe: "not rendered yet" is reported
/// as `Ok(None)`/`Ok(false)`, never as an error. Bounded waiting is done by
/// the caller (see [`crate::core::wait`]), so a test double can script
/// exactly when an element shows up.
#[async_trait]
pub trait MapSurface: Send + Sync {
    /// Loads the application's start page. Failure here is fatal.
    async fn open_home(&self) -> Result<()>;
    async fn submit_search(&self, query: &str) -> Result<()>;
    async fn results_ready(&self, query: &str) -> Result<bool>;
    /// Scrolls the result container to its bottom and returns its content height.
    async fn scroll_results(&self, query: &str) -> Result<u64>;
    async fn result_items(&self, query: &str) -> Result<Vec<ListingSnapshot>>;

    /// Navigates to a place's detail view. May take long; callers bound it.
    async fn open_place(&self, link: &str) -> Result<()>;
    async fn about_text(&self, title: &str) -> Result<Option<String>>;
    async fn address_text(&self, title: &str) -> Result<Option<String>>;

    async fn gallery_entry_present(&self, title: &str) -> Result<bool>;
    async fn open_gallery(&self, title: &str) -> Result<()>;
    /// True once the gallery panel and at least one tile are rendered.
    async fn gallery_ready(&self, title: &str) -> Result<bool>;
    async fn gallery_items(&self, title: &str) -> Result<Vec<GalleryItem>>;
    async fn select_gallery_item(&self, title: &str, index: usize) -> Result<()>;
    /// Raw `background-image` of the tile's image surface once it carries
    /// the loaded marker.
    async fn loaded_image_style(&self, title: &str, index: usize) -> Result<Option<String>>;
    async fn byline(&self, kind: BylineKind) -> Result<Option<RawByline>>;
}

/// Per-region harvesting phases, driven in order by
/// [`crate::core::engine::HarvestEngine`].
#[async_trait]
pub trait RegionPipeline: Send + Sync {
    /// Regions still to harvest, in the order they should be visited.
    async fn pending_regions(&self) -> Result<Vec<String>>;
    /// Collects provisional records from the result list.
    async fn gather(&self, region: &str) -> Result<Vec<PlaceRecord>>;
    /// Adds details and photos; candidates that fail are left out.
    async fn enrich(&self, region: &str, candidates: Vec<PlaceRecord>) -> Result<Vec<PlaceRecord>>;
    /// Merges the batch into the store and marks the region done.
    async fn commit(&self, region: &str, batch: Vec<PlaceRecord>) -> Result<CommitReport>;
}
