pub mod detail;
pub mod engine;
pub mod extract;
pub mod gallery;
pub mod list_collector;
pub mod regions;
pub mod store;
pub mod wait;

pub use crate::domain::model::{Author, CommitReport, ImageRecord, PlaceRecord, RegionLog};
pub use crate::domain::ports::{MapSurface, RegionCatalog, RegionPipeline, Storage};
pub use crate::utils::error::Result;
