pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{cli::LocalStorage, HarvestConfig, MissingGalleryPolicy};

pub use adapters::{ChromeMapSurface, ChromeSession, HttpRegionCatalog};
pub use app::pipelines::HarvestPipeline;
pub use core::engine::{HarvestEngine, HarvestSummary};
pub use utils::error::{HarvestError, Result};
