// Adapters layer: concrete implementations of the domain ports for external systems.

pub mod browser;
pub mod http;

pub use browser::{ChromeMapSurface, ChromeSession};
pub use http::HttpRegionCatalog;
