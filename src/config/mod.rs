pub mod cli;
pub mod toml_config;

pub use toml_config::{HarvestConfig, MissingGalleryPolicy};

#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "places-harvest")]
#[command(about = "Harvests tourist places, region by region, from a map web application")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Directory holding the place store and region log
    #[arg(long)]
    pub data_dir: Option<String>,

    /// Run the browser without a window
    #[arg(long)]
    pub headless: bool,

    /// Stop after this many regions
    #[arg(long)]
    pub max_regions: Option<usize>,

    /// Only harvest regions whose label contains this text
    #[arg(long)]
    pub only: Option<String>,

    /// Policy for places without a photo gallery
    #[arg(long, value_enum)]
    pub missing_gallery: Option<MissingGalleryPolicy>,

    /// Print the pending regions and exit
    #[arg(long)]
    pub dry_run: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,

    #[arg(long, help = "Log process CPU and memory after each region")]
    pub monitor: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Loads the file configuration (or defaults) and applies flag overrides.
    pub fn resolve(&self) -> crate::utils::error::Result<HarvestConfig> {
        let mut config = match &self.config {
            Some(path) => HarvestConfig::from_file(path)?,
            None => HarvestConfig::default(),
        };
        self.apply_overrides(&mut config);
        Ok(config)
    }

    pub fn apply_overrides(&self, config: &mut HarvestConfig) {
        if let Some(data_dir) = &self.data_dir {
            config.output.data_dir = data_dir.clone();
        }
        if self.headless {
            config.browser.headless = true;
        }
        if let Some(max_regions) = self.max_regions {
            config.run.max_regions = Some(max_regions);
        }
        if let Some(only) = &self.only {
            config.run.region_filter = Some(only.clone());
        }
        if let Some(policy) = self.missing_gallery {
            config.gallery.missing_gallery = policy;
        }
    }
}
