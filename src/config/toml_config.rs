use crate::domain::model::MAX_IMAGES;
use crate::utils::error::{HarvestError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_positive_number, validate_range,
    validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Full harvester configuration. Every section is optional in the file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
    pub source: SourceConfig,
    pub output: OutputConfig,
    pub browser: BrowserConfig,
    pub locale: LocaleConfig,
    pub timing: TimingConfig,
    pub gallery: GalleryConfig,
    pub run: RunConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub regions_url: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            regions_url:
                "https://raw.githubusercontent.com/kodewilayah/permendagri-72-2019/main/dist/base.csv"
                    .to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub data_dir: String,
    pub places_file: String,
    pub region_log_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
            places_file: "wisata-v2.json".to_string(),
            region_log_file: "daerah-log.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub home_url: String,
    pub headless: bool,
    pub window_width: u32,
    pub window_height: u32,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            home_url: "https://www.google.com/maps".to_string(),
            headless: false,
            window_width: 1080,
            window_height: 1024,
        }
    }
}

/// Interface label text the selectors are keyed on. Defaults match the
/// Indonesian UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocaleConfig {
    pub search_prefix: String,
    pub results_label: String,
    pub about_label: String,
    pub photos_label: String,
    pub copy_address_tooltip: String,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            search_prefix: "Wisata".to_string(),
            results_label: "Hasil untuk".to_string(),
            about_label: "Tentang".to_string(),
            photos_label: "Foto".to_string(),
            copy_address_tooltip: "Salin alamat".to_string(),
        }
    }
}

impl LocaleConfig {
    pub fn search_query(&self, region: &str) -> String {
        format!("{} {}", self.search_prefix, region)
    }
}

/// Bounds and settle delays, in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub search_timeout: u64,
    pub scroll_settle: u64,
    pub max_scroll_rounds: usize,
    pub navigation_timeout: u64,
    pub field_timeout: u64,
    pub gallery_timeout: u64,
    pub item_settle: u64,
    pub image_loaded_timeout: u64,
    pub attribution_timeout: u64,
    pub poll_interval: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            search_timeout: 30_000,
            scroll_settle: 2_000,
            max_scroll_rounds: 200,
            navigation_timeout: 15_000,
            field_timeout: 2_000,
            gallery_timeout: 10_000,
            item_settle: 1_000,
            image_loaded_timeout: 1_000,
            attribution_timeout: 3_000,
            poll_interval: 100,
        }
    }
}

impl TimingConfig {
    pub fn search_timeout(&self) -> Duration {
        Duration::from_millis(self.search_timeout)
    }

    pub fn scroll_settle(&self) -> Duration {
        Duration::from_millis(self.scroll_settle)
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout)
    }

    pub fn field_timeout(&self) -> Duration {
        Duration::from_millis(self.field_timeout)
    }

    pub fn gallery_timeout(&self) -> Duration {
        Duration::from_millis(self.gallery_timeout)
    }

    pub fn item_settle(&self) -> Duration {
        Duration::from_millis(self.item_settle)
    }

    pub fn image_loaded_timeout(&self) -> Duration {
        Duration::from_millis(self.image_loaded_timeout)
    }

    pub fn attribution_timeout(&self) -> Duration {
        Duration::from_millis(self.attribution_timeout)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval)
    }
}

/// What to do with a place whose detail view has no photo gallery button.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "kebab-case")]
pub enum MissingGalleryPolicy {
    /// Leave the place out of the batch.
    #[default]
    Skip,
    /// Keep the place with an empty image list.
    AcceptEmpty,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    pub max_photos: usize,
    pub required_marker: String,
    pub canonical_size: String,
    pub missing_gallery: MissingGalleryPolicy,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            max_photos: MAX_IMAGES,
            required_marker: "k-no".to_string(),
            canonical_size: "s1080-k-no".to_string(),
            missing_gallery: MissingGalleryPolicy::Skip,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub max_regions: Option<usize>,
    pub region_filter: Option<String>,
}

impl HarvestConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(HarvestError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// Parses configuration from TOML text, substituting `${VAR}` references.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| HarvestError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are
    /// left as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| HarvestError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_url("source.regions_url", &self.source.regions_url)?;
        validate_url("browser.home_url", &self.browser.home_url)?;

        validate_path("output.data_dir", &self.output.data_dir)?;
        validate_path("output.places_file", &self.output.places_file)?;
        validate_path("output.region_log_file", &self.output.region_log_file)?;
        if self.output.places_file == self.output.region_log_file {
            return Err(HarvestError::InvalidConfigValueError {
                field: "output.region_log_file".to_string(),
                value: self.output.region_log_file.clone(),
                reason: "Must differ from output.places_file".to_string(),
            });
        }

        validate_non_empty_string("locale.search_prefix", &self.locale.search_prefix)?;
        validate_non_empty_string("locale.results_label", &self.locale.results_label)?;
        validate_non_empty_string("locale.photos_label", &self.locale.photos_label)?;

        validate_positive_number("timing.poll_interval", self.timing.poll_interval as usize, 1)?;
        validate_positive_number("timing.max_scroll_rounds", self.timing.max_scroll_rounds, 1)?;

        validate_range("gallery.max_photos", self.gallery.max_photos, 1, MAX_IMAGES)?;
        validate_non_empty_string("gallery.required_marker", &self.gallery.required_marker)?;
        validate_non_empty_string("gallery.canonical_size", &self.gallery.canonical_size)?;

        if let Some(max_regions) = self.run.max_regions {
            validate_positive_number("run.max_regions", max_regions, 1)?;
        }

        Ok(())
    }

    pub fn places_path(&self) -> &str {
        &self.output.places_file
    }

    pub fn region_log_path(&self) -> &str {
        &self.output.region_log_file
    }
}

impl Validate for HarvestConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
