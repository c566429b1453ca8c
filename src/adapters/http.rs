use crate::core::regions::parse_region_table;
use crate::domain::ports::RegionCatalog;
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::Client;

/// Region labels built from a remote `code,name` CSV table.
pub struct HttpRegionCatalog {
    client: Client,
    url: String,
}

impl HttpRegionCatalog {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl RegionCatalog for HttpRegionCatalog {
    async fn region_labels(&self) -> Result<Vec<String>> {
        tracing::debug!("Fetching region table from: {}", self.url);
        let response = self.client.get(&self.url).send().await?.error_for_status()?;
        let body = response.text().await?;

        let labels = parse_region_table(&body)?;
        tracing::debug!("Region table yielded {} labels", labels.len());
        Ok(labels)
    }
}
