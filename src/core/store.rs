use crate::domain::model::{PlaceRecord, RegionLog};
use crate::domain::ports::Storage;
use crate::utils::error::Result;
use std::collections::HashMap;

/// Combines two record sets keyed by `link`.
///
/// `existing` is applied first and `incoming` second, so a link present in
/// both takes every field from `incoming`, blanks included. Output order is
/// first-seen order of each link.
pub fn merge(existing: Vec<PlaceRecord>, incoming: Vec<PlaceRecord>) -> Vec<PlaceRecord> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut merged: Vec<PlaceRecord> = Vec::with_capacity(existing.len() + incoming.len());

    for record in existing.into_iter().chain(incoming) {
        match positions.get(&record.link) {
            Some(&at) => merged[at] = record,
            None => {
                positions.insert(record.link.clone(), merged.len());
                merged.push(record);
            }
        }
    }

    merged
}

/// The persisted place dataset and region log.
pub struct ResultStore<S: Storage> {
    storage: S,
    places_path: String,
    region_log_path: String,
}

impl<S: Storage> ResultStore<S> {
    pub fn new(storage: S, places_path: impl Into<String>, region_log_path: impl Into<String>) -> Self {
        Self {
            storage,
            places_path: places_path.into(),
            region_log_path: region_log_path.into(),
        }
    }

    /// Stored records, or an empty list when nothing has been written yet.
    pub async fn load(&self) -> Result<Vec<PlaceRecord>> {
        if !self.storage.exists(&self.places_path).await? {
            tracing::debug!("No place store at {}, starting empty", self.places_path);
            return Ok(Vec::new());
        }
        let bytes = self.storage.read_file(&self.places_path).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Replaces the stored dataset wholesale.
    pub async fn persist(&self, records: &[PlaceRecord]) -> Result<()> {
        let bytes = serde_json::to_vec(records)?;
        tracing::debug!(
            "Writing {} places ({} bytes) to {}",
            records.len(),
            bytes.len(),
            self.places_path
        );
        self.storage.write_file(&self.places_path, &bytes).await
    }

    /// Loads, merges `incoming` over the stored records, and persists.
    /// Returns the new store size.
    pub async fn merge_and_persist(&self, incoming: Vec<PlaceRecord>) -> Result<usize> {
        let existing = self.load().await?;
        let merged = merge(existing, incoming);
        self.persist(&merged).await?;
        Ok(merged.len())
    }

    pub async fn load_region_log(&self) -> Result<RegionLog> {
        if !self.storage.exists(&self.region_log_path).await? {
            return Ok(RegionLog::default());
        }
        let bytes = self.storage.read_file(&self.region_log_path).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Prepends `region` to the log file and rewrites it.
    pub async fn append_region_log(&self, region: &str) -> Result<()> {
        let mut log = self.load_region_log().await?;
        if !log.record(region) {
            tracing::debug!("Region {} already logged", region);
            return Ok(());
        }
        let bytes = serde_json::to_vec_pretty(&log)?;
        self.storage.write_file(&self.region_log_path, &bytes).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::HarvestError;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            self.files.lock().await.get(path).cloned()
        }

        async fn put_file(&self, path: &str, data: &str) {
            self.files
                .lock()
                .await
                .insert(path.to_string(), data.as_bytes().to_vec());
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                HarvestError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }

        async fn exists(&self, path: &str) -> Result<bool> {
            Ok(self.files.lock().await.contains_key(path))
        }
    }

    fn place(link: &str, about: &str) -> PlaceRecord {
        let mut record = PlaceRecord::candidate(format!("Place {link}"), link, 4.5, 120, "R").unwrap();
        record.about = about.to_string();
        record
    }

    #[test]
    fn test_merge_incoming_wins() {
        let merged = merge(vec![place("x", "old")], vec![place("x", "new")]);
        assert_eq!(merged, vec![place("x", "new")]);
    }

    #[test]
    fn test_merge_overwrites_with_blank_fields() {
        let mut stored = place("x", "Air terjun setinggi 30 meter");
        stored.address = "Jl. Raya Curug".to_string();
        let merged = merge(vec![stored], vec![place("x", "")]);

        assert_eq!(merged.len(), 1);
        assert!(merged[0].about.is_empty());
        assert!(merged[0].address.is_empty());
    }

    #[test]
    fn test_merge_keeps_first_seen_order() {
        let merged = merge(
            vec![place("a", "1"), place("b", "1")],
            vec![place("c", "2"), place("a", "2")],
        );
        let links: Vec<&str> = merged.iter().map(|p| p.link.as_str()).collect();
        assert_eq!(links, vec!["a", "b", "c"]);
        assert_eq!(merged[0].about, "2");
    }

    #[test]
    fn test_merge_is_idempotent() {
        let stored = vec![place("a", "1"), place("b", "1")];
        let batch = vec![place("b", "2"), place("c", "2"), place("c", "3")];

        let once = merge(stored, batch.clone());
        let twice = merge(once.clone(), batch);
        assert_eq!(once, twice);
    }

    #[tokio::test]
    async fn test_load_missing_store_is_empty() {
        let store = ResultStore::new(MockStorage::default(), "places.json", "log.json");
        assert!(store.load().await.unwrap().is_empty());
        assert!(store.load_region_log().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_merge_and_persist_rewrites_store() {
        let storage = MockStorage::default();
        let store = ResultStore::new(storage.clone(), "places.json", "log.json");
        store.persist(&[place("x", "old"), place("y", "keep")]).await.unwrap();

        let size = store.merge_and_persist(vec![place("x", "new")]).await.unwrap();
        assert_eq!(size, 2);

        let written = storage.get_file("places.json").await.unwrap();
        let records: Vec<PlaceRecord> = serde_json::from_slice(&written).unwrap();
        assert_eq!(records, vec![place("x", "new"), place("y", "keep")]);
    }

    #[tokio::test]
    async fn test_append_region_log_prepends() {
        let storage = MockStorage::default();
        storage.put_file("log.json", r#"["A"]"#).await;
        let store = ResultStore::new(storage.clone(), "places.json", "log.json");

        store.append_region_log("B").await.unwrap();
        store.append_region_log("A").await.unwrap();

        let log = store.load_region_log().await.unwrap();
        assert_eq!(log.as_slice(), &["B".to_string(), "A".to_string()]);

        let raw = String::from_utf8(storage.get_file("log.json").await.unwrap()).unwrap();
        assert_eq!(raw, "[\n  \"B\",\n  \"A\"\n]");
    }

    #[tokio::test]
    async fn test_corrupt_store_is_an_error() {
        let storage = MockStorage::default();
        storage.put_file("places.json", "{not json").await;
        let store = ResultStore::new(storage, "places.json", "log.json");

        assert!(matches!(
            store.load().await,
            Err(HarvestError::SerializationError(_))
        ));
    }
}
