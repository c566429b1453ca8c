use serde::{Deserialize, Serialize};

/// Listings with fewer reviews than this are never materialized.
pub const MIN_REVIEWERS: u32 = 10;

/// Upper bound on photos kept per place.
pub const MAX_IMAGES: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceRecord {
    pub title: String,
    #[serde(default)]
    pub about: String,
    #[serde(default)]
    pub address: String,
    pub rating: f64,
    #[serde(alias = "reviewers")]
    pub reviewer_count: u32,
    pub link: String,
    #[serde(alias = "province")]
    pub region: String,
    #[serde(default)]
    pub images: Vec<ImageRecord>,
}

impl PlaceRecord {
    /// Builds a provisional record straight from a result-list entry.
    ///
    /// Returns `None` when `reviewer_count` is below [`MIN_REVIEWERS`]; such
    /// listings never become records.
    pub fn candidate(
        title: impl Into<String>,
        link: impl Into<String>,
        rating: f64,
        reviewer_count: u32,
        region: impl Into<String>,
    ) -> Option<Self> {
        if reviewer_count < MIN_REVIEWERS {
            return None;
        }
        Some(Self {
            title: title.into(),
            about: String::new(),
            address: String::new(),
            rating,
            reviewer_count,
            link: link.into(),
            region: region.into(),
            images: Vec::new(),
        })
    }

    pub fn with_details(mut self, details: PlaceDetails) -> Self {
        self.about = details.about;
        self.address = details.address;
        self
    }

    /// Attaches gallery results, keeping at most [`MAX_IMAGES`].
    pub fn with_images(mut self, mut images: Vec<ImageRecord>) -> Self {
        images.truncate(MAX_IMAGES);
        self.images = images;
        self
    }
}

/// Free-text fields read from a place's detail view. Either may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceDetails {
    pub about: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub url: String,
    pub author: Author,
}

impl ImageRecord {
    /// An image is only kept with a non-empty URL and a named author.
    pub fn accepted(url: String, author: Author) -> Option<Self> {
        if url.trim().is_empty() || author.name.trim().is_empty() {
            return None;
        }
        Some(Self { url, author })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub name: String,
    #[serde(default, alias = "link")]
    pub profile_link: String,
    #[serde(default, alias = "photoUrl")]
    pub avatar_url: String,
}

/// Regions already fully harvested, most recent first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionLog(Vec<String>);

impl RegionLog {
    pub fn new(regions: Vec<String>) -> Self {
        Self(regions)
    }

    pub fn contains(&self, region: &str) -> bool {
        self.0.iter().any(|r| r == region)
    }

    /// Prepends `region`. Returns `false` (and leaves the log untouched) if it
    /// was already recorded.
    pub fn record(&mut self, region: &str) -> bool {
        if self.contains(region) {
            return false;
        }
        self.0.insert(0, region.to_string());
        true
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

/// Outcome of committing one region's batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommitReport {
    pub region: String,
    pub places: usize,
    pub images: usize,
    pub store_size: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_enforces_reviewer_floor() {
        assert!(PlaceRecord::candidate("Curug", "https://m/x", 4.5, 9, "A").is_none());
        let place = PlaceRecord::candidate("Curug", "https://m/x", 4.5, 10, "A").unwrap();
        assert_eq!(place.reviewer_count, 10);
        assert!(place.about.is_empty());
        assert!(place.images.is_empty());
    }

    #[test]
    fn test_image_requires_url_and_author_name() {
        let author = Author {
            name: "Budi".to_string(),
            ..Author::default()
        };
        assert!(ImageRecord::accepted("https://img=s1080-k-no".to_string(), author.clone()).is_some());
        assert!(ImageRecord::accepted(String::new(), author).is_none());
        assert!(
            ImageRecord::accepted("https://img=s1080-k-no".to_string(), Author::default()).is_none()
        );
    }

    #[test]
    fn test_with_images_truncates() {
        let place = PlaceRecord::candidate("T", "l", 4.0, 20, "R").unwrap();
        let image = ImageRecord {
            url: "u".to_string(),
            author: Author {
                name: "n".to_string(),
                ..Author::default()
            },
        };
        let place = place.with_images(vec![image; 7]);
        assert_eq!(place.images.len(), MAX_IMAGES);
    }

    #[test]
    fn test_serializes_camel_case_and_reads_legacy_names() {
        let place = PlaceRecord::candidate("T", "l", 4.0, 20, "R").unwrap();
        let json = serde_json::to_value(&place).unwrap();
        assert_eq!(json["reviewerCount"], 20);
        assert_eq!(json["region"], "R");

        let legacy = r#"{"title":"T","about":"","address":"","rating":4.2,"reviewers":31,
            "link":"l","province":"KOTA BANDUNG, PROVINSI JAWA BARAT",
            "images":[{"url":"u","author":{"name":"n","link":"p","photoUrl":"a"}}]}"#;
        let place: PlaceRecord = serde_json::from_str(legacy).unwrap();
        assert_eq!(place.reviewer_count, 31);
        assert_eq!(place.region, "KOTA BANDUNG, PROVINSI JAWA BARAT");
        assert_eq!(place.images[0].author.profile_link, "p");
        assert_eq!(place.images[0].author.avatar_url, "a");
    }

    #[test]
    fn test_region_log_records_once_most_recent_first() {
        let mut log = RegionLog::new(vec!["A".to_string()]);
        assert!(log.record("B"));
        assert!(!log.record("A"));
        assert_eq!(log.as_slice(), &["B".to_string(), "A".to_string()]);
    }
}
