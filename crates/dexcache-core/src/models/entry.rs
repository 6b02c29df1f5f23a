use serde::{Deserialize, Serialize};

/// A single catalog item.
///
/// Entries start out with only `id`, `name` and `detail_url` from the
/// catalog listing. A detail fetch fills in the optional fields in place;
/// identity is always `id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: i64,
    pub name: String,
    #[serde(rename = "url")]
    pub detail_url: String,
    #[serde(default)]
    pub height: Option<i64>,
    #[serde(default)]
    pub weight: Option<i64>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// An entry after its detail record has been merged in. Same type, the
/// distinction is only whether `height` is populated.
pub type DetailedEntry = CatalogEntry;

impl CatalogEntry {
    pub fn new(id: i64, name: impl Into<String>, detail_url: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            detail_url: detail_url.into(),
            height: None,
            weight: None,
            image_url: None,
        }
    }

    /// Build an entry from a listing URL, deriving the id from its trailing
    /// numeric path segment. Returns `None` when no id can be parsed.
    pub fn from_listing(name: &str, url: &str) -> Option<Self> {
        let id = id_from_url(url)?;
        Some(Self::new(id, name, url))
    }

    pub fn is_detail_complete(&self) -> bool {
        self.height.is_some()
    }

    /// Copy detail fields from `detail` into this entry.
    pub fn merge_detail(&mut self, detail: &CatalogEntry) {
        self.height = detail.height;
        self.weight = detail.weight;
        self.image_url = detail.image_url.clone();
    }

    /// Height in metres (the API reports decimetres).
    pub fn height_display(&self) -> String {
        match self.height {
            Some(dm) => format!("{:.1} m", dm as f64 / 10.0),
            None => "Unknown".to_string(),
        }
    }

    /// Weight in kilograms (the API reports hectograms).
    pub fn weight_display(&self) -> String {
        match self.weight {
            Some(hg) => format!("{:.1} kg", hg as f64 / 10.0),
            None => "Unknown".to_string(),
        }
    }
}

impl PartialEq for CatalogEntry {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for CatalogEntry {}

impl std::hash::Hash for CatalogEntry {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Parse the trailing numeric path segment of a resource URL.
///
/// `https://pokeapi.co/api/v2/pokemon/25/` yields `Some(25)`.
pub fn id_from_url(url: &str) -> Option<i64> {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .and_then(|segment| segment.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_from_url() {
        assert_eq!(id_from_url("https://pokeapi.co/api/v2/pokemon/25/"), Some(25));
        assert_eq!(id_from_url("https://pokeapi.co/api/v2/pokemon/7"), Some(7));
        assert_eq!(id_from_url("https://pokeapi.co/api/v2/pokemon-species/151/"), Some(151));

        assert_eq!(id_from_url("https://pokeapi.co/api/v2/pokemon/pikachu/"), None);
        assert_eq!(id_from_url(""), None);
        assert_eq!(id_from_url("/"), None);
    }

    #[test]
    fn test_from_listing_drops_unparsable() {
        let entry = CatalogEntry::from_listing("bulbasaur", "https://pokeapi.co/api/v2/pokemon/1/")
            .expect("valid listing");
        assert_eq!(entry.id, 1);
        assert_eq!(entry.name, "bulbasaur");
        assert!(!entry.is_detail_complete());

        assert!(CatalogEntry::from_listing("missingno", "https://pokeapi.co/api/v2/pokemon/x/").is_none());
    }

    #[test]
    fn test_merge_detail_keeps_identity() {
        let mut entry = CatalogEntry::new(4, "charmander", "https://pokeapi.co/api/v2/pokemon/4/");
        let mut detail = entry.clone();
        detail.height = Some(6);
        detail.weight = Some(85);
        detail.image_url = Some("https://img.example/4.png".to_string());

        entry.merge_detail(&detail);

        assert_eq!(entry.id, 4);
        assert_eq!(entry.name, "charmander");
        assert!(entry.is_detail_complete());
        assert_eq!(entry.weight, Some(85));
        assert_eq!(entry.image_url.as_deref(), Some("https://img.example/4.png"));
    }

    #[test]
    fn test_equality_is_by_id() {
        let a = CatalogEntry::new(1, "bulbasaur", "u1");
        let mut b = CatalogEntry::new(1, "renamed", "u2");
        b.height = Some(7);
        assert_eq!(a, b);
        assert_ne!(a, CatalogEntry::new(2, "bulbasaur", "u1"));
    }

    #[test]
    fn test_display_units() {
        let mut entry = CatalogEntry::new(25, "pikachu", "u");
        assert_eq!(entry.height_display(), "Unknown");
        entry.height = Some(4);
        entry.weight = Some(60);
        assert_eq!(entry.height_display(), "0.4 m");
        assert_eq!(entry.weight_display(), "6.0 kg");
    }

    #[test]
    fn test_deserialize_without_detail_fields() {
        let json = r#"{"id": 7, "name": "squirtle", "url": "https://pokeapi.co/api/v2/pokemon/7/"}"#;
        let entry: CatalogEntry = serde_json::from_str(json).expect("parse entry");
        assert_eq!(entry.id, 7);
        assert!(entry.height.is_none());
        assert!(entry.image_url.is_none());
    }
}
