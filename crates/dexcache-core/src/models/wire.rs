//! Response shapes returned by the remote catalog API.

use serde::Deserialize;

use super::CatalogEntry;

/// A named resource reference as it appears in listings.
#[derive(Debug, Clone, Deserialize)]
pub struct WireEntry {
    pub name: String,
    pub url: String,
}

impl WireEntry {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }

    pub fn to_entry(&self) -> Option<CatalogEntry> {
        CatalogEntry::from_listing(&self.name, &self.url)
    }
}

#[derive(Debug, Deserialize)]
pub struct CatalogPageResponse {
    pub results: Vec<WireEntry>,
}

#[derive(Debug, Deserialize)]
pub struct GenderResponse {
    pub pokemon_species_details: Vec<SpeciesDetail>,
}

#[derive(Debug, Deserialize)]
pub struct SpeciesDetail {
    pub pokemon_species: WireEntry,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireDetail {
    pub id: i64,
    pub name: String,
    pub height: i64,
    pub weight: i64,
    #[serde(default)]
    pub sprites: Option<WireSprites>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireSprites {
    #[serde(default)]
    pub front_default: Option<String>,
}

impl WireDetail {
    pub fn image_url(&self) -> Option<String> {
        self.sprites.as_ref().and_then(|s| s.front_default.clone())
    }

    /// Merge this detail record into a copy of `entry`.
    pub fn merge_into(&self, entry: &CatalogEntry) -> CatalogEntry {
        let mut detailed = entry.clone();
        detailed.height = Some(self.height);
        detailed.weight = Some(self.weight);
        detailed.image_url = self.image_url();
        detailed
    }
}
