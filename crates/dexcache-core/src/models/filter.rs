//! Gender classification of the catalog and the derived filtered view.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use super::CatalogEntry;

/// Which subset of the catalog is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    #[default]
    All,
    Male,
    Female,
    Genderless,
}

impl FilterMode {
    pub const ALL_MODES: [FilterMode; 4] = [
        FilterMode::All,
        FilterMode::Male,
        FilterMode::Female,
        FilterMode::Genderless,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            FilterMode::All => "All",
            FilterMode::Male => "Male",
            FilterMode::Female => "Female",
            FilterMode::Genderless => "Genderless",
        }
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

impl FromStr for FilterMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(FilterMode::All),
            "male" => Ok(FilterMode::Male),
            "female" => Ok(FilterMode::Female),
            "genderless" => Ok(FilterMode::Genderless),
            other => Err(format!(
                "unknown filter '{}' (expected all, male, female or genderless)",
                other
            )),
        }
    }
}

/// Names belonging to each remote gender group.
///
/// Matching is by name, not id: the gender endpoint lists species, whose ids
/// do not line up with catalog ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassificationSet {
    pub male_names: HashSet<String>,
    pub female_names: HashSet<String>,
}

impl ClassificationSet {
    pub fn from_groups(male: &[CatalogEntry], female: &[CatalogEntry]) -> Self {
        Self {
            male_names: male.iter().map(|e| e.name.clone()).collect(),
            female_names: female.iter().map(|e| e.name.clone()).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.male_names.is_empty() && self.female_names.is_empty()
    }

    fn matches(&self, entry: &CatalogEntry, mode: FilterMode) -> bool {
        match mode {
            FilterMode::All => true,
            FilterMode::Male => self.male_names.contains(&entry.name),
            FilterMode::Female => self.female_names.contains(&entry.name),
            FilterMode::Genderless => {
                !self.male_names.contains(&entry.name) && !self.female_names.contains(&entry.name)
            }
        }
    }

    /// Select the entries of `catalog` visible under `mode`, keeping fetch order.
    pub fn apply(&self, catalog: &[CatalogEntry], mode: FilterMode) -> Vec<CatalogEntry> {
        catalog
            .iter()
            .filter(|entry| self.matches(entry, mode))
            .cloned()
            .collect()
    }
}
