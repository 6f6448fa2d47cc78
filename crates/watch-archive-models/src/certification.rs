use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Region order used to pick one certification out of many.
pub const DEFAULT_REGION_PREFERENCE: [&str; 12] = [
    "US", "JP", "CN", "HK", "TW", "FR", "GB", "DE", "IT", "ES", "CZ", "KR",
];

/// Region code (ISO 3166-1 alpha-2) -> certification string for one title.
///
/// Providers return regions in no particular order, so lookup order is
/// always imposed by the caller through [`CertificationMap::resolve`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CertificationMap {
    entries: BTreeMap<String, String>,
}

impl CertificationMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a certification for a region.
    ///
    /// Blank certifications are ignored. A repeated region replaces the
    /// earlier value. Returns whether the entry was kept.
    pub fn insert(&mut self, region: impl Into<String>, certification: impl Into<String>) -> bool {
        let certification = certification.into();
        let certification = certification.trim();
        if certification.is_empty() {
            return false;
        }
        self.entries.insert(region.into(), certification.to_string());
        true
    }

    pub fn get(&self, region: &str) -> Option<&str> {
        self.entries.get(region).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn regions(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Pick the certification of the first preferred region present.
    ///
    /// When no preferred region matches but the map is non-empty, the entry
    /// with the lowest region code is returned so the choice is stable
    /// across runs.
    pub fn resolve<S: AsRef<str>>(&self, preference: &[S]) -> Option<&str> {
        preference
            .iter()
            .find_map(|region| self.get(region.as_ref()))
            .or_else(|| self.entries.values().next().map(String::as_str))
    }
}

impl<R: Into<String>, C: Into<String>> FromIterator<(R, C)> for CertificationMap {
    fn from_iter<I: IntoIterator<Item = (R, C)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (region, certification) in iter {
            map.insert(region, certification);
        }
        map
    }
}
