//! Catalog substrate interface.
//!
//! All dataset access goes through the [`Catalog`] trait: single images,
//! date/geometry-filtered image collections, and feature-table lookups.
//! The distributed raster store behind it is somebody else's problem;
//! [`MemoryCatalog`] is an in-process implementation for tests and
//! embedding.

pub mod datasets;
pub mod memory;

pub use memory::MemoryCatalog;

use crate::types::{EtResult, GeoBounds, PropertyValue, Raster};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Filter for image-collection queries
#[derive(Debug, Clone, Default)]
pub struct CollectionFilter {
    /// Inclusive start of the date range
    pub start: Option<DateTime<Utc>>,
    /// Exclusive end of the date range
    pub end: Option<DateTime<Utc>>,
    /// Calendar day-of-year (1..=366) match
    pub day_of_year: Option<u32>,
    /// Geographic intersection
    pub bounds: Option<GeoBounds>,
}

impl CollectionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to acquisitions in `[start, end)`
    pub fn date_range(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    /// Restrict to acquisitions on a calendar day-of-year
    pub fn calendar_day(mut self, doy: u32) -> Self {
        self.day_of_year = Some(doy);
        self
    }

    /// Restrict to images intersecting a bounding box
    pub fn bounds(mut self, bounds: GeoBounds) -> Self {
        self.bounds = Some(bounds);
        self
    }
}

/// Row of a feature lookup table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    properties: BTreeMap<String, PropertyValue>,
}

impl Feature {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_property(mut self, key: &str, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(key.to_string(), value.into());
        self
    }

    pub fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        self.property(key).and_then(|v| v.as_number())
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.property(key).and_then(|v| v.as_text())
    }
}

/// Property-equality filter for feature-table queries
#[derive(Debug, Clone, Default)]
pub struct FeatureFilter {
    equals: Vec<(String, PropertyValue)>,
}

impl FeatureFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn equals(mut self, key: &str, value: impl Into<PropertyValue>) -> Self {
        self.equals.push((key.to_string(), value.into()));
        self
    }

    pub fn matches(&self, feature: &Feature) -> bool {
        self.equals
            .iter()
            .all(|(key, value)| feature.property(key) == Some(value))
    }
}

/// The external raster/feature store.
///
/// Implementations are expected to be read-only and idempotent: the lazy
/// image graph may issue the same query more than once and must observe
/// the same answer.
pub trait Catalog: Send + Sync {
    /// Fetch a single image by dataset id
    fn image(&self, dataset: &str) -> EtResult<Raster>;

    /// Fetch the images of a collection matching a filter, ordered by
    /// acquisition time. An unknown or fully-filtered dataset yields an
    /// empty vec, not an error; absence is meaningful to callers.
    fn images(&self, dataset: &str, filter: &CollectionFilter) -> EtResult<Vec<Raster>>;

    /// Fetch the rows of a feature table matching a filter. Missing rows
    /// are expected (they drive fallback logic) and yield an empty vec.
    fn features(&self, dataset: &str, filter: &FeatureFilter) -> EtResult<Vec<Feature>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_filter_matches_all_clauses() {
        let feature = Feature::new()
            .with_property("WRS2_TILE", "p043r033")
            .with_property("MONTH", 7.0)
            .with_property("TCORR", 0.9838);

        let hit = FeatureFilter::new()
            .equals("WRS2_TILE", "p043r033")
            .equals("MONTH", 7.0);
        let miss = FeatureFilter::new()
            .equals("WRS2_TILE", "p043r033")
            .equals("MONTH", 8.0);

        assert!(hit.matches(&feature));
        assert!(!miss.matches(&feature));
    }
}
