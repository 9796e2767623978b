//! In-memory catalog.
//!
//! Backs tests and single-process embedding. Image collections are keyed
//! by dataset id and filtered on the `system:time_start` property (epoch
//! milliseconds): date ranges compare it directly and the day-of-year
//! filter derives the calendar ordinal from it. Geographic filtering uses
//! each raster's footprint; rasters without one always pass.

use super::{Catalog, CollectionFilter, Feature, FeatureFilter};
use crate::types::{EtError, EtResult, Raster};
use chrono::{Datelike, TimeZone, Utc};
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct MemoryCatalog {
    images: HashMap<String, Vec<Raster>>,
    features: HashMap<String, Vec<Feature>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an image to a dataset, creating the dataset if needed
    pub fn insert_image(&mut self, dataset: &str, raster: Raster) {
        self.images
            .entry(dataset.to_string())
            .or_default()
            .push(raster);
    }

    /// Add rows to a feature table, creating the table if needed
    pub fn insert_features(&mut self, dataset: &str, rows: Vec<Feature>) {
        self.features
            .entry(dataset.to_string())
            .or_default()
            .extend(rows);
    }

    fn matches(raster: &Raster, filter: &CollectionFilter) -> bool {
        if filter.start.is_some() || filter.end.is_some() || filter.day_of_year.is_some() {
            let millis = match raster.time_start() {
                Ok(ms) => ms,
                Err(_) => return false,
            };
            if let Some(start) = filter.start {
                if millis < start.timestamp_millis() {
                    return false;
                }
            }
            if let Some(end) = filter.end {
                if millis >= end.timestamp_millis() {
                    return false;
                }
            }
            if let Some(doy) = filter.day_of_year {
                let acquired = match Utc.timestamp_millis_opt(millis).single() {
                    Some(t) => t,
                    None => return false,
                };
                if acquired.ordinal() != doy {
                    return false;
                }
            }
        }
        if let (Some(bounds), Some(footprint)) = (filter.bounds, raster.footprint()) {
            if !footprint.intersects(&bounds) {
                return false;
            }
        }
        true
    }
}

impl Catalog for MemoryCatalog {
    fn image(&self, dataset: &str) -> EtResult<Raster> {
        self.images
            .get(dataset)
            .and_then(|items| items.first())
            .cloned()
            .ok_or_else(|| EtError::Catalog(format!("no image for dataset: {}", dataset)))
    }

    fn images(&self, dataset: &str, filter: &CollectionFilter) -> EtResult<Vec<Raster>> {
        let mut matched: Vec<Raster> = self
            .images
            .get(dataset)
            .map(|items| {
                items
                    .iter()
                    .filter(|r| Self::matches(r, filter))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        matched.sort_by_key(|r| r.time_start().unwrap_or(i64::MAX));
        Ok(matched)
    }

    fn features(&self, dataset: &str, filter: &FeatureFilter) -> EtResult<Vec<Feature>> {
        Ok(self
            .features
            .get(dataset)
            .map(|rows| rows.iter().filter(|f| filter.matches(f)).cloned().collect())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GeoBounds;
    use chrono::NaiveDate;

    fn raster_at(date: NaiveDate) -> Raster {
        let millis = date
            .and_time(chrono::NaiveTime::MIN)
            .and_utc()
            .timestamp_millis();
        Raster::new()
            .with_band("tmax", 305.0)
            .with_property("system:time_start", millis)
    }

    #[test]
    fn test_date_range_is_half_open() {
        let mut catalog = MemoryCatalog::new();
        let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day).unwrap();
        catalog.insert_image("daily", raster_at(d(2015, 8, 4)));
        catalog.insert_image("daily", raster_at(d(2015, 8, 5)));
        catalog.insert_image("daily", raster_at(d(2015, 8, 6)));

        let start = d(2015, 8, 5).and_time(chrono::NaiveTime::MIN).and_utc();
        let end = d(2015, 8, 6).and_time(chrono::NaiveTime::MIN).and_utc();
        let hits = catalog
            .images("daily", &CollectionFilter::new().date_range(start, end))
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(
            hits[0].time_start().unwrap(),
            start.timestamp_millis()
        );
    }

    #[test]
    fn test_day_of_year_filter() {
        let mut catalog = MemoryCatalog::new();
        let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day).unwrap();
        // Aug 5 is doy 217 in a non-leap year
        catalog.insert_image("median", raster_at(d(2015, 8, 5)));
        catalog.insert_image("median", raster_at(d(2015, 8, 6)));

        let hits = catalog
            .images("median", &CollectionFilter::new().calendar_day(217))
            .unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_bounds_filter_and_unknown_dataset() {
        let mut catalog = MemoryCatalog::new();
        let d = NaiveDate::from_ymd_opt(2015, 8, 5).unwrap();
        catalog.insert_image(
            "scenes",
            raster_at(d).with_footprint(GeoBounds::new(-120.0, -119.0, 38.0, 39.0)),
        );

        let inside = CollectionFilter::new().bounds(GeoBounds::new(-119.5, -119.2, 38.2, 38.8));
        let outside = CollectionFilter::new().bounds(GeoBounds::new(-60.0, -59.0, 10.0, 11.0));
        assert_eq!(catalog.images("scenes", &inside).unwrap().len(), 1);
        assert_eq!(catalog.images("scenes", &outside).unwrap().len(), 0);

        // Unknown collections are empty, not errors; unknown single images fail
        assert!(catalog.images("nope", &CollectionFilter::new()).unwrap().is_empty());
        assert!(catalog.image("nope").is_err());
    }
}
