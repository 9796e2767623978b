//! Collection building and the temporal interpolation handoff.
//!
//! Maps the per-scene pipeline over every raw scene of the configured
//! sensor collections inside a date range and region, merges the results
//! into one time-spanning collection, and hands it to the external
//! [`Interpolator`] together with the daily reference-ET signal. The
//! requested variable and every collection id are validated before any
//! scene is touched.

use crate::catalog::{datasets, Catalog, CollectionFilter};
use crate::image::Image;
use crate::types::{EtError, EtResult, GeoBounds};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::model::{ModelConfig, SsebopImage, Variable};

/// Landsat Collection 1 TOA collections the model accepts
pub const LANDSAT_C1_TOA_COLLECTIONS: [&str; 5] = [
    "LANDSAT/LC08/C01/T1_RT_TOA",
    "LANDSAT/LE07/C01/T1_RT_TOA",
    "LANDSAT/LC08/C01/T1_TOA",
    "LANDSAT/LE07/C01/T1_TOA",
    "LANDSAT/LT05/C01/T1_TOA",
];

/// Interpolation window in days, fixed by the interpolation contract
pub const INTERP_DAYS: u32 = 32;

/// Interpolation method understood by the external service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InterpMethod {
    Linear,
}

/// Temporal aggregation requested from the external service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeInterval {
    Daily,
    Monthly,
    Annual,
    /// Values only for the observation (overpass) dates
    Overpass,
}

impl FromStr for TimeInterval {
    type Err = EtError;

    fn from_str(s: &str) -> EtResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(TimeInterval::Daily),
            "monthly" => Ok(TimeInterval::Monthly),
            "annual" => Ok(TimeInterval::Annual),
            "overpass" => Ok(TimeInterval::Overpass),
            _ => Err(EtError::InvalidParameterSource {
                parameter: "t_interval",
                detail: s.to_string(),
            }),
        }
    }
}

/// Parameters forwarded to the external interpolation service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterpSpec {
    pub interval: TimeInterval,
    pub interp_days: u32,
    pub method: InterpMethod,
}

impl InterpSpec {
    pub fn new(interval: TimeInterval) -> Self {
        Self {
            interval,
            interp_days: INTERP_DAYS,
            method: InterpMethod::Linear,
        }
    }
}

/// Time-ordered multiset of lazy per-scene images
#[derive(Debug, Clone, Default)]
pub struct TimeSeriesCollection {
    images: Vec<Image>,
}

impl TimeSeriesCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_images(images: Vec<Image>) -> Self {
        Self { images }
    }

    pub fn push(&mut self, image: Image) {
        self.images.push(image);
    }

    /// Append another collection. Merge order across sub-collections is
    /// not significant; only timestamp order matters downstream.
    pub fn merge(&mut self, other: TimeSeriesCollection) {
        self.images.extend(other.images);
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn images(&self) -> &[Image] {
        &self.images
    }

    pub fn into_images(self) -> Vec<Image> {
        self.images
    }

    /// Sort by the `system:time_start` property; images without one sink
    /// to the end
    pub fn sort_by_time(&mut self) {
        self.images.sort_by_key(|img| {
            img.number_property("system:time_start")
                .map(|ms| ms as i64)
                .unwrap_or(i64::MAX)
        });
    }
}

impl IntoIterator for TimeSeriesCollection {
    type Item = Image;
    type IntoIter = std::vec::IntoIter<Image>;

    fn into_iter(self) -> Self::IntoIter {
        self.images.into_iter()
    }
}

/// The external temporal interpolation service: a smooth daily reference
/// signal plus a sparse per-scene signal in, a regular series out.
pub trait Interpolator {
    fn interpolate(
        &self,
        reference: &TimeSeriesCollection,
        scenes: &TimeSeriesCollection,
        spec: &InterpSpec,
    ) -> EtResult<TimeSeriesCollection>;
}

/// Build the requested variable across every configured sensor collection
/// and interpolate it to the requested interval.
///
/// The date range is `[start_date, end_date)`. Validation is eager: an
/// unsupported variable or collection id aborts before any scene is
/// processed.
#[allow(clippy::too_many_arguments)]
pub fn build_variable_collection(
    variable: &str,
    collections: &[&str],
    start_date: NaiveDate,
    end_date: NaiveDate,
    geometry: GeoBounds,
    interval: TimeInterval,
    config: &ModelConfig,
    catalog: &dyn Catalog,
    interpolator: &dyn Interpolator,
) -> EtResult<TimeSeriesCollection> {
    let variable = variable.parse::<Variable>()?;
    for id in collections {
        if !LANDSAT_C1_TOA_COLLECTIONS.contains(id) {
            return Err(EtError::UnsupportedCollection(id.to_string()));
        }
    }

    let start = start_date.and_time(NaiveTime::MIN).and_utc();
    let end = end_date.and_time(NaiveTime::MIN).and_utc();

    let mut merged = TimeSeriesCollection::new();
    for id in collections {
        let filter = CollectionFilter::new()
            .date_range(start, end)
            .bounds(geometry);
        let scenes = catalog.images(id, &filter)?;
        log::info!("{}: {} scenes", id, scenes.len());

        #[cfg(feature = "parallel")]
        let images = {
            use rayon::prelude::*;
            scenes
                .par_iter()
                .map(|raw| {
                    Ok(SsebopImage::from_landsat_c1_toa(raw, config.clone())?.variable(variable))
                })
                .collect::<EtResult<Vec<Image>>>()?
        };

        #[cfg(not(feature = "parallel"))]
        let images = scenes
            .iter()
            .map(|raw| {
                Ok(SsebopImage::from_landsat_c1_toa(raw, config.clone())?.variable(variable))
            })
            .collect::<EtResult<Vec<Image>>>()?;

        merged.merge(TimeSeriesCollection::from_images(images));
    }

    let reference = reference_et_collection(catalog, start_date, end_date)?;
    interpolator.interpolate(&reference, &merged, &InterpSpec::new(interval))
}

/// Daily reference evapotranspiration, filtered to the date range and
/// restricted to the reference band
fn reference_et_collection(
    catalog: &dyn Catalog,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> EtResult<TimeSeriesCollection> {
    let start = start_date.and_time(NaiveTime::MIN).and_utc();
    let end = end_date.and_time(NaiveTime::MIN).and_utc();
    let rasters = catalog.images(
        datasets::REFERENCE_ET_COLLECTION,
        &CollectionFilter::new().date_range(start, end),
    )?;
    log::debug!(
        "{}: {} reference images",
        datasets::REFERENCE_ET_COLLECTION,
        rasters.len()
    );

    let mut images = Vec::with_capacity(rasters.len());
    for raster in rasters {
        let selected = raster.select(
            &[datasets::REFERENCE_ET_BAND],
            &[datasets::REFERENCE_ET_BAND],
        )?;
        images.push(Image::from_raster(selected));
    }
    Ok(TimeSeriesCollection::from_images(images))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_interval_parsing() {
        assert_eq!("daily".parse::<TimeInterval>().unwrap(), TimeInterval::Daily);
        assert_eq!(
            "OVERPASS".parse::<TimeInterval>().unwrap(),
            TimeInterval::Overpass
        );
        assert!("weekly".parse::<TimeInterval>().is_err());
    }

    #[test]
    fn test_interp_spec_defaults() {
        let spec = InterpSpec::new(TimeInterval::Monthly);
        assert_eq!(spec.interp_days, 32);
        assert_eq!(spec.method, InterpMethod::Linear);
    }

    #[test]
    fn test_sort_by_time() {
        let at = |ms: i64| Image::constant(0.5).set_property("system:time_start", ms);
        let mut collection =
            TimeSeriesCollection::from_images(vec![at(300), at(100), at(200)]);
        collection.sort_by_time();
        let times: Vec<f64> = collection
            .images()
            .iter()
            .map(|img| img.number_property("system:time_start").unwrap())
            .collect();
        assert_eq!(times, vec![100.0, 200.0, 300.0]);
    }
}
