//! Ancillary parameter resolution.
//!
//! Each of the four SSEBop parameters (dT, elevation, Tmax, Tcorr) is
//! configured with either a numeric constant or a named source keyword.
//! Keywords are parsed once at the configuration boundary into closed
//! enums; an unrecognized keyword is a fatal configuration error, never a
//! silent default. Tcorr is additionally resolved through a ranked
//! priority lookup: scene-specific beats monthly beats default beats
//! nothing, and a user-supplied constant bypasses the lookup entirely.

use crate::catalog::{datasets, Catalog, CollectionFilter, FeatureFilter};
use crate::image::Image;
use crate::types::{EtError, EtResult, PixelValue};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::model::SceneIdentity;

/// dT source: a constant, or a day-of-year median composite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DtSource {
    Constant(f64),
    DaymetMedianV0,
    DaymetMedianV1,
}

impl FromStr for DtSource {
    type Err = EtError;

    fn from_str(s: &str) -> EtResult<Self> {
        let trimmed = s.trim();
        if let Ok(value) = trimmed.parse::<f64>() {
            return Ok(DtSource::Constant(value));
        }
        match trimmed.to_uppercase().as_str() {
            "DAYMET_MEDIAN_V0" => Ok(DtSource::DaymetMedianV0),
            "DAYMET_MEDIAN_V1" => Ok(DtSource::DaymetMedianV1),
            _ => Err(EtError::InvalidParameterSource {
                parameter: "dt",
                detail: s.to_string(),
            }),
        }
    }
}

impl From<f64> for DtSource {
    fn from(value: f64) -> Self {
        DtSource::Constant(value)
    }
}

impl fmt::Display for DtSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DtSource::Constant(v) => write!(f, "{}", v),
            DtSource::DaymetMedianV0 => f.write_str("DAYMET_MEDIAN_V0"),
            DtSource::DaymetMedianV1 => f.write_str("DAYMET_MEDIAN_V1"),
        }
    }
}

/// Elevation source: a constant, a named dataset, or a direct asset id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ElevSource {
    Constant(f64),
    Asset,
    Gtopo,
    Ned,
    Srtm,
    /// Direct dataset id, recognized by its path-style prefix
    Dataset(String),
}

impl FromStr for ElevSource {
    type Err = EtError;

    fn from_str(s: &str) -> EtResult<Self> {
        let trimmed = s.trim();
        if let Ok(value) = trimmed.parse::<f64>() {
            return Ok(ElevSource::Constant(value));
        }
        match trimmed.to_uppercase().as_str() {
            "ASSET" => return Ok(ElevSource::Asset),
            "GTOPO" => return Ok(ElevSource::Gtopo),
            "NED" => return Ok(ElevSource::Ned),
            "SRTM" => return Ok(ElevSource::Srtm),
            _ => {}
        }
        let lower = trimmed.to_lowercase();
        if lower.starts_with("projects/") || lower.starts_with("users/") {
            return Ok(ElevSource::Dataset(trimmed.to_string()));
        }
        Err(EtError::InvalidParameterSource {
            parameter: "elev",
            detail: s.to_string(),
        })
    }
}

impl From<f64> for ElevSource {
    fn from(value: f64) -> Self {
        ElevSource::Constant(value)
    }
}

impl fmt::Display for ElevSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElevSource::Constant(v) => write!(f, "{}", v),
            ElevSource::Asset => f.write_str("ASSET"),
            ElevSource::Gtopo => f.write_str("GTOPO"),
            ElevSource::Ned => f.write_str("NED"),
            ElevSource::Srtm => f.write_str("SRTM"),
            ElevSource::Dataset(id) => f.write_str(id),
        }
    }
}

/// Tcorr source: a user constant, or the scene/monthly lookup chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TcorrSource {
    Constant(f64),
    Scene,
    Month,
}

impl FromStr for TcorrSource {
    type Err = EtError;

    fn from_str(s: &str) -> EtResult<Self> {
        let trimmed = s.trim();
        if let Ok(value) = trimmed.parse::<f64>() {
            return Ok(TcorrSource::Constant(value));
        }
        match trimmed.to_uppercase().as_str() {
            "SCENE" => Ok(TcorrSource::Scene),
            "MONTH" => Ok(TcorrSource::Month),
            _ => Err(EtError::InvalidParameterSource {
                parameter: "tcorr",
                detail: s.to_string(),
            }),
        }
    }
}

impl From<f64> for TcorrSource {
    fn from(value: f64) -> Self {
        TcorrSource::Constant(value)
    }
}

impl fmt::Display for TcorrSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TcorrSource::Constant(v) => write!(f, "{}", v),
            TcorrSource::Scene => f.write_str("SCENE"),
            TcorrSource::Month => f.write_str("MONTH"),
        }
    }
}

/// Tmax source: a constant, a daily dataset with median fallback, or a
/// day-of-year median composite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TmaxSource {
    Constant(f64),
    Cimis,
    Daymet,
    Gridmet,
    CimisMedianV1,
    DaymetMedianV0,
    DaymetMedianV1,
    GridmetMedianV1,
    TopowxMedianV0,
}

impl TmaxSource {
    /// Canonical keyword, used to key the Tcorr lookup tables.
    /// Constants have no keyword and therefore no Tcorr tables.
    pub fn keyword(&self) -> Option<&'static str> {
        match self {
            TmaxSource::Constant(_) => None,
            TmaxSource::Cimis => Some("CIMIS"),
            TmaxSource::Daymet => Some("DAYMET"),
            TmaxSource::Gridmet => Some("GRIDMET"),
            TmaxSource::CimisMedianV1 => Some("CIMIS_MEDIAN_V1"),
            TmaxSource::DaymetMedianV0 => Some("DAYMET_MEDIAN_V0"),
            TmaxSource::DaymetMedianV1 => Some("DAYMET_MEDIAN_V1"),
            TmaxSource::GridmetMedianV1 => Some("GRIDMET_MEDIAN_V1"),
            TmaxSource::TopowxMedianV0 => Some("TOPOWX_MEDIAN_V0"),
        }
    }
}

impl FromStr for TmaxSource {
    type Err = EtError;

    fn from_str(s: &str) -> EtResult<Self> {
        let trimmed = s.trim();
        if let Ok(value) = trimmed.parse::<f64>() {
            return Ok(TmaxSource::Constant(value));
        }
        match trimmed.to_uppercase().as_str() {
            "CIMIS" => Ok(TmaxSource::Cimis),
            "DAYMET" => Ok(TmaxSource::Daymet),
            "GRIDMET" => Ok(TmaxSource::Gridmet),
            "CIMIS_MEDIAN_V1" => Ok(TmaxSource::CimisMedianV1),
            "DAYMET_MEDIAN_V0" => Ok(TmaxSource::DaymetMedianV0),
            "DAYMET_MEDIAN_V1" => Ok(TmaxSource::DaymetMedianV1),
            "GRIDMET_MEDIAN_V1" => Ok(TmaxSource::GridmetMedianV1),
            "TOPOWX_MEDIAN_V0" => Ok(TmaxSource::TopowxMedianV0),
            _ => Err(EtError::InvalidParameterSource {
                parameter: "tmax",
                detail: s.to_string(),
            }),
        }
    }
}

impl From<f64> for TmaxSource {
    fn from(value: f64) -> Self {
        TmaxSource::Constant(value)
    }
}

impl fmt::Display for TmaxSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TmaxSource::Constant(v) => write!(f, "{}", v),
            other => f.write_str(other.keyword().unwrap_or("")),
        }
    }
}

/// Tcorr priority tier; lower index beats higher
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum TcorrTier {
    /// Scene-specific lookup hit
    Scene,
    /// Mean monthly value per WRS2 tile
    Month,
    /// Hard-coded default for the Tmax source
    Default,
    /// User-supplied constant
    User,
}

impl TcorrTier {
    pub fn index(self) -> u8 {
        match self {
            TcorrTier::Scene => 0,
            TcorrTier::Month => 1,
            TcorrTier::Default => 2,
            TcorrTier::User => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TcorrTier::Scene => "scene",
            TcorrTier::Month => "month",
            TcorrTier::Default => "default",
            TcorrTier::User => "user",
        }
    }
}

/// Resolved Tcorr value and the tier it came from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TcorrRecord {
    pub value: f64,
    pub tier: TcorrTier,
}

/// Resolve the dT image for a scene
pub fn dt_image(source: &DtSource, scene: &SceneIdentity) -> Image {
    match source {
        DtSource::Constant(value) => Image::constant(*value as PixelValue),
        DtSource::DaymetMedianV0 => dt_median(datasets::DT_DAYMET_MEDIAN_V0, scene.doy),
        DtSource::DaymetMedianV1 => dt_median(datasets::DT_DAYMET_MEDIAN_V1, scene.doy),
    }
}

fn dt_median(dataset: &str, doy: u32) -> Image {
    // dT values are clamped to 6-25 K when using the median composites
    Image::first_of(dataset, CollectionFilter::new().calendar_day(doy)).clamp(6.0, 25.0)
}

/// Resolve the elevation image, renamed to the canonical `elev` band
pub fn elev_image(source: &ElevSource) -> Image {
    let image = match source {
        ElevSource::Constant(value) => Image::constant(*value as PixelValue),
        ElevSource::Asset => Image::load(datasets::ELEV_ASSET),
        ElevSource::Gtopo => Image::load(datasets::ELEV_GTOPO),
        ElevSource::Ned => Image::load(datasets::ELEV_NED),
        ElevSource::Srtm => Image::load(datasets::ELEV_SRTM),
        ElevSource::Dataset(id) => Image::load(id),
    };
    image.rename("elev")
}

/// Daily Tmax source with a day-of-year median composite fallback
#[derive(Debug, Clone, Copy)]
struct DailyTmax {
    collection: &'static str,
    band: &'static str,
    /// Band is in Celsius and needs conversion to Kelvin
    celsius: bool,
    /// Extend the day window by one day (DAYMET omits Dec 31 on leap years)
    extend_end: bool,
    median_source: &'static str,
    median_version: &'static str,
}

/// Resolve the Tmax image for a scene.
///
/// Daily keywords fall back to the long-term median composite when no
/// daily image exists for the scene's UTC day window; the `TMAX_VERSION`
/// property records which one was used.
pub fn tmax_image(source: &TmaxSource, scene: &SceneIdentity) -> Image {
    let image = match source {
        TmaxSource::Constant(value) => {
            let value = *value;
            Image::constant(value as PixelValue)
                .rename("tmax")
                .set_property("TMAX_VERSION", format!("CUSTOM_{}", value))
        }
        TmaxSource::Cimis => daily_with_fallback(
            scene,
            DailyTmax {
                collection: datasets::TMAX_CIMIS_DAILY,
                band: "Tx",
                celsius: true,
                extend_end: false,
                median_source: "cimis",
                median_version: "median_v1",
            },
        ),
        TmaxSource::Daymet => daily_with_fallback(
            scene,
            DailyTmax {
                collection: datasets::TMAX_DAYMET_DAILY,
                band: "tmax",
                celsius: true,
                extend_end: true,
                median_source: "daymet",
                median_version: "median_v0",
            },
        ),
        TmaxSource::Gridmet => daily_with_fallback(
            scene,
            DailyTmax {
                collection: datasets::TMAX_GRIDMET_DAILY,
                band: "tmmx",
                celsius: false,
                extend_end: false,
                median_source: "gridmet",
                median_version: "median_v1",
            },
        ),
        TmaxSource::CimisMedianV1 => median_composite(scene.doy, "cimis", "median_v1"),
        TmaxSource::DaymetMedianV0 => median_composite(scene.doy, "daymet", "median_v0"),
        TmaxSource::DaymetMedianV1 => median_composite(scene.doy, "daymet", "median_v1"),
        TmaxSource::GridmetMedianV1 => median_composite(scene.doy, "gridmet", "median_v1"),
        TmaxSource::TopowxMedianV0 => median_composite(scene.doy, "topowx", "median_v0"),
    };
    image.set_property("TMAX_SOURCE", source.to_string())
}

fn daily_with_fallback(scene: &SceneIdentity, spec: DailyTmax) -> Image {
    let start = scene.day_start;
    let end = if spec.extend_end {
        scene.day_end + Duration::days(1)
    } else {
        scene.day_end
    };
    let doy = scene.doy;
    let today = Utc::now().format("%Y-%m-%d").to_string();
    let median_dataset = datasets::tmax_median_collection(spec.median_source, spec.median_version);

    Image::from_fn(move |cat| {
        let daily = cat.images(
            spec.collection,
            &CollectionFilter::new().date_range(start, end),
        )?;
        if let Some(first) = daily.into_iter().next() {
            let mut image = first.select(&[spec.band], &["tmax"])?;
            if spec.celsius {
                image = image.map_pixels(|v| v + 273.15);
            }
            image.set_property("TMAX_VERSION", today.as_str());
            Ok(image)
        } else {
            log::debug!(
                "no daily image in {} for doy {}, using {}",
                spec.collection,
                doy,
                median_dataset
            );
            let median = cat
                .images(&median_dataset, &CollectionFilter::new().calendar_day(doy))?
                .into_iter()
                .next()
                .ok_or_else(|| EtError::EmptyCollection(median_dataset.clone()))?;
            Ok(median.with_property("TMAX_VERSION", spec.median_version))
        }
    })
}

fn median_composite(doy: u32, source: &str, version: &'static str) -> Image {
    let dataset = datasets::tmax_median_collection(source, version);
    Image::first_of(&dataset, CollectionFilter::new().calendar_day(doy))
        .set_property("TMAX_VERSION", version)
}

/// Resolve Tcorr for a scene from the ranked priority tiers.
///
/// A numeric `tcorr_source` wins immediately with the user tier and no
/// lookup. Otherwise the default record for the Tmax keyword is always a
/// candidate, a monthly table hit (keyed by WRS2 tile and calendar month)
/// adds a second, and for the `SCENE` source a scene-table hit (keyed by
/// scene id) adds a third; the candidate with the lowest tier index wins.
/// Missing rows are expected, not errors.
pub fn resolve_tcorr(
    tcorr_source: &TcorrSource,
    tmax_source: &TmaxSource,
    scene: &SceneIdentity,
    catalog: &dyn Catalog,
) -> EtResult<TcorrRecord> {
    if let TcorrSource::Constant(value) = tcorr_source {
        return Ok(TcorrRecord {
            value: *value,
            tier: TcorrTier::User,
        });
    }

    let invalid_tmax = || EtError::InvalidParameterSource {
        parameter: "tmax",
        detail: tmax_source.to_string(),
    };
    let tmax_key = tmax_source.keyword().ok_or_else(invalid_tmax)?;
    let default_value = datasets::tcorr_default(tmax_key).ok_or_else(invalid_tmax)?;
    let month_table = datasets::tcorr_month_table(tmax_key).ok_or_else(invalid_tmax)?;

    let mut record = TcorrRecord {
        value: default_value,
        tier: TcorrTier::Default,
    };

    let month_rows = catalog.features(
        month_table,
        &FeatureFilter::new()
            .equals("WRS2_TILE", scene.wrs2_tile.as_str())
            .equals("MONTH", scene.month),
    )?;
    if let Some(value) = month_rows.first().and_then(|row| row.number("TCORR")) {
        let candidate = TcorrRecord {
            value,
            tier: TcorrTier::Month,
        };
        if candidate.tier < record.tier {
            record = candidate;
        }
    }

    if matches!(tcorr_source, TcorrSource::Scene) {
        let scene_table = datasets::tcorr_scene_table(tmax_key).ok_or_else(invalid_tmax)?;
        let scene_rows = catalog.features(
            scene_table,
            &FeatureFilter::new().equals("SCENE_ID", scene.scene_id.as_str()),
        )?;
        if let Some(value) = scene_rows.first().and_then(|row| row.number("TCORR")) {
            let candidate = TcorrRecord {
                value,
                tier: TcorrTier::Scene,
            };
            if candidate.tier < record.tier {
                record = candidate;
            }
        }
    }

    log::debug!(
        "tcorr {} for {} from {} tier",
        record.value,
        scene.scene_id,
        record.tier.name()
    );
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Feature, MemoryCatalog};
    use crate::types::Raster;
    use approx::assert_relative_eq;
    use chrono::TimeZone;

    fn scene() -> SceneIdentity {
        // 2015-08-05 18:20:00 UTC
        let millis = Utc
            .with_ymd_and_hms(2015, 8, 5, 18, 20, 0)
            .single()
            .unwrap()
            .timestamp_millis();
        SceneIdentity::from_properties("LC08_043033_20150805", millis).unwrap()
    }

    fn tmax_raster_at(millis: i64, band: &str, value: f32) -> Raster {
        Raster::new()
            .with_band(band, value)
            .with_property("system:time_start", millis)
    }

    #[test]
    fn test_source_parsing() {
        assert_eq!(
            "daymet_median_v1".parse::<DtSource>().unwrap(),
            DtSource::DaymetMedianV1
        );
        assert_eq!("19.5".parse::<DtSource>().unwrap(), DtSource::Constant(19.5));
        assert!(matches!(
            "GRIDMET".parse::<DtSource>(),
            Err(EtError::InvalidParameterSource { parameter: "dt", .. })
        ));

        assert_eq!("asset".parse::<ElevSource>().unwrap(), ElevSource::Asset);
        assert_eq!(
            "projects/usgs-ssebop/srtm_1km".parse::<ElevSource>().unwrap(),
            ElevSource::Dataset("projects/usgs-ssebop/srtm_1km".to_string())
        );
        assert!("DEM".parse::<ElevSource>().is_err());

        assert_eq!("scene".parse::<TcorrSource>().unwrap(), TcorrSource::Scene);
        assert_eq!(
            "0.95".parse::<TcorrSource>().unwrap(),
            TcorrSource::Constant(0.95)
        );
        assert!("ANNUAL".parse::<TcorrSource>().is_err());

        assert_eq!(
            "topowx_median_v0".parse::<TmaxSource>().unwrap(),
            TmaxSource::TopowxMedianV0
        );
        assert!("TOPOWX".parse::<TmaxSource>().is_err());
    }

    #[test]
    fn test_dt_median_is_clamped() {
        let mut catalog = MemoryCatalog::new();
        let millis = scene().acquired.timestamp_millis();
        catalog.insert_image(
            datasets::DT_DAYMET_MEDIAN_V1,
            tmax_raster_at(millis, "dt", 30.0),
        );

        let image = dt_image(&DtSource::DaymetMedianV1, &scene());
        let raster = image.evaluate(&catalog).unwrap();
        assert_eq!(
            raster.first_band().unwrap().data.value_at(0, 0),
            Some(25.0)
        );
    }

    #[test]
    fn test_dt_constant() {
        let image = dt_image(&DtSource::Constant(18.0), &scene());
        let raster = image.evaluate(&MemoryCatalog::new()).unwrap();
        assert_eq!(
            raster.first_band().unwrap().data.value_at(0, 0),
            Some(18.0)
        );
    }

    #[test]
    fn test_elev_band_is_canonical() {
        let mut catalog = MemoryCatalog::new();
        catalog.insert_image(
            datasets::ELEV_ASSET,
            Raster::new().with_band("elevation", 1500.0),
        );
        let raster = elev_image(&ElevSource::Asset).evaluate(&catalog).unwrap();
        assert_eq!(raster.band_names(), vec!["elev"]);
    }

    #[test]
    fn test_tmax_daily_hit_is_tagged_with_today() {
        let mut catalog = MemoryCatalog::new();
        let s = scene();
        catalog.insert_image(
            datasets::TMAX_DAYMET_DAILY,
            tmax_raster_at(s.day_start.timestamp_millis(), "tmax", 30.0),
        );

        let raster = tmax_image(&TmaxSource::Daymet, &s)
            .evaluate(&catalog)
            .unwrap();
        let today = Utc::now().format("%Y-%m-%d").to_string();
        assert_eq!(raster.text_property("TMAX_VERSION").unwrap(), today);
        assert_eq!(raster.text_property("TMAX_SOURCE").unwrap(), "DAYMET");
        // Celsius input converted to Kelvin
        let v = raster.band("tmax").unwrap().value_at(0, 0).unwrap();
        assert_relative_eq!(v, 303.15, epsilon = 1e-3);
    }

    #[test]
    fn test_tmax_daily_miss_falls_back_to_median() {
        let mut catalog = MemoryCatalog::new();
        let s = scene();
        catalog.insert_image(
            &datasets::tmax_median_collection("daymet", "median_v0"),
            tmax_raster_at(s.day_start.timestamp_millis(), "tmax", 305.0),
        );

        let raster = tmax_image(&TmaxSource::Daymet, &s)
            .evaluate(&catalog)
            .unwrap();
        assert_eq!(raster.text_property("TMAX_VERSION").unwrap(), "median_v0");
    }

    #[test]
    fn test_tmax_gridmet_stays_in_kelvin() {
        let mut catalog = MemoryCatalog::new();
        let s = scene();
        catalog.insert_image(
            datasets::TMAX_GRIDMET_DAILY,
            tmax_raster_at(s.day_start.timestamp_millis(), "tmmx", 305.0),
        );

        let raster = tmax_image(&TmaxSource::Gridmet, &s)
            .evaluate(&catalog)
            .unwrap();
        assert_eq!(raster.band_names(), vec!["tmax"]);
        assert_eq!(raster.band("tmax").unwrap().value_at(0, 0), Some(305.0));
    }

    #[test]
    fn test_tmax_constant_version_tag() {
        let raster = tmax_image(&TmaxSource::Constant(305.0), &scene())
            .evaluate(&MemoryCatalog::new())
            .unwrap();
        assert_eq!(raster.text_property("TMAX_VERSION").unwrap(), "CUSTOM_305");
        assert_eq!(raster.text_property("TMAX_SOURCE").unwrap(), "305");
    }

    #[test]
    fn test_tcorr_user_constant_bypasses_lookup() {
        let record = resolve_tcorr(
            &TcorrSource::Constant(0.95),
            &TmaxSource::TopowxMedianV0,
            &scene(),
            &MemoryCatalog::new(),
        )
        .unwrap();
        assert_eq!(record.value, 0.95);
        assert_eq!(record.tier, TcorrTier::User);
        assert_eq!(record.tier.index(), 3);
    }

    #[test]
    fn test_tcorr_priority_order() {
        let s = scene();
        let mut catalog = MemoryCatalog::new();
        catalog.insert_features(
            datasets::tcorr_month_table("TOPOWX_MEDIAN_V0").unwrap(),
            vec![Feature::new()
                .with_property("WRS2_TILE", "p043r033")
                .with_property("MONTH", 8u32)
                .with_property("TCORR", 0.981)],
        );

        // month hit only
        let record = resolve_tcorr(
            &TcorrSource::Scene,
            &TmaxSource::TopowxMedianV0,
            &s,
            &catalog,
        )
        .unwrap();
        assert_eq!(record.tier, TcorrTier::Month);
        assert_relative_eq!(record.value, 0.981);

        // scene hit beats the month hit
        catalog.insert_features(
            datasets::tcorr_scene_table("TOPOWX_MEDIAN_V0").unwrap(),
            vec![Feature::new()
                .with_property("SCENE_ID", "LC08_043033_20150805")
                .with_property("TCORR", 0.9838)],
        );
        let record = resolve_tcorr(
            &TcorrSource::Scene,
            &TmaxSource::TopowxMedianV0,
            &s,
            &catalog,
        )
        .unwrap();
        assert_eq!(record.tier, TcorrTier::Scene);
        assert_eq!(record.tier.index(), 0);
        assert_relative_eq!(record.value, 0.9838);

        // MONTH source skips the scene table entirely
        let record = resolve_tcorr(
            &TcorrSource::Month,
            &TmaxSource::TopowxMedianV0,
            &s,
            &catalog,
        )
        .unwrap();
        assert_eq!(record.tier, TcorrTier::Month);
    }

    #[test]
    fn test_tcorr_default_when_no_rows_match() {
        let record = resolve_tcorr(
            &TcorrSource::Scene,
            &TmaxSource::TopowxMedianV0,
            &scene(),
            &MemoryCatalog::new(),
        )
        .unwrap();
        assert_eq!(record.tier, TcorrTier::Default);
        assert_relative_eq!(record.value, 0.978);
    }

    #[test]
    fn test_tcorr_rejects_numeric_tmax() {
        let err = resolve_tcorr(
            &TcorrSource::Scene,
            &TmaxSource::Constant(305.0),
            &scene(),
            &MemoryCatalog::new(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            EtError::InvalidParameterSource { parameter: "tmax", .. }
        ));
    }
}
