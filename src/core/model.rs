//! The per-scene SSEBop model.
//!
//! [`SsebopImage`] wraps a prepped input image (bands `ndvi` and `lst`
//! plus the Landsat-style `system:index` / `system:time_start`
//! properties) together with a [`ModelConfig`], derives the scene
//! identity once at construction, and exposes the lazily-built, memoized
//! `etf` graph. Nothing here touches a catalog until the graph is
//! evaluated.

use crate::image::Image;
use crate::types::{EtError, EtResult, PixelValue, Raster};
use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use once_cell::sync::{Lazy, OnceCell};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;

use super::landsat;
use super::parameters::{
    dt_image, elev_image, resolve_tcorr, tmax_image, DtSource, ElevSource, TcorrSource,
    TmaxSource,
};
use super::{etf, radiometry};

/// Milliseconds per UTC day, for flooring acquisition instants
const DAY_MILLIS: i64 = 86_400_000;

/// Landsat scene id shape: sensor, path/row, acquisition date
static SCENE_ID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Z0-9]{4}_\d{6}_\d{8}$").expect("scene id pattern is valid")
});

/// Immutable per-observation identity, derived once from the source
/// image's `system:index` and `system:time_start` properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneIdentity {
    /// Full source collection index (possibly merge-prefixed)
    pub index: String,
    /// Trailing three tokens of the index, e.g. `LC08_043033_20150805`
    pub scene_id: String,
    /// WRS2 path/row tile, e.g. `p043r033`
    pub wrs2_tile: String,
    /// Acquisition instant
    pub acquired: DateTime<Utc>,
    pub year: i32,
    pub month: u32,
    /// Day of year, 1-based
    pub doy: u32,
    /// Start of the UTC day bucket containing the acquisition
    pub day_start: DateTime<Utc>,
    /// Exclusive end of the UTC day bucket
    pub day_end: DateTime<Utc>,
}

impl SceneIdentity {
    /// Derive the identity from a Landsat-style collection index and an
    /// epoch-millisecond acquisition time.
    ///
    /// The scene id is the trailing three `_`-joined tokens of the index
    /// and must match the Landsat shape; anything else is rejected rather
    /// than silently producing a garbage WRS2 tile.
    pub fn from_properties(index: &str, time_start_millis: i64) -> EtResult<Self> {
        let tokens: Vec<&str> = index.split('_').collect();
        if tokens.len() < 3 {
            return Err(EtError::MalformedSceneIdentity(index.to_string()));
        }
        let scene_id = tokens[tokens.len() - 3..].join("_");
        if !SCENE_ID_RE.is_match(&scene_id) {
            return Err(EtError::MalformedSceneIdentity(index.to_string()));
        }
        let wrs2_tile = format!("p{}r{}", &scene_id[5..8], &scene_id[8..11]);

        let acquired = Utc
            .timestamp_millis_opt(time_start_millis)
            .single()
            .ok_or_else(|| {
                EtError::MalformedSceneIdentity(format!(
                    "{}: bad system:time_start {}",
                    index, time_start_millis
                ))
            })?;
        let day_floor = time_start_millis - time_start_millis.rem_euclid(DAY_MILLIS);
        let day_start = Utc
            .timestamp_millis_opt(day_floor)
            .single()
            .ok_or_else(|| {
                EtError::MalformedSceneIdentity(format!(
                    "{}: bad system:time_start {}",
                    index, time_start_millis
                ))
            })?;

        Ok(Self {
            index: index.to_string(),
            scene_id,
            wrs2_tile,
            acquired,
            year: acquired.year(),
            month: acquired.month(),
            doy: acquired.ordinal(),
            day_start,
            day_end: day_start + Duration::days(1),
        })
    }
}

/// Immutable model configuration for one image instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub dt_source: DtSource,
    pub elev_source: ElevSource,
    pub tcorr_source: TcorrSource,
    pub tmax_source: TmaxSource,
    /// Elevation Lapse Rate adjustment flag; carried but not consumed
    pub elr_flag: bool,
    /// Tdiff cloud mask buffer in Kelvin
    pub tdiff_threshold: PixelValue,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            dt_source: DtSource::DaymetMedianV1,
            elev_source: ElevSource::Asset,
            tcorr_source: TcorrSource::Scene,
            tmax_source: TmaxSource::TopowxMedianV0,
            elr_flag: false,
            tdiff_threshold: 15.0,
        }
    }
}

impl ModelConfig {
    /// Parse the four source selectors from keyword strings (or numeric
    /// literals). Case is normalized here, at the boundary.
    pub fn from_keywords(dt: &str, elev: &str, tcorr: &str, tmax: &str) -> EtResult<Self> {
        Ok(Self {
            dt_source: dt.parse()?,
            elev_source: elev.parse()?,
            tcorr_source: tcorr.parse()?,
            tmax_source: tmax.parse()?,
            ..Self::default()
        })
    }
}

/// Output variable the model can compute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Variable {
    Etf,
}

impl FromStr for Variable {
    type Err = EtError;

    fn from_str(s: &str) -> EtResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "etf" => Ok(Variable::Etf),
            _ => Err(EtError::UnsupportedVariable(s.to_string())),
        }
    }
}

/// A single SSEBop observation: prepped input bands, scene identity, and
/// configuration. The `etf` graph is built at most once per instance.
#[derive(Debug)]
pub struct SsebopImage {
    input: Image,
    scene: SceneIdentity,
    config: ModelConfig,
    etf: OnceCell<Image>,
}

impl SsebopImage {
    /// Construct from a prepped input image carrying `ndvi` and `lst`
    /// bands and the Landsat-style identity properties.
    pub fn new(input: Image, config: ModelConfig) -> EtResult<Self> {
        let index = input.text_property("system:index")?.to_string();
        let time_start = input.number_property("system:time_start")? as i64;
        let scene = SceneIdentity::from_properties(&index, time_start)?;
        Ok(Self {
            input,
            scene,
            config,
            etf: OnceCell::new(),
        })
    }

    /// Construct from a raw Landsat Collection 1 TOA scene.
    ///
    /// Band remapping happens eagerly (it is a metadata operation); the
    /// NDVI and LST derivations are deferred into the input graph.
    pub fn from_landsat_c1_toa(raw: &Raster, config: ModelConfig) -> EtResult<Self> {
        let prepped = Arc::new(landsat::prep_landsat_c1_toa(raw)?);
        let index = prepped.text_property("system:index")?.to_string();
        let time_start = prepped.time_start()?;

        let source = prepped.clone();
        let input = Image::from_fn(move |_cat| {
            let mut out = Raster::new();
            out.push_band("lst", radiometry::lst(&source)?);
            out.push_band("ndvi", radiometry::ndvi(&source)?);
            if let Some(bounds) = source.footprint() {
                out.set_footprint(bounds);
            }
            Ok(out)
        })
        .set_property("system:index", index.as_str())
        .set_property("system:time_start", time_start);

        Self::new(input, config)
    }

    pub fn scene(&self) -> &SceneIdentity {
        &self.scene
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Lazy NDVI band of the prepped input
    pub fn ndvi(&self) -> Image {
        self.input.band("ndvi")
    }

    /// Lazy emissivity-corrected LST band of the prepped input
    pub fn lst(&self) -> Image {
        self.input.band("lst")
    }

    /// Lazy dT parameter image for this scene
    pub fn dt(&self) -> Image {
        dt_image(&self.config.dt_source, &self.scene)
    }

    /// Lazy Tmax parameter image for this scene
    pub fn tmax(&self) -> Image {
        tmax_image(&self.config.tmax_source, &self.scene)
    }

    /// Lazy elevation image (canonical `elev` band). Resolved on request;
    /// the ETf computation itself does not consume it.
    pub fn elevation(&self) -> Image {
        elev_image(&self.config.elev_source)
    }

    /// The SSEBop ETf image for this scene.
    ///
    /// The graph is built once and memoized; repeated calls return the
    /// same shared graph. All lookups (Tcorr tables, Tmax/dT datasets)
    /// are deferred to evaluation and are idempotent against the catalog.
    pub fn etf(&self) -> Image {
        self.etf
            .get_or_init(|| {
                let lst = self.lst();
                let tmax = self.tmax();
                let dt = self.dt();
                let scene = self.scene.clone();
                let config = self.config.clone();
                Image::from_fn(move |cat| {
                    let tcorr = resolve_tcorr(
                        &config.tcorr_source,
                        &config.tmax_source,
                        &scene,
                        cat,
                    )?;
                    let lst = lst.evaluate(cat)?;
                    let tmax = tmax.evaluate(cat)?;
                    let dt = dt.evaluate(cat)?;
                    etf::compute(&lst, &tmax, &dt, &tcorr, config.tdiff_threshold, &scene)
                })
                .set_property("system:index", self.scene.index.as_str())
                .set_property(
                    "system:time_start",
                    self.scene.acquired.timestamp_millis(),
                )
            })
            .clone()
    }

    /// Dispatch a requested output variable to its graph
    pub fn variable(&self, variable: Variable) -> Image {
        match variable {
            Variable::Etf => self.etf(),
        }
    }
}
