use ndarray::{Array2, Zip};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-pixel value type; NaN marks nodata
pub type PixelValue = f32;

/// 2D single-band pixel grid (rows x cols)
pub type Grid = Array2<PixelValue>;

/// Nodata sentinel used by all masking operations
pub const NODATA: PixelValue = PixelValue::NAN;

/// Scalar metadata attached to rasters, features, and lazy images
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    Text(String),
    Number(f64),
}

impl PropertyValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(s) => Some(s),
            PropertyValue::Number(_) => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            PropertyValue::Number(v) => Some(*v),
            PropertyValue::Text(_) => None,
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::Text(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::Text(s)
    }
}

impl From<f64> for PropertyValue {
    fn from(v: f64) -> Self {
        PropertyValue::Number(v)
    }
}

impl From<f32> for PropertyValue {
    fn from(v: f32) -> Self {
        PropertyValue::Number(v as f64)
    }
}

impl From<i64> for PropertyValue {
    fn from(v: i64) -> Self {
        PropertyValue::Number(v as f64)
    }
}

impl From<u32> for PropertyValue {
    fn from(v: u32) -> Self {
        PropertyValue::Number(v as f64)
    }
}

/// Geographic bounding box in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub min_lon: f64,
    pub max_lon: f64,
    pub min_lat: f64,
    pub max_lat: f64,
}

impl GeoBounds {
    pub fn new(min_lon: f64, max_lon: f64, min_lat: f64, max_lat: f64) -> Self {
        Self {
            min_lon,
            max_lon,
            min_lat,
            max_lat,
        }
    }

    pub fn intersects(&self, other: &GeoBounds) -> bool {
        self.min_lon <= other.max_lon
            && self.max_lon >= other.min_lon
            && self.min_lat <= other.max_lat
            && self.max_lat >= other.min_lat
    }
}

/// Pixel payload of a single band: a full grid, or a constant fill value
/// that broadcasts to whatever shape it is combined with
#[derive(Debug, Clone)]
pub enum BandData {
    Grid(Grid),
    Fill(PixelValue),
}

impl BandData {
    pub fn shape(&self) -> Option<(usize, usize)> {
        match self {
            BandData::Grid(g) => Some(g.dim()),
            BandData::Fill(_) => None,
        }
    }

    /// Pixel value at (row, col); fills answer for every coordinate
    pub fn value_at(&self, row: usize, col: usize) -> Option<PixelValue> {
        match self {
            BandData::Grid(g) => g.get((row, col)).copied(),
            BandData::Fill(v) => Some(*v),
        }
    }

    pub fn to_grid(&self, shape: (usize, usize)) -> Grid {
        match self {
            BandData::Grid(g) => g.clone(),
            BandData::Fill(v) => Grid::from_elem(shape, *v),
        }
    }

    /// Apply a per-pixel function
    pub fn map<F>(&self, f: F) -> BandData
    where
        F: Fn(PixelValue) -> PixelValue,
    {
        match self {
            BandData::Grid(g) => BandData::Grid(g.mapv(|v| f(v))),
            BandData::Fill(v) => BandData::Fill(f(*v)),
        }
    }

    /// Combine two bands per pixel, broadcasting fill values
    pub fn zip_with<F>(&self, other: &BandData, f: F) -> EtResult<BandData>
    where
        F: Fn(PixelValue, PixelValue) -> PixelValue + Sync + Send,
    {
        let shape = common_shape(&[self, other])?;
        match shape {
            None => {
                let (a, b) = match (self, other) {
                    (BandData::Fill(a), BandData::Fill(b)) => (*a, *b),
                    _ => unreachable!("common_shape returned None for a grid band"),
                };
                Ok(BandData::Fill(f(a, b)))
            }
            Some(dim) => {
                let a = self.to_grid(dim);
                let b = other.to_grid(dim);
                let out = Zip::from(&a).and(&b).map_collect(|&x, &y| f(x, y));
                Ok(BandData::Grid(out))
            }
        }
    }

    /// Combine three bands per pixel. This is the hot path of the ETf
    /// kernel, so the grid case runs in parallel when enabled.
    pub fn zip3_with<F>(a: &BandData, b: &BandData, c: &BandData, f: F) -> EtResult<BandData>
    where
        F: Fn(PixelValue, PixelValue, PixelValue) -> PixelValue + Sync + Send,
    {
        let shape = common_shape(&[a, b, c])?;
        match shape {
            None => {
                let (x, y, z) = match (a, b, c) {
                    (BandData::Fill(x), BandData::Fill(y), BandData::Fill(z)) => (*x, *y, *z),
                    _ => unreachable!("common_shape returned None for a grid band"),
                };
                Ok(BandData::Fill(f(x, y, z)))
            }
            Some(dim) => {
                let ga = a.to_grid(dim);
                let gb = b.to_grid(dim);
                let gc = c.to_grid(dim);

                #[cfg(feature = "parallel")]
                let out = Zip::from(&ga)
                    .and(&gb)
                    .and(&gc)
                    .par_map_collect(|&x, &y, &z| f(x, y, z));

                #[cfg(not(feature = "parallel"))]
                let out = Zip::from(&ga)
                    .and(&gb)
                    .and(&gc)
                    .map_collect(|&x, &y, &z| f(x, y, z));

                Ok(BandData::Grid(out))
            }
        }
    }
}

impl From<Grid> for BandData {
    fn from(g: Grid) -> Self {
        BandData::Grid(g)
    }
}

impl From<PixelValue> for BandData {
    fn from(v: PixelValue) -> Self {
        BandData::Fill(v)
    }
}

/// Shared shape of a set of bands: None if every band is a fill,
/// the common grid shape otherwise. Mismatched grids are an error.
fn common_shape(bands: &[&BandData]) -> EtResult<Option<(usize, usize)>> {
    let mut shape: Option<(usize, usize)> = None;
    for band in bands {
        if let Some(dim) = band.shape() {
            match shape {
                None => shape = Some(dim),
                Some(existing) if existing != dim => {
                    return Err(EtError::Processing(format!(
                        "band shape mismatch: {:?} vs {:?}",
                        existing, dim
                    )));
                }
                Some(_) => {}
            }
        }
    }
    Ok(shape)
}

/// A named raster band
#[derive(Debug, Clone)]
pub struct Band {
    pub name: String,
    pub data: BandData,
}

/// Evaluated multi-band image: ordered named bands, a property map, and
/// an optional geographic footprint. Every transform returns a new
/// `Raster`; nothing mutates in place.
#[derive(Debug, Clone, Default)]
pub struct Raster {
    bands: Vec<Band>,
    properties: BTreeMap<String, PropertyValue>,
    footprint: Option<GeoBounds>,
}

impl Raster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_band(&mut self, name: &str, data: impl Into<BandData>) {
        self.bands.push(Band {
            name: name.to_string(),
            data: data.into(),
        });
    }

    pub fn with_band(mut self, name: &str, data: impl Into<BandData>) -> Self {
        self.push_band(name, data);
        self
    }

    pub fn band_count(&self) -> usize {
        self.bands.len()
    }

    pub fn band_names(&self) -> Vec<&str> {
        self.bands.iter().map(|b| b.name.as_str()).collect()
    }

    pub fn band(&self, name: &str) -> Option<&BandData> {
        self.bands.iter().find(|b| b.name == name).map(|b| &b.data)
    }

    pub fn first_band(&self) -> EtResult<&Band> {
        self.bands
            .first()
            .ok_or_else(|| EtError::Processing("raster has no bands".to_string()))
    }

    /// Select bands by name, in order, renaming each to the paired output
    /// name. Properties and footprint are carried over.
    pub fn select(&self, input: &[&str], output: &[&str]) -> EtResult<Raster> {
        if input.len() != output.len() {
            return Err(EtError::Processing(format!(
                "select: {} input bands vs {} output names",
                input.len(),
                output.len()
            )));
        }
        let mut out = Raster {
            bands: Vec::with_capacity(input.len()),
            properties: self.properties.clone(),
            footprint: self.footprint,
        };
        for (from, to) in input.iter().zip(output) {
            let data = self
                .band(from)
                .ok_or_else(|| EtError::MissingBand(from.to_string()))?;
            out.push_band(to, data.clone());
        }
        Ok(out)
    }

    /// Select the first band regardless of name, renaming it
    pub fn select_first(&self, name: &str) -> EtResult<Raster> {
        let band = self.first_band()?;
        Ok(Raster {
            bands: vec![Band {
                name: name.to_string(),
                data: band.data.clone(),
            }],
            properties: self.properties.clone(),
            footprint: self.footprint,
        })
    }

    /// Apply a per-pixel function to every band
    pub fn map_pixels<F>(&self, f: F) -> Raster
    where
        F: Fn(PixelValue) -> PixelValue,
    {
        Raster {
            bands: self
                .bands
                .iter()
                .map(|b| Band {
                    name: b.name.clone(),
                    data: b.data.map(&f),
                })
                .collect(),
            properties: self.properties.clone(),
            footprint: self.footprint,
        }
    }

    pub fn properties(&self) -> &BTreeMap<String, PropertyValue> {
        &self.properties
    }

    pub fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    pub fn set_property(&mut self, key: &str, value: impl Into<PropertyValue>) {
        self.properties.insert(key.to_string(), value.into());
    }

    pub fn with_property(mut self, key: &str, value: impl Into<PropertyValue>) -> Self {
        self.set_property(key, value);
        self
    }

    pub fn text_property(&self, key: &str) -> EtResult<&str> {
        self.property(key)
            .and_then(|v| v.as_text())
            .ok_or_else(|| EtError::MissingProperty(key.to_string()))
    }

    pub fn number_property(&self, key: &str) -> EtResult<f64> {
        self.property(key)
            .and_then(|v| v.as_number())
            .ok_or_else(|| EtError::MissingProperty(key.to_string()))
    }

    /// Acquisition time in epoch milliseconds (`system:time_start`)
    pub fn time_start(&self) -> EtResult<i64> {
        Ok(self.number_property("system:time_start")? as i64)
    }

    pub fn footprint(&self) -> Option<GeoBounds> {
        self.footprint
    }

    pub fn set_footprint(&mut self, bounds: GeoBounds) {
        self.footprint = Some(bounds);
    }

    pub fn with_footprint(mut self, bounds: GeoBounds) -> Self {
        self.footprint = Some(bounds);
        self
    }
}

/// Error types for SSEBop processing
#[derive(Debug, thiserror::Error)]
pub enum EtError {
    #[error("unsupported variable: {0}")]
    UnsupportedVariable(String),

    #[error("unsupported collection: {0}")]
    UnsupportedCollection(String),

    #[error("invalid {parameter} source: {detail}")]
    InvalidParameterSource {
        parameter: &'static str,
        detail: String,
    },

    #[error("malformed scene identity: {0}")]
    MalformedSceneIdentity(String),

    #[error("missing band: {0}")]
    MissingBand(String),

    #[error("missing property: {0}")]
    MissingProperty(String),

    #[error("empty collection: {0}")]
    EmptyCollection(String),

    #[error("processing error: {0}")]
    Processing(String),

    #[error("catalog error: {0}")]
    Catalog(String),
}

/// Result type for SSEBop operations
pub type EtResult<T> = Result<T, EtError>;
