//! Lazy image graph.
//!
//! An [`Image`] is a deferred description of a raster computation: a chain
//! of transforms over catalog datasets or in-memory rasters. Building and
//! composing images never touches a [`Catalog`]; all dataset access and
//! pixel work happens inside [`Image::evaluate`], which the surrounding
//! compute substrate is free to call when and where it wants.

use crate::catalog::{Catalog, CollectionFilter};
use crate::types::{EtError, EtResult, PixelValue, PropertyValue, Raster};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

type EvalFn = dyn Fn(&dyn Catalog) -> EtResult<Raster> + Send + Sync;

/// Deferred raster computation with a build-time property map.
///
/// Properties set on an `Image` travel through transforms and are applied
/// over the evaluated raster's own properties (build-time values win on
/// key collisions). Cloning is cheap; the underlying graph is shared.
#[derive(Clone)]
pub struct Image {
    eval: Arc<EvalFn>,
    properties: BTreeMap<String, PropertyValue>,
}

impl Image {
    /// Wrap an arbitrary deferred computation
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&dyn Catalog) -> EtResult<Raster> + Send + Sync + 'static,
    {
        Self {
            eval: Arc::new(f),
            properties: BTreeMap::new(),
        }
    }

    /// Lift an already-evaluated raster into the graph. The raster's
    /// properties become the image's build-time properties.
    pub fn from_raster(raster: Raster) -> Self {
        let properties = raster.properties().clone();
        let shared = Arc::new(raster);
        Self {
            eval: Arc::new(move |_cat: &dyn Catalog| Ok((*shared).clone())),
            properties,
        }
    }

    /// Single-band constant image (band name `constant`)
    pub fn constant(value: PixelValue) -> Self {
        Self::from_fn(move |_cat| Ok(Raster::new().with_band("constant", value)))
    }

    /// Deferred fetch of a single catalog image
    pub fn load(dataset: &str) -> Self {
        let dataset = dataset.to_string();
        Self::from_fn(move |cat| cat.image(&dataset))
    }

    /// Deferred fetch of the first image of a filtered catalog collection
    pub fn first_of(dataset: &str, filter: CollectionFilter) -> Self {
        let dataset = dataset.to_string();
        Self::from_fn(move |cat| {
            cat.images(&dataset, &filter)?
                .into_iter()
                .next()
                .ok_or_else(|| EtError::EmptyCollection(dataset.clone()))
        })
    }

    /// Select bands by name with renaming
    pub fn select(&self, input: &[&str], output: &[&str]) -> Image {
        let input: Vec<String> = input.iter().map(|s| s.to_string()).collect();
        let output: Vec<String> = output.iter().map(|s| s.to_string()).collect();
        self.chain(move |raster| {
            let from: Vec<&str> = input.iter().map(String::as_str).collect();
            let to: Vec<&str> = output.iter().map(String::as_str).collect();
            raster.select(&from, &to)
        })
    }

    /// Select a single band by name
    pub fn band(&self, name: &str) -> Image {
        self.select(&[name], &[name])
    }

    /// Rename the first band
    pub fn rename(&self, name: &str) -> Image {
        let name = name.to_string();
        self.chain(move |raster| raster.select_first(&name))
    }

    /// Apply a per-pixel function to every band
    pub fn map<F>(&self, f: F) -> Image
    where
        F: Fn(PixelValue) -> PixelValue + Send + Sync + 'static,
    {
        self.chain(move |raster| Ok(raster.map_pixels(&f)))
    }

    /// Clamp every pixel to `[lo, hi]`; nodata stays nodata
    pub fn clamp(&self, lo: PixelValue, hi: PixelValue) -> Image {
        self.map(move |v| v.clamp(lo, hi))
    }

    pub fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
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

    pub fn set_property(mut self, key: &str, value: impl Into<PropertyValue>) -> Image {
        self.properties.insert(key.to_string(), value.into());
        self
    }

    /// Run the deferred graph against a catalog. This is the only place
    /// the graph performs dataset access or pixel work; it is pure with
    /// respect to the supplied catalog and safe to call repeatedly.
    pub fn evaluate(&self, catalog: &dyn Catalog) -> EtResult<Raster> {
        let mut raster = (self.eval)(catalog)?;
        for (key, value) in &self.properties {
            raster.set_property(key, value.clone());
        }
        Ok(raster)
    }

    fn chain<F>(&self, f: F) -> Image
    where
        F: Fn(Raster) -> EtResult<Raster> + Send + Sync + 'static,
    {
        let parent = self.eval.clone();
        Image {
            eval: Arc::new(move |cat: &dyn Catalog| f(parent(cat)?)),
            properties: self.properties.clone(),
        }
    }
}

impl fmt::Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Image")
            .field("properties", &self.properties)
            .finish_non_exhaustive()
    }
}
