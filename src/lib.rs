//! SSEBop: A Fast, Modular Evapotranspiration Fraction Processor
//!
//! This library derives per-scene SSEBop ETf images from Landsat
//! Collection 1 TOA scenes: radiometric preprocessing (NDVI, emissivity,
//! land surface temperature), ranked resolution of the ancillary model
//! parameters (dT, elevation, Tmax, Tcorr), the surface energy balance
//! formula with its masking and clamping contract, and assembly of a
//! time-ordered collection ready for external temporal interpolation.

pub mod catalog;
pub mod core;
pub mod image;
pub mod types;

// Re-export main types and functions for easier access
pub use types::{
    Band, BandData, EtError, EtResult, GeoBounds, Grid, PixelValue, PropertyValue, Raster,
};

pub use catalog::{Catalog, CollectionFilter, Feature, FeatureFilter, MemoryCatalog};
pub use image::Image;

pub use crate::core::{
    build_variable_collection, InterpMethod, InterpSpec, Interpolator, ModelConfig,
    SceneIdentity, SsebopImage, TcorrRecord, TcorrSource, TcorrTier, TimeInterval,
    TimeSeriesCollection, TmaxSource, Variable,
};
