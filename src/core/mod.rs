//! Core SSEBop processing modules

pub mod collection;
pub mod etf;
pub mod landsat;
pub mod model;
pub mod parameters;
pub mod radiometry;

// Re-export main types
pub use collection::{
    build_variable_collection, InterpMethod, InterpSpec, Interpolator, TimeInterval,
    TimeSeriesCollection, INTERP_DAYS, LANDSAT_C1_TOA_COLLECTIONS,
};
pub use landsat::{prep_landsat_c1_toa, Spacecraft, PREP_BANDS};
pub use model::{ModelConfig, SceneIdentity, SsebopImage, Variable};
pub use parameters::{
    dt_image, elev_image, resolve_tcorr, tmax_image, DtSource, ElevSource, TcorrRecord,
    TcorrSource, TcorrTier, TmaxSource,
};
