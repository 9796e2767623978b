use crate::types::{EtError, EtResult, Raster};
use serde::{Deserialize, Serialize};

/// Generic band names every prepped input image carries, in order
pub const PREP_BANDS: [&str; 8] = [
    "blue", "green", "red", "nir", "swir1", "swir2", "lst", "BQA",
];

/// Landsat spacecraft, read from the `SPACECRAFT_ID` scene property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Spacecraft {
    Landsat5,
    Landsat7,
    Landsat8,
}

impl Spacecraft {
    pub fn from_property(id: &str) -> EtResult<Self> {
        match id {
            "LANDSAT_5" => Ok(Spacecraft::Landsat5),
            "LANDSAT_7" => Ok(Spacecraft::Landsat7),
            "LANDSAT_8" => Ok(Spacecraft::Landsat8),
            _ => Err(EtError::UnsupportedCollection(format!(
                "unknown spacecraft: {}",
                id
            ))),
        }
    }

    /// Raw band names in [`PREP_BANDS`] order. The thermal band position
    /// holds the raw brightness-temperature band.
    pub fn input_bands(&self) -> [&'static str; 8] {
        match self {
            Spacecraft::Landsat5 => ["B1", "B2", "B3", "B4", "B5", "B7", "B6", "BQA"],
            Spacecraft::Landsat7 => ["B1", "B2", "B3", "B4", "B5", "B7", "B6_VCID_1", "BQA"],
            Spacecraft::Landsat8 => ["B2", "B3", "B4", "B5", "B6", "B7", "B10", "BQA"],
        }
    }

    /// Scene property carrying the K1 thermal calibration constant
    pub fn k1_property(&self) -> &'static str {
        match self {
            Spacecraft::Landsat5 => "K1_CONSTANT_BAND_6",
            Spacecraft::Landsat7 => "K1_CONSTANT_BAND_6_VCID_1",
            Spacecraft::Landsat8 => "K1_CONSTANT_BAND_10",
        }
    }

    /// Scene property carrying the K2 thermal calibration constant
    pub fn k2_property(&self) -> &'static str {
        match self {
            Spacecraft::Landsat5 => "K2_CONSTANT_BAND_6",
            Spacecraft::Landsat7 => "K2_CONSTANT_BAND_6_VCID_1",
            Spacecraft::Landsat8 => "K2_CONSTANT_BAND_10",
        }
    }
}

/// Rename a raw Landsat Collection 1 TOA scene to the generic band set
/// and stamp the spacecraft-specific thermal constants as the generic
/// `k1_constant` / `k2_constant` properties.
pub fn prep_landsat_c1_toa(raw: &Raster) -> EtResult<Raster> {
    let spacecraft_id = raw.text_property("SPACECRAFT_ID")?;
    let spacecraft = Spacecraft::from_property(spacecraft_id)?;
    log::debug!("prepping {} TOA scene", spacecraft_id);

    let input = spacecraft.input_bands();
    let k1 = raw.number_property(spacecraft.k1_property())?;
    let k2 = raw.number_property(spacecraft.k2_property())?;

    let mut prepped = raw.select(&input, &PREP_BANDS)?;
    prepped.set_property("k1_constant", k1);
    prepped.set_property("k2_constant", k2);
    Ok(prepped)
}
