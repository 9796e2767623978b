//! Radiometric derivation of NDVI, emissivity, and land surface
//! temperature from a prepped top-of-atmosphere scene.
//!
//! The LST coefficients were derived from a small number of scenes in
//! southern Idaho (Allen, Tasumi, Trezza 2007, the METRIC model paper)
//! and may not be appropriate for other areas.

use crate::types::{BandData, EtError, EtResult, PixelValue, Raster, NODATA};

// Fixed physical constants of the brightness-temperature inversion
const PATH_RADIANCE: PixelValue = 0.91;
const NARROWBAND_TRANSMISSIVITY: PixelValue = 0.866;
const SKY_DOWNWARD_RADIANCE: PixelValue = 1.32;

/// Normalized Difference Vegetation Index, `(nir - red) / (nir + red)`.
///
/// Pixels where `nir + red` is zero become nodata rather than failing.
pub fn ndvi(prepped: &Raster) -> EtResult<BandData> {
    let nir = prepped
        .band("nir")
        .ok_or_else(|| EtError::MissingBand("nir".to_string()))?;
    let red = prepped
        .band("red")
        .ok_or_else(|| EtError::MissingBand("red".to_string()))?;

    nir.zip_with(red, |n, r| {
        let sum = n + r;
        if sum == 0.0 {
            NODATA
        } else {
            (n - r) / sum
        }
    })
}

/// Emissivity as a piecewise function of NDVI.
///
/// Assumes a soil emissivity of 0.97, a vegetation emissivity of 0.99,
/// and a mean shape factor of 0.553 for the mixed range.
pub fn emissivity(prepped: &Raster) -> EtResult<BandData> {
    let ndvi = ndvi(prepped)?;
    let raw = ndvi.map(|v| {
        if v < 0.0 {
            0.985
        } else if v < 0.2 {
            0.977
        } else if v > 0.5 {
            0.99
        } else {
            // fractional vegetation cover and the cavity term
            let pv = ((v - 0.2) / 0.3).powi(2);
            let de = (1.0 - 0.97) * (1.0 - pv) * (0.55 * 0.99);
            0.99 * pv + 0.97 * (1.0 - pv) + de
        }
    });
    // safety clamp; the branches above already land inside this range
    Ok(raw.map(|v| v.clamp(0.977, 0.99)))
}

/// Emissivity-corrected land surface temperature from raw brightness
/// temperature, using the scene's `k1_constant` / `k2_constant`
/// calibration properties.
pub fn lst(prepped: &Raster) -> EtResult<BandData> {
    let k1 = prepped.number_property("k1_constant")? as PixelValue;
    let k2 = prepped.number_property("k2_constant")? as PixelValue;

    let brightness = prepped
        .band("lst")
        .ok_or_else(|| EtError::MissingBand("lst".to_string()))?;
    let emiss = emissivity(prepped)?;

    brightness.zip_with(&emiss, |tb, e| {
        // back out radiance from brightness temperature, then
        // recalculate the emissivity-corrected temperature
        let thermal_rad = k1 / ((k2 / tb).exp() - 1.0);
        let corrected = (thermal_rad - PATH_RADIANCE) / NARROWBAND_TRANSMISSIVITY
            - (1.0 - e) * SKY_DOWNWARD_RADIANCE;
        k2 / (e * k1 / corrected + 1.0).ln()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BandData;
    use approx::assert_relative_eq;

    fn prepped(nir: PixelValue, red: PixelValue, brightness: PixelValue) -> Raster {
        Raster::new()
            .with_band("red", BandData::Fill(red))
            .with_band("nir", BandData::Fill(nir))
            .with_band("lst", BandData::Fill(brightness))
            .with_property("k1_constant", 774.8853)
            .with_property("k2_constant", 1321.0789)
    }

    fn single(band: &BandData) -> PixelValue {
        band.value_at(0, 0).unwrap()
    }

    #[test]
    fn test_ndvi_values() {
        let v = single(&ndvi(&prepped(0.5, 0.1, 300.0)).unwrap());
        assert_relative_eq!(v, (0.5 - 0.1) / (0.5 + 0.1), epsilon = 1e-6);
    }

    #[test]
    fn test_ndvi_zero_denominator_is_nodata() {
        let v = single(&ndvi(&prepped(0.0, 0.0, 300.0)).unwrap());
        assert!(v.is_nan());
    }

    #[test]
    fn test_emissivity_negative_ndvi() {
        // nir < red gives negative NDVI -> water branch
        let v = single(&emissivity(&prepped(0.1, 0.3, 300.0)).unwrap());
        assert_relative_eq!(v, 0.985, epsilon = 1e-6);
    }

    #[test]
    fn test_emissivity_sparse_and_dense() {
        // NDVI just above zero -> bare soil branch
        let sparse = single(&emissivity(&prepped(0.11, 0.1, 300.0)).unwrap());
        assert_relative_eq!(sparse, 0.977, epsilon = 1e-6);

        // NDVI > 0.5 -> full vegetation branch, unchanged by the clamp
        let dense = single(&emissivity(&prepped(0.5, 0.1, 300.0)).unwrap());
        assert_relative_eq!(dense, 0.99, epsilon = 1e-6);
    }

    #[test]
    fn test_emissivity_mixed_range() {
        // nir=0.27, red=0.13 -> NDVI = 0.35
        let v = single(&emissivity(&prepped(0.27, 0.13, 300.0)).unwrap());
        let pv = ((0.35f32 - 0.2) / 0.3).powi(2);
        let de = (1.0 - 0.97) * (1.0 - pv) * (0.55 * 0.99);
        let expected = 0.99 * pv + 0.97 * (1.0 - pv) + de;
        assert_relative_eq!(v, expected, epsilon = 1e-4);
        assert!(v >= 0.977 && v <= 0.99);
    }

    #[test]
    fn test_lst_corrects_brightness_temperature() {
        let v = single(&lst(&prepped(0.5, 0.1, 300.0)).unwrap());
        // emissivity-corrected LST sits a few K above 300 K brightness
        assert!(v.is_finite());
        assert!(v > 300.0 && v < 310.0, "lst = {}", v);
    }

    #[test]
    fn test_lst_matches_hand_computation() {
        let tb: PixelValue = 300.0;
        let e: PixelValue = 0.99; // NDVI > 0.5 in the fixture
        let k1: PixelValue = 774.8853;
        let k2: PixelValue = 1321.0789;
        let rad = k1 / ((k2 / tb).exp() - 1.0);
        let rc = (rad - 0.91) / 0.866 - (1.0 - e) * 1.32;
        let expected = k2 / (e * k1 / rc + 1.0).ln();

        let v = single(&lst(&prepped(0.5, 0.1, tb)).unwrap());
        assert_relative_eq!(v, expected, epsilon = 1e-3);
    }
}
