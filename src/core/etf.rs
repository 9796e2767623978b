//! The SSEBop ETf kernel.
//!
//! `etf = (tmax * tcorr - lst + dt) / dt`, followed by the fixed
//! post-processing sequence: mask ratios at or above 1.3, clamp to
//! [0, 1.05], then mask pixels failing the Tdiff cloud screen. The order
//! is part of the contract; masking before clamping decides which pixels
//! the 1.3 cutoff removes versus which the clamp folds back.

use crate::types::{BandData, EtResult, PixelValue, Raster, NODATA};

use super::model::SceneIdentity;
use super::parameters::TcorrRecord;

/// Upper ratio cutoff; values at or above are nodata
const RATIO_MASK: PixelValue = 1.3;
/// Clamp bounds applied after the ratio mask
const CLAMP_MIN: PixelValue = 0.0;
const CLAMP_MAX: PixelValue = 1.05;

/// Compute a single-band `etf` raster from evaluated inputs.
///
/// Attaches the scene identity and the Tcorr provenance (`TCORR`,
/// `TCORR_INDEX`) as properties.
pub fn compute(
    lst: &Raster,
    tmax: &Raster,
    dt: &Raster,
    tcorr: &TcorrRecord,
    tdiff_threshold: PixelValue,
    scene: &SceneIdentity,
) -> EtResult<Raster> {
    let lst_band = &lst.first_band()?.data;
    let tmax_band = &tmax.first_band()?.data;
    let dt_band = &dt.first_band()?.data;
    let tcorr_value = tcorr.value as PixelValue;

    let ratio = BandData::zip3_with(lst_band, tmax_band, dt_band, |l, t, d| {
        (t * tcorr_value - l + d) / d
    })?;

    // ratios at or above the cutoff become nodata; NaN fails the
    // comparison and stays nodata
    let masked = ratio.map(|v| if v < RATIO_MASK { v } else { NODATA });
    let clamped = masked.map(|v| v.clamp(CLAMP_MIN, CLAMP_MAX));

    // Tdiff cloud screen: mask where tmax - lst exceeds the threshold
    let tdiff = tmax_band.zip_with(lst_band, |t, l| t - l)?;
    let screened = clamped.zip_with(&tdiff, move |v, d| {
        if d <= tdiff_threshold {
            v
        } else {
            NODATA
        }
    })?;

    let mut out = Raster::new().with_band("etf", screened);
    if let Some(bounds) = lst.footprint() {
        out.set_footprint(bounds);
    }
    out.set_property("system:index", scene.index.as_str());
    out.set_property("system:time_start", scene.acquired.timestamp_millis());
    out.set_property("TCORR", tcorr.value);
    out.set_property("TCORR_INDEX", tcorr.tier.index() as f64);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::parameters::TcorrTier;
    use approx::assert_relative_eq;
    use chrono::TimeZone;
    use chrono::Utc;

    fn scene() -> SceneIdentity {
        let millis = Utc
            .with_ymd_and_hms(2015, 8, 5, 18, 20, 0)
            .single()
            .unwrap()
            .timestamp_millis();
        SceneIdentity::from_properties("LC08_043033_20150805", millis).unwrap()
    }

    fn single_band(value: PixelValue) -> Raster {
        Raster::new().with_band("b", value)
    }

    fn etf_value(lst: PixelValue, tmax: PixelValue, dt: PixelValue, tcorr: f64) -> PixelValue {
        let record = TcorrRecord {
            value: tcorr,
            tier: TcorrTier::Default,
        };
        let out = compute(
            &single_band(lst),
            &single_band(tmax),
            &single_band(dt),
            &record,
            15.0,
            &scene(),
        )
        .unwrap();
        out.band("etf").unwrap().value_at(0, 0).unwrap()
    }

    #[test]
    fn test_nominal_ratio() {
        // (305 * 0.978 - 300 + 10) / 10 = 0.829
        let v = etf_value(300.0, 305.0, 10.0, 0.978);
        assert_relative_eq!(v, 0.829, epsilon = 1e-4);
    }

    #[test]
    fn test_high_ratio_is_masked_not_clamped() {
        // raw ratio (300 - 296.5 + 10) / 10 = 1.35 >= 1.3: nodata even
        // though tmax - lst is well under the Tdiff threshold
        let v = etf_value(296.5, 300.0, 10.0, 1.0);
        assert!(v.is_nan());
    }

    #[test]
    fn test_ratio_between_cutoffs_clamps_to_max() {
        // (300 - 298 + 10)/10 = 1.2: below the mask, above the clamp
        let v = etf_value(298.0, 300.0, 10.0, 1.0);
        assert_relative_eq!(v, 1.05, epsilon = 1e-6);
    }

    #[test]
    fn test_negative_ratio_clamps_to_zero() {
        // (300 * 0.9 - 300 + 10)/10 = -2.0
        let v = etf_value(300.0, 300.0, 10.0, 0.9);
        assert_relative_eq!(v, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_tdiff_screen_masks_good_ratios() {
        // raw ratio (320 * 0.921875 - 300 + 10)/10 = 0.5 is healthy, but
        // tmax - lst = 20 > 15 so the cloud screen masks it anyway
        let record = TcorrRecord {
            value: 0.921875,
            tier: TcorrTier::Default,
        };
        let out = compute(
            &single_band(300.0),
            &single_band(320.0),
            &single_band(10.0),
            &record,
            15.0,
            &scene(),
        )
        .unwrap();
        let v = out.band("etf").unwrap().value_at(0, 0).unwrap();
        assert!(v.is_nan());
    }

    #[test]
    fn test_provenance_properties() {
        let record = TcorrRecord {
            value: 0.9838,
            tier: TcorrTier::Scene,
        };
        let out = compute(
            &single_band(300.0),
            &single_band(305.0),
            &single_band(10.0),
            &record,
            15.0,
            &scene(),
        )
        .unwrap();
        assert_eq!(out.band_names(), vec!["etf"]);
        assert_eq!(
            out.text_property("system:index").unwrap(),
            "LC08_043033_20150805"
        );
        assert_relative_eq!(out.number_property("TCORR").unwrap(), 0.9838);
        assert_eq!(out.number_property("TCORR_INDEX").unwrap(), 0.0);
    }
}
