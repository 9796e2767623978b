//! Static dataset-id tables for the ancillary parameter sources.
//!
//! These ids name external assets in the raster/feature store. The Tcorr
//! tables are keyed by the Tmax source keyword; every keyword shares the
//! same 0.978 default even though the table is kept per-keyword.

/// Day-of-year dT composites, clamped to 6-25 K on read
pub const DT_DAYMET_MEDIAN_V0: &str = "projects/usgs-ssebop/dt/daymet_median_v0";
pub const DT_DAYMET_MEDIAN_V1: &str = "projects/usgs-ssebop/dt/daymet_median_v1";

/// Elevation assets
pub const ELEV_ASSET: &str = "projects/usgs-ssebop/srtm_1km";
pub const ELEV_GTOPO: &str = "USGS/GTOPO30";
pub const ELEV_NED: &str = "USGS/NED";
pub const ELEV_SRTM: &str = "CGIAR/SRTM90_V4";

/// Daily Tmax sources
pub const TMAX_CIMIS_DAILY: &str = "projects/climate-engine/cimis/daily";
pub const TMAX_DAYMET_DAILY: &str = "NASA/ORNL/DAYMET_V3";
pub const TMAX_GRIDMET_DAILY: &str = "IDAHO_EPSCOR/GRIDMET";

/// Day-of-year Tmax median composites, by source and version
pub fn tmax_median_collection(source: &str, version: &str) -> String {
    format!("projects/usgs-ssebop/tmax/{}_{}", source, version)
}

/// Daily reference evapotranspiration used for temporal interpolation
pub const REFERENCE_ET_COLLECTION: &str = "IDAHO_EPSCOR/GRIDMET";
pub const REFERENCE_ET_BAND: &str = "etr";

/// (tmax keyword, scene-level table, monthly table)
const TCORR_TABLES: [(&str, &str, &str); 8] = [
    (
        "CIMIS",
        "projects/usgs-ssebop/tcorr/cimis_scene",
        "projects/usgs-ssebop/tcorr/cimis_monthly",
    ),
    (
        "DAYMET",
        "projects/usgs-ssebop/tcorr/daymet_scene",
        "projects/usgs-ssebop/tcorr/daymet_monthly",
    ),
    (
        "GRIDMET",
        "projects/usgs-ssebop/tcorr/gridmet_scene",
        "projects/usgs-ssebop/tcorr/gridmet_monthly",
    ),
    (
        "CIMIS_MEDIAN_V1",
        "projects/usgs-ssebop/tcorr/cimis_median_v1_scene",
        "projects/usgs-ssebop/tcorr/cimis_median_v1_monthly",
    ),
    (
        "DAYMET_MEDIAN_V0",
        "projects/usgs-ssebop/tcorr/daymet_median_v0_scene",
        "projects/usgs-ssebop/tcorr/daymet_median_v0_monthly",
    ),
    (
        "DAYMET_MEDIAN_V1",
        "projects/usgs-ssebop/tcorr/daymet_median_v1_scene",
        "projects/usgs-ssebop/tcorr/daymet_median_v1_monthly",
    ),
    (
        "GRIDMET_MEDIAN_V1",
        "projects/usgs-ssebop/tcorr/gridmet_median_v1_scene",
        "projects/usgs-ssebop/tcorr/gridmet_median_v1_monthly",
    ),
    (
        "TOPOWX_MEDIAN_V0",
        "projects/usgs-ssebop/tcorr/topowx_median_v0_scene",
        "projects/usgs-ssebop/tcorr/topowx_median_v0_monthly",
    ),
];

/// Default Tcorr per Tmax keyword. The values are tabulated independently
/// but currently identical for every keyword.
const TCORR_DEFAULTS: [(&str, f64); 9] = [
    ("CIMIS", 0.978),
    ("DAYMET", 0.978),
    ("GRIDMET", 0.978),
    ("TOPOWX", 0.978),
    ("CIMIS_MEDIAN_V1", 0.978),
    ("DAYMET_MEDIAN_V0", 0.978),
    ("DAYMET_MEDIAN_V1", 0.978),
    ("GRIDMET_MEDIAN_V1", 0.978),
    ("TOPOWX_MEDIAN_V0", 0.978),
];

/// Scene-level Tcorr table for a Tmax keyword
pub fn tcorr_scene_table(tmax_key: &str) -> Option<&'static str> {
    TCORR_TABLES
        .iter()
        .find(|(key, _, _)| *key == tmax_key)
        .map(|(_, scene, _)| *scene)
}

/// Monthly Tcorr table for a Tmax keyword
pub fn tcorr_month_table(tmax_key: &str) -> Option<&'static str> {
    TCORR_TABLES
        .iter()
        .find(|(key, _, _)| *key == tmax_key)
        .map(|(_, _, month)| *month)
}

/// Default Tcorr value for a Tmax keyword
pub fn tcorr_default(tmax_key: &str) -> Option<f64> {
    TCORR_DEFAULTS
        .iter()
        .find(|(key, _)| *key == tmax_key)
        .map(|(_, value)| *value)
}
