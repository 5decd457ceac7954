//! Common test fixtures.
//!
//! The values below reproduce the Brazil composite-difference scenario
//! used across the workspace's tests.

/// Country boundary table and lookup property.
pub mod region {
    pub const LSIB_TABLE: &str = "USDOS/LSIB_SIMPLE/2017";
    pub const COUNTRY_PROPERTY: &str = "country_na";
    pub const BRAZIL: &str = "Brazil";
}

/// Landsat 7 TOA 5-year composites.
pub mod images {
    pub const EARLY: &str = "LANDSAT/LE7_TOA_5YEAR/1999_2003";
    pub const LATE: &str = "LANDSAT/LE7_TOA_5YEAR/2008_2012";

    /// Near-infrared and red bands for the vegetation index.
    pub const NDVI_BANDS: [&str; 2] = ["B4", "B3"];

    /// False-color display triple.
    pub const VIS_BANDS: [&str; 3] = ["B4", "B3", "B2"];
}

/// Display stretch and map view.
pub mod display {
    pub const STRETCH_MIN: f64 = -32.0;
    pub const STRETCH_MAX: f64 = 32.0;
    pub const CENTER_LAT: f64 = 14.09;
    pub const CENTER_LON: f64 = -59.9358;
    pub const ZOOM: u8 = 3;
    pub const LAYER_NAME: &str = "difference";
}

/// Cloud project used by fake services.
pub const TEST_PROJECT: &str = "test-project";

/// Bearer token used by fake services.
pub const TEST_TOKEN: &str = "ya29.test-token";
