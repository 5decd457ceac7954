//! Scenario configuration loading and validation.

use std::path::Path;

use ee_common::{LatLon, VisParams};
use ee_expr::landsat::composites;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading a scenario file.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("Failed to read scenario {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse scenario: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid scenario: {0}")]
    Invalid(String),
}

/// Inputs of one composite difference run.
///
/// Every field has a default, so an empty file (or no file) reproduces the
/// Brazil 1999-2003 vs 2008-2012 comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    /// Country name matched against `country_property`
    pub country: String,

    /// Feature collection holding country boundaries
    pub boundary_table: String,

    /// Property holding the country name
    pub country_property: String,

    /// Earlier composite, subtracted from the later one
    pub early_image: String,

    /// Later composite
    pub late_image: String,

    /// Bands of the normalized difference index, `[a, b]` for (a-b)/(a+b)
    pub ndvi_bands: [String; 2],

    /// Bands selected from both composites before subtracting, in order
    pub difference_bands: Vec<String>,

    /// Stretch and band triple for the difference layer
    pub vis: VisParams,

    pub center: LatLon,

    pub zoom: u8,

    /// Overlay name in the layer control
    pub layer_name: String,

    /// Check that the country filter matches exactly one feature
    pub verify_region: bool,

    /// Also add the normalized difference index as a hidden overlay
    pub show_ndvi: bool,

    /// Document title of the rendered map
    pub title: String,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            country: "Brazil".to_string(),
            boundary_table: "USDOS/LSIB_SIMPLE/2017".to_string(),
            country_property: "country_na".to_string(),
            early_image: composites::LE7_TOA_1999_2003.to_string(),
            late_image: composites::LE7_TOA_2008_2012.to_string(),
            ndvi_bands: ["B4".to_string(), "B3".to_string()],
            difference_bands: vec!["B4".to_string(), "B3".to_string(), "B2".to_string()],
            vis: VisParams::stretch(["B4", "B3", "B2"], -32.0, 32.0),
            center: LatLon::new(14.09, -59.9358),
            zoom: 3,
            layer_name: "difference".to_string(),
            verify_region: true,
            show_ndvi: false,
            title: "Landsat composite difference".to_string(),
        }
    }
}

impl Scenario {
    /// Parse a scenario from YAML text.
    pub fn from_yaml(text: &str) -> Result<Self, ScenarioError> {
        // serde_yaml rejects an empty document; treat it as all defaults.
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let scenario: Scenario = serde_yaml::from_str(text)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Load and validate a scenario file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ScenarioError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let scenario = Self::from_yaml(&text)?;
        tracing::info!(
            path = %path.display(),
            country = %scenario.country,
            "Loaded scenario"
        );
        Ok(scenario)
    }

    pub fn validate(&self) -> Result<(), ScenarioError> {
        let required = [
            ("country", &self.country),
            ("boundary_table", &self.boundary_table),
            ("country_property", &self.country_property),
            ("early_image", &self.early_image),
            ("late_image", &self.late_image),
            ("layer_name", &self.layer_name),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ScenarioError::Invalid(format!("{} must not be empty", field)));
            }
        }

        if self.ndvi_bands.iter().any(|b| b.trim().is_empty()) {
            return Err(ScenarioError::Invalid(
                "ndvi_bands must name two bands".to_string(),
            ));
        }
        if self.ndvi_bands[0] == self.ndvi_bands[1] {
            return Err(ScenarioError::Invalid(format!(
                "ndvi_bands must differ, got {} twice",
                self.ndvi_bands[0]
            )));
        }

        if self.difference_bands.is_empty()
            || self.difference_bands.iter().any(|b| b.trim().is_empty())
        {
            return Err(ScenarioError::Invalid(
                "difference_bands must name at least one band".to_string(),
            ));
        }
        for (i, band) in self.difference_bands.iter().enumerate() {
            if self.difference_bands[..i].contains(band) {
                return Err(ScenarioError::Invalid(format!(
                    "difference_bands lists {} twice",
                    band
                )));
            }
        }

        self.vis
            .validate()
            .map_err(|e| ScenarioError::Invalid(e.to_string()))?;
        if let Some(missing) = self
            .vis
            .bands
            .iter()
            .find(|b| !self.difference_bands.contains(b))
        {
            return Err(ScenarioError::Invalid(format!(
                "vis band {} is not one of difference_bands",
                missing
            )));
        }

        if !self.center.is_valid() {
            return Err(ScenarioError::Invalid(format!(
                "center ({}, {}) is out of range",
                self.center.lat, self.center.lon
            )));
        }
        if self.zoom > webmap::map::MAX_ZOOM {
            return Err(ScenarioError::Invalid(format!(
                "zoom {} exceeds {}",
                self.zoom,
                webmap::map::MAX_ZOOM
            )));
        }
        Ok(())
    }

    pub fn ndvi_band_pair(&self) -> [&str; 2] {
        [self.ndvi_bands[0].as_str(), self.ndvi_bands[1].as_str()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_notebook() {
        let s = Scenario::default();
        assert_eq!(s.country, "Brazil");
        assert_eq!(s.vis.bands, vec!["B4", "B3", "B2"]);
        assert_eq!(s.vis.min, -32.0);
        assert_eq!(s.vis.max, 32.0);
        assert_eq!(s.center, LatLon::new(14.09, -59.9358));
        assert_eq!(s.zoom, 3);
        assert_eq!(s.layer_name, "difference");
        assert!(s.verify_region);
        assert!(!s.show_ndvi);
        s.validate().unwrap();
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let s = Scenario::from_yaml("country: Peru\nzoom: 5\n").unwrap();
        assert_eq!(s.country, "Peru");
        assert_eq!(s.zoom, 5);
        assert_eq!(s.boundary_table, "USDOS/LSIB_SIMPLE/2017");
        assert_eq!(s.late_image, composites::LE7_TOA_2008_2012);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(Scenario::from_yaml("  \n").unwrap(), Scenario::default());
    }

    #[test]
    fn test_rejects_inverted_stretch() {
        let yaml = "vis:\n  bands: [B4, B3, B2]\n  min: 32\n  max: -32\n";
        assert!(matches!(
            Scenario::from_yaml(yaml),
            Err(ScenarioError::Invalid(_))
        ));
    }

    #[test]
    fn test_rejects_identical_ndvi_bands() {
        let err = Scenario::from_yaml("ndvi_bands: [B4, B4]\n").unwrap_err();
        assert!(err.to_string().contains("B4 twice"));
    }

    #[test]
    fn test_rejects_vis_band_outside_difference() {
        let err = Scenario::from_yaml("difference_bands: [B4, B3]\n").unwrap_err();
        assert!(err.to_string().contains("B2"));
    }

    #[test]
    fn test_rejects_repeated_difference_band() {
        assert!(Scenario::from_yaml("difference_bands: [B4, B3, B2, B4]\n").is_err());
        assert!(Scenario::from_yaml("difference_bands: []\n").is_err());
    }

    #[test]
    fn test_rejects_empty_country() {
        assert!(Scenario::from_yaml("country: ''\n").is_err());
    }

    #[test]
    fn test_malformed_yaml() {
        assert!(matches!(
            Scenario::from_yaml("zoom: [1, 2"),
            Err(ScenarioError::Parse(_))
        ));
    }
}
