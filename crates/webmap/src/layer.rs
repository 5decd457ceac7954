//! Tile layer definitions.

use ee_common::{EeError, EeResult};
use serde::{Deserialize, Serialize};

/// Attribution shown for layers served by the imagery service.
pub const EARTH_ENGINE_ATTRIBUTION: &str = "Map Data &copy; Google Earth Engine";

/// Attribution for the default base map.
pub const OSM_ATTRIBUTION: &str =
    "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors";

/// An XYZ tile layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileLayer {
    /// Name shown in the layer control
    pub name: String,

    /// URL with `{z}`, `{x}`, `{y}` placeholders
    pub url_template: String,

    /// HTML attribution text
    #[serde(default)]
    pub attribution: String,

    /// Overlay (checkbox) rather than base layer (radio button)
    #[serde(default)]
    pub overlay: bool,

    /// Listed in the layer control
    #[serde(default = "default_true")]
    pub control: bool,

    /// Shown when the page loads
    #[serde(default = "default_true")]
    pub show: bool,

    #[serde(default = "default_opacity")]
    pub opacity: f64,

    #[serde(default = "default_max_zoom")]
    pub max_zoom: u8,
}

fn default_true() -> bool {
    true
}

fn default_opacity() -> f64 {
    1.0
}

fn default_max_zoom() -> u8 {
    18
}

impl TileLayer {
    pub fn new(name: impl Into<String>, url_template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url_template: url_template.into(),
            attribution: String::new(),
            overlay: false,
            control: true,
            show: true,
            opacity: default_opacity(),
            max_zoom: default_max_zoom(),
        }
    }

    /// The OpenStreetMap base layer.
    pub fn openstreetmap() -> Self {
        Self {
            attribution: OSM_ATTRIBUTION.to_string(),
            max_zoom: 19,
            ..Self::new("OpenStreetMap", "https://tile.openstreetmap.org/{z}/{x}/{y}.png")
        }
    }

    /// An overlay served by the imagery service.
    pub fn earth_engine(name: impl Into<String>, url_template: impl Into<String>) -> Self {
        Self {
            attribution: EARTH_ENGINE_ATTRIBUTION.to_string(),
            overlay: true,
            control: true,
            ..Self::new(name, url_template)
        }
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.show = false;
        self
    }

    pub fn validate(&self) -> EeResult<()> {
        if self.name.trim().is_empty() {
            return Err(EeError::Render("tile layer name must not be empty".to_string()));
        }
        for placeholder in ["{z}", "{x}", "{y}"] {
            if !self.url_template.contains(placeholder) {
                return Err(EeError::Render(format!(
                    "tile layer '{}' URL is missing {}",
                    self.name, placeholder
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(EeError::Render(format!(
                "tile layer '{}' opacity {} is outside [0, 1]",
                self.name, self.opacity
            )));
        }
        Ok(())
    }

    /// Leaflet `L.tileLayer` options object.
    pub(crate) fn leaflet_options(&self) -> serde_json::Value {
        serde_json::json!({
            "attribution": self.attribution,
            "opacity": self.opacity,
            "maxZoom": self.max_zoom,
        })
    }
}
