//! Visualization parameters for rendering remote images as map tiles.
//!
//! A `VisParams` value describes how the service should turn raw band
//! values into RGB tiles: which bands feed the red/green/blue channels,
//! the linear stretch range, and optional gamma or palette.

use serde::{Deserialize, Serialize};

use crate::{EeError, EeResult};

/// Display stretch and band selection for one tile layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisParams {
    /// One band (grayscale or palette) or three bands (RGB).
    pub bands: Vec<String>,

    /// Value mapped to the darkest output.
    pub min: f64,

    /// Value mapped to the brightest output.
    pub max: f64,

    /// Gamma correction, one value or one per band.
    #[serde(default)]
    pub gamma: Option<Vec<f64>>,

    /// Color ramp for single-band rendering.
    #[serde(default)]
    pub palette: Option<Vec<Color>>,

    /// Layer opacity in [0, 1].
    #[serde(default)]
    pub opacity: Option<f64>,
}

impl VisParams {
    /// Stretch `bands` linearly between `min` and `max`.
    pub fn stretch<S: Into<String>>(
        bands: impl IntoIterator<Item = S>,
        min: f64,
        max: f64,
    ) -> Self {
        Self {
            bands: bands.into_iter().map(Into::into).collect(),
            min,
            max,
            gamma: None,
            palette: None,
            opacity: None,
        }
    }

    pub fn with_palette(mut self, palette: Vec<Color>) -> Self {
        self.palette = Some(palette);
        self
    }

    pub fn with_gamma(mut self, gamma: Vec<f64>) -> Self {
        self.gamma = Some(gamma);
        self
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = Some(opacity);
        self
    }

    /// Check the parameters are internally consistent.
    ///
    /// Band names are not checked against any image; the service reports
    /// unknown bands when it evaluates the layer.
    pub fn validate(&self) -> EeResult<()> {
        if self.bands.len() != 1 && self.bands.len() != 3 {
            return Err(EeError::invalid(
                "bands",
                format!("expected 1 or 3 bands, got {}", self.bands.len()),
            ));
        }
        if let Some(empty) = self.bands.iter().find(|b| b.trim().is_empty()) {
            return Err(EeError::invalid("bands", format!("empty band name '{}'", empty)));
        }
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(EeError::invalid("min/max", "stretch bounds must be finite"));
        }
        if self.min >= self.max {
            return Err(EeError::invalid(
                "min/max",
                format!("min ({}) must be less than max ({})", self.min, self.max),
            ));
        }
        if let Some(gamma) = &self.gamma {
            if gamma.len() != 1 && gamma.len() != self.bands.len() {
                return Err(EeError::invalid(
                    "gamma",
                    "expected one value or one per band",
                ));
            }
        }
        if let Some(palette) = &self.palette {
            if self.bands.len() != 1 {
                return Err(EeError::invalid(
                    "palette",
                    "a palette can only be used with a single band",
                ));
            }
            if palette.is_empty() {
                return Err(EeError::invalid("palette", "palette must not be empty"));
            }
            if let Some(bad) = palette.iter().find(|c| c.to_rgb().is_none()) {
                return Err(EeError::invalid(
                    "palette",
                    format!("unrecognized color {:?}", bad),
                ));
            }
        }
        if let Some(opacity) = self.opacity {
            if !(0.0..=1.0).contains(&opacity) {
                return Err(EeError::invalid("opacity", "must be within [0, 1]"));
            }
        }
        Ok(())
    }

    /// Palette as service-style hex strings ("RRGGBB").
    pub fn palette_hex(&self) -> EeResult<Option<Vec<String>>> {
        let Some(palette) = &self.palette else {
            return Ok(None);
        };
        palette
            .iter()
            .map(|c| {
                c.to_hex().ok_or_else(|| {
                    EeError::invalid("palette", format!("unrecognized color {:?}", c))
                })
            })
            .collect::<EeResult<Vec<_>>>()
            .map(Some)
    }
}

/// Color representation supporting multiple formats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Color {
    /// Hex string: "#RRGGBB", "RRGGBB" or a named color
    Hex(String),

    /// Explicit RGB
    Rgb { r: u8, g: u8, b: u8 },
}

impl Color {
    /// Convert to an RGB tuple, or `None` for malformed hex and unknown names.
    pub fn to_rgb(&self) -> Option<(u8, u8, u8)> {
        match self {
            Color::Hex(s) => parse_hex_color(s).or_else(|| named_color(s)),
            Color::Rgb { r, g, b } => Some((*r, *g, *b)),
        }
    }

    /// Six uppercase hex digits without a leading '#'.
    pub fn to_hex(&self) -> Option<String> {
        let (r, g, b) = self.to_rgb()?;
        Some(format!("{:02X}{:02X}{:02X}", r, g, b))
    }
}

fn parse_hex_color(s: &str) -> Option<(u8, u8, u8)> {
    let s = s.trim_start_matches('#');
    if s.len() != 6 || !s.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&s[0..2], 16).ok()?;
    let g = u8::from_str_radix(&s[2..4], 16).ok()?;
    let b = u8::from_str_radix(&s[4..6], 16).ok()?;
    Some((r, g, b))
}

fn named_color(name: &str) -> Option<(u8, u8, u8)> {
    let rgb = match name.to_lowercase().as_str() {
        "black" => (0, 0, 0),
        "white" => (255, 255, 255),
        "red" => (255, 0, 0),
        "green" => (0, 255, 0),
        "blue" => (0, 0, 255),
        "yellow" => (255, 255, 0),
        "cyan" => (0, 255, 255),
        "magenta" => (255, 0, 255),
        "orange" => (255, 165, 0),
        "purple" => (128, 0, 128),
        "gray" | "grey" => (128, 128, 128),
        _ => return None,
    };
    Some(rgb)
}
