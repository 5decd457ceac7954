//! The map widget.

use std::path::Path;

use ee_common::{EeError, EeResult, LatLon};
use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use crate::html::{js_literal, js_string, render_page, Page};
use crate::layer::TileLayer;

/// Highest zoom level Leaflet tile layers are configured for.
pub const MAX_ZOOM: u8 = 24;

/// Mutable view state of an interactive map.
#[derive(Debug, Clone)]
pub struct Map {
    element_id: String,
    title: String,
    center: LatLon,
    zoom: u8,
    width: String,
    height: String,
    base: TileLayer,
    overlays: Vec<TileLayer>,
    layer_control: bool,
    fullscreen: bool,
    lat_lng_popup: bool,
}

impl Map {
    /// A map with an OpenStreetMap base layer and no controls.
    pub fn new(center: LatLon, zoom: u8) -> Self {
        Self {
            element_id: format!("map_{}", Uuid::new_v4().simple()),
            title: "Map".to_string(),
            center,
            zoom,
            width: "100%".to_string(),
            height: "100%".to_string(),
            base: TileLayer::openstreetmap(),
            overlays: Vec::new(),
            layer_control: false,
            fullscreen: false,
            lat_lng_popup: false,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_base_layer(mut self, base: TileLayer) -> Self {
        self.base = base;
        self
    }

    /// CSS width and height of the map element, e.g. "100%" or "600px".
    pub fn with_size(mut self, width: impl Into<String>, height: impl Into<String>) -> Self {
        self.width = width.into();
        self.height = height.into();
        self
    }

    pub fn with_layer_control(mut self, enabled: bool) -> Self {
        self.layer_control = enabled;
        self
    }

    pub fn with_fullscreen(mut self, enabled: bool) -> Self {
        self.fullscreen = enabled;
        self
    }

    /// Show the clicked coordinates in a popup.
    pub fn with_lat_lng_popup(mut self, enabled: bool) -> Self {
        self.lat_lng_popup = enabled;
        self
    }

    pub fn element_id(&self) -> &str {
        &self.element_id
    }

    pub fn center(&self) -> LatLon {
        self.center
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn base_layer(&self) -> &TileLayer {
        &self.base
    }

    /// Overlay layers in insertion order.
    pub fn overlays(&self) -> &[TileLayer] {
        &self.overlays
    }

    pub fn has_layer_control(&self) -> bool {
        self.layer_control
    }

    pub fn has_fullscreen(&self) -> bool {
        self.fullscreen
    }

    pub fn has_lat_lng_popup(&self) -> bool {
        self.lat_lng_popup
    }

    pub fn set_center(&mut self, center: LatLon, zoom: u8) {
        self.center = center;
        self.zoom = zoom;
    }

    /// Add a tile layer on top of the existing ones.
    pub fn add_tile_layer(&mut self, layer: TileLayer) -> EeResult<()> {
        layer.validate()?;
        debug!(name = %layer.name, url = %layer.url_template, "Adding tile layer");
        self.overlays.push(layer);
        Ok(())
    }

    fn validate(&self) -> EeResult<()> {
        if !self.center.is_valid() {
            return Err(EeError::Render(format!(
                "map center ({}, {}) is not a valid position",
                self.center.lat, self.center.lon
            )));
        }
        if self.zoom > MAX_ZOOM {
            return Err(EeError::Render(format!(
                "zoom {} exceeds {}",
                self.zoom, MAX_ZOOM
            )));
        }
        self.base.validate()
    }

    /// Serialize to one self-contained HTML document.
    pub fn render_html(&self) -> EeResult<String> {
        self.validate()?;
        let script = self.render_script();
        Ok(render_page(&Page {
            title: &self.title,
            element_id: &self.element_id,
            width: &self.width,
            height: &self.height,
            fullscreen: self.fullscreen,
            script: &script,
        }))
    }

    /// Render and write the document to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> EeResult<()> {
        let html = self.render_html()?;
        std::fs::write(path.as_ref(), html)?;
        info!(
            path = %path.as_ref().display(),
            overlays = self.overlays.len(),
            "Saved map"
        );
        Ok(())
    }

    fn render_script(&self) -> String {
        let map = &self.element_id;
        let mut js = String::new();

        let options = json!({
            "center": [self.center.lat, self.center.lon],
            "zoom": self.zoom,
            "zoomControl": true,
            "preferCanvas": false,
        });
        js.push_str(&format!(
            "        var {map} = L.map({id}, {opts});\n",
            id = js_string(map),
            opts = js_literal(&options)
        ));

        let base_var = format!("tile_layer_{}_base", map);
        js.push_str(&format!(
            "        var {base_var} = L.tileLayer({url}, {opts}).addTo({map});\n",
            url = js_string(&self.base.url_template),
            opts = js_literal(&self.base.leaflet_options())
        ));

        let mut base_entries = vec![(self.base.name.clone(), base_var)];
        let mut overlay_entries = Vec::new();
        for (i, layer) in self.overlays.iter().enumerate() {
            let var = format!("tile_layer_{}_{}", map, i);
            let add = if layer.show {
                format!(".addTo({})", map)
            } else {
                String::new()
            };
            js.push_str(&format!(
                "        var {var} = L.tileLayer({url}, {opts}){add};\n",
                url = js_string(&layer.url_template),
                opts = js_literal(&layer.leaflet_options())
            ));
            if layer.control {
                let entry = (layer.name.clone(), var);
                if layer.overlay {
                    overlay_entries.push(entry);
                } else {
                    base_entries.push(entry);
                }
            }
        }

        if self.layer_control {
            js.push_str(&format!(
                "        L.control.layers({}, {}, {{\"position\": \"topright\", \"collapsed\": true}}).addTo({map});\n",
                js_object(&base_entries),
                js_object(&overlay_entries)
            ));
        }

        if self.fullscreen {
            js.push_str(&format!(
                "        L.control.fullscreen({{\"position\": \"topleft\", \"title\": \"Full Screen\", \"titleCancel\": \"Exit Full Screen\"}}).addTo({map});\n"
            ));
        }

        if self.lat_lng_popup {
            js.push_str(&format!(
                "        var lat_lng_popup_{map} = L.popup();\n        {map}.on(\"click\", function(e) {{\n            lat_lng_popup_{map}.setLatLng(e.latlng).setContent(\"Latitude: \" + e.latlng.lat.toFixed(4) + \"<br>Longitude: \" + e.latlng.lng.toFixed(4)).openOn({map});\n        }});\n"
            ));
        }

        js
    }
}

/// `{"name": variable, ...}` with names as escaped string keys and raw variable values.
fn js_object(entries: &[(String, String)]) -> String {
    let body: Vec<String> = entries
        .iter()
        .map(|(name, var)| format!("{}: {}", js_string(name), var))
        .collect();
    format!("{{{}}}", body.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Map {
        Map::new(LatLon::new(14.09, -59.9358), 3)
    }

    #[test]
    fn test_element_id_is_unique() {
        assert_ne!(sample().element_id(), sample().element_id());
        assert!(sample().element_id().starts_with("map_"));
        assert_eq!(sample().element_id().len(), 4 + 32);
    }

    #[test]
    fn test_add_tile_layer_rejects_invalid() {
        let mut map = sample();
        let err = map.add_tile_layer(TileLayer::earth_engine("", "http://x/{z}/{x}/{y}"));
        assert!(err.is_err());
        assert!(map.overlays().is_empty());
    }

    #[test]
    fn test_invalid_center() {
        let map = Map::new(LatLon::new(120.0, 0.0), 3);
        assert!(matches!(map.render_html(), Err(EeError::Render(_))));
    }

    #[test]
    fn test_zoom_limit() {
        let map = Map::new(LatLon::new(0.0, 0.0), MAX_ZOOM + 1);
        assert!(map.render_html().is_err());
    }

    #[test]
    fn test_script_statements_in_order() {
        let mut map = sample()
            .with_layer_control(true)
            .with_fullscreen(true)
            .with_lat_lng_popup(true);
        map.add_tile_layer(TileLayer::earth_engine("difference", "http://x/{z}/{x}/{y}"))
            .unwrap();
        let script = map.render_script();

        let markers = [
            "= L.map(",
            "_base = L.tileLayer(",
            "_0 = L.tileLayer(",
            "L.control.layers(",
            "L.control.fullscreen(",
            "L.popup()",
            ".on(\"click\"",
        ];
        let positions: Vec<usize> = markers
            .iter()
            .map(|m| script.find(m).unwrap_or_else(|| panic!("missing {}", m)))
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{}", script);
        assert!(script.ends_with("});\n"));
        assert!(script.lines().all(|l| l.starts_with("        ")));
    }

    #[test]
    fn test_hidden_layer_not_added() {
        let mut map = sample();
        map.add_tile_layer(TileLayer::earth_engine("ndvi", "http://x/{z}/{x}/{y}").hidden())
            .unwrap();
        let html = map.render_html().unwrap();
        let line = html
            .lines()
            .find(|l| l.contains("tile_layer_") && l.contains("_0 = "))
            .unwrap();
        assert!(!line.contains(".addTo("));
    }
}
