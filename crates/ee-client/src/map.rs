//! Map ids and tile-layer requests.

use ee_common::{EeResult, VisParams};
use ee_expr::{ComputedObject, Expression, Image};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::client::ImageryService;

/// Tile encoding requested from the service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileFormat {
    /// JPEG for opaque tiles, PNG where any pixel is masked
    #[default]
    AutoJpegPng,
    Png,
    Jpeg,
}

/// Options for a map creation request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapOptions {
    pub file_format: FileFormat,
}

/// A rendered map registered with the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapId {
    /// Resource name, `projects/<project>/maps/<id>`
    pub name: String,

    /// Tile URL with `{z}`, `{x}`, `{y}` placeholders
    pub tile_url_template: String,
}

impl MapId {
    pub fn new(name: impl Into<String>, base_url: &str) -> Self {
        let name = name.into();
        let tile_url_template = format!(
            "{}/v1/{}/tiles/{{z}}/{{x}}/{{y}}",
            base_url.trim_end_matches('/'),
            name
        );
        Self {
            name,
            tile_url_template,
        }
    }

    /// The map id segment of the resource name.
    pub fn id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }

    /// Concrete URL of one tile.
    pub fn tile_url(&self, z: u32, x: u32, y: u32) -> String {
        self.tile_url_template
            .replace("{z}", &z.to_string())
            .replace("{x}", &x.to_string())
            .replace("{y}", &y.to_string())
    }
}

/// Everything needed to add a remote image to a web map.
#[derive(Debug, Clone, PartialEq)]
pub struct TileLayerRequest {
    pub map_id: MapId,
    pub vis: VisParams,
    pub expression: Expression,
}

/// Register `image` with the service using the given stretch and bands.
///
/// The stretch is applied server-side through `Image.visualize`, so the
/// registered map serves ready-to-display RGB tiles.
pub async fn request_tile_layer<S>(
    service: &S,
    image: &Image,
    vis: &VisParams,
) -> EeResult<TileLayerRequest>
where
    S: ImageryService + ?Sized,
{
    vis.validate()?;
    let expression = image.visualize(vis)?.to_expression();
    let map_id = service
        .create_map(&expression, &MapOptions::default())
        .await?;
    info!(
        map = %map_id.name,
        bands = ?vis.bands,
        min = vis.min,
        max = vis.max,
        "Registered tile layer"
    );
    Ok(TileLayerRequest {
        map_id,
        vis: vis.clone(),
        expression,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ee_common::EeError;
    use serde_json::Value;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingService {
        maps: Mutex<Vec<Expression>>,
    }

    #[async_trait]
    impl ImageryService for RecordingService {
        async fn compute_value(&self, _expression: &Expression) -> EeResult<Value> {
            Err(EeError::Transport("not used".to_string()))
        }

        async fn create_map(&self, expression: &Expression, _options: &MapOptions) -> EeResult<MapId> {
            self.maps.lock().unwrap().push(expression.clone());
            Ok(MapId::new("projects/p/maps/m1", "http://stub"))
        }
    }

    #[test]
    fn test_request_tile_layer_applies_visualize() {
        let service = RecordingService::default();
        let vis = VisParams::stretch(["B4", "B3", "B2"], -32.0, 32.0);
        let layer = tokio_test::block_on(request_tile_layer(
            &service,
            &Image::load("a"),
            &vis,
        ))
        .unwrap();

        let sent = service.maps.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0], layer.expression);
        assert_eq!(sent[0].function_names(), vec!["Image.load", "Image.visualize"]);
        assert_eq!(layer.map_id.tile_url(0, 0, 0), "http://stub/v1/projects/p/maps/m1/tiles/0/0/0");
    }

    #[test]
    fn test_tile_url_template() {
        let map = MapId::new("projects/p/maps/abc123", "https://earthengine.googleapis.com/");
        assert_eq!(
            map.tile_url_template,
            "https://earthengine.googleapis.com/v1/projects/p/maps/abc123/tiles/{z}/{x}/{y}"
        );
        assert_eq!(map.id(), "abc123");
        assert_eq!(
            map.tile_url(3, 2, 4),
            "https://earthengine.googleapis.com/v1/projects/p/maps/abc123/tiles/3/2/4"
        );
    }

    #[test]
    fn test_file_format_wire_name() {
        let json = serde_json::to_value(FileFormat::AutoJpegPng).unwrap();
        assert_eq!(json, "AUTO_JPEG_PNG");
    }
}
