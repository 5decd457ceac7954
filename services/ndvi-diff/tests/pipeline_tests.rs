//! End-to-end pipeline tests against an in-memory imagery service.

use std::sync::Mutex;

use async_trait::async_trait;
use ee_client::{ImageryService, MapId, MapOptions};
use ee_common::{EeError, EeResult};
use ee_expr::Expression;
use serde_json::Value;

use ndvi_diff::pipeline::NDVI_LAYER_NAME;
use ndvi_diff::{Pipeline, Scenario};
use test_utils::assert_lat_lon_approx_eq;
use test_utils::fixtures::{display, images, region};

struct FakeService {
    region_count: Value,
    map_error: Option<EeError>,
    computed: Mutex<Vec<Expression>>,
    maps: Mutex<Vec<Expression>>,
}

impl FakeService {
    fn new(region_count: u64) -> Self {
        Self::replying(Value::from(region_count))
    }

    fn replying(region_count: Value) -> Self {
        Self {
            region_count,
            map_error: None,
            computed: Mutex::new(Vec::new()),
            maps: Mutex::new(Vec::new()),
        }
    }

    fn failing_maps(error: EeError) -> Self {
        Self {
            map_error: Some(error),
            ..Self::new(1)
        }
    }
}

#[async_trait]
impl ImageryService for FakeService {
    async fn compute_value(&self, expression: &Expression) -> EeResult<Value> {
        self.computed.lock().unwrap().push(expression.clone());
        Ok(self.region_count.clone())
    }

    async fn create_map(&self, expression: &Expression, _options: &MapOptions) -> EeResult<MapId> {
        if let Some(err) = &self.map_error {
            return Err(err.clone());
        }
        let mut maps = self.maps.lock().unwrap();
        maps.push(expression.clone());
        Ok(MapId::new(
            format!("projects/test-project/maps/m{}", maps.len()),
            "https://stub.invalid",
        ))
    }
}

/// The root invocation of an encoded expression.
fn root(expression: &Expression) -> Value {
    let json = expression.to_json();
    let key = json["result"].as_str().unwrap().to_string();
    json["values"][key.as_str()]["functionInvocationValue"].clone()
}

#[tokio::test]
async fn test_brazil_difference_map() {
    let service = FakeService::new(1);
    let map = Pipeline::run(&service, &Scenario::default()).await.unwrap();

    assert_eq!(map.overlays().len(), 1);
    assert_eq!(map.overlays()[0].name, display::LAYER_NAME);
    assert_eq!(
        map.overlays()[0].url_template,
        "https://stub.invalid/v1/projects/test-project/maps/m1/tiles/{z}/{x}/{y}"
    );
    let center = map.center();
    assert_lat_lon_approx_eq!(
        (center.lat, center.lon),
        (display::CENTER_LAT, display::CENTER_LON),
        1e-9
    );
    assert_eq!(map.zoom(), display::ZOOM);
    assert!(map.has_layer_control());
}

#[tokio::test]
async fn test_map_request_carries_stretch_and_clip() {
    let service = FakeService::new(1);
    Pipeline::run(&service, &Scenario::default()).await.unwrap();

    let maps = service.maps.lock().unwrap();
    assert_eq!(maps.len(), 1);
    let names = maps[0].function_names();
    for f in [
        "Collection.loadTable",
        "Filter.equals",
        "Collection.filter",
        "Collection.geometry",
        "Image.load",
        "Image.subtract",
        "Image.clip",
        "Image.visualize",
    ] {
        assert!(names.contains(&f), "missing {} in {:?}", f, names);
    }

    let vis = root(&maps[0]);
    assert_eq!(vis["functionName"], "Image.visualize");
    assert_eq!(vis["arguments"]["min"]["constantValue"], display::STRETCH_MIN);
    assert_eq!(vis["arguments"]["max"]["constantValue"], display::STRETCH_MAX);
    assert_eq!(
        vis["arguments"]["bands"]["constantValue"],
        serde_json::json!(images::VIS_BANDS)
    );

    let wire = maps[0].to_json().to_string();
    assert!(wire.contains(region::LSIB_TABLE));
    assert!(wire.contains(region::BRAZIL));
    assert!(wire.contains(images::EARLY));
    assert!(wire.contains(images::LATE));
}

#[tokio::test]
async fn test_region_check_sends_size_request() {
    let service = FakeService::new(1);
    Pipeline::run(&service, &Scenario::default()).await.unwrap();

    let computed = service.computed.lock().unwrap();
    assert_eq!(computed.len(), 1);
    assert_eq!(root(&computed[0])["functionName"], "Collection.size");
}

#[tokio::test]
async fn test_unknown_country_is_not_found() {
    let service = FakeService::new(0);
    let scenario = Scenario {
        country: "Atlantis".to_string(),
        ..Scenario::default()
    };
    let err = Pipeline::run(&service, &scenario).await.unwrap_err();
    match err {
        EeError::RegionNotFound { property, value } => {
            assert_eq!(property, region::COUNTRY_PROPERTY);
            assert_eq!(value, "Atlantis");
        }
        other => panic!("unexpected error {:?}", other),
    }
    assert!(service.maps.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_ambiguous_country_is_rejected() {
    let service = FakeService::new(2);
    let err = Pipeline::run(&service, &Scenario::default()).await.unwrap_err();
    assert!(matches!(err, EeError::RegionNotUnique { count: 2, .. }));
}

#[tokio::test]
async fn test_fractional_region_count_is_rejected() {
    let service = FakeService::replying(Value::from(1.7));
    let err = Pipeline::run(&service, &Scenario::default()).await.unwrap_err();
    assert!(matches!(err, EeError::Decode(_)));
    assert!(service.maps.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_whole_float_region_count_is_accepted() {
    let service = FakeService::replying(Value::from(1.0));
    let map = Pipeline::run(&service, &Scenario::default()).await.unwrap();
    assert_eq!(map.overlays().len(), 1);
}

#[tokio::test]
async fn test_region_check_can_be_disabled() {
    let service = FakeService::new(0);
    let scenario = Scenario {
        verify_region: false,
        ..Scenario::default()
    };
    let map = Pipeline::run(&service, &scenario).await.unwrap();
    assert_eq!(map.overlays().len(), 1);
    assert!(service.computed.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_remote_error_propagates_unchanged() {
    let remote = EeError::Service {
        code: 403,
        status: "PERMISSION_DENIED".to_string(),
        message: "Project not registered.".to_string(),
    };
    let service = FakeService::failing_maps(remote.clone());
    let err = Pipeline::run(&service, &Scenario::default()).await.unwrap_err();
    assert_eq!(err.to_string(), remote.to_string());
    assert_eq!(err.http_status_code(), Some(403));
}

#[tokio::test]
async fn test_optional_ndvi_layer_is_hidden() {
    let service = FakeService::new(1);
    let scenario = Scenario {
        show_ndvi: true,
        ..Scenario::default()
    };
    let map = Pipeline::run(&service, &scenario).await.unwrap();

    let names: Vec<_> = map.overlays().iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, [display::LAYER_NAME, NDVI_LAYER_NAME]);
    assert!(map.overlays()[0].show);
    assert!(!map.overlays()[1].show);

    let maps = service.maps.lock().unwrap();
    assert!(maps[1]
        .function_names()
        .contains(&"Image.normalizedDifference"));
}

#[tokio::test]
async fn test_invalid_scenario_makes_no_calls() {
    let service = FakeService::new(1);
    let mut scenario = Scenario::default();
    scenario.vis.min = 64.0;
    let err = Pipeline::run(&service, &scenario).await.unwrap_err();
    assert!(matches!(err, EeError::InvalidParameter { .. }));
    assert!(service.computed.lock().unwrap().is_empty());
    assert!(service.maps.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_rendered_document() {
    let service = FakeService::new(1);
    let map = Pipeline::run(&service, &Scenario::default()).await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("difference.html");
    map.save(&path).unwrap();
    let html = std::fs::read_to_string(&path).unwrap();
    assert!(html.contains("\"center\":[14.09,-59.9358]"));
    assert!(html.contains("\"difference\": tile_layer_"));
}

#[test]
fn test_bundled_scenario_matches_defaults() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config/brazil.yaml");
    assert_eq!(Scenario::load(path).unwrap(), Scenario::default());
}
