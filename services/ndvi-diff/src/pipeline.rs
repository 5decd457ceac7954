//! Request planning and execution.

use ee_client::{request_tile_layer, ImageryService};
use ee_common::{EeError, EeResult, VisParams};
use ee_expr::{ComputedObject, FeatureCollection, Filter, Geometry, Image, Number};
use serde_json::{json, Value};
use tracing::{info, instrument};
use webmap::{Map, TileLayer};

use crate::scenario::Scenario;

/// Stretch used for the optional index layer.
const NDVI_MIN: f64 = -1.0;
const NDVI_MAX: f64 = 1.0;

/// Overlay name of the optional index layer.
pub const NDVI_LAYER_NAME: &str = "ndvi";

/// Locally built request graph of one scenario.
#[derive(Debug, Clone)]
pub struct Plan {
    /// Boundary features matching the country filter
    pub region: FeatureCollection,

    /// Union of the matching boundaries
    pub boundary: Geometry,

    /// Number of matching boundaries, evaluated remotely
    pub region_size: Number,

    pub early: Image,
    pub late: Image,

    /// Index computed with `Image.normalizedDifference`
    pub ndvi: Image,

    /// Same index written out as (a-b)/(a+b)
    pub ndvi_explicit: Image,

    /// Late composite minus early composite over the same ordered bands
    pub difference: Image,

    /// `difference` clipped to `boundary`
    pub clipped: Image,
}

impl Plan {
    /// Serialized expressions keyed by step name.
    pub fn expressions(&self) -> Value {
        json!({
            "region_size": self.region_size.to_expression().to_json(),
            "boundary": self.boundary.to_expression().to_json(),
            "ndvi": self.ndvi.to_expression().to_json(),
            "ndvi_explicit": self.ndvi_explicit.to_expression().to_json(),
            "difference": self.difference.to_expression().to_json(),
            "clipped": self.clipped.to_expression().to_json(),
        })
    }
}

pub struct Pipeline;

impl Pipeline {
    /// Build every request of `scenario` without contacting the service.
    pub fn plan(scenario: &Scenario) -> Plan {
        let region = FeatureCollection::load(&scenario.boundary_table).filter(Filter::eq(
            &scenario.country_property,
            scenario.country.as_str(),
        ));
        let boundary = region.geometry();
        let region_size = region.size();

        let early = Image::load(&scenario.early_image);
        let late = Image::load(&scenario.late_image);

        let bands = scenario.ndvi_band_pair();
        let ndvi = early.normalized_difference(bands);
        let ndvi_explicit = early.normalized_difference_explicit(bands);

        let shared = &scenario.difference_bands;
        let difference = late
            .select(shared.iter().cloned())
            .subtract(early.select(shared.iter().cloned()));
        let clipped = difference.clip(&region);

        Plan {
            region,
            boundary,
            region_size,
            early,
            late,
            ndvi,
            ndvi_explicit,
            difference,
            clipped,
        }
    }

    /// Plan `scenario`, register its layers and assemble the map.
    #[instrument(skip(service, scenario), fields(country = %scenario.country))]
    pub async fn run<S>(service: &S, scenario: &Scenario) -> EeResult<Map>
    where
        S: ImageryService + ?Sized,
    {
        scenario
            .validate()
            .map_err(|e| EeError::invalid("scenario", e.to_string()))?;

        let plan = Self::plan(scenario);

        if scenario.verify_region {
            Self::verify_region(service, scenario, &plan).await?;
        }

        let mut map = Map::new(scenario.center, scenario.zoom)
            .with_title(&scenario.title)
            .with_layer_control(true)
            .with_fullscreen(true)
            .with_lat_lng_popup(true);

        let difference = request_tile_layer(service, &plan.clipped, &scenario.vis).await?;
        map.add_tile_layer(TileLayer::earth_engine(
            &scenario.layer_name,
            &difference.map_id.tile_url_template,
        ))?;

        if scenario.show_ndvi {
            let vis = VisParams::stretch([ee_expr::NORMALIZED_DIFFERENCE_BAND], NDVI_MIN, NDVI_MAX);
            let ndvi = request_tile_layer(service, &plan.ndvi.clip(&plan.region), &vis).await?;
            map.add_tile_layer(
                TileLayer::earth_engine(NDVI_LAYER_NAME, &ndvi.map_id.tile_url_template).hidden(),
            )?;
        }

        info!(
            overlays = map.overlays().len(),
            zoom = scenario.zoom,
            "Map assembled"
        );
        Ok(map)
    }

    /// Require the country filter to match exactly one boundary.
    pub async fn verify_region<S>(service: &S, scenario: &Scenario, plan: &Plan) -> EeResult<()>
    where
        S: ImageryService + ?Sized,
    {
        let value = service
            .compute_value(&plan.region_size.to_expression())
            .await?;
        let count = value
            .as_u64()
            .or_else(|| {
                value
                    .as_f64()
                    .filter(|f| *f >= 0.0 && f.fract() == 0.0)
                    .map(|f| f as u64)
            })
            .ok_or_else(|| EeError::Decode(format!("expected a feature count, got {}", value)))?;

        match count {
            1 => {
                info!(country = %scenario.country, "Region resolved");
                Ok(())
            }
            0 => Err(EeError::RegionNotFound {
                property: scenario.country_property.clone(),
                value: scenario.country.clone(),
            }),
            n => Err(EeError::RegionNotUnique {
                property: scenario.country_property.clone(),
                value: scenario.country.clone(),
                count: n,
            }),
        }
    }
}
