//! Vegetation greenness (NDVI) from Sentinel-2 surface reflectance

use chrono::{Duration, NaiveDate, Utc};
use std::sync::Arc;
use tracing::info;

use crate::config::NdviDataset;
use crate::error::Result;
use crate::geo::GeoPoint;
use crate::imagery::expression::{ops, Expression, Node};
use crate::imagery::sampling::sample_value;
use crate::imagery::traits::ImageryPlatform;

pub const NDVI_BAND: &str = "NDVI";
const NIR_BAND: &str = "B8";
const RED_BAND: &str = "B4";
const MAP_ARG: &str = "_MAPPING_VAR_0_0";
const HIGH_VEGETATION_THRESHOLD: f64 = 0.5;

pub struct NdviService {
    platform: Arc<dyn ImageryPlatform>,
    dataset: NdviDataset,
}

impl NdviService {
    pub fn new(platform: Arc<dyn ImageryPlatform>, dataset: NdviDataset) -> Self {
        Self { platform, dataset }
    }

    /// Mean NDVI at `point` over the temporal window around `date` (today by
    /// default). Cloudy scenes are skipped.
    pub async fn get_ndvi_for_point(&self, point: GeoPoint, date: Option<NaiveDate>) -> Result<Option<f64>> {
        let date = date.unwrap_or_else(|| Utc::now().date_naive());
        info!(lat = point.lat, lon = point.lon, %date, "Fetching NDVI");

        let expression = self.expression(point, date);
        sample_value(self.platform.as_ref(), &expression, NDVI_BAND).await
    }

    /// Window is `[date - w, date + w + 1)` in days
    pub fn window(&self, date: NaiveDate) -> (NaiveDate, NaiveDate) {
        let w = self.dataset.temporal_window_days;
        (date - Duration::days(w), date + Duration::days(w + 1))
    }

    pub fn expression(&self, point: GeoPoint, date: NaiveDate) -> Expression {
        let (start, end) = self.window(date);
        let geometry = ops::point(point);

        let collection = ops::filter(
            ops::filter(
                ops::filter(
                    ops::load_collection(&self.dataset.collection),
                    ops::date_range(&start.to_string(), &end.to_string()),
                ),
                ops::bounds(geometry.clone()),
            ),
            ops::property_less_than(
                "CLOUDY_PIXEL_PERCENTAGE",
                self.dataset.max_cloudy_pixel_percentage,
            ),
        );

        let per_image = Node::call("Collection.map")
            .with("collection", collection)
            .with("baseAlgorithm", Node::function(&[MAP_ARG], "1"));

        let reduced = ops::reduce_region_mean(
            ops::mean_composite(per_image),
            geometry,
            self.dataset.scale_m,
        );

        Expression::new(reduced).define("1", ndvi_image(Node::argument(MAP_ARG)))
    }
}

/// `normalizedDifference(B8, B4)` renamed to NDVI, keeping the acquisition time
fn ndvi_image(image: Node) -> Node {
    let ndvi = Node::call("Image.rename")
        .with(
            "input",
            Node::call("Image.normalizedDifference")
                .with("input", image.clone())
                .with("bandNames", Node::constant(vec![NIR_BAND, RED_BAND])),
        )
        .with("names", Node::constant(vec![NDVI_BAND]));

    Node::call("Element.copyProperties")
        .with("destination", ndvi)
        .with("source", image)
        .with("properties", Node::constant(vec!["system:time_start"]))
}

pub fn interpret(ndvi: Option<f64>) -> &'static str {
    match ndvi {
        Some(v) if v > HIGH_VEGETATION_THRESHOLD => "High vegetation",
        _ => "Low vegetation",
    }
}
