//! Night-time radiance from VIIRS monthly composites

use chrono::{Duration, NaiveDate, Utc};
use std::sync::Arc;
use tracing::info;

use crate::config::NightlightDataset;
use crate::error::Result;
use crate::geo::GeoPoint;
use crate::imagery::expression::{ops, Expression, Node};
use crate::imagery::sampling::sample_value;
use crate::imagery::traits::ImageryPlatform;

pub const RADIANCE_BAND: &str = "avg_rad";
/// nW/cm²/sr
const DARK_THRESHOLD: f64 = 10.0;

pub struct NightlightService {
    platform: Arc<dyn ImageryPlatform>,
    dataset: NightlightDataset,
}

impl NightlightService {
    pub fn new(platform: Arc<dyn ImageryPlatform>, dataset: NightlightDataset) -> Self {
        Self { platform, dataset }
    }

    pub async fn get_nightlight_for_point(&self, point: GeoPoint, date: Option<NaiveDate>) -> Result<Option<f64>> {
        let date = date.unwrap_or_else(|| Utc::now().date_naive());
        info!(lat = point.lat, lon = point.lon, %date, "Fetching nightlight");

        let expression = self.expression(point, date);
        sample_value(self.platform.as_ref(), &expression, RADIANCE_BAND).await
    }

    pub fn window(&self, date: NaiveDate) -> (NaiveDate, NaiveDate) {
        (date - Duration::days(self.dataset.lookback_days), date)
    }

    pub fn expression(&self, point: GeoPoint, date: NaiveDate) -> Expression {
        let (start, end) = self.window(date);
        let geometry = ops::point(point);

        let collection = ops::filter(
            ops::filter(
                ops::load_collection(&self.dataset.collection),
                ops::date_range(&start.to_string(), &end.to_string()),
            ),
            ops::bounds(geometry.clone()),
        );

        let radiance = Node::call("Image.select")
            .with("input", ops::mean_composite(collection))
            .with("bandSelectors", Node::constant(vec![RADIANCE_BAND]));

        Expression::new(ops::reduce_region_mean(
            radiance,
            geometry,
            self.dataset.scale_m,
        ))
    }
}

pub fn interpret(radiance: Option<f64>) -> &'static str {
    match radiance {
        Some(v) if v < DARK_THRESHOLD => "Dark area",
        _ => "Bright area",
    }
}
