//! Shared evaluation path for single-point samples

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{AppError, Result};
use crate::imagery::expression::Expression;
use crate::imagery::traits::ImageryPlatform;

/// Evaluate `expression` and read the numeric `key` from the resulting
/// dictionary.
///
/// Credential problems are returned as errors. Any failure of the
/// computation itself is logged and reported as a missing value, as is a
/// result without `key` (e.g. no imagery in the window).
pub async fn sample_value(
    platform: &dyn ImageryPlatform,
    expression: &Expression,
    key: &str,
) -> Result<Option<f64>> {
    if !platform.is_initialized() {
        platform
            .initialize()
            .await
            .map_err(|e| AppError::NotInitialized(e.to_string()))?;
    }

    match platform.compute(expression).await {
        Ok(result) => {
            let value = extract(&result, key);
            debug!(platform = platform.name(), key, value = ?value, "Sample computed");
            Ok(value)
        }
        Err(e) if e.is_setup_failure() => Err(e),
        Err(e) => {
            warn!(platform = platform.name(), key, error = %e, "Sample computation failed");
            Ok(None)
        }
    }
}

fn extract(result: &Value, key: &str) -> Option<f64> {
    result.get(key).and_then(Value::as_f64)
}
