//! Imagery platform abstraction

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::imagery::expression::Expression;

/// A remote geospatial analysis platform able to evaluate expression graphs
#[async_trait]
pub trait ImageryPlatform: Send + Sync {
    /// Platform name, for logs
    fn name(&self) -> &str;

    /// Acquire credentials. Safe to call repeatedly.
    async fn initialize(&self) -> Result<()>;

    /// Whether credentials have been acquired at least once
    fn is_initialized(&self) -> bool;

    /// Evaluate an expression and return its result value
    async fn compute(&self, expression: &Expression) -> Result<Value>;
}
