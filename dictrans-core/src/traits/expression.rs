use serde_json::Value;

use super::Translatable;
use crate::errors::DictTransResult;

/// Evaluates expression directives against the root object that owns the
/// annotated field.
pub trait IExpressionEvaluator: Send + Sync {
    /// `Ok(None)` leaves the field untouched.
    fn evaluate(&self, expression: &str, root: &dyn Translatable) -> DictTransResult<Option<Value>>;
}
