//! Template context construction.
//!
//! Every render sees the same shape: the generator's `product` plus every key
//! of the request's `body`, in body order.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{MailgenError, Result};
use crate::product::Product;

/// Builds the template context for one render request.
///
/// The context starts as `{ "product": product }` and every key of
/// `request.body` is copied over it. A `body.product` key therefore replaces
/// the configured product for this call only.
///
/// # Errors
///
/// - [`MailgenError::MissingParams`] if `request` does not serialize to an object
/// - [`MailgenError::MissingBody`] if `request.body` is absent or not an object
///
/// # Example
///
/// ```rust
/// use mailgen::{build_context, Product};
/// use serde_json::json;
///
/// let product = Product::new("Acme", "https://acme.test");
/// let context = build_context(&product, &json!({ "body": { "name": "Jane" } })).unwrap();
///
/// assert_eq!(context["name"], "Jane");
/// assert_eq!(context["product"]["name"], "Acme");
/// ```
pub fn build_context<R>(product: &Product, request: &R) -> Result<Value>
where
    R: Serialize + ?Sized,
{
    let request = serde_json::to_value(request).map_err(|_| MailgenError::MissingParams)?;
    let Value::Object(mut request) = request else {
        return Err(MailgenError::MissingParams);
    };
    let Some(Value::Object(body)) = request.remove("body") else {
        return Err(MailgenError::MissingBody);
    };

    if body.contains_key("product") {
        debug!(
            product = product.name(),
            "request body overrides the configured product for this render"
        );
    }

    let mut context = Map::with_capacity(body.len() + 1);
    context.insert("product".to_string(), Value::from(product));
    for (key, value) in body {
        context.insert(key, value);
    }

    Ok(Value::Object(context))
}
