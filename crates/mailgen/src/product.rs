//! Product identity shared by every e-mail a generator renders.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{MailgenError, Result};

/// The product an e-mail is sent on behalf of.
///
/// A product always has a non-empty `name` and `link`. Any other fields
/// (`logo`, `logoHeight`, `copyright`, ...) are passed to templates as-is under
/// `product`.
///
/// # Example
///
/// ```rust
/// use mailgen::Product;
///
/// let product = Product::new("Acme", "https://acme.test")
///     .logo("https://acme.test/logo.png")
///     .copyright("Copyright © 2026 Acme. All rights reserved.");
///
/// assert_eq!(product.name(), "Acme");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Product {
    fields: Map<String, Value>,
}

impl Product {
    /// Creates a product with the two required fields.
    pub fn new(name: impl Into<String>, link: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert("name".into(), Value::String(name.into()));
        fields.insert("link".into(), Value::String(link.into()));
        Self { fields }
    }

    /// Validates a loosely-typed product value, as found in configuration.
    ///
    /// # Errors
    ///
    /// - [`MailgenError::MissingProduct`] if `value` is absent or not an object
    /// - [`MailgenError::MissingProductFields`] if `name` or `link` is missing,
    ///   empty, or not a string
    pub fn from_value(value: Option<Value>) -> Result<Self> {
        let fields = match value {
            Some(Value::Object(fields)) => fields,
            _ => return Err(MailgenError::MissingProduct),
        };

        let present = |key: &str| {
            fields
                .get(key)
                .and_then(Value::as_str)
                .is_some_and(|s| !s.is_empty())
        };
        if !present("name") || !present("link") {
            return Err(MailgenError::MissingProductFields);
        }

        Ok(Self { fields })
    }

    /// Sets the logo image URL (`product.logo`).
    pub fn logo(self, url: impl Into<String>) -> Self {
        self.with("logo", url.into())
    }

    /// Sets the copyright line (`product.copyright`).
    pub fn copyright(self, text: impl Into<String>) -> Self {
        self.with("copyright", text.into())
    }

    /// Sets an arbitrary field available to templates as `product.<key>`.
    ///
    /// `name` and `link` cannot be replaced this way.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        if key != "name" && key != "link" {
            self.fields.insert(key, value.into());
        }
        self
    }

    pub fn name(&self) -> &str {
        self.str_field("name")
    }

    pub fn link(&self) -> &str {
        self.str_field("link")
    }

    /// Looks up any product field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    fn str_field(&self, key: &str) -> &str {
        self.fields.get(key).and_then(Value::as_str).unwrap_or_default()
    }
}

impl From<Product> for Value {
    fn from(product: Product) -> Self {
        Value::Object(product.fields)
    }
}

impl From<&Product> for Value {
    fn from(product: &Product) -> Self {
        Value::Object(product.fields.clone())
    }
}
