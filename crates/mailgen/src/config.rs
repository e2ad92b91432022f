//! Generator configuration.
//!
//! A [`GeneratorConfig`] is built in code or loaded from YAML/JSON:
//!
//! ```yaml
//! theme: salted                 # or { path: ..., plaintextPath: ... }
//! product:
//!   name: Acme
//!   link: https://acme.test
//!   logo: https://acme.test/logo.png
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{MailgenError, Result};
use crate::product::Product;
use crate::theme::DEFAULT_THEME;

/// Which theme a generator renders with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThemeSelector {
    /// A bundled theme, or `<root>/themes/<name>/` when a root is configured.
    Builtin(String),
    /// Explicit template files. A missing path falls back to the default
    /// theme's bundled file for that variant.
    Custom {
        path: Option<PathBuf>,
        plaintext_path: Option<PathBuf>,
    },
    /// Template sources supplied directly, without touching the filesystem.
    Inline { html: String, plaintext: String },
}

impl ThemeSelector {
    pub fn builtin(name: impl Into<String>) -> Self {
        let name = name.into();
        if name.is_empty() {
            Self::default()
        } else {
            Self::Builtin(name)
        }
    }

    /// Both template files at explicit locations.
    pub fn custom(path: impl Into<PathBuf>, plaintext_path: impl Into<PathBuf>) -> Self {
        Self::Custom {
            path: Some(path.into()),
            plaintext_path: Some(plaintext_path.into()),
        }
    }

    pub fn inline(html: impl Into<String>, plaintext: impl Into<String>) -> Self {
        Self::Inline {
            html: html.into(),
            plaintext: plaintext.into(),
        }
    }

    /// Interprets a loosely-typed theme value.
    ///
    /// A non-empty string names a bundled theme. An object with `html` and
    /// `plaintext` strings is an inline theme; any other object is read for
    /// `path` and `plaintextPath` (or `plaintext_path`). Everything else,
    /// including an empty string, selects the default theme.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::String(name) => Self::builtin(name.as_str()),
            Value::Object(map) => {
                let text = |keys: &[&str]| {
                    keys.iter()
                        .find_map(|key| map.get(*key).and_then(Value::as_str))
                        .filter(|s| !s.is_empty())
                };

                if let (Some(html), Some(plaintext)) = (
                    map.get("html").and_then(Value::as_str),
                    map.get("plaintext").and_then(Value::as_str),
                ) {
                    return Self::inline(html, plaintext);
                }

                Self::Custom {
                    path: text(&["path"]).map(PathBuf::from),
                    plaintext_path: text(&["plaintextPath", "plaintext_path"]).map(PathBuf::from),
                }
            }
            _ => Self::default(),
        }
    }
}

impl Default for ThemeSelector {
    fn default() -> Self {
        Self::Builtin(DEFAULT_THEME.to_string())
    }
}

impl From<&str> for ThemeSelector {
    fn from(name: &str) -> Self {
        Self::builtin(name)
    }
}

impl From<String> for ThemeSelector {
    fn from(name: String) -> Self {
        Self::builtin(name)
    }
}

impl<'de> Deserialize<'de> for ThemeSelector {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value))
    }
}

/// Everything a [`Mailgen`](crate::Mailgen) needs at construction.
///
/// `product` stays loosely typed until construction so that configuration
/// files with a malformed product fail with the same errors as code does.
///
/// # Example
///
/// ```rust
/// use mailgen::{GeneratorConfig, Product};
///
/// let config = GeneratorConfig::new(Product::new("Acme", "https://acme.test"))
///     .theme("salted");
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub theme: ThemeSelector,
    pub product: Option<Value>,
    /// Directory holding `themes/`. When unset, themes come from the copies
    /// compiled into the crate.
    pub root: Option<PathBuf>,
}

impl GeneratorConfig {
    pub fn new(product: Product) -> Self {
        Self {
            product: Some(product.into()),
            ..Self::default()
        }
    }

    pub fn theme(mut self, theme: impl Into<ThemeSelector>) -> Self {
        self.theme = theme.into();
        self
    }

    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Parses a configuration from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Parses a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads a configuration file, choosing the format by extension
    /// (`.yaml`/`.yml` or `.json`).
    ///
    /// Relative theme paths inside the file are kept as written and resolve
    /// against the working directory.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        let content = fs::read_to_string(path).map_err(|e| {
            MailgenError::config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        match extension.as_deref() {
            Some("yaml") | Some("yml") => Self::from_yaml(&content),
            Some("json") => Self::from_json(&content),
            _ => Err(MailgenError::config(format!(
                "Unsupported configuration format: {}",
                path.display()
            ))),
        }
    }
}
