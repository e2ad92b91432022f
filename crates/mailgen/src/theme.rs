//! Theme resolution and loading.
//!
//! A theme is a pair of template sources: one for the HTML body and one for
//! the plaintext body. The bundled themes are compiled into the crate; a
//! configured root replaces them with `<root>/themes/<name>/index.html` and
//! `index.txt` on disk.
//!
//! [`ThemePaths::resolve`] is the pure half (selector to file locations);
//! [`resolve_theme`] checks that the files exist and reads them once.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::ThemeSelector;
use crate::error::{MailgenError, Result};

/// Theme used when no theme (or an unusable theme value) is configured.
pub const DEFAULT_THEME: &str = "default";

/// Template name of the HTML variant.
pub const HTML_TEMPLATE: &str = "index.html";

/// Template name of the plaintext variant.
pub const PLAINTEXT_TEMPLATE: &str = "index.txt";

/// A theme compiled into the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BundledTheme {
    pub name: &'static str,
    pub html: &'static str,
    pub plaintext: &'static str,
}

const DEFAULT_BUNDLED: BundledTheme = BundledTheme {
    name: DEFAULT_THEME,
    html: include_str!("../themes/default/index.html"),
    plaintext: include_str!("../themes/default/index.txt"),
};

/// Every theme shipped with the crate.
pub const BUNDLED_THEMES: &[BundledTheme] = &[
    DEFAULT_BUNDLED,
    BundledTheme {
        name: "salted",
        html: include_str!("../themes/salted/index.html"),
        plaintext: include_str!("../themes/salted/index.txt"),
    },
];

/// Looks up a bundled theme by name.
pub fn bundled_theme(name: &str) -> Option<&'static BundledTheme> {
    BUNDLED_THEMES.iter().find(|theme| theme.name == name)
}

/// File locations of a theme's two templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemePaths {
    pub html: PathBuf,
    pub plaintext: PathBuf,
}

impl ThemePaths {
    /// Paths of a named theme under `root`.
    pub fn bundled(root: &Path, name: &str) -> Self {
        let dir = root.join("themes").join(name);
        Self {
            html: dir.join(HTML_TEMPLATE),
            plaintext: dir.join(PLAINTEXT_TEMPLATE),
        }
    }

    /// Computes where `selector`'s templates live. Returns `None` for inline
    /// themes, which have no files.
    ///
    /// This only builds paths; it never touches the filesystem.
    pub fn resolve(selector: &ThemeSelector, root: &Path) -> Option<Self> {
        match selector {
            ThemeSelector::Builtin(name) => Some(Self::bundled(root, name)),
            ThemeSelector::Custom {
                path,
                plaintext_path,
            } => {
                let fallback = Self::bundled(root, DEFAULT_THEME);
                Some(Self {
                    html: path.clone().unwrap_or(fallback.html),
                    plaintext: plaintext_path.clone().unwrap_or(fallback.plaintext),
                })
            }
            ThemeSelector::Inline { .. } => None,
        }
    }
}

/// The loaded sources of a theme. Never changes after loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeSources {
    html: String,
    plaintext: String,
    html_path: Option<PathBuf>,
    plaintext_path: Option<PathBuf>,
}

impl ThemeSources {
    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn plaintext(&self) -> &str {
        &self.plaintext
    }

    /// File the HTML source was read from; `None` for bundled and inline sources.
    pub fn html_path(&self) -> Option<&Path> {
        self.html_path.as_deref()
    }

    /// File the plaintext source was read from; `None` for bundled and inline sources.
    pub fn plaintext_path(&self) -> Option<&Path> {
        self.plaintext_path.as_deref()
    }
}

/// Resolves `selector` and reads both templates.
///
/// Without a `root`, named themes come from [`BUNDLED_THEMES`] and a custom
/// selector's missing variant uses the bundled default. With a `root`, named
/// themes and fallbacks are read from `<root>/themes/`.
///
/// The HTML template is checked first. A missing file is an error; there is no
/// fallback to another theme.
///
/// # Errors
///
/// - [`MailgenError::InvalidTheme`] if the HTML template does not exist
/// - [`MailgenError::InvalidPlaintextTheme`] if the plaintext template does not exist
/// - [`MailgenError::ThemeRead`] if an existing file cannot be read as UTF-8
pub fn resolve_theme(selector: &ThemeSelector, root: Option<&Path>) -> Result<ThemeSources> {
    let (bundled, html_path, plaintext_path) = match (selector, root) {
        (ThemeSelector::Inline { html, plaintext }, _) => {
            debug!(html_len = html.len(), plaintext_len = plaintext.len(), "using inline theme");
            return Ok(ThemeSources {
                html: html.clone(),
                plaintext: plaintext.clone(),
                html_path: None,
                plaintext_path: None,
            });
        }
        (_, Some(root)) => {
            let paths = ThemePaths::resolve(selector, root)
                .unwrap_or_else(|| ThemePaths::bundled(root, DEFAULT_THEME));
            (&DEFAULT_BUNDLED, Some(paths.html), Some(paths.plaintext))
        }
        (ThemeSelector::Builtin(name), None) => match bundled_theme(name) {
            Some(theme) => (theme, None, None),
            None => {
                return Err(MailgenError::InvalidTheme {
                    path: ThemePaths::bundled(Path::new(""), name).html,
                })
            }
        },
        (
            ThemeSelector::Custom {
                path,
                plaintext_path,
            },
            None,
        ) => (&DEFAULT_BUNDLED, path.clone(), plaintext_path.clone()),
    };

    if let Some(path) = html_path.as_ref().filter(|path| !path.exists()) {
        return Err(MailgenError::InvalidTheme { path: path.clone() });
    }
    if let Some(path) = plaintext_path.as_ref().filter(|path| !path.exists()) {
        return Err(MailgenError::InvalidPlaintextTheme { path: path.clone() });
    }

    let html = match &html_path {
        Some(path) => read_source(path)?,
        None => bundled.html.to_string(),
    };
    let plaintext = match &plaintext_path {
        Some(path) => read_source(path)?,
        None => bundled.plaintext.to_string(),
    };

    debug!(
        theme = ?selector,
        bundled = bundled.name,
        html = ?html_path,
        plaintext = ?plaintext_path,
        html_len = html.len(),
        plaintext_len = plaintext.len(),
        "resolved theme"
    );

    Ok(ThemeSources {
        html,
        plaintext,
        html_path,
        plaintext_path,
    })
}

fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| MailgenError::ThemeRead {
        path: path.to_path_buf(),
        source,
    })
}
