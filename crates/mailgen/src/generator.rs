//! The e-mail generator.

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::config::GeneratorConfig;
use crate::context::build_context;
use crate::engine::{MiniJinjaEngine, TemplateEngine};
use crate::error::{MailgenError, Result};
use crate::product::Product;
use crate::styles::{CssInliner, StyleInliner};
use crate::theme::{resolve_theme, ThemeSources, HTML_TEMPLATE, PLAINTEXT_TEMPLATE};

/// Both variants of one e-mail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    /// HTML with styles inlined.
    pub html: String,
    pub text: String,
}

/// Renders e-mail bodies for one product in one theme.
///
/// Construction validates the product and loads the theme's two templates;
/// after that the generator never touches the filesystem. Rendering takes
/// `&self` and the generator is `Send + Sync`, so one instance can serve
/// concurrent callers.
///
/// # Example
///
/// ```rust
/// use mailgen::{GeneratorConfig, Mailgen, Product};
/// use serde_json::json;
///
/// let mailgen = Mailgen::new(GeneratorConfig::new(Product::new("Acme", "https://acme.test")))?;
///
/// let text = mailgen.generate_plaintext(&json!({ "body": { "intro": "Welcome" } }))?;
/// assert!(text.contains("Welcome"));
/// # Ok::<(), mailgen::MailgenError>(())
/// ```
pub struct Mailgen {
    product: Product,
    theme: ThemeSources,
    engine: Box<dyn TemplateEngine>,
    inliner: Box<dyn StyleInliner>,
}

impl Mailgen {
    /// Creates a generator with the MiniJinja engine and the CSS inliner.
    ///
    /// # Errors
    ///
    /// - [`MailgenError::MissingProduct`] / [`MailgenError::MissingProductFields`]
    ///   if the product is absent or incomplete
    /// - [`MailgenError::InvalidTheme`] / [`MailgenError::InvalidPlaintextTheme`]
    ///   if a theme template does not exist
    /// - [`MailgenError::ThemeRead`] if a theme template cannot be read
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        Self::with_engines(
            config,
            Box::new(MiniJinjaEngine::new()),
            Box::new(CssInliner::new()),
        )
    }

    /// Creates a generator with a custom template engine and style inliner.
    ///
    /// Validation and theme loading are the same as [`Mailgen::new`].
    pub fn with_engines(
        config: GeneratorConfig,
        engine: Box<dyn TemplateEngine>,
        inliner: Box<dyn StyleInliner>,
    ) -> Result<Self> {
        let GeneratorConfig {
            theme,
            product,
            root,
        } = config;

        let product = Product::from_value(product)?;
        let sources = resolve_theme(&theme, root.as_deref())?;

        debug!(product = product.name(), theme = ?theme, "mail generator ready");

        Ok(Self {
            product,
            theme: sources,
            engine,
            inliner,
        })
    }

    pub fn product(&self) -> &Product {
        &self.product
    }

    /// The theme sources loaded at construction.
    pub fn theme(&self) -> &ThemeSources {
        &self.theme
    }

    /// Renders the HTML variant with styles inlined.
    ///
    /// `request` must serialize to an object with a `body` object. The
    /// template sees `product` plus every body key; a `body.product` key
    /// replaces the configured product for this call only.
    ///
    /// # Errors
    ///
    /// - [`MailgenError::MissingParams`] / [`MailgenError::MissingBody`] for
    ///   malformed requests
    /// - [`MailgenError::Template`] if the engine fails
    /// - [`MailgenError::Inline`] if the inliner fails
    pub fn generate<R>(&self, request: &R) -> Result<String>
    where
        R: Serialize + ?Sized,
    {
        let context = build_context(&self.product, request)?;
        self.render_html(&context)
    }

    /// Renders the plaintext variant. Output is returned as the engine
    /// produced it.
    ///
    /// Request handling and errors match [`Mailgen::generate`], minus inlining.
    pub fn generate_plaintext<R>(&self, request: &R) -> Result<String>
    where
        R: Serialize + ?Sized,
    {
        let context = build_context(&self.product, request)?;
        self.render_text(&context)
    }

    /// Renders both variants from a single validated request.
    pub fn render<R>(&self, request: &R) -> Result<RenderedEmail>
    where
        R: Serialize + ?Sized,
    {
        let context = build_context(&self.product, request)?;
        Ok(RenderedEmail {
            html: self.render_html(&context)?,
            text: self.render_text(&context)?,
        })
    }

    fn render_html(&self, context: &Value) -> Result<String> {
        let html = self
            .engine
            .render_template(HTML_TEMPLATE, self.theme.html(), context)
            .map_err(MailgenError::Template)?;
        let html = self.inliner.inline(&html).map_err(MailgenError::Inline)?;
        debug!(len = html.len(), "rendered html");
        Ok(html)
    }

    fn render_text(&self, context: &Value) -> Result<String> {
        let text = self
            .engine
            .render_template(PLAINTEXT_TEMPLATE, self.theme.plaintext(), context)
            .map_err(MailgenError::Template)?;
        debug!(len = text.len(), "rendered plaintext");
        Ok(text)
    }
}

impl std::fmt::Debug for Mailgen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mailgen")
            .field("product", &self.product)
            .field("html", &self.theme.html_path())
            .field("plaintext", &self.theme.plaintext_path())
            .finish_non_exhaustive()
    }
}
