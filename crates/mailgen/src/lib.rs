//! # Mailgen - Themed Transactional E-mail Bodies
//!
//! `mailgen` turns a product identity, a theme and a structured description of
//! a message into two strings: an HTML body whose CSS has been inlined onto its
//! elements, and a matching plaintext body. Delivery is out of scope; the
//! output is meant to be handed to whatever sends your mail.
//!
//! ## Quick Start
//!
//! ```rust
//! use mailgen::{Action, Button, Email, EmailBody, GeneratorConfig, Mailgen, Product};
//!
//! let mailgen = Mailgen::new(
//!     GeneratorConfig::new(
//!         Product::new("Acme", "https://acme.test").logo("https://acme.test/logo.png"),
//!     )
//!     .theme("salted"),
//! )?;
//!
//! let email = Email::new(
//!     EmailBody::new()
//!         .name("Jane Doe")
//!         .intro("Welcome to Acme! We're very excited to have you on board.")
//!         .action(Action::new(
//!             "To get started with Acme, please click here:",
//!             Button::new("Confirm your account", "https://acme.test/confirm?s=d9729feb74992cc3482b350163a1a010"),
//!         ))
//!         .outro("Need help, or have questions? Just reply to this email, we'd love to help."),
//! );
//!
//! let rendered = mailgen.render(&email)?;
//! assert!(rendered.html.contains("Confirm your account"));
//! assert!(rendered.text.contains("Jane Doe"));
//! # Ok::<(), mailgen::MailgenError>(())
//! ```
//!
//! ## Themes
//!
//! A theme is an HTML template and a plaintext template, written in MiniJinja
//! (Jinja2) syntax. Two themes are compiled into the crate, `default` and
//! `salted`; setting a `root` reads `<root>/themes/<name>/` instead. Custom
//! themes are selected by file path or supplied inline:
//!
//! ```rust,no_run
//! use mailgen::{GeneratorConfig, Product, ThemeSelector};
//!
//! let config = GeneratorConfig::new(Product::new("Acme", "https://acme.test"))
//!     .theme(ThemeSelector::custom("mail/index.html", "mail/index.txt"));
//! ```
//!
//! Templates see `product` and every key of the request's `body`. Theme files
//! are read once when the [`Mailgen`] is built; a missing file fails
//! construction with [`MailgenError::InvalidTheme`] or
//! [`MailgenError::InvalidPlaintextTheme`].
//!
//! ## Configuration Files
//!
//! [`GeneratorConfig`] also loads from YAML or JSON:
//!
//! ```rust
//! use mailgen::GeneratorConfig;
//!
//! let config = GeneratorConfig::from_yaml(r#"
//! theme: salted
//! product:
//!   name: Acme
//!   link: https://acme.test
//! "#)?;
//! # Ok::<(), mailgen::MailgenError>(())
//! ```
//!
//! ## Pluggable Engines
//!
//! The template engine and the CSS inliner sit behind the [`TemplateEngine`]
//! and [`StyleInliner`] traits. Plain closures implement both, see
//! [`Mailgen::with_engines`].

mod body;
mod config;
mod context;
mod engine;
mod error;
mod generator;
mod product;
mod styles;
mod theme;

pub use body::{Action, Button, Email, EmailBody, Table, TableColumns, TextDirection};
pub use config::{GeneratorConfig, ThemeSelector};
pub use context::build_context;
pub use engine::{register_filters, MiniJinjaEngine, TemplateEngine};
pub use error::{BoxError, MailgenError, Result};
pub use generator::{Mailgen, RenderedEmail};
pub use product::Product;
pub use styles::{CssInliner, StyleInliner};
pub use theme::{
    bundled_theme, resolve_theme, BundledTheme, ThemePaths, ThemeSources, BUNDLED_THEMES,
    DEFAULT_THEME, HTML_TEMPLATE, PLAINTEXT_TEMPLATE,
};

// Re-export the inliner crate for callers configuring `CssInliner`.
pub use mailgen_inline;
