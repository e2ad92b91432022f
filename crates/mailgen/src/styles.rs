//! CSS inlining seam.

use mailgen_inline::Inliner;

use crate::error::BoxError;

/// Moves `<style>` rules onto the elements they match.
///
/// Applied to the HTML variant only. Any `Fn(&str) -> Result<String, BoxError>`
/// is also an inliner.
pub trait StyleInliner: Send + Sync {
    fn inline(&self, html: &str) -> Result<String, BoxError>;
}

impl<F> StyleInliner for F
where
    F: Fn(&str) -> Result<String, BoxError> + Send + Sync,
{
    fn inline(&self, html: &str) -> Result<String, BoxError> {
        self(html)
    }
}

/// The default inliner, backed by [`mailgen_inline::Inliner`].
///
/// Media queries and pseudo-class rules stay in a `<style>` block so clients
/// that honour them still can.
#[derive(Debug, Clone, Default)]
pub struct CssInliner {
    inner: Inliner,
}

impl CssInliner {
    pub fn new() -> Self {
        Self::default()
    }
}

impl From<Inliner> for CssInliner {
    fn from(inner: Inliner) -> Self {
        Self { inner }
    }
}

impl StyleInliner for CssInliner {
    fn inline(&self, html: &str) -> Result<String, BoxError> {
        Ok(self.inner.inline(html))
    }
}
