//! Template engine abstraction.
//!
//! This module defines the [`TemplateEngine`] trait through which the generator
//! evaluates theme sources. The default implementation is [`MiniJinjaEngine`].
//! Any `Fn(&str, &str, &serde_json::Value) -> Result<String, BoxError>` is also
//! an engine, which keeps stubs in tests to a single closure.

use minijinja::value::ValueKind;
use minijinja::{Environment, UndefinedBehavior, Value};

use crate::error::BoxError;

/// A template engine that renders a template source with data.
///
/// `name` identifies the template (`index.html` or `index.txt` for theme
/// sources). Engines may use it to pick escaping rules or to label errors.
pub trait TemplateEngine: Send + Sync {
    /// Compiles and renders `source` in one step.
    fn render_template(
        &self,
        name: &str,
        source: &str,
        data: &serde_json::Value,
    ) -> Result<String, BoxError>;
}

impl<F> TemplateEngine for F
where
    F: Fn(&str, &str, &serde_json::Value) -> Result<String, BoxError> + Send + Sync,
{
    fn render_template(
        &self,
        name: &str,
        source: &str,
        data: &serde_json::Value,
    ) -> Result<String, BoxError> {
        self(name, source, data)
    }
}

/// MiniJinja-based template engine.
///
/// Templates whose name ends in `.html` are auto-escaped for HTML; any other
/// name (such as `index.txt`) is rendered verbatim. Undefined attributes chain
/// to undefined, so themes can probe optional fields like
/// `product.logo` without guarding every level.
///
/// # Example
///
/// ```rust
/// use mailgen::{MiniJinjaEngine, TemplateEngine};
/// use serde_json::json;
///
/// let engine = MiniJinjaEngine::new();
/// let data = json!({ "name": "<World>" });
///
/// let html = engine.render_template("index.html", "Hello, {{ name }}!", &data).unwrap();
/// assert_eq!(html, "Hello, &lt;World&gt;!");
///
/// let text = engine.render_template("index.txt", "Hello, {{ name }}!", &data).unwrap();
/// assert_eq!(text, "Hello, <World>!");
/// ```
pub struct MiniJinjaEngine {
    env: Environment<'static>,
}

impl MiniJinjaEngine {
    /// Creates a new MiniJinja engine with the theme filters registered.
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_undefined_behavior(UndefinedBehavior::Chainable);
        register_filters(&mut env);
        Self { env }
    }

    /// Returns a reference to the underlying MiniJinja environment.
    pub fn environment(&self) -> &Environment<'static> {
        &self.env
    }

    /// Returns a mutable reference to the underlying MiniJinja environment.
    ///
    /// Use this to register extra filters or functions for custom themes.
    pub fn environment_mut(&mut self) -> &mut Environment<'static> {
        &mut self.env
    }
}

impl Default for MiniJinjaEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateEngine for MiniJinjaEngine {
    fn render_template(
        &self,
        name: &str,
        source: &str,
        data: &serde_json::Value,
    ) -> Result<String, BoxError> {
        let value = Value::from_serialize(data);
        Ok(self.env.render_named_str(name, source, value)?)
    }
}

/// Registers the filters bundled themes rely on.
///
/// This is called automatically by [`MiniJinjaEngine::new`].
///
/// - `as_list` turns a "one or many" field into a list: undefined and none
///   become `[]`, a sequence is kept, anything else is wrapped.
pub fn register_filters(env: &mut Environment<'static>) {
    env.add_filter("as_list", |value: Value| -> Vec<Value> {
        if value.is_undefined() || value.is_none() {
            Vec::new()
        } else if value.kind() == ValueKind::Seq {
            value
                .try_iter()
                .map(|items| items.collect())
                .unwrap_or_default()
        } else {
            vec![value]
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use serde_json::json;

    #[derive(Serialize)]
    struct TestData {
        name: String,
        count: usize,
    }

    #[test]
    fn test_minijinja_engine_simple() {
        let engine = MiniJinjaEngine::new();
        let data = TestData {
            name: "World".into(),
            count: 42,
        };
        let data_value = serde_json::to_value(&data).unwrap();
        let output = engine
            .render_template("index.txt", "Hello, {{ name }} ({{ count }})!", &data_value)
            .unwrap();
        assert_eq!(output, "Hello, World (42)!");
    }

    #[test]
    fn test_minijinja_engine_with_loop() {
        let engine = MiniJinjaEngine::new();
        let data = json!({ "items": ["a", "b", "c"] });
        let output = engine
            .render_template(
                "index.txt",
                "{% for item in items %}{{ item }},{% endfor %}",
                &data,
            )
            .unwrap();
        assert_eq!(output, "a,b,c,");
    }

    #[test]
    fn test_minijinja_engine_escapes_html_only() {
        let engine = MiniJinjaEngine::new();
        let data = json!({ "intro": "Tom & <Jerry>" });

        let html = engine
            .render_template("index.html", "<p>{{ intro }}</p>", &data)
            .unwrap();
        assert_eq!(html, "<p>Tom &amp; &lt;Jerry&gt;</p>");

        let text = engine
            .render_template("index.txt", "{{ intro }}", &data)
            .unwrap();
        assert_eq!(text, "Tom & <Jerry>");
    }

    #[test]
    fn test_minijinja_engine_undefined_chains() {
        let engine = MiniJinjaEngine::new();
        let data = json!({ "product": { "name": "Acme" } });
        let output = engine
            .render_template(
                "index.txt",
                "{% if product.logo.url %}logo{% else %}{{ product.name }}{% endif %}",
                &data,
            )
            .unwrap();
        assert_eq!(output, "Acme");
    }

    #[test]
    fn test_minijinja_engine_trims_block_lines() {
        let engine = MiniJinjaEngine::new();
        let data = json!({ "show": true });
        let output = engine
            .render_template("index.txt", "a\n{% if show %}\nb\n{% endif %}\nc", &data)
            .unwrap();
        assert_eq!(output, "a\nb\nc");
    }

    #[test]
    fn test_minijinja_engine_template_error() {
        let engine = MiniJinjaEngine::new();
        let result = engine.render_template("index.txt", "{{ unclosed", &serde_json::Value::Null);
        assert!(result.is_err());
    }

    #[test]
    fn test_closure_is_an_engine() {
        let engine = |name: &str, _source: &str, _data: &serde_json::Value| -> Result<String, BoxError> {
            Ok(format!("rendered {name}"))
        };
        let output = engine
            .render_template("index.html", "", &serde_json::Value::Null)
            .unwrap();
        assert_eq!(output, "rendered index.html");
    }

    mod filters {
        use super::*;

        fn render(source: &str, data: serde_json::Value) -> String {
            MiniJinjaEngine::new()
                .render_template("index.txt", source, &data)
                .unwrap()
        }

        #[test]
        fn test_unknown_filter_is_a_render_error() {
            let result = MiniJinjaEngine::new().render_template(
                "index.txt",
                "{{ word|nl }}",
                &json!({ "word": "hi" }),
            );
            assert!(result.is_err());
        }

        #[test]
        fn test_as_list_wraps_single_value() {
            let out = render(
                "{% for line in intro|as_list %}[{{ line }}]{% endfor %}",
                json!({ "intro": "Welcome" }),
            );
            assert_eq!(out, "[Welcome]");
        }

        #[test]
        fn test_as_list_keeps_sequences() {
            let out = render(
                "{% for line in intro|as_list %}[{{ line }}]{% endfor %}",
                json!({ "intro": ["one", "two"] }),
            );
            assert_eq!(out, "[one][two]");
        }

        #[test]
        fn test_as_list_of_missing_is_empty() {
            let out = render(
                "{% for line in intro|as_list %}x{% else %}none{% endfor %}",
                json!({ "intro": null }),
            );
            assert_eq!(out, "none");

            let out = render("{{ outro|as_list|length }}", json!({}));
            assert_eq!(out, "0");
        }

        #[test]
        fn test_as_list_wraps_objects() {
            let out = render(
                "{% for a in action|as_list %}{{ a.button.text }};{% endfor %}",
                json!({ "action": { "button": { "text": "Go" } } }),
            );
            assert_eq!(out, "Go;");
        }
    }
}
