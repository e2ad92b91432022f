//! CSS inlining for e-mail HTML.
//!
//! Most e-mail clients drop `<style>` blocks and external stylesheets, so
//! styles that must survive delivery have to live in each element's `style`
//! attribute. This crate moves the rules declared in a document's `<style>`
//! blocks onto the elements they select.
//!
//! # Example
//!
//! ```rust
//! let html = r#"<html><head><style>
//! .button { color: #fff; background-color: #22bc66; }
//! a:hover { text-decoration: underline; }
//! </style></head><body><a class="button" href="https://acme.test">Go</a></body></html>"#;
//!
//! let output = mailgen_inline::inline(html);
//! assert!(output.contains(r#"<a class="button" href="https://acme.test" style="color: #fff; background-color: #22bc66;">"#));
//! // Rules that cannot be attached to an element stay behind.
//! assert!(output.contains("a:hover { text-decoration: underline; }"));
//! ```
//!
//! # What Gets Inlined
//!
//! Selectors built from type (`td`), universal (`*`), class (`.button`) and id
//! (`#header`) compounds, joined by descendant (`.wrapper a`) or child
//! (`table > tr`) combinators, are resolved against each element.
//!
//! Everything else is retained in a single `<style>` block placed where the
//! first consumed block was:
//!
//! - at-rules (`@media`, `@font-face`, `@import`) verbatim,
//! - rules with pseudo-classes, pseudo-elements, attribute selectors or
//!   sibling combinators,
//! - `<style media="...">` blocks for media other than `all` or `screen`,
//!   wrapped in the matching `@media` rule.
//!
//! `<style data-embed>` blocks are left untouched and never inlined.
//!
//! # Cascade
//!
//! For each element, declarations are applied in this order, later writes to
//! a property replacing earlier ones:
//!
//! 1. Matching stylesheet declarations, by specificity then source order
//! 2. The element's existing `style` attribute
//! 3. `!important` stylesheet declarations, by specificity then source order
//! 4. `!important` declarations from the existing `style` attribute
//!
//! # Limits
//!
//! The HTML side is a tokenizer, not a tree builder. Implied end tags (an
//! unclosed `<p>` before a `<div>`) are not inferred, so descendant selectors
//! see the document as written.

mod html;
mod selector;
mod stylesheet;

use html::{decode_entities, StartTag, Token, Tokenizer};
use selector::Element;
use stylesheet::{parse_inline_style, Declaration, StyleRule, Stylesheet};

/// Elements that are never rendered and so never receive inline styles.
const UNSTYLED_ELEMENTS: &[&str] = &["head", "style", "script", "meta", "link", "title", "base"];

/// Inlines `<style>` rules in `html` with the default options.
///
/// Shorthand for `Inliner::new().inline(html)`.
pub fn inline(html: &str) -> String {
    Inliner::new().inline(html)
}

/// Configurable CSS inliner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inliner {
    remove_style_tags: bool,
    preserve_at_rules: bool,
    preserve_pseudos: bool,
}

impl Default for Inliner {
    fn default() -> Self {
        Self {
            remove_style_tags: true,
            preserve_at_rules: true,
            preserve_pseudos: true,
        }
    }
}

impl Inliner {
    /// Creates an inliner that removes consumed `<style>` blocks and keeps
    /// at-rules and pseudo-class rules in a single retained block.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether consumed `<style>` blocks are removed from the output.
    ///
    /// When `false` consumed blocks stay in place and no retained block
    /// is emitted.
    pub fn remove_style_tags(mut self, remove: bool) -> Self {
        self.remove_style_tags = remove;
        self
    }

    /// Whether at-rules such as `@media` are kept in the retained block.
    pub fn preserve_at_rules(mut self, preserve: bool) -> Self {
        self.preserve_at_rules = preserve;
        self
    }

    /// Whether rules with non-inlinable selectors (`a:hover`) are kept in the
    /// retained block.
    pub fn preserve_pseudos(mut self, preserve: bool) -> Self {
        self.preserve_pseudos = preserve;
        self
    }

    /// Inlines the document's `<style>` rules onto its elements.
    pub fn inline(&self, html: &str) -> String {
        let tokens: Vec<Token<'_>> = Tokenizer::new(html).collect();
        let (sheet, consumed) = collect_styles(&tokens);

        if sheet.rules.is_empty() && sheet.retained.is_empty() {
            return html.to_string();
        }

        let retained = sheet.retained_css(self.preserve_pseudos, self.preserve_at_rules);
        tracing::trace!(
            rules = sheet.rules.len(),
            retained = sheet.retained.len(),
            "inlining stylesheet"
        );

        let mut out = String::with_capacity(html.len() + html.len() / 2);
        let mut open: Vec<Element> = Vec::new();
        let mut retained_written = false;

        for (idx, token) in tokens.iter().enumerate() {
            if self.remove_style_tags && consumed[idx] {
                if !retained_written && !retained.is_empty() {
                    out.push_str("<style>\n");
                    out.push_str(&retained);
                    out.push_str("\n</style>");
                }
                retained_written = true;
                continue;
            }

            match token {
                Token::StartTag(tag) => {
                    let element = Element::from_tag(tag);
                    let style = if is_styled(tag, &open) {
                        computed_style(&sheet.rules, tag, &element, &open)
                    } else {
                        None
                    };
                    match style {
                        Some(style) => tag.write_with_style(&mut out, &style),
                        None => out.push_str(tag.raw),
                    }
                    if !tag.self_closing && !tag.is_void() {
                        open.push(element);
                    }
                }
                Token::EndTag { name, raw } => {
                    if let Some(pos) = open.iter().rposition(|e| e.name == *name) {
                        open.truncate(pos);
                    }
                    out.push_str(raw);
                }
                other => out.push_str(other.as_str()),
            }
        }

        out
    }
}

/// Parses every eligible `<style>` block and marks the tokens it spans.
fn collect_styles(tokens: &[Token<'_>]) -> (Stylesheet, Vec<bool>) {
    let mut sheet = Stylesheet::default();
    let mut consumed = vec![false; tokens.len()];

    let mut i = 0;
    while i < tokens.len() {
        let is_style_block = matches!(
            &tokens[i],
            Token::StartTag(tag)
                if tag.name == "style" && !tag.self_closing && tag.attr("data-embed").is_none()
        );
        if !is_style_block {
            i += 1;
            continue;
        }

        let media = match &tokens[i] {
            Token::StartTag(tag) => tag
                .attr("media")
                .map(|media| decode_entities(media).trim().to_string()),
            _ => None,
        };

        let mut end = i + 1;
        if let Some(Token::RawText(css)) = tokens.get(end) {
            match media.as_deref() {
                Some(media) if !applies_to_screen(media) => sheet.retain_media(media, css),
                _ => sheet.add_css(css),
            }
            end += 1;
        }
        if matches!(tokens.get(end), Some(Token::EndTag { name, .. }) if name == "style") {
            end += 1;
        }
        consumed[i..end].fill(true);
        i = end;
    }

    (sheet, consumed)
}

/// Whether a `media` attribute value covers the rendered message.
fn applies_to_screen(media: &str) -> bool {
    media.is_empty() || media.eq_ignore_ascii_case("all") || media.eq_ignore_ascii_case("screen")
}

fn is_styled(tag: &StartTag<'_>, open: &[Element]) -> bool {
    !UNSTYLED_ELEMENTS.contains(&tag.name.as_str()) && !open.iter().any(|e| e.name == "head")
}

/// Returns the merged `style` attribute for an element, or `None` when no
/// stylesheet rule selects it.
fn computed_style(
    rules: &[StyleRule],
    tag: &StartTag<'_>,
    element: &Element,
    ancestors: &[Element],
) -> Option<String> {
    let mut matched: Vec<&StyleRule> = rules
        .iter()
        .filter(|rule| rule.selector.matches(element, ancestors))
        .collect();
    if matched.is_empty() {
        return None;
    }
    matched.sort_by_key(|rule| (rule.selector.specificity(), rule.order));

    let existing = tag
        .attr("style")
        .map(|style| parse_inline_style(&decode_entities(style)))
        .unwrap_or_default();
    let sheet_decls = || matched.iter().flat_map(|rule| rule.declarations.iter());

    let mut style = StyleMap::default();
    style.extend(sheet_decls().filter(|d| !d.important));
    style.extend(existing.iter().filter(|d| !d.important));
    style.extend(sheet_decls().filter(|d| d.important));
    style.extend(existing.iter().filter(|d| d.important));

    Some(style.to_string())
}

/// Ordered property map; re-setting a property keeps its first position.
#[derive(Debug, Default)]
struct StyleMap<'a> {
    entries: Vec<&'a Declaration>,
}

impl<'a> StyleMap<'a> {
    fn extend(&mut self, decls: impl Iterator<Item = &'a Declaration>) {
        for decl in decls {
            match self
                .entries
                .iter_mut()
                .find(|e| e.property == decl.property)
            {
                Some(slot) => *slot = decl,
                None => self.entries.push(decl),
            }
        }
    }
}

impl std::fmt::Display for StyleMap<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, decl) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}: {}", decl.property, decl.value)?;
            if decl.important {
                f.write_str(" !important")?;
            }
            f.write_str(";")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(css: &str, body: &str) -> String {
        format!(
            "<html><head><style>{}</style></head><body>{}</body></html>",
            css, body
        )
    }

    mod cascade {
        use super::*;

        #[test]
        fn class_rule_is_inlined() {
            let out = inline(&doc(".note { color: red; }", r#"<p class="note">x</p>"#));
            assert!(out.contains(r#"<p class="note" style="color: red;">x</p>"#));
        }

        #[test]
        fn specificity_beats_source_order() {
            let out = inline(&doc(
                "#hero { color: blue } .note { color: red } p { color: green }",
                r#"<p id="hero" class="note">x</p>"#,
            ));
            assert!(out.contains(r#"style="color: blue;""#));
        }

        #[test]
        fn later_rule_wins_at_equal_specificity() {
            let out = inline(&doc(
                ".a { color: red } .b { color: blue }",
                r#"<p class="b a">x</p>"#,
            ));
            assert!(out.contains(r#"style="color: blue;""#));
        }

        #[test]
        fn existing_inline_style_wins_over_sheet() {
            let out = inline(&doc(
                "p { color: red; margin: 0 }",
                r#"<p style="color: green">x</p>"#,
            ));
            assert!(out.contains(r#"<p style="color: green; margin: 0;">"#));
        }

        #[test]
        fn important_sheet_rule_wins_over_inline_style() {
            let out = inline(&doc(
                "p { color: red !important }",
                r#"<p style="color: green">x</p>"#,
            ));
            assert!(out.contains(r#"<p style="color: red !important;">"#));
        }

        #[test]
        fn unmatched_elements_are_untouched() {
            let out = inline(&doc(".x { color: red }", r#"<p  class = 'y' >x</p>"#));
            assert!(out.contains(r#"<p  class = 'y' >x</p>"#));
        }

        #[test]
        fn existing_style_with_entities_is_decoded() {
            let out = inline(&doc(
                ".button { color: red; }",
                r#"<a class="button" style="font-family: &quot;Helvetica Neue&quot;, Arial; padding: 4px">x</a>"#,
            ));
            assert!(out.contains(
                r#"<a class="button" style="color: red; font-family: &quot;Helvetica Neue&quot;, Arial; padding: 4px;">"#
            ));
        }

        #[test]
        fn head_elements_are_not_styled() {
            let out = inline(&doc("* { margin: 0 }", "<p>x</p>"));
            assert!(out.contains("<head><style") || out.contains("<head></head>"));
            assert!(!out.contains("<head style"));
            assert!(out.contains(r#"<body style="margin: 0;">"#));
            assert!(out.contains(r#"<p style="margin: 0;">"#));
        }
    }

    mod style_blocks {
        use super::*;

        #[test]
        fn consumed_blocks_are_removed() {
            let out = inline(&doc("p { color: red }", "<p>x</p>"));
            assert!(!out.contains("<style"));
        }

        #[test]
        fn retained_rules_replace_first_block() {
            let html = "<html><head><style>p { color: red }</style><style>@media (max-width: 600px) { p { color: blue } }</style></head><body><p>x</p></body></html>";
            let out = inline(html);
            assert_eq!(out.matches("<style>").count(), 1);
            assert!(out.starts_with("<html><head><style>\n@media (max-width: 600px)"));
        }

        #[test]
        fn data_embed_blocks_are_left_alone() {
            let html = r#"<style data-embed>p { color: red }</style><p>x</p>"#;
            assert_eq!(inline(html), html);
        }

        #[test]
        fn keep_style_tags_option() {
            let html = doc("p { color: red }", "<p>x</p>");
            let out = Inliner::new().remove_style_tags(false).inline(&html);
            assert!(out.contains("<style>p { color: red }</style>"));
            assert!(out.contains(r#"<p style="color: red;">"#));
        }

        #[test]
        fn dropping_at_rules_and_pseudos() {
            let html = doc(
                "a { color: red } a:hover { color: blue } @media print { a { color: black } }",
                r#"<a href="/">x</a>"#,
            );
            let out = Inliner::new()
                .preserve_at_rules(false)
                .preserve_pseudos(false)
                .inline(&html);
            assert!(!out.contains("<style"));
            assert!(out.contains(r#"<a href="/" style="color: red;">"#));
        }

        #[test]
        fn print_blocks_are_retained_as_media_rules() {
            let html = r#"<html><head><style media="print">p { color: black; }</style></head><body><p>x</p></body></html>"#;
            let out = inline(html);
            assert!(out.contains("<p>x</p>"));
            assert!(out.contains("@media print { p { color: black; } }"));
            assert_eq!(out.matches("<style").count(), 1);
        }

        #[test]
        fn screen_and_all_blocks_are_inlined() {
            for media in ["all", "Screen", " "] {
                let html = format!(r#"<style media="{}">p {{ color: red }}</style><p>x</p>"#, media);
                let out = inline(&html);
                assert_eq!(out, r#"<p style="color: red;">x</p>"#, "media={:?}", media);
            }
        }

        #[test]
        fn media_blocks_follow_at_rule_option() {
            let html = r#"<style media="print">p { color: black }</style><p>x</p>"#;
            let out = Inliner::new().preserve_at_rules(false).inline(html);
            assert_eq!(out, "<p>x</p>");
        }

        #[test]
        fn documents_without_styles_are_returned_unchanged() {
            let html = "<p class=x>hello</p>";
            assert_eq!(inline(html), html);
        }
    }

    mod structure {
        use super::*;

        #[test]
        fn descendant_selector_tracks_open_elements() {
            let out = inline(&doc(
                ".wrapper a { color: red }",
                r#"<div class="wrapper"><p><a href="1">in</a></p></div><a href="2">out</a>"#,
            ));
            assert!(out.contains(r#"<a href="1" style="color: red;">"#));
            assert!(out.contains(r#"<a href="2">"#));
        }

        #[test]
        fn void_elements_do_not_nest() {
            let out = inline(&doc(
                "img a { color: red }",
                r#"<img src="x.png"><a href="1">x</a>"#,
            ));
            assert!(out.contains(r#"<a href="1">"#));
        }
    }
}
