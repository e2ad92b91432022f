//! CSS collection built on `cssparser`.
//!
//! Qualified rules are split per selector into [`StyleRule`]s that can be
//! matched against elements. Everything that cannot be decided per element
//! is kept as source text, in document order, for re-emission.

use cssparser::{
    AtRuleParser, CowRcStr, DeclarationParser, ParseError, Parser, ParserInput, ParserState,
    QualifiedRuleParser, RuleBodyItemParser, RuleBodyParser,
};

use crate::selector::{parse_selector_list, Selector, SelectorList};

/// A single `property: value` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub property: String,
    pub value: String,
    pub important: bool,
}

impl Declaration {
    /// Builds a declaration from its name and raw value text, splitting off
    /// a trailing `!important`. Returns `None` for an empty value.
    fn from_raw(name: &str, raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let (value, important) = match raw.rfind('!') {
            Some(idx) if raw[idx + 1..].trim().eq_ignore_ascii_case("important") => {
                (raw[..idx].trim_end(), true)
            }
            _ => (raw, false),
        };
        if value.is_empty() {
            return None;
        }

        let property = if name.starts_with("--") {
            name.to_string()
        } else {
            name.to_ascii_lowercase()
        };
        Some(Self {
            property,
            value: value.to_string(),
            important,
        })
    }
}

/// One selector of a qualified rule together with the rule's declarations.
#[derive(Debug, Clone)]
pub(crate) struct StyleRule {
    pub selector: Selector,
    pub declarations: Vec<Declaration>,
    /// Position of the rule in source order, across all collected blocks.
    pub order: usize,
}

/// CSS that has to stay in a `<style>` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Retained {
    /// A qualified rule whose selectors cannot be inlined (pseudo-classes etc.).
    Rule(String),
    /// `@media`, `@font-face`, `@import`, ...
    AtRule(String),
}

#[derive(Debug, Default)]
pub(crate) struct Stylesheet {
    pub rules: Vec<StyleRule>,
    pub retained: Vec<Retained>,
    next_order: usize,
}

impl Stylesheet {
    /// Parses `css` and appends its rules. Invalid rules are skipped.
    pub fn add_css(&mut self, css: &str) {
        let mut input = ParserInput::new(css);
        let mut parser = Parser::new(&mut input);
        let mut collector = RuleCollector { sheet: self };

        let rules = cssparser::StyleSheetParser::new(&mut parser, &mut collector);
        for result in rules {
            if let Err((err, text)) = result {
                tracing::trace!(?err, rule = text, "skipping invalid css rule");
            }
        }
    }

    /// Keeps a block scoped to a media query other than `all`/`screen`
    /// verbatim, wrapped in the matching `@media` rule.
    pub fn retain_media(&mut self, media: &str, css: &str) {
        self.retained
            .push(Retained::AtRule(format!("@media {} {{ {} }}", media, css.trim())));
    }

    /// Retained CSS, filtered by kind, joined for a `<style>` block.
    pub fn retained_css(&self, rules: bool, at_rules: bool) -> String {
        self.retained
            .iter()
            .filter_map(|r| match r {
                Retained::Rule(text) if rules => Some(text.as_str()),
                Retained::AtRule(text) if at_rules => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

struct RuleCollector<'s> {
    sheet: &'s mut Stylesheet,
}

impl<'i> QualifiedRuleParser<'i> for RuleCollector<'_> {
    type Prelude = SelectorList;
    type QualifiedRule = ();
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        let list = parse_selector_list(input);
        if list.selectors.is_empty() && list.retained.is_empty() {
            return Err(input.new_custom_error::<(), ()>(()));
        }
        Ok(list)
    }

    fn parse_block<'t>(
        &mut self,
        prelude: Self::Prelude,
        _start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::QualifiedRule, ParseError<'i, Self::Error>> {
        let start = input.position();
        let declarations = parse_declarations(input);
        let block = input.slice_from(start).trim();

        let order = self.sheet.next_order;
        self.sheet.next_order += 1;

        for selector in prelude.selectors {
            self.sheet.rules.push(StyleRule {
                selector,
                declarations: declarations.clone(),
                order,
            });
        }
        if !prelude.retained.is_empty() {
            self.sheet.retained.push(Retained::Rule(format!(
                "{} {{ {} }}",
                prelude.retained.join(", "),
                block
            )));
        }
        Ok(())
    }
}

impl<'i> AtRuleParser<'i> for RuleCollector<'_> {
    /// At-rule name and raw prelude text.
    type Prelude = (String, String);
    type AtRule = ();
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        let start = input.position();
        while input.next_including_whitespace_and_comments().is_ok() {}
        Ok((
            name.as_ref().to_string(),
            input.slice_from(start).trim().to_string(),
        ))
    }

    fn rule_without_block(
        &mut self,
        (name, prelude): Self::Prelude,
        _start: &ParserState,
    ) -> Result<Self::AtRule, ()> {
        self.sheet
            .retained
            .push(Retained::AtRule(format!("@{} {};", name, prelude)));
        Ok(())
    }

    fn parse_block<'t>(
        &mut self,
        (name, prelude): Self::Prelude,
        _start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::AtRule, ParseError<'i, Self::Error>> {
        let start = input.position();
        while input.next_including_whitespace_and_comments().is_ok() {}
        let block = input.slice_from(start).trim();

        let head = if prelude.is_empty() {
            format!("@{}", name)
        } else {
            format!("@{} {}", name, prelude)
        };
        self.sheet
            .retained
            .push(Retained::AtRule(format!("{} {{ {} }}", head, block)));
        Ok(())
    }
}

/// Parses the declarations of a rule body or a `style` attribute.
fn parse_declarations<'i, 't>(input: &mut Parser<'i, 't>) -> Vec<Declaration> {
    let mut decl_parser = DeclarationCollector;
    RuleBodyParser::new(input, &mut decl_parser)
        .flatten()
        .collect()
}

/// Parses the contents of an element's `style` attribute.
pub fn parse_inline_style(style: &str) -> Vec<Declaration> {
    let mut input = ParserInput::new(style);
    let mut parser = Parser::new(&mut input);
    parse_declarations(&mut parser)
}

struct DeclarationCollector;

impl<'i> DeclarationParser<'i> for DeclarationCollector {
    type Declaration = Declaration;
    type Error = ();

    fn parse_value<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Declaration, ParseError<'i, Self::Error>> {
        let start = input.position();
        while input.next_including_whitespace().is_ok() {}
        Declaration::from_raw(name.as_ref(), input.slice_from(start))
            .ok_or_else(|| input.new_custom_error::<(), ()>(()))
    }
}

impl<'i> AtRuleParser<'i> for DeclarationCollector {
    type Prelude = ();
    type AtRule = Declaration;
    type Error = ();
}

impl<'i> QualifiedRuleParser<'i> for DeclarationCollector {
    type Prelude = ();
    type QualifiedRule = Declaration;
    type Error = ();
}

impl<'i> RuleBodyItemParser<'i, Declaration, ()> for DeclarationCollector {
    fn parse_declarations(&self) -> bool {
        true
    }
    fn parse_qualified(&self) -> bool {
        false
    }
}
