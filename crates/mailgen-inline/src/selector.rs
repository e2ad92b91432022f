//! Selector parsing and matching.
//!
//! Only selectors that can be decided from an element and its ancestors are
//! inlinable: type, universal, class and id compounds joined by descendant
//! (whitespace) or child (`>`) combinators. Anything else (pseudo-classes,
//! pseudo-elements, attribute selectors, sibling combinators) is reported
//! back as source text so it can stay in a `<style>` block.

use cssparser::{Parser, Token};

use crate::html::StartTag;

/// Selector specificity as `(ids, classes, types)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct Specificity(pub u32, pub u32, pub u32);

/// The element facts selectors are matched against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Element {
    pub name: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
}

impl Element {
    pub fn from_tag(tag: &StartTag<'_>) -> Self {
        Self {
            name: tag.name.clone(),
            id: tag.attr("id").map(str::to_string),
            classes: tag
                .attr("class")
                .map(|c| c.split_ascii_whitespace().map(str::to_string).collect())
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    universal: bool,
    id: Option<String>,
    classes: Vec<String>,
}

impl Compound {
    fn is_empty(&self) -> bool {
        self.tag.is_none() && !self.universal && self.id.is_none() && self.classes.is_empty()
    }

    fn matches(&self, element: &Element) -> bool {
        if let Some(tag) = &self.tag {
            if *tag != element.name {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if element.id.as_ref() != Some(id) {
                return false;
            }
        }
        self.classes.iter().all(|c| element.classes.contains(c))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Part {
    /// How this compound relates to the previous one. Ignored on the first part.
    combinator: Combinator,
    compound: Compound,
}

/// A parsed, inlinable selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Selector {
    parts: Vec<Part>,
}

impl Selector {
    pub fn specificity(&self) -> Specificity {
        self.parts
            .iter()
            .fold(Specificity::default(), |Specificity(a, b, c), part| {
                let compound = &part.compound;
                Specificity(
                    a + compound.id.is_some() as u32,
                    b + compound.classes.len() as u32,
                    c + compound.tag.is_some() as u32,
                )
            })
    }

    /// Whether `element`, whose open ancestors are `ancestors` (outermost
    /// first), is selected.
    pub fn matches(&self, element: &Element, ancestors: &[Element]) -> bool {
        match self.parts.len() {
            0 => false,
            n => self.matches_at(n - 1, element, ancestors),
        }
    }

    fn matches_at(&self, idx: usize, element: &Element, ancestors: &[Element]) -> bool {
        let part = &self.parts[idx];
        if !part.compound.matches(element) {
            return false;
        }
        if idx == 0 {
            return true;
        }
        match part.combinator {
            Combinator::Child => match ancestors.split_last() {
                Some((parent, rest)) => self.matches_at(idx - 1, parent, rest),
                None => false,
            },
            Combinator::Descendant => {
                let mut rest = ancestors;
                while let Some((ancestor, outer)) = rest.split_last() {
                    if self.matches_at(idx - 1, ancestor, outer) {
                        return true;
                    }
                    rest = outer;
                }
                false
            }
        }
    }
}

/// A rule prelude split into what can be inlined and what cannot.
#[derive(Debug, Default)]
pub(crate) struct SelectorList {
    pub selectors: Vec<Selector>,
    /// Source text of selectors that must stay in a stylesheet.
    pub retained: Vec<String>,
}

#[derive(Default)]
struct SelectorBuilder {
    parts: Vec<Part>,
    current: Option<Compound>,
    current_combinator: Option<Combinator>,
    pending: Option<Combinator>,
    unsupported: bool,
}

impl SelectorBuilder {
    fn compound_mut(&mut self) -> &mut Compound {
        if let Some(combinator) = self.pending.take() {
            if let Some(done) = self.current.take() {
                self.parts.push(Part {
                    combinator: self.current_combinator.unwrap_or(Combinator::Descendant),
                    compound: done,
                });
            }
            self.current_combinator = Some(combinator);
        }
        self.current.get_or_insert_with(Compound::default)
    }

    fn whitespace(&mut self) {
        if self.current.is_some() && self.pending.is_none() {
            self.pending = Some(Combinator::Descendant);
        }
    }

    fn child(&mut self) {
        if self.current.is_none() {
            self.unsupported = true;
        } else {
            self.pending = Some(Combinator::Child);
        }
    }

    fn tag(&mut self, name: &str) {
        let compound = self.compound_mut();
        if compound.is_empty() {
            compound.tag = Some(name.to_ascii_lowercase());
        } else {
            self.unsupported = true;
        }
    }

    fn universal(&mut self) {
        let compound = self.compound_mut();
        if compound.is_empty() {
            compound.universal = true;
        } else {
            self.unsupported = true;
        }
    }

    fn class(&mut self, name: &str) {
        self.compound_mut().classes.push(name.to_string());
    }

    fn id(&mut self, name: &str) {
        let compound = self.compound_mut();
        if compound.id.is_some() {
            self.unsupported = true;
        } else {
            compound.id = Some(name.to_string());
        }
    }

    fn finish(mut self) -> Option<Selector> {
        if self.unsupported || self.pending == Some(Combinator::Child) {
            return None;
        }
        let last = self.current.take()?;
        self.parts.push(Part {
            combinator: self.current_combinator.unwrap_or(Combinator::Descendant),
            compound: last,
        });
        Some(Selector { parts: self.parts })
    }
}

/// Reads a comma-separated selector list from a qualified rule prelude.
pub(crate) fn parse_selector_list<'i, 't>(input: &mut Parser<'i, 't>) -> SelectorList {
    let mut list = SelectorList::default();

    loop {
        let start = input.position();
        let mut end = None;
        let mut builder = SelectorBuilder::default();

        loop {
            let before = input.position();
            let token = match input.next_including_whitespace() {
                Ok(token) => token.clone(),
                Err(_) => break,
            };
            match token {
                Token::Comma => {
                    end = Some(before);
                    break;
                }
                Token::WhiteSpace(_) => builder.whitespace(),
                Token::Delim('>') => builder.child(),
                Token::Delim('*') => builder.universal(),
                Token::Ident(name) => builder.tag(name.as_ref()),
                Token::IDHash(id) => builder.id(id.as_ref()),
                Token::Delim('.') => match input.next_including_whitespace().cloned() {
                    Ok(Token::Ident(name)) => builder.class(name.as_ref()),
                    _ => builder.unsupported = true,
                },
                _ => builder.unsupported = true,
            }
        }

        let text = match end {
            Some(end) => input.slice(start..end),
            None => input.slice_from(start),
        }
        .trim();

        if !text.is_empty() {
            match builder.finish() {
                Some(selector) => list.selectors.push(selector),
                None => list.retained.push(text.to_string()),
            }
        }

        if end.is_none() {
            break;
        }
    }

    list
}

#[cfg(test)]
mod tests {
    use super::*;
    use cssparser::ParserInput;

    fn parse(prelude: &str) -> SelectorList {
        let mut input = ParserInput::new(prelude);
        let mut parser = Parser::new(&mut input);
        parse_selector_list(&mut parser)
    }

    fn single(prelude: &str) -> Selector {
        let mut list = parse(prelude);
        assert_eq!(list.selectors.len(), 1, "expected one selector in {prelude:?}");
        list.selectors.remove(0)
    }

    fn el(name: &str, id: Option<&str>, classes: &[&str]) -> Element {
        Element {
            name: name.to_string(),
            id: id.map(str::to_string),
            classes: classes.iter().map(|c| c.to_string()).collect(),
        }
    }

    mod parsing {
        use super::*;

        #[test]
        fn splits_lists() {
            let list = parse("td, th , .cell");
            assert_eq!(list.selectors.len(), 3);
            assert!(list.retained.is_empty());
        }

        #[test]
        fn pseudo_classes_are_retained() {
            let list = parse("a, a:hover, p::first-line");
            assert_eq!(list.selectors.len(), 1);
            assert_eq!(list.retained, vec!["a:hover", "p::first-line"]);
        }

        #[test]
        fn attribute_and_sibling_selectors_are_retained() {
            let list = parse("input[type=text], h1 + p, h1 ~ p");
            assert!(list.selectors.is_empty());
            assert_eq!(list.retained.len(), 3);
        }

        #[test]
        fn dangling_child_combinator_is_retained() {
            let list = parse("div >");
            assert!(list.selectors.is_empty());
            assert_eq!(list.retained, vec!["div >"]);
        }
    }

    mod specificity {
        use super::*;

        #[test]
        fn counts_ids_classes_and_types() {
            assert_eq!(single("p").specificity(), Specificity(0, 0, 1));
            assert_eq!(single(".a.b").specificity(), Specificity(0, 2, 0));
            assert_eq!(single("#main td.x").specificity(), Specificity(1, 1, 1));
            assert_eq!(single("*").specificity(), Specificity(0, 0, 0));
        }

        #[test]
        fn orders_ids_above_classes() {
            assert!(single("#a").specificity() > single(".a.b.c").specificity());
        }
    }

    mod matching {
        use super::*;

        #[test]
        fn compound_requires_every_part() {
            let sel = single("td.cell#x");
            assert!(sel.matches(&el("td", Some("x"), &["cell", "wide"]), &[]));
            assert!(!sel.matches(&el("td", None, &["cell"]), &[]));
            assert!(!sel.matches(&el("th", Some("x"), &["cell"]), &[]));
        }

        #[test]
        fn tag_names_match_case_insensitively() {
            assert!(single("TD").matches(&el("td", None, &[]), &[]));
        }

        #[test]
        fn descendant_skips_intermediate_ancestors() {
            let sel = single(".wrapper a");
            let ancestors = vec![el("div", None, &["wrapper"]), el("p", None, &[])];
            assert!(sel.matches(&el("a", None, &[]), &ancestors));
            assert!(!sel.matches(&el("a", None, &[]), &ancestors[1..]));
        }

        #[test]
        fn child_requires_direct_parent() {
            let sel = single("div > a");
            let direct = vec![el("div", None, &[])];
            let nested = vec![el("div", None, &[]), el("p", None, &[])];
            assert!(sel.matches(&el("a", None, &[]), &direct));
            assert!(!sel.matches(&el("a", None, &[]), &nested));
        }

        #[test]
        fn backtracks_across_descendant_chains() {
            let sel = single(".a > .b .c");
            let ancestors = vec![
                el("div", None, &["a"]),
                el("div", None, &["b"]),
                el("div", None, &["b"]),
            ];
            // Only the outer .b is a direct child of .a.
            assert!(sel.matches(&el("span", None, &["c"]), &ancestors));
        }
    }
}
