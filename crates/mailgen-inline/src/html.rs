//! Lightweight HTML tokenizer.
//!
//! This is not a conforming HTML5 parser. It splits a document into just
//! enough structure for style inlining: start tags with their attributes,
//! end tags, and opaque runs of everything else. Every byte of the input
//! belongs to exactly one token, so concatenating the raw text of all tokens
//! reproduces the input.

use std::borrow::Cow;

/// Elements that never have content or an end tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// An attribute on a start tag. The value is kept exactly as written in the
/// source; readers that interpret a value go through [`decode_entities`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Attribute<'a> {
    pub name: String,
    pub value: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StartTag<'a> {
    /// Lowercased tag name.
    pub name: String,
    pub attrs: Vec<Attribute<'a>>,
    pub self_closing: bool,
    pub raw: &'a str,
}

impl<'a> StartTag<'a> {
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.attrs
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.unwrap_or(""))
    }

    pub fn is_void(&self) -> bool {
        VOID_ELEMENTS.contains(&self.name.as_str())
    }

    /// Writes this tag with its `style` attribute replaced by `style`.
    ///
    /// An existing `style` attribute keeps its position; otherwise the new
    /// attribute is appended after the others.
    pub fn write_with_style(&self, out: &mut String, style: &str) {
        out.push('<');
        out.push_str(&self.name);

        let mut wrote_style = false;
        for attr in &self.attrs {
            if attr.name == "style" {
                if !wrote_style {
                    push_attr(out, "style", Some(&style.replace('&', "&amp;")));
                    wrote_style = true;
                }
                continue;
            }
            push_attr(out, &attr.name, attr.value);
        }
        if !wrote_style {
            push_attr(out, "style", Some(&style.replace('&', "&amp;")));
        }

        if self.self_closing {
            out.push_str(" />");
        } else {
            out.push('>');
        }
    }
}

fn push_attr(out: &mut String, name: &str, value: Option<&str>) {
    out.push(' ');
    out.push_str(name);
    if let Some(value) = value {
        out.push_str("=\"");
        out.push_str(&value.replace('"', "&quot;"));
        out.push('"');
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token<'a> {
    /// Character data between tags.
    Text(&'a str),
    StartTag(StartTag<'a>),
    EndTag { name: String, raw: &'a str },
    /// `<!-- ... -->`
    Comment(&'a str),
    /// `<!DOCTYPE ...>`, `<![CDATA[...]>`, `<?xml ...?>`
    Declaration(&'a str),
    /// Contents of `<style>` or `<script>`, up to the matching end tag.
    RawText(&'a str),
}

impl<'a> Token<'a> {
    /// The source text this token was read from.
    pub fn as_str(&self) -> &'a str {
        match self {
            Token::Text(s) | Token::Comment(s) | Token::Declaration(s) | Token::RawText(s) => s,
            Token::StartTag(tag) => tag.raw,
            Token::EndTag { raw, .. } => raw,
        }
    }
}

pub(crate) struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
    /// Set after `<style>`/`<script>`: the end tag that terminates raw text.
    raw_until: Option<&'static str>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            raw_until: None,
        }
    }

    fn advance(&mut self, len: usize) -> &'a str {
        let slice = &self.input[self.pos..self.pos + len];
        self.pos += len;
        slice
    }

    fn next_markup(&mut self) -> Token<'a> {
        let rest = &self.input[self.pos..];

        if rest.starts_with("<!--") {
            let end = rest[4..]
                .find("-->")
                .map(|i| i + 4 + 3)
                .unwrap_or(rest.len());
            return Token::Comment(self.advance(end));
        }

        if rest.starts_with("<!") || rest.starts_with("<?") {
            let end = rest.find('>').map(|i| i + 1).unwrap_or(rest.len());
            return Token::Declaration(self.advance(end));
        }

        if let Some(after) = rest.strip_prefix("</") {
            let name_len = tag_name_len(after);
            if name_len > 0 {
                if let Some(close) = after.find('>') {
                    let name = after[..name_len].to_ascii_lowercase();
                    let raw = self.advance(close + 3);
                    return Token::EndTag { name, raw };
                }
            }
            return Token::Text(self.advance(2));
        }

        if let Some(tag) = parse_start_tag(rest) {
            self.pos += tag.raw.len();
            if !tag.self_closing {
                self.raw_until = match tag.name.as_str() {
                    "style" => Some("</style"),
                    "script" => Some("</script"),
                    _ => None,
                };
            }
            return Token::StartTag(tag);
        }

        Token::Text(self.advance(1))
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.input.len() {
            return None;
        }

        if let Some(terminator) = self.raw_until.take() {
            let rest = &self.input[self.pos..];
            let end = find_ignore_case(rest, terminator).unwrap_or(rest.len());
            if end > 0 {
                return Some(Token::RawText(self.advance(end)));
            }
        }

        let rest = &self.input[self.pos..];
        if rest.starts_with('<') {
            return Some(self.next_markup());
        }

        let end = rest.find('<').unwrap_or(rest.len());
        Some(Token::Text(self.advance(end)))
    }
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b':' || b == b'_'
}

fn tag_name_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    if !bytes.first().is_some_and(|b| b.is_ascii_alphabetic()) {
        return 0;
    }
    bytes.iter().take_while(|b| is_name_byte(**b)).count()
}

/// Parses a start tag at the beginning of `s` (which starts with `<`).
///
/// Returns `None` when `s` does not hold a complete start tag, in which case
/// the `<` is plain text.
fn parse_start_tag(s: &str) -> Option<StartTag<'_>> {
    let bytes = s.as_bytes();
    let name_len = tag_name_len(&s[1..]);
    if name_len == 0 {
        return None;
    }
    let name = s[1..1 + name_len].to_ascii_lowercase();

    let mut attrs = Vec::new();
    let mut i = 1 + name_len;
    loop {
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        match bytes.get(i)? {
            b'>' => {
                return Some(StartTag {
                    name,
                    attrs,
                    self_closing: false,
                    raw: &s[..i + 1],
                });
            }
            b'/' if bytes.get(i + 1) == Some(&b'>') => {
                return Some(StartTag {
                    name,
                    attrs,
                    self_closing: true,
                    raw: &s[..i + 2],
                });
            }
            b'/' => {
                i += 1;
                continue;
            }
            _ => {}
        }

        let start = i;
        while i < bytes.len()
            && !bytes[i].is_ascii_whitespace()
            && !matches!(bytes[i], b'=' | b'>' | b'/')
        {
            i += 1;
        }
        if i == start {
            // A stray '=' with no attribute name.
            i += 1;
            continue;
        }
        let attr_name = s[start..i].to_ascii_lowercase();

        let mut j = i;
        while j < bytes.len() && bytes[j].is_ascii_whitespace() {
            j += 1;
        }
        if bytes.get(j) != Some(&b'=') {
            attrs.push(Attribute {
                name: attr_name,
                value: None,
            });
            continue;
        }

        i = j + 1;
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        let value = match bytes.get(i)? {
            quote @ (b'"' | b'\'') => {
                let close = s[i + 1..].find(*quote as char)? + i + 1;
                let value = &s[i + 1..close];
                i = close + 1;
                value
            }
            _ => {
                let start = i;
                while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>' {
                    i += 1;
                }
                &s[start..i]
            }
        };
        attrs.push(Attribute {
            name: attr_name,
            value: Some(value),
        });
    }
}

/// Decodes character references in an attribute value.
///
/// Handles the named references HTML serializers emit (`&quot;`, `&apos;`,
/// `&amp;`, `&lt;`, `&gt;`, `&nbsp;`) and numeric ones. Anything else is
/// kept as written.
pub(crate) fn decode_entities(value: &str) -> Cow<'_, str> {
    if !value.contains('&') {
        return Cow::Borrowed(value);
    }

    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(idx) = rest.find('&') {
        out.push_str(&rest[..idx]);
        rest = &rest[idx..];

        let decoded = rest
            .find(';')
            .filter(|&end| end <= 10)
            .and_then(|end| decode_entity(&rest[1..end]).map(|c| (c, end)));
        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &rest[end + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "quot" => Some('"'),
        "apos" => Some('\''),
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let digits = name.strip_prefix('#')?;
            let code = match digits.strip_prefix('x').or_else(|| digits.strip_prefix('X')) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => digits.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

fn find_ignore_case(haystack: &str, needle: &str) -> Option<usize> {
    let needle = needle.as_bytes();
    haystack
        .as_bytes()
        .windows(needle.len())
        .position(|w| w.eq_ignore_ascii_case(needle))
}
