//! Attribute access on vector markup without building a document tree.
//!
//! Start tags are located with a small scanner that skips prolog constructs (XML declarations,
//! processing instructions, comments, DOCTYPE, CDATA), then parsed into an ordered attribute
//! map. Mutations go through the map and the tag is reserialized, so attribute order, quoting
//! and duplicate names never leak into pattern matches.
//!
//! Only the targeted start tag is rewritten; every byte outside its span is preserved.

use crate::utils::{escape_attr, unescape_attr};
use crate::{Error, Result};
use indexmap::IndexMap;
use regex::Regex;
use std::ops::Range;

fn comment_regex() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<!--.*?-->").expect("valid regex"))
}

fn processing_instruction_regex() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<\?.*?\?>").expect("valid regex"))
}

fn doctype_regex() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)<!DOCTYPE[^\[>]*(\[.*?\])?\s*>").expect("valid regex")
    })
}

fn entity_declaration_regex() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"<!ENTITY\s+([A-Za-z_:][A-Za-z0-9_.:-]*)\s+(?:"([^"]*)"|'([^']*)')\s*>"#)
            .expect("valid regex")
    })
}

const PREDEFINED_ENTITIES: [&str; 5] = ["amp", "lt", "gt", "quot", "apos"];
const MAX_ENTITY_PASSES: usize = 4;
const MAX_EXPANSION_FACTOR: usize = 16;

/// A parsed element start tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartTag {
    pub name: String,
    pub attributes: IndexMap<String, String>,
    pub self_closing: bool,
    /// Byte range of the tag inside the markup it was read from.
    pub span: Range<usize>,
    /// Attribute values exactly as written in the source, before unescaping.
    source: IndexMap<String, String>,
}

impl StartTag {
    /// Parses the text of a single start tag (`<name a="b" ...>` or `.../>`).
    pub fn parse(text: &str) -> Result<Self> {
        let bytes = text.as_bytes();
        if bytes.first() != Some(&b'<') {
            return Err(Error::malformed("start tag must begin with `<`"));
        }
        let Some(end) = tag_end(text, 0) else {
            return Err(Error::malformed("start tag has no closing `>`"));
        };
        let inner = &text[1..end];

        let name_len = inner
            .find(|c: char| c.is_whitespace() || c == '/' || c == '>')
            .unwrap_or(inner.len());
        let name = &inner[..name_len];
        if name.is_empty() {
            return Err(Error::malformed("start tag has no element name"));
        }

        let self_closing = inner.trim_end().ends_with('/');
        let (attributes, source) = parse_attributes(&inner[name_len..])?;

        Ok(Self {
            name: name.to_string(),
            attributes,
            self_closing,
            span: 0..end + 1,
            source,
        })
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Replaces the value in place, or inserts the attribute right after the element name.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.set_at(name, value, 0);
    }

    fn set_at(&mut self, name: &str, value: impl Into<String>, insert_index: usize) -> bool {
        let value = value.into();
        if let Some(slot) = self.attributes.get_mut(name) {
            *slot = value;
            return false;
        }
        let index = insert_index.min(self.attributes.len());
        self.attributes.shift_insert(index, name.to_string(), value);
        true
    }

    /// Sets several attributes at once. Newly inserted attributes keep the given order and
    /// land right after the element name.
    pub fn set_all(&mut self, pairs: &[(&str, &str)]) {
        let mut insert_index = 0usize;
        for (name, value) in pairs {
            if self.set_at(name, *value, insert_index) {
                insert_index += 1;
            }
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.attributes.shift_remove(name)
    }

    pub fn to_markup(&self) -> String {
        let mut out = String::with_capacity(16 + self.attributes.len() * 16);
        out.push('<');
        out.push_str(&self.name);
        for (key, value) in &self.attributes {
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            // Untouched values are copied verbatim so entity references survive.
            match self.source.get(key) {
                Some(raw) if is_reusable(raw) && unescape_attr(raw) == *value => {
                    out.push_str(raw)
                }
                _ => out.push_str(&escape_attr(value)),
            }
            out.push('"');
        }
        out.push_str(if self.self_closing { "/>" } else { ">" });
        out
    }

    /// Replaces this tag's span inside `markup` with the reserialized tag.
    pub fn splice_into(&self, markup: &str) -> String {
        let mut out = String::with_capacity(markup.len() + 32);
        out.push_str(&markup[..self.span.start]);
        out.push_str(&self.to_markup());
        out.push_str(&markup[self.span.end..]);
        out
    }
}

// Source text can be reused inside double quotes when every `&` starts a reference.
fn is_reusable(raw: &str) -> bool {
    if raw.contains(['"', '<']) {
        return false;
    }
    raw.match_indices('&').all(|(at, _)| {
        let tail = &raw[at + 1..];
        tail.find(';').is_some_and(|semi| {
            let name = &tail[..semi];
            !name.is_empty()
                && name
                    .chars()
                    .all(|c| c.is_alphanumeric() || matches!(c, '#' | '_' | '-' | '.' | ':'))
        })
    })
}

type AttributeMaps = (IndexMap<String, String>, IndexMap<String, String>);

fn parse_attributes(text: &str) -> Result<AttributeMaps> {
    let mut attributes = IndexMap::new();
    let mut source = IndexMap::new();
    let bytes = text.as_bytes();
    let mut i = 0usize;

    loop {
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= bytes.len() || bytes[i] == b'/' || bytes[i] == b'>' {
            break;
        }

        let name_start = i;
        while i < bytes.len()
            && !bytes[i].is_ascii_whitespace()
            && !matches!(bytes[i], b'=' | b'/' | b'>')
        {
            i += 1;
        }
        let name = &text[name_start..i];

        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= bytes.len() || bytes[i] != b'=' {
            // Value-less attribute; tolerated for legacy HTML-ish input.
            attributes.insert(name.to_string(), String::new());
            source.insert(name.to_string(), String::new());
            continue;
        }
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }

        let value = match bytes.get(i) {
            Some(&quote @ (b'"' | b'\'')) => {
                let value_start = i + 1;
                let Some(rel) = text[value_start..].find(quote as char) else {
                    return Err(Error::malformed(format!(
                        "unterminated value for attribute `{name}`"
                    )));
                };
                i = value_start + rel + 1;
                &text[value_start..value_start + rel]
            }
            _ => {
                let value_start = i;
                while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>' {
                    i += 1;
                }
                &text[value_start..i]
            }
        };
        attributes.insert(name.to_string(), unescape_attr(value));
        source.insert(name.to_string(), value.to_string());
    }

    Ok((attributes, source))
}

/// Index of the `>` that closes the tag opened at `start`, honoring quoted values.
fn tag_end(markup: &str, start: usize) -> Option<usize> {
    let bytes = markup.as_bytes();
    let mut quote: Option<u8> = None;
    for (offset, &b) in bytes[start..].iter().enumerate() {
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if b == b'"' || b == b'\'' => quote = Some(b),
            None if b == b'>' => return Some(start + offset),
            None => {}
        }
    }
    None
}

fn is_name_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_' || ch == ':' || !ch.is_ascii()
}

fn skip_past(markup: &str, from: usize, terminator: &str, what: &str) -> Result<usize> {
    match markup[from..].find(terminator) {
        Some(rel) => Ok(from + rel + terminator.len()),
        None => Err(Error::malformed(format!("unterminated {what}"))),
    }
}

/// Finds the next element start tag at or after `from`, returning its byte range.
fn next_start_tag(markup: &str, from: usize) -> Result<Option<Range<usize>>> {
    let mut i = from;
    while let Some(rel) = markup[i..].find('<') {
        let start = i + rel;
        let rest = &markup[start..];

        if rest.starts_with("<?") {
            i = skip_past(markup, start, "?>", "processing instruction")?;
        } else if rest.starts_with("<!--") {
            i = skip_past(markup, start, "-->", "comment")?;
        } else if rest.starts_with("<![CDATA[") {
            i = skip_past(markup, start, "]]>", "CDATA section")?;
        } else if rest.starts_with("<!") {
            let close = rest.find('>');
            let subset = rest.find('[');
            i = match (close, subset) {
                (Some(c), Some(s)) if s < c => skip_past(markup, start + s, "]", "DOCTYPE")
                    .and_then(|after| skip_past(markup, after, ">", "DOCTYPE"))?,
                (Some(c), _) => start + c + 1,
                (None, _) => return Err(Error::malformed("unterminated declaration")),
            };
        } else if rest.starts_with("</") {
            i = skip_past(markup, start, ">", "end tag")?;
        } else if rest[1..].chars().next().is_some_and(is_name_start) {
            let Some(end) = tag_end(markup, start) else {
                return Err(Error::malformed("start tag has no closing `>`"));
            };
            return Ok(Some(start..end + 1));
        } else {
            i = start + 1;
        }
    }
    Ok(None)
}

fn parse_at(markup: &str, span: Range<usize>) -> Result<StartTag> {
    let mut tag = StartTag::parse(&markup[span.clone()])?;
    tag.span = span;
    Ok(tag)
}

/// Parses the first element start tag of the document.
pub fn root_tag(markup: &str) -> Result<Option<StartTag>> {
    match next_start_tag(markup, 0)? {
        Some(span) => parse_at(markup, span).map(Some),
        None => Ok(None),
    }
}

/// Raw text of the root element's start tag.
pub fn get_root_tag(markup: &str) -> Result<Option<&str>> {
    Ok(next_start_tag(markup, 0)?.map(|span| &markup[span]))
}

/// Parses the first start tag named `tag_name` anywhere in the document.
pub fn find_start_tag(markup: &str, tag_name: &str) -> Result<Option<StartTag>> {
    let mut from = 0usize;
    while let Some(span) = next_start_tag(markup, from)? {
        let text = &markup[span.clone()];
        let name_len = text[1..]
            .find(|c: char| c.is_whitespace() || c == '/' || c == '>')
            .unwrap_or(text.len() - 1);
        if &text[1..1 + name_len] == tag_name {
            return parse_at(markup, span).map(Some);
        }
        from = span.end;
    }
    Ok(None)
}

/// Raw text of the first start tag named `tag_name` anywhere in the document.
pub fn find_first_element<'a>(markup: &'a str, tag_name: &str) -> Result<Option<&'a str>> {
    Ok(find_start_tag(markup, tag_name)?.map(|tag| &markup[tag.span]))
}

pub fn get_attribute(markup: &str, name: &str) -> Result<Option<String>> {
    Ok(root_tag(markup)?.and_then(|tag| tag.attributes.get(name).cloned()))
}

/// Sets an attribute on the root element. Markup without any element is returned unchanged.
pub fn set_attribute(markup: &str, name: &str, value: &str) -> Result<String> {
    set_attributes(markup, &[(name, value)])
}

pub fn set_attributes(markup: &str, pairs: &[(&str, &str)]) -> Result<String> {
    let Some(mut tag) = root_tag(markup)? else {
        return Ok(markup.to_string());
    };
    tag.set_all(pairs);
    Ok(tag.splice_into(markup))
}

pub fn remove_attribute(markup: &str, name: &str) -> Result<String> {
    let Some(mut tag) = root_tag(markup)? else {
        return Ok(markup.to_string());
    };
    if tag.remove(name).is_none() {
        return Ok(markup.to_string());
    }
    Ok(tag.splice_into(markup))
}

pub fn strip_comments(markup: &str) -> String {
    comment_regex().replace_all(markup, "").into_owned()
}

/// Removes XML declarations and other processing instructions.
pub fn strip_processing_instructions(markup: &str) -> String {
    processing_instruction_regex()
        .replace_all(markup, "")
        .into_owned()
}

pub fn strip_doctype(markup: &str) -> String {
    doctype_regex().replace_all(markup, "").into_owned()
}

/// Substitutes general entities declared in the DOCTYPE internal subset into the rest of the
/// document, leaving the DOCTYPE itself in place.
///
/// Illustrator declares its namespace URIs this way (`xmlns="&ns_svg;"`), so references have
/// to be resolved before the DOCTYPE is stripped. Parameter and external entities are ignored,
/// and the first declaration of a name wins.
pub fn expand_internal_entities(markup: &str) -> Result<String> {
    let Some(doctype) = doctype_regex().find(markup) else {
        return Ok(markup.to_string());
    };

    let mut entities: Vec<(String, String)> = Vec::new();
    for caps in entity_declaration_regex().captures_iter(doctype.as_str()) {
        let name = &caps[1];
        if PREDEFINED_ENTITIES.contains(&name) || entities.iter().any(|(n, _)| n == name) {
            continue;
        }
        let value = caps.get(2).or_else(|| caps.get(3)).map_or("", |m| m.as_str());
        entities.push((format!("&{name};"), value.to_string()));
    }
    if entities.is_empty() {
        return Ok(markup.to_string());
    }

    let limit = markup.len().saturating_mul(MAX_EXPANSION_FACTOR);
    let mut body = markup[doctype.end()..].to_string();
    for _ in 0..MAX_ENTITY_PASSES {
        let mut changed = false;
        for (reference, value) in &entities {
            if body.contains(reference.as_str()) {
                body = body.replace(reference.as_str(), value);
                changed = true;
            }
        }
        if body.len() > limit {
            return Err(Error::malformed("entity expansion is too large"));
        }
        if !changed {
            break;
        }
    }

    let mut out = String::with_capacity(doctype.end() + body.len());
    out.push_str(&markup[..doctype.end()]);
    out.push_str(&body);
    Ok(out)
}
