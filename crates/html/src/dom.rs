//! Tolerant HTML document tree.
//!
//! Built from `quick-xml` events with end-name checking switched off, so real
//! world HTML (void elements, implied end tags, stray closing tags, unknown
//! entities) produces a usable tree instead of an error. A bare `<` in text
//! is kept as a character, and markup the reader rejects is dropped up to its
//! closing `>` before reading resumes.

use deck_core::{Error, Result};
use std::borrow::Cow;
use quick_xml::escape::unescape_with;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Index of a node inside a [`Document`].
pub type NodeId = usize;

/// Elements that never have children.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose body is raw text and is left out of the tree.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Elements closed implicitly when a sibling of the same name opens.
const SELF_CLOSING_SIBLINGS: &[&str] = &["li", "p"];

/// An element's tag name and class list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Lower-case tag name.
    pub name: String,

    /// Whitespace-separated tokens of the `class` attribute.
    pub classes: Vec<String>,
}

impl Element {
    /// Whether the class list contains `class` as a whole token.
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Whether the tag name is one of `names`.
    pub fn is_one_of(&self, names: &[&str]) -> bool {
        names.contains(&self.name.as_str())
    }
}

#[derive(Debug, Clone)]
enum NodeKind {
    Root,
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    children: Vec<NodeId>,
}

/// A parsed HTML document.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Document {
    /// Parse raw bytes, which must be UTF-8.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let html = std::str::from_utf8(bytes)
            .map_err(|e| Error::EncodingError(format!("Input is not valid UTF-8: {}", e)))?;
        Ok(Self::parse(html))
    }

    /// Parse an HTML string. Never fails; malformed regions are skipped.
    pub fn parse(html: &str) -> Self {
        TreeBuilder::new().build(html)
    }

    /// The document root.
    pub fn root(&self) -> NodeId {
        0
    }

    /// The element at `id`, if it is one.
    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match self.nodes.get(id).map(|n| &n.kind) {
            Some(NodeKind::Element(element)) => Some(element),
            _ => None,
        }
    }

    /// Direct children of `id`.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// `id` and all nodes below it, in document order.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            document: self,
            stack: vec![id],
        }
    }

    /// Elements below (and including) `id` that satisfy `predicate`, in document order.
    pub fn find_all<'a, F>(&'a self, id: NodeId, predicate: F) -> impl Iterator<Item = NodeId> + 'a
    where
        F: Fn(&Element) -> bool + 'a,
    {
        self.descendants(id)
            .filter(move |&n| self.element(n).map(|e| predicate(e)).unwrap_or(false))
    }

    /// Concatenated text of all text nodes below `id`, unmodified.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut text = String::new();
        for node in self.descendants(id) {
            if let Some(Node {
                kind: NodeKind::Text(t),
                ..
            }) = self.nodes.get(node)
            {
                text.push_str(t);
            }
        }
        text
    }
}

/// Pre-order iterator over a subtree.
pub struct Descendants<'a> {
    document: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.document.children(id).iter().rev().copied());
        Some(id)
    }
}

/// Builds a [`Document`] from a stream of markup events.
struct TreeBuilder {
    nodes: Vec<Node>,
    /// Open elements, root first.
    open: Vec<NodeId>,
    /// Name of the raw text element being skipped, if any.
    skipping: Option<String>,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            nodes: vec![Node {
                kind: NodeKind::Root,
                children: Vec::new(),
            }],
            open: vec![0],
            skipping: None,
        }
    }

    fn build(mut self, html: &str) -> Document {
        let html = escape_stray_angles(html);

        let mut offset = 0;
        while let Some(resume) = self.read_events(&html[offset..]) {
            offset += resume;
        }

        Document { nodes: self.nodes }
    }

    /// Feed the events of `chunk` into the tree.
    ///
    /// Returns the offset just past a malformed piece of markup, where reading
    /// should resume, or `None` once the input is used up.
    fn read_events(&mut self, chunk: &str) -> Option<usize> {
        let mut reader = Reader::from_str(chunk);
        reader
            .trim_text(false)
            .check_end_names(false)
            .expand_empty_elements(false);

        let mut last_ok = 0;

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) => {
                    if self.skipping.is_none() {
                        self.open_element(e, false);
                    }
                }
                Ok(Event::Empty(ref e)) => {
                    if self.skipping.is_none() {
                        self.open_element(e, true);
                    }
                }
                Ok(Event::End(ref e)) => {
                    let name = tag_name(e.name().as_ref());
                    match self.skipping.as_deref().map(|skipped| skipped == name) {
                        Some(true) => self.skipping = None,
                        Some(false) => {}
                        None => self.close_element(&name),
                    }
                }
                Ok(Event::Text(ref e)) => {
                    if self.skipping.is_none() {
                        let raw = String::from_utf8_lossy(e);
                        self.push_text(decode_entities(&raw));
                    }
                }
                Ok(Event::CData(e)) => {
                    if self.skipping.is_none() {
                        let raw = e.into_inner();
                        self.push_text(String::from_utf8_lossy(&raw).into_owned());
                    }
                }
                Ok(Event::Eof) => return None,
                Err(e) => {
                    log::warn!(
                        "HTML parsing error at byte {} (skipping markup): {}",
                        last_ok,
                        e
                    );
                    return skip_malformed(chunk.as_bytes(), last_ok);
                }
                // Comments, declarations, processing instructions, doctype
                _ => {}
            }

            last_ok = reader.buffer_position();
        }
    }

    fn current(&self) -> NodeId {
        self.open.last().copied().unwrap_or(0)
    }

    fn append(&mut self, kind: NodeKind) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node {
            kind,
            children: Vec::new(),
        });
        let parent = self.current();
        self.nodes[parent].children.push(id);
        id
    }

    fn open_element(&mut self, start: &BytesStart, self_closed: bool) {
        let name = tag_name(start.name().as_ref());

        if RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
            if !self_closed {
                self.skipping = Some(name);
            }
            return;
        }

        if SELF_CLOSING_SIBLINGS.contains(&name.as_str()) {
            let current = self.current();
            if self.element_name(current) == Some(name.as_str()) {
                self.open.pop();
            }
        }

        let classes = class_tokens(start);
        let is_void = VOID_ELEMENTS.contains(&name.as_str());
        let id = self.append(NodeKind::Element(Element { name, classes }));

        if !self_closed && !is_void {
            self.open.push(id);
        }
    }

    /// Close the innermost open element named `name` and everything inside it.
    fn close_element(&mut self, name: &str) {
        // Index 0 is the root and never closes.
        if let Some(pos) = (1..self.open.len())
            .rev()
            .find(|&i| self.element_name(self.open[i]) == Some(name))
        {
            self.open.truncate(pos);
        }
    }

    fn push_text(&mut self, text: String) {
        if !text.is_empty() {
            self.append(NodeKind::Text(text));
        }
    }

    fn element_name(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id].kind {
            NodeKind::Element(element) => Some(element.name.as_str()),
            _ => None,
        }
    }
}

/// Lower-case local tag name.
fn tag_name(name: &[u8]) -> String {
    let local = match name.iter().position(|&b| b == b':') {
        Some(pos) => &name[pos + 1..],
        None => name,
    };
    String::from_utf8_lossy(local).to_ascii_lowercase()
}

/// Tokens of the `class` attribute, tolerating unquoted and valueless attributes.
fn class_tokens(start: &BytesStart) -> Vec<String> {
    for attr in start.html_attributes().flatten() {
        if attr.key.as_ref().eq_ignore_ascii_case(b"class") {
            let raw = String::from_utf8_lossy(&attr.value);
            return decode_entities(&raw)
                .split_whitespace()
                .map(str::to_string)
                .collect();
        }
    }
    Vec::new()
}

/// Escape every `<` that cannot open markup so it reads as text.
///
/// Markup starts with `<` followed by a letter, `/`, `!` or `?`; anything else
/// (`3 < 4`, `<5%`) is a literal character.
fn escape_stray_angles(html: &str) -> Cow<'_, str> {
    let bytes = html.as_bytes();
    let is_stray = |i: usize| {
        !matches!(
            bytes.get(i + 1),
            Some(&b) if b.is_ascii_alphabetic() || b == b'/' || b == b'!' || b == b'?'
        )
    };

    let mut stray = html
        .match_indices('<')
        .map(|(i, _)| i)
        .filter(|&i| is_stray(i))
        .peekable();
    if stray.peek().is_none() {
        return Cow::Borrowed(html);
    }

    let mut out = String::with_capacity(html.len() + 8);
    let mut last = 0;
    for i in stray {
        out.push_str(&html[last..i]);
        out.push_str("&lt;");
        last = i + 1;
    }
    out.push_str(&html[last..]);
    Cow::Owned(out)
}

/// Offset just past the malformed markup that starts at or right before
/// `last_ok`.
///
/// The markup is dropped up to the next `>`. Without one the rest of the
/// input is an unterminated tag and nothing is left to read.
fn skip_malformed(bytes: &[u8], last_ok: usize) -> Option<usize> {
    let last_ok = last_ok.min(bytes.len());
    let open = if last_ok > 0 && bytes[last_ok - 1] == b'<' {
        last_ok - 1
    } else {
        last_ok + bytes[last_ok..].iter().position(|&b| b == b'<')?
    };
    let close = open + bytes[open..].iter().position(|&b| b == b'>')?;
    Some(close + 1)
}

/// Resolve character references one at a time.
///
/// A `&` that does not start a known reference stays literal.
fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];

        let resolved = reference_len(tail).and_then(|len| {
            unescape_with(&tail[..len], resolve_html_entity)
                .ok()
                .map(|text| (len, text))
        });

        match resolved {
            Some((len, text)) => {
                out.push_str(&text);
                rest = &tail[len..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

/// Byte length of the `&name;` or `&#code;` reference at the start of `text`.
fn reference_len(text: &str) -> Option<usize> {
    let body = text.strip_prefix('&')?;
    let end = body.find(|c: char| !(c.is_ascii_alphanumeric() || c == '#'))?;
    (end > 0 && body[end..].starts_with(';')).then_some(end + 2)
}

/// Named entities commonly found in hand-written presentations.
fn resolve_html_entity(name: &str) -> Option<&'static str> {
    let value = match name {
        "lt" => "<",
        "gt" => ">",
        "amp" => "&",
        "quot" => "\"",
        "apos" => "'",
        "nbsp" => "\u{a0}",
        "ensp" => "\u{2002}",
        "emsp" => "\u{2003}",
        "thinsp" => "\u{2009}",
        "mdash" => "\u{2014}",
        "ndash" => "\u{2013}",
        "minus" => "\u{2212}",
        "hellip" => "\u{2026}",
        "laquo" => "\u{ab}",
        "raquo" => "\u{bb}",
        "lsquo" => "\u{2018}",
        "rsquo" => "\u{2019}",
        "ldquo" => "\u{201c}",
        "rdquo" => "\u{201d}",
        "bdquo" => "\u{201e}",
        "bull" => "\u{2022}",
        "middot" => "\u{b7}",
        "copy" => "\u{a9}",
        "reg" => "\u{ae}",
        "trade" => "\u{2122}",
        "deg" => "\u{b0}",
        "plusmn" => "\u{b1}",
        "times" => "\u{d7}",
        "divide" => "\u{f7}",
        "euro" => "\u{20ac}",
        "pound" => "\u{a3}",
        "yen" => "\u{a5}",
        "cent" => "\u{a2}",
        "sect" => "\u{a7}",
        "para" => "\u{b6}",
        "le" => "\u{2264}",
        "ge" => "\u{2265}",
        "ne" => "\u{2260}",
        "asymp" => "\u{2248}",
        "infin" => "\u{221e}",
        "larr" => "\u{2190}",
        "rarr" => "\u{2192}",
        "uarr" => "\u{2191}",
        "darr" => "\u{2193}",
        "check" => "\u{2713}",
        "numero" => "\u{2116}",
        "shy" => "\u{ad}",
        _ => return None,
    };
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element_names(doc: &Document) -> Vec<String> {
        doc.descendants(doc.root())
            .filter_map(|n| doc.element(n).map(|e| e.name.clone()))
            .collect()
    }

    #[test]
    fn test_parse_simple_tree() {
        let doc = Document::parse(r#"<div class="slide"><h1 class="slide-title">Hi</h1></div>"#);

        assert_eq!(element_names(&doc), vec!["div", "h1"]);
        let div = doc.children(doc.root())[0];
        assert!(doc.element(div).unwrap().has_class("slide"));
        assert_eq!(doc.text_content(div), "Hi");
    }

    #[test]
    fn test_class_tokens() {
        let doc = Document::parse(r#"<div class="  highlight-box   wide ">x</div>"#);
        let div = doc.children(doc.root())[0];
        let element = doc.element(div).unwrap();

        assert_eq!(element.classes, vec!["highlight-box", "wide"]);
        assert!(element.has_class("wide"));
        assert!(!element.has_class("highlight"));
    }

    #[test]
    fn test_unquoted_class_attribute() {
        let doc = Document::parse("<div class=slide>x</div>");
        let div = doc.children(doc.root())[0];
        assert!(doc.element(div).unwrap().has_class("slide"));
    }

    #[test]
    fn test_void_elements_take_no_children() {
        let doc = Document::parse("<p>one<br>two<img src=\"a.png\">three</p><p>four</p>");
        let root_children = doc.children(doc.root());

        assert_eq!(root_children.len(), 2);
        assert_eq!(doc.text_content(root_children[0]), "onetwothree");
        assert_eq!(doc.text_content(root_children[1]), "four");
    }

    #[test]
    fn test_implied_li_end() {
        let doc = Document::parse("<ul><li>one<li>two<li>three</ul>");
        let ul = doc.children(doc.root())[0];

        assert_eq!(doc.children(ul).len(), 3);
        assert_eq!(doc.text_content(doc.children(ul)[1]), "two");
    }

    #[test]
    fn test_stray_end_tag_is_ignored() {
        let doc = Document::parse("<div>a</span>b</div><p>c</p>");
        let root_children = doc.children(doc.root());

        assert_eq!(root_children.len(), 2);
        assert_eq!(doc.text_content(root_children[0]), "ab");
    }

    #[test]
    fn test_end_tag_closes_inner_elements() {
        let doc = Document::parse("<div><span>a<b>b</div>c");
        let root_children = doc.children(doc.root());

        assert_eq!(root_children.len(), 2);
        assert_eq!(doc.text_content(root_children[0]), "ab");
    }

    #[test]
    fn test_script_and_style_are_skipped() {
        let doc = Document::parse(
            "<div>a<script>var x = 1;</script>b<style>.x { color: red; }</style>c</div>",
        );
        assert_eq!(doc.text_content(doc.root()), "abc");
        assert_eq!(element_names(&doc), vec!["div"]);
    }

    #[test]
    fn test_entities() {
        let doc = Document::parse("<p>R&amp;D&nbsp;&mdash; &laquo;ok&raquo; &#169;</p>");
        assert_eq!(
            doc.text_content(doc.root()),
            "R&D\u{a0}\u{2014} \u{ab}ok\u{bb} \u{a9}"
        );
    }

    #[test]
    fn test_unknown_entity_keeps_raw_text() {
        let doc = Document::parse("<p>A &unknown; B</p>");
        assert_eq!(doc.text_content(doc.root()), "A &unknown; B");
    }

    #[test]
    fn test_doctype_and_comments() {
        let doc = Document::parse(
            "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>T</title></head>\
             <body><!-- note --><div>x</div></body></html>",
        );
        assert_eq!(element_names(&doc), vec!["html", "head", "meta", "title", "body", "div"]);
    }

    #[test]
    fn test_uppercase_tags_are_lowercased() {
        let doc = Document::parse("<DIV CLASS=\"slide\"><UL><LI>x</LI></UL></DIV>");
        assert_eq!(element_names(&doc), vec!["div", "ul", "li"]);
        let div = doc.children(doc.root())[0];
        assert!(doc.element(div).unwrap().has_class("slide"));
    }

    #[test]
    fn test_unclosed_document_keeps_content() {
        let doc = Document::parse("<div class=\"slide\"><h1>Title");
        assert_eq!(doc.text_content(doc.root()), "Title");
    }

    #[test]
    fn test_from_bytes_rejects_invalid_utf8() {
        let err = Document::from_bytes(&[0x3c, 0x70, 0x3e, 0xff, 0xfe]).unwrap_err();
        assert!(matches!(err, Error::EncodingError(_)));
    }

    #[test]
    fn test_find_all_in_document_order() {
        let doc = Document::parse("<ul><li>a</li></ul><div><ol><li>b</li></ol></div><ul></ul>");
        let lists: Vec<NodeId> = doc
            .find_all(doc.root(), |e| e.is_one_of(&["ul", "ol"]))
            .collect();

        assert_eq!(lists.len(), 3);
        assert_eq!(doc.text_content(lists[1]), "b");
    }

    #[test]
    fn test_empty_input() {
        let doc = Document::parse("");
        assert!(doc.children(doc.root()).is_empty());
        assert_eq!(doc.text_content(doc.root()), "");
    }

    #[test]
    fn test_malformed_markup_keeps_later_slides() {
        for bad in ["<! y", "<? y", "<!- bogus ->"] {
            let doc = Document::parse(&format!(
                r#"<div class="slide"><h1 class="slide-title">A</h1><p>x {} </p><ul><li>after</li></ul></div><div class="slide"><h1 class="slide-title">B</h1></div>"#,
                bad
            ));

            let slides: Vec<NodeId> = doc.find_all(doc.root(), |e| e.has_class("slide")).collect();
            assert_eq!(slides.len(), 2, "input with {:?}", bad);
            assert_eq!(doc.text_content(slides[1]), "B");

            let lists: Vec<NodeId> = doc.find_all(slides[0], |e| e.name == "ul").collect();
            assert_eq!(lists.len(), 1, "input with {:?}", bad);
            assert_eq!(doc.text_content(lists[0]), "after");
        }
    }

    #[test]
    fn test_bare_less_than_is_text() {
        let doc = Document::parse("<h1>Share <5% of market</h1><p>3 < 4</p><p>trailing <</p>");
        let root_children = doc.children(doc.root());

        assert_eq!(root_children.len(), 3);
        assert_eq!(doc.text_content(root_children[0]), "Share <5% of market");
        assert_eq!(doc.text_content(root_children[1]), "3 < 4");
        assert_eq!(doc.text_content(root_children[2]), "trailing <");
    }

    #[test]
    fn test_unterminated_tag_at_end_is_dropped() {
        let doc = Document::parse("<ul><li>One<li>Two</ul");
        assert_eq!(doc.text_content(doc.root()), "OneTwo");
    }

    #[test]
    fn test_bare_ampersand_next_to_entity() {
        let doc = Document::parse("<p>R & D &amp; more &copy &#8470;1</p>");
        assert_eq!(doc.text_content(doc.root()), "R & D & more &copy \u{2116}1");
    }
}
