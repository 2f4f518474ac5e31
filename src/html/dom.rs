use super::entities::decode_entities;
use super::selector::Selector;
use super::style;
use super::tokenizer::{Attribute, Token, Tokenizer};
use std::ops::Range;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Subtrees where `<tag/>` closes the element (SVG and MathML).
const FOREIGN_ROOTS: &[&str] = &["svg", "math"];

/// Index of an element in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(usize);

#[derive(Debug, Clone)]
enum Node {
    Element(ElementId),
    Text { span: Range<usize>, decode: bool },
}

#[derive(Debug, Clone)]
pub struct Element {
    name: String,
    attributes: Vec<Attribute>,
    self_closing: bool,
    parent: Option<ElementId>,
    children: Vec<Node>,
    tag_span: Range<usize>,
    modified: bool,
}

impl Element {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_deref().unwrap_or(""))
    }

    fn set_attribute(&mut self, name: &str, value: String) {
        match self.attributes.iter_mut().find(|a| a.name == name) {
            Some(attr) => attr.value = Some(value),
            None => self.attributes.push(Attribute {
                name: name.to_string(),
                value: Some(value),
            }),
        }
        self.modified = true;
    }

    fn serialize_start_tag(&self) -> String {
        let mut out = format!("<{}", self.name);
        for attr in &self.attributes {
            out.push(' ');
            out.push_str(&attr.name);
            if let Some(value) = &attr.value {
                if value.contains('"') && !value.contains('\'') {
                    out.push_str(&format!("='{}'", value));
                } else {
                    out.push_str(&format!("=\"{}\"", value.replace('"', "&quot;")));
                }
            }
        }
        if self.self_closing {
            out.push_str(" /");
        }
        out.push('>');
        out
    }

    fn matches(&self, selector: &Selector) -> bool {
        selector.matches(&self.name, self.attribute("class"), self.attribute("id"))
    }
}

/// Input bytes that were not valid UTF-8, kept so serialization can splice
/// into them instead of the lossy text.
#[derive(Debug, Clone)]
struct RawSource {
    bytes: Vec<u8>,
    /// `(text offset, byte offset)` where each valid run starts.
    runs: Vec<(usize, usize)>,
}

impl RawSource {
    /// Byte offset of a text offset that lies inside a valid run.
    fn offset(&self, text_offset: usize) -> usize {
        let run = self.runs.partition_point(|&(t, _)| t <= text_offset) - 1;
        let (text_start, byte_start) = self.runs[run];
        byte_start + (text_offset - text_start)
    }
}

/// A parsed HTML document that keeps its source text.
///
/// Elements are stored in document order, so an element's descendants are
/// exactly the contiguous run of elements created while it was open.
/// Serialization re-emits the source and only rewrites start tags whose
/// attributes changed.
#[derive(Debug, Clone)]
pub struct Document {
    source: String,
    raw: Option<RawSource>,
    elements: Vec<Element>,
    roots: Vec<Node>,
}

impl Document {
    /// Parses markup that may not be valid UTF-8.
    ///
    /// Invalid sequences read as U+FFFD, but [`Document::to_bytes`] still
    /// returns the original bytes outside rewritten start tags.
    pub fn parse_bytes(bytes: &[u8]) -> Self {
        if let Ok(text) = std::str::from_utf8(bytes) {
            return Self::parse(text);
        }

        let mut text = String::with_capacity(bytes.len() + 16);
        let mut runs = Vec::new();
        let mut byte_offset = 0;
        for chunk in bytes.utf8_chunks() {
            runs.push((text.len(), byte_offset));
            text.push_str(chunk.valid());
            byte_offset += chunk.valid().len();
            if !chunk.invalid().is_empty() {
                text.push(char::REPLACEMENT_CHARACTER);
                byte_offset += chunk.invalid().len();
            }
        }

        let mut doc = Self::parse(&text);
        doc.raw = Some(RawSource {
            bytes: bytes.to_vec(),
            runs,
        });
        doc
    }

    pub fn parse(source: &str) -> Self {
        let mut doc = Document {
            source: source.to_string(),
            raw: None,
            elements: Vec::new(),
            roots: Vec::new(),
        };
        let mut open: Vec<ElementId> = Vec::new();

        for token in Tokenizer::new(source) {
            match token {
                Token::StartTag(tag) => {
                    let id = ElementId(doc.elements.len());
                    let parent = open.last().copied();
                    let in_foreign = FOREIGN_ROOTS.contains(&tag.name.as_str())
                        || open
                            .iter()
                            .any(|&e| FOREIGN_ROOTS.contains(&doc.elements[e.0].name.as_str()));
                    let closes_itself = VOID_ELEMENTS.contains(&tag.name.as_str())
                        || (tag.self_closing && in_foreign);

                    doc.elements.push(Element {
                        name: tag.name,
                        attributes: tag.attributes,
                        self_closing: tag.self_closing,
                        parent,
                        children: Vec::new(),
                        tag_span: tag.span,
                        modified: false,
                    });
                    doc.push_child(parent, Node::Element(id));
                    if !closes_itself {
                        open.push(id);
                    }
                }
                Token::EndTag { name, .. } => {
                    // Unmatched end tags are ignored.
                    if let Some(pos) = open.iter().rposition(|&e| doc.elements[e.0].name == name) {
                        open.truncate(pos);
                    }
                }
                Token::Text { span, decode } => {
                    doc.push_child(open.last().copied(), Node::Text { span, decode });
                }
            }
        }

        doc
    }

    fn push_child(&mut self, parent: Option<ElementId>, node: Node) {
        match parent {
            Some(p) => self.elements[p.0].children.push(node),
            None => self.roots.push(node),
        }
    }

    pub fn element(&self, id: ElementId) -> &Element {
        &self.elements[id.0]
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// All elements matching `selector`, in document order.
    pub fn select_all(&self, selector: &Selector) -> Vec<ElementId> {
        self.elements
            .iter()
            .enumerate()
            .filter(|(_, e)| e.matches(selector))
            .map(|(i, _)| ElementId(i))
            .collect()
    }

    /// First descendant of `root` matching `selector`, in document order.
    pub fn select_first_within(&self, root: ElementId, selector: &Selector) -> Option<ElementId> {
        self.elements[root.0 + 1..]
            .iter()
            .enumerate()
            .map(|(i, e)| (ElementId(root.0 + 1 + i), e))
            .take_while(|&(id, _)| self.is_descendant(id, root))
            .find(|(_, e)| e.matches(selector))
            .map(|(id, _)| id)
    }

    fn is_descendant(&self, id: ElementId, ancestor: ElementId) -> bool {
        let mut current = self.elements[id.0].parent;
        while let Some(p) = current {
            if p == ancestor {
                return true;
            }
            current = self.elements[p.0].parent;
        }
        false
    }

    /// Concatenated text of all descendant text nodes, references decoded.
    pub fn text_content(&self, id: ElementId) -> String {
        let mut out = String::new();
        self.collect_text(&self.elements[id.0].children, &mut out);
        out
    }

    fn collect_text(&self, nodes: &[Node], out: &mut String) {
        for node in nodes {
            match node {
                Node::Text { span, decode: true } => {
                    out.push_str(&decode_entities(&self.source[span.clone()]))
                }
                Node::Text { span, decode: false } => out.push_str(&self.source[span.clone()]),
                Node::Element(child) => self.collect_text(&self.elements[child.0].children, out),
            }
        }
    }

    pub fn style_property(&self, id: ElementId, property: &str) -> Option<&str> {
        self.elements[id.0]
            .attribute("style")
            .and_then(|s| style::get_property(s, property))
    }

    /// Sets one declaration in the element's inline style attribute,
    /// creating the attribute when absent.
    pub fn set_style_property(&mut self, id: ElementId, property: &str, value: &str) {
        let element = &mut self.elements[id.0];
        let current = element.attribute("style").unwrap_or("");
        let updated = style::set_property(current, property, value);
        element.set_attribute("style", updated);
    }

    /// Serialized markup as text. Input parsed with [`Document::parse_bytes`]
    /// that was not UTF-8 comes back with U+FFFD in place of invalid bytes;
    /// use [`Document::to_bytes`] to keep them.
    pub fn to_html(&self) -> String {
        let mut out = String::with_capacity(self.source.len() + 64);
        let mut cursor = 0;
        for element in self.elements.iter().filter(|e| e.modified) {
            out.push_str(&self.source[cursor..element.tag_span.start]);
            out.push_str(&element.serialize_start_tag());
            cursor = element.tag_span.end;
        }
        out.push_str(&self.source[cursor..]);
        out
    }

    /// Serialized markup with every byte outside rewritten start tags taken
    /// from the original input.
    pub fn to_bytes(&self) -> Vec<u8> {
        let Some(raw) = &self.raw else {
            return self.to_html().into_bytes();
        };

        let mut out = Vec::with_capacity(raw.bytes.len() + 64);
        let mut cursor = 0;
        for element in self.elements.iter().filter(|e| e.modified) {
            let start = raw.offset(element.tag_span.start);
            out.extend_from_slice(&raw.bytes[cursor..start]);
            out.extend_from_slice(element.serialize_start_tag().as_bytes());
            cursor = raw.offset(element.tag_span.end);
        }
        out.extend_from_slice(&raw.bytes[cursor..]);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sel(s: &str) -> Selector {
        Selector::parse(s).unwrap()
    }

    #[test]
    fn test_select_all_in_document_order() {
        let doc = Document::parse(
            r#"<div class="star-rating" id="a"></div><p><span class="star-rating" id="b"></span></p>"#,
        );
        let found: Vec<_> = doc
            .select_all(&sel(".star-rating"))
            .into_iter()
            .map(|id| doc.element(id).attribute("id").unwrap().to_string())
            .collect();
        assert_eq!(found, vec!["a", "b"]);
    }

    #[test]
    fn test_select_first_within_stays_inside_root() {
        let doc = Document::parse(
            r#"<div class="w"><em>x</em></div><div class="w"><span id="inner"></span></div><span id="outer"></span>"#,
        );
        let widgets = doc.select_all(&sel(".w"));
        assert_eq!(doc.select_first_within(widgets[0], &sel("span")), None);
        let inner = doc.select_first_within(widgets[1], &sel("span")).unwrap();
        assert_eq!(doc.element(inner).attribute("id"), Some("inner"));
    }

    #[test]
    fn test_text_content_decodes_and_skips_comments() {
        let doc = Document::parse("<strong>4<!-- hidden -->&#46;<b>5</b> stars</strong>");
        let strong = doc.select_all(&sel("strong"))[0];
        assert_eq!(doc.text_content(strong), "4.5 stars");
    }

    #[test]
    fn test_void_and_unclosed_elements() {
        let doc = Document::parse("<div><img src=x><span>1</span></p></div><span>2</span>");
        let div = doc.select_all(&sel("div"))[0];
        let img = doc.select_all(&sel("img"))[0];
        assert_eq!(doc.element(img).parent, Some(div));
        assert_eq!(doc.select_all(&sel("span")).len(), 2);
        let first_span = doc.select_first_within(div, &sel("span")).unwrap();
        assert_eq!(doc.text_content(first_span), "1");
    }

    #[test]
    fn test_html_self_closing_span_stays_open() {
        let doc = Document::parse(r#"<div><span/><b>x</b></div>"#);
        let span = doc.select_all(&sel("span"))[0];
        assert_eq!(doc.text_content(span), "x");
    }

    #[test]
    fn test_serialization_rewrites_only_modified_tags() {
        let source = "<!DOCTYPE html>\n<div class=star-rating>\n  <SPAN  class='fill'></SPAN>\n</div>";
        let mut doc = Document::parse(source);
        assert_eq!(doc.to_html(), source);

        let span = doc.select_all(&sel("span"))[0];
        doc.set_style_property(span, "width", "80.00%");
        assert_eq!(
            doc.to_html(),
            "<!DOCTYPE html>\n<div class=star-rating>\n  <span class=\"fill\" style=\"width: 80.00%;\"></SPAN>\n</div>"
        );
        assert_eq!(doc.style_property(span, "width"), Some("80.00%"));
    }

    #[test]
    fn test_to_bytes_keeps_invalid_utf8() {
        let source = b"<p>Caf\xe9</p><div><span></span>\xff\xfe</div><b>\xe9</b>";
        let mut doc = Document::parse_bytes(source);
        assert_eq!(doc.to_bytes(), source.to_vec());

        let span = doc.select_all(&sel("span"))[0];
        doc.set_style_property(span, "width", "40.00%");
        let mut expected = b"<p>Caf\xe9</p><div>".to_vec();
        expected.extend_from_slice(b"<span style=\"width: 40.00%;\"></span>\xff\xfe</div><b>\xe9</b>");
        assert_eq!(doc.to_bytes(), expected);
        assert_eq!(doc.text_content(doc.select_all(&sel("p"))[0]), "Caf\u{fffd}");
    }

    #[test]
    fn test_to_bytes_matches_to_html_for_utf8() {
        let mut doc = Document::parse_bytes("<span>é</span>".as_bytes());
        let span = doc.select_all(&sel("span"))[0];
        doc.set_style_property(span, "width", "1.00%");
        assert_eq!(doc.to_bytes(), doc.to_html().into_bytes());
    }
}
