//! Tolerant HTML tokenizer.
//!
//! Produces start tags, end tags and text runs with byte spans into the
//! source. Comments, doctypes and processing instructions are consumed but
//! not emitted; they survive serialization because the document re-emits the
//! original source around rewritten tags.

use std::ops::Range;

/// Elements whose content is never tokenized as markup.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title"];

/// Raw-text elements whose content still decodes character references.
const ESCAPABLE_RAW_TEXT_ELEMENTS: &[&str] = &["textarea", "title"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Lowercased attribute name.
    pub name: String,
    /// Raw value as written in the source, entities left encoded.
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartTag {
    pub name: String,
    pub attributes: Vec<Attribute>,
    pub self_closing: bool,
    pub span: Range<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    StartTag(StartTag),
    EndTag { name: String, span: Range<usize> },
    Text { span: Range<usize>, decode: bool },
}

pub struct Tokenizer<'a> {
    source: &'a str,
    pos: usize,
    raw_text_end: Option<String>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: 0,
            raw_text_end: None,
        }
    }

    fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    fn next_raw_text(&mut self, name: String) -> Option<Token> {
        let start = self.pos;
        let closing = format!("</{}", name);
        let end = find_ci(self.rest(), &closing)
            .map(|rel| start + rel)
            .unwrap_or(self.source.len());
        self.pos = end;
        if end > start {
            let decode = ESCAPABLE_RAW_TEXT_ELEMENTS.contains(&name.as_str());
            return Some(Token::Text {
                span: start..end,
                decode,
            });
        }
        self.next()
    }

    /// Tries to read markup at `self.pos`, which points at a `<`.
    /// Returns `None` when the `<` turns out to be literal text.
    fn read_markup(&mut self) -> Option<Option<Token>> {
        let start = self.pos;
        let rest = self.rest();
        let bytes = rest.as_bytes();

        if rest.starts_with("<!--") {
            let end = rest[4..]
                .find("-->")
                .map(|i| start + 4 + i + 3)
                .unwrap_or(self.source.len());
            self.pos = end;
            return Some(None);
        }

        if rest.starts_with("<!") || rest.starts_with("<?") {
            let end = rest
                .find('>')
                .map(|i| start + i + 1)
                .unwrap_or(self.source.len());
            self.pos = end;
            return Some(None);
        }

        if bytes.len() > 2 && bytes[1] == b'/' && bytes[2].is_ascii_alphabetic() {
            let name_end = rest[2..]
                .find(|c: char| c.is_ascii_whitespace() || c == '/' || c == '>')
                .map(|i| i + 2)
                .unwrap_or(rest.len());
            let name = rest[2..name_end].to_ascii_lowercase();
            let end = rest
                .find('>')
                .map(|i| start + i + 1)
                .unwrap_or(self.source.len());
            self.pos = end;
            return Some(Some(Token::EndTag {
                name,
                span: start..end,
            }));
        }

        if bytes.len() > 1 && bytes[1].is_ascii_alphabetic() {
            let Some((tag, len)) = parse_start_tag(rest) else {
                // A start tag cut off by the end of input is dropped.
                self.pos = self.source.len();
                return Some(None);
            };
            self.pos = start + len;
            let tag = StartTag {
                span: start..start + len,
                ..tag
            };
            if !tag.self_closing && RAW_TEXT_ELEMENTS.contains(&tag.name.as_str()) {
                self.raw_text_end = Some(tag.name.clone());
            }
            return Some(Some(Token::StartTag(tag)));
        }

        None
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if let Some(name) = self.raw_text_end.take() {
            return self.next_raw_text(name);
        }

        loop {
            let text_start = self.pos;
            let markup_start = self.next_markup_from(text_start);
            if markup_start > text_start {
                self.pos = markup_start;
                return Some(Token::Text {
                    span: text_start..markup_start,
                    decode: true,
                });
            }
            if markup_start >= self.source.len() {
                return None;
            }
            match self.read_markup() {
                Some(Some(token)) => return Some(token),
                Some(None) => continue,
                None => {
                    self.pos = self.source.len();
                    return None;
                }
            }
        }
    }
}

impl Tokenizer<'_> {
    /// Byte offset of the next `<` that opens markup, or the end of input.
    fn next_markup_from(&self, from: usize) -> usize {
        let mut scan = from;
        while let Some(rel) = self.source[scan..].find('<') {
            scan += rel;
            let mut probe = Tokenizer {
                source: self.source,
                pos: scan,
                raw_text_end: None,
            };
            if probe.read_markup().is_some() {
                return scan;
            }
            scan += 1;
        }
        self.source.len()
    }
}

/// Parses `<name attr=value ...>` at the start of `input`.
/// Returns the tag (with an empty span) and its length in bytes, or `None`
/// when the tag is never closed.
fn parse_start_tag(input: &str) -> Option<(StartTag, usize)> {
    let bytes = input.as_bytes();
    let mut i = 1;
    while i < bytes.len() && !is_tag_delimiter(bytes[i]) {
        i += 1;
    }
    let name = input[1..i].to_ascii_lowercase();

    let mut attributes: Vec<Attribute> = Vec::new();
    let mut self_closing = false;

    loop {
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= bytes.len() {
            return None;
        }
        match bytes[i] {
            b'>' => {
                i += 1;
                break;
            }
            b'/' => {
                i += 1;
                self_closing = bytes.get(i) == Some(&b'>');
                continue;
            }
            _ => {}
        }

        let name_start = i;
        i += 1;
        while i < bytes.len() && !is_tag_delimiter(bytes[i]) && bytes[i] != b'=' {
            i += 1;
        }
        let attr_name = input[name_start..i].to_ascii_lowercase();

        let mut j = i;
        while j < bytes.len() && bytes[j].is_ascii_whitespace() {
            j += 1;
        }

        let mut value = None;
        if j < bytes.len() && bytes[j] == b'=' {
            j += 1;
            while j < bytes.len() && bytes[j].is_ascii_whitespace() {
                j += 1;
            }
            if j >= bytes.len() {
                return None;
            }
            match bytes[j] {
                quote @ (b'"' | b'\'') => {
                    let close = input[j + 1..].find(quote as char)? + j + 1;
                    value = Some(input[j + 1..close].to_string());
                    i = close + 1;
                }
                _ => {
                    let value_start = j;
                    while j < bytes.len() && !bytes[j].is_ascii_whitespace() && bytes[j] != b'>' {
                        j += 1;
                    }
                    value = Some(input[value_start..j].to_string());
                    i = j;
                }
            }
        }

        // Duplicate attributes keep the first occurrence.
        if !attributes.iter().any(|a| a.name == attr_name) {
            attributes.push(Attribute {
                name: attr_name,
                value,
            });
        }
    }

    Some((
        StartTag {
            name,
            attributes,
            self_closing,
            span: 0..0,
        },
        i,
    ))
}

fn is_tag_delimiter(b: u8) -> bool {
    b.is_ascii_whitespace() || b == b'/' || b == b'>'
}

/// ASCII case-insensitive substring search.
fn find_ci(haystack: &str, needle: &str) -> Option<usize> {
    let h = haystack.as_bytes();
    let n = needle.as_bytes();
    if n.is_empty() || h.len() < n.len() {
        return None;
    }
    (0..=h.len() - n.len()).find(|&i| h[i..i + n.len()].eq_ignore_ascii_case(n))
}
