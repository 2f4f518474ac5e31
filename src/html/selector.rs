use crate::utils::error::{RenderError, Result};

/// A compound selector: optional type (or `*`), classes and an id.
///
/// Only the forms needed to locate rating widgets are supported, e.g.
/// `span`, `.star-rating`, `strong.rating`, `div#main.card`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    tag: Option<String>,
    classes: Vec<String>,
    id: Option<String>,
}

impl Selector {
    pub fn parse(input: &str) -> Result<Self> {
        let source = input.trim();
        let err = |reason: &str| RenderError::SelectorError {
            selector: input.to_string(),
            reason: reason.to_string(),
        };

        if source.is_empty() {
            return Err(err("selector is empty"));
        }

        let mut tag = None;
        let mut classes = Vec::new();
        let mut id = None;

        let mut rest = source;
        if let Some(after) = rest.strip_prefix('*') {
            rest = after;
        } else {
            let len = ident_len(rest);
            if len > 0 {
                tag = Some(rest[..len].to_ascii_lowercase());
                rest = &rest[len..];
            }
        }

        while let Some(marker) = rest.chars().next() {
            let after = &rest[marker.len_utf8()..];
            let len = ident_len(after);
            match marker {
                '.' | '#' if len == 0 => {
                    return Err(err("expected a name after '.' or '#'"));
                }
                '.' => classes.push(after[..len].to_string()),
                '#' if id.is_some() => return Err(err("more than one id")),
                '#' => id = Some(after[..len].to_string()),
                ' ' | '>' | '+' | '~' => {
                    return Err(err("combinators are not supported"));
                }
                ',' => return Err(err("selector lists are not supported")),
                _ => return Err(err("only tag, .class and #id selectors are supported")),
            }
            rest = &after[len..];
        }

        Ok(Self {
            source: source.to_string(),
            tag,
            classes,
            id,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// `class_attr` is the raw class attribute, `id_attr` the raw id.
    pub fn matches(&self, tag_name: &str, class_attr: Option<&str>, id_attr: Option<&str>) -> bool {
        if let Some(tag) = &self.tag {
            if tag != tag_name {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if id_attr != Some(id.as_str()) {
                return false;
            }
        }
        if self.classes.is_empty() {
            return true;
        }
        let Some(class_attr) = class_attr else {
            return false;
        };
        self.classes.iter().all(|wanted| {
            class_attr
                .split(|c: char| c.is_ascii_whitespace())
                .any(|have| have == wanted)
        })
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

fn ident_len(s: &str) -> usize {
    s.char_indices()
        .find(|&(_, c)| !(c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii()))
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}
