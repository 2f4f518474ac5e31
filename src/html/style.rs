//! Inline `style` attribute editing.

/// Sets `property` in an inline style declaration block, replacing the first
/// existing declaration of the same name and dropping later duplicates.
/// Other declarations keep their order and text.
pub fn set_property(style: &str, property: &str, value: &str) -> String {
    let mut declarations: Vec<String> = Vec::new();
    let mut replaced = false;

    for decl in split_declarations(style) {
        let decl = decl.trim();
        if decl.is_empty() {
            continue;
        }
        let name = decl.split(':').next().unwrap_or("").trim();
        if name.eq_ignore_ascii_case(property) {
            if !replaced {
                declarations.push(format!("{}: {}", property, value));
                replaced = true;
            }
            continue;
        }
        declarations.push(decl.to_string());
    }

    if !replaced {
        declarations.push(format!("{}: {}", property, value));
    }

    let mut out = declarations.join("; ");
    out.push(';');
    out
}

/// Reads the value of `property`, if declared.
pub fn get_property<'a>(style: &'a str, property: &str) -> Option<&'a str> {
    split_declarations(style).into_iter().find_map(|decl| {
        let (name, value) = decl.split_once(':')?;
        name.trim()
            .eq_ignore_ascii_case(property)
            .then(|| value.trim())
    })
}

// Splits on ';' outside quotes and parentheses, e.g. `url("a;b")`.
fn split_declarations(style: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, c) in style.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(') => depth += 1,
            (None, ')') => depth = depth.saturating_sub(1),
            (None, ';') if depth == 0 => {
                parts.push(&style[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&style[start..]);
    parts
}
