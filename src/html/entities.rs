// Character reference decoding for text content.
// Named references are only recognized with their terminating ';'.

/// Longest reference body looked at before the '&' is taken literally.
const MAX_REFERENCE_LEN: usize = 32;

const NAMED: &[(&str, char)] = &[
    ("amp", '&'),
    ("lt", '<'),
    ("gt", '>'),
    ("quot", '"'),
    ("apos", '\''),
    ("nbsp", '\u{a0}'),
    ("ensp", '\u{2002}'),
    ("emsp", '\u{2003}'),
    ("thinsp", '\u{2009}'),
    ("ndash", '\u{2013}'),
    ("mdash", '\u{2014}'),
    ("minus", '\u{2212}'),
    ("hellip", '\u{2026}'),
    ("middot", '\u{b7}'),
    ("star", '\u{2606}'),
    ("starf", '\u{2605}'),
    ("frac12", '\u{bd}'),
    ("frac14", '\u{bc}'),
    ("frac34", '\u{be}'),
    ("copy", '\u{a9}'),
    ("reg", '\u{ae}'),
    ("trade", '\u{2122}'),
];

pub fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        match decode_one(rest) {
            Some((ch, len)) => {
                out.push(ch);
                rest = &rest[len..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Decodes a reference at the start of `s` (which begins with '&').
/// Returns the character and the number of bytes consumed.
fn decode_one(s: &str) -> Option<(char, usize)> {
    let window = &s.as_bytes()[..s.len().min(MAX_REFERENCE_LEN + 2)];
    let semi = window.iter().position(|&b| b == b';')?;
    let body = &s[1..semi];

    if let Some(num) = body.strip_prefix('#') {
        let code = match num.strip_prefix(['x', 'X']) {
            Some(hex) if !hex.is_empty() => u32::from_str_radix(hex, 16).ok()?,
            Some(_) => return None,
            None if !num.is_empty() => num.parse::<u32>().ok()?,
            None => return None,
        };
        let ch = match code {
            0 => '\u{fffd}',
            _ => char::from_u32(code).unwrap_or('\u{fffd}'),
        };
        return Some((ch, semi + 1));
    }

    NAMED
        .iter()
        .find(|(name, _)| *name == body)
        .map(|(_, ch)| (*ch, semi + 1))
}
