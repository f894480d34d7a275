//! Markup stripping for extracted titles and snippets

/// Entities decoded by [`sanitize`]. Anything else is left as written.
const ENTITIES: &[(&str, char)] = &[
    ("&amp;", '&'),
    ("&lt;", '<'),
    ("&gt;", '>'),
    ("&quot;", '"'),
    ("&#39;", '\''),
    ("&nbsp;", ' '),
    ("&#x27;", '\''),
];

/// Longest prefix of `s` that is at most `max` bytes and ends on a char boundary.
pub fn truncate_at_boundary(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Strip tags, decode the common entities and collapse whitespace runs.
///
/// Everything between `<` and `>` is dropped with no notion of nesting or
/// quoting. Output stops growing once it reaches `max` bytes; the excess is
/// discarded before whitespace is collapsed.
pub fn sanitize(raw: &str, max: usize) -> String {
    let mut stripped = String::with_capacity(raw.len().min(max));
    let mut in_tag = false;
    let mut rest = raw;

    while let Some(ch) = rest.chars().next() {
        let mut consumed = ch.len_utf8();
        let mut emit = None;

        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if in_tag => {}
            '&' => match ENTITIES.iter().find(|(name, _)| rest.starts_with(name)) {
                Some((name, decoded)) => {
                    consumed = name.len();
                    emit = Some(*decoded);
                }
                None => emit = Some('&'),
            },
            other => emit = Some(other),
        }

        if let Some(c) = emit {
            if stripped.len() + c.len_utf8() > max {
                break;
            }
            stripped.push(c);
        }
        rest = &rest[consumed..];
    }

    collapse_whitespace(&stripped)
}

fn collapse_whitespace(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if matches!(ch, ' ' | '\t' | '\n' | '\r') {
            if !prev_space {
                out.push(' ');
                prev_space = true;
            }
        } else {
            out.push(ch);
            prev_space = false;
        }
    }
    out
}
