//! HTML to plain text conversion
//!
//! Vulnerability prose arrives from the platform as HTML fragments. SARIF
//! message text must be plain, so the converter strips tags, decodes the
//! entities the platform actually emits, turns block-level boundaries into
//! line breaks, and collapses whitespace runs so the text stays readable in
//! annotation UIs.

/// Convert an HTML fragment to compact plain text
pub fn html_to_text(html: &str) -> String {
    let mut raw = String::with_capacity(html.len());
    let mut tag = String::new();
    let mut entity = String::new();
    let mut in_tag = false;
    let mut in_entity = false;

    for ch in html.chars() {
        if in_tag {
            if ch == '>' {
                in_tag = false;
                if is_block_tag(&tag) {
                    raw.push('\n');
                }
            } else {
                tag.push(ch);
            }
            continue;
        }

        if in_entity {
            if ch == ';' {
                raw.push_str(&decode_entity(&entity));
                in_entity = false;
                continue;
            }
            // Entity references are short and alphanumeric (plus the
            // numeric forms). Anything else means the ampersand was
            // literal text, so emit what we swallowed and resume.
            if (ch.is_ascii_alphanumeric() || ch == '#') && entity.len() <= 8 {
                entity.push(ch);
                continue;
            }
            raw.push('&');
            raw.push_str(&entity);
            in_entity = false;
            // fall through so the current character is handled normally
        }

        match ch {
            '<' => {
                in_tag = true;
                tag.clear();
            }
            '&' => {
                in_entity = true;
                entity.clear();
            }
            _ => raw.push(ch),
        }
    }

    if in_entity {
        raw.push('&');
        raw.push_str(&entity);
    }

    collapse_whitespace(&raw)
}

/// Tags whose boundaries become line breaks in the plain text
fn is_block_tag(raw_tag: &str) -> bool {
    let name = raw_tag
        .trim_start_matches('/')
        .split(|c: char| c.is_whitespace() || c == '/')
        .next()
        .unwrap_or("")
        .to_ascii_lowercase();

    matches!(
        name.as_str(),
        "p" | "br"
            | "div"
            | "li"
            | "ul"
            | "ol"
            | "tr"
            | "table"
            | "pre"
            | "blockquote"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
    )
}

/// Decode one entity reference (the text between `&` and `;`)
///
/// Unknown named entities decode to nothing rather than leaking their raw
/// form into finding messages.
fn decode_entity(entity: &str) -> String {
    match entity {
        "amp" => "&".to_string(),
        "lt" => "<".to_string(),
        "gt" => ">".to_string(),
        "quot" => "\"".to_string(),
        "apos" => "'".to_string(),
        "nbsp" => " ".to_string(),
        _ => {
            let code = if let Some(hex) = entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()
            } else if let Some(dec) = entity.strip_prefix('#') {
                dec.parse::<u32>().ok()
            } else {
                None
            };
            code.and_then(char::from_u32)
                .map(|c| c.to_string())
                .unwrap_or_default()
        }
    }
}

/// Collapse whitespace runs: any run containing a line break becomes one
/// newline, any other run becomes one space. Leading and trailing
/// whitespace is dropped.
fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;
    let mut pending_break = false;

    for ch in text.chars() {
        if ch == '\n' {
            pending_break = true;
        } else if ch.is_whitespace() {
            pending_space = true;
        } else {
            if !out.is_empty() {
                if pending_break {
                    out.push('\n');
                } else if pending_space {
                    out.push(' ');
                }
            }
            pending_break = false;
            pending_space = false;
            out.push(ch);
        }
    }

    out
}
