//! Tolerant JSON extraction
//!
//! The inference service is asked to reply with a bare JSON object but
//! may wrap it in prose or code fences. This module locates the first
//! balanced top-level object substring — string- and escape-aware — and
//! leaves parsing of its contents to serde.

/// Locate the first balanced top-level JSON object in `text`.
///
/// Returns the exact `{...}` substring, or None when there is no opening
/// brace or the first object never closes.
pub fn first_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    // All structurally significant bytes are ASCII, so byte offsets are
    // valid slice boundaries.
    for (offset, byte) in text.as_bytes()[start..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if *byte == b'\\' {
                escaped = true;
            } else if *byte == b'"' {
                in_string = false;
            }
            continue;
        }

        match byte {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }

    None
}
