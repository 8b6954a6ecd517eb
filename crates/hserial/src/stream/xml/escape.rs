// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! XML text escaping and name checks.

use std::borrow::Cow;

/// Whether XML 1.0 can carry this character at all.
pub fn is_xml_char(c: char) -> bool {
    matches!(c,
        '\t' | '\n' | '\r'
        | '\u{20}'..='\u{D7FF}'
        | '\u{E000}'..='\u{FFFD}'
        | '\u{10000}'..='\u{10FFFF}')
}

/// Whether every character of `text` can be written as XML text.
pub fn is_xml_text(text: &str) -> bool {
    text.chars().all(is_xml_char)
}

/// Escape reserved characters for element text.
///
/// `\r` is written as a character reference because parsers normalize a
/// literal one away.
pub fn escape(text: &str) -> Cow<'_, str> {
    escape_with(text, false)
}

/// Escape an attribute value.
///
/// Same as [`escape`], plus `\t` and `\n`: attribute value normalization
/// turns literal ones into spaces.
pub fn escape_attribute(value: &str) -> Cow<'_, str> {
    escape_with(value, true)
}

fn escape_with(text: &str, attribute: bool) -> Cow<'_, str> {
    let reserved = |c: char| {
        matches!(c, '&' | '<' | '>' | '"' | '\'' | '\r')
            || (attribute && matches!(c, '\t' | '\n'))
    };
    if !text.chars().any(reserved) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\r' => out.push_str("&#13;"),
            '\t' if attribute => out.push_str("&#9;"),
            '\n' if attribute => out.push_str("&#10;"),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Whether `name` can be used as an element name as-is.
///
/// Conservative: ASCII letters, digits, `_`, `-` and `.`, not starting with
/// a digit, `-` or `.`, and not starting with `xml`.
pub fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        && !name.to_ascii_lowercase().starts_with("xml")
}
