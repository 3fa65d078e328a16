//! Ruby literal rendering
//!
//! Composed gemfiles are evaluated by Bundler, so every user-supplied string
//! goes through `dump`, which matches Ruby's `String#dump` output and is
//! always a valid double-quoted literal.

use std::collections::BTreeMap;
use std::fmt::Write;

/// Render `s` the way Ruby's `String#dump` does
pub fn dump(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');

    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{0c}' => out.push_str("\\f"),
            '\u{0b}' => out.push_str("\\v"),
            '\u{08}' => out.push_str("\\b"),
            '\u{07}' => out.push_str("\\a"),
            '\u{1b}' => out.push_str("\\e"),
            '#' => {
                if matches!(chars.peek(), Some('{' | '$' | '@')) {
                    out.push('\\');
                }
                out.push('#');
            }
            c if c.is_ascii_graphic() || c == ' ' => out.push(c),
            c if c.is_ascii() => {
                let _ = write!(out, "\\x{:02X}", c as u32);
            }
            c if (c as u32) > 0xFFFF => {
                let _ = write!(out, "\\u{{{:X}}}", c as u32);
            }
            c => {
                let _ = write!(out, "\\u{:04X}", c as u32);
            }
        }
    }

    out.push('"');
    out
}

/// Render a symbol literal (`:development`, or `:"foo-bar"` when needed)
pub fn symbol(name: &str) -> String {
    if is_plain_symbol(name) {
        format!(":{}", name)
    } else {
        format!(":{}", dump(name))
    }
}

/// Render an array of strings (`["a", "b"]`)
pub fn string_array<S: AsRef<str>>(items: &[S]) -> String {
    let inner: Vec<String> = items.iter().map(|s| dump(s.as_ref())).collect();
    format!("[{}]", inner.join(", "))
}

/// Render an array of symbols (`[:mri, :jruby]`)
pub fn symbol_array<S: AsRef<str>>(items: &[S]) -> String {
    let inner: Vec<String> = items.iter().map(|s| symbol(s.as_ref())).collect();
    format!("[{}]", inner.join(", "))
}

/// Render a string-to-string hash (`{"KEY" => "value"}`)
pub fn string_hash(map: &BTreeMap<String, String>) -> String {
    let inner: Vec<String> = map
        .iter()
        .map(|(k, v)| format!("{} => {}", dump(k), dump(v)))
        .collect();
    format!("{{{}}}", inner.join(", "))
}

fn is_plain_symbol(name: &str) -> bool {
    let body = name
        .strip_suffix(['?', '!', '='])
        .unwrap_or(name);

    let mut chars = body.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
