use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};

use crate::{ManifestStyle, ManifestValue, Result};

/// A single `key: value` mapping, encoded as `{key: value}`.
struct SingleEntry<'a>(&'a str, &'a ManifestValue);

impl Serialize for SingleEntry<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.0, self.1)?;
        map.end()
    }
}

fn to_pretty_json<T: Serialize>(value: &T, indent: usize) -> Result<String> {
    let indent = " ".repeat(indent);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
    let mut buf = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Spell JSON literals the way Python does.
fn pythonize_literals(text: &str) -> String {
    text.replace(": true", ": True")
        .replace(": false", ": False")
        .replace(": null", ": None")
}

/// Swap the `"` string delimiters of JSON text for `quote`, adjusting escapes.
fn requote(text: &str, quote: char) -> String {
    if quote == '"' {
        return text.to_owned();
    }

    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        match c {
            '"' => {
                in_string = !in_string;
                out.push(quote);
            }
            '\\' if in_string => match chars.next() {
                Some('"') => out.push('"'),
                Some(escaped) => {
                    out.push('\\');
                    out.push(escaped);
                }
                None => out.push('\\'),
            },
            c if in_string && c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out
}

/// Render `value` as Python literal source in the given style.
///
/// Nested lines are indented relative to column zero, as for a value that
/// starts at the top level of a file.
pub fn serialize_value(value: &ManifestValue, style: ManifestStyle) -> Result<String> {
    let json = to_pretty_json(value, style.indent)?;
    Ok(requote(&pythonize_literals(&json), style.quote))
}

/// Render `key: value` as it would appear declared inside the manifest's
/// top-level mapping: nested lines carry one extra level of indentation and
/// the text itself starts at the key.
pub fn serialize_entry(key: &str, value: &ManifestValue, style: ManifestStyle) -> Result<String> {
    let json = to_pretty_json(&SingleEntry(key, value), style.indent)?;
    let text = requote(&pythonize_literals(&json), style.quote);
    let inner = text
        .trim()
        .strip_prefix('{')
        .and_then(|t| t.strip_suffix('}'))
        .unwrap_or(text.as_str());
    Ok(inner.trim().to_owned())
}
