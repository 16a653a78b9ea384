use std::ops::Range;

use ruff_python_ast::{DictItem, Expr, ExprDict, ModModule, Stmt};
use ruff_text_size::Ranged;

use crate::{ManifestError, ManifestValue, Result};

/// Parse manifest source into a Python syntax tree whose nodes carry byte
/// ranges.
pub(crate) fn parse_module(source: &str) -> Result<ModModule> {
    ruff_python_parser::parse_module(source)
        .map(|parsed| parsed.into_syntax())
        .map_err(|e| ManifestError::Syntax(e.to_string()))
}

/// The one top-level expression of a manifest, which must be a dict literal.
pub(crate) fn top_level_mapping(module: &ModModule) -> Result<&ExprDict> {
    let [Stmt::Expr(stmt)] = module.body.as_slice() else {
        return Err(ManifestError::NotALiteralMapping);
    };
    let Expr::Dict(dict) = stmt.value.as_ref() else {
        return Err(ManifestError::NotALiteralMapping);
    };
    Ok(dict)
}

/// Key of a mapping item; `**spread` and non-string keys are rejected.
pub(crate) fn string_key(item: &DictItem) -> Result<String> {
    match &item.key {
        Some(Expr::StringLiteral(literal)) => Ok(literal.value.to_str().to_owned()),
        _ => Err(ManifestError::NonStringKey),
    }
}

pub(crate) fn span_range(node: &impl Ranged) -> Range<usize> {
    let range = node.range();
    range.start().to_usize()..range.end().to_usize()
}

/// A declared `key: value` pair, located by byte offsets.
#[derive(Debug, Clone)]
pub(crate) struct Entry {
    pub key: String,
    pub key_span: Range<usize>,
    pub value_span: Range<usize>,
}

/// Byte layout of a mapping literal.
#[derive(Debug, Clone)]
pub(crate) struct MappingLayout {
    /// Offset just past the opening `{`.
    pub open_end: usize,
    /// Offset of the closing `}`.
    pub close: usize,
    pub entries: Vec<Entry>,
}

impl MappingLayout {
    /// Layout of the manifest's top-level mapping.
    pub fn parse(source: &str) -> Result<Self> {
        let module = parse_module(source)?;
        Self::of(top_level_mapping(&module)?)
    }

    pub fn of(dict: &ExprDict) -> Result<Self> {
        let entries = dict
            .items
            .iter()
            .map(|item| {
                let key_span = item.key.as_ref().map(span_range).unwrap_or_default();
                Ok(Entry {
                    key: string_key(item)?,
                    key_span,
                    value_span: span_range(&item.value),
                })
            })
            .collect::<Result<_>>()?;

        let span = span_range(dict);
        Ok(Self {
            open_end: span.start + 1,
            close: span.end - 1,
            entries,
        })
    }

    pub fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.key == key)
    }

    /// Range covering the entry at `index`: from just after the separator that
    /// precedes it (or the opening brace) up to the end of its value.
    pub fn entry_range(&self, source: &str, index: usize) -> Range<usize> {
        let start = match index.checked_sub(1) {
            Some(prev) => after_separator(source, self.entries[prev].value_span.end),
            None => self.open_end,
        };
        start..self.entries[index].value_span.end
    }

    /// Offset where a new final entry goes.
    pub fn append_point(&self, source: &str) -> usize {
        match self.entries.last() {
            Some(last) => after_separator(source, last.value_span.end),
            None => self.open_end,
        }
    }
}

/// Byte layout of a list literal, with the value of each item.
#[derive(Debug, Clone)]
pub(crate) struct SequenceLayout {
    pub open_end: usize,
    pub close: usize,
    pub items: Vec<(Range<usize>, ManifestValue)>,
}

impl SequenceLayout {
    /// `None` unless `expr` is a list literal.
    pub fn of(expr: &Expr, source: &str) -> Option<Self> {
        let Expr::List(list) = expr else {
            return None;
        };
        let span = span_range(list);
        Some(Self {
            open_end: span.start + 1,
            close: span.end - 1,
            items: list
                .elts
                .iter()
                .map(|item| (span_range(item), ManifestValue::from_expr(item, source)))
                .collect(),
        })
    }

    pub fn contains(&self, value: &ManifestValue) -> bool {
        self.items.iter().any(|(_, item)| item == value)
    }
}

/// The `assets` mapping of a manifest and, per bundle, the layout of its
/// value when that value is a list literal.
#[derive(Debug, Clone)]
pub(crate) struct AssetsLayout {
    pub mapping: MappingLayout,
    pub bundles: Vec<Option<SequenceLayout>>,
}

impl AssetsLayout {
    /// `Ok(None)` when the manifest declares no `assets`.
    pub fn parse(source: &str) -> Result<Option<Self>> {
        let module = parse_module(source)?;
        let dict = top_level_mapping(&module)?;

        let mut declared = None;
        for item in &dict.items {
            if string_key(item)? == "assets" {
                declared = Some(&item.value);
            }
        }
        let Some(value) = declared else {
            return Ok(None);
        };
        let Expr::Dict(assets) = value else {
            return Err(ManifestError::UnsupportedValue("assets".to_owned()));
        };

        Ok(Some(Self {
            mapping: MappingLayout::of(assets)?,
            bundles: assets
                .items
                .iter()
                .map(|item| SequenceLayout::of(&item.value, source))
                .collect(),
        }))
    }
}

/// Index of the next byte that is neither whitespace nor part of a comment.
fn skip_trivia(source: &str, mut offset: usize) -> usize {
    let bytes = source.as_bytes();
    while offset < bytes.len() {
        match bytes[offset] {
            b' ' | b'\t' | b'\r' | b'\n' => offset += 1,
            b'#' => {
                offset = source[offset..]
                    .find('\n')
                    .map_or(bytes.len(), |nl| offset + nl);
            }
            _ => break,
        }
    }
    offset
}

/// Position of the comma following the token that ends at `offset`, if any.
pub(crate) fn comma_after(source: &str, offset: usize) -> Option<usize> {
    let next = skip_trivia(source, offset);
    (source.as_bytes().get(next) == Some(&b',')).then_some(next)
}

/// Offset just past the comma following `offset`, moved to the end of that
/// line when only a comment trails the comma, so the comment stays with the
/// entry it annotates. Returns `offset` itself when no comma follows.
pub(crate) fn after_separator(source: &str, offset: usize) -> usize {
    let Some(comma) = comma_after(source, offset) else {
        return offset;
    };
    let rest = &source[comma + 1..];
    let line = &rest[..rest.find('\n').unwrap_or(rest.len())];
    let trimmed = line.trim_start();
    if trimmed.starts_with('#') {
        comma + 1 + line.len()
    } else {
        comma + 1
    }
}

/// End of the entry whose value ends at `offset`: past its comma, and past
/// a comment sharing the line with it.
pub(crate) fn entry_end(source: &str, offset: usize) -> usize {
    let end = comma_after(source, offset).map_or(offset, |comma| comma + 1);
    let rest = &source[end..];
    let line = &rest[..rest.find('\n').unwrap_or(rest.len())];
    if line.trim_start().starts_with('#') {
        end + line.len()
    } else {
        end
    }
}

/// Leading whitespace of the line holding `offset`.
pub(crate) fn line_indent(source: &str, offset: usize) -> &str {
    let start = source[..offset].rfind('\n').map_or(0, |nl| nl + 1);
    let line = &source[start..];
    &line[..line.len() - line.trim_start_matches([' ', '\t']).len()]
}

/// Locate the span of `key` within the manifest mapping.
///
/// The span starts right after the separator that precedes the key (or after
/// the opening brace for the first key) and ends at the last byte of the
/// value. Returns `Ok(None)` when the key is not declared.
pub fn locate_key_range(source: &str, key: &str) -> Result<Option<Range<usize>>> {
    let layout = MappingLayout::parse(source)?;
    Ok(layout
        .position(key)
        .map(|index| layout.entry_range(source, index)))
}

/// Offset at which an `assets` entry is appended: after the last declared
/// value, past its trailing comma when there is one.
pub fn locate_assets_insertion_point(source: &str) -> Result<usize> {
    let layout = MappingLayout::parse(source)?;
    Ok(layout.append_point(source))
}
