//! Span-based edits of manifest source.
//!
//! Each edit reparses the text it is given, so offsets are always computed
//! against the manifest as it stands after the previous edit.

use log::debug;

use crate::locate::{
    AssetsLayout, MappingLayout, SequenceLayout, comma_after, entry_end, line_indent,
};
use crate::{
    Assets, ManifestDict, ManifestError, ManifestStyle, ManifestValue, Result, serialize_entry,
    serialize_value,
};

fn splice(source: &str, range: std::ops::Range<usize>, replacement: &str) -> String {
    let mut out = String::with_capacity(source.len() + replacement.len());
    out.push_str(&source[..range.start]);
    out.push_str(replacement);
    out.push_str(&source[range.end..]);
    out
}

/// Whether only whitespace precedes `offset` on its line.
fn starts_line(source: &str, offset: usize) -> bool {
    source[..offset]
        .rsplit('\n')
        .next()
        .is_some_and(|before| before.trim().is_empty())
}

/// Indentation for a new entry of `layout`: that of the last entry when it
/// sits on its own line, `fallback` otherwise.
fn entry_indent(source: &str, layout: &MappingLayout, fallback: String) -> String {
    match layout.entries.last() {
        Some(last) if starts_line(source, last.key_span.start) => {
            line_indent(source, last.key_span.start).to_owned()
        }
        _ => fallback,
    }
}

/// Indent the continuation lines of a serialized top-level entry for an
/// entry starting at `indent`.
fn shift_lines(rendered: &str, indent: &str, style: ManifestStyle) -> String {
    let shift = " ".repeat(indent.len().saturating_sub(style.indent));
    rendered.replace('\n', &format!("\n{shift}"))
}

/// Insert `items` after the element whose value ends at `value_end`, one per
/// line. A comment sharing the line with that element stays with it.
fn insert_after(source: &str, value_end: usize, indent: &str, items: &[String]) -> String {
    let end = entry_end(source, value_end);
    if comma_after(source, value_end).is_some() {
        let text: String = items.iter().map(|item| format!("\n{indent}{item},")).collect();
        return splice(source, end..end, &text);
    }
    let text = items
        .iter()
        .map(|item| format!("\n{indent}{item}"))
        .collect::<Vec<_>>()
        .join(",");
    let with_items = splice(source, end..end, &text);
    splice(&with_items, value_end..value_end, ",")
}

/// Add `rendered` as the final entry of the mapping laid out by `layout`.
fn append_entry(source: &str, layout: &MappingLayout, rendered: &str, indent: &str) -> String {
    match layout.entries.last() {
        Some(last) => insert_after(source, last.value_span.end, indent, &[rendered.to_owned()]),
        None if source[layout.open_end..layout.close].contains('\n') => {
            let offset = layout.open_end;
            splice(source, offset..offset, &format!("\n{indent}{rendered},"))
        }
        None => {
            let closing = line_indent(source, layout.open_end - 1);
            let offset = layout.open_end;
            splice(source, offset..offset, &format!("\n{indent}{rendered},\n{closing}"))
        }
    }
}

/// Add rendered items at the end of a list literal, inline when the list is
/// written on one line.
fn append_items(source: &str, list: &SequenceLayout, rendered: &[String]) -> String {
    let Some((last, _)) = list.items.last() else {
        let inner = list.open_end..list.close;
        let range = if source[inner.clone()].trim().is_empty() {
            inner
        } else {
            list.open_end..list.open_end
        };
        return splice(source, range, &rendered.join(", "));
    };

    if !source[list.open_end..list.close].contains('\n') {
        let text: String = rendered.iter().map(|item| format!(", {item}")).collect();
        return splice(source, last.end..last.end, &text);
    }
    let indent = line_indent(source, last.start).to_owned();
    insert_after(source, last.end, &indent, rendered)
}

/// Replace the declaration of `key` with `key: value`. Everything before the
/// key token (indentation, comments) and after the value is kept.
pub fn replace_key(
    source: &str,
    key: &str,
    value: &ManifestValue,
    style: ManifestStyle,
) -> Result<String> {
    let layout = MappingLayout::parse(source)?;
    let entry = layout
        .position(key)
        .map(|index| &layout.entries[index])
        .ok_or_else(|| ManifestError::KeyNotFound(key.to_owned()))?;

    let quoted_key = &source[entry.key_span.clone()];
    let rendered = serialize_entry(key, value, style)?;
    // Keep the key token exactly as written.
    let rendered = match rendered.find(':') {
        Some(colon) => format!("{quoted_key}{}", &rendered[colon..]),
        None => rendered,
    };
    Ok(splice(
        source,
        entry.key_span.start..entry.value_span.end,
        &rendered,
    ))
}

/// Remove the declaration of `key` together with its comma and a comment
/// on the same line. Returns `Ok(None)` when the key is not declared.
pub fn remove_key(source: &str, key: &str) -> Result<Option<String>> {
    let layout = MappingLayout::parse(source)?;
    let Some(index) = layout.position(key) else {
        return Ok(None);
    };
    let range = layout.entry_range(source, index);
    let end = entry_end(source, range.end);
    Ok(Some(splice(source, range.start..end, "")))
}

/// Append `key: value` as the final entry of the mapping, following the
/// file's trailing-comma convention.
pub fn append_key(
    source: &str,
    key: &str,
    value: &ManifestValue,
    style: ManifestStyle,
) -> Result<String> {
    let layout = MappingLayout::parse(source)?;
    let indent = entry_indent(source, &layout, " ".repeat(style.indent));
    let rendered = shift_lines(&serialize_entry(key, value, style)?, &indent, style);
    Ok(append_entry(source, &layout, &rendered, &indent))
}

/// Add `assets` to the `assets` mapping the manifest already declares,
/// without rewriting what it declares: entries go after the last item of
/// their bundle's list, new bundles after the last bundle. Entries a bundle
/// already lists are skipped.
///
/// Adding to a bundle whose value is not a list literal is an
/// [`ManifestError::UnsupportedValue`] error.
pub fn merge_assets(source: &str, assets: &Assets, style: ManifestStyle) -> Result<String> {
    let mut text = source.to_owned();
    for (bundle, entries) in assets.bundles() {
        text = merge_bundle(&text, bundle, entries, style)?;
    }
    Ok(text)
}

fn merge_bundle(
    source: &str,
    bundle: &str,
    entries: &[ManifestValue],
    style: ManifestStyle,
) -> Result<String> {
    let layout = AssetsLayout::parse(source)?
        .ok_or_else(|| ManifestError::KeyNotFound("assets".to_owned()))?;
    let mapping = &layout.mapping;

    let Some(index) = mapping.position(bundle) else {
        let fallback = format!(
            "{}{}",
            line_indent(source, mapping.open_end - 1),
            " ".repeat(style.indent)
        );
        let indent = entry_indent(source, mapping, fallback);
        let rendered = serialize_entry(bundle, &ManifestValue::List(entries.to_vec()), style)?;
        let rendered = shift_lines(&rendered, &indent, style);
        return Ok(append_entry(source, mapping, &rendered, &indent));
    };

    let Some(list) = &layout.bundles[index] else {
        return Err(ManifestError::UnsupportedValue(format!("assets/{bundle}")));
    };
    let rendered = entries
        .iter()
        .filter(|entry| !list.contains(entry))
        .map(|entry| serialize_value(entry, style))
        .collect::<Result<Vec<_>>>()?;
    if rendered.is_empty() {
        return Ok(source.to_owned());
    }
    Ok(append_items(source, list, &rendered))
}

/// Commit the results of a migration step to manifest source.
///
/// Edits are applied in a fixed order and each one is located against the
/// text produced by the previous one:
/// 1. `data` is replaced in place, only when `data` differs from what is
///    declared;
/// 2. `qweb` is removed, only when `drop_qweb` is set and the key exists;
/// 3. `assets` is written last. New entries are merged into an existing
///    `assets` mapping, otherwise the key is appended after the final entry,
///    so its location never depends on the earlier edits having been made.
///
/// Returns the source unchanged when there is nothing to do.
pub fn patch_manifest(
    source: &str,
    assets: &Assets,
    data: Option<&[String]>,
    drop_qweb: bool,
) -> Result<String> {
    let manifest = ManifestDict::parse(source)?;
    let data = data.filter(|data| manifest.data_files() != *data);
    let drop_qweb = drop_qweb && manifest.contains_key("qweb");
    if data.is_none() && !drop_qweb && assets.is_empty() {
        return Ok(source.to_owned());
    }

    let style = ManifestStyle::sniff(source)?;
    debug!(
        "Patching manifest with quote {:?} and indent {}",
        style.quote, style.indent
    );
    let mut text = source.to_owned();

    if let Some(data) = data {
        text = replace_key(&text, "data", &ManifestValue::string_list(data), style)?;
    }

    if drop_qweb && let Some(updated) = remove_key(&text, "qweb")? {
        text = updated;
    }

    if !assets.is_empty() {
        text = if manifest.contains_key("assets") {
            merge_assets(&text, assets, style)?
        } else {
            append_key(&text, "assets", &assets.to_value(), style)?
        };
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"# Copyright 2021 Someone
# License AGPL-3.0 or later (https://www.gnu.org/licenses/agpl).

{
    'name': 'My Module',
    'version': '14.0.1.0.0',
    'depends': ['web'],
    'data': [
        'views/assets.xml',
        'views/views.xml',
    ],
    'qweb': ['static/src/xml/widget.xml'],
    'installable': True,
}
"#;

    fn single_quoted_assets() -> Assets {
        let mut assets = Assets::default();
        assets.push("web.assets_backend", "/my_module/static/src/js/widget.js");
        assets
    }

    #[test]
    fn test_patch_full_step() -> Result<()> {
        let data = vec!["views/views.xml".to_owned()];
        let patched =
            patch_manifest(MANIFEST, &single_quoted_assets(), Some(data.as_slice()), true)?;

        insta::assert_snapshot!(patched, @r"
        # Copyright 2021 Someone
        # License AGPL-3.0 or later (https://www.gnu.org/licenses/agpl).

        {
            'name': 'My Module',
            'version': '14.0.1.0.0',
            'depends': ['web'],
            'data': [
                'views/views.xml'
            ],
            'installable': True,
            'assets': {
                'web.assets_backend': [
                    '/my_module/static/src/js/widget.js'
                ]
            },
        }
        ");
        Ok(())
    }

    #[test]
    fn test_patch_preserves_untouched_bytes() -> Result<()> {
        let patched = patch_manifest(MANIFEST, &single_quoted_assets(), None, false)?;
        let offset = locate_insert_offset(MANIFEST);
        assert_eq!(&patched[..offset], &MANIFEST[..offset]);
        assert!(patched.ends_with(&MANIFEST[offset..]));
        Ok(())
    }

    fn locate_insert_offset(source: &str) -> usize {
        crate::locate_assets_insertion_point(source).unwrap()
    }

    #[test]
    fn test_patch_noop() -> Result<()> {
        let data = vec![
            "views/assets.xml".to_owned(),
            "views/views.xml".to_owned(),
        ];
        let patched = patch_manifest(MANIFEST, &Assets::default(), Some(data.as_slice()), false)?;
        assert_eq!(patched, MANIFEST);

        // qweb absent: nothing to drop
        let without_qweb = remove_key(MANIFEST, "qweb")?.unwrap();
        assert_eq!(patch_manifest(&without_qweb, &Assets::default(), None, true)?, without_qweb);
        Ok(())
    }

    #[test]
    fn test_remove_key_keeps_valid_commas() -> Result<()> {
        let no_trailing = "{\n    'name': 'X',\n    'qweb': ['a.xml']\n}\n";
        assert_eq!(
            remove_key(no_trailing, "qweb")?.unwrap(),
            "{\n    'name': 'X',\n}\n"
        );

        let first = "{\n    'qweb': ['a.xml'],\n    'name': 'X',\n}\n";
        assert_eq!(remove_key(first, "qweb")?.unwrap(), "{\n    'name': 'X',\n}\n");

        assert_eq!(remove_key(first, "assets")?, None);
        Ok(())
    }

    #[test]
    fn test_remove_key_takes_its_line_comment() -> Result<()> {
        let first = "{\n    'qweb': ['a.xml'],  # legacy\n    'name': 'X',\n}\n";
        assert_eq!(remove_key(first, "qweb")?.unwrap(), "{\n    'name': 'X',\n}\n");

        let middle =
            "{\n    'name': 'X',  # shown\n    'qweb': ['a.xml'],  # legacy\n    'data': [],\n}\n";
        assert_eq!(
            remove_key(middle, "qweb")?.unwrap(),
            "{\n    'name': 'X',  # shown\n    'data': [],\n}\n"
        );

        let last = "{\n    'name': 'X',\n    'qweb': ['a.xml']  # legacy\n}\n";
        assert_eq!(remove_key(last, "qweb")?.unwrap(), "{\n    'name': 'X',\n}\n");
        Ok(())
    }

    #[test]
    fn test_append_without_trailing_comma() -> Result<()> {
        let source = "{\n  \"name\": \"X\",\n  \"data\": []\n}\n";
        let style = ManifestStyle::sniff(source)?;
        let patched = append_key(source, "assets", &single_quoted_assets().to_value(), style)?;
        insta::assert_snapshot!(patched, @r#"
        {
          "name": "X",
          "data": [],
          "assets": {
            "web.assets_backend": [
              "/my_module/static/src/js/widget.js"
            ]
          }
        }
        "#);
        Ok(())
    }

    #[test]
    fn test_patch_python_string_forms() -> Result<()> {
        let source = r#"{
    'name': u'Sale Extension',
    'author': 'ACSONE SA/NV,'
        'Odoo Community Association (OCA)',
    'data': [u'views/assets.xml', u'views/views.xml'],
    'qweb': [u'static/src/xml/*.xml'],
}
"#;
        let data = vec!["views/views.xml".to_owned()];
        let patched = patch_manifest(source, &single_quoted_assets(), Some(data.as_slice()), true)?;
        insta::assert_snapshot!(patched, @r"
        {
            'name': u'Sale Extension',
            'author': 'ACSONE SA/NV,'
                'Odoo Community Association (OCA)',
            'data': [
                'views/views.xml'
            ],
            'assets': {
                'web.assets_backend': [
                    '/my_module/static/src/js/widget.js'
                ]
            },
        }
        ");
        Ok(())
    }

    #[test]
    fn test_merge_into_existing_assets() -> Result<()> {
        let source = r#"{
    'name': 'X',
    'assets': {
        'web.assets_backend': ['/my_module/a.js'],
    },
    'installable': True,
}
"#;
        let mut assets = Assets::default();
        assets.push("web.assets_backend", "/my_module/b.js");
        let patched = patch_manifest(source, &assets, None, false)?;
        insta::assert_snapshot!(patched, @r"
        {
            'name': 'X',
            'assets': {
                'web.assets_backend': ['/my_module/a.js', '/my_module/b.js'],
            },
            'installable': True,
        }
        ");

        // Already listed: nothing to add.
        assert_eq!(patch_manifest(&patched, &assets, None, false)?, patched);
        Ok(())
    }

    #[test]
    fn test_merge_keeps_comments_and_layout() -> Result<()> {
        let source = r#"{
    'name': 'X',
    'assets': {
        # backend first
        'web.assets_backend': [
            '/my_module/static/src/js/a.js',  # legacy widget

            '/my_module/static/src/js/b.js',
        ],
        'web.assets_frontend': [
            '/my_module/static/src/js/portal.js'
        ]  # portal
    },
}
"#;
        let mut assets = Assets::default();
        assets.push("web.assets_backend", "/my_module/static/src/js/widget.js");
        assets.push("web.assets_backend", "/my_module/static/src/js/a.js");
        assets.push("web.assets_frontend", "/my_module/static/src/js/p2.js");
        assets.push("web.assets_qweb", "/my_module/static/src/xml/t.xml");

        let patched = patch_manifest(source, &assets, None, false)?;
        insta::assert_snapshot!(patched, @r"
        {
            'name': 'X',
            'assets': {
                # backend first
                'web.assets_backend': [
                    '/my_module/static/src/js/a.js',  # legacy widget

                    '/my_module/static/src/js/b.js',
                    '/my_module/static/src/js/widget.js',
                ],
                'web.assets_frontend': [
                    '/my_module/static/src/js/portal.js',
                    '/my_module/static/src/js/p2.js'
                ],  # portal
                'web.assets_qweb': [
                    '/my_module/static/src/xml/t.xml'
                ]
            },
        }
        ");
        Ok(())
    }

    #[test]
    fn test_merge_into_empty_assets() -> Result<()> {
        let source = "{\n    'name': 'X',\n    'assets': {},\n}\n";
        let patched = patch_manifest(source, &single_quoted_assets(), None, false)?;
        insta::assert_snapshot!(patched, @r"
        {
            'name': 'X',
            'assets': {
                'web.assets_backend': [
                    '/my_module/static/src/js/widget.js'
                ],
            },
        }
        ");
        Ok(())
    }

    #[test]
    fn test_merge_keeps_expression_values() -> Result<()> {
        let source = r#"{
    'name': 'X',
    'assets': {
        'web.assets_frontend': ['a.js'] + ['b.js'],
        'web.assets_backend': ['/m/x.js', 1.5],
    },
}
"#;
        let mut backend = Assets::default();
        backend.push("web.assets_backend", "/m/new.js");
        let patched = patch_manifest(source, &backend, None, false)?;
        insta::assert_snapshot!(patched, @r"
        {
            'name': 'X',
            'assets': {
                'web.assets_frontend': ['a.js'] + ['b.js'],
                'web.assets_backend': ['/m/x.js', 1.5, '/m/new.js'],
            },
        }
        ");

        // A bundle built by an expression cannot be extended in place.
        let mut frontend = Assets::default();
        frontend.push("web.assets_frontend", "/m/c.js");
        assert!(matches!(
            patch_manifest(source, &frontend, None, false),
            Err(ManifestError::UnsupportedValue(bundle)) if bundle == "assets/web.assets_frontend"
        ));

        let computed = "{\n    'name': 'X',\n    'assets': dict(COMMON),\n}\n";
        assert!(matches!(
            patch_manifest(computed, &frontend, None, false),
            Err(ManifestError::UnsupportedValue(key)) if key == "assets"
        ));
        Ok(())
    }

    #[test]
    fn test_replace_missing_key() {
        let style = ManifestStyle {
            quote: '\'',
            indent: 4,
        };
        assert!(matches!(
            replace_key(MANIFEST, "assets", &ManifestValue::None, style),
            Err(ManifestError::KeyNotFound(_))
        ));
    }
}
