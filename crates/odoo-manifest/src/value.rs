use ruff_python_ast::Expr;
use serde::ser::{Error, Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::Result;
use crate::locate::{parse_module, span_range, string_key, top_level_mapping};

/// A literal value read from a manifest.
#[derive(Debug, Clone, PartialEq)]
pub enum ManifestValue {
    None,
    Bool(bool),
    Int(i64),
    Str(String),
    /// Lists and tuples alike.
    List(Vec<ManifestValue>),
    /// Ordered as declared.
    Dict(Vec<(String, ManifestValue)>),
    /// Anything that is not a plain literal, kept as its source text.
    Expr(String),
}

impl ManifestValue {
    pub fn string_list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::List(items.into_iter().map(|s| Self::Str(s.into())).collect())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ManifestValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// The value as a list of strings, if it is one.
    pub fn as_string_list(&self) -> Option<Vec<String>> {
        self.as_list()?
            .iter()
            .map(|item| item.as_str().map(str::to_owned))
            .collect()
    }

    pub fn get(&self, key: &str) -> Option<&ManifestValue> {
        match self {
            Self::Dict(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    pub(crate) fn from_expr(expr: &Expr, source: &str) -> Self {
        let text = &source[span_range(expr)];
        match expr {
            // Implicitly concatenated and prefixed literals come out joined.
            Expr::StringLiteral(literal) => Self::Str(literal.value.to_str().to_owned()),
            Expr::BooleanLiteral(literal) => Self::Bool(literal.value),
            Expr::NoneLiteral(_) => Self::None,
            Expr::NumberLiteral(_) => text
                .parse()
                .map_or_else(|_| Self::Expr(text.to_owned()), Self::Int),
            Expr::List(list) => Self::List(
                list.elts
                    .iter()
                    .map(|item| Self::from_expr(item, source))
                    .collect(),
            ),
            Expr::Tuple(tuple) => Self::List(
                tuple
                    .elts
                    .iter()
                    .map(|item| Self::from_expr(item, source))
                    .collect(),
            ),
            Expr::Dict(dict) => {
                let mut entries = Vec::with_capacity(dict.items.len());
                for item in &dict.items {
                    let Ok(key) = string_key(item) else {
                        return Self::Expr(text.to_owned());
                    };
                    entries.push((key, Self::from_expr(&item.value, source)));
                }
                Self::Dict(entries)
            }
            _ => Self::Expr(text.to_owned()),
        }
    }
}

impl Serialize for ManifestValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::None => serializer.serialize_none(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(i) => serializer.serialize_i64(*i),
            Self::Str(s) => serializer.serialize_str(s),
            Self::Expr(text) => Err(S::Error::custom(format!(
                "cannot write expression `{text}` as a literal"
            ))),
            Self::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Dict(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

/// Parsed view of a manifest, used for reading only. Writes go through the
/// span-based patch functions so the original formatting survives.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ManifestDict {
    entries: Vec<(String, ManifestValue)>,
}

impl ManifestDict {
    pub fn parse(source: &str) -> Result<Self> {
        let module = parse_module(source)?;
        let dict = top_level_mapping(&module)?;

        let mut entries = Vec::with_capacity(dict.items.len());
        for item in &dict.items {
            entries.push((string_key(item)?, ManifestValue::from_expr(&item.value, source)));
        }
        Ok(Self { entries })
    }

    pub fn get(&self, key: &str) -> Option<&ManifestValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Entries of a string-list key such as `data` or `qweb`; empty when absent.
    pub fn string_list(&self, key: &str) -> Vec<String> {
        self.get(key)
            .and_then(ManifestValue::as_string_list)
            .unwrap_or_default()
    }

    pub fn data_files(&self) -> Vec<String> {
        self.string_list("data")
    }
}
