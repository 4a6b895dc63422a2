//! Formatter option values and the ordered option mapping.
//!
//! `FormatOptions` preserves catalog declaration order so diffs, exports,
//! and the engine wire form are all deterministic. Values are kept as a
//! small closed enum rather than raw YAML nodes so structural equality and
//! type checks stay cheap.

use std::fmt;

// ---------------------------------------------------------------------------
// Option values
// ---------------------------------------------------------------------------

/// A single formatter option value.
///
/// `Enum` holds one choice from a fixed set declared in the catalog;
/// `Str` is free-form text. The `Display` impl renders the value as a
/// single-line YAML scalar in clang-format style: bare enums, quoted
/// strings, and flow lists whose items are quoted unless they are
/// identifier-shaped.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    /// true / false toggle.
    Bool(bool),
    /// Integer setting (widths, penalties).
    Int(i64),
    /// One choice from the option's declared choice set.
    Enum(String),
    /// Free-form string.
    Str(String),
    /// Ordered list of strings.
    List(Vec<String>),
}

impl OptionValue {
    /// Human-readable name of the value's type, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            OptionValue::Bool(_) => "boolean",
            OptionValue::Int(_) => "integer",
            OptionValue::Enum(_) => "enum",
            OptionValue::Str(_) => "string",
            OptionValue::List(_) => "string list",
        }
    }

    /// Whether `other` carries the same value type as `self`.
    pub fn same_kind(&self, other: &OptionValue) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(b) => write!(f, "{}", if *b { "true" } else { "false" }),
            OptionValue::Int(n) => write!(f, "{n}"),
            OptionValue::Enum(s) => write!(f, "{s}"),
            OptionValue::Str(s) => write!(f, "{}", quote_scalar(s)),
            OptionValue::List(items) => {
                let rendered: Vec<String> = items
                    .iter()
                    .map(|item| {
                        if renders_plain(item) {
                            item.clone()
                        } else {
                            quote_scalar(item)
                        }
                    })
                    .collect();
                write!(f, "[{}]", rendered.join(", "))
            }
        }
    }
}

/// Whether `s` can stand bare inside a flow list and still re-parse as the
/// same string: identifier-shaped and not a YAML boolean or null word.
fn renders_plain(s: &str) -> bool {
    let starts_ok = s
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    starts_ok
        && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !matches!(
            s.to_ascii_lowercase().as_str(),
            "true" | "false" | "null" | "yes" | "no" | "on" | "off"
        )
}

/// Quote a scalar so it survives a YAML re-parse on a single line.
///
/// Single quotes cover values with ':', '#', or ','; control characters
/// have no single-quoted form and fall back to double-quoted escapes.
fn quote_scalar(s: &str) -> String {
    if !s.chars().any(|c| c.is_control()) {
        return format!("'{}'", s.replace('\'', "''"));
    }
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

// ---------------------------------------------------------------------------
// Ordered option mapping
// ---------------------------------------------------------------------------

/// An ordered mapping from option key to [`OptionValue`].
///
/// Order follows the catalog declaration order and never changes after
/// construction; mutation replaces values in place and never adds or
/// removes keys. Equality is structural over the full mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct FormatOptions {
    entries: Vec<(String, OptionValue)>,
}

impl FormatOptions {
    /// Build a mapping from pre-ordered entries.
    pub fn from_entries(entries: Vec<(String, OptionValue)>) -> Self {
        Self { entries }
    }

    /// Look up a value by key.
    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Replace the value for an existing key.
    ///
    /// Returns false (and changes nothing) when the key is absent. Callers
    /// that need type checking validate against the catalog first.
    pub fn set_value(&mut self, key: &str, value: OptionValue) -> bool {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => {
                entry.1 = value;
                true
            }
            None => false,
        }
    }

    /// Iterate entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterate keys in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Number of options in the mapping.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the mapping is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
