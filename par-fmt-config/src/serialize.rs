//! Option-text serialization: dotfile export, engine wire form, and the
//! lenient import parser.
//!
//! Export is one `key: value` line per option in catalog order, the shape a
//! `.clang-format` file expects. The wire form is the same entries as a
//! single-line YAML flow mapping, which is what the formatting engine takes
//! as its serialized options argument. Import accepts any YAML mapping,
//! keeps the keys it recognizes, and ignores the rest.

use crate::error::ConfigError;
use crate::options::{FormatOptions, OptionValue};
use crate::schema::{self, OptionSpec};

impl FormatOptions {
    /// Serialize to dotfile text: one `key: value` per line, catalog order,
    /// no trailing newline.
    pub fn to_text(&self) -> String {
        let lines: Vec<String> = self
            .iter()
            .map(|(key, value)| format!("{key}: {value}"))
            .collect();
        lines.join("\n")
    }

    /// Serialize to the engine wire form: a single-line YAML flow mapping
    /// `{Key1: value1, Key2: value2, ...}` in catalog order.
    pub fn to_wire(&self) -> String {
        let entries: Vec<String> = self
            .iter()
            .map(|(key, value)| format!("{key}: {value}"))
            .collect();
        format!("{{{}}}", entries.join(", "))
    }
}

/// Parse option text into the entries the catalog recognizes.
///
/// Unknown keys, mistyped values, and enum values outside the choice set
/// are skipped with a warning; only a YAML syntax error (or a non-mapping
/// document) is an `Err`. An empty document parses to no entries.
pub fn parse_options_text(
    text: &str,
    catalog: &[OptionSpec],
) -> Result<Vec<(String, OptionValue)>, ConfigError> {
    let doc: serde_yaml_ng::Value = serde_yaml_ng::from_str(text)?;

    let mapping = match doc {
        serde_yaml_ng::Value::Mapping(mapping) => mapping,
        serde_yaml_ng::Value::Null => return Ok(Vec::new()),
        _ => return Err(ConfigError::NotAMapping),
    };

    let mut entries = Vec::new();
    for (key, value) in mapping {
        let Some(key) = key.as_str() else {
            log::warn!("Ignoring non-string option key: {key:?}");
            continue;
        };
        let Some(spec) = schema::spec_for(catalog, key) else {
            log::warn!("Ignoring unknown option key '{key}'");
            continue;
        };
        match coerce_value(spec, &value) {
            Some(coerced) => entries.push((key.to_string(), coerced)),
            None => log::warn!(
                "Ignoring option '{key}': value {value:?} does not fit a {}",
                spec.default.kind_name()
            ),
        }
    }
    Ok(entries)
}

/// Coerce a parsed YAML node to the same kind as the catalog default.
fn coerce_value(spec: &OptionSpec, value: &serde_yaml_ng::Value) -> Option<OptionValue> {
    match spec.default {
        OptionValue::Bool(_) => value.as_bool().map(OptionValue::Bool),
        OptionValue::Int(_) => value.as_i64().map(OptionValue::Int),
        OptionValue::Enum(_) => {
            let choice = value.as_str()?;
            if spec.choices.contains(&choice) {
                Some(OptionValue::Enum(choice.to_string()))
            } else {
                None
            }
        }
        OptionValue::Str(_) => value.as_str().map(|s| OptionValue::Str(s.to_string())),
        OptionValue::List(_) => {
            let seq = value.as_sequence()?;
            let items: Option<Vec<String>> = seq
                .iter()
                .map(|item| item.as_str().map(str::to_string))
                .collect();
            items.map(OptionValue::List)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
