//! A bundled brace-depth re-indenting engine.
//!
//! Not a real clang-format; it only normalizes leading whitespace by brace
//! nesting depth. Useful as a lightweight engine for demos and tests, and
//! only ever runs when explicitly selected.

use serde::Deserialize;

use super::{EngineError, FormatEngine};

/// The subset of the option mapping this engine honors. Unknown keys in the
/// wire mapping are ignored.
#[derive(Debug, Deserialize)]
struct WireOptions {
    #[serde(rename = "IndentWidth", default = "default_width")]
    indent_width: usize,
    #[serde(rename = "TabWidth", default = "default_width")]
    tab_width: usize,
    #[serde(rename = "UseTab", default)]
    use_tab: bool,
}

fn default_width() -> usize {
    2
}

/// Upper bound for `IndentWidth` and `TabWidth`; larger values are
/// rejected rather than fed to the indent math.
const MAX_WIDTH: usize = 64;

/// Re-indents each line to its brace nesting depth.
#[derive(Debug, Default)]
pub struct ReindentEngine;

impl ReindentEngine {
    pub fn new() -> Self {
        Self
    }
}

impl FormatEngine for ReindentEngine {
    fn name(&self) -> &str {
        "reindent"
    }

    fn format(
        &self,
        source: &str,
        _file_hint: &str,
        options: &str,
    ) -> Result<String, EngineError> {
        let opts: WireOptions = serde_yaml_ng::from_str(options)
            .map_err(|e| EngineError::InvalidOptions(e.to_string()))?;
        if opts.indent_width > MAX_WIDTH || opts.tab_width > MAX_WIDTH {
            return Err(EngineError::InvalidOptions(format!(
                "IndentWidth and TabWidth must be at most {MAX_WIDTH}"
            )));
        }
        if opts.use_tab && opts.tab_width == 0 {
            return Err(EngineError::InvalidOptions(
                "TabWidth must be positive when UseTab is set".to_string(),
            ));
        }

        let mut depth: usize = 0;
        let mut out = Vec::new();
        for line in source.lines() {
            let trimmed = line.trim();
            // A closing brace dedents the line it appears on; an opening
            // brace indents the lines after it. "} else {" nets out even.
            if trimmed.contains('}') {
                depth = depth.saturating_sub(1);
            }
            if trimmed.is_empty() {
                out.push(String::new());
            } else {
                out.push(format!("{}{trimmed}", indentation(&opts, depth)));
            }
            if trimmed.contains('{') {
                depth += 1;
            }
        }

        let mut formatted = out.join("\n");
        if source.ends_with('\n') {
            formatted.push('\n');
        }
        Ok(formatted)
    }
}

fn indentation(opts: &WireOptions, depth: usize) -> String {
    let columns = depth * opts.indent_width;
    if opts.use_tab {
        let tabs = columns / opts.tab_width;
        let spaces = columns % opts.tab_width;
        format!("{}{}", "\t".repeat(tabs), " ".repeat(spaces))
    } else {
        " ".repeat(columns)
    }
}
