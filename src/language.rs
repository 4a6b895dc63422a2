//! Source language selection for formatting requests.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Language of the source text being formatted.
///
/// Serialized lowercase ("c" / "cpp") in session state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// C.
    C,
    /// C++ (the initial selection).
    #[default]
    Cpp,
}

impl Language {
    /// File name hint passed to the engine so it can pick language rules.
    pub fn file_hint(&self) -> &'static str {
        match self {
            Language::C => "main.c",
            Language::Cpp => "main.cpp",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Language::C => "C",
            Language::Cpp => "C++",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::C => write!(f, "c"),
            Language::Cpp => write!(f, "cpp"),
        }
    }
}
