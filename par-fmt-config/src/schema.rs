//! The formatter option catalog: keys, categories, defaults, and enum
//! choice sets.
//!
//! The catalog is the single source of truth for which options exist and in
//! what order. The baseline mapping, validation, diffing, export, and the
//! engine wire form all derive their key order from it. Keys use the
//! upstream clang-format spelling so exported text drops straight into a
//! `.clang-format` file.

use crate::error::ConfigError;
use crate::options::{FormatOptions, OptionValue};

/// Display grouping for option editors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionCategory {
    /// Style base, widths, tabs, column limit.
    Core,
    /// Indentation of cases, directives, namespaces.
    Indentation,
    /// Brace and operator line-breaking.
    LineBreaking,
    /// Alignment of brackets, assignments, operands.
    Alignment,
    /// Line-break penalty weights.
    Penalties,
    /// Short-construct folding and everything else.
    Misc,
}

impl OptionCategory {
    /// Human-readable category label.
    pub fn label(&self) -> &'static str {
        match self {
            OptionCategory::Core => "Core",
            OptionCategory::Indentation => "Indentation",
            OptionCategory::LineBreaking => "Line Breaking",
            OptionCategory::Alignment => "Alignment",
            OptionCategory::Penalties => "Penalties",
            OptionCategory::Misc => "Miscellaneous",
        }
    }
}

/// One catalog entry: an option key with its category, default value, and
/// (for enum options) the legal choice set.
#[derive(Debug, Clone)]
pub struct OptionSpec {
    /// clang-format option key.
    pub key: &'static str,
    /// Display grouping.
    pub category: OptionCategory,
    /// Baseline default value; also fixes the option's value type.
    pub default: OptionValue,
    /// Legal values for `Enum` options; empty for other value types.
    pub choices: &'static [&'static str],
}

// ---------------------------------------------------------------------------
// Choice sets
// ---------------------------------------------------------------------------

const BASED_ON_STYLE: &[&str] = &[
    "LLVM",
    "Google",
    "Chromium",
    "Mozilla",
    "WebKit",
    "Microsoft",
    "GNU",
];
const PP_DIRECTIVES: &[&str] = &["None", "AfterHash", "BeforeHash"];
const NAMESPACE_INDENTATION: &[&str] = &["None", "Inner", "All"];
const BRACE_STYLES: &[&str] = &[
    "Attach",
    "Linux",
    "Mozilla",
    "Stroustrup",
    "Allman",
    "Whitesmiths",
    "GNU",
    "WebKit",
];
const BINARY_OPERATORS: &[&str] = &["None", "NonAssignment", "All"];
const CTOR_INITIALIZERS: &[&str] = &["BeforeColon", "BeforeComma", "AfterColon"];
const BRACKET_ALIGNMENT: &[&str] = &["Align", "DontAlign", "AlwaysBreak"];
const POINTER_ALIGNMENT: &[&str] = &["Left", "Right", "Middle"];
const SHORT_FUNCTIONS: &[&str] = &["None", "InlineOnly", "Empty", "Inline", "All"];
const SHORT_BLOCKS: &[&str] = &["Never", "Empty", "Always"];
const SPACE_BEFORE_PARENS: &[&str] = &[
    "Never",
    "ControlStatements",
    "NonEmptyParentheses",
    "Always",
];
const STANDARD: &[&str] = &["Auto", "Cpp03", "Cpp11", "Cpp14", "Cpp17", "Latest"];

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

fn bool_spec(key: &'static str, category: OptionCategory, default: bool) -> OptionSpec {
    OptionSpec {
        key,
        category,
        default: OptionValue::Bool(default),
        choices: &[],
    }
}

fn int_spec(key: &'static str, category: OptionCategory, default: i64) -> OptionSpec {
    OptionSpec {
        key,
        category,
        default: OptionValue::Int(default),
        choices: &[],
    }
}

fn enum_spec(
    key: &'static str,
    category: OptionCategory,
    default: &str,
    choices: &'static [&'static str],
) -> OptionSpec {
    OptionSpec {
        key,
        category,
        default: OptionValue::Enum(default.to_string()),
        choices,
    }
}

/// Build the full option catalog in declaration order.
pub fn catalog() -> Vec<OptionSpec> {
    use OptionCategory::*;

    vec![
        // Core
        enum_spec("BasedOnStyle", Core, "LLVM", BASED_ON_STYLE),
        int_spec("IndentWidth", Core, 2),
        int_spec("TabWidth", Core, 2),
        bool_spec("UseTab", Core, false),
        int_spec("ColumnLimit", Core, 80),
        // Indentation
        bool_spec("IndentCaseLabels", Indentation, false),
        enum_spec("IndentPPDirectives", Indentation, "None", PP_DIRECTIVES),
        bool_spec("IndentWrappedFunctionNames", Indentation, false),
        bool_spec("IndentGotoLabels", Indentation, true),
        enum_spec(
            "NamespaceIndentation",
            Indentation,
            "None",
            NAMESPACE_INDENTATION,
        ),
        // Line breaking
        enum_spec("BreakBeforeBraces", LineBreaking, "Attach", BRACE_STYLES),
        enum_spec(
            "BreakBeforeBinaryOperators",
            LineBreaking,
            "None",
            BINARY_OPERATORS,
        ),
        bool_spec("BreakBeforeTernaryOperators", LineBreaking, true),
        enum_spec(
            "BreakConstructorInitializers",
            LineBreaking,
            "BeforeColon",
            CTOR_INITIALIZERS,
        ),
        bool_spec("AlwaysBreakTemplateDeclarations", LineBreaking, false),
        bool_spec("AlwaysBreakAfterDefinitionReturnType", LineBreaking, false),
        // Alignment
        enum_spec("AlignAfterOpenBracket", Alignment, "Align", BRACKET_ALIGNMENT),
        bool_spec("AlignConsecutiveAssignments", Alignment, false),
        bool_spec("AlignConsecutiveDeclarations", Alignment, false),
        bool_spec("AlignOperands", Alignment, true),
        bool_spec("AlignTrailingComments", Alignment, true),
        enum_spec("PointerAlignment", Alignment, "Right", POINTER_ALIGNMENT),
        // Penalties
        int_spec("PenaltyBreakAssignment", Penalties, 2),
        int_spec("PenaltyBreakBeforeFirstCallParameter", Penalties, 100),
        int_spec("PenaltyBreakComment", Penalties, 50),
        int_spec("PenaltyExcessCharacter", Penalties, 1_000_000),
        int_spec("PenaltyReturnTypeOnItsOwnLine", Penalties, 60),
        // Short constructs and everything else
        bool_spec("AllowShortIfStatementsOnASingleLine", Misc, false),
        bool_spec("AllowShortLoopsOnASingleLine", Misc, false),
        enum_spec(
            "AllowShortFunctionsOnASingleLine",
            Misc,
            "All",
            SHORT_FUNCTIONS,
        ),
        enum_spec("AllowShortBlocksOnASingleLine", Misc, "Never", SHORT_BLOCKS),
        bool_spec("AllowShortCaseLabelsOnASingleLine", Misc, false),
        int_spec("SpacesBeforeTrailingComments", Misc, 2),
        bool_spec("SortIncludes", Misc, true),
        bool_spec("SortUsingDeclarations", Misc, true),
        enum_spec("SpaceBeforeParens", Misc, "ControlStatements", SPACE_BEFORE_PARENS),
        enum_spec("Standard", Misc, "Auto", STANDARD),
        OptionSpec {
            key: "ForEachMacros",
            category: Misc,
            default: OptionValue::List(vec![
                "foreach".to_string(),
                "Q_FOREACH".to_string(),
                "BOOST_FOREACH".to_string(),
            ]),
            choices: &[],
        },
        OptionSpec {
            key: "CommentPragmas",
            category: Misc,
            default: OptionValue::Str("^ IWYU pragma:".to_string()),
            choices: &[],
        },
    ]
}

/// Build the baseline default mapping from the catalog.
pub fn baseline() -> FormatOptions {
    FormatOptions::from_entries(
        catalog()
            .into_iter()
            .map(|spec| (spec.key.to_string(), spec.default))
            .collect(),
    )
}

/// Find a spec by key.
pub fn spec_for<'a>(catalog: &'a [OptionSpec], key: &str) -> Option<&'a OptionSpec> {
    catalog.iter().find(|spec| spec.key == key)
}

/// Check a value against a spec: same value type, and for enums a member
/// of the choice set.
pub fn validate(spec: &OptionSpec, value: &OptionValue) -> Result<(), ConfigError> {
    if !spec.default.same_kind(value) {
        return Err(ConfigError::InvalidValue {
            key: spec.key.to_string(),
            details: format!(
                "expected {}, got {}",
                spec.default.kind_name(),
                value.kind_name()
            ),
        });
    }
    if let OptionValue::Enum(choice) = value
        && !spec.choices.contains(&choice.as_str())
    {
        return Err(ConfigError::InvalidValue {
            key: spec.key.to_string(),
            details: format!("'{choice}' is not one of {:?}", spec.choices),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
