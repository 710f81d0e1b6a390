//! Compiler configuration.

use mdx_calc::ResultStyle;
use serde::Deserialize;

/// A named result-style preference list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StylePreset {
    #[default]
    Any,
    Iterable,
    List,
    MutableList,
    IterableAny,
    IterableListMutableList,
}

impl StylePreset {
    pub fn styles(self) -> &'static [ResultStyle] {
        match self {
            StylePreset::Any => ResultStyle::ANY_ONLY,
            StylePreset::Iterable => ResultStyle::ITERABLE_ONLY,
            StylePreset::List => ResultStyle::LIST_ONLY,
            StylePreset::MutableList => ResultStyle::MUTABLE_LIST_ONLY,
            StylePreset::IterableAny => ResultStyle::ITERABLE_ANY,
            StylePreset::IterableListMutableList => ResultStyle::ITERABLE_LIST_MUTABLE_LIST,
        }
    }
}

/// Options of one compile session.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompilerOptions {
    /// Fold casts and numeric conversions of constants at compile time.
    pub fold_constants: bool,
    /// Whether value readers ask the evaluator to return null for
    /// dimensions unrelated to the cube. `None` follows the evaluator.
    pub null_for_unrelated_dimension: Option<bool>,
    /// Style list active when the session starts.
    pub default_styles: StylePreset,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            fold_constants: true,
            null_for_unrelated_dimension: None,
            default_styles: StylePreset::Any,
        }
    }
}
