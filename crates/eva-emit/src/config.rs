use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitterConfig {
    pub use_colors: bool,
    pub indent_style: IndentStyle,
    /// Append `; name` after block labels.
    pub block_comments: bool,
    /// Append `; name` after stack slot allocations.
    pub slot_names: bool,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            use_colors: false,
            indent_style: IndentStyle::Spaces(4),
            block_comments: true,
            slot_names: true,
        }
    }
}

impl EmitterConfig {
    /// Colored output for terminals.
    pub fn terminal() -> Self {
        Self {
            use_colors: true,
            ..Self::default()
        }
    }

    /// Bare instructions only, for tests and diffs.
    pub fn plain() -> Self {
        Self {
            use_colors: false,
            indent_style: IndentStyle::Spaces(4),
            block_comments: false,
            slot_names: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndentStyle {
    Spaces(usize),
    Tabs,
}

impl IndentStyle {
    pub fn render(&self) -> String {
        match self {
            IndentStyle::Spaces(n) => " ".repeat(*n),
            IndentStyle::Tabs => "\t".to_string(),
        }
    }
}
