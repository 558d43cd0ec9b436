use std::fmt;

use serde::{Deserialize, Serialize};

/// The calling-convention category of a parameter.
///
/// Variants are declared in their fixed total order, so the derived `Ord`
/// is the order parameters must appear in within a signature:
///
/// `PositionalOnly < PositionalOrKeyword < VarPositional < KeywordOnly < VarKeyword`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Kind {
    /// Bound by position only (before `/`).
    PositionalOnly,
    /// Bound by position or by keyword.
    PositionalOrKeyword,
    /// Collects excess positional arguments (`*args`).
    VarPositional,
    /// Bound by keyword only (after `*` or `*args`).
    KeywordOnly,
    /// Collects excess keyword arguments (`**kwargs`).
    VarKeyword,
}

impl Kind {
    /// All kinds in their total order.
    pub const ALL: [Kind; 5] = [
        Self::PositionalOnly,
        Self::PositionalOrKeyword,
        Self::VarPositional,
        Self::KeywordOnly,
        Self::VarKeyword,
    ];

    /// Returns `true` for `*args` and `**kwargs` style kinds.
    pub fn is_variadic(self) -> bool {
        matches!(self, Self::VarPositional | Self::VarKeyword)
    }

    /// Returns `true` if an argument of this kind can be supplied by position.
    pub fn accepts_positional(self) -> bool {
        matches!(self, Self::PositionalOnly | Self::PositionalOrKeyword)
    }

    /// Returns `true` if an argument of this kind can be supplied by keyword.
    pub fn accepts_keyword(self) -> bool {
        matches!(self, Self::PositionalOrKeyword | Self::KeywordOnly)
    }

    /// The kebab-case name of this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PositionalOnly => "positional-only",
            Self::PositionalOrKeyword => "positional-or-keyword",
            Self::VarPositional => "var-positional",
            Self::KeywordOnly => "keyword-only",
            Self::VarKeyword => "var-keyword",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
