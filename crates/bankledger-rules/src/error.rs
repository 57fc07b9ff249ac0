//! Rule file error types.

use crate::Span;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// A malformed rule file, with the location of the problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleFileError {
    /// The kind of error.
    pub kind: RuleFileErrorKind,
    /// 1-based line number.
    pub line: usize,
    /// Byte range in the rule file.
    pub span: Span,
    /// Optional hint for fixing the error.
    pub hint: Option<String>,
}

impl RuleFileError {
    /// Create a new rule file error.
    #[must_use]
    pub const fn new(kind: RuleFileErrorKind, line: usize, span: Span) -> Self {
        Self {
            kind,
            line,
            span,
            hint: None,
        }
    }

    /// Add a hint for fixing this error.
    #[must_use]
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Get a numeric code for the error kind.
    #[must_use]
    pub const fn code(&self) -> u32 {
        match &self.kind {
            RuleFileErrorKind::MissingName => 1,
            RuleFileErrorKind::DuplicateName(_) => 2,
            RuleFileErrorKind::UnknownField(_) => 3,
            RuleFileErrorKind::UnknownPredicate(_) => 4,
            RuleFileErrorKind::InvalidNumber(_) => 5,
            RuleFileErrorKind::UnclosedQuote => 6,
            RuleFileErrorKind::InvalidMatchMode(_) => 7,
            RuleFileErrorKind::TrailingBackslash => 8,
        }
    }

    /// Get the error message.
    #[must_use]
    pub fn message(&self) -> String {
        self.kind.to_string()
    }

    /// Get a short label for the error.
    #[must_use]
    pub const fn label(&self) -> &str {
        match &self.kind {
            RuleFileErrorKind::MissingName => "rule has no name",
            RuleFileErrorKind::DuplicateName(_) => "duplicate name",
            RuleFileErrorKind::UnknownField(_) => "unknown field",
            RuleFileErrorKind::UnknownPredicate(_) => "unknown predicate",
            RuleFileErrorKind::InvalidNumber(_) => "invalid number",
            RuleFileErrorKind::UnclosedQuote => "unclosed quote",
            RuleFileErrorKind::InvalidMatchMode(_) => "invalid match mode",
            RuleFileErrorKind::TrailingBackslash => "trailing backslash",
        }
    }
}

impl fmt::Display for RuleFileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.kind)
    }
}

impl std::error::Error for RuleFileError {}

/// Kinds of rule file errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleFileErrorKind {
    /// A rule block ended without a `Name:` line.
    MissingName,
    /// A rule name used by an earlier rule.
    DuplicateName(String),
    /// A condition field that is not PAYEE, DESC, AMOUNT or DATE.
    UnknownField(String),
    /// A condition predicate keyword that is not recognized.
    UnknownPredicate(String),
    /// A literal that should be a decimal number.
    InvalidNumber(String),
    /// A quoted token that never closes.
    UnclosedQuote,
    /// A `Match:` value other than ALL or ANY.
    InvalidMatchMode(String),
    /// A backslash at the end of a line, escaping nothing.
    TrailingBackslash,
}

impl fmt::Display for RuleFileErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingName => write!(f, "rule does not have a name"),
            Self::DuplicateName(name) => {
                write!(f, "a rule named '{name}' already exists")
            }
            Self::UnknownField(word) => write!(f, "unknown condition field '{word}'"),
            Self::UnknownPredicate(word) => write!(f, "unknown condition predicate '{word}'"),
            Self::InvalidNumber(literal) => write!(f, "invalid number '{literal}'"),
            Self::UnclosedQuote => write!(f, "unclosed quotation"),
            Self::InvalidMatchMode(word) => write!(f, "invalid match mode '{word}'"),
            Self::TrailingBackslash => write!(f, "line ends with an unescaped backslash"),
        }
    }
}

/// Errors that can occur while loading a rule file from disk.
#[derive(Debug, Error)]
pub enum LoadError {
    /// IO error reading the rule file.
    #[error("failed to read rule file {path}: {source}")]
    Io {
        /// The path that failed to read.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The rule file is malformed.
    #[error("invalid rule file {path}")]
    Parse {
        /// The rule file.
        path: PathBuf,
        /// The source text, kept for diagnostics.
        source_text: String,
        /// The parse error.
        #[source]
        error: RuleFileError,
    },
}
