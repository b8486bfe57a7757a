//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Why a document failed to parse.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseReason {
    #[error("Indentation error")]
    Indentation,

    #[error("Check parentheses pairs")]
    Unbalanced,

    #[error("Sentence expected")]
    SentenceExpected,

    #[error("Analysis block expected")]
    BlockExpected,

    #[error("Mismatch sentence error: {0}")]
    Mismatch(String),
}

/// A parse failure located on one physical line of the input.
///
/// Displays as the two-line diagnostic `<reason>\nLine <n>: <raw line>`,
/// with `n` 1-based.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{reason}\nLine {line}: {raw}")]
pub struct ParseError {
    pub reason: ParseReason,
    /// 1-based line number
    pub line: usize,
    /// Raw text of the offending line (empty past end of input)
    pub raw: String,
}

impl ParseError {
    /// Build an error for the 0-based line `idx` of `lines`.
    pub fn at(reason: ParseReason, lines: &[&str], idx: usize) -> Self {
        Self {
            reason,
            line: idx + 1,
            raw: lines.get(idx).map(|l| l.to_string()).unwrap_or_default(),
        }
    }
}

/// Domain errors represent notation or layout violations.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("{0}")]
    Parse(#[from] ParseError),

    #[error(
        "sentence structure rendering failed: increase bar height (suggested >= {suggested}) or reduce word cap"
    )]
    InsufficientBarHeight { suggested: u32 },

    #[error("missing ### marker")]
    MissingSeparator,

    #[error("invalid word cap: {0}")]
    InvalidWordCap(String),

    #[error("invalid bar height: {0} (must be a positive number)")]
    InvalidBarHeight(f64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_parse_error_when_displayed_then_renders_two_lines() {
        let lines = ["The cat.", "(IC1The cat."];
        let err = ParseError::at(ParseReason::Unbalanced, &lines, 1);
        assert_eq!(err.to_string(), "Check parentheses pairs\nLine 2: (IC1The cat.");
    }

    #[test]
    fn given_index_past_end_when_locating_then_raw_is_empty() {
        let lines = ["The cat."];
        let err = ParseError::at(ParseReason::BlockExpected, &lines, 1);
        assert_eq!(err.line, 2);
        assert_eq!(err.to_string(), "Analysis block expected\nLine 2: ");
    }
}
