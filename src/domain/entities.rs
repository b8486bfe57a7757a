//! Domain entities: parsed records and corpus source files

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::domain::arena::SyntaxTree;
use crate::domain::error::DomainError;

/// One analysed sentence: the literal sentence line and its tree.
#[derive(Debug, Clone)]
pub struct Record {
    /// Sentence line exactly as written, leading blanks included
    pub sentence: String,
    /// 1-based line of the sentence in the analysis body
    pub line: usize,
    pub tree: SyntaxTree,
}

impl Record {
    /// A leading blank on the sentence line marks a paragraph start.
    pub fn starts_paragraph(&self) -> bool {
        self.sentence.starts_with(' ')
    }
}

/// Lines starting with `###` separate the parts of a corpus file.
static SEPARATOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^###[^\r\n]*(?:\r?\n|$)").expect("separator pattern is valid"));

/// A corpus file split into metadata header and analysis body.
///
/// ```text
/// Work: The Waves
/// Author: Virginia Woolf
/// ###
///  The sun had not yet risen.
/// (IC1The sun had not yet risen.
/// )
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SourceFile {
    /// `Key: value` pairs from the header
    pub metadata: BTreeMap<String, String>,
    /// Analysis notation, trimmed
    pub body: String,
    /// Text after a second separator, kept verbatim
    pub original: Option<String>,
}

impl SourceFile {
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let parts: Vec<&str> = SEPARATOR_RE.split(raw).collect();
        if parts.len() < 2 {
            return Err(DomainError::MissingSeparator);
        }

        Ok(Self {
            metadata: parse_metadata(parts[0]),
            body: parts[1].trim().to_string(),
            original: parts.get(2).map(|s| s.to_string()),
        })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    /// Comma separated `Tags` entry, blanks dropped.
    pub fn tags(&self) -> Vec<&str> {
        self.get("Tags")
            .map(|t| t.split(',').map(str::trim).filter(|t| !t.is_empty()).collect())
            .unwrap_or_default()
    }
}

fn parse_metadata(header: &str) -> BTreeMap<String, String> {
    header
        .lines()
        .map(str::trim)
        .filter_map(|line| match line.find(':') {
            Some(idx) if idx > 0 => Some((line[..idx].trim(), line[idx + 1..].trim())),
            _ => None,
        })
        .filter(|(key, _)| !key.is_empty())
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

/// Rebuild readable paragraphs from the sentence lines of `records`.
pub fn excerpt(records: &[Record]) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for record in records {
        if record.starts_paragraph() && !current.is_empty() {
            paragraphs.push(current.join(" "));
            current.clear();
        }
        current.push(record.sentence.trim());
    }
    if !current.is_empty() {
        paragraphs.push(current.join(" "));
    }
    paragraphs
}
