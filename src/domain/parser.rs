//! Document parser: splits an analysis body into records.
//!
//! A record is a sentence line, an optional comment zone and one analysis
//! block. Parsing is all-or-nothing: the first violation aborts the whole
//! document with a located [`ParseError`].

use std::collections::HashMap;

use tracing::{debug, instrument};

use crate::domain::arena::SyntaxTree;
use crate::domain::builder::TreeBuilder;
use crate::domain::entities::Record;
use crate::domain::error::{ParseError, ParseReason};
use crate::domain::line::{self, Comment};
use crate::domain::metrics;
use crate::domain::text_index;

/// Comments collected between a sentence line and its block.
#[derive(Debug, Default)]
struct CommentZone {
    root: Option<String>,
    numbered: HashMap<u64, String>,
}

impl CommentZone {
    fn add(&mut self, comment: Comment<'_>) {
        match comment {
            Comment::Numbered { id, text } => {
                self.numbered.insert(id, text.to_string());
            }
            Comment::Plain(text) => {
                self.root.get_or_insert_with(|| text.to_string());
            }
            Comment::OutOfRange(_) => {}
        }
    }

    fn attach(self, tree: &mut SyntaxTree) {
        tree.root_data_mut().comment = self.root;
        if self.numbered.is_empty() {
            return;
        }
        let ids: Vec<_> = tree
            .iter()
            .filter_map(|(idx, n)| n.data.id.map(|id| (idx, id)))
            .collect();
        for (idx, id) in ids {
            if let (Some(text), Some(node)) = (self.numbered.get(&id), tree.get_node_mut(idx)) {
                node.data.comment = Some(text.clone());
            }
        }
    }
}

/// Parse a whole analysis body into records.
#[instrument(level = "debug", skip(text), fields(bytes = text.len()))]
pub fn parse_document(text: &str) -> Result<Vec<Record>, ParseError> {
    let lines: Vec<&str> = text
        .split('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .collect();
    let mut records = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        if line::is_blank(lines[i]) {
            i += 1;
            continue;
        }
        let (record, next) = parse_record(&lines, i)?;
        records.push(record);
        i = next;

        while i < lines.len() && (line::is_blank(lines[i]) || line::is_comment(lines[i])) {
            i += 1;
        }
    }

    debug!(records = records.len(), "document parsed");
    Ok(records)
}

/// Parse the record whose sentence line is at `start`.
fn parse_record(lines: &[&str], start: usize) -> Result<(Record, usize), ParseError> {
    let sentence = lines[start];
    if !line::is_sentence(sentence) {
        return Err(ParseError::at(ParseReason::SentenceExpected, lines, start));
    }

    let mut i = start + 1;
    let mut zone = CommentZone::default();
    while i < lines.len() && (line::is_blank(lines[i]) || line::is_comment(lines[i])) {
        if let Some(comment) = line::parse_comment(lines[i]) {
            zone.add(comment);
        }
        i += 1;
    }

    if i >= lines.len() || !line::opens_block(lines[i]) {
        return Err(ParseError::at(ParseReason::BlockExpected, lines, i));
    }

    let (mut tree, end) = TreeBuilder::new(lines).build(i)?;
    zone.attach(&mut tree);
    metrics::compute_counts(&mut tree);

    let rebuilt = metrics::reconstruct(&tree);
    if rebuilt.trim_start() != sentence.trim_start() {
        return Err(ParseError::at(
            ParseReason::Mismatch(rebuilt.trim_start().to_string()),
            lines,
            end.saturating_sub(1),
        ));
    }
    text_index::build_text_index(&mut tree, rebuilt);

    let record = Record {
        sentence: sentence.to_string(),
        line: start + 1,
        tree,
    };
    Ok((record, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_single_record_when_parsing_then_indexes_tree() {
        let records = parse_document(" The cat sat.\n(IC1The cat sat.\n)").unwrap();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.sentence, " The cat sat.");
        assert_eq!(record.line, 1);

        let tree = &record.tree;
        let (_, ic) = tree.children(tree.root()).next().unwrap();
        assert_eq!(ic.data.w_count, 3);
        assert_eq!(ic.data.w_tree_count, 3);
        assert_eq!(ic.data.w_pos, 1);
        assert_eq!(tree.reconstructed(), "The cat sat.");
    }

    #[test]
    fn given_comment_zone_when_parsing_then_attaches_comments() {
        let src = "The cat sat.\n# overall\n\n#1 subject-verb-object\n# ignored\n#1 last wins\n(IC1The cat sat.\n)";
        let records = parse_document(src).unwrap();
        let tree = &records[0].tree;
        assert_eq!(tree.root_data().comment.as_deref(), Some("overall"));
        let ic = tree.find_by_id(1).unwrap();
        assert_eq!(
            tree.get_node(ic).unwrap().data.comment.as_deref(),
            Some("last wins")
        );
    }

    #[test]
    fn given_numbered_comment_with_huge_id_when_parsing_then_root_comment_unset() {
        let src = "The cat sat.\n#99999999999999999999999 huge id\n(IC1The cat sat.\n)";
        let records = parse_document(src).unwrap();
        let tree = &records[0].tree;
        assert_eq!(tree.root_data().comment, None);
        assert!(tree.iter().all(|(_, n)| n.data.comment.is_none()));
    }

    #[test]
    fn given_mismatched_sentence_when_parsing_then_reports_rebuilt_text() {
        let err = parse_document("The cat sat.\n(IC1The dog sat.\n)").unwrap_err();
        assert_eq!(
            err.reason,
            ParseReason::Mismatch("The dog sat.".to_string())
        );
        assert_eq!(err.line, 3);
    }

    #[test]
    fn given_missing_block_when_parsing_then_block_expected() {
        let err = parse_document("The cat sat.\n#1 note").unwrap_err();
        assert_eq!(err.reason, ParseReason::BlockExpected);
        assert_eq!(err.line, 3);
        assert_eq!(err.raw, "");
    }

    #[test]
    fn given_block_without_sentence_when_parsing_then_sentence_expected() {
        let err = parse_document("\n~(IC1x\n").unwrap_err();
        assert_eq!(err.reason, ParseReason::SentenceExpected);
        assert_eq!(err.line, 2);
    }
}
