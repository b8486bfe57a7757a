//! Hover model: the sentence split around a node, with sub-ranges marked.

use generational_arena::Index;
use serde::Serialize;

use crate::domain::arena::{SyntaxTree, TreeNode};
use crate::domain::tags::TagRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mark {
    None,
    /// Subtree of a tagged child
    Child,
    /// Own-text run under the hovered word
    Cursor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub text: String,
    pub mark: Mark,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Hover {
    pub before: String,
    pub segments: Vec<Segment>,
    pub after: String,
    pub comment: String,
}

impl Hover {
    /// The highlighted subtree text without marks.
    pub fn highlighted(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }
}

/// Char range local to the hovered subtree text.
#[derive(Debug, Clone, Copy)]
struct Range {
    start: usize,
    end: usize,
    mark: Mark,
}

/// Build the hover view of `node`; `word_index` is the 1-based hovered word.
pub fn hover(
    tree: &SyntaxTree,
    node: Index,
    word_index: Option<usize>,
    registry: &TagRegistry,
) -> Option<Hover> {
    let n = tree.get_node(node)?;
    let data = &n.data;
    let is_root = node == tree.root();

    let has_tagged_child = tree.children(node).any(|(_, c)| c.data.is_tagged());
    let segments = if !is_root && has_tagged_child {
        mark_ranges(tree, node, n, word_index)
    } else {
        vec![Segment {
            text: data.text_tree.clone(),
            mark: Mark::None,
        }]
    };

    Some(Hover {
        before: data.text_so_far.clone(),
        segments: segments.into_iter().filter(|s| !s.text.is_empty()).collect(),
        after: data.text_after.clone(),
        comment: hover_comment(tree, node, registry),
    })
}

fn mark_ranges(tree: &SyntaxTree, idx: Index, node: &TreeNode, word_index: Option<usize>) -> Vec<Segment> {
    let text = &node.data.text_tree;
    let len = text.chars().count();
    let base = node.data.c_pos;

    let mut ranges: Vec<Range> = tree
        .children(idx)
        .filter(|(_, c)| c.data.is_tagged() && !c.data.text_tree.is_empty())
        .map(|(_, c)| {
            let start = c.data.c_pos.saturating_sub(base);
            Range {
                start,
                end: len.min(start + c.data.c_tree_count),
                mark: Mark::Child,
            }
        })
        .filter(|r| r.end > r.start)
        .collect();

    if own_text_parts(tree, idx, node) >= 2 {
        if let Some(r) = word_index.and_then(|w| own_range_by_word(tree, idx, node, w, len)) {
            ranges.push(r);
        }
    }
    ranges.sort_by_key(|r| r.start);

    let mut segments = Vec::new();
    let mut cursor = 0;
    for r in ranges {
        let start = cursor.max(r.start);
        let end = start.max(r.end);
        if start > cursor {
            segments.push(segment(text, cursor, start, Mark::None));
        }
        if end > start {
            segments.push(segment(text, start, end, r.mark));
        }
        cursor = cursor.max(end);
    }
    segments.push(segment(text, cursor, len, Mark::None));
    segments
}

fn segment(text: &str, start: usize, end: usize, mark: Mark) -> Segment {
    Segment {
        text: text.chars().skip(start).take(end.saturating_sub(start)).collect(),
        mark,
    }
}

/// Own text plus every untagged child with text.
fn own_text_parts(tree: &SyntaxTree, idx: Index, node: &TreeNode) -> usize {
    let own = usize::from(!node.data.text.is_empty());
    own + tree
        .children(idx)
        .filter(|(_, c)| !c.data.is_tagged() && !c.data.text.is_empty())
        .count()
}

/// The own-text run whose words contain `word`.
fn own_range_by_word(
    tree: &SyntaxTree,
    idx: Index,
    node: &TreeNode,
    word: usize,
    len: usize,
) -> Option<Range> {
    let base = node.data.c_pos.saturating_sub(1);
    // (char start, char end, first word, word count)
    let mut runs = Vec::new();
    if !node.data.text.is_empty() && node.data.w_count > 0 {
        runs.push((base, base + node.data.c_count, node.data.w_pos, node.data.w_count));
    }
    for (_, c) in tree.children(idx) {
        if !c.data.is_tagged() && !c.data.text.is_empty() {
            let start = c.data.c_pos.saturating_sub(1);
            runs.push((start, start + c.data.c_count, c.data.w_pos, c.data.w_tree_count));
        }
    }
    runs.sort_by_key(|r| r.0);

    let (start, end, _, _) = runs
        .into_iter()
        .find(|&(_, _, first, count)| count > 0 && word >= first && word < first + count)?;
    let local_start = start.saturating_sub(base);
    let local_end = len.min(end.saturating_sub(base));
    (local_end > local_start).then_some(Range {
        start: local_start,
        end: local_end,
        mark: Mark::Cursor,
    })
}

/// Root comment first, then the node comment or the tag label.
pub fn hover_comment(tree: &SyntaxTree, node: Index, registry: &TagRegistry) -> String {
    let mut lines: Vec<String> = Vec::new();
    if let Some(c) = tree.root_data().comment.as_deref().filter(|c| !c.is_empty()) {
        lines.push(c.to_string());
    }

    let Some(data) = tree.get_node(node).map(|n| &n.data) else {
        return lines.join("\n");
    };
    let own = data.comment.as_deref().filter(|c| !c.is_empty());
    match own {
        Some(c) if node != tree.root() => lines.push(c.to_string()),
        _ if data.is_tagged() => {
            let label = registry
                .resolve_key(&data.tag, data.forward)
                .and_then(|k| registry.label(k))
                .filter(|l| !l.is_empty());
            if let Some(label) = label {
                lines.push(format!("({label})"));
            }
        }
        _ => {}
    }
    lines.join("\n")
}
