//! Maps every subtree onto its range of the reconstructed sentence.

use generational_arena::Index;
use tracing::instrument;

use crate::domain::arena::{SyntaxTree, WordSpan};
use crate::domain::metrics::{count_words, is_word_separator};

/// Character ranges of the words of `text`.
pub fn word_spans(text: &str) -> Vec<WordSpan> {
    let mut spans = Vec::new();
    let mut start = None;
    let mut pos = 0;

    for c in text.chars() {
        match (is_word_separator(c), start) {
            (true, Some(s)) => {
                spans.push(WordSpan { start: s, end: pos });
                start = None;
            }
            (false, None) => start = Some(pos),
            _ => {}
        }
        pos += 1;
    }
    if let Some(s) = start {
        spans.push(WordSpan { start: s, end: pos });
    }
    spans
}

/// Running offset into the reconstruction, in chars and bytes.
#[derive(Debug, Clone, Copy, Default)]
struct Cursor {
    chars: usize,
    bytes: usize,
}

/// Store the reconstruction and word spans on the tree and fill the
/// position and text split of every node.
///
/// Counts must already be computed.
#[instrument(level = "trace", skip(tree, full))]
pub fn build_text_index(tree: &mut SyntaxTree, full: String) {
    tree.word_spans = word_spans(&full);
    let root = tree.root();
    let mut cursor = Cursor::default();
    fill(tree, root, &full, &mut cursor);
    tree.reconstructed = full;
}

fn fill(tree: &mut SyntaxTree, idx: Index, full: &str, cursor: &mut Cursor) {
    let start = *cursor;
    let Some(node) = tree.get_node(idx) else {
        return;
    };
    cursor.chars += node.data.c_count;
    cursor.bytes += node.data.text.len();

    for child in node.children.clone() {
        fill(tree, child, full, cursor);
    }

    let end = cursor.bytes;
    if let Some(node) = tree.get_node_mut(idx) {
        let data = &mut node.data;
        data.text_so_far = full[..start.bytes].to_string();
        data.text_tree = full[start.bytes..end].to_string();
        data.text_after = full[end..].to_string();
        data.c_pos = start.chars + 1;
        data.w_pos = count_words(&data.text_so_far) + 1;
    }
}
