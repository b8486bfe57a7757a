//! Bottom-up count aggregation and sentence reconstruction.

use tracing::instrument;

use crate::domain::arena::SyntaxTree;

/// Joiner between words that carries no surrounding spaces.
pub const EM_DASH: char = '\u{2014}';

/// True for characters that separate words: whitespace and the em dash.
pub fn is_word_separator(c: char) -> bool {
    c.is_whitespace() || c == EM_DASH
}

/// Number of maximal runs of non-separator characters.
pub fn count_words(text: &str) -> usize {
    text.split(is_word_separator)
        .filter(|w| !w.is_empty())
        .count()
}

/// Length of `text` in characters, em dashes included.
pub fn count_chars(text: &str) -> usize {
    text.chars().count()
}

/// Fill own and subtree counts on every node and record the deepest level.
#[instrument(level = "trace", skip(tree))]
pub fn compute_counts(tree: &mut SyntaxTree) {
    let order: Vec<_> = tree.iter_postorder().map(|(idx, _)| idx).collect();
    let mut max_level = 0;

    for idx in order {
        let (mut w_tree, mut c_tree) = (0, 0);
        let children = tree
            .get_node(idx)
            .map(|n| n.children.clone())
            .unwrap_or_default();
        for child in children {
            if let Some(c) = tree.get_node(child) {
                w_tree += c.data.w_tree_count;
                c_tree += c.data.c_tree_count;
            }
        }

        if let Some(node) = tree.get_node_mut(idx) {
            let data = &mut node.data;
            data.w_count = count_words(&data.text);
            data.c_count = count_chars(&data.text);
            data.w_tree_count = data.w_count + w_tree;
            data.c_tree_count = data.c_count + c_tree;
            max_level = max_level.max(data.level);
        }
    }
    tree.max_level = max_level;
}

/// Concatenate the own text of every node in document order.
pub fn reconstruct(tree: &SyntaxTree) -> String {
    tree.iter().map(|(_, n)| n.data.text.as_str()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::arena::NodeData;
    use rstest::rstest;

    #[rstest]
    #[case("The cat sat.", 3)]
    #[case("  spaced   out  ", 2)]
    #[case("", 0)]
    #[case("word\u{2014}joined", 2)]
    #[case(" \u{2014} ", 0)]
    #[case(",", 1)]
    fn given_text_when_counting_words_then_dash_separates(#[case] text: &str, #[case] want: usize) {
        assert_eq!(count_words(text), want);
    }

    #[test]
    fn given_dash_when_counting_chars_then_dash_counts_once() {
        assert_eq!(count_chars("a\u{2014}b"), 3);
    }

    #[test]
    fn given_nested_tree_when_computing_counts_then_subtrees_aggregate() {
        let mut tree = SyntaxTree::new();
        let ic = tree.insert_node(
            NodeData {
                tag: "IC".into(),
                text: "We left".into(),
                level: 1,
                ..NodeData::default()
            },
            tree.root(),
        );
        tree.insert_node(
            NodeData {
                tag: "DC".into(),
                text: " when it rained".into(),
                level: 2,
                ..NodeData::default()
            },
            ic,
        );

        compute_counts(&mut tree);

        let ic_data = &tree.get_node(ic).unwrap().data;
        assert_eq!(ic_data.w_count, 2);
        assert_eq!(ic_data.w_tree_count, 5);
        assert_eq!(ic_data.c_tree_count, 22);
        assert_eq!(tree.root_data().w_tree_count, 5);
        assert_eq!(tree.max_level(), 2);
        assert_eq!(reconstruct(&tree), "We left when it rained");
    }
}
