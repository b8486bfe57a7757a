use generational_arena::{Arena, Index};
use serde::Serialize;
use std::fmt;
use tracing::instrument;

/// Data payload for one node of an analysis tree.
///
/// The root of every tree is synthetic: no tag, no text, level 0.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
    /// Two-letter clause/phrase code, empty for untagged nodes
    pub tag: String,
    /// Reference handle, unique within a record
    pub id: Option<u64>,
    /// Id of the node this one points to
    #[serde(rename = "ref")]
    pub reference: Option<u64>,
    /// Header used the `>` direction marker
    pub forward: bool,
    /// Literal text owned directly by this node (children excluded)
    pub text: String,
    /// Nesting depth, 1-based for parsed nodes
    pub level: usize,
    pub w_count: usize,
    pub c_count: usize,
    pub w_tree_count: usize,
    pub c_tree_count: usize,
    /// 1-based word offset of this subtree in the reconstructed sentence
    pub w_pos: usize,
    /// 1-based character offset of this subtree in the reconstructed sentence
    pub c_pos: usize,
    pub text_so_far: String,
    pub text_tree: String,
    pub text_after: String,
    pub comment: Option<String>,
}

impl NodeData {
    pub fn is_tagged(&self) -> bool {
        !self.tag.is_empty()
    }
}

impl fmt::Display for NodeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_tagged() {
            write!(f, "{}", self.tag)?;
            if let Some(id) = self.id {
                write!(f, "{}", id)?;
            }
            if let Some(r) = self.reference {
                write!(f, "{}{}", if self.forward { '>' } else { '<' }, r)?;
            }
            if !self.text.is_empty() {
                write!(f, " ")?;
            }
        }
        write!(f, "{:?}", self.text)
    }
}

/// Character range `[start, end)` of one word in the reconstructed sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WordSpan {
    pub start: usize,
    pub end: usize,
}

/// Tree node in the arena-based analysis tree.
#[derive(Debug, Clone)]
pub struct TreeNode {
    /// Node payload
    pub data: NodeData,
    /// Index of parent node in the arena, None for the root
    pub parent: Option<Index>,
    /// Indices of child nodes in document order
    pub children: Vec<Index>,
}

/// Arena-based analysis tree for one record.
///
/// Uses a generational arena so parser frames and passes can hold plain
/// `Index` handles instead of borrowed nodes. The root is created with the
/// tree and always exists.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    arena: Arena<TreeNode>,
    root: Index,
    pub(crate) max_level: usize,
    pub(crate) reconstructed: String,
    pub(crate) word_spans: Vec<WordSpan>,
}

impl Default for SyntaxTree {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntaxTree {
    pub fn new() -> Self {
        let mut arena = Arena::new();
        let root = arena.insert(TreeNode {
            data: NodeData::default(),
            parent: None,
            children: Vec::new(),
        });
        Self {
            arena,
            root,
            max_level: 0,
            reconstructed: String::new(),
            word_spans: Vec::new(),
        }
    }

    /// Append a node as the last child of `parent`.
    #[instrument(level = "trace", skip(self, data))]
    pub fn insert_node(&mut self, data: NodeData, parent: Index) -> Index {
        let node_idx = self.arena.insert(TreeNode {
            data,
            parent: Some(parent),
            children: Vec::new(),
        });
        if let Some(parent) = self.arena.get_mut(parent) {
            parent.children.push(node_idx);
        }
        node_idx
    }

    pub fn get_node(&self, idx: Index) -> Option<&TreeNode> {
        self.arena.get(idx)
    }

    pub fn get_node_mut(&mut self, idx: Index) -> Option<&mut TreeNode> {
        self.arena.get_mut(idx)
    }

    pub fn root(&self) -> Index {
        self.root
    }

    pub fn root_data(&self) -> &NodeData {
        // the root is inserted in `new` and never removed
        &self.arena[self.root].data
    }

    pub(crate) fn root_data_mut(&mut self) -> &mut NodeData {
        &mut self.arena[self.root].data
    }

    /// Children of `idx` in document order.
    pub fn children(&self, idx: Index) -> impl Iterator<Item = (Index, &TreeNode)> + '_ {
        self.get_node(idx)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
            .iter()
            .filter_map(move |&c| self.get_node(c).map(|n| (c, n)))
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// True when the tree holds nothing but its root.
    pub fn is_empty(&self) -> bool {
        self.arena.len() <= 1
    }

    /// Pre-order (document order) traversal, root first.
    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self)
    }

    /// Post-order traversal, children before their parent.
    pub fn iter_postorder(&self) -> PostOrderIterator<'_> {
        PostOrderIterator::new(self)
    }

    /// Deepest level present in the tree.
    pub fn max_level(&self) -> usize {
        self.max_level
    }

    /// The sentence rebuilt from the tree, in document order.
    pub fn reconstructed(&self) -> &str {
        &self.reconstructed
    }

    /// Word spans over the reconstructed sentence, in order.
    pub fn word_spans(&self) -> &[WordSpan] {
        &self.word_spans
    }

    /// Character range of the 1-based word `n`.
    pub fn word_span(&self, n: usize) -> Option<WordSpan> {
        n.checked_sub(1).and_then(|i| self.word_spans.get(i)).copied()
    }

    /// 1-based index of the word containing the character `offset`,
    /// None when the offset falls on a separator or past the end.
    pub fn word_index_at(&self, offset: usize) -> Option<usize> {
        let pos = self.word_spans.partition_point(|s| s.end <= offset);
        self.word_spans
            .get(pos)
            .filter(|s| s.start <= offset)
            .map(|_| pos + 1)
    }

    /// First node carrying the given id, in document order.
    pub fn find_by_id(&self, id: u64) -> Option<Index> {
        self.iter()
            .find(|(_, n)| n.data.id == Some(id))
            .map(|(idx, _)| idx)
    }

    /// Number of tagged nodes in the tree.
    pub fn tagged_count(&self) -> usize {
        self.iter().filter(|(_, n)| n.data.is_tagged()).count()
    }
}

pub struct TreeIterator<'a> {
    tree: &'a SyntaxTree,
    stack: Vec<Index>,
}

impl<'a> TreeIterator<'a> {
    fn new(tree: &'a SyntaxTree) -> Self {
        Self {
            tree,
            stack: vec![tree.root()],
        }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (Index, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.tree.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}

pub struct PostOrderIterator<'a> {
    tree: &'a SyntaxTree,
    stack: Vec<(Index, bool)>,
}

impl<'a> PostOrderIterator<'a> {
    fn new(tree: &'a SyntaxTree) -> Self {
        Self {
            tree,
            stack: vec![(tree.root(), false)],
        }
    }
}

impl<'a> Iterator for PostOrderIterator<'a> {
    type Item = (Index, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, visited)) = self.stack.pop() {
            if let Some(node) = self.tree.get_node(current_idx) {
                if !visited {
                    self.stack.push((current_idx, true));
                    for &child in node.children.iter().rev() {
                        self.stack.push((child, false));
                    }
                } else {
                    return Some((current_idx, node));
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_node(text: &str, level: usize) -> NodeData {
        NodeData {
            text: text.to_string(),
            level,
            ..NodeData::default()
        }
    }

    #[test]
    fn given_nested_nodes_when_iterating_then_preorder_and_postorder_differ() {
        let mut tree = SyntaxTree::new();
        let a = tree.insert_node(text_node("a", 1), tree.root());
        tree.insert_node(text_node("b", 2), a);
        tree.insert_node(text_node("c", 1), tree.root());

        let pre: Vec<_> = tree.iter().map(|(_, n)| n.data.text.clone()).collect();
        assert_eq!(pre, vec!["", "a", "b", "c"]);

        let post: Vec<_> = tree
            .iter_postorder()
            .map(|(_, n)| n.data.text.clone())
            .collect();
        assert_eq!(post, vec!["b", "a", "c", ""]);
    }

    #[test]
    fn given_word_spans_when_looking_up_offsets_then_maps_to_word_index() {
        let mut tree = SyntaxTree::new();
        tree.word_spans = vec![WordSpan { start: 0, end: 3 }, WordSpan { start: 4, end: 7 }];

        assert_eq!(tree.word_index_at(0), Some(1));
        assert_eq!(tree.word_index_at(2), Some(1));
        assert_eq!(tree.word_index_at(3), None);
        assert_eq!(tree.word_index_at(6), Some(2));
        assert_eq!(tree.word_index_at(7), None);
        assert_eq!(tree.word_span(2), Some(WordSpan { start: 4, end: 7 }));
        assert_eq!(tree.word_span(0), None);
    }

    #[test]
    fn given_tagged_node_when_displayed_then_shows_header() {
        let data = NodeData {
            tag: "DC".into(),
            id: Some(2),
            reference: Some(1),
            forward: true,
            text: "when".into(),
            ..NodeData::default()
        };
        assert_eq!(data.to_string(), "DC2>1 \"when\"");
    }
}
