//! Display views of analysis trees: terminal tree and nested serializable view.

use generational_arena::Index;
use serde::Serialize;
use termtree::Tree;
use tracing::instrument;

use crate::domain::arena::{NodeData, SyntaxTree};
use crate::domain::entities::Record;

pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

impl TreeNodeConvert for SyntaxTree {
    #[instrument(level = "trace", skip(self))]
    fn to_tree_string(&self) -> Tree<String> {
        fn build_tree(tree: &SyntaxTree, node_idx: Index, parent_tree: &mut Tree<String>) {
            for (child_idx, child) in tree.children(node_idx) {
                let mut child_tree = Tree::new(child.data.to_string());
                build_tree(tree, child_idx, &mut child_tree);
                parent_tree.push(child_tree);
            }
        }

        let root = self.root_data();
        let label = match root.comment.as_deref() {
            Some(c) => format!("{} words # {}", root.w_tree_count, c),
            None => format!("{} words", root.w_tree_count),
        };
        let mut out = Tree::new(label);
        build_tree(self, self.root(), &mut out);
        out
    }
}

/// Nested, serializable node: the payload plus its children.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeView<'a> {
    #[serde(flatten)]
    pub data: &'a NodeData,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_level: Option<usize>,
    pub nodes: Vec<NodeView<'a>>,
}

impl<'a> NodeView<'a> {
    pub fn from_tree(tree: &'a SyntaxTree) -> Self {
        let mut view = Self::build(tree, tree.root());
        view.max_level = Some(tree.max_level());
        view
    }

    fn build(tree: &'a SyntaxTree, idx: Index) -> Self {
        let data = tree
            .get_node(idx)
            .map(|n| &n.data)
            .unwrap_or_else(|| tree.root_data());
        Self {
            data,
            max_level: None,
            nodes: tree.children(idx).map(|(c, _)| Self::build(tree, c)).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecordView<'a> {
    pub sentence: &'a str,
    pub line: usize,
    pub tree: NodeView<'a>,
}

impl<'a> From<&'a Record> for RecordView<'a> {
    fn from(record: &'a Record) -> Self {
        Self {
            sentence: &record.sentence,
            line: record.line,
            tree: NodeView::from_tree(&record.tree),
        }
    }
}
