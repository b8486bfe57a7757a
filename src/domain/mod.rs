//! Domain layer: notation parsing, tree passes and layout
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod builder;
pub mod display;
pub mod entities;
pub mod error;
pub mod header;
pub mod hover;
pub mod layout;
pub mod line;
pub mod metrics;
pub mod parser;
pub mod tags;
pub mod text_index;

pub use arena::{NodeData, SyntaxTree, TreeNode, WordSpan};
pub use builder::TreeBuilder;
pub use display::{NodeView, RecordView, TreeNodeConvert};
pub use entities::*;
pub use error::{DomainError, ParseError, ParseReason};
pub use hover::{hover, Hover, Mark, Segment};
pub use layout::{
    check_bar_height, effective_word_cap, layout, layout_records, Interval, IntervalKind, LayoutConfig, LayoutModel,
    Paint,
};
pub use parser::parse_document;
pub use tags::{Fill, TagDef, TagRegistry};
