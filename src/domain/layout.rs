//! Proportional layout of analysis trees into nested, depth-banded intervals.
//!
//! Horizontal positions are percentages of the available width; a sentence
//! longer than the word cap is compressed horizontally by the scale factor
//! `f` and its bar grows vertically by the same factor.

use std::collections::HashMap;

use generational_arena::Index;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::domain::arena::{NodeData, SyntaxTree};
use crate::domain::entities::Record;
use crate::domain::error::DomainError;
use crate::domain::tags::{Fill, TagRegistry};

pub const DEFAULT_WORD_CAP: u32 = 50;
pub const DEFAULT_BAR_HEIGHT: f64 = 45.0;
pub const DEFAULT_ROOT_FILL: &str = "#808080";
pub const DEFAULT_FALLBACK_FILL: &str = "rgba(231,215,182,.35)";

/// Top margin per level
const TOP_MARGIN: f64 = 5.0;
/// Bottom margin per level
const BOTTOM_MARGIN: f64 = 3.0;
/// Smallest inner height the deepest band must keep
const MIN_INNER_HEIGHT: f64 = 5.0;

const PUNCTUATION: &str = ",.;:!?";

/// Tuning passed into the engine.
#[derive(Debug, Clone)]
pub struct LayoutConfig {
    /// Words fitting the full width; 0 selects the longest laid-out tree
    pub word_cap: u32,
    /// Bar height of an unscaled tree
    pub bar_height: f64,
    pub root_fill: String,
    pub fallback_fill: String,
    pub registry: TagRegistry,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            word_cap: DEFAULT_WORD_CAP,
            bar_height: DEFAULT_BAR_HEIGHT,
            root_fill: DEFAULT_ROOT_FILL.to_string(),
            fallback_fill: DEFAULT_FALLBACK_FILL.to_string(),
            registry: TagRegistry::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalKind {
    Root,
    Tagged,
    /// Transparent hover target over an untagged text run
    Spacer,
}

/// Paint of a visible interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Paint {
    Solid(String),
    /// Pattern id defined by the renderer
    Pattern(String),
}

/// One positioned rectangle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Interval {
    #[serde(skip)]
    pub node: Index,
    pub kind: IntervalKind,
    pub level: usize,
    pub x_pct: f64,
    pub width_pct: f64,
    pub y: f64,
    pub height: f64,
    pub fill: Option<Paint>,
    /// Word to report on hover, spacers only
    pub word_index: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutModel {
    /// Scale factor `f`, at least 1
    pub scale: f64,
    pub bar_height: f64,
    pub bar_width_pct: f64,
    pub root: Interval,
    /// Tagged and spacer intervals in emission order
    pub intervals: Vec<Interval>,
}

/// Cap used for a set of records laid out together.
pub fn effective_word_cap(cap: u32, records: &[Record]) -> u32 {
    if records.is_empty() {
        return if cap == 0 { DEFAULT_WORD_CAP } else { cap };
    }
    if cap != 0 {
        return cap;
    }
    let longest = records
        .iter()
        .map(|r| r.tree.root_data().w_tree_count)
        .max()
        .unwrap_or(0);
    u32::try_from(longest).unwrap_or(u32::MAX).max(1)
}

fn scale_factor(span: usize, cap: u32) -> f64 {
    let (span, cap) = (span as f64, f64::from(cap));
    if span > cap {
        span / cap
    } else {
        1.0
    }
}

/// Accept `height` as a base bar height if it is finite and positive.
pub fn check_bar_height(height: f64) -> Result<f64, DomainError> {
    if height.is_finite() && height > 0.0 {
        Ok(height)
    } else {
        Err(DomainError::InvalidBarHeight(height))
    }
}

/// Smallest base bar height that leaves every band of `tree` visible.
///
/// A tree without words has no width to draw; `layout` refuses it outright
/// and reports this value as the suggestion.
pub fn minimum_bar_height(tree: &SyntaxTree, cap: u32) -> u32 {
    let span = tree.root_data().w_tree_count;
    if span == 0 {
        return MIN_INNER_HEIGHT as u32;
    }
    let f = scale_factor(span, cap);
    let levels = tree.max_level() as f64;
    let required = (TOP_MARGIN + BOTTOM_MARGIN) * levels + MIN_INNER_HEIGHT;
    (required / f).ceil() as u32
}

fn is_punctuation_only(text: &str) -> bool {
    let t = text.trim();
    let mut chars = t.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if PUNCTUATION.contains(c))
}

/// Own words that occupy width.
fn own_words(data: &NodeData) -> usize {
    if is_punctuation_only(&data.text) {
        0
    } else {
        data.w_count
    }
}

/// Subtree words that occupy width.
fn tree_words(data: &NodeData, has_children: bool) -> usize {
    if is_punctuation_only(&data.text) && !has_children {
        0
    } else {
        data.w_tree_count
    }
}

/// Lay out one tree against the cap `cap` (already made effective).
///
/// Trees without words are always refused with `InsufficientBarHeight`.
#[instrument(level = "debug", skip(tree, config))]
pub fn layout(tree: &SyntaxTree, cap: u32, config: &LayoutConfig) -> Result<LayoutModel, DomainError> {
    if cap == 0 {
        return Err(DomainError::InvalidWordCap("0".to_string()));
    }
    check_bar_height(config.bar_height)?;
    let required = minimum_bar_height(tree, cap);
    if tree.root_data().w_tree_count == 0 || config.bar_height < f64::from(required) {
        debug!(required, bar_height = config.bar_height, "bar too low");
        return Err(DomainError::InsufficientBarHeight {
            suggested: required,
        });
    }

    let span = tree.root_data().w_tree_count;
    let f = scale_factor(span, cap);
    let bar_height = config.bar_height * f;
    let bar_width_pct = span as f64 * 100.0 / (f * f64::from(cap));

    let mut engine = Engine {
        tree,
        config,
        cap: f64::from(cap),
        f,
        bar_height,
        rotation: HashMap::new(),
        intervals: Vec::new(),
    };
    engine.walk(tree.root(), 0);

    let root = Interval {
        node: tree.root(),
        kind: IntervalKind::Root,
        level: 0,
        x_pct: 0.0,
        width_pct: bar_width_pct,
        y: 0.0,
        height: bar_height,
        fill: Some(Paint::Solid(config.root_fill.clone())),
        word_index: None,
    };

    Ok(LayoutModel {
        scale: f,
        bar_height,
        bar_width_pct,
        root,
        intervals: engine.intervals,
    })
}

/// Lay out every record with a shared effective cap.
pub fn layout_records(
    records: &[Record],
    config: &LayoutConfig,
) -> Vec<Result<LayoutModel, DomainError>> {
    let cap = effective_word_cap(config.word_cap, records);
    records
        .iter()
        .map(|r| layout(&r.tree, cap, config))
        .collect()
}

struct Engine<'a> {
    tree: &'a SyntaxTree,
    config: &'a LayoutConfig,
    cap: f64,
    f: f64,
    bar_height: f64,
    /// Next fill entry per registry key
    rotation: HashMap<&'a str, usize>,
    intervals: Vec<Interval>,
}

impl<'a> Engine<'a> {
    fn band(&self, level: usize) -> (f64, f64) {
        let lvl = level.max(1) as f64;
        let y = TOP_MARGIN * lvl;
        let height = (self.bar_height - y - BOTTOM_MARGIN * lvl).max(0.0);
        (y, height)
    }

    fn pct(&self, words: usize) -> f64 {
        words as f64 * 100.0 / (self.f * self.cap)
    }

    fn pick_fill(&mut self, data: &NodeData) -> Paint {
        let config: &'a LayoutConfig = self.config;
        let fallback = Paint::Solid(config.fallback_fill.clone());
        let Some(key) = config.registry.resolve_key(&data.tag, data.forward) else {
            return fallback;
        };
        let Some(def) = config.registry.get(key) else {
            return fallback;
        };
        let entries = def.fill.entries();
        if entries.is_empty() {
            return fallback;
        }

        let counter = self.rotation.entry(key).or_insert(0);
        let value = entries[*counter % entries.len()].clone();
        *counter += 1;
        match def.fill {
            Fill::Patterns(_) => Paint::Pattern(value),
            Fill::Palette(_) => Paint::Solid(value),
        }
    }

    fn spacer(&mut self, node: Index, start: usize, words: usize, level: usize, word_index: usize) {
        if words == 0 {
            return;
        }
        let (y, height) = self.band(level);
        self.intervals.push(Interval {
            node,
            kind: IntervalKind::Spacer,
            level,
            x_pct: self.pct(start),
            width_pct: self.pct(words),
            y,
            height,
            fill: None,
            word_index: Some(word_index),
        });
    }

    fn spacers(&mut self, idx: Index) {
        let tree = self.tree;
        let Some(node) = tree.get_node(idx) else {
            return;
        };
        if !tree.children(idx).any(|(_, c)| c.data.is_tagged()) {
            return;
        }

        let level = node.data.level.max(1) + 1;
        let w_pos = node.data.w_pos.max(1);
        self.spacer(idx, w_pos - 1, own_words(&node.data), level, w_pos);

        for (_, child) in tree.children(idx) {
            if child.data.is_tagged() {
                continue;
            }
            let words = tree_words(&child.data, !child.children.is_empty());
            let w_pos = child.data.w_pos.max(1);
            self.spacer(idx, w_pos - 1, words, level, w_pos);
        }
    }

    fn walk(&mut self, idx: Index, mut cursor: usize) -> usize {
        let tree = self.tree;
        self.spacers(idx);

        for (child_idx, child) in tree.children(idx) {
            let data = &child.data;
            if !data.is_tagged() {
                cursor += own_words(data);
                continue;
            }

            let fill = self.pick_fill(data);
            let (y, height) = self.band(data.level);
            self.intervals.push(Interval {
                node: child_idx,
                kind: IntervalKind::Tagged,
                level: data.level,
                x_pct: self.pct(cursor),
                width_pct: self.pct(data.w_tree_count),
                y,
                height,
                fill: Some(fill),
                word_index: None,
            });

            let start = cursor;
            self.walk(child_idx, start + own_words(data));
            cursor = start + tree_words(data, !child.children.is_empty());
        }
        cursor
    }
}
