//! Block parser: stack machine assembling one analysis tree.

use generational_arena::Index;
use tracing::{instrument, trace};

use crate::domain::arena::{NodeData, SyntaxTree};
use crate::domain::error::{ParseError, ParseReason};
use crate::domain::header;
use crate::domain::line::{self, BlockLine, LineKind};

/// Bracket kind of an open frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameKind {
    Root,
    Nest,
    Attach,
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    node: Index,
    level: usize,
    kind: FrameKind,
}

/// Builds the tree of one analysis block from a slice of document lines.
///
/// The builder owns the parse state of a single block: the frame stack and
/// the two balance counters. It is consumed by [`TreeBuilder::build`].
pub struct TreeBuilder<'l> {
    lines: &'l [&'l str],
    tree: SyntaxTree,
    stack: Vec<Frame>,
    nest_balance: usize,
    attach_balance: usize,
}

impl<'l> TreeBuilder<'l> {
    pub fn new(lines: &'l [&'l str]) -> Self {
        let tree = SyntaxTree::new();
        let root = Frame {
            node: tree.root(),
            level: 0,
            kind: FrameKind::Root,
        };
        Self {
            lines,
            tree,
            stack: vec![root],
            nest_balance: 0,
            attach_balance: 0,
        }
    }

    /// Parse the block starting at line `start`.
    ///
    /// Returns the tree and the index of the first line after the block.
    /// The block ends when, with every bracket closed, the next non-blank
    /// line does not open a new top-level nest.
    #[instrument(level = "debug", skip(self))]
    pub fn build(mut self, start: usize) -> Result<(SyntaxTree, usize), ParseError> {
        let lines = self.lines;
        let mut i = start;

        while i < lines.len() {
            let raw = lines[i];
            if line::is_blank(raw) {
                i += 1;
                continue;
            }
            if self.balanced() && !line::opens_block(raw) {
                break;
            }

            self.step(line::classify(raw), i)?;
            i += 1;

            if self.balanced() {
                let next = lines[i..].iter().find(|l| !line::is_blank(l));
                if !next.is_some_and(|l| line::opens_block(l)) {
                    break;
                }
            }
        }

        if !self.balanced() {
            return Err(self.error(ParseReason::Unbalanced, i.saturating_sub(1)));
        }
        trace!(nodes = self.tree.len(), end = i, "block parsed");
        Ok((self.tree, i))
    }

    fn balanced(&self) -> bool {
        self.nest_balance == 0 && self.attach_balance == 0
    }

    fn top(&self) -> Frame {
        // the root frame is never popped: `close` refuses to pop it
        self.stack[self.stack.len() - 1]
    }

    fn error(&self, reason: ParseReason, idx: usize) -> ParseError {
        ParseError::at(reason, self.lines, idx)
    }

    fn step(&mut self, line: BlockLine<'_>, idx: usize) -> Result<(), ParseError> {
        let top = self.top();
        match line.kind {
            LineKind::OpenNest => {
                if line.level != top.level + 1 {
                    return Err(self.error(ParseReason::Indentation, idx));
                }
                self.nest_balance += 1;
                self.open(line, top.node, FrameKind::Nest);
            }
            LineKind::OpenAttach => {
                if line.level != top.level {
                    return Err(self.error(ParseReason::Indentation, idx));
                }
                self.attach_balance += 1;
                self.open(line, top.node, FrameKind::Attach);
            }
            LineKind::CloseNest => self.close(FrameKind::Nest, line.level, idx)?,
            LineKind::CloseAttach => self.close(FrameKind::Attach, line.level, idx)?,
            LineKind::Leaf => {
                if self.stack.len() <= 1 {
                    return Err(self.error(ParseReason::Unbalanced, idx));
                }
                if line.level != top.level {
                    return Err(self.error(ParseReason::Indentation, idx));
                }
                let data = NodeData {
                    text: line.body.to_string(),
                    level: line.level,
                    ..NodeData::default()
                };
                self.tree.insert_node(data, top.node);
            }
        }
        Ok(())
    }

    fn open(&mut self, line: BlockLine<'_>, parent: Index, kind: FrameKind) {
        let head = header::decode(line.body);
        let data = NodeData {
            tag: head.tag.to_string(),
            id: head.id,
            reference: head.reference,
            forward: head.forward,
            text: head.text.to_string(),
            level: line.level,
            ..NodeData::default()
        };
        let node = self.tree.insert_node(data, parent);
        self.stack.push(Frame {
            node,
            level: line.level,
            kind,
        });
    }

    fn close(&mut self, kind: FrameKind, level: usize, idx: usize) -> Result<(), ParseError> {
        if self.stack.len() <= 1 {
            return Err(self.error(ParseReason::Unbalanced, idx));
        }
        let top = self.top();
        if top.kind != kind {
            return Err(self.error(ParseReason::Unbalanced, idx));
        }
        if level != top.level {
            return Err(self.error(ParseReason::Indentation, idx));
        }

        let balance = match kind {
            FrameKind::Attach => &mut self.attach_balance,
            _ => &mut self.nest_balance,
        };
        match balance.checked_sub(1) {
            Some(b) => *balance = b,
            None => return Err(self.error(ParseReason::Unbalanced, idx)),
        }
        self.stack.pop();
        Ok(())
    }
}
