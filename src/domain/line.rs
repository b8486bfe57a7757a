//! Line classification for the analysis notation.
//!
//! A block line is a run of `~` depth markers followed by one of the four
//! bracket characters, or by plain text for a bare leaf:
//!
//! ```text
//! (IC1When
//! ~(DC2>1the rain stops,
//! ~)
//!  we leave.
//! )
//! ```

/// Repeated prefix character encoding depth.
pub const DEPTH_MARKER: char = '~';
/// First non-blank character of a comment line.
pub const COMMENT_MARKER: char = '#';

/// What a block line does to the parser stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    OpenNest,
    CloseNest,
    OpenAttach,
    CloseAttach,
    Leaf,
}

/// One block line after depth decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockLine<'a> {
    pub kind: LineKind,
    /// Number of depth markers plus one
    pub level: usize,
    /// Everything after the bracket character, or the whole remainder for leaves
    pub body: &'a str,
}

/// Decode the depth prefix and kind of a block line.
///
/// Nothing is trimmed: a leading space makes the line a bare leaf whose
/// text keeps the space.
pub fn classify(line: &str) -> BlockLine<'_> {
    let rest = line.trim_start_matches(DEPTH_MARKER);
    // the marker is one byte, so the byte difference is the marker count
    let level = line.len() - rest.len() + 1;

    let mut chars = rest.chars();
    let kind = match chars.next() {
        Some('(') => LineKind::OpenNest,
        Some(')') => LineKind::CloseNest,
        Some('[') => LineKind::OpenAttach,
        Some(']') => LineKind::CloseAttach,
        _ => LineKind::Leaf,
    };
    let body = match kind {
        LineKind::Leaf => rest,
        _ => chars.as_str(),
    };

    BlockLine { kind, level, body }
}

pub fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

pub fn is_comment(line: &str) -> bool {
    line.trim_start().starts_with(COMMENT_MARKER)
}

/// A sentence line is non-blank and does not start with a block character.
pub fn is_sentence(line: &str) -> bool {
    match line.trim().chars().next() {
        None => false,
        Some(c) => !matches!(c, '(' | '~' | ')' | '[' | ']'),
    }
}

/// True when the line opens a top-level nest block at column 0.
pub fn opens_block(line: &str) -> bool {
    line.starts_with('(')
}

/// A comment line, split into its numbered or unnumbered form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Comment<'a> {
    /// `#<digits> rest`: annotation for the node with that id
    Numbered { id: u64, text: &'a str },
    /// Any other comment: candidate for the record's root comment
    Plain(&'a str),
    /// Numbered comment whose id is too large for any node
    OutOfRange(&'a str),
}

/// Parse a comment line; None when the line is not a comment.
pub fn parse_comment(line: &str) -> Option<Comment<'_>> {
    let body = line.trim().strip_prefix(COMMENT_MARKER)?;

    let digits_end = body
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(body.len());
    if digits_end > 0 {
        let text = body[digits_end..].trim();
        return Some(match body[..digits_end].parse::<u64>() {
            Ok(id) => Comment::Numbered { id, text },
            Err(_) => Comment::OutOfRange(text),
        });
    }
    Some(Comment::Plain(body.trim()))
}
