// src/domain/selection.rs
use std::fmt;

use crate::domain::Document;

/// A cursor location: the ordinal of a text block in document order and a
/// char offset inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    pub block: usize,
    pub offset: usize,
}

impl Position {
    pub fn new(block: usize, offset: usize) -> Self {
        Self { block, offset }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.block, self.offset)
    }
}

/// Anchor is where the selection started, head where it ends; head may come
/// before anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Selection {
    pub anchor: Position,
    pub head: Position,
}

impl Selection {
    pub fn cursor(at: Position) -> Self {
        Self {
            anchor: at,
            head: at,
        }
    }

    pub fn range(anchor: Position, head: Position) -> Self {
        Self { anchor, head }
    }

    pub fn from(&self) -> Position {
        self.anchor.min(self.head)
    }

    pub fn to(&self) -> Position {
        self.anchor.max(self.head)
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.head
    }

    /// Both ends in the same text block.
    pub fn is_single_block(&self) -> bool {
        self.anchor.block == self.head.block
    }

    /// Pulls both ends into the bounds of `doc`.
    pub fn clamp(self, doc: &Document) -> Self {
        Self {
            anchor: clamp_position(self.anchor, doc),
            head: clamp_position(self.head, doc),
        }
    }

    /// Char range covered inside text block `block`, if any.
    pub fn span_in(&self, block: usize, len: usize) -> Option<(usize, usize)> {
        let (from, to) = (self.from(), self.to());
        if block < from.block || block > to.block {
            return None;
        }
        let start = if block == from.block { from.offset } else { 0 };
        let end = if block == to.block { to.offset } else { len };
        Some((start.min(len), end.min(len)))
    }
}

fn clamp_position(pos: Position, doc: &Document) -> Position {
    let count = doc.text_block_count();
    if count == 0 {
        return Position::default();
    }
    let block = pos.block.min(count - 1);
    let len = doc.text_block(block).map_or(0, |text| text.len());
    Position::new(block, pos.offset.min(len))
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_collapsed() {
            write!(f, "{}", self.head)
        } else {
            write!(f, "{}..{}", self.anchor, self.head)
        }
    }
}
