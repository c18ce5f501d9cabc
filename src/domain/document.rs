// src/domain/document.rs
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::wire::WireNode;
use crate::domain::DomainError;

/// Formatting marks that can be toggled on a text range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MarkKind {
    Bold,
    Italic,
    Underline,
    Strike,
    Code,
    Superscript,
    Subscript,
}

impl MarkKind {
    pub const ALL: [MarkKind; 7] = [
        MarkKind::Bold,
        MarkKind::Italic,
        MarkKind::Underline,
        MarkKind::Strike,
        MarkKind::Code,
        MarkKind::Superscript,
        MarkKind::Subscript,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MarkKind::Bold => "bold",
            MarkKind::Italic => "italic",
            MarkKind::Underline => "underline",
            MarkKind::Strike => "strike",
            MarkKind::Code => "code",
            MarkKind::Superscript => "superscript",
            MarkKind::Subscript => "subscript",
        }
    }
}

impl FromStr for MarkKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MarkKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| DomainError::MalformedDocument(format!("unknown mark: {s}")))
    }
}

/// Inline mark attached to a text run.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Mark {
    Format(MarkKind),
    Link { href: String },
}

impl Mark {
    pub fn link(href: impl Into<String>) -> Self {
        Mark::Link { href: href.into() }
    }

    pub fn is_link(&self) -> bool {
        matches!(self, Mark::Link { .. })
    }
}

/// Adds `mark` to `marks`, honouring mark exclusions.
///
/// `code` excludes every other mark, superscript and subscript exclude each
/// other, and a run carries at most one link.
pub fn add_mark(marks: &mut BTreeSet<Mark>, mark: Mark) {
    match &mark {
        Mark::Format(MarkKind::Code) => marks.clear(),
        _ if marks.contains(&Mark::Format(MarkKind::Code)) => return,
        Mark::Format(MarkKind::Superscript) => {
            marks.remove(&Mark::Format(MarkKind::Subscript));
        }
        Mark::Format(MarkKind::Subscript) => {
            marks.remove(&Mark::Format(MarkKind::Superscript));
        }
        Mark::Link { .. } => marks.retain(|m| !m.is_link()),
        Mark::Format(_) => {}
    }
    marks.insert(mark);
}

pub fn link_href(marks: &BTreeSet<Mark>) -> Option<&str> {
    marks.iter().find_map(|m| match m {
        Mark::Link { href } => Some(href.as_str()),
        Mark::Format(_) => None,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TextAlign {
    Left,
    Center,
    Right,
    Justify,
}

impl TextAlign {
    pub const ALL: [TextAlign; 4] = [
        TextAlign::Left,
        TextAlign::Center,
        TextAlign::Right,
        TextAlign::Justify,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
            TextAlign::Justify => "justify",
        }
    }
}

impl FromStr for TextAlign {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TextAlign::ALL
            .into_iter()
            .find(|align| align.as_str() == s)
            .ok_or_else(|| DomainError::MalformedDocument(format!("unknown alignment: {s}")))
    }
}

impl fmt::Display for TextAlign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
}

impl HeadingLevel {
    pub const ALL: [HeadingLevel; 3] = [HeadingLevel::H1, HeadingLevel::H2, HeadingLevel::H3];

    /// Levels outside 1..=3 are clamped into range.
    pub fn clamped(level: u64) -> Self {
        match level {
            0 | 1 => HeadingLevel::H1,
            2 => HeadingLevel::H2,
            _ => HeadingLevel::H3,
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            HeadingLevel::H1 => 1,
            HeadingLevel::H2 => 2,
            HeadingLevel::H3 => 3,
        }
    }
}

/// Type of the text-bearing block the cursor sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BlockType {
    Paragraph,
    Heading(HeadingLevel),
    CodeBlock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ListKind {
    Bullet,
    Ordered,
    Task,
}

/// Block containers that can enclose a text block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ContainerKind {
    BulletList,
    OrderedList,
    TaskList,
    Blockquote,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextRun {
    pub text: String,
    pub marks: BTreeSet<Mark>,
}

impl TextRun {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            marks: BTreeSet::new(),
        }
    }

    pub fn marked(text: impl Into<String>, marks: impl IntoIterator<Item = Mark>) -> Self {
        Self {
            text: text.into(),
            marks: marks.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

fn byte_index(s: &str, char_offset: usize) -> usize {
    s.char_indices()
        .nth(char_offset)
        .map_or(s.len(), |(idx, _)| idx)
}

/// Inline content of a paragraph, heading or code block.
///
/// Runs are kept normalized: no empty runs and no two adjacent runs with the
/// same marks. Offsets are counted in chars.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextBlock {
    pub align: Option<TextAlign>,
    pub runs: Vec<TextRun>,
}

impl TextBlock {
    pub fn from_runs(runs: Vec<TextRun>) -> Self {
        let mut block = Self { align: None, runs };
        block.normalize();
        block
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::from_runs(vec![TextRun::plain(text)])
    }

    pub fn with_align(mut self, align: TextAlign) -> Self {
        self.align = Some(align);
        self
    }

    pub fn len(&self) -> usize {
        self.runs.iter().map(TextRun::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.iter().all(TextRun::is_empty)
    }

    pub fn plain_text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    pub fn normalize(&mut self) {
        let mut merged: Vec<TextRun> = Vec::with_capacity(self.runs.len());
        for run in self.runs.drain(..) {
            if run.text.is_empty() {
                continue;
            }
            match merged.last_mut() {
                Some(last) if last.marks == run.marks => last.text.push_str(&run.text),
                _ => merged.push(run),
            }
        }
        self.runs = merged;
    }

    /// Drops every mark; code blocks hold plain text only.
    pub fn strip_marks(&mut self) {
        for run in &mut self.runs {
            run.marks.clear();
        }
        self.normalize();
    }

    /// Ensures a run boundary at `offset` and returns the index of the run
    /// starting there.
    fn split_runs_at(&mut self, offset: usize) -> usize {
        let mut pos = 0;
        for i in 0..self.runs.len() {
            if offset == pos {
                return i;
            }
            let len = self.runs[i].len();
            if offset < pos + len {
                let cut = byte_index(&self.runs[i].text, offset - pos);
                let tail = self.runs[i].text.split_off(cut);
                let marks = self.runs[i].marks.clone();
                self.runs.insert(i + 1, TextRun { text: tail, marks });
                return i + 1;
            }
            pos += len;
        }
        self.runs.len()
    }

    /// Applies `f` to the marks of every run inside `from..to`.
    pub fn update_marks(&mut self, from: usize, to: usize, mut f: impl FnMut(&mut BTreeSet<Mark>)) {
        if from >= to {
            return;
        }
        let start = self.split_runs_at(from);
        let end = self.split_runs_at(to);
        for run in &mut self.runs[start..end] {
            f(&mut run.marks);
        }
        self.normalize();
    }

    /// Mark sets of the runs overlapping `from..to`.
    pub fn marks_in_range(&self, from: usize, to: usize) -> Vec<&BTreeSet<Mark>> {
        let mut pos = 0;
        let mut out = Vec::new();
        for run in &self.runs {
            let len = run.len();
            if pos < to && pos + len > from {
                out.push(&run.marks);
            }
            pos += len;
        }
        out
    }

    /// Marks of the char at `index`, if any.
    pub fn marks_of_char(&self, index: usize) -> Option<&BTreeSet<Mark>> {
        let mut pos = 0;
        for run in &self.runs {
            let len = run.len();
            if index < pos + len {
                return Some(&run.marks);
            }
            pos += len;
        }
        None
    }

    /// Marks in effect at a cursor: those of the char before it, or of the
    /// first char when the cursor is at the start.
    pub fn marks_at(&self, offset: usize) -> BTreeSet<Mark> {
        let index = offset.saturating_sub(1);
        self.marks_of_char(index).cloned().unwrap_or_default()
    }

    /// Marks new text typed at `offset` inherits. Links only continue when the
    /// cursor sits strictly inside them.
    pub fn marks_for_insert(&self, offset: usize) -> BTreeSet<Mark> {
        let mut marks = self.marks_at(offset);
        let before = offset.checked_sub(1).and_then(|i| self.marks_of_char(i));
        let after = self.marks_of_char(offset);
        let inside_link = match (before.and_then(link_href), after.and_then(link_href)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        };
        if !inside_link {
            marks.retain(|m| !m.is_link());
        }
        marks
    }

    /// Extent `(from, to, href)` of the link touching the cursor.
    pub fn link_extent(&self, offset: usize) -> Option<(usize, usize, String)> {
        let prev = offset.saturating_sub(1);
        let href = link_href(self.marks_of_char(prev)?)?.to_string();

        let mut spans = Vec::with_capacity(self.runs.len());
        let mut pos = 0;
        for run in &self.runs {
            let len = run.len();
            spans.push((pos, pos + len, link_href(&run.marks) == Some(href.as_str())));
            pos += len;
        }
        let hit = spans.iter().position(|&(s, e, _)| prev >= s && prev < e)?;
        let mut first = hit;
        while first > 0 && spans[first - 1].2 {
            first -= 1;
        }
        let mut last = hit;
        while last + 1 < spans.len() && spans[last + 1].2 {
            last += 1;
        }
        Some((spans[first].0, spans[last].1, href))
    }

    pub fn insert_text(&mut self, offset: usize, text: &str, marks: BTreeSet<Mark>) {
        let at = self.split_runs_at(offset.min(self.len()));
        self.runs.insert(
            at,
            TextRun {
                text: text.to_string(),
                marks,
            },
        );
        self.normalize();
    }

    pub fn delete_range(&mut self, from: usize, to: usize) {
        if from >= to {
            return;
        }
        let start = self.split_runs_at(from);
        let end = self.split_runs_at(to);
        self.runs.drain(start..end);
        self.normalize();
    }

    /// Splits at `offset`, keeping the head in `self` and returning the tail
    /// with the same alignment.
    pub fn split_off(&mut self, offset: usize) -> TextBlock {
        let at = self.split_runs_at(offset);
        let tail = self.runs.split_off(at);
        self.normalize();
        let mut block = TextBlock {
            align: self.align,
            runs: tail,
        };
        block.normalize();
        block
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListItem {
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskItem {
    pub checked: bool,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub src: String,
    pub alt: String,
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Paragraph(TextBlock),
    Heading {
        level: HeadingLevel,
        text: TextBlock,
    },
    CodeBlock {
        language: Option<String>,
        text: TextBlock,
    },
    BulletList(Vec<ListItem>),
    OrderedList(Vec<ListItem>),
    TaskList(Vec<TaskItem>),
    Blockquote(Vec<Block>),
    Image(Image),
}

impl Block {
    pub fn paragraph(text: impl Into<String>) -> Self {
        Block::Paragraph(TextBlock::plain(text))
    }

    pub fn heading(level: HeadingLevel, text: impl Into<String>) -> Self {
        Block::Heading {
            level,
            text: TextBlock::plain(text),
        }
    }

    pub fn block_type(&self) -> Option<BlockType> {
        match self {
            Block::Paragraph(_) => Some(BlockType::Paragraph),
            Block::Heading { level, .. } => Some(BlockType::Heading(*level)),
            Block::CodeBlock { .. } => Some(BlockType::CodeBlock),
            _ => None,
        }
    }

    pub fn text(&self) -> Option<&TextBlock> {
        match self {
            Block::Paragraph(text) | Block::Heading { text, .. } | Block::CodeBlock { text, .. } => {
                Some(text)
            }
            _ => None,
        }
    }

    pub fn text_mut(&mut self) -> Option<&mut TextBlock> {
        match self {
            Block::Paragraph(text) | Block::Heading { text, .. } | Block::CodeBlock { text, .. } => {
                Some(text)
            }
            _ => None,
        }
    }

    /// Builds a text block of `kind` around `text`.
    pub fn with_type(kind: BlockType, mut text: TextBlock) -> Self {
        match kind {
            BlockType::Paragraph => Block::Paragraph(text),
            BlockType::Heading(level) => Block::Heading { level, text },
            BlockType::CodeBlock => {
                text.align = None;
                text.strip_marks();
                Block::CodeBlock {
                    language: None,
                    text,
                }
            }
        }
    }

    pub fn list(kind: ListKind, items: Vec<Vec<Block>>) -> Self {
        match kind {
            ListKind::Bullet => {
                Block::BulletList(items.into_iter().map(|blocks| ListItem { blocks }).collect())
            }
            ListKind::Ordered => {
                Block::OrderedList(items.into_iter().map(|blocks| ListItem { blocks }).collect())
            }
            ListKind::Task => Block::TaskList(
                items
                    .into_iter()
                    .map(|blocks| TaskItem {
                        checked: false,
                        blocks,
                    })
                    .collect(),
            ),
        }
    }

    pub fn list_kind(&self) -> Option<ListKind> {
        match self {
            Block::BulletList(_) => Some(ListKind::Bullet),
            Block::OrderedList(_) => Some(ListKind::Ordered),
            Block::TaskList(_) => Some(ListKind::Task),
            _ => None,
        }
    }

    /// Block contents of each item when this is a list.
    pub fn into_list_items(self) -> Option<Vec<Vec<Block>>> {
        match self {
            Block::BulletList(items) | Block::OrderedList(items) => {
                Some(items.into_iter().map(|item| item.blocks).collect())
            }
            Block::TaskList(items) => Some(items.into_iter().map(|item| item.blocks).collect()),
            _ => None,
        }
    }
}

/// One step on the path from the document root to a block container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Index of a block within the current container.
    Block(usize),
    /// Index of an item within the list block selected by the previous step.
    Item(usize),
}

/// Location of a text-bearing block, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBlockInfo {
    pub parent: Vec<Step>,
    pub index: usize,
    pub kind: BlockType,
    pub ancestors: Vec<ContainerKind>,
    /// Path to the innermost task item enclosing the block.
    pub task_item: Option<Vec<Step>>,
}

impl TextBlockInfo {
    /// Index of the top-level block containing this text block.
    pub fn top(&self) -> usize {
        match self.parent.first() {
            Some(Step::Block(i)) => *i,
            _ => self.index,
        }
    }

    /// `(list path, item index)` when the block is the first child of a list item.
    pub fn leading_item(&self) -> Option<(&[Step], usize)> {
        if self.index != 0 {
            return None;
        }
        match self.parent.split_last() {
            Some((Step::Item(item), list_path)) => Some((list_path, *item)),
            _ => None,
        }
    }
}

/// Structured note content: an ordered tree of blocks below a single root.
///
/// Serializes through [`WireNode`], rooted at a `document` node.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "WireNode", into = "WireNode")]
pub struct Document {
    pub blocks: Vec<Block>,
}

impl Document {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    /// Every paragraph, heading and code block in document order.
    pub fn text_blocks(&self) -> Vec<TextBlockInfo> {
        let mut out = Vec::new();
        collect_text_blocks(
            &self.blocks,
            &mut Vec::new(),
            &mut Vec::new(),
            &mut None,
            &mut out,
        );
        out
    }

    pub fn text_block_count(&self) -> usize {
        self.text_blocks().len()
    }

    pub fn container(&self, parent: &[Step]) -> Option<&Vec<Block>> {
        let mut blocks = &self.blocks;
        let mut steps = parent.iter();
        while let Some(step) = steps.next() {
            let Step::Block(i) = *step else {
                return None;
            };
            blocks = match blocks.get(i)? {
                Block::Blockquote(children) => children,
                Block::BulletList(items) | Block::OrderedList(items) => {
                    let Some(Step::Item(j)) = steps.next() else {
                        return None;
                    };
                    &items.get(*j)?.blocks
                }
                Block::TaskList(items) => {
                    let Some(Step::Item(j)) = steps.next() else {
                        return None;
                    };
                    &items.get(*j)?.blocks
                }
                _ => return None,
            };
        }
        Some(blocks)
    }

    pub fn container_mut(&mut self, parent: &[Step]) -> Option<&mut Vec<Block>> {
        let mut blocks = &mut self.blocks;
        let mut steps = parent.iter();
        while let Some(step) = steps.next() {
            let Step::Block(i) = *step else {
                return None;
            };
            blocks = match blocks.get_mut(i)? {
                Block::Blockquote(children) => children,
                Block::BulletList(items) | Block::OrderedList(items) => {
                    let Some(Step::Item(j)) = steps.next() else {
                        return None;
                    };
                    &mut items.get_mut(*j)?.blocks
                }
                Block::TaskList(items) => {
                    let Some(Step::Item(j)) = steps.next() else {
                        return None;
                    };
                    &mut items.get_mut(*j)?.blocks
                }
                _ => return None,
            };
        }
        Some(blocks)
    }

    pub fn block_mut(&mut self, info: &TextBlockInfo) -> Option<&mut Block> {
        self.container_mut(&info.parent)?.get_mut(info.index)
    }

    pub fn text_block(&self, ordinal: usize) -> Option<&TextBlock> {
        let info = self.text_blocks().into_iter().nth(ordinal)?;
        self.container(&info.parent)?.get(info.index)?.text()
    }

    /// Task item at `path`, where the path ends with the item step.
    pub fn task_item_mut(&mut self, path: &[Step]) -> Option<&mut TaskItem> {
        let (Step::Item(item), rest) = path.split_last()? else {
            return None;
        };
        let (Step::Block(list), parent) = rest.split_last()? else {
            return None;
        };
        match self.container_mut(parent)?.get_mut(*list)? {
            Block::TaskList(items) => items.get_mut(*item),
            _ => None,
        }
    }

    pub fn task_item(&self, path: &[Step]) -> Option<&TaskItem> {
        let (Step::Item(item), rest) = path.split_last()? else {
            return None;
        };
        let (Step::Block(list), parent) = rest.split_last()? else {
            return None;
        };
        match self.container(parent)?.get(*list)? {
            Block::TaskList(items) => items.get(*item),
            _ => None,
        }
    }

    /// Plain text of every text block, one per line.
    pub fn plain_text(&self) -> String {
        self.text_blocks()
            .iter()
            .filter_map(|info| self.container(&info.parent)?.get(info.index)?.text())
            .map(TextBlock::plain_text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// First non-empty line of text, trimmed.
    pub fn first_line(&self) -> String {
        self.plain_text()
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or("")
            .to_string()
    }
}

fn collect_text_blocks(
    blocks: &[Block],
    parent: &mut Vec<Step>,
    ancestors: &mut Vec<ContainerKind>,
    task_item: &mut Option<Vec<Step>>,
    out: &mut Vec<TextBlockInfo>,
) {
    for (i, block) in blocks.iter().enumerate() {
        match block {
            Block::Paragraph(_) | Block::Heading { .. } | Block::CodeBlock { .. } => {
                if let Some(kind) = block.block_type() {
                    out.push(TextBlockInfo {
                        parent: parent.clone(),
                        index: i,
                        kind,
                        ancestors: ancestors.clone(),
                        task_item: task_item.clone(),
                    });
                }
            }
            Block::Blockquote(children) => {
                parent.push(Step::Block(i));
                ancestors.push(ContainerKind::Blockquote);
                collect_text_blocks(children, parent, ancestors, task_item, out);
                ancestors.pop();
                parent.pop();
            }
            Block::BulletList(items) | Block::OrderedList(items) => {
                let kind = if matches!(block, Block::BulletList(_)) {
                    ContainerKind::BulletList
                } else {
                    ContainerKind::OrderedList
                };
                for (j, item) in items.iter().enumerate() {
                    parent.push(Step::Block(i));
                    parent.push(Step::Item(j));
                    ancestors.push(kind);
                    collect_text_blocks(&item.blocks, parent, ancestors, task_item, out);
                    ancestors.pop();
                    parent.truncate(parent.len() - 2);
                }
            }
            Block::TaskList(items) => {
                for (j, item) in items.iter().enumerate() {
                    parent.push(Step::Block(i));
                    parent.push(Step::Item(j));
                    ancestors.push(ContainerKind::TaskList);
                    let outer = task_item.replace(parent.clone());
                    collect_text_blocks(&item.blocks, parent, ancestors, task_item, out);
                    *task_item = outer;
                    ancestors.pop();
                    parent.truncate(parent.len() - 2);
                }
            }
            Block::Image(_) => {}
        }
    }
}
