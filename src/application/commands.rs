// src/application/commands.rs
//! Handlers for each [`EditorCommand`], run against a scratch [`EditContext`].
//!
//! A handler returns `false` when the command does not apply at the current
//! selection; the caller then discards the scratch copy.
use std::collections::BTreeSet;

use crate::domain::document::{add_mark, Step, TextBlockInfo};
use crate::domain::{
    Block, BlockType, Document, EditorCommand, Image, ListItem, ListKind, Mark, MarkKind, Position,
    Selection, TaskItem, TextAlign, TextBlock,
};

#[derive(Debug, Clone, PartialEq)]
pub struct EditContext {
    pub document: Document,
    pub selection: Selection,
    /// Marks the next typed text receives, set by toggling on a collapsed cursor.
    pub stored_marks: Option<BTreeSet<Mark>>,
}

impl EditContext {
    pub fn new(document: Document) -> Self {
        Self {
            document,
            selection: Selection::default(),
            stored_marks: None,
        }
    }
}

pub fn execute(command: &EditorCommand, ctx: &mut EditContext) -> bool {
    let applied = match command {
        EditorCommand::ToggleMark(kind) => toggle_mark(ctx, *kind),
        EditorCommand::SetBlock(kind) => set_block(ctx, *kind),
        EditorCommand::ToggleList(kind) => toggle_list(ctx, *kind),
        EditorCommand::ToggleBlockquote => toggle_blockquote(ctx),
        EditorCommand::ToggleTask => toggle_task(ctx),
        EditorCommand::InsertImage { src } => insert_image(ctx, src),
        EditorCommand::SetTextAlign(align) => set_text_align(ctx, *align),
        EditorCommand::SetLink(None) => false,
        EditorCommand::SetLink(Some(href)) if href.is_empty() => unset_link(ctx),
        EditorCommand::SetLink(Some(href)) => set_link(ctx, href),
        EditorCommand::InsertText(text) => insert_text(ctx, text),
        EditorCommand::SplitBlock => split_block(ctx),
        EditorCommand::Undo | EditorCommand::Redo => false,
    };
    if applied {
        ctx.selection = ctx.selection.clamp(&ctx.document);
    }
    applied
}

fn text_at<'a>(doc: &'a Document, info: &TextBlockInfo) -> Option<&'a TextBlock> {
    doc.container(&info.parent)?.get(info.index)?.text()
}

fn text_at_mut<'a>(doc: &'a mut Document, info: &TextBlockInfo) -> Option<&'a mut TextBlock> {
    doc.block_mut(info)?.text_mut()
}

/// Text blocks touched by the selection, paired with their ordinal.
fn selected<'a>(
    infos: &'a [TextBlockInfo],
    sel: &Selection,
) -> impl Iterator<Item = (usize, &'a TextBlockInfo)> + 'a {
    let first = sel.from().block;
    let last = sel.to().block;
    infos
        .iter()
        .enumerate()
        .skip(first)
        .take((last + 1).saturating_sub(first))
}

/// Non-empty char spans `(info, from, to)` covered by the selection.
fn selected_spans(doc: &Document, infos: &[TextBlockInfo], sel: &Selection) -> Vec<(TextBlockInfo, usize, usize)> {
    selected(infos, sel)
        .filter_map(|(ordinal, info)| {
            let len = text_at(doc, info)?.len();
            let (from, to) = sel.span_in(ordinal, len)?;
            (from < to).then(|| (info.clone(), from, to))
        })
        .collect()
}

fn split_block_path(path: &[Step]) -> Option<(&[Step], usize)> {
    match path.split_last()? {
        (Step::Block(index), rest) => Some((rest, *index)),
        _ => None,
    }
}

/// Path of the innermost list around a block and the item index within it.
fn innermost_item(parent: &[Step]) -> Option<(&[Step], usize)> {
    let pos = parent.iter().rposition(|s| matches!(s, Step::Item(_)))?;
    match parent[pos] {
        Step::Item(item) => Some((&parent[..pos], item)),
        Step::Block(_) => None,
    }
}

fn item_within(parent: &[Step], list_path: &[Step]) -> Option<usize> {
    if !parent.starts_with(list_path) {
        return None;
    }
    match parent.get(list_path.len()) {
        Some(Step::Item(item)) => Some(*item),
        _ => None,
    }
}

/// Position in `parent` of the step entering the innermost blockquote.
fn innermost_quote(parent: &[Step]) -> Option<usize> {
    let mut found = None;
    for (pos, step) in parent.iter().enumerate() {
        if matches!(step, Step::Block(_)) && !matches!(parent.get(pos + 1), Some(Step::Item(_))) {
            found = Some(pos);
        }
    }
    found
}

fn toggle_mark(ctx: &mut EditContext, kind: MarkKind) -> bool {
    let infos = ctx.document.text_blocks();
    let sel = ctx.selection;
    if selected(&infos, &sel).any(|(_, info)| info.kind == BlockType::CodeBlock) {
        return false;
    }
    let mark = Mark::Format(kind);
    let code = Mark::Format(MarkKind::Code);

    if sel.is_collapsed() {
        let Some(text) = infos.get(sel.head.block).and_then(|i| text_at(&ctx.document, i)) else {
            return false;
        };
        let mut marks = ctx
            .stored_marks
            .clone()
            .unwrap_or_else(|| text.marks_for_insert(sel.head.offset));
        if kind != MarkKind::Code && marks.contains(&code) {
            return false;
        }
        if !marks.remove(&mark) {
            add_mark(&mut marks, mark);
        }
        ctx.stored_marks = Some(marks);
        return true;
    }

    let spans = selected_spans(&ctx.document, &infos, &sel);
    let mut all_marked = true;
    let mut all_code = true;
    let mut any = false;
    for (info, from, to) in &spans {
        if let Some(text) = text_at(&ctx.document, info) {
            for marks in text.marks_in_range(*from, *to) {
                any = true;
                all_marked &= marks.contains(&mark);
                all_code &= marks.contains(&code);
            }
        }
    }
    if !any {
        return true;
    }
    if kind != MarkKind::Code && all_code {
        return false;
    }
    for (info, from, to) in &spans {
        if let Some(text) = text_at_mut(&mut ctx.document, info) {
            text.update_marks(*from, *to, |marks| {
                if all_marked {
                    marks.remove(&mark);
                } else {
                    add_mark(marks, mark.clone());
                }
            });
        }
    }
    ctx.stored_marks = None;
    true
}

fn set_block(ctx: &mut EditContext, kind: BlockType) -> bool {
    let infos = ctx.document.text_blocks();
    let targets: Vec<TextBlockInfo> = selected(&infos, &ctx.selection)
        .map(|(_, info)| info.clone())
        .collect();
    if targets.is_empty() {
        return false;
    }
    // list items must start with a paragraph
    if kind != BlockType::Paragraph && targets.iter().any(|info| info.leading_item().is_some()) {
        return false;
    }
    for info in &targets {
        if info.kind == kind {
            continue;
        }
        if let Some(block) = ctx.document.block_mut(info) {
            let text = block.text_mut().map(std::mem::take).unwrap_or_default();
            *block = Block::with_type(kind, text);
        }
    }
    if kind == BlockType::CodeBlock {
        ctx.stored_marks = None;
    }
    true
}

fn set_text_align(ctx: &mut EditContext, align: TextAlign) -> bool {
    let infos = ctx.document.text_blocks();
    let mut applied = false;
    for (_, info) in selected(&infos, &ctx.selection) {
        if info.kind == BlockType::CodeBlock {
            continue;
        }
        if let Some(text) = text_at_mut(&mut ctx.document, info) {
            text.align = Some(align);
            applied = true;
        }
    }
    applied
}

fn toggle_list(ctx: &mut EditContext, kind: ListKind) -> bool {
    let infos = ctx.document.text_blocks();
    let sel = ctx.selection;
    let (Some(first), Some(last)) = (infos.get(sel.from().block), infos.get(sel.to().block)) else {
        return false;
    };
    if selected(&infos, &sel).any(|(_, info)| info.kind == BlockType::CodeBlock) {
        return false;
    }

    if let Some((list_path, first_item)) = innermost_item(&first.parent) {
        if let Some(last_item) = item_within(&last.parent, list_path) {
            let Some((container, index)) = split_block_path(list_path) else {
                return false;
            };
            let current = ctx
                .document
                .container(container)
                .and_then(|blocks| blocks.get(index))
                .and_then(Block::list_kind);
            return if current == Some(kind) {
                lift_items(&mut ctx.document, container, index, first_item, last_item)
            } else {
                convert_list(&mut ctx.document, container, index, kind)
            };
        }
    }
    wrap_in_list(&mut ctx.document, first, last, kind)
}

fn wrap_in_list(doc: &mut Document, first: &TextBlockInfo, last: &TextBlockInfo, kind: ListKind) -> bool {
    if first.parent != last.parent {
        return false;
    }
    let Some(container) = doc.container_mut(&first.parent) else {
        return false;
    };
    let range = first.index..=last.index;
    let wrappable = container
        .get(range.clone())
        .is_some_and(|blocks| blocks.iter().all(|b| matches!(b, Block::Paragraph(_))));
    if !wrappable {
        return false;
    }
    let items = container.drain(range).map(|block| vec![block]).collect();
    container.insert(first.index, Block::list(kind, items));
    true
}

fn convert_list(doc: &mut Document, container: &[Step], index: usize, kind: ListKind) -> bool {
    let Some(slot) = doc.container_mut(container).and_then(|blocks| blocks.get_mut(index)) else {
        return false;
    };
    if slot.list_kind().is_none() {
        return false;
    }
    let list = std::mem::replace(slot, Block::BulletList(Vec::new()));
    if let Some(items) = list.into_list_items() {
        *slot = Block::list(kind, items);
    }
    true
}

fn partition<T>(mut items: Vec<T>, first: usize, last: usize) -> (Vec<T>, Vec<T>, Vec<T>) {
    if items.is_empty() {
        return (items, Vec::new(), Vec::new());
    }
    let last = last.min(items.len() - 1);
    let first = first.min(last);
    let after = items.split_off(last + 1);
    let lifted = items.split_off(first);
    (items, lifted, after)
}

fn non_empty<T>(items: Vec<T>, wrap: impl FnOnce(Vec<T>) -> Block) -> Option<Block> {
    (!items.is_empty()).then(|| wrap(items))
}

/// Splits a list into the part before `first`, the block content of items
/// `first..=last`, and the part after `last`.
fn split_list(list: Block, first: usize, last: usize) -> (Option<Block>, Vec<Block>, Option<Block>) {
    fn flatten(items: Vec<ListItem>) -> Vec<Block> {
        items.into_iter().flat_map(|item| item.blocks).collect()
    }
    match list {
        Block::BulletList(items) => {
            let (before, lifted, after) = partition(items, first, last);
            (
                non_empty(before, Block::BulletList),
                flatten(lifted),
                non_empty(after, Block::BulletList),
            )
        }
        Block::OrderedList(items) => {
            let (before, lifted, after) = partition(items, first, last);
            (
                non_empty(before, Block::OrderedList),
                flatten(lifted),
                non_empty(after, Block::OrderedList),
            )
        }
        Block::TaskList(items) => {
            let (before, lifted, after) = partition(items, first, last);
            (
                non_empty(before, Block::TaskList),
                lifted.into_iter().flat_map(|item| item.blocks).collect(),
                non_empty(after, Block::TaskList),
            )
        }
        other => (Some(other), Vec::new(), None),
    }
}

fn lift_items(doc: &mut Document, container: &[Step], index: usize, first: usize, last: usize) -> bool {
    let Some(blocks) = doc.container_mut(container) else {
        return false;
    };
    if index >= blocks.len() || blocks[index].list_kind().is_none() {
        return false;
    }
    let list = blocks.remove(index);
    let (before, lifted, after) = split_list(list, first, last);
    let tail = blocks.split_off(index);
    blocks.extend(before.into_iter().chain(lifted).chain(after));
    blocks.extend(tail);
    true
}

fn toggle_blockquote(ctx: &mut EditContext) -> bool {
    let infos = ctx.document.text_blocks();
    let sel = ctx.selection;
    let (Some(first), Some(last)) = (infos.get(sel.from().block), infos.get(sel.to().block)) else {
        return false;
    };

    if let Some(pos) = innermost_quote(&first.parent) {
        let quote_path = &first.parent[..=pos];
        if last.parent.starts_with(quote_path) {
            let Some((container, index)) = split_block_path(quote_path) else {
                return false;
            };
            return lift_quote(&mut ctx.document, container, index);
        }
    }

    let leads_item = first.index == 0 && matches!(first.parent.last(), Some(Step::Item(_)));
    if first.parent == last.parent && !leads_item {
        wrap_in_quote(&mut ctx.document, &first.parent, first.index, last.index)
    } else {
        wrap_in_quote(&mut ctx.document, &[], first.top(), last.top())
    }
}

fn wrap_in_quote(doc: &mut Document, parent: &[Step], start: usize, end: usize) -> bool {
    let Some(blocks) = doc.container_mut(parent) else {
        return false;
    };
    if start > end || end >= blocks.len() {
        return false;
    }
    let quoted: Vec<Block> = blocks.drain(start..=end).collect();
    blocks.insert(start, Block::Blockquote(quoted));
    true
}

fn lift_quote(doc: &mut Document, container: &[Step], index: usize) -> bool {
    let Some(blocks) = doc.container_mut(container) else {
        return false;
    };
    if !matches!(blocks.get(index), Some(Block::Blockquote(_))) {
        return false;
    }
    if let Block::Blockquote(children) = blocks.remove(index) {
        let tail = blocks.split_off(index);
        blocks.extend(children);
        blocks.extend(tail);
    }
    true
}

fn toggle_task(ctx: &mut EditContext) -> bool {
    let infos = ctx.document.text_blocks();
    let Some(path) = infos
        .get(ctx.selection.from().block)
        .and_then(|info| info.task_item.as_ref())
    else {
        return false;
    };
    match ctx.document.task_item_mut(path) {
        Some(item) => {
            item.checked = !item.checked;
            true
        }
        None => false,
    }
}

fn insert_image(ctx: &mut EditContext, src: &str) -> bool {
    let src = src.trim();
    if src.is_empty() {
        return false;
    }
    let infos = ctx.document.text_blocks();
    let sel = ctx.selection;
    let from = sel.from();
    let Some(info) = infos.get(from.block) else {
        return false;
    };
    if info.kind == BlockType::CodeBlock {
        return false;
    }
    if sel.is_single_block() && !sel.is_collapsed() {
        if let Some(text) = text_at_mut(&mut ctx.document, info) {
            text.delete_range(from.offset, sel.to().offset);
        }
    }

    let image = Block::Image(Image {
        src: src.to_string(),
        alt: String::new(),
        title: None,
    });
    let Some(blocks) = ctx.document.container_mut(&info.parent) else {
        return false;
    };
    let Some(text) = blocks.get_mut(info.index).and_then(Block::text_mut) else {
        return false;
    };
    let len = text.len();
    let offset = from.offset.min(len);
    // a list item keeps its leading paragraph
    if offset == 0 && info.leading_item().is_none() {
        blocks.insert(info.index, image);
        ctx.selection = Selection::cursor(Position::new(from.block, 0));
    } else if offset == 0 || offset == len {
        blocks.insert(info.index + 1, image);
        ctx.selection = Selection::cursor(Position::new(from.block, offset));
    } else {
        let tail = Block::with_type(info.kind, text.split_off(offset));
        blocks.insert(info.index + 1, image);
        blocks.insert(info.index + 2, tail);
        ctx.selection = Selection::cursor(Position::new(from.block + 1, 0));
    }
    true
}

fn unset_link(ctx: &mut EditContext) -> bool {
    let infos = ctx.document.text_blocks();
    let sel = ctx.selection;
    if let Some(marks) = ctx.stored_marks.as_mut() {
        marks.retain(|m| !m.is_link());
    }
    if sel.is_collapsed() {
        let Some(info) = infos.get(sel.head.block) else {
            return false;
        };
        if let Some(text) = text_at_mut(&mut ctx.document, info) {
            if let Some((from, to, _)) = text.link_extent(sel.head.offset) {
                text.update_marks(from, to, |marks| marks.retain(|m| !m.is_link()));
            }
        }
        return true;
    }
    for (info, from, to) in selected_spans(&ctx.document, &infos, &sel) {
        if let Some(text) = text_at_mut(&mut ctx.document, &info) {
            text.update_marks(from, to, |marks| marks.retain(|m| !m.is_link()));
        }
    }
    true
}

fn set_link(ctx: &mut EditContext, href: &str) -> bool {
    let infos = ctx.document.text_blocks();
    let sel = ctx.selection;
    if selected(&infos, &sel).any(|(_, info)| info.kind == BlockType::CodeBlock) {
        return false;
    }
    let link = Mark::link(href);

    if sel.is_collapsed() {
        let Some(info) = infos.get(sel.head.block) else {
            return false;
        };
        let Some(text) = text_at_mut(&mut ctx.document, info) else {
            return false;
        };
        if let Some((from, to, _)) = text.link_extent(sel.head.offset) {
            text.update_marks(from, to, |marks| add_mark(marks, link.clone()));
            return true;
        }
        let mut marks = ctx
            .stored_marks
            .clone()
            .unwrap_or_else(|| text.marks_for_insert(sel.head.offset));
        if marks.contains(&Mark::Format(MarkKind::Code)) {
            return false;
        }
        add_mark(&mut marks, link);
        ctx.stored_marks = Some(marks);
        return true;
    }

    for (info, from, to) in selected_spans(&ctx.document, &infos, &sel) {
        if let Some(text) = text_at_mut(&mut ctx.document, &info) {
            text.update_marks(from, to, |marks| add_mark(marks, link.clone()));
        }
    }
    true
}

fn insert_text(ctx: &mut EditContext, input: &str) -> bool {
    let sel = ctx.selection;
    if input.is_empty() || !sel.is_single_block() {
        return false;
    }
    let infos = ctx.document.text_blocks();
    let (from, to) = (sel.from(), sel.to());
    let Some(info) = infos.get(from.block) else {
        return false;
    };
    let stored = ctx.stored_marks.take();
    let Some(text) = text_at_mut(&mut ctx.document, info) else {
        return false;
    };
    text.delete_range(from.offset, to.offset);
    let marks = if info.kind == BlockType::CodeBlock {
        BTreeSet::new()
    } else {
        stored.unwrap_or_else(|| text.marks_for_insert(from.offset))
    };
    text.insert_text(from.offset, input, marks);
    ctx.selection = Selection::cursor(Position::new(
        from.block,
        from.offset + input.chars().count(),
    ));
    true
}

fn split_block(ctx: &mut EditContext) -> bool {
    let sel = ctx.selection;
    if !sel.is_single_block() {
        return false;
    }
    let infos = ctx.document.text_blocks();
    let (from, to) = (sel.from(), sel.to());
    let Some(info) = infos.get(from.block) else {
        return false;
    };
    let Some(text) = text_at_mut(&mut ctx.document, info) else {
        return false;
    };
    text.delete_range(from.offset, to.offset);
    let offset = from.offset.min(text.len());

    if info.kind == BlockType::CodeBlock {
        text.insert_text(offset, "\n", BTreeSet::new());
        ctx.selection = Selection::cursor(Position::new(from.block, offset + 1));
        return true;
    }

    if let Some((list_path, item)) = info.leading_item() {
        let empty = text.is_empty();
        let Some((container, index)) = split_block_path(list_path) else {
            return false;
        };
        if empty {
            // Enter on an empty item leaves the list
            ctx.selection = Selection::cursor(Position::new(from.block, 0));
            return lift_items(&mut ctx.document, container, index, item, item);
        }
        if !split_item(&mut ctx.document, container, index, item, offset) {
            return false;
        }
        ctx.selection = Selection::cursor(Position::new(from.block + 1, 0));
        return true;
    }

    let at_end = offset >= text.len();
    let tail = text.split_off(offset);
    let kind = match info.kind {
        BlockType::Heading(_) if at_end => BlockType::Paragraph,
        other => other,
    };
    let Some(blocks) = ctx.document.container_mut(&info.parent) else {
        return false;
    };
    blocks.insert(info.index + 1, Block::with_type(kind, tail));
    ctx.selection = Selection::cursor(Position::new(from.block + 1, 0));
    true
}

/// Moves the text after `offset` and the remaining blocks of the item into a
/// new item directly after it.
fn split_item_blocks(blocks: &mut Vec<Block>, offset: usize) -> Option<Vec<Block>> {
    if blocks.is_empty() {
        return None;
    }
    let mut rest = blocks.split_off(1);
    let head = blocks.first_mut()?;
    let kind = head.block_type()?;
    let tail = head.text_mut()?.split_off(offset);
    rest.insert(0, Block::with_type(kind, tail));
    Some(rest)
}

fn split_item(doc: &mut Document, container: &[Step], index: usize, item: usize, offset: usize) -> bool {
    let Some(list) = doc.container_mut(container).and_then(|blocks| blocks.get_mut(index)) else {
        return false;
    };
    match list {
        Block::BulletList(items) | Block::OrderedList(items) => {
            let Some(rest) = items.get_mut(item).and_then(|i| split_item_blocks(&mut i.blocks, offset))
            else {
                return false;
            };
            items.insert(item + 1, ListItem { blocks: rest });
        }
        Block::TaskList(items) => {
            let Some(rest) = items.get_mut(item).and_then(|i| split_item_blocks(&mut i.blocks, offset))
            else {
                return false;
            };
            items.insert(
                item + 1,
                TaskItem {
                    checked: false,
                    blocks: rest,
                },
            );
        }
        _ => return false,
    }
    true
}
