// src/application/projector.rs
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::application::dispatcher::CommandDispatcher;
use crate::domain::document::link_href;
use crate::domain::{
    BlockType, ContainerKind, Document, EditorCommand, HeadingLevel, ListKind, Mark, MarkKind,
    Selection, TextAlign,
};

/// Controls a toolbar exposes; each maps to a trial command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ToolbarAction {
    Mark(MarkKind),
    Paragraph,
    Heading(HeadingLevel),
    CodeBlock,
    List(ListKind),
    Blockquote,
    ToggleTask,
    Align(TextAlign),
    Link,
    Unlink,
    InsertImage,
    Undo,
    Redo,
}

impl ToolbarAction {
    pub fn all() -> Vec<ToolbarAction> {
        let mut actions: Vec<_> = MarkKind::ALL.into_iter().map(ToolbarAction::Mark).collect();
        actions.push(ToolbarAction::Paragraph);
        actions.extend(HeadingLevel::ALL.into_iter().map(ToolbarAction::Heading));
        actions.push(ToolbarAction::CodeBlock);
        actions.extend(
            [ListKind::Bullet, ListKind::Ordered, ListKind::Task]
                .into_iter()
                .map(ToolbarAction::List),
        );
        actions.extend([ToolbarAction::Blockquote, ToolbarAction::ToggleTask]);
        actions.extend(TextAlign::ALL.into_iter().map(ToolbarAction::Align));
        actions.extend([
            ToolbarAction::Link,
            ToolbarAction::Unlink,
            ToolbarAction::InsertImage,
            ToolbarAction::Undo,
            ToolbarAction::Redo,
        ]);
        actions
    }

    /// Command used to test whether the action is enabled.
    pub fn trial_command(self) -> EditorCommand {
        match self {
            ToolbarAction::Mark(kind) => EditorCommand::ToggleMark(kind),
            ToolbarAction::Paragraph => EditorCommand::SetBlock(BlockType::Paragraph),
            ToolbarAction::Heading(level) => EditorCommand::SetBlock(BlockType::Heading(level)),
            ToolbarAction::CodeBlock => EditorCommand::SetBlock(BlockType::CodeBlock),
            ToolbarAction::List(kind) => EditorCommand::ToggleList(kind),
            ToolbarAction::Blockquote => EditorCommand::ToggleBlockquote,
            ToolbarAction::ToggleTask => EditorCommand::ToggleTask,
            ToolbarAction::Align(align) => EditorCommand::SetTextAlign(align),
            ToolbarAction::Link => EditorCommand::SetLink(Some("https://".to_string())),
            ToolbarAction::Unlink => EditorCommand::SetLink(Some(String::new())),
            ToolbarAction::InsertImage => EditorCommand::InsertImage {
                src: "data:,".to_string(),
            },
            ToolbarAction::Undo => EditorCommand::Undo,
            ToolbarAction::Redo => EditorCommand::Redo,
        }
    }
}

impl fmt::Display for ToolbarAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolbarAction::Mark(kind) => f.write_str(kind.as_str()),
            ToolbarAction::Paragraph => f.write_str("paragraph"),
            ToolbarAction::Heading(level) => write!(f, "heading{}", level.as_u8()),
            ToolbarAction::CodeBlock => f.write_str("codeBlock"),
            ToolbarAction::List(ListKind::Bullet) => f.write_str("bulletList"),
            ToolbarAction::List(ListKind::Ordered) => f.write_str("orderedList"),
            ToolbarAction::List(ListKind::Task) => f.write_str("taskList"),
            ToolbarAction::Blockquote => f.write_str("blockquote"),
            ToolbarAction::ToggleTask => f.write_str("task"),
            ToolbarAction::Align(align) => write!(f, "align-{align}"),
            ToolbarAction::Link => f.write_str("link"),
            ToolbarAction::Unlink => f.write_str("unlink"),
            ToolbarAction::InsertImage => f.write_str("image"),
            ToolbarAction::Undo => f.write_str("undo"),
            ToolbarAction::Redo => f.write_str("redo"),
        }
    }
}

/// Formatting state at the selection, for toolbar rendering.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EditorState {
    pub active_marks: BTreeSet<MarkKind>,
    pub link_href: Option<String>,
    /// Type of the block holding the selection head.
    pub active_block: Option<BlockType>,
    /// Containers around the selection head, outermost first.
    pub containers: Vec<ContainerKind>,
    pub text_align: Option<TextAlign>,
    /// Checked flag of the enclosing task item.
    pub task_checked: Option<bool>,
    pub can_undo: bool,
    pub can_redo: bool,
    pub enabled: BTreeMap<ToolbarAction, bool>,
}

impl EditorState {
    pub fn can(&self, action: ToolbarAction) -> bool {
        self.enabled.get(&action).copied().unwrap_or(false)
    }

    pub fn is_active(&self, action: ToolbarAction) -> bool {
        match action {
            ToolbarAction::Mark(kind) => self.active_marks.contains(&kind),
            ToolbarAction::Paragraph => self.active_block == Some(BlockType::Paragraph),
            ToolbarAction::Heading(level) => self.active_block == Some(BlockType::Heading(level)),
            ToolbarAction::CodeBlock => self.active_block == Some(BlockType::CodeBlock),
            ToolbarAction::List(kind) => self.containers.contains(&container_of(kind)),
            ToolbarAction::Blockquote => self.containers.contains(&ContainerKind::Blockquote),
            ToolbarAction::ToggleTask => self.task_checked == Some(true),
            ToolbarAction::Align(align) => self.text_align == Some(align),
            ToolbarAction::Link => self.link_href.is_some(),
            ToolbarAction::Unlink | ToolbarAction::InsertImage => false,
            ToolbarAction::Undo | ToolbarAction::Redo => false,
        }
    }
}

fn container_of(kind: ListKind) -> ContainerKind {
    match kind {
        ListKind::Bullet => ContainerKind::BulletList,
        ListKind::Ordered => ContainerKind::OrderedList,
        ListKind::Task => ContainerKind::TaskList,
    }
}

/// Projects the dispatcher into toolbar state.
///
/// Formatting comes from [`project_document`]. On top of that, the history
/// flags read the undo stacks and `enabled` dry-runs each action's trial
/// command against the live dispatcher.
pub fn project(dispatcher: &CommandDispatcher) -> EditorState {
    let mut state = project_document(
        dispatcher.document(),
        dispatcher.selection(),
        dispatcher.stored_marks(),
    );
    state.can_undo = dispatcher.can_undo();
    state.can_redo = dispatcher.can_redo();
    state.enabled = ToolbarAction::all()
        .into_iter()
        .map(|action| (action, dispatcher.can_apply(&action.trial_command())))
        .collect();
    state
}

/// Formatting state of `doc` at `sel`.
///
/// A function of its three arguments only: `stored_marks` override the marks
/// at a collapsed cursor. History flags stay `false` and `enabled` stays empty.
pub fn project_document(
    doc: &Document,
    sel: Selection,
    stored_marks: Option<&BTreeSet<Mark>>,
) -> EditorState {
    let infos = doc.text_blocks();

    let head = infos.get(sel.head.block);
    let head_text = head.and_then(|info| doc.container(&info.parent)?.get(info.index)?.text());

    let marks: BTreeSet<Mark> = if sel.is_collapsed() {
        match stored_marks {
            Some(stored) => stored.clone(),
            None => head_text.map(|t| t.marks_at(sel.head.offset)).unwrap_or_default(),
        }
    } else {
        common_marks(doc, sel)
    };

    let text_align = match head.map(|info| info.kind) {
        Some(BlockType::CodeBlock) | None => None,
        Some(_) => Some(head_text.and_then(|t| t.align).unwrap_or(TextAlign::Left)),
    };

    EditorState {
        active_marks: marks
            .iter()
            .filter_map(|m| match m {
                Mark::Format(kind) => Some(*kind),
                Mark::Link { .. } => None,
            })
            .collect(),
        link_href: link_href(&marks).map(str::to_string),
        active_block: head.map(|info| info.kind),
        containers: head.map(|info| info.ancestors.clone()).unwrap_or_default(),
        text_align,
        task_checked: head
            .and_then(|info| info.task_item.as_deref())
            .and_then(|path| doc.task_item(path))
            .map(|item| item.checked),
        ..EditorState::default()
    }
}

/// Marks carried by every selected char.
fn common_marks(doc: &Document, sel: Selection) -> BTreeSet<Mark> {
    let mut common: Option<BTreeSet<Mark>> = None;
    for (ordinal, info) in doc.text_blocks().iter().enumerate() {
        let Some(text) = doc.container(&info.parent).and_then(|c| c.get(info.index)?.text()) else {
            continue;
        };
        let Some((from, to)) = sel.span_in(ordinal, text.len()) else {
            continue;
        };
        for marks in text.marks_in_range(from, to) {
            common = Some(match common {
                None => marks.clone(),
                Some(acc) => acc.intersection(marks).cloned().collect(),
            });
        }
    }
    common.unwrap_or_default()
}
