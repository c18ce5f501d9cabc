// src/domain/command.rs
use std::fmt;

use crate::domain::document::{BlockType, ListKind, MarkKind, TextAlign};

/// One atomic editing operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorCommand {
    ToggleMark(MarkKind),
    SetBlock(BlockType),
    ToggleList(ListKind),
    ToggleBlockquote,
    /// Flips the checked flag of the task item under the cursor.
    ToggleTask,
    /// `src` is usually a `data:` URL; an empty payload is inapplicable.
    InsertImage { src: String },
    SetTextAlign(TextAlign),
    /// `None` means the user cancelled the prompt; an empty href removes the link.
    SetLink(Option<String>),
    InsertText(String),
    SplitBlock,
    Undo,
    Redo,
}

impl fmt::Display for EditorCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditorCommand::ToggleMark(kind) => write!(f, "toggle-mark({})", kind.as_str()),
            EditorCommand::SetBlock(kind) => write!(f, "set-block({kind:?})"),
            EditorCommand::ToggleList(kind) => write!(f, "toggle-list({kind:?})"),
            EditorCommand::ToggleBlockquote => f.write_str("toggle-blockquote"),
            EditorCommand::ToggleTask => f.write_str("toggle-task"),
            EditorCommand::InsertImage { src } => write!(f, "insert-image({} bytes)", src.len()),
            EditorCommand::SetTextAlign(align) => write!(f, "set-text-align({align})"),
            EditorCommand::SetLink(None) => f.write_str("set-link(cancel)"),
            EditorCommand::SetLink(Some(href)) => write!(f, "set-link({href:?})"),
            EditorCommand::InsertText(text) => write!(f, "insert-text({} chars)", text.chars().count()),
            EditorCommand::SplitBlock => f.write_str("split-block"),
            EditorCommand::Undo => f.write_str("undo"),
            EditorCommand::Redo => f.write_str("redo"),
        }
    }
}
