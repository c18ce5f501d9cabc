// src/application/dispatcher.rs
use std::collections::BTreeSet;

use tracing::{debug, instrument, trace};

use crate::application::commands::{self, EditContext};
use crate::application::history::{History, Snapshot};
use crate::domain::{Block, Document, EditorCommand, Mark, Selection, TextBlock};

/// Result of dispatching one command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandOutcome {
    /// Whether the command applied at the selection it was issued against.
    pub applicable: bool,
    /// Whether the document tree changed; only these outcomes warrant a save.
    pub changed: bool,
}

impl CommandOutcome {
    const INAPPLICABLE: Self = Self {
        applicable: false,
        changed: false,
    };
}

/// Owns the live document and applies editing commands to it.
#[derive(Debug, Clone)]
pub struct CommandDispatcher {
    context: EditContext,
    history: History,
}

impl CommandDispatcher {
    pub fn new(mut document: Document) -> Self {
        if document.text_block_count() == 0 {
            document.blocks.push(Block::Paragraph(TextBlock::default()));
        }
        Self {
            context: EditContext::new(document),
            history: History::new(),
        }
    }

    pub fn document(&self) -> &Document {
        &self.context.document
    }

    pub fn selection(&self) -> Selection {
        self.context.selection
    }

    pub fn stored_marks(&self) -> Option<&BTreeSet<Mark>> {
        self.context.stored_marks.as_ref()
    }

    /// Moves the selection, clamped to the document. Stored marks are dropped.
    pub fn select(&mut self, selection: Selection) {
        self.context.selection = selection.clamp(&self.context.document);
        self.context.stored_marks = None;
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Dry run of `command` against a scratch copy.
    pub fn can_apply(&self, command: &EditorCommand) -> bool {
        match command {
            EditorCommand::Undo => self.can_undo(),
            EditorCommand::Redo => self.can_redo(),
            _ => commands::execute(command, &mut self.context.clone()),
        }
    }

    #[instrument(level = "debug", skip_all, fields(%command))]
    pub fn apply(&mut self, command: EditorCommand) -> CommandOutcome {
        match command {
            EditorCommand::Undo => return self.step_history(true),
            EditorCommand::Redo => return self.step_history(false),
            _ => {}
        }

        let mut draft = self.context.clone();
        if !commands::execute(&command, &mut draft) {
            trace!("command not applicable");
            return CommandOutcome::INAPPLICABLE;
        }
        let changed = draft.document != self.context.document;
        let previous = std::mem::replace(&mut self.context, draft);
        if changed {
            self.history.record(Snapshot {
                document: previous.document,
                selection: previous.selection,
            });
        }
        debug!(changed, selection = %self.context.selection, "command applied");
        CommandOutcome {
            applicable: true,
            changed,
        }
    }

    fn step_history(&mut self, undo: bool) -> CommandOutcome {
        let current = Snapshot {
            document: self.context.document.clone(),
            selection: self.context.selection,
        };
        let restored = if undo {
            self.history.undo(current)
        } else {
            self.history.redo(current)
        };
        let Some(snapshot) = restored else {
            return CommandOutcome::INAPPLICABLE;
        };
        self.context = EditContext {
            selection: snapshot.selection.clamp(&snapshot.document),
            document: snapshot.document,
            stored_marks: None,
        };
        CommandOutcome {
            applicable: true,
            changed: true,
        }
    }
}
