// src/domain/mod.rs
pub mod command;
pub mod document;
pub mod error;
pub mod note;
pub mod selection;
pub mod template;
pub mod wire;

pub use command::EditorCommand;
pub use document::{
    Block, BlockType, ContainerKind, Document, HeadingLevel, Image, ListItem, ListKind, Mark,
    MarkKind, TaskItem, TextAlign, TextBlock, TextRun,
};
pub use error::DomainError;
pub use note::{Note, NotePayload, NoteRecord};
pub use selection::{Position, Selection};
