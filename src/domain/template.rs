// src/domain/template.rs
use crate::domain::document::{
    Block, Document, HeadingLevel, ListItem, Mark, MarkKind, TextBlock, TextRun,
};

fn marked(text: &str, kind: MarkKind) -> TextRun {
    TextRun::marked(text, [Mark::Format(kind)])
}

fn item(text: &str) -> ListItem {
    ListItem {
        blocks: vec![Block::paragraph(text)],
    }
}

/// Content seeded into a note that has never been saved.
pub fn getting_started() -> Document {
    Document::new(vec![
        Block::heading(HeadingLevel::H1, "Getting started"),
        Block::Paragraph(TextBlock::from_runs(vec![
            TextRun::plain("Welcome to your new "),
            marked("note", MarkKind::Italic),
            TextRun::plain(". Edits are saved "),
            marked("automatically", MarkKind::Bold),
            TextRun::plain(" shortly after you stop typing."),
        ])),
        Block::paragraph("Try creating lists:"),
        Block::BulletList(vec![item("First bullet point"), item("Second bullet point")]),
        Block::OrderedList(vec![item("First numbered item"), item("Second numbered item")]),
        Block::Paragraph(TextBlock::from_runs(vec![
            TextRun::plain("Drive the editor from a script with "),
            marked("notedit edit", MarkKind::Code),
            TextRun::plain(":"),
        ])),
        Block::CodeBlock {
            language: None,
            text: TextBlock::plain("notedit edit <NOTE_ID> steps.txt"),
        },
        Block::heading(HeadingLevel::H2, "Features"),
        Block::Blockquote(vec![Block::Paragraph(TextBlock::from_runs(vec![
            TextRun::plain("Headings, lists, task lists, quotes, links, images and the usual marks such as "),
            marked("bold", MarkKind::Bold),
            TextRun::plain(" or "),
            marked("code", MarkKind::Code),
            TextRun::plain("."),
        ]))]),
    ])
}
