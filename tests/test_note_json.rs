use anyhow::Result;
use notedit::application::CommandDispatcher;
use notedit::domain::{
    Block, BlockType, Document, DomainError, EditorCommand, HeadingLevel, ListKind, Mark,
    MarkKind, Note, NoteRecord, Position, Selection, TextAlign,
};
use serde_json::{json, Value};

fn record(content: Option<Value>, notebook: Option<&str>) -> NoteRecord {
    NoteRecord {
        id: "n1".to_string(),
        title: "Plan".to_string(),
        content,
        notebook_id: notebook.map(str::to_string),
    }
}

#[test]
fn given_note_when_serializing_to_json_then_uses_camel_case_fields() -> Result<()> {
    // Arrange
    let note = Note::from_record(record(None, Some("nb")))?;

    // Act
    let json = serde_json::to_string_pretty(&note)?;

    // Assert
    assert!(json.contains(r#""id": "n1""#));
    assert!(json.contains(r#""title": "Plan""#));
    assert!(json.contains(r#""notebookId": "nb""#));
    assert!(!json.contains("notebook_id"));
    assert!(json.contains(r#""type": "document""#));
    Ok(())
}

#[test]
fn given_stored_json_when_deserializing_record_then_reads_notebook_id() -> Result<()> {
    // Arrange
    let raw = r#"{"id": "n1", "title": "T", "content": null, "notebookId": "nb-7"}"#;

    // Act
    let parsed: NoteRecord = serde_json::from_str(raw)?;

    // Assert
    assert_eq!(parsed.notebook_id.as_deref(), Some("nb-7"));
    assert_eq!(parsed.content, None);
    Ok(())
}

#[test]
fn given_record_with_rich_content_when_loading_then_builds_document() -> Result<()> {
    // Arrange
    let content = json!({
        "type": "doc",
        "content": [
            {"type": "paragraph", "content": [
                {"type": "text", "text": "x"},
                {"type": "text", "text": "2", "marks": [{"type": "superscript"}]}
            ]},
            {"type": "image", "attrs": {"src": "data:image/png;base64,AA==", "alt": "dot"}}
        ]
    });

    // Act
    let note = Note::from_record(record(Some(content), Some("nb")))?;

    // Assert
    let first = note.content.text_block(0).expect("paragraph");
    assert_eq!(first.plain_text(), "x2");
    assert!(first.runs[1]
        .marks
        .contains(&Mark::Format(MarkKind::Superscript)));
    assert!(matches!(&note.content.blocks[1], Block::Image(image) if image.alt == "dot"));
    Ok(())
}

#[test]
fn given_unknown_node_type_when_loading_then_returns_malformed_document() {
    // Arrange
    let content = json!({"type": "doc", "content": [{"type": "table"}]});

    // Act
    let result = Note::from_record(record(Some(content), Some("nb")));

    // Assert
    assert!(matches!(result, Err(DomainError::MalformedDocument(_))));
}

#[test]
fn given_note_when_round_tripping_through_record_then_content_survives() -> Result<()> {
    // Arrange
    let note = Note::from_record(record(None, Some("nb")))?;

    // Act
    let reloaded = Note::from_record(note.clone().into_record())?;

    // Assert
    assert_eq!(reloaded, note);
    Ok(())
}

#[test]
fn given_empty_notebook_id_when_loading_then_treats_it_as_missing() -> Result<()> {
    // Act
    let note = Note::from_record(record(None, Some("")))?;

    // Assert
    assert_eq!(note.notebook_id, None);
    Ok(())
}

fn at(block: usize, offset: usize) -> Position {
    Position::new(block, offset)
}

#[test]
fn given_command_sequence_when_round_tripping_after_each_step_then_tree_is_unchanged() -> Result<()> {
    // Arrange
    let mut d = CommandDispatcher::new(Document::new(vec![
        Block::paragraph("alpha beta"),
        Block::paragraph("gamma"),
        Block::paragraph("delta"),
    ]));
    let steps = vec![
        (Selection::range(at(0, 0), at(0, 5)), EditorCommand::ToggleMark(MarkKind::Bold)),
        (Selection::range(at(0, 6), at(0, 10)), EditorCommand::SetLink(Some("https://x.io".into()))),
        (Selection::range(at(1, 0), at(2, 0)), EditorCommand::ToggleList(ListKind::Bullet)),
        (Selection::range(at(1, 0), at(2, 0)), EditorCommand::ToggleList(ListKind::Task)),
        (Selection::cursor(at(1, 0)), EditorCommand::ToggleTask),
        (Selection::cursor(at(0, 0)), EditorCommand::ToggleBlockquote),
        (Selection::cursor(at(0, 2)), EditorCommand::SetBlock(BlockType::Heading(HeadingLevel::H2))),
        (Selection::range(at(0, 0), at(0, 2)), EditorCommand::ToggleMark(MarkKind::Superscript)),
        (Selection::range(at(0, 0), at(0, 2)), EditorCommand::SetTextAlign(TextAlign::Center)),
        (Selection::cursor(at(2, 2)), EditorCommand::InsertImage { src: "data:image/png;base64,AA==".into() }),
        (Selection::cursor(at(1, 5)), EditorCommand::SplitBlock),
        (Selection::cursor(at(2, 0)), EditorCommand::InsertText("new\nline".into())),
        (Selection::cursor(at(0, 0)), EditorCommand::SetBlock(BlockType::CodeBlock)),
        (Selection::cursor(at(0, 0)), EditorCommand::Undo),
        (Selection::cursor(at(0, 0)), EditorCommand::Undo),
        (Selection::cursor(at(0, 0)), EditorCommand::Redo),
    ];

    for (selection, command) in steps {
        // Act
        d.select(selection);
        let label = command.to_string();
        d.apply(command);
        let reparsed = Document::from_value(d.document().to_value())?;

        // Assert
        assert_eq!(&reparsed, d.document(), "round trip after {label}");
    }
    assert!(d
        .document()
        .blocks
        .iter()
        .any(|block| matches!(block, Block::Blockquote(_))));
    Ok(())
}
