mod helpers;

use std::time::Duration;

use anyhow::Result;
use helpers::{sample_notes, TestStore};
use notedit::application::{open_note, AutosaveSettings, NoteLoader};
use notedit::domain::{
    template, Block, DomainError, HeadingLevel, Mark, MarkKind, Note, TextAlign,
};
use notedit::{create_note, edit_note, render_note};

fn fast_settings() -> AutosaveSettings {
    AutosaveSettings {
        debounce: Duration::from_millis(20),
        flush_on_close: true,
    }
}

#[tokio::test]
async fn given_sample_notes_when_loading_then_returns_documents() -> Result<()> {
    // Arrange
    let test_store = TestStore::with_samples()?;

    // Act
    let plain = open_note(&test_store.store, sample_notes::PLAIN).await?;
    let seeded = open_note(&test_store.store, sample_notes::TEMPLATE).await?;

    // Assert
    assert_eq!(plain.content.first_line(), "Plan");
    assert_eq!(seeded.content, template::getting_started());
    assert_eq!(
        test_store.store.list_ids()?,
        vec!["orphan", "plain", "tasks", "template"]
    );
    Ok(())
}

#[tokio::test]
async fn given_unknown_id_when_loading_then_returns_not_found() -> Result<()> {
    // Arrange
    let test_store = TestStore::with_samples()?;

    // Act
    let result = test_store.store.load_note(sample_notes::NONEXISTENT).await;

    // Assert
    assert!(matches!(result, Err(DomainError::NoteNotFound(_))));
    Ok(())
}

#[tokio::test]
async fn given_new_id_when_creating_then_writes_template_note() -> Result<()> {
    // Arrange
    let test_store = TestStore::new()?;

    // Act
    create_note(&test_store.store, "fresh", sample_notes::NOTEBOOK, "Inbox").await?;

    // Assert
    let note = Note::from_record(test_store.read("fresh")?)?;
    assert_eq!(note.title, "Inbox");
    assert_eq!(note.notebook_id.as_deref(), Some(sample_notes::NOTEBOOK));
    assert_eq!(note.content, template::getting_started());
    Ok(())
}

#[tokio::test]
async fn given_existing_id_when_creating_then_fails() -> Result<()> {
    // Arrange
    let test_store = TestStore::with_samples()?;

    // Act
    let result = create_note(&test_store.store, sample_notes::PLAIN, "nb", "x").await;

    // Assert
    assert!(result.is_err());
    assert_eq!(test_store.read(sample_notes::PLAIN)?.title, "Plan");
    Ok(())
}

#[tokio::test]
async fn given_edit_script_when_replaying_then_persists_final_state() -> Result<()> {
    // Arrange
    let test_store = TestStore::with_samples()?;
    let script = test_store.write_script(
        "steps.txt",
        "# add a list item and style the heading\n\
         title Plan v2\n\
         select 1:11\n\
         enter\n\
         type buy milk\n\
         bullet-list\n\
         select 0:0 0:4\n\
         italic\n\
         align center\n",
    )?;

    // Act
    edit_note(
        test_store.store.clone(),
        sample_notes::PLAIN,
        &script,
        fast_settings(),
    )
    .await?;

    // Assert
    let note = Note::from_record(test_store.read(sample_notes::PLAIN)?)?;
    assert_eq!(note.title, "Plan v2");
    match &note.content.blocks[0] {
        Block::Heading { level, text } => {
            assert_eq!(*level, HeadingLevel::H1);
            assert_eq!(text.align, Some(TextAlign::Center));
            assert!(text.runs[0].marks.contains(&Mark::Format(MarkKind::Italic)));
        }
        other => panic!("Expected heading, got {other:?}"),
    }
    match &note.content.blocks[2] {
        Block::BulletList(items) => {
            assert_eq!(items.len(), 1);
            assert_eq!(items[0].blocks, vec![Block::paragraph("buy milk")]);
        }
        other => panic!("Expected bullet list, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn given_image_step_with_file_when_replaying_then_inlines_data_url() -> Result<()> {
    // Arrange
    let test_store = TestStore::with_samples()?;
    let image = test_store.notes_dir.with_file_name("dot.png");
    std::fs::write(&image, [0x89, b'P', b'N', b'G'])?;
    let script = test_store.write_script(
        "image.txt",
        &format!("select 1:11\nimage {}\n", image.display()),
    )?;

    // Act
    edit_note(
        test_store.store.clone(),
        sample_notes::PLAIN,
        &script,
        fast_settings(),
    )
    .await?;

    // Assert
    let note = Note::from_record(test_store.read(sample_notes::PLAIN)?)?;
    match &note.content.blocks[2] {
        Block::Image(image) => assert_eq!(image.src, "data:image/png;base64,iVBORw=="),
        other => panic!("Expected image, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn given_unreadable_image_when_replaying_then_earlier_edits_are_saved() -> Result<()> {
    // Arrange
    let test_store = TestStore::with_samples()?;
    let missing = test_store.notes_dir.with_file_name("missing.png");
    let script = test_store.write_script(
        "missing.txt",
        &format!(
            "title Changed\nselect 1:11\ntype XYZ\nimage {}\n",
            missing.display()
        ),
    )?;

    // Act
    edit_note(
        test_store.store.clone(),
        sample_notes::PLAIN,
        &script,
        fast_settings(),
    )
    .await?;

    // Assert
    let note = Note::from_record(test_store.read(sample_notes::PLAIN)?)?;
    assert_eq!(note.title, "Changed");
    assert_eq!(note.content.plain_text(), "Plan\nHello worldXYZ");
    assert!(!note
        .content
        .blocks
        .iter()
        .any(|block| matches!(block, Block::Image(_))));
    Ok(())
}

#[tokio::test]
async fn given_invalid_script_when_replaying_then_fails_before_editing() -> Result<()> {
    // Arrange
    let test_store = TestStore::with_samples()?;
    let before = test_store.read(sample_notes::PLAIN)?;
    let script = test_store.write_script("bad.txt", "bold\nheading 9\n")?;

    // Act
    let result = edit_note(
        test_store.store.clone(),
        sample_notes::PLAIN,
        &script,
        fast_settings(),
    )
    .await;

    // Assert
    let err = result.expect_err("script should be rejected");
    assert!(matches!(
        err.downcast_ref::<DomainError>(),
        Some(DomainError::InvalidScript { line: 2, .. })
    ));
    assert_eq!(test_store.read(sample_notes::PLAIN)?, before);
    Ok(())
}

#[tokio::test]
async fn given_note_without_notebook_when_editing_then_file_is_unchanged() -> Result<()> {
    // Arrange
    let test_store = TestStore::with_samples()?;
    let before = test_store.read(sample_notes::ORPHAN)?;
    let script = test_store.write_script("orphan.txt", "title Other\n")?;

    // Act
    edit_note(
        test_store.store.clone(),
        sample_notes::ORPHAN,
        &script,
        fast_settings(),
    )
    .await?;

    // Assert
    assert_eq!(test_store.read(sample_notes::ORPHAN)?, before);
    Ok(())
}

#[tokio::test]
async fn given_note_when_rendering_to_file_then_writes_html() -> Result<()> {
    // Arrange
    let test_store = TestStore::with_samples()?;
    let output = test_store.notes_dir.with_file_name("plain.html");

    // Act
    render_note(&test_store.store, sample_notes::PLAIN, Some(&output)).await?;

    // Assert
    let html = std::fs::read_to_string(&output)?;
    assert!(html.contains("<h1>Plan</h1>"));
    assert!(html.contains("<p>Hello <strong>world</strong></p>"));
    Ok(())
}
