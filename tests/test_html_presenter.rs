mod helpers;

use anyhow::Result;
use helpers::{sample_notes, TestStore};
use notedit::application::open_note;
use notedit::domain::{Block, Document, Image, Note, TextBlock};
use notedit::ports::HtmlPresenter;

#[tokio::test]
async fn given_template_note_when_rendering_then_contains_structure() -> Result<()> {
    // Arrange
    let test_store = TestStore::with_samples()?;
    let note = open_note(&test_store.store, sample_notes::TEMPLATE).await?;
    let presenter = HtmlPresenter::new();

    // Act
    let html = presenter.render(&note);

    // Assert
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("<h1>Getting started</h1>"));
    assert!(html.contains("<ul>"));
    assert!(html.contains("<ol>"));
    assert!(html.contains("<blockquote>"));
    assert!(html.contains("<pre><code>"));
    assert!(html.contains("Notebook: nb-1"));
    Ok(())
}

#[tokio::test]
async fn given_task_note_when_rendering_then_emits_checkbox_state() -> Result<()> {
    // Arrange
    let test_store = TestStore::with_samples()?;
    let note = open_note(&test_store.store, sample_notes::TASKS).await?;

    // Act
    let html = HtmlPresenter::new().render(&note);

    // Assert
    assert!(html.contains("<ul class=\"task-list\">"));
    assert!(html.contains("<input type=\"checkbox\" disabled checked>"));
    assert!(html.contains("data-checked=\"false\""));
    assert!(html.contains("todo"));
    Ok(())
}

#[test]
fn given_markup_in_text_when_rendering_then_escapes_it() {
    // Arrange
    let note = Note {
        id: "n1".to_string(),
        title: "<script>".to_string(),
        content: Document::new(vec![Block::Paragraph(TextBlock::plain("a < b & c"))]),
        notebook_id: None,
    };

    // Act
    let html = HtmlPresenter::new().render(&note);

    // Assert
    assert!(html.contains("<title>&lt;script&gt;</title>"));
    assert!(html.contains("<p>a &lt; b &amp; c</p>"));
    assert!(html.contains("Notebook: none"));
    assert!(!html.contains("<script>"));
}

#[test]
fn given_image_block_when_rendering_then_emits_img_tag() {
    // Arrange
    let blocks = vec![Block::Image(Image {
        src: "data:image/png;base64,AA==".to_string(),
        alt: String::new(),
        title: Some("dot".to_string()),
    })];

    // Act
    let html = HtmlPresenter::new().render_blocks(&blocks);

    // Assert
    assert_eq!(
        html,
        "<img src=\"data:image/png;base64,AA==\" alt=\"\" title=\"dot\">"
    );
}
