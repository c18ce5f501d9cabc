// src/ports/html.rs
use std::fmt::Write;

use html_escape::{encode_double_quoted_attribute, encode_text};
use tracing::instrument;

use crate::domain::{Block, Mark, MarkKind, Note, TextAlign, TextBlock, TextRun};

#[derive(Debug, Default)]
pub struct HtmlPresenter;

impl HtmlPresenter {
    pub fn new() -> Self {
        Self
    }

    /// Body markup for a list of blocks.
    #[instrument(level = "trace", skip_all, fields(blocks = blocks.len()))]
    pub fn render_blocks(&self, blocks: &[Block]) -> String {
        let mut out = String::new();
        for block in blocks {
            self.render_block(block, &mut out);
        }
        out
    }

    fn render_block(&self, block: &Block, out: &mut String) {
        match block {
            Block::Paragraph(text) => {
                let _ = write!(out, "<p{}>{}</p>", align_attr(text), render_inline(text));
            }
            Block::Heading { level, text } => {
                let n = level.as_u8();
                let _ = write!(out, "<h{n}{}>{}</h{n}>", align_attr(text), render_inline(text));
            }
            Block::CodeBlock { language, text } => {
                let class = language
                    .as_deref()
                    .map(|lang| format!(" class=\"language-{}\"", encode_double_quoted_attribute(lang)))
                    .unwrap_or_default();
                let _ = write!(
                    out,
                    "<pre><code{class}>{}</code></pre>",
                    encode_text(&text.plain_text())
                );
            }
            Block::BulletList(items) | Block::OrderedList(items) => {
                let tag = if matches!(block, Block::BulletList(_)) { "ul" } else { "ol" };
                let _ = write!(out, "<{tag}>");
                for item in items {
                    let _ = write!(out, "<li>{}</li>", self.render_blocks(&item.blocks));
                }
                let _ = write!(out, "</{tag}>");
            }
            Block::TaskList(items) => {
                out.push_str("<ul class=\"task-list\">");
                for item in items {
                    let checked = if item.checked { " checked" } else { "" };
                    let _ = write!(
                        out,
                        "<li data-checked=\"{}\"><label><input type=\"checkbox\" disabled{checked}></label><div>{}</div></li>",
                        item.checked,
                        self.render_blocks(&item.blocks)
                    );
                }
                out.push_str("</ul>");
            }
            Block::Blockquote(blocks) => {
                let _ = write!(out, "<blockquote>{}</blockquote>", self.render_blocks(blocks));
            }
            Block::Image(image) => {
                let _ = write!(
                    out,
                    "<img src=\"{}\" alt=\"{}\"",
                    encode_double_quoted_attribute(&image.src),
                    encode_double_quoted_attribute(&image.alt)
                );
                if let Some(title) = &image.title {
                    let _ = write!(out, " title=\"{}\"", encode_double_quoted_attribute(title));
                }
                out.push('>');
            }
        }
    }

    pub fn render(&self, note: &Note) -> String {
        let body = self.render_blocks(&note.content.blocks);
        let title = encode_text(&note.title);
        let notebook = note.notebook_id.as_deref().unwrap_or("none");

        format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>{title}</title>
    <style>
        body {{
            font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif;
            line-height: 1.6;
            max-width: 800px;
            margin: 2rem auto;
            padding: 0 1rem;
            background-color: #f5f5f5;
        }}
        .note {{
            background: white;
            border-radius: 8px;
            padding: 2rem;
            box-shadow: 0 2px 4px rgba(0,0,0,0.1);
        }}
        pre {{
            white-space: pre-wrap;
            word-wrap: break-word;
            background-color: #f8f9fa;
            padding: 1rem;
            border-radius: 4px;
            overflow-x: auto;
        }}
        code {{
            background-color: #f0f0f0;
            padding: 2px 4px;
            border-radius: 3px;
            font-family: monospace;
        }}
        blockquote {{
            margin: 1em 0;
            padding-left: 1rem;
            border-left: 3px solid #ccc;
            color: #555;
        }}
        ul.task-list {{
            list-style: none;
            padding-left: 0.5rem;
        }}
        ul.task-list li {{
            display: flex;
            gap: 0.5rem;
        }}
        img {{
            max-width: 100%;
        }}
        .note-info {{
            margin-top: 1rem;
            padding-top: 1rem;
            border-top: 1px solid #eee;
            font-size: 0.9em;
            color: #666;
        }}
    </style>
</head>
<body>
    <div class="note">
        <h1 class="note-title">{title}</h1>
        <div class="note-content">{body}</div>
        <div class="note-info">
            <div>Note ID: {note_id}</div>
            <div>Notebook: {notebook}</div>
        </div>
    </div>
</body>
</html>"#,
            note_id = encode_text(&note.id),
            notebook = encode_text(notebook),
        )
    }
}

fn align_attr(text: &TextBlock) -> String {
    match text.align {
        None | Some(TextAlign::Left) => String::new(),
        Some(align) => format!(" style=\"text-align: {align}\""),
    }
}

fn render_inline(text: &TextBlock) -> String {
    text.runs.iter().map(render_run).collect()
}

fn mark_tag(kind: MarkKind) -> &'static str {
    match kind {
        MarkKind::Bold => "strong",
        MarkKind::Italic => "em",
        MarkKind::Underline => "u",
        MarkKind::Strike => "s",
        MarkKind::Code => "code",
        MarkKind::Superscript => "sup",
        MarkKind::Subscript => "sub",
    }
}

/// Format marks nest in `MarkKind` order inside an optional link.
fn render_run(run: &TextRun) -> String {
    let mut html = encode_text(&run.text).replace('\n', "<br>");
    for mark in run.marks.iter().rev() {
        if let Mark::Format(kind) = mark {
            let tag = mark_tag(*kind);
            html = format!("<{tag}>{html}</{tag}>");
        }
    }
    if let Some(href) = run.marks.iter().find_map(|m| match m {
        Mark::Link { href } => Some(href),
        Mark::Format(_) => None,
    }) {
        html = format!(
            "<a href=\"{}\" rel=\"noopener noreferrer nofollow\">{html}</a>",
            encode_double_quoted_attribute(href)
        );
    }
    html
}
