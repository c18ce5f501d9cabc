// src/domain/wire.rs
//! JSON node format used for storage and transport of documents.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::document::{
    Block, Document, HeadingLevel, Image, ListItem, Mark, TaskItem, TextAlign, TextBlock, TextRun,
};
use crate::domain::DomainError;

pub const ROOT_TYPE: &str = "document";
/// Root name written by editors that follow the ProseMirror convention.
pub const ROOT_ALIAS: &str = "doc";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireNode {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attrs: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<WireNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marks: Option<Vec<WireMark>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireMark {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attrs: Option<Map<String, Value>>,
}

impl WireNode {
    fn node(kind: &str) -> Self {
        Self {
            kind: kind.to_string(),
            attrs: None,
            content: None,
            text: None,
            marks: None,
        }
    }

    fn with_attrs(mut self, attrs: Map<String, Value>) -> Self {
        if !attrs.is_empty() {
            self.attrs = Some(attrs);
        }
        self
    }

    fn with_content(mut self, content: Vec<WireNode>) -> Self {
        if !content.is_empty() {
            self.content = Some(content);
        }
        self
    }

    fn attr(&self, key: &str) -> Option<&Value> {
        self.attrs.as_ref()?.get(key).filter(|v| !v.is_null())
    }

    fn attr_str(&self, key: &str) -> Option<String> {
        self.attr(key).and_then(Value::as_str).map(str::to_string)
    }

    fn children(&self) -> &[WireNode] {
        self.content.as_deref().unwrap_or_default()
    }
}

fn malformed(reason: impl Into<String>) -> DomainError {
    DomainError::MalformedDocument(reason.into())
}

impl Document {
    pub fn from_value(value: Value) -> Result<Self, DomainError> {
        let node: WireNode =
            serde_json::from_value(value).map_err(|e| malformed(e.to_string()))?;
        Document::try_from(node)
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(WireNode::from(self)).unwrap_or(Value::Null)
    }

    /// Canonical serialization, stable for equal trees.
    pub fn to_json(&self) -> String {
        serde_json::to_string(&WireNode::from(self)).unwrap_or_default()
    }
}

impl TryFrom<WireNode> for Document {
    type Error = DomainError;

    fn try_from(node: WireNode) -> Result<Self, Self::Error> {
        if node.kind != ROOT_TYPE && node.kind != ROOT_ALIAS {
            return Err(malformed(format!(
                "root node must be '{ROOT_TYPE}', found '{}'",
                node.kind
            )));
        }
        let mut blocks = parse_blocks(node.children())?;
        if blocks.is_empty() {
            blocks.push(Block::Paragraph(TextBlock::default()));
        }
        Ok(Document { blocks })
    }
}

impl From<&Document> for WireNode {
    fn from(doc: &Document) -> Self {
        WireNode::node(ROOT_TYPE).with_content(doc.blocks.iter().map(block_to_wire).collect())
    }
}

impl From<Document> for WireNode {
    fn from(doc: Document) -> Self {
        WireNode::from(&doc)
    }
}

fn parse_blocks(nodes: &[WireNode]) -> Result<Vec<Block>, DomainError> {
    nodes.iter().map(parse_block).collect()
}

/// Item content; tiptap requires at least one block per item.
fn parse_item_blocks(node: &WireNode) -> Result<Vec<Block>, DomainError> {
    let mut blocks = parse_blocks(node.children())?;
    if blocks.is_empty() {
        blocks.push(Block::Paragraph(TextBlock::default()));
    }
    Ok(blocks)
}

fn parse_align(node: &WireNode) -> Result<Option<TextAlign>, DomainError> {
    node.attr_str("textAlign").map(|s| s.parse()).transpose()
}

fn parse_block(node: &WireNode) -> Result<Block, DomainError> {
    match node.kind.as_str() {
        "paragraph" => {
            let mut text = parse_inline(node)?;
            text.align = parse_align(node)?;
            Ok(Block::Paragraph(text))
        }
        "heading" => {
            let level = node.attr("level").and_then(Value::as_u64).unwrap_or(1);
            let mut text = parse_inline(node)?;
            text.align = parse_align(node)?;
            Ok(Block::Heading {
                level: HeadingLevel::clamped(level),
                text,
            })
        }
        "codeBlock" => {
            let mut text = parse_inline(node)?;
            text.strip_marks();
            Ok(Block::CodeBlock {
                language: node.attr_str("language"),
                text,
            })
        }
        "bulletList" | "orderedList" => {
            let items = node
                .children()
                .iter()
                .map(|child| match child.kind.as_str() {
                    "listItem" => Ok(ListItem {
                        blocks: parse_item_blocks(child)?,
                    }),
                    other => Err(malformed(format!("{} cannot contain {other}", node.kind))),
                })
                .collect::<Result<Vec<_>, _>>()?;
            if node.kind == "bulletList" {
                Ok(Block::BulletList(items))
            } else {
                Ok(Block::OrderedList(items))
            }
        }
        "taskList" => {
            let items = node
                .children()
                .iter()
                .map(|child| match child.kind.as_str() {
                    "taskItem" => Ok(TaskItem {
                        checked: child.attr("checked").and_then(Value::as_bool).unwrap_or(false),
                        blocks: parse_item_blocks(child)?,
                    }),
                    other => Err(malformed(format!("taskList cannot contain {other}"))),
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Block::TaskList(items))
        }
        "blockquote" => Ok(Block::Blockquote(parse_item_blocks(node)?)),
        "image" => {
            let src = node
                .attr_str("src")
                .ok_or_else(|| malformed("image without src"))?;
            Ok(Block::Image(Image {
                src,
                alt: node.attr_str("alt").unwrap_or_default(),
                title: node.attr_str("title"),
            }))
        }
        other => Err(malformed(format!("unexpected block node: {other}"))),
    }
}

fn parse_inline(node: &WireNode) -> Result<TextBlock, DomainError> {
    let mut runs = Vec::new();
    for child in node.children() {
        match child.kind.as_str() {
            "text" => runs.push(TextRun {
                text: child.text.clone().unwrap_or_default(),
                marks: parse_marks(child.marks.as_deref().unwrap_or_default())?,
            }),
            "hardBreak" => runs.push(TextRun::plain("\n")),
            other => {
                return Err(malformed(format!(
                    "{} cannot contain {other}",
                    node.kind
                )))
            }
        }
    }
    Ok(TextBlock::from_runs(runs))
}

fn parse_marks(marks: &[WireMark]) -> Result<std::collections::BTreeSet<Mark>, DomainError> {
    marks
        .iter()
        .map(|mark| match mark.kind.as_str() {
            "link" => {
                let href = mark
                    .attrs
                    .as_ref()
                    .and_then(|a| a.get("href"))
                    .and_then(Value::as_str)
                    .ok_or_else(|| malformed("link without href"))?;
                Ok(Mark::link(href))
            }
            kind => kind.parse().map(Mark::Format),
        })
        .collect()
}

fn align_attrs(text: &TextBlock) -> Map<String, Value> {
    let mut attrs = Map::new();
    if let Some(align) = text.align {
        attrs.insert("textAlign".into(), Value::from(align.as_str()));
    }
    attrs
}

fn block_to_wire(block: &Block) -> WireNode {
    match block {
        Block::Paragraph(text) => WireNode::node("paragraph")
            .with_attrs(align_attrs(text))
            .with_content(inline_to_wire(text)),
        Block::Heading { level, text } => {
            let mut attrs = align_attrs(text);
            attrs.insert("level".into(), Value::from(level.as_u8()));
            WireNode::node("heading")
                .with_attrs(attrs)
                .with_content(inline_to_wire(text))
        }
        Block::CodeBlock { language, text } => {
            let mut attrs = Map::new();
            if let Some(language) = language {
                attrs.insert("language".into(), Value::from(language.as_str()));
            }
            WireNode::node("codeBlock")
                .with_attrs(attrs)
                .with_content(inline_to_wire(text))
        }
        Block::BulletList(items) | Block::OrderedList(items) => {
            let kind = if matches!(block, Block::BulletList(_)) {
                "bulletList"
            } else {
                "orderedList"
            };
            WireNode::node(kind).with_content(
                items
                    .iter()
                    .map(|item| {
                        WireNode::node("listItem")
                            .with_content(item.blocks.iter().map(block_to_wire).collect())
                    })
                    .collect(),
            )
        }
        Block::TaskList(items) => WireNode::node("taskList").with_content(
            items
                .iter()
                .map(|item| {
                    let mut attrs = Map::new();
                    attrs.insert("checked".into(), Value::from(item.checked));
                    WireNode::node("taskItem")
                        .with_attrs(attrs)
                        .with_content(item.blocks.iter().map(block_to_wire).collect())
                })
                .collect(),
        ),
        Block::Blockquote(children) => WireNode::node("blockquote")
            .with_content(children.iter().map(block_to_wire).collect()),
        Block::Image(image) => {
            let mut attrs = Map::new();
            attrs.insert("src".into(), Value::from(image.src.as_str()));
            attrs.insert("alt".into(), Value::from(image.alt.as_str()));
            if let Some(title) = &image.title {
                attrs.insert("title".into(), Value::from(title.as_str()));
            }
            WireNode::node("image").with_attrs(attrs)
        }
    }
}

fn inline_to_wire(text: &TextBlock) -> Vec<WireNode> {
    text.runs
        .iter()
        .filter(|run| !run.is_empty())
        .map(|run| {
            let mut node = WireNode::node("text");
            node.text = Some(run.text.clone());
            if !run.marks.is_empty() {
                node.marks = Some(run.marks.iter().map(mark_to_wire).collect());
            }
            node
        })
        .collect()
}

fn mark_to_wire(mark: &Mark) -> WireMark {
    match mark {
        Mark::Format(kind) => WireMark {
            kind: kind.as_str().to_string(),
            attrs: None,
        },
        Mark::Link { href } => {
            let mut attrs = Map::new();
            attrs.insert("href".into(), Value::from(href.as_str()));
            WireMark {
                kind: "link".to_string(),
                attrs: Some(attrs),
            }
        }
    }
}
