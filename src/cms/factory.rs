use crate::cms::content::{is_blank_value, BlockContent, BlockType};
use crate::cms::editor::{BlockEditor, EditorView};
use crate::helper::sanitization_helpers;
use crate::models::CmsBlock;
use serde::Serialize;
use serde_json::Value;

/// What the admin page shows in a block's slot.
#[derive(Debug, Clone)]
pub enum EditorSlot {
    Editor(BlockEditor),
    /// The stored tag has no editor. Only this slot shows an error; the rest
    /// of the page keeps rendering.
    Unrecognized { block_id: String, block_key: String, block_type: String },
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SlotView {
    Editor(EditorView),
    Error { block_id: String, block_key: String, block_type: String, error: String },
}

pub fn editor_for(block: &CmsBlock) -> EditorSlot {
    match BlockType::parse(&block.block_type) {
        Some(block_type) => EditorSlot::Editor(BlockEditor::open(block, block_type)),
        None => {
            log::warn!("Block {} has unknown type '{}'", block.id, block.block_type);
            EditorSlot::Unrecognized {
                block_id: block.id.clone(),
                block_key: block.block_key.clone(),
                block_type: block.block_type.clone(),
            }
        }
    }
}

impl EditorSlot {
    pub fn view(&self) -> SlotView {
        match self {
            EditorSlot::Editor(editor) => SlotView::Editor(editor.view()),
            EditorSlot::Unrecognized { block_id, block_key, block_type } => SlotView::Error {
                block_id: block_id.clone(),
                block_key: block_key.clone(),
                block_type: block_type.clone(),
                error: format!("Unknown block type: {}", block_type),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PublishedBlock {
    pub block_key: String,
    pub block_type: String,
    #[serde(flatten)]
    pub body: PublishedBody,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PublishedBody {
    Ready {
        content: Value,
        #[serde(skip_serializing_if = "Option::is_none")]
        html: Option<String>,
    },
    /// Nothing has been published for this slot yet.
    Empty,
    Unavailable { reason: String },
}

/// Public rendering of a block's published content.
pub fn render_published(block: &CmsBlock) -> PublishedBlock {
    let body = match BlockType::parse(&block.block_type) {
        None => PublishedBody::Unavailable { reason: format!("Unknown block type: {}", block.block_type) },
        Some(_) if is_blank_value(&block.content_published) => PublishedBody::Empty,
        Some(block_type) => match BlockContent::from_json(block_type, &block.content_published) {
            Ok(content) => ready_body(&content),
            Err(e) => {
                log::error!("Published content of block {} does not decode: {}", block.id, e);
                PublishedBody::Unavailable { reason: "Stored content is malformed.".to_string() }
            }
        },
    };

    PublishedBlock {
        block_key: block.block_key.clone(),
        block_type: block.block_type.clone(),
        body,
    }
}

fn ready_body(content: &BlockContent) -> PublishedBody {
    use crate::cms::content::RichTextFormat;

    let html = match content {
        BlockContent::Text(text) => Some(sanitization_helpers::text_to_html(&text.value)),
        BlockContent::Richtext(rich) => Some(match rich.format {
            RichTextFormat::Markdown => sanitization_helpers::render_markdown(&rich.value),
            RichTextFormat::Html => sanitization_helpers::sanitize_html(&rich.value),
        }),
        BlockContent::Image(_)
        | BlockContent::Cta(_)
        | BlockContent::List(_)
        | BlockContent::Faq(_)
        | BlockContent::Banner(_)
        | BlockContent::CardList(_)
        | BlockContent::StepList(_) => None,
    };

    PublishedBody::Ready { content: content.to_json().unwrap_or(Value::Null), html }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn block(block_type: &str, published: Value) -> CmsBlock {
        CmsBlock {
            id: "b9".into(),
            page: "home".into(),
            block_key: "intro".into(),
            block_type: block_type.into(),
            content_draft: published.clone(),
            content_published: published,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn unknown_type_renders_inline_error() {
        let slot = editor_for(&block("carousel", json!({})));
        let view = serde_json::to_value(slot.view()).expect("serializes");
        assert_eq!(view["error"], json!("Unknown block type: carousel"));
    }

    #[test]
    fn known_type_opens_matching_editor() {
        let slot = editor_for(&block("step_list", json!({"items": [{"number": 1, "title": "Cadastro"}]})));
        let EditorSlot::Editor(editor) = slot else { panic!("expected editor") };
        assert_eq!(editor.block_type(), BlockType::StepList);
        assert!(editor.is_published());
    }

    #[test]
    fn markdown_is_rendered_and_sanitized() {
        let published = render_published(&block(
            "richtext",
            json!({"value": "**Edital** <script>alert(1)</script>", "format": "markdown"}),
        ));
        let PublishedBody::Ready { html: Some(html), .. } = published.body else { panic!("expected html") };
        assert!(html.contains("<strong>Edital</strong>"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn blank_published_content_is_empty() {
        assert!(matches!(render_published(&block("text", Value::Null)).body, PublishedBody::Empty));
        assert!(matches!(
            render_published(&block("gallery", json!({"x": 1}))).body,
            PublishedBody::Unavailable { .. }
        ));
    }
}
