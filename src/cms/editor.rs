use crate::cms::content::{is_blank_value, BlockContent, BlockType, EditorActions};
use crate::cms::import::{self, LineError};
use crate::cms::validation::{validate, ValidationIssue};
use crate::models::{Asset, CmsBlock};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Where an editor sends its two outbound actions. Publishing copies the
/// stored draft over the stored published value.
pub trait BlockPersistence {
    type Error: fmt::Display;

    fn persist_draft(&self, block_id: &str, content: &Value) -> Result<(), Self::Error>;
    fn persist_publish(&self, block_id: &str) -> Result<(), Self::Error>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EditorOutcome {
    Saved,
    Published,
    /// Validation failed; persistence was not called.
    Invalid { issues: Vec<ValidationIssue> },
    /// The action is switched off for the current content.
    Disabled { reason: String },
    /// Persistence reported a failure. The editor stays dirty.
    Failed { message: String },
    /// Another save or publish of the same block is still running.
    Busy,
}

/// Local edits a client can replay against a block before saving.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditorCommand {
    SetContent { content: Value },
    MoveItem { from: usize, to: usize },
    MoveUp { index: usize },
    MoveDown { index: usize },
    RemoveItem { index: usize },
    ImportItems { text: String },
    SelectAsset { asset_id: String },
}

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("'{command}' does not apply to {block_type} blocks")]
    WrongBlockType { command: &'static str, block_type: BlockType },
    #[error("Item index {0} is out of range")]
    IndexOutOfRange(usize),
    #[error("Content does not match the block shape: {0}")]
    InvalidContent(#[from] serde_json::Error),
    #[error("Asset not found: {0}")]
    AssetNotFound(String),
}

#[derive(Debug, Serialize)]
pub struct EditorView {
    pub block_id: String,
    pub page: String,
    pub block_key: String,
    pub block_type: BlockType,
    pub content: Value,
    pub is_dirty: bool,
    pub is_published: bool,
    pub actions: EditorActions,
    pub issues: Vec<ValidationIssue>,
}

/// Form state for one block: the value it was opened with, the local edits,
/// and the last validation messages. `stored_draft` and `stored_published`
/// mirror the raw stored columns and follow every successful persist.
#[derive(Debug, Clone)]
pub struct BlockEditor {
    block_id: String,
    page: String,
    block_key: String,
    block_type: BlockType,
    saved: BlockContent,
    current: BlockContent,
    stored_draft: Value,
    stored_published: Value,
    issues: Vec<ValidationIssue>,
}

fn decode_stored(block_type: BlockType, value: &Value, block_id: &str, column: &str) -> Option<BlockContent> {
    if is_blank_value(value) {
        return None;
    }
    match BlockContent::from_json(block_type, value) {
        Ok(content) => Some(content),
        Err(e) => {
            log::warn!("Ignoring undecodable {} of block {}: {}", column, block_id, e);
            None
        }
    }
}

impl BlockEditor {
    /// Opens the draft, falling back to the published value, then to the
    /// type default.
    pub fn open(block: &CmsBlock, block_type: BlockType) -> Self {
        let draft = decode_stored(block_type, &block.content_draft, &block.id, "draft");
        let published = decode_stored(block_type, &block.content_published, &block.id, "published content");
        let saved = draft
            .or(published)
            .unwrap_or_else(|| BlockContent::default_for(block_type));

        Self {
            block_id: block.id.clone(),
            page: block.page.clone(),
            block_key: block.block_key.clone(),
            block_type,
            current: saved.clone(),
            saved,
            stored_draft: block.content_draft.clone(),
            stored_published: block.content_published.clone(),
            issues: Vec::new(),
        }
    }

    pub fn block_id(&self) -> &str {
        &self.block_id
    }

    pub fn block_type(&self) -> BlockType {
        self.block_type
    }

    pub fn content(&self) -> &BlockContent {
        &self.current
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    pub fn is_dirty(&self) -> bool {
        self.current != self.saved
    }

    /// Same rule as [`CmsBlock::is_published`]: the stored columns are equal.
    pub fn is_published(&self) -> bool {
        self.stored_draft == self.stored_published
    }

    pub fn set_content(&mut self, content: BlockContent) -> Result<(), CommandError> {
        if content.block_type() != self.block_type {
            return Err(CommandError::WrongBlockType { command: "set_content", block_type: self.block_type });
        }
        self.current = content;
        Ok(())
    }

    pub fn set_content_json(&mut self, value: &Value) -> Result<(), CommandError> {
        let content = BlockContent::from_json(self.block_type, value)?;
        self.set_content(content)
    }

    fn require_items(&self, command: &'static str) -> Result<usize, CommandError> {
        self.current
            .item_count()
            .ok_or(CommandError::WrongBlockType { command, block_type: self.block_type })
    }

    pub fn move_item(&mut self, from: usize, to: usize) -> Result<(), CommandError> {
        let len = self.require_items("move_item")?;
        if from >= len || to >= len {
            return Err(CommandError::IndexOutOfRange(from.max(to)));
        }
        self.current.move_item(from, to);
        Ok(())
    }

    pub fn remove_item(&mut self, index: usize) -> Result<(), CommandError> {
        let len = self.require_items("remove_item")?;
        if index >= len {
            return Err(CommandError::IndexOutOfRange(index));
        }
        self.current.remove_item(index);
        Ok(())
    }

    /// Parses pasted text for a list or FAQ block and merges the good lines
    /// into the current items. Returns the lines that were skipped.
    pub fn import_items(&mut self, text: &str) -> Result<Vec<LineError>, CommandError> {
        match &mut self.current {
            BlockContent::List(list) => {
                let preview = import::parse_list_import(text);
                list.items = import::merge_list_items(&list.items, preview.items);
                Ok(preview.errors)
            }
            BlockContent::Faq(faq) => {
                let preview = import::parse_faq_import(text);
                faq.items = import::merge_faq_items(&faq.items, preview.items);
                Ok(preview.errors)
            }
            _ => Err(CommandError::WrongBlockType { command: "import_items", block_type: self.block_type }),
        }
    }

    pub fn select_asset(&mut self, asset: &Asset) -> Result<(), CommandError> {
        match &mut self.current {
            BlockContent::Image(image) => {
                image.url = asset.url.clone();
                image.alt = asset.alt_text.clone();
                image.asset_id = Some(asset.id.clone());
                Ok(())
            }
            _ => Err(CommandError::WrongBlockType { command: "select_asset", block_type: self.block_type }),
        }
    }

    pub fn apply<F>(&mut self, command: EditorCommand, find_asset: F) -> Result<Vec<LineError>, CommandError>
    where
        F: Fn(&str) -> Option<Asset>,
    {
        match command {
            EditorCommand::SetContent { content } => self.set_content_json(&content)?,
            EditorCommand::MoveItem { from, to } => self.move_item(from, to)?,
            EditorCommand::MoveUp { index } => {
                if index == 0 {
                    return Err(CommandError::IndexOutOfRange(index));
                }
                self.move_item(index, index - 1)?
            }
            EditorCommand::MoveDown { index } => self.move_item(index, index + 1)?,
            EditorCommand::RemoveItem { index } => self.remove_item(index)?,
            EditorCommand::ImportItems { text } => return self.import_items(&text),
            EditorCommand::SelectAsset { asset_id } => {
                let asset = find_asset(&asset_id).ok_or(CommandError::AssetNotFound(asset_id))?;
                self.select_asset(&asset)?
            }
        }
        Ok(Vec::new())
    }

    fn record_issues(&mut self, issues: Vec<ValidationIssue>) -> Result<(), EditorOutcome> {
        if issues.is_empty() {
            self.issues.clear();
            Ok(())
        } else {
            self.issues = issues.clone();
            Err(EditorOutcome::Invalid { issues })
        }
    }

    pub fn save_draft<P: BlockPersistence>(&mut self, persistence: &P) -> EditorOutcome {
        if !self.current.actions().can_save {
            return EditorOutcome::Disabled { reason: "Select an image before saving.".to_string() };
        }
        if let Err(outcome) = self.record_issues(validate(&self.current)) {
            return outcome;
        }
        let json = match self.current.to_json() {
            Ok(json) => json,
            Err(e) => return EditorOutcome::Failed { message: e.to_string() },
        };
        match persistence.persist_draft(&self.block_id, &json) {
            Ok(()) => {
                self.saved = self.current.clone();
                self.stored_draft = json;
                log::info!("Saved draft of block {} ({})", self.block_key, self.block_id);
                EditorOutcome::Saved
            }
            Err(e) => {
                log::error!("Failed to save draft of block {}: {}", self.block_id, e);
                EditorOutcome::Failed { message: e.to_string() }
            }
        }
    }

    /// Publishes the saved value, not the local edits. When the saved value
    /// was not read from a usable stored draft (blank, undecodable, or the
    /// published fallback) it is written as the draft first, so the copy in
    /// storage never promotes anything else.
    pub fn publish<P: BlockPersistence>(&mut self, persistence: &P) -> EditorOutcome {
        if !self.saved.actions().can_publish {
            let reason = match self.block_type {
                BlockType::Image => "Select an image before publishing.",
                _ => "Fill in the content before publishing.",
            };
            return EditorOutcome::Disabled { reason: reason.to_string() };
        }
        if let Err(outcome) = self.record_issues(validate(&self.saved)) {
            return outcome;
        }
        let json = match self.saved.to_json() {
            Ok(json) => json,
            Err(e) => return EditorOutcome::Failed { message: e.to_string() },
        };
        if self.stored_draft != json {
            if let Err(e) = persistence.persist_draft(&self.block_id, &json) {
                log::error!("Failed to store draft of block {} before publishing: {}", self.block_id, e);
                return EditorOutcome::Failed { message: e.to_string() };
            }
            self.stored_draft = json;
        }
        match persistence.persist_publish(&self.block_id) {
            Ok(()) => {
                self.stored_published = self.stored_draft.clone();
                log::info!("Published block {} ({})", self.block_key, self.block_id);
                EditorOutcome::Published
            }
            Err(e) => {
                log::error!("Failed to publish block {}: {}", self.block_id, e);
                EditorOutcome::Failed { message: e.to_string() }
            }
        }
    }

    pub fn view(&self) -> EditorView {
        EditorView {
            block_id: self.block_id.clone(),
            page: self.page.clone(),
            block_key: self.block_key.clone(),
            block_type: self.block_type,
            content: self.current.to_json().unwrap_or(Value::Null),
            is_dirty: self.is_dirty(),
            is_published: self.is_published(),
            actions: self.current.actions(),
            issues: self.issues.clone(),
        }
    }
}
