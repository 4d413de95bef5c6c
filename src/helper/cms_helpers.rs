use crate::cms::editor::{CommandError, EditorCommand, EditorView};
use crate::cms::factory::{editor_for, render_published, EditorSlot, PublishedBlock, SlotView};
use crate::cms::import::{self, LineError};
use crate::cms::locks::BlockLocks;
use crate::cms::{BlockType, EditorOutcome};
use crate::helper::asset_helpers;
use crate::models::db_operations::blocks_db_operations::{self, BlockStoreError, RedbBlockStore};
use crate::models::Asset;
use crate::DbPool;
use redb::Database;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockAction {
    SaveDraft,
    Publish,
}

/// Body of the draft and publish endpoints: edits to replay before acting.
#[derive(Debug, Default, Deserialize)]
pub struct EditRequest {
    #[serde(default)]
    pub commands: Vec<EditorCommand>,
}

#[derive(Debug, Serialize)]
pub struct EditResponse {
    #[serde(flatten)]
    pub outcome: EditorOutcome,
    pub editor: EditorView,
    pub skipped_lines: Vec<LineError>,
}

#[derive(Debug)]
pub enum EditResult {
    NotFound,
    /// Another save or publish of the block is in flight.
    Busy,
    /// The stored type tag has no editor.
    Unrecognized(SlotView),
    /// A replayed command did not fit the block.
    Rejected { index: usize, error: CommandError },
    Done(EditResponse),
}

pub fn fetch_page_editors(db: &Database, page: &str) -> Result<Vec<SlotView>, BlockStoreError> {
    Ok(blocks_db_operations::list_blocks_by_page(db, page)?
        .iter()
        .map(|block| editor_for(block).view())
        .collect())
}

pub fn fetch_block_editor(db: &Database, block_id: &str) -> Result<Option<SlotView>, BlockStoreError> {
    Ok(blocks_db_operations::read_block(db, block_id)?.map(|block| editor_for(&block).view()))
}

/// What visitors see for a page: each block's published value, rendered.
pub fn fetch_published_page(db: &Database, page: &str) -> Result<Vec<PublishedBlock>, BlockStoreError> {
    Ok(blocks_db_operations::list_blocks_by_page(db, page)?
        .iter()
        .map(render_published)
        .collect())
}

fn find_asset(pool: &DbPool, asset_id: &str) -> Option<Asset> {
    match asset_helpers::fetch_asset(pool, asset_id) {
        Ok(asset) => asset,
        Err(e) => {
            log::error!("Failed to look up asset {}: {}", asset_id, e);
            None
        }
    }
}

/// Replays the edits on a fresh editor and then saves or publishes, holding
/// the block's lock for the whole sequence. Publishing saves pending edits
/// first so the published value is what the admin was looking at.
pub fn edit_block(
    db: &Database,
    pool: &DbPool,
    locks: &BlockLocks,
    block_id: &str,
    request: EditRequest,
    action: BlockAction,
) -> Result<EditResult, BlockStoreError> {
    let Some(_guard) = locks.try_acquire(block_id) else {
        return Ok(EditResult::Busy);
    };
    let Some(block) = blocks_db_operations::read_block(db, block_id)? else {
        return Ok(EditResult::NotFound);
    };
    let mut editor = match editor_for(&block) {
        EditorSlot::Editor(editor) => editor,
        slot @ EditorSlot::Unrecognized { .. } => return Ok(EditResult::Unrecognized(slot.view())),
    };

    let mut skipped_lines = Vec::new();
    for (index, command) in request.commands.into_iter().enumerate() {
        match editor.apply(command, |id| find_asset(pool, id)) {
            Ok(skipped) => skipped_lines.extend(skipped),
            Err(error) => return Ok(EditResult::Rejected { index, error }),
        }
    }

    let store = RedbBlockStore::new(db);
    let outcome = match action {
        BlockAction::SaveDraft => editor.save_draft(&store),
        BlockAction::Publish if editor.is_dirty() => match editor.save_draft(&store) {
            EditorOutcome::Saved => editor.publish(&store),
            other => other,
        },
        BlockAction::Publish => editor.publish(&store),
    };

    Ok(EditResult::Done(EditResponse { outcome, editor: editor.view(), skipped_lines }))
}

/// Dry run of a paste for the import dialog; nothing is stored.
pub fn preview_import(block_type: BlockType, text: &str) -> Option<Value> {
    match block_type {
        BlockType::List => Some(json!(import::parse_list_import(text))),
        BlockType::Faq => Some(json!(import::parse_faq_import(text))),
        _ => None,
    }
}
