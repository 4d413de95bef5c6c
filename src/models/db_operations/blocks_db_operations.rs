use crate::cms::editor::BlockPersistence;
use crate::models::CmsBlock;
use chrono::Utc;
use redb::{CommitError, Database, ReadableTable, StorageError, TableDefinition, TableError, TransactionError};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum BlockStoreError {
    #[error("Redb storage error: {0}")]
    RedbStorage(#[from] StorageError),
    #[error("Redb transaction error: {0}")]
    RedbTransaction(#[from] TransactionError),
    #[error("Redb table error: {0}")]
    RedbTable(#[from] TableError),
    #[error("Redb commit error: {0}")]
    RedbCommit(#[from] CommitError),
    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),
    #[error("UUID parse error: {0}")]
    Uuid(#[from] uuid::Error),
    #[error("Block not found: {0}")]
    NotFound(String),
    #[error("Page '{0}' already has a block named '{1}'")]
    DuplicateKey(String, String),
}

/// Block id -> JSON of the whole block record.
pub const BLOCKS: TableDefinition<&[u8; 16], &str> = TableDefinition::new("cms_blocks");
/// (page, block_key) -> block id. A key is unique within its page.
pub const PAGE_INDEX: TableDefinition<(&str, &str), &[u8; 16]> = TableDefinition::new("cms_page_index");

fn block_id_bytes(block_id: &str) -> Result<[u8; 16], BlockStoreError> {
    Ok(Uuid::parse_str(block_id)?.into_bytes())
}

pub fn create_block(db: &Database, page: &str, block_key: &str, block_type: &str) -> Result<CmsBlock, BlockStoreError> {
    let block = CmsBlock {
        id: Uuid::new_v4().to_string(),
        page: page.to_string(),
        block_key: block_key.to_string(),
        block_type: block_type.to_string(),
        content_draft: Value::Null,
        content_published: Value::Null,
        updated_at: Utc::now(),
    };
    let id_bytes = block_id_bytes(&block.id)?;
    let json = serde_json::to_string(&block)?;

    let write_txn = db.begin_write()?;
    {
        let mut blocks_table = write_txn.open_table(BLOCKS)?;
        let mut page_index = write_txn.open_table(PAGE_INDEX)?;

        if page_index.get((page, block_key))?.is_some() {
            return Err(BlockStoreError::DuplicateKey(page.to_string(), block_key.to_string()));
        }
        blocks_table.insert(&id_bytes, json.as_str())?;
        page_index.insert((page, block_key), &id_bytes)?;
    }
    write_txn.commit()?;
    Ok(block)
}

/// Creates the block unless the page already has one under that key.
/// Returns the block and whether it was created.
pub fn ensure_block(db: &Database, page: &str, block_key: &str, block_type: &str) -> Result<(CmsBlock, bool), BlockStoreError> {
    if let Some(existing) = read_block_by_key(db, page, block_key)? {
        return Ok((existing, false));
    }
    create_block(db, page, block_key, block_type).map(|block| (block, true))
}

pub fn read_block(db: &Database, block_id: &str) -> Result<Option<CmsBlock>, BlockStoreError> {
    let id_bytes = match block_id_bytes(block_id) {
        Ok(bytes) => bytes,
        Err(_) => return Ok(None),
    };
    let read_txn = db.begin_read()?;
    let blocks_table = read_txn.open_table(BLOCKS)?;
    let block = match blocks_table.get(&id_bytes)? {
        Some(guard) => Some(serde_json::from_str(guard.value())?),
        None => None,
    };
    Ok(block)
}

pub fn read_block_by_key(db: &Database, page: &str, block_key: &str) -> Result<Option<CmsBlock>, BlockStoreError> {
    let read_txn = db.begin_read()?;
    let page_index = read_txn.open_table(PAGE_INDEX)?;
    let blocks_table = read_txn.open_table(BLOCKS)?;

    let Some(id_guard) = page_index.get((page, block_key))? else {
        return Ok(None);
    };
    let id_bytes = *id_guard.value();
    let block = match blocks_table.get(&id_bytes)? {
        Some(guard) => Some(serde_json::from_str(guard.value())?),
        None => None,
    };
    Ok(block)
}

/// All blocks of a page, ordered by block key. Rows that fail to decode are
/// logged and skipped so one bad record never hides the rest of the page.
pub fn list_blocks_by_page(db: &Database, page: &str) -> Result<Vec<CmsBlock>, BlockStoreError> {
    let read_txn = db.begin_read()?;
    let page_index = read_txn.open_table(PAGE_INDEX)?;
    let blocks_table = read_txn.open_table(BLOCKS)?;

    let mut blocks = Vec::new();
    for entry in page_index.range((page, "")..)? {
        let (key, id) = entry?;
        if key.value().0 != page {
            break;
        }
        if let Some(guard) = blocks_table.get(id.value())? {
            match serde_json::from_str::<CmsBlock>(guard.value()) {
                Ok(block) => blocks.push(block),
                Err(e) => log::error!("Skipping malformed block record on page '{}': {}", page, e),
            }
        }
    }
    Ok(blocks)
}

pub fn list_all_blocks(db: &Database) -> Result<Vec<CmsBlock>, BlockStoreError> {
    let read_txn = db.begin_read()?;
    let page_index = read_txn.open_table(PAGE_INDEX)?;
    let blocks_table = read_txn.open_table(BLOCKS)?;

    let mut blocks = Vec::new();
    for entry in page_index.iter()? {
        let (_key, id) = entry?;
        if let Some(guard) = blocks_table.get(id.value())? {
            match serde_json::from_str::<CmsBlock>(guard.value()) {
                Ok(block) => blocks.push(block),
                Err(e) => log::error!("Skipping malformed block record: {}", e),
            }
        }
    }
    Ok(blocks)
}

fn update_block<F>(db: &Database, block_id: &str, change: F) -> Result<(), BlockStoreError>
where
    F: FnOnce(&mut CmsBlock),
{
    let id_bytes = block_id_bytes(block_id)?;
    let write_txn = db.begin_write()?;
    {
        let mut blocks_table = write_txn.open_table(BLOCKS)?;
        let mut block: CmsBlock = {
            let guard = blocks_table
                .get(&id_bytes)?
                .ok_or_else(|| BlockStoreError::NotFound(block_id.to_string()))?;
            serde_json::from_str(guard.value())?
        };
        change(&mut block);
        block.updated_at = Utc::now();
        let json = serde_json::to_string(&block)?;
        blocks_table.insert(&id_bytes, json.as_str())?;
    }
    write_txn.commit()?;
    Ok(())
}

pub fn save_draft(db: &Database, block_id: &str, content: &Value) -> Result<(), BlockStoreError> {
    update_block(db, block_id, |block| block.content_draft = content.clone())
}

/// Copies the stored draft over the published value.
pub fn publish(db: &Database, block_id: &str) -> Result<(), BlockStoreError> {
    update_block(db, block_id, |block| block.content_published = block.content_draft.clone())
}

/// Editor persistence backed by the content database.
pub struct RedbBlockStore<'a> {
    db: &'a Database,
}

impl<'a> RedbBlockStore<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }
}

impl BlockPersistence for RedbBlockStore<'_> {
    type Error = BlockStoreError;

    fn persist_draft(&self, block_id: &str, content: &Value) -> Result<(), BlockStoreError> {
        save_draft(self.db, block_id, content)
    }

    fn persist_publish(&self, block_id: &str) -> Result<(), BlockStoreError> {
        publish(self.db, block_id)
    }
}
