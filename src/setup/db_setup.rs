use crate::cms::BlockType;
use crate::models::db_operations::blocks_db_operations::{self, BlockStoreError, BLOCKS, PAGE_INDEX};
use crate::models::CmsBlock;
use redb::{CommitError, Database, StorageError, TableError, TransactionError};
use rusqlite::{Connection, Result as RusqliteResult, Transaction};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SetupError {
    #[error("Rusqlite error: {0}")]
    Rusqlite(#[from] rusqlite::Error),
    #[error("Redb storage error: {0}")]
    RedbStorage(#[from] StorageError),
    #[error("Redb transaction error: {0}")]
    RedbTransaction(#[from] TransactionError),
    #[error("Redb table error: {0}")]
    RedbTable(#[from] TableError),
    #[error("Redb commit error: {0}")]
    RedbCommit(#[from] CommitError),
    #[error("Content store error: {0}")]
    BlockStore(#[from] BlockStoreError),
}

/// A content slot the public pages render.
pub struct BlockSlot {
    pub page: &'static str,
    pub block_key: &'static str,
    pub block_type: BlockType,
}

const fn slot(page: &'static str, block_key: &'static str, block_type: BlockType) -> BlockSlot {
    BlockSlot { page, block_key, block_type }
}

pub const SITE_BLOCKS: &[BlockSlot] = &[
    slot("home", "hero", BlockType::Banner),
    slot("home", "intro", BlockType::Richtext),
    slot("home", "benefits", BlockType::CardList),
    slot("home", "how-it-works", BlockType::StepList),
    slot("home", "catalog-cta", BlockType::Cta),
    slot("como-funciona", "title", BlockType::Text),
    slot("como-funciona", "body", BlockType::Richtext),
    slot("como-funciona", "steps", BlockType::StepList),
    slot("como-funciona", "documents", BlockType::List),
    slot("faq", "title", BlockType::Text),
    slot("faq", "questions", BlockType::Faq),
    slot("contato", "title", BlockType::Text),
    slot("contato", "image", BlockType::Image),
    slot("contato", "whatsapp-cta", BlockType::Cta),
];

/// Creates every missing slot of `SITE_BLOCKS`; existing blocks are left
/// untouched. Returns each slot's block and whether it was created.
pub fn provision_site_blocks(db: &Database) -> Result<Vec<(CmsBlock, bool)>, SetupError> {
    let mut provisioned = Vec::with_capacity(SITE_BLOCKS.len());
    for slot in SITE_BLOCKS {
        let entry = blocks_db_operations::ensure_block(db, slot.page, slot.block_key, slot.block_type.as_str())?;
        provisioned.push(entry);
    }
    Ok(provisioned)
}

pub fn setup_site_db(conn: &mut Connection) -> Result<(), SetupError> {
    let tx = conn.transaction()?;
    println!("- Creating 'admins' table...");
    tx.execute(
        "CREATE TABLE IF NOT EXISTS admins (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1,
            last_login_time TEXT
        )",
        [],
    )?;

    println!("- Creating 'settings' table...");
    tx.execute(
        "CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )",
        [],
    )?;

    println!("- Creating 'properties' table...");
    tx.execute(
        "CREATE TABLE IF NOT EXISTS properties (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            property_type TEXT NOT NULL,
            city TEXT NOT NULL,
            neighborhood TEXT NOT NULL,
            address TEXT NOT NULL DEFAULT '',
            area_m2 REAL,
            bedrooms INTEGER,
            first_auction_price INTEGER NOT NULL,
            second_auction_price INTEGER,
            appraisal_value INTEGER,
            min_bid INTEGER NOT NULL,
            auction_type TEXT NOT NULL,
            first_auction_at TEXT,
            second_auction_at TEXT,
            image_urls TEXT NOT NULL DEFAULT '[]',
            notice_url TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;
    tx.execute(
        "CREATE INDEX IF NOT EXISTS idx_properties_catalog ON properties (is_active, city, neighborhood)",
        [],
    )?;
    tx.execute("CREATE INDEX IF NOT EXISTS idx_properties_min_bid ON properties (min_bid)", [])?;

    println!("- Creating 'leads' table...");
    tx.execute(
        "CREATE TABLE IF NOT EXISTS leads (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT,
            phone TEXT,
            message TEXT NOT NULL DEFAULT '',
            property_id TEXT,
            created_at TEXT NOT NULL,
            FOREIGN KEY (property_id) REFERENCES properties(id) ON DELETE SET NULL
        )",
        [],
    )?;

    println!("- Creating 'assets' table...");
    tx.execute(
        "CREATE TABLE IF NOT EXISTS assets (
            id TEXT PRIMARY KEY,
            filename TEXT NOT NULL,
            url TEXT NOT NULL,
            alt_text TEXT NOT NULL DEFAULT '',
            title TEXT NOT NULL DEFAULT '',
            file_format TEXT NOT NULL,
            file_size INTEGER NOT NULL,
            uploaded_at TEXT NOT NULL
        )",
        [],
    )?;

    println!("- Creating 'marketing_schedules' table...");
    tx.execute(
        "CREATE TABLE IF NOT EXISTS marketing_schedules (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            channel TEXT NOT NULL CHECK(channel IN ('email', 'whatsapp')),
            audience TEXT NOT NULL,
            message TEXT NOT NULL,
            send_at TEXT NOT NULL,
            status TEXT NOT NULL CHECK(status IN ('pending', 'queued', 'cancelled')),
            created_at TEXT NOT NULL
        )",
        [],
    )?;

    seed_initial_settings(&tx)?;

    tx.commit()?;
    Ok(())
}

fn seed_initial_settings(tx: &Transaction) -> RusqliteResult<()> {
    println!("- Seeding initial settings...");
    let default_max_size = "10";
    tx.execute(
        "INSERT OR IGNORE INTO settings (key, value) VALUES ('max_file_upload_size_mb', ?1)",
        [&default_max_size],
    )?;
    println!("  > Default max file upload size set to: {} MB", default_max_size);

    let default_mime_types = "image/jpeg,image/png,image/webp,application/pdf";
    tx.execute(
        "INSERT OR IGNORE INTO settings (key, value) VALUES ('allowed_mime_types', ?1)",
        [&default_mime_types],
    )?;
    println!("  > Default allowed MIME types set to: {}", default_mime_types);

    Ok(())
}

pub fn setup_content_db(db: &Database) -> Result<(), SetupError> {
    let write_txn = db.begin_write()?;
    {
        println!("- Creating 'cms_blocks' table in Redb...");
        write_txn.open_table(BLOCKS)?;

        println!("- Creating 'cms_page_index' table in Redb...");
        write_txn.open_table(PAGE_INDEX)?;
    }
    write_txn.commit()?;
    Ok(())
}
