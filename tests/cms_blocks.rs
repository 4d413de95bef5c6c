mod common;

use auctionsite_backend::cms::editor::EditorCommand;
use auctionsite_backend::cms::factory::{PublishedBody, SlotView};
use auctionsite_backend::cms::locks::BlockLocks;
use auctionsite_backend::cms::{editor_for, render_published, EditorOutcome, EditorSlot};
use auctionsite_backend::helper::cms_helpers::{self, BlockAction, EditRequest, EditResult};
use auctionsite_backend::models::db_operations::assets_db_operations;
use auctionsite_backend::models::db_operations::blocks_db_operations::{self, BlockStoreError, RedbBlockStore};
use auctionsite_backend::models::Asset;
use chrono::Utc;
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::tempdir;

#[test]
fn block_keys_are_unique_within_a_page() {
    let dir = tempdir().unwrap();
    let db = common::content_db(dir.path());

    blocks_db_operations::create_block(&db, "home", "hero", "banner").unwrap();
    blocks_db_operations::create_block(&db, "faq", "hero", "banner").unwrap();
    let err = blocks_db_operations::create_block(&db, "home", "hero", "text").unwrap_err();
    assert!(matches!(err, BlockStoreError::DuplicateKey(page, key) if page == "home" && key == "hero"));
}

#[test]
fn page_listing_is_scoped_and_ordered_by_key() {
    let dir = tempdir().unwrap();
    let db = common::content_db(dir.path());

    blocks_db_operations::create_block(&db, "home", "intro", "richtext").unwrap();
    blocks_db_operations::create_block(&db, "home", "benefits", "card-list").unwrap();
    blocks_db_operations::create_block(&db, "homepage", "alpha", "text").unwrap();
    blocks_db_operations::create_block(&db, "home", "hero", "banner").unwrap();

    let keys: Vec<String> = blocks_db_operations::list_blocks_by_page(&db, "home")
        .unwrap()
        .into_iter()
        .map(|b| b.block_key)
        .collect();
    assert_eq!(keys, vec!["benefits", "hero", "intro"]);

    assert!(blocks_db_operations::read_block_by_key(&db, "home", "hero").unwrap().is_some());
    assert!(blocks_db_operations::read_block_by_key(&db, "faq", "hero").unwrap().is_none());
    assert!(blocks_db_operations::read_block(&db, "not-a-uuid").unwrap().is_none());
}

#[test]
fn editor_saves_then_publishes_through_the_store() {
    let dir = tempdir().unwrap();
    let db = common::content_db(dir.path());
    let block = blocks_db_operations::create_block(&db, "faq", "title", "text").unwrap();

    let EditorSlot::Editor(mut editor) = editor_for(&block) else { panic!("text has an editor") };
    editor.set_content_json(&json!({ "value": "Perguntas frequentes" })).unwrap();
    assert!(editor.is_dirty());

    let store = RedbBlockStore::new(&db);
    assert_eq!(editor.save_draft(&store), EditorOutcome::Saved);
    assert!(!editor.is_dirty());
    assert!(!editor.is_published());

    let stored = blocks_db_operations::read_block(&db, &block.id).unwrap().unwrap();
    assert_eq!(stored.content_draft["value"], "Perguntas frequentes");
    assert!(!stored.is_published());

    assert_eq!(editor.publish(&store), EditorOutcome::Published);
    assert!(editor.is_published());

    let stored = blocks_db_operations::read_block(&db, &block.id).unwrap().unwrap();
    assert_eq!(stored.content_published, stored.content_draft);
    let rendered = render_published(&stored);
    assert!(matches!(rendered.body, PublishedBody::Ready { .. }));
}

#[test]
fn publish_request_saves_pending_edits_first() {
    let dir = tempdir().unwrap();
    let db = common::content_db(dir.path());
    let pool = common::site_pool(dir.path());
    let locks = BlockLocks::default();
    let block = blocks_db_operations::create_block(&db, "como-funciona", "documents", "list").unwrap();

    let request = EditRequest {
        commands: vec![
            EditorCommand::SetContent { content: json!({ "items": ["RG", "CPF"] }) },
            EditorCommand::ImportItems { text: "- Comprovante de residência\n- CPF\n\n".to_string() },
        ],
    };
    let result = cms_helpers::edit_block(&db, &pool, &locks, &block.id, request, BlockAction::Publish).unwrap();

    let EditResult::Done(response) = result else { panic!("expected the edit to run") };
    assert_eq!(response.outcome, EditorOutcome::Published);
    assert!(response.skipped_lines.is_empty());
    assert!(!response.editor.is_dirty);
    assert!(response.editor.is_published);

    let stored = blocks_db_operations::read_block(&db, &block.id).unwrap().unwrap();
    assert_eq!(stored.content_published["items"], json!(["RG", "CPF", "Comprovante de residência"]));
    assert!(locks.try_acquire(&block.id).is_some());
}

#[test]
fn publishing_without_a_stored_draft_keeps_the_live_content() {
    let dir = tempdir().unwrap();
    let db = common::content_db(dir.path());
    let pool = common::site_pool(dir.path());
    let locks = BlockLocks::default();
    let block = blocks_db_operations::create_block(&db, "faq", "title", "text").unwrap();
    let live = json!({ "value": "Live content" });
    blocks_db_operations::save_draft(&db, &block.id, &live).unwrap();
    blocks_db_operations::publish(&db, &block.id).unwrap();
    blocks_db_operations::save_draft(&db, &block.id, &serde_json::Value::Null).unwrap();

    let before = blocks_db_operations::read_block(&db, &block.id).unwrap().unwrap();
    let EditorSlot::Editor(editor) = editor_for(&before) else { panic!("text has an editor") };
    assert_eq!(editor.is_published(), before.is_published());
    assert!(!editor.is_published());

    let result =
        cms_helpers::edit_block(&db, &pool, &locks, &block.id, EditRequest::default(), BlockAction::Publish).unwrap();
    let EditResult::Done(response) = result else { panic!("expected the edit to run") };
    assert_eq!(response.outcome, EditorOutcome::Published);
    assert!(response.editor.is_published);

    let stored = blocks_db_operations::read_block(&db, &block.id).unwrap().unwrap();
    assert_eq!(stored.content_published, live);
    assert_eq!(stored.content_draft, live);
    assert!(stored.is_published());
}

#[test]
fn invalid_edits_are_not_persisted() {
    let dir = tempdir().unwrap();
    let db = common::content_db(dir.path());
    let pool = common::site_pool(dir.path());
    let locks = BlockLocks::default();
    let block = blocks_db_operations::create_block(&db, "home", "catalog-cta", "cta").unwrap();

    let request = EditRequest {
        commands: vec![EditorCommand::SetContent { content: json!({ "text": "a".repeat(120), "url": "/catalogo" }) }],
    };
    let result = cms_helpers::edit_block(&db, &pool, &locks, &block.id, request, BlockAction::SaveDraft).unwrap();

    let EditResult::Done(response) = result else { panic!("expected the edit to run") };
    assert!(matches!(response.outcome, EditorOutcome::Invalid { ref issues } if !issues.is_empty()));
    assert!(response.editor.is_dirty);

    let stored = blocks_db_operations::read_block(&db, &block.id).unwrap().unwrap();
    assert!(stored.content_draft.is_null());
}

#[test]
fn concurrent_mutation_of_a_block_is_rejected() {
    let dir = tempdir().unwrap();
    let db = common::content_db(dir.path());
    let pool = common::site_pool(dir.path());
    let locks = BlockLocks::default();
    let block = blocks_db_operations::create_block(&db, "faq", "title", "text").unwrap();

    let _held = locks.try_acquire(&block.id).unwrap();
    let result =
        cms_helpers::edit_block(&db, &pool, &locks, &block.id, EditRequest::default(), BlockAction::SaveDraft).unwrap();
    assert!(matches!(result, EditResult::Busy));
}

#[test]
fn selected_asset_fills_an_image_block() {
    let dir = tempdir().unwrap();
    let db = common::content_db(dir.path());
    let pool = common::site_pool(dir.path());
    let locks = BlockLocks::default();
    let block = blocks_db_operations::create_block(&db, "contato", "image", "image").unwrap();

    let asset = Asset {
        id: "0f6b3c1e-8d1a-4a55-9d7e-2b1f3c4d5e6f".to_string(),
        filename: "fachada.jpg".to_string(),
        url: "/media/assets/0f/6b/0f6b3c1e-8d1a-4a55-9d7e-2b1f3c4d5e6f.jpg".to_string(),
        alt_text: "Fachada do escritório".to_string(),
        title: String::new(),
        file_format: "jpg".to_string(),
        file_size: 2048,
        uploaded_at: Utc::now(),
    };
    assets_db_operations::add_asset(&pool.get().unwrap(), &asset).unwrap();

    let missing = EditRequest { commands: vec![EditorCommand::SelectAsset { asset_id: "nope".to_string() }] };
    let result = cms_helpers::edit_block(&db, &pool, &locks, &block.id, missing, BlockAction::SaveDraft).unwrap();
    assert!(matches!(result, EditResult::Rejected { index: 0, .. }));

    let request = EditRequest { commands: vec![EditorCommand::SelectAsset { asset_id: asset.id.clone() }] };
    let result = cms_helpers::edit_block(&db, &pool, &locks, &block.id, request, BlockAction::SaveDraft).unwrap();
    let EditResult::Done(response) = result else { panic!("expected the edit to run") };
    assert_eq!(response.outcome, EditorOutcome::Saved);

    let stored = blocks_db_operations::read_block(&db, &block.id).unwrap().unwrap();
    assert_eq!(stored.content_draft["url"], asset.url.as_str());
    assert_eq!(stored.content_draft["alt"], "Fachada do escritório");
    assert_eq!(stored.content_draft["asset_id"], asset.id.as_str());
}

#[test]
fn unknown_block_type_only_breaks_its_own_slot() {
    let dir = tempdir().unwrap();
    let db = common::content_db(dir.path());
    blocks_db_operations::create_block(&db, "home", "carousel", "carousel").unwrap();
    blocks_db_operations::create_block(&db, "home", "intro", "richtext").unwrap();

    let slots = cms_helpers::fetch_page_editors(&db, "home").unwrap();
    assert_eq!(slots.len(), 2);
    match &slots[0] {
        SlotView::Error { error, .. } => assert_eq!(error, "Unknown block type: carousel"),
        SlotView::Editor(_) => panic!("carousel has no editor"),
    }
    assert!(matches!(slots[1], SlotView::Editor(_)));

    let published = cms_helpers::fetch_published_page(&db, "home").unwrap();
    assert!(matches!(published[0].body, PublishedBody::Unavailable { .. }));
    assert!(matches!(published[1].body, PublishedBody::Empty));
}
