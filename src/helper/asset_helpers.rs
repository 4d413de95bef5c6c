use crate::cms::validation::MAX_ALT_CHARS;
use crate::helper::admin_helpers;
use crate::helper::sanitization_helpers::strip_all_html;
use crate::models::db_operations::assets_db_operations;
use crate::models::Asset;
use crate::DbPool;
use actix_multipart::Multipart;
use actix_web::{web, web::BytesMut};
use chrono::Utc;
use futures_util::StreamExt;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

const MAX_TITLE_CHARS: usize = 200;

#[derive(Error, Debug)]
pub enum AssetError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("R2D2 Pool error: {0}")]
    Pool(#[from] r2d2::Error),
    #[error("File system error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Upload stream error: {0}")]
    Stream(String),
    /// The upload itself is unacceptable; the message is shown to the user.
    #[error("{0}")]
    Rejected(String),
}

impl AssetError {
    pub fn is_rejection(&self) -> bool {
        matches!(self, AssetError::Rejected(_))
    }
}

/// What the picker hands back to an image block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetSelection {
    pub id: String,
    pub url: String,
    pub alt_text: String,
}

impl From<&Asset> for AssetSelection {
    fn from(asset: &Asset) -> Self {
        Self { id: asset.id.clone(), url: asset.url.clone(), alt_text: asset.alt_text.clone() }
    }
}

/// Maps a whitelisted MIME type to the only extension we store it under.
fn mime_to_safe_extension(mime_type: &str) -> Option<&'static str> {
    let map: BTreeMap<&str, &str> = [
        ("application/pdf", "pdf"),
        ("image/gif", "gif"),
        ("image/jpeg", "jpg"),
        ("image/png", "png"),
        ("image/svg+xml", "svg"),
        ("image/webp", "webp"),
    ]
    .iter()
    .cloned()
    .collect();

    map.get(mime_type).cloned()
}

/// Whether uploads of this MIME type can be stored at all.
pub fn is_storable_mime(mime_type: &str) -> bool {
    mime_to_safe_extension(mime_type).is_some()
}

/// `assets/ab/cd/<id>.<ext>`, relative to the media root.
pub fn asset_relative_path(id: &str, ext: &str) -> PathBuf {
    let dir1 = id.get(0..2).unwrap_or("00");
    let dir2 = id.get(2..4).unwrap_or("00");
    PathBuf::from("assets").join(dir1).join(dir2).join(format!("{}.{}", id, ext))
}

pub fn asset_public_url(id: &str, ext: &str) -> String {
    let relative = asset_relative_path(id, ext);
    format!("/media/{}", relative.to_string_lossy().replace('\\', "/"))
}

fn display_filename(raw: &str) -> String {
    Path::new(raw)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| "upload".to_string())
}

fn stream_error(e: impl std::fmt::Display) -> AssetError {
    AssetError::Stream(e.to_string())
}

fn check_metadata(alt_text: &str, title: &str) -> Result<(), AssetError> {
    if alt_text.chars().count() > MAX_ALT_CHARS {
        return Err(AssetError::Rejected(format!("Alt text cannot exceed {} characters.", MAX_ALT_CHARS)));
    }
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(AssetError::Rejected(format!("Title cannot exceed {} characters.", MAX_TITLE_CHARS)));
    }
    Ok(())
}

async fn read_text_field(field: &mut actix_multipart::Field) -> Result<String, AssetError> {
    let mut data = BytesMut::new();
    while let Some(chunk) = field.next().await {
        data.extend_from_slice(&chunk.map_err(stream_error)?);
    }
    String::from_utf8(data.to_vec()).map_err(|_| AssetError::Rejected("Invalid UTF-8 in form field.".to_string()))
}

/// Stores an uploaded file (multipart fields `file`, `alt_text`, `title`)
/// under the media root and records it in the library.
pub async fn save_asset(media_path: &str, pool: &DbPool, mut payload: Multipart) -> Result<Asset, AssetError> {
    let settings = admin_helpers::get_settings(&*pool.get()?);
    let max_file_size_bytes = settings.max_upload_bytes();
    let allowed_mime_types = settings.allowed_mime_list();
    if allowed_mime_types.is_empty() {
        return Err(AssetError::Rejected("File uploads are disabled. No MIME types are configured.".to_string()));
    }

    let asset_id = Uuid::new_v4().to_string();
    let mut stored: Option<(PathBuf, String, String)> = None;
    let mut file_size: u64 = 0;
    let mut alt_text = String::new();
    let mut title = String::new();

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(stream_error)?;
        let field_name = field.content_disposition().get_name().unwrap_or_default().to_string();

        match field_name.as_str() {
            "file" => {
                let content_type = field
                    .content_type()
                    .map(|m| m.essence_str().to_lowercase())
                    .ok_or_else(|| AssetError::Rejected("Content-Type not available.".to_string()))?;

                if !allowed_mime_types.contains(&content_type) {
                    return Err(AssetError::Rejected(format!("Unsupported file type: '{}'.", content_type)));
                }
                let ext = match mime_to_safe_extension(&content_type) {
                    Some(ext) => ext,
                    None => {
                        log::error!("Allowed MIME type '{}' has no safe extension mapping.", content_type);
                        return Err(AssetError::Rejected(format!("Unsupported file type: '{}'.", content_type)));
                    }
                };
                let original_filename = display_filename(field.content_disposition().get_filename().unwrap_or("upload"));

                let final_path = PathBuf::from(media_path).join(asset_relative_path(&asset_id, ext));
                web::block({
                    let dir = final_path.parent().map(Path::to_path_buf).unwrap_or_default();
                    move || fs::create_dir_all(dir)
                })
                .await
                .map_err(stream_error)??;

                let mut f = web::block({
                    let path = final_path.clone();
                    move || fs::File::create(path)
                })
                .await
                .map_err(stream_error)??;

                while let Some(chunk) = field.next().await {
                    let data = chunk.map_err(stream_error)?;
                    file_size += data.len() as u64;
                    if file_size > max_file_size_bytes {
                        drop(f);
                        let _ = fs::remove_file(&final_path);
                        return Err(AssetError::Rejected(format!(
                            "File is too large. Maximum size is {}MB.",
                            settings.max_file_upload_size_mb
                        )));
                    }
                    f = web::block(move || f.write_all(&data).map(|_| f)).await.map_err(stream_error)??;
                }
                stored = Some((final_path, ext.to_string(), original_filename));
            }
            "alt_text" => alt_text = strip_all_html(read_text_field(&mut field).await?.trim()),
            "title" => title = strip_all_html(read_text_field(&mut field).await?.trim()),
            _ => (),
        }
    }

    let Some((final_path, ext, filename)) = stored else {
        return Err(AssetError::Rejected("No file was uploaded.".to_string()));
    };
    if let Err(e) = check_metadata(&alt_text, &title) {
        let _ = fs::remove_file(&final_path);
        return Err(e);
    }

    let asset = Asset {
        url: asset_public_url(&asset_id, &ext),
        id: asset_id,
        filename,
        alt_text,
        title,
        file_format: ext,
        file_size: i64::try_from(file_size).unwrap_or(i64::MAX),
        uploaded_at: Utc::now(),
    };
    let conn = pool.get()?;
    if let Err(e) = assets_db_operations::add_asset(&conn, &asset) {
        let _ = fs::remove_file(&final_path);
        return Err(e.into());
    }
    log::info!("Uploaded asset {} ({}, {} bytes)", asset.id, asset.filename, asset.file_size);
    Ok(asset)
}

pub fn fetch_assets(pool: &DbPool, limit: u32, offset: u32) -> Result<Vec<Asset>, AssetError> {
    let conn = pool.get()?;
    Ok(assets_db_operations::list_assets(&conn, limit, offset)?)
}

pub fn fetch_asset(pool: &DbPool, id: &str) -> Result<Option<Asset>, AssetError> {
    let conn = pool.get()?;
    Ok(assets_db_operations::read_asset(&conn, id)?)
}

pub fn update_asset_metadata(pool: &DbPool, id: &str, alt_text: &str, title: &str) -> Result<bool, AssetError> {
    let alt_text = strip_all_html(alt_text.trim());
    let title = strip_all_html(title.trim());
    check_metadata(&alt_text, &title)?;
    let conn = pool.get()?;
    Ok(assets_db_operations::update_asset_metadata(&conn, id, &alt_text, &title)?)
}

/// Removes the row first, then the file. File errors are only logged.
pub async fn delete_asset(media_path: &str, pool: &DbPool, id: &str) -> Result<bool, AssetError> {
    let asset = {
        let conn = pool.get()?;
        let Some(asset) = assets_db_operations::read_asset(&conn, id)? else {
            return Ok(false);
        };
        assets_db_operations::delete_asset(&conn, id)?;
        asset
    };

    let file_path = PathBuf::from(media_path).join(asset_relative_path(&asset.id, &asset.file_format));
    let asset_id = asset.id.clone();
    web::block(move || fs::remove_file(&file_path))
        .await
        .map_err(stream_error)?
        .unwrap_or_else(|e| log::error!("Failed to delete file of asset {}: {}", asset_id, e));

    log::info!("Deleted asset {}", asset.id);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_paths_are_sharded_by_id() {
        let id = "1a2b3c4d-0000-4000-8000-000000000000";
        assert_eq!(
            asset_relative_path(id, "jpg"),
            PathBuf::from("assets").join("1a").join("2b").join(format!("{}.jpg", id))
        );
        assert_eq!(asset_public_url(id, "jpg"), format!("/media/assets/1a/2b/{}.jpg", id));
    }

    #[test]
    fn only_whitelisted_mimes_get_an_extension() {
        assert_eq!(mime_to_safe_extension("image/jpeg"), Some("jpg"));
        assert_eq!(mime_to_safe_extension("text/html"), None);
    }

    #[test]
    fn client_paths_are_dropped_from_filenames() {
        assert_eq!(display_filename("../../etc/fachada.png"), "fachada.png");
        assert_eq!(display_filename(""), "upload");
    }
}
