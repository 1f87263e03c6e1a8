pub mod auth;
pub mod blogs;
pub mod brands;
pub mod categories;
pub mod products;
pub mod reviews;
pub mod specs;

use actix_multipart::form::tempfile::TempFile;

use crate::error::{AppError, AppResult};
use crate::models::ProductImage;
use crate::services::image_service::{self, ImageStore};

/// Upload one multipart file to object storage after validating its type
/// and size.
pub(crate) async fn upload_image(
    store: &ImageStore,
    folder: &str,
    file: &TempFile,
) -> AppResult<ProductImage> {
    let content_type = file
        .content_type
        .as_ref()
        .map(|m| m.essence_str().to_string());
    image_service::validate_upload(content_type.as_deref(), file.size)?;

    let bytes = std::fs::read(file.file.path())
        .map_err(|e| AppError::Internal(format!("failed to read upload: {e}")))?;

    store
        .put(
            folder,
            file.file_name.as_deref(),
            content_type.as_deref(),
            bytes,
        )
        .await
}

pub(crate) async fn upload_images(
    store: &ImageStore,
    folder: &str,
    files: &[TempFile],
) -> AppResult<Vec<ProductImage>> {
    let mut uploaded = Vec::with_capacity(files.len());
    for file in files {
        uploaded.push(upload_image(store, folder, file).await?);
    }
    Ok(uploaded)
}

/// Best-effort storage deletes: failures are logged and never fail the
/// surrounding request.
pub(crate) async fn delete_images(store: &ImageStore, keys: impl IntoIterator<Item = String>) {
    for key in keys {
        if let Err(e) = store.delete(&key).await {
            tracing::error!(key = %key, error = %e, "failed to delete image from storage");
        }
    }
}
