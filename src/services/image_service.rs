//! S3-backed image storage.
//!
//! Uploads are keyed by a generated opaque identifier; the catalog stores
//! `{key, url}` pairs and nothing here is consulted by the review or chat
//! paths.

use aws_config::meta::region::RegionProviderChain;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use uuid::Uuid;

use crate::config::S3Config;
use crate::error::{AppError, AppResult};
use crate::models::ProductImage;

pub const ALLOWED_IMAGE_TYPES: &[&str] =
    &["image/jpeg", "image/png", "image/gif", "image/webp"];
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

pub struct ImageStore {
    client: Client,
    config: S3Config,
}

impl ImageStore {
    pub async fn connect(config: S3Config) -> Self {
        let region_provider =
            RegionProviderChain::first_try(Region::new(config.region.clone())).or_default_provider();
        let mut config_loader = aws_config::defaults(BehaviorVersion::latest()).region(region_provider);
        if let Some(endpoint) = &config.endpoint {
            config_loader = config_loader.endpoint_url(endpoint);
        }
        let aws_config = config_loader.load().await;

        Self {
            client: Client::new(&aws_config),
            config,
        }
    }

    /// Upload one image and return its storage reference.
    pub async fn put(
        &self,
        folder: &str,
        file_name: Option<&str>,
        content_type: Option<&str>,
        bytes: Vec<u8>,
    ) -> AppResult<ProductImage> {
        let key = object_key(folder, file_name);

        let mut request = self
            .client
            .put_object()
            .bucket(&self.config.bucket)
            .key(&key)
            .body(ByteStream::from(bytes));
        if let Some(ct) = content_type {
            request = request.content_type(ct);
        }

        request
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("upload {key}: {e}")))?;

        tracing::debug!(%key, "image uploaded");

        Ok(ProductImage {
            url: public_url(&self.config, &key),
            key,
        })
    }

    pub async fn delete(&self, key: &str) -> AppResult<()> {
        self.client
            .delete_object()
            .bucket(&self.config.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("delete {key}: {e}")))?;
        Ok(())
    }
}

/// Reject anything that is not an image the client UI can render, and
/// anything over the upload size cap.
pub fn validate_upload(content_type: Option<&str>, size: usize) -> AppResult<()> {
    match content_type {
        Some(ct) if ALLOWED_IMAGE_TYPES.contains(&ct) => {}
        _ => {
            return Err(AppError::Validation(
                "only image files (jpeg, png, gif, webp) can be uploaded".into(),
            ))
        }
    }
    if size > MAX_IMAGE_BYTES {
        return Err(AppError::Validation("image exceeds the 5MB size limit".into()));
    }
    Ok(())
}

fn object_key(folder: &str, file_name: Option<&str>) -> String {
    let ext = file_name
        .and_then(|n| n.rsplit_once('.'))
        .map(|(_, e)| format!(".{}", e.to_lowercase()))
        .unwrap_or_default();
    format!("{folder}/{}{ext}", Uuid::new_v4())
}

/// URL an uploaded object is served from: a configured public base, the
/// custom endpoint (path-style), or the standard S3 virtual-hosted URL.
pub fn public_url(config: &S3Config, key: &str) -> String {
    match (&config.public_url, &config.endpoint) {
        (Some(base), _) => format!("{}/{}", base.trim_end_matches('/'), key),
        (None, Some(endpoint)) => {
            format!("{}/{}/{}", endpoint.trim_end_matches('/'), config.bucket, key)
        }
        (None, None) => format!(
            "https://{}.s3.{}.amazonaws.com/{}",
            config.bucket, config.region, key
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s3_config() -> S3Config {
        S3Config {
            bucket: "test-bucket".into(),
            region: "eu-west-1".into(),
            endpoint: None,
            public_url: None,
        }
    }

    #[test]
    fn object_keys_keep_the_file_extension() {
        let key = object_key("products", Some("photo.JPG"));
        assert!(key.starts_with("products/"));
        assert!(key.ends_with(".jpg"));

        let bare = object_key("products", None);
        assert!(!bare.contains('.'));
    }

    #[test]
    fn public_url_prefers_the_configured_base() {
        let mut cfg = s3_config();
        cfg.public_url = Some("https://cdn.example.com/".into());
        assert_eq!(
            public_url(&cfg, "products/a.jpg"),
            "https://cdn.example.com/products/a.jpg"
        );
    }

    #[test]
    fn public_url_falls_back_to_endpoint_then_virtual_hosted() {
        let mut cfg = s3_config();
        cfg.endpoint = Some("http://localhost:9000".into());
        assert_eq!(
            public_url(&cfg, "k"),
            "http://localhost:9000/test-bucket/k"
        );

        cfg.endpoint = None;
        assert_eq!(
            public_url(&cfg, "k"),
            "https://test-bucket.s3.eu-west-1.amazonaws.com/k"
        );
    }

    #[test]
    fn upload_validation_enforces_type_and_size() {
        assert!(validate_upload(Some("image/png"), 100).is_ok());
        assert!(validate_upload(Some("text/html"), 100).is_err());
        assert!(validate_upload(None, 100).is_err());
        assert!(validate_upload(Some("image/png"), MAX_IMAGE_BYTES + 1).is_err());
    }
}
