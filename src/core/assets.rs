//! Store and category images in object storage.
//!
//! Images live in the `store-assets` bucket under one prefix per purpose and are named
//! `{slug}_{suffix}.{ext}`, so re-uploading an image for the same slug replaces the old
//! object. After upload a signed URL with a very long lifetime is stored on the row.
//!
//! The storage service itself is an external collaborator behind [`ObjectStorage`].

use crate::errors::{Error, Result};
use std::{collections::HashMap, future::Future, sync::Mutex};
use tracing::{info, instrument};

/// Bucket holding every store and category image.
pub const ASSET_BUCKET: &str = "store-assets";

/// Lifetime of the signed URLs written to the database (~100 years).
pub const SIGNED_URL_TTL_SECS: u64 = 3_153_600_000;

/// What an image is used for; decides its prefix and name suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetPurpose {
    /// Store avatar
    ProfilePicture,
    /// Store banner
    Cover,
    /// Category tile
    CategoryImage,
}

impl AssetPurpose {
    /// Folder inside [`ASSET_BUCKET`].
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::ProfilePicture => "profile-pictures",
            Self::Cover => "covers",
            Self::CategoryImage => "category-images",
        }
    }

    /// Suffix appended to the slug in the object name.
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::ProfilePicture => "profile_pic",
            Self::Cover => "cover",
            Self::CategoryImage => "category_img",
        }
    }
}

/// Builds `{prefix}/{slug}_{suffix}.{ext}` from the uploaded file's name.
///
/// # Errors
/// Returns a validation error if the slug is invalid or the file has no extension.
pub fn object_path(slug: &str, purpose: AssetPurpose, file_name: &str) -> Result<String> {
    let slug = crate::core::validate::slug(slug)?;
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.trim().to_lowercase())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .ok_or_else(|| Error::validation("file", "must have a file extension"))?;

    Ok(format!(
        "{}/{slug}_{}.{ext}",
        purpose.prefix(),
        purpose.suffix()
    ))
}

/// Object storage service holding uploaded images.
pub trait ObjectStorage: Send + Sync {
    /// Deletes the objects at `paths`; missing objects are not an error.
    fn remove(&self, bucket: &str, paths: &[String]) -> impl Future<Output = Result<()>> + Send;

    /// Stores `bytes` at `path`.
    fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Returns a URL granting read access to `path` for `ttl_secs` seconds.
    fn create_signed_url(
        &self,
        bucket: &str,
        path: &str,
        ttl_secs: u64,
    ) -> impl Future<Output = Result<String>> + Send;
}

/// Uploads an image and returns the signed URL to store on the row.
///
/// Any object already at the target path is removed first.
#[instrument(skip(storage, bytes), fields(len = bytes.len()))]
pub async fn upload_asset<S>(
    storage: &S,
    slug: &str,
    purpose: AssetPurpose,
    file_name: &str,
    bytes: Vec<u8>,
) -> Result<String>
where
    S: ObjectStorage,
{
    if bytes.is_empty() {
        return Err(Error::validation("file", "is empty"));
    }
    let path = object_path(slug, purpose, file_name)?;

    storage
        .remove(ASSET_BUCKET, std::slice::from_ref(&path))
        .await?;
    storage.upload(ASSET_BUCKET, &path, bytes).await?;
    let url = storage
        .create_signed_url(ASSET_BUCKET, &path, SIGNED_URL_TTL_SECS)
        .await?;

    info!("Uploaded {}/{}", ASSET_BUCKET, path);
    Ok(url)
}

/// Removes the image a signed URL points at.
///
/// The object name is the last path segment of the URL (query string ignored) and is
/// looked up under the purpose's prefix.
pub async fn remove_asset_by_url<S>(storage: &S, url: &str, purpose: AssetPurpose) -> Result<()>
where
    S: ObjectStorage,
{
    let without_query = url.split(['?', '#']).next().unwrap_or_default();
    let file_name = without_query
        .rsplit('/')
        .next()
        .filter(|name| !name.is_empty())
        .ok_or_else(|| Error::validation("url", "does not name an object"))?;

    let path = format!("{}/{file_name}", purpose.prefix());
    storage.remove(ASSET_BUCKET, &[path]).await
}

/// Host part of the URLs signed by [`MemoryStorage`].
pub const MEMORY_URL_BASE: &str = "http://storage.local/object/sign";

/// [`ObjectStorage`] kept in process memory.
///
/// Signed URLs have the form `{MEMORY_URL_BASE}/{bucket}/{path}?expires_in={ttl}`, so
/// they pass the same URL validation as the ones a hosted service issues.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    objects: Mutex<HashMap<(String, String), Vec<u8>>>,
}

impl MemoryStorage {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the bytes stored at `path`, if any.
    #[must_use]
    pub fn get(&self, bucket: &str, path: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .ok()?
            .get(&(bucket.to_string(), path.to_string()))
            .cloned()
    }

    /// Number of stored objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.lock().map_or(0, |objects| objects.len())
    }

    /// Whether nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn poisoned() -> Error {
        Error::Storage {
            message: "memory storage lock poisoned".to_string(),
        }
    }
}

impl ObjectStorage for MemoryStorage {
    async fn remove(&self, bucket: &str, paths: &[String]) -> Result<()> {
        let mut objects = self.objects.lock().map_err(|_| Self::poisoned())?;
        for path in paths {
            objects.remove(&(bucket.to_string(), path.clone()));
        }
        Ok(())
    }

    async fn upload(&self, bucket: &str, path: &str, bytes: Vec<u8>) -> Result<()> {
        let mut objects = self.objects.lock().map_err(|_| Self::poisoned())?;
        let key = (bucket.to_string(), path.to_string());
        if objects.contains_key(&key) {
            return Err(Error::Storage {
                message: format!("object {bucket}/{path} already exists"),
            });
        }
        objects.insert(key, bytes);
        Ok(())
    }

    async fn create_signed_url(&self, bucket: &str, path: &str, ttl_secs: u64) -> Result<String> {
        let objects = self.objects.lock().map_err(|_| Self::poisoned())?;
        if !objects.contains_key(&(bucket.to_string(), path.to_string())) {
            return Err(Error::Storage {
                message: format!("object {bucket}/{path} not found"),
            });
        }
        Ok(format!(
            "{MEMORY_URL_BASE}/{bucket}/{path}?expires_in={ttl_secs}"
        ))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_object_path_naming() {
        assert_eq!(
            object_path("acme", AssetPurpose::ProfilePicture, "Logo.PNG").unwrap(),
            "profile-pictures/acme_profile_pic.png"
        );
        assert_eq!(
            object_path("acme", AssetPurpose::Cover, "banner.final.jpg").unwrap(),
            "covers/acme_cover.jpg"
        );
        assert_eq!(
            object_path("Food Deals", AssetPurpose::CategoryImage, "tile.webp").unwrap(),
            "category-images/fooddeals_category_img.webp"
        );
    }

    #[test]
    fn test_object_path_requires_extension() {
        assert!(object_path("acme", AssetPurpose::Cover, "banner").is_err());
        assert!(object_path("acme", AssetPurpose::Cover, "banner.").is_err());
        assert!(object_path("", AssetPurpose::Cover, "banner.png").is_err());
    }

    #[tokio::test]
    async fn test_upload_replaces_previous_object() -> Result<()> {
        let storage = MemoryStorage::new();

        let first =
            upload_asset(&storage, "acme", AssetPurpose::Cover, "a.png", vec![1, 2, 3]).await?;
        let second =
            upload_asset(&storage, "acme", AssetPurpose::Cover, "b.png", vec![4, 5]).await?;

        assert_eq!(first, second);
        assert_eq!(
            second,
            format!(
                "{MEMORY_URL_BASE}/store-assets/covers/acme_cover.png?expires_in={SIGNED_URL_TTL_SECS}"
            )
        );
        assert!(crate::core::validate::url("cover_url", Some(&second))?.is_some());
        assert_eq!(storage.len(), 1);
        assert_eq!(
            storage.get(ASSET_BUCKET, "covers/acme_cover.png"),
            Some(vec![4, 5])
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_upload_rejects_empty_file() {
        let storage = MemoryStorage::new();
        let result = upload_asset(&storage, "acme", AssetPurpose::Cover, "a.png", Vec::new()).await;
        assert!(matches!(result, Err(Error::Validation { field: "file", .. })));
        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn test_remove_asset_by_url() -> Result<()> {
        let storage = MemoryStorage::new();
        let url = upload_asset(
            &storage,
            "food",
            AssetPurpose::CategoryImage,
            "tile.jpg",
            vec![9],
        )
        .await?;

        remove_asset_by_url(&storage, &url, AssetPurpose::CategoryImage).await?;
        assert!(storage.is_empty());
        Ok(())
    }
}
