//! Category business logic - Handles all category-related operations.
//!
//! Categories are shared by stores and deals. Deleting one removes its rows from both
//! join tables; store summaries do not depend on categories and are left alone.

use crate::{
    entities::{Category, DealCategory, StoreCategory, category, deal_category, store_category},
    errors::{Error, Result},
    core::{
        assets::{self, AssetPurpose, ObjectStorage},
        validate,
    },
};
use sea_orm::{PaginatorTrait, QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*};
use std::collections::BTreeSet;
use tracing::{info, instrument};

/// Fields an operator submits when creating or editing a category.
#[derive(Debug, Clone, Default)]
pub struct CategoryInput {
    /// Display name
    pub title: String,
    /// URL-safe identifier; normalised before validation
    pub slug: String,
    /// Position in navigation
    pub sort_order: i32,
    /// Signed image URL
    pub image_url: Option<String>,
    /// Whether the category is published
    pub is_active: bool,
}

async fn ensure_slug_free<C>(conn: &C, slug: &str, except_id: Option<i64>) -> Result<()>
where
    C: ConnectionTrait,
{
    let mut query = Category::find().filter(category::Column::Slug.eq(slug));
    if let Some(id) = except_id {
        query = query.filter(category::Column::Id.ne(id));
    }
    if query.count(conn).await? > 0 {
        return Err(Error::DuplicateSlug {
            entity: "category",
            slug: slug.to_string(),
        });
    }
    Ok(())
}

/// Retrieves all categories in navigation order.
///
/// `active_only` hides unpublished categories.
pub async fn get_all_categories(
    db: &DatabaseConnection,
    active_only: bool,
) -> Result<Vec<category::Model>> {
    let mut query = Category::find();
    if active_only {
        query = query.filter(category::Column::IsActive.eq(true));
    }
    query
        .order_by_asc(category::Column::SortOrder)
        .order_by_asc(category::Column::Title)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a category by its id.
pub async fn get_category_by_id(
    db: &DatabaseConnection,
    category_id: i64,
) -> Result<Option<category::Model>> {
    Category::find_by_id(category_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a category by its slug.
pub async fn get_category_by_slug(
    db: &DatabaseConnection,
    slug: &str,
) -> Result<Option<category::Model>> {
    Category::find()
        .filter(category::Column::Slug.eq(slug.trim().to_lowercase()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Resolves category slugs to ids.
///
/// # Errors
/// Returns [`Error::CategoryNotFound`] naming the first slug that does not exist.
pub async fn ids_for_slugs<S>(db: &DatabaseConnection, slugs: &[S]) -> Result<BTreeSet<i64>>
where
    S: AsRef<str>,
{
    let wanted: BTreeSet<String> = slugs
        .iter()
        .map(|s| s.as_ref().trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();
    if wanted.is_empty() {
        return Ok(BTreeSet::new());
    }

    let found: Vec<(i64, String)> = Category::find()
        .select_only()
        .column(category::Column::Id)
        .column(category::Column::Slug)
        .filter(category::Column::Slug.is_in(wanted.iter().cloned()))
        .into_tuple()
        .all(db)
        .await?;

    if let Some(missing) = wanted
        .iter()
        .find(|slug| !found.iter().any(|(_, s)| s == *slug))
    {
        return Err(Error::CategoryNotFound {
            key: missing.clone(),
        });
    }
    Ok(found.into_iter().map(|(id, _)| id).collect())
}

/// Creates a category.
#[instrument(skip(db, input), fields(slug = %input.slug))]
pub async fn create_category(
    db: &DatabaseConnection,
    input: CategoryInput,
) -> Result<category::Model> {
    let title = validate::title("title", &input.title)?;
    let slug = validate::slug(&input.slug)?;
    let sort_order = validate::sort_order(input.sort_order)?;
    let image_url = validate::url("image_url", input.image_url.as_deref())?;

    ensure_slug_free(db, &slug, None).await?;

    let category = category::ActiveModel {
        title: Set(title),
        slug: Set(slug),
        sort_order: Set(sort_order),
        image_url: Set(image_url),
        is_active: Set(input.is_active),
        ..Default::default()
    };
    let created = category.insert(db).await?;
    info!("Created category {} ({})", created.id, created.slug);
    Ok(created)
}

/// Replaces a category's fields.
#[instrument(skip(db, input), fields(slug = %input.slug))]
pub async fn update_category(
    db: &DatabaseConnection,
    category_id: i64,
    input: CategoryInput,
) -> Result<category::Model> {
    let title = validate::title("title", &input.title)?;
    let slug = validate::slug(&input.slug)?;
    let sort_order = validate::sort_order(input.sort_order)?;
    let image_url = validate::url("image_url", input.image_url.as_deref())?;

    let mut category: category::ActiveModel = Category::find_by_id(category_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::CategoryNotFound {
            key: category_id.to_string(),
        })?
        .into();
    ensure_slug_free(db, &slug, Some(category_id)).await?;

    category.title = Set(title);
    category.slug = Set(slug);
    category.sort_order = Set(sort_order);
    category.image_url = Set(image_url);
    category.is_active = Set(input.is_active);
    category.update(db).await.map_err(Into::into)
}

/// Uploads a category image and stores its signed URL.
///
/// Any image the category already points at is removed before the upload.
///
/// # Errors
/// - [`Error::CategoryNotFound`] if the category doesn't exist
/// - [`Error::Validation`] if the file is empty or has no extension
/// - [`Error::Storage`] or a database error otherwise
#[instrument(skip(db, storage, bytes))]
pub async fn set_category_image<S>(
    db: &DatabaseConnection,
    storage: &S,
    category_id: i64,
    file_name: &str,
    bytes: Vec<u8>,
) -> Result<category::Model>
where
    S: ObjectStorage,
{
    let existing = get_category_by_id(db, category_id)
        .await?
        .ok_or_else(|| Error::CategoryNotFound {
            key: category_id.to_string(),
        })?;
    if let Some(url) = existing.image_url.as_deref() {
        assets::remove_asset_by_url(storage, url, AssetPurpose::CategoryImage).await?;
    }
    let url = assets::upload_asset(
        storage,
        &existing.slug,
        AssetPurpose::CategoryImage,
        file_name,
        bytes,
    )
    .await?;

    let mut category: category::ActiveModel = existing.into();
    category.image_url = Set(Some(url));
    category.update(db).await.map_err(Into::into)
}

/// Deletes a category and then its image, if it has one.
pub async fn delete_category_with_image<S>(
    db: &DatabaseConnection,
    storage: &S,
    category_id: i64,
) -> Result<category::Model>
where
    S: ObjectStorage,
{
    let deleted = delete_category(db, category_id).await?;
    if let Some(url) = deleted.image_url.as_deref() {
        assets::remove_asset_by_url(storage, url, AssetPurpose::CategoryImage).await?;
    }
    Ok(deleted)
}

/// Deletes a category and every deal/store link to it.
///
/// Returns the deleted category so the caller can remove its image.
#[instrument(skip(db))]
pub async fn delete_category(
    db: &DatabaseConnection,
    category_id: i64,
) -> Result<category::Model> {
    let txn = db.begin().await?;
    let category = Category::find_by_id(category_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::CategoryNotFound {
            key: category_id.to_string(),
        })?;

    DealCategory::delete_many()
        .filter(deal_category::Column::CategoryId.eq(category_id))
        .exec(&txn)
        .await?;
    StoreCategory::delete_many()
        .filter(store_category::Column::CategoryId.eq(category_id))
        .exec(&txn)
        .await?;
    Category::delete_by_id(category_id).exec(&txn).await?;

    txn.commit().await?;
    info!("Deleted category {} ({})", category.id, category.slug);
    Ok(category)
}

/// Number of deals and stores linked to a category.
pub async fn usage_counts(db: &DatabaseConnection, category_id: i64) -> Result<(u64, u64)> {
    let deals = DealCategory::find()
        .filter(deal_category::Column::CategoryId.eq(category_id))
        .count(db)
        .await?;
    let stores = StoreCategory::find()
        .filter(store_category::Column::CategoryId.eq(category_id))
        .count(db)
        .await?;
    Ok((deals, stores))
}
