use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::Value;

use crate::api::json::ApiJson;
use crate::app::AppState;
use crate::auth::middleware::AdminIdentity;
use crate::db::models::{
    media_s3_keys, now_iso, to_item, BlogPostItem, MutationResponse, PostCreate, PostUpdate,
};
use crate::db::repository::DocumentRepository;
use crate::db::update::UpdateExpression;
use crate::error::AppError;
use crate::keys;
use crate::storage::client::StorageClient;

/// Create a blog post. Fails with `Conflict` if the slug is taken.
pub async fn process_create_post(
    repo: &dyn DocumentRepository,
    post: PostCreate,
) -> Result<MutationResponse, AppError> {
    if post.slug.is_empty() {
        return Err(AppError::BadRequest("Slug cannot be empty".into()));
    }

    let slug = post.slug.clone();
    let item = to_item(&BlogPostItem::new(post, &now_iso()))?;

    if !repo.put_new_item(item).await? {
        return Err(AppError::Conflict(format!(
            "Post with slug '{slug}' already exists"
        )));
    }

    tracing::info!("Created post '{slug}'");
    Ok(MutationResponse::new(slug, "Post created"))
}

/// Apply a partial update to an existing post.
pub async fn process_update_post(
    repo: &dyn DocumentRepository,
    slug: &str,
    update: PostUpdate,
) -> Result<MutationResponse, AppError> {
    let key = keys::blog_key(slug);
    if repo.get_item(&key).await?.is_none() {
        return Err(AppError::NotFound("Post not found".into()));
    }

    let mut fields = to_item(&update)?;
    if fields.is_empty() {
        return Err(AppError::BadRequest("No fields to update".into()));
    }
    fields.insert("updatedAt".into(), Value::String(now_iso()));

    let expression = UpdateExpression::set_fields(&fields)
        .ok_or_else(|| AppError::BadRequest("No fields to update".into()))?;
    repo.update_item(&key, &expression).await?;

    tracing::info!("Updated post '{slug}' ({} fields)", fields.len() - 1);
    Ok(MutationResponse::new(slug, "Post updated"))
}

/// Delete a post and, best-effort, every blob its media list references.
pub async fn process_delete_post(
    repo: &dyn DocumentRepository,
    storage: &dyn StorageClient,
    slug: &str,
) -> Result<MutationResponse, AppError> {
    let key = keys::blog_key(slug);
    let item = repo
        .get_item(&key)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".into()))?;

    let blob_keys = media_s3_keys([&item]);
    if !blob_keys.is_empty() {
        if let Err(e) = storage.delete_objects(&blob_keys).await {
            tracing::warn!("Failed to delete blobs of post '{slug}': {e}");
        }
    }

    repo.delete_item(&key).await?;

    tracing::info!("Deleted post '{slug}' ({} blobs)", blob_keys.len());
    Ok(MutationResponse::new(slug, "Post deleted"))
}

/// Axum handler for `POST /api/blog`.
pub async fn create_post_handler(
    _admin: AdminIdentity,
    State(state): State<AppState>,
    ApiJson(post): ApiJson<PostCreate>,
) -> Result<(StatusCode, Json<MutationResponse>), AppError> {
    let response = process_create_post(state.blog_repo.as_ref(), post).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Axum handler for `PUT /api/blog/{slug}`.
pub async fn update_post_handler(
    _admin: AdminIdentity,
    State(state): State<AppState>,
    Path(slug): Path<String>,
    ApiJson(update): ApiJson<PostUpdate>,
) -> Result<Json<MutationResponse>, AppError> {
    let response = process_update_post(state.blog_repo.as_ref(), &slug, update).await?;
    Ok(Json(response))
}

/// Axum handler for `DELETE /api/blog/{slug}`.
pub async fn delete_post_handler(
    _admin: AdminIdentity,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<MutationResponse>, AppError> {
    let response = process_delete_post(
        state.blog_repo.as_ref(),
        state.storage_client.as_ref(),
        &slug,
    )
    .await?;
    Ok(Json(response))
}
