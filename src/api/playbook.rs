use std::collections::HashSet;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::Value;

use crate::api::json::ApiJson;
use crate::app::AppState;
use crate::auth::middleware::AdminIdentity;
use crate::db::models::{
    media_s3_keys, now_iso, to_item, ModuleCreate, ModuleItem, ModuleUpdate, MutationResponse,
    ProblemItem,
};
use crate::db::repository::{item_key, DocumentRepository};
use crate::db::update::UpdateExpression;
use crate::error::AppError;
use crate::keys;
use crate::storage::client::StorageClient;

/// Delete blobs without failing the surrounding mutation.
async fn delete_blobs_best_effort(storage: &dyn StorageClient, blob_keys: &[String], owner: &str) {
    if blob_keys.is_empty() {
        return;
    }
    if let Err(e) = storage.delete_objects(blob_keys).await {
        tracing::warn!("Failed to delete {} blobs of {owner}: {e}", blob_keys.len());
    }
}

/// Create a module and its initial problems.
///
/// The metadata item is written conditionally, so a taken slug is never
/// overwritten. Problems follow as a grouped batch sharing the module's timestamps.
pub async fn process_create_module(
    repo: &dyn DocumentRepository,
    module: ModuleCreate,
) -> Result<MutationResponse, AppError> {
    if module.slug.is_empty() {
        return Err(AppError::BadRequest("Slug cannot be empty".into()));
    }
    let mut problem_ids = HashSet::new();
    for problem in &module.problems {
        problem.validate()?;
        if !problem_ids.insert(problem.id.as_str()) {
            return Err(AppError::BadRequest(format!(
                "Duplicate problem id '{}'",
                problem.id
            )));
        }
    }

    let timestamp = now_iso();
    let metadata = to_item(&ModuleItem::new(&module, &timestamp))?;

    if !repo.put_new_item(metadata).await? {
        return Err(AppError::Conflict(format!(
            "Module with slug '{}' already exists",
            module.slug
        )));
    }

    if !module.problems.is_empty() {
        let problems = module
            .problems
            .iter()
            .map(|problem| to_item(&ProblemItem::new(&module.slug, problem, &timestamp, &timestamp)))
            .collect::<Result<Vec<_>, _>>()?;
        repo.batch_put(problems).await?;
    }

    tracing::info!(
        "Created module '{}' with {} problems",
        module.slug,
        module.problems.len()
    );
    Ok(MutationResponse::new(module.slug, "Module created"))
}

/// Update module fields, upsert problems and delete problems, in that order.
///
/// Each step is skipped when it has nothing to do; an update with nothing to
/// do at all still succeeds.
pub async fn process_update_module(
    repo: &dyn DocumentRepository,
    storage: &dyn StorageClient,
    slug: &str,
    update: ModuleUpdate,
) -> Result<MutationResponse, AppError> {
    let key = keys::module_key(slug);
    if repo.get_item(&key).await?.is_none() {
        return Err(AppError::NotFound("Module not found".into()));
    }
    for problem in update.upserts() {
        problem.validate()?;
    }

    let mut fields = to_item(&update.fields)?;
    if !fields.is_empty() {
        fields.insert("updatedAt".into(), Value::String(now_iso()));
        if let Some(expression) = UpdateExpression::set_fields(&fields) {
            repo.update_item(&key, &expression).await?;
        }
    }

    for problem in update.upserts() {
        let problem_key = keys::problem_key(slug, &problem.id);
        let now = now_iso();
        let created_at = repo
            .get_item(&problem_key)
            .await?
            .and_then(|existing| {
                existing
                    .get("createdAt")
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .unwrap_or_else(|| now.clone());

        repo.put_item(to_item(&ProblemItem::new(slug, problem, &created_at, &now))?)
            .await?;
    }

    let mut deleted = 0;
    for problem_id in update.deletions() {
        let problem_key = keys::problem_key(slug, problem_id);
        let Some(existing) = repo.get_item(&problem_key).await? else {
            continue;
        };

        delete_blobs_best_effort(storage, &media_s3_keys([&existing]), &problem_key.to_string())
            .await;
        repo.delete_item(&problem_key).await?;
        deleted += 1;
    }

    tracing::info!(
        "Updated module '{slug}': {} fields, {} problems upserted, {deleted} problems deleted",
        fields.len().saturating_sub(1),
        update.upserts().len()
    );
    Ok(MutationResponse::new(slug, "Module updated"))
}

/// Delete a module, every problem in its partition, and their blobs.
pub async fn process_delete_module(
    repo: &dyn DocumentRepository,
    storage: &dyn StorageClient,
    slug: &str,
) -> Result<MutationResponse, AppError> {
    let items = repo.query_partition(&keys::playbook_pk(slug)).await?;
    if items.is_empty() {
        return Err(AppError::NotFound("Module not found".into()));
    }

    let blob_keys = media_s3_keys(&items);
    delete_blobs_best_effort(storage, &blob_keys, &format!("module '{slug}'")).await;

    let item_keys = items.iter().map(item_key).collect::<Result<Vec<_>, _>>()?;
    let count = item_keys.len();
    repo.batch_delete(item_keys).await?;

    tracing::info!(
        "Deleted module '{slug}' ({count} items, {} blobs)",
        blob_keys.len()
    );
    Ok(MutationResponse::new(slug, "Module deleted"))
}

/// Axum handler for `POST /api/playbook`.
pub async fn create_module_handler(
    _admin: AdminIdentity,
    State(state): State<AppState>,
    ApiJson(module): ApiJson<ModuleCreate>,
) -> Result<(StatusCode, Json<MutationResponse>), AppError> {
    let response = process_create_module(state.playbook_repo.as_ref(), module).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Axum handler for `PUT /api/playbook/{slug}`.
pub async fn update_module_handler(
    _admin: AdminIdentity,
    State(state): State<AppState>,
    Path(slug): Path<String>,
    ApiJson(update): ApiJson<ModuleUpdate>,
) -> Result<Json<MutationResponse>, AppError> {
    let response = process_update_module(
        state.playbook_repo.as_ref(),
        state.storage_client.as_ref(),
        &slug,
        update,
    )
    .await?;
    Ok(Json(response))
}

/// Axum handler for `DELETE /api/playbook/{slug}`.
pub async fn delete_module_handler(
    _admin: AdminIdentity,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<MutationResponse>, AppError> {
    let response = process_delete_module(
        state.playbook_repo.as_ref(),
        state.storage_client.as_ref(),
        &slug,
    )
    .await?;
    Ok(Json(response))
}
