use axum::extract::State;
use axum::Json;

use crate::api::json::ApiJson;
use crate::app::AppState;
use crate::auth::middleware::AdminIdentity;
use crate::db::models::{now_iso, to_item, LeetCodeStatsItem, LeetCodeSyncRequest, LeetCodeSyncResponse};
use crate::db::repository::DocumentRepository;
use crate::error::AppError;
use crate::keys;
use crate::leetcode::client::StatsSource;

/// Fetch fresh counts for `username` and overwrite the stats singleton.
pub async fn sync_stats(
    source: &dyn StatsSource,
    repo: &dyn DocumentRepository,
    username: &str,
) -> Result<LeetCodeSyncResponse, AppError> {
    if username.trim().is_empty() {
        return Err(AppError::BadRequest("username cannot be empty".into()));
    }

    let counts = source.fetch_solved_counts(username).await?;
    let synced_at = now_iso();
    let key = keys::leetcode_stats_key();

    let item = LeetCodeStatsItem {
        pk: key.pk,
        sk: key.sk,
        easy: counts.easy,
        medium: counts.medium,
        hard: counts.hard,
        total: counts.total,
        synced_at: synced_at.clone(),
        username: username.to_string(),
    };
    repo.put_item(to_item(&item)?).await?;

    tracing::info!("Synced LeetCode stats for '{username}': {} solved", counts.total);

    Ok(LeetCodeSyncResponse {
        username: username.to_string(),
        easy: counts.easy,
        medium: counts.medium,
        hard: counts.hard,
        total: counts.total,
        synced_at,
    })
}

/// Axum handler for `POST /api/leetcode/sync`.
pub async fn sync_handler(
    _admin: AdminIdentity,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LeetCodeSyncRequest>,
) -> Result<Json<LeetCodeSyncResponse>, AppError> {
    let response = sync_stats(
        state.stats_source.as_ref(),
        state.blog_repo.as_ref(),
        &request.username,
    )
    .await?;
    Ok(Json(response))
}
