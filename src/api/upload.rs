use std::time::Duration;

use axum::extract::State;
use axum::Json;

use crate::api::json::ApiJson;
use crate::app::AppState;
use crate::auth::middleware::AdminIdentity;
use crate::db::models::{UploadUrlRequest, UploadUrlResponse};
use crate::error::AppError;
use crate::keys;
use crate::storage::client::StorageClient;

/// Allowed MIME types for uploads.
pub const ALLOWED_CONTENT_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "image/svg+xml",
];

/// Lifetime of an issued upload URL.
pub const UPLOAD_URL_EXPIRY: Duration = Duration::from_secs(300);

/// Validate an upload request and issue a presigned PUT URL for its object key.
///
/// Neither the document store nor the owning entity is consulted, so a URL
/// can be issued before the document that will reference it exists.
pub async fn issue_upload_url(
    storage: &dyn StorageClient,
    request: UploadUrlRequest,
) -> Result<UploadUrlResponse, AppError> {
    let s3_key = keys::build_object_key(
        &request.entity_type,
        &request.entity_slug,
        &request.filename,
        request.problem_id.as_deref(),
    )?;

    if !ALLOWED_CONTENT_TYPES.contains(&request.content_type.as_str()) {
        return Err(AppError::BadRequest(format!(
            "Content type '{}' not allowed. Allowed: {}",
            request.content_type,
            ALLOWED_CONTENT_TYPES.join(", ")
        )));
    }

    if request.entity_slug.is_empty() || request.filename.is_empty() {
        return Err(AppError::BadRequest(
            "entity_slug and filename cannot be empty".into(),
        ));
    }

    let url = storage
        .presign_upload(&s3_key, &request.content_type, UPLOAD_URL_EXPIRY)
        .await?;

    tracing::info!("Issued upload URL for '{s3_key}'");

    Ok(UploadUrlResponse {
        url,
        s3_key,
        key: request.filename,
    })
}

/// Axum handler for `POST /api/upload-url`.
pub async fn upload_url_handler(
    _admin: AdminIdentity,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<UploadUrlRequest>,
) -> Result<Json<UploadUrlResponse>, AppError> {
    let response = issue_upload_url(state.storage_client.as_ref(), request).await?;
    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::client::MockStorageClient;

    fn request(entity_type: &str, content_type: &str) -> UploadUrlRequest {
        UploadUrlRequest {
            filename: "cover.jpg".into(),
            content_type: content_type.into(),
            entity_type: entity_type.into(),
            entity_slug: "my-post".into(),
            problem_id: None,
        }
    }

    #[tokio::test]
    async fn test_issue_blog_url() {
        let mut storage = MockStorageClient::new();
        storage
            .expect_presign_upload()
            .withf(|key, content_type, expires_in| {
                key == "images/blog/my-post/cover.jpg"
                    && content_type == "image/jpeg"
                    && *expires_in == UPLOAD_URL_EXPIRY
            })
            .times(1)
            .returning(|key, _, _| Ok(format!("https://bucket.test/{key}?sig=abc")));

        let response = issue_upload_url(&storage, request("blog", "image/jpeg"))
            .await
            .unwrap();

        assert_eq!(response.s3_key, "images/blog/my-post/cover.jpg");
        assert_eq!(response.key, "cover.jpg");
        assert_eq!(response.url, "https://bucket.test/images/blog/my-post/cover.jpg?sig=abc");
    }

    #[tokio::test]
    async fn test_every_allowed_type_is_accepted() {
        let mut storage = MockStorageClient::new();
        storage
            .expect_presign_upload()
            .times(ALLOWED_CONTENT_TYPES.len())
            .returning(|key, _, _| Ok(key.to_string()));

        for content_type in ALLOWED_CONTENT_TYPES {
            assert!(issue_upload_url(&storage, request("playbook", content_type))
                .await
                .is_ok());
        }
    }

    #[tokio::test]
    async fn test_rejects_disallowed_content_type() {
        let storage = MockStorageClient::new();
        match issue_upload_url(&storage, request("blog", "application/pdf"))
            .await
            .unwrap_err()
        {
            AppError::BadRequest(msg) => assert!(msg.contains("image/png")),
            other => panic!("Expected BadRequest, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_rejects_unknown_entity_type() {
        let storage = MockStorageClient::new();
        match issue_upload_url(&storage, request("unknown", "image/png"))
            .await
            .unwrap_err()
        {
            AppError::BadRequest(msg) => {
                assert_eq!(msg, "Unknown entity_type 'unknown'. Must be one of: blog, playbook")
            }
            other => panic!("Expected BadRequest, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_rejects_empty_filename() {
        let storage = MockStorageClient::new();
        let mut req = request("blog", "image/png");
        req.filename.clear();
        assert!(matches!(
            issue_upload_url(&storage, req).await,
            Err(AppError::BadRequest(_))
        ));
    }
}
