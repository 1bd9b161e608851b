use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::auth::verifier::CredentialVerifier;
use crate::config::AppConfig;
use crate::db::repository::{DocumentRepository, DynamoDocumentRepository};
use crate::error::AppError;
use crate::leetcode::client::{LeetCodeClient, StatsSource};
use crate::storage::client::{S3StorageClient, StorageClient};

/// Shared application state available to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Blog posts and the stats singleton.
    pub blog_repo: Arc<dyn DocumentRepository>,
    /// Playbook modules and their problems.
    pub playbook_repo: Arc<dyn DocumentRepository>,
    pub storage_client: Arc<dyn StorageClient>,
    pub stats_source: Arc<dyn StatsSource>,
    pub verifier: Arc<CredentialVerifier>,
}

impl AppState {
    /// Build AWS-backed collaborators from the process configuration.
    pub async fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(config.aws_region.clone()))
            .load()
            .await;

        let mut dynamo_config = aws_sdk_dynamodb::config::Builder::from(&sdk_config);
        if let Some(endpoint) = config.dynamodb_endpoint_override() {
            tracing::info!("Using DynamoDB endpoint {endpoint}");
            dynamo_config = dynamo_config.endpoint_url(endpoint);
        }
        let dynamo = aws_sdk_dynamodb::Client::from_conf(dynamo_config.build());

        let mut s3_config = aws_sdk_s3::config::Builder::from(&sdk_config);
        if let Some(endpoint) = &config.s3_endpoint {
            tracing::info!("Using S3 endpoint {endpoint}");
            s3_config = s3_config.endpoint_url(endpoint).force_path_style(true);
        }
        let s3 = aws_sdk_s3::Client::from_conf(s3_config.build());

        Ok(Self {
            blog_repo: Arc::new(DynamoDocumentRepository::new(dynamo.clone(), &config.blog_table)),
            playbook_repo: Arc::new(DynamoDocumentRepository::new(dynamo, &config.playbook_table)),
            storage_client: Arc::new(S3StorageClient::new(s3, config.s3_bucket.clone())),
            stats_source: Arc::new(LeetCodeClient::new(&config.leetcode_graphql_url)?),
            verifier: Arc::new(CredentialVerifier::new(config.auth.clone())),
        })
    }
}

/// All routes. Every `/api` route requires an admin credential.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(api::health::health_handler))
        .route("/api/blog", post(api::blog::create_post_handler))
        .route(
            "/api/blog/{slug}",
            put(api::blog::update_post_handler).delete(api::blog::delete_post_handler),
        )
        .route("/api/playbook", post(api::playbook::create_module_handler))
        .route(
            "/api/playbook/{slug}",
            put(api::playbook::update_module_handler).delete(api::playbook::delete_module_handler),
        )
        .route("/api/upload-url", post(api::upload::upload_url_handler))
        .route("/api/leetcode/sync", post(api::leetcode::sync_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
