#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};

use botthef_admin::app::{router, AppState};
use botthef_admin::auth::models::TokenClaims;
use botthef_admin::auth::verifier::CredentialVerifier;
use botthef_admin::config::AuthConfig;
use botthef_admin::db::models::{Item, SolvedCounts};
use botthef_admin::db::repository::{item_key, DocumentRepository};
use botthef_admin::db::update::UpdateExpression;
use botthef_admin::error::AppError;
use botthef_admin::keys::ItemKey;
use botthef_admin::leetcode::client::StatsSource;
use botthef_admin::storage::client::StorageClient;

pub const SECRET: &str = "test-secret-32-chars-exactly-ok!";
pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const SERVICE_KEY: &str = "btf_integration_test_key";

/// Document store kept in a sorted map, keyed like the real table.
#[derive(Default)]
pub struct MemoryRepository {
    items: Mutex<BTreeMap<ItemKey, Item>>,
}

impl MemoryRepository {
    pub fn get(&self, key: &ItemKey) -> Option<Item> {
        self.items.lock().unwrap().get(key).cloned()
    }

    pub fn partition(&self, pk: &str) -> Vec<Item> {
        self.items
            .lock()
            .unwrap()
            .iter()
            .filter(|(key, _)| key.pk == pk)
            .map(|(_, item)| item.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.items.lock().unwrap().len()
    }
}

#[async_trait]
impl DocumentRepository for MemoryRepository {
    async fn get_item(&self, key: &ItemKey) -> Result<Option<Item>, AppError> {
        Ok(self.get(key))
    }

    async fn put_item(&self, item: Item) -> Result<(), AppError> {
        let key = item_key(&item)?;
        self.items.lock().unwrap().insert(key, item);
        Ok(())
    }

    async fn put_new_item(&self, item: Item) -> Result<bool, AppError> {
        let key = item_key(&item)?;
        let mut items = self.items.lock().unwrap();
        if items.contains_key(&key) {
            return Ok(false);
        }
        items.insert(key, item);
        Ok(true)
    }

    async fn update_item(&self, key: &ItemKey, update: &UpdateExpression) -> Result<(), AppError> {
        let mut items = self.items.lock().unwrap();
        let item = items
            .get_mut(key)
            .ok_or_else(|| AppError::Database(format!("No item at {key}")))?;
        for (field, value) in update.assignments() {
            item.insert(field.to_string(), value.clone());
        }
        Ok(())
    }

    async fn delete_item(&self, key: &ItemKey) -> Result<(), AppError> {
        self.items.lock().unwrap().remove(key);
        Ok(())
    }

    async fn query_partition(&self, pk: &str) -> Result<Vec<Item>, AppError> {
        Ok(self.partition(pk))
    }

    async fn batch_put(&self, items: Vec<Item>) -> Result<(), AppError> {
        let mut stored = self.items.lock().unwrap();
        for item in items {
            stored.insert(item_key(&item)?, item);
        }
        Ok(())
    }

    async fn batch_delete(&self, keys: Vec<ItemKey>) -> Result<(), AppError> {
        let mut stored = self.items.lock().unwrap();
        for key in keys {
            stored.remove(&key);
        }
        Ok(())
    }
}

/// Blob store that only records what it was asked to delete.
#[derive(Default)]
pub struct MemoryStorage {
    deleted: Mutex<Vec<String>>,
}

impl MemoryStorage {
    pub fn deleted(&self) -> Vec<String> {
        let mut deleted = self.deleted.lock().unwrap().clone();
        deleted.sort();
        deleted
    }
}

#[async_trait]
impl StorageClient for MemoryStorage {
    async fn presign_upload(
        &self,
        key: &str,
        _content_type: &str,
        expires_in: Duration,
    ) -> Result<String, AppError> {
        Ok(format!(
            "https://bucket.test/{key}?X-Amz-Expires={}",
            expires_in.as_secs()
        ))
    }

    async fn delete_objects(&self, keys: &[String]) -> Result<(), AppError> {
        self.deleted.lock().unwrap().extend_from_slice(keys);
        Ok(())
    }
}

/// Canned stats: `ghost` is unknown, `offline` simulates an upstream outage.
pub struct StubStats;

#[async_trait]
impl StatsSource for StubStats {
    async fn fetch_solved_counts(&self, username: &str) -> Result<SolvedCounts, AppError> {
        match username {
            "ghost" => Err(AppError::NotFound(format!(
                "LeetCode username '{username}' not found or profile is private"
            ))),
            "offline" => Err(AppError::BadGateway("LeetCode request failed: timeout".into())),
            _ => Ok(SolvedCounts {
                easy: 120,
                medium: 80,
                hard: 15,
                total: 215,
            }),
        }
    }
}

/// The real router wired to in-memory collaborators.
pub struct TestEnv {
    pub router: Router,
    pub blog_repo: Arc<MemoryRepository>,
    pub playbook_repo: Arc<MemoryRepository>,
    pub storage: Arc<MemoryStorage>,
}

impl TestEnv {
    pub fn start() -> Self {
        Self::with_auth(AuthConfig {
            admin_email: ADMIN_EMAIL.to_string(),
            signing_secret: Some(SECRET.to_string()),
            service_key: Some(SERVICE_KEY.to_string()),
        })
    }

    pub fn with_auth(auth: AuthConfig) -> Self {
        let blog_repo = Arc::new(MemoryRepository::default());
        let playbook_repo = Arc::new(MemoryRepository::default());
        let storage = Arc::new(MemoryStorage::default());

        let state = AppState {
            blog_repo: blog_repo.clone(),
            playbook_repo: playbook_repo.clone(),
            storage_client: storage.clone(),
            stats_source: Arc::new(StubStats),
            verifier: Arc::new(CredentialVerifier::new(auth)),
        };

        Self {
            router: router(state),
            blog_repo,
            playbook_repo,
            storage,
        }
    }

    /// Build an `axum_test::TestServer` from this environment's router.
    pub fn server(&self) -> axum_test::TestServer {
        axum_test::TestServer::builder()
            .expect_success_by_default()
            .build(self.router.clone())
    }

    /// Build a `TestServer` that does NOT expect success by default (for error tests).
    pub fn server_permissive(&self) -> axum_test::TestServer {
        axum_test::TestServer::builder()
            .build(self.router.clone())
    }
}

/// Mint an HS256 token for `email` that expires `expires_in_secs` from now.
pub fn token(email: &str, expires_in_secs: i64) -> String {
    let claims = TokenClaims {
        email: Some(email.to_string()),
        exp: chrono::Utc::now().timestamp() + expires_in_secs,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .expect("Failed to sign token")
}

/// `Authorization` header value for the admin.
pub fn admin_bearer() -> String {
    format!("Bearer {}", token(ADMIN_EMAIL, 3600))
}

pub fn sample_post(slug: &str) -> serde_json::Value {
    serde_json::json!({
        "slug": slug,
        "title": "Hello World",
        "date": "2026-02-18",
        "excerpt": "A first post",
        "tags": ["intro", "meta"],
        "content": "# Hello\n\n![cover](cover.jpg)",
        "media": [
            { "key": "cover.jpg", "s3Key": format!("images/blog/{slug}/cover.jpg"), "type": "image" }
        ]
    })
}

pub fn sample_problem(module: &str, id: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "title": format!("Problem {id}"),
        "leetcodeUrl": format!("https://leetcode.com/problems/{id}/"),
        "difficulty": "Medium",
        "pseudocode": "l, r = 0, n - 1",
        "media": [
            {
                "key": "diagram.png",
                "s3Key": format!("images/playbook/{module}/problems/{id}/diagram.png")
            }
        ]
    })
}

pub fn sample_module(slug: &str, problems: Vec<serde_json::Value>) -> serde_json::Value {
    serde_json::json!({
        "slug": slug,
        "title": "Two Pointers",
        "description": "Converging indices over a sorted array",
        "content": "# Two Pointers",
        "order": 1,
        "media": [
            { "key": "overview.png", "s3Key": format!("images/playbook/{slug}/overview.png") }
        ],
        "problems": problems
    })
}
