use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AppError;
use crate::keys::{self, METADATA_SK};

/// A stored document: a flat attribute map including `PK`/`SK`.
pub type Item = serde_json::Map<String, Value>;

/// Tag carried by every playbook item for cross-module queries.
pub const PLAYBOOK_COLLECTION: &str = "PLAYBOOK";

pub const VALID_DIFFICULTIES: &[&str] = &["Easy", "Medium", "Hard"];
pub const VALID_PROBLEM_STATUSES: &[&str] = &["New", "Due", "Review"];

/// Current time as an RFC 3339 UTC timestamp (`2026-02-18T09:30:00.000000+00:00`).
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false)
}

/// Serialize a document or a sparse update into an [`Item`].
pub fn to_item<T: Serialize>(value: &T) -> Result<Item, AppError> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(AppError::Internal(format!(
            "Expected an object, got {other}"
        ))),
    }
}

/// Collect every `media[].s3Key` referenced by the given items.
///
/// Entries without a string `s3Key` are skipped.
pub fn media_s3_keys<'a>(items: impl IntoIterator<Item = &'a Item>) -> Vec<String> {
    items
        .into_iter()
        .filter_map(|item| item.get("media").and_then(Value::as_array))
        .flatten()
        .filter_map(|media| media.get("s3Key").and_then(Value::as_str))
        .map(str::to_string)
        .collect()
}

fn default_media_type() -> String {
    "image".to_string()
}

fn default_problem_status() -> String {
    "New".to_string()
}

/// An uploaded asset embedded in a post, module or problem.
///
/// Field names match the stored representation exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Media {
    /// Relative filename used in the MDX body, e.g. `cover.jpg`.
    pub key: String,
    /// Full blob object key, e.g. `images/blog/hello-world/cover.jpg`.
    #[serde(rename = "s3Key")]
    pub s3_key: String,
    #[serde(rename = "type", default = "default_media_type")]
    pub media_type: String,
}

// -- Blog --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostCreate {
    pub slug: String,
    pub title: String,
    /// ISO calendar date, e.g. `2026-02-18`.
    pub date: String,
    pub excerpt: String,
    pub tags: Vec<String>,
    /// Full MDX body.
    pub content: String,
    #[serde(default)]
    pub media: Vec<Media>,
}

/// Sparse post update. Unset fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<Vec<Media>>,
}

/// Stored blog post (`PK=BLOG#<slug>`, `SK=METADATA`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPostItem {
    #[serde(rename = "PK")]
    pub pk: String,
    #[serde(rename = "SK")]
    pub sk: String,
    pub title: String,
    pub date: String,
    pub excerpt: String,
    pub tags: Vec<String>,
    pub content: String,
    pub media: Vec<Media>,
    pub created_at: String,
    pub updated_at: String,
}

impl BlogPostItem {
    pub fn new(post: PostCreate, timestamp: &str) -> Self {
        Self {
            pk: keys::blog_pk(&post.slug),
            sk: METADATA_SK.to_string(),
            title: post.title,
            date: post.date,
            excerpt: post.excerpt,
            tags: post.tags,
            content: post.content,
            media: post.media,
            created_at: timestamp.to_string(),
            updated_at: timestamp.to_string(),
        }
    }
}

// -- Playbook --

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemCreate {
    /// Problem identifier, unique within its module (e.g. the LeetCode number).
    pub id: String,
    pub title: String,
    pub leetcode_url: String,
    /// One of [`VALID_DIFFICULTIES`].
    pub difficulty: String,
    /// One of [`VALID_PROBLEM_STATUSES`].
    #[serde(default = "default_problem_status")]
    pub status: String,
    pub pseudocode: String,
    #[serde(default)]
    pub media: Vec<Media>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub last_solved: Option<String>,
    #[serde(default)]
    pub next_review: Option<String>,
}

impl ProblemCreate {
    /// Business-rule checks that serde cannot express.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.id.is_empty() {
            return Err(AppError::BadRequest("Problem id cannot be empty".into()));
        }
        if !VALID_DIFFICULTIES.contains(&self.difficulty.as_str()) {
            return Err(AppError::BadRequest(format!(
                "Invalid difficulty '{}'. Expected: {}",
                self.difficulty,
                VALID_DIFFICULTIES.join(", ")
            )));
        }
        if !VALID_PROBLEM_STATUSES.contains(&self.status.as_str()) {
            return Err(AppError::BadRequest(format!(
                "Invalid status '{}'. Expected: {}",
                self.status,
                VALID_PROBLEM_STATUSES.join(", ")
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleCreate {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub content: String,
    pub order: i64,
    #[serde(default)]
    pub media: Vec<Media>,
    /// Problems created together with the module.
    #[serde(default)]
    pub problems: Vec<ProblemCreate>,
}

/// Module-level fields of a [`ModuleUpdate`]. Unset fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModuleFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<Vec<Media>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModuleUpdate {
    #[serde(flatten)]
    pub fields: ModuleFields,
    /// Problems to create or overwrite. `null` and absent both mean none.
    #[serde(default)]
    pub upsert_problems: Option<Vec<ProblemCreate>>,
    /// Problem ids to delete; unknown ids are ignored.
    #[serde(default)]
    pub delete_problem_ids: Option<Vec<String>>,
}

impl ModuleUpdate {
    pub fn upserts(&self) -> &[ProblemCreate] {
        self.upsert_problems.as_deref().unwrap_or_default()
    }

    pub fn deletions(&self) -> &[String] {
        self.delete_problem_ids.as_deref().unwrap_or_default()
    }
}

/// Stored module metadata (`PK=PLAYBOOK#<slug>`, `SK=METADATA`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleItem {
    #[serde(rename = "PK")]
    pub pk: String,
    #[serde(rename = "SK")]
    pub sk: String,
    pub collection: String,
    pub title: String,
    pub description: String,
    pub content: String,
    pub order: i64,
    pub media: Vec<Media>,
    pub created_at: String,
    pub updated_at: String,
}

impl ModuleItem {
    pub fn new(module: &ModuleCreate, timestamp: &str) -> Self {
        Self {
            pk: keys::playbook_pk(&module.slug),
            sk: METADATA_SK.to_string(),
            collection: PLAYBOOK_COLLECTION.to_string(),
            title: module.title.clone(),
            description: module.description.clone(),
            content: module.content.clone(),
            order: module.order,
            media: module.media.clone(),
            created_at: timestamp.to_string(),
            updated_at: timestamp.to_string(),
        }
    }
}

/// Stored problem (`PK=PLAYBOOK#<slug>`, `SK=PROBLEM#<id>`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemItem {
    #[serde(rename = "PK")]
    pub pk: String,
    #[serde(rename = "SK")]
    pub sk: String,
    pub collection: String,
    pub title: String,
    pub leetcode_url: String,
    pub difficulty: String,
    pub status: String,
    pub pseudocode: String,
    pub media: Vec<Media>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_solved: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_review: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl ProblemItem {
    pub fn new(module_slug: &str, problem: &ProblemCreate, created_at: &str, updated_at: &str) -> Self {
        let key = keys::problem_key(module_slug, &problem.id);
        Self {
            pk: key.pk,
            sk: key.sk,
            collection: PLAYBOOK_COLLECTION.to_string(),
            title: problem.title.clone(),
            leetcode_url: problem.leetcode_url.clone(),
            difficulty: problem.difficulty.clone(),
            status: problem.status.clone(),
            pseudocode: problem.pseudocode.clone(),
            media: problem.media.clone(),
            tags: problem.tags.clone(),
            last_solved: problem.last_solved.clone(),
            next_review: problem.next_review.clone(),
            created_at: created_at.to_string(),
            updated_at: updated_at.to_string(),
        }
    }
}

// -- Upload --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadUrlRequest {
    /// E.g. `cover.jpg`.
    pub filename: String,
    /// E.g. `image/jpeg`.
    pub content_type: String,
    /// `blog` or `playbook`.
    pub entity_type: String,
    #[serde(alias = "slug")]
    pub entity_slug: String,
    /// Only used for per-problem playbook assets.
    #[serde(default)]
    pub problem_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadUrlResponse {
    /// Presigned PUT URL.
    pub url: String,
    /// Full object key, to be stored as `media[].s3Key`.
    #[serde(rename = "s3Key")]
    pub s3_key: String,
    /// Relative filename, to be stored as `media[].key`.
    pub key: String,
}

// -- LeetCode stats --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeetCodeSyncRequest {
    pub username: String,
}

/// Solved-problem counts per difficulty bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolvedCounts {
    pub easy: u64,
    pub medium: u64,
    pub hard: u64,
    pub total: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeetCodeSyncResponse {
    pub username: String,
    pub easy: u64,
    pub medium: u64,
    pub hard: u64,
    pub total: u64,
    pub synced_at: String,
}

/// Stored stats singleton (`PK=LEETCODE#stats`, `SK=METADATA`), overwritten on every sync.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeetCodeStatsItem {
    #[serde(rename = "PK")]
    pub pk: String,
    #[serde(rename = "SK")]
    pub sk: String,
    pub easy: u64,
    pub medium: u64,
    pub hard: u64,
    pub total: u64,
    pub synced_at: String,
    pub username: String,
}

// -- Common --

/// Body returned by every successful mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutationResponse {
    pub slug: String,
    pub message: String,
}

impl MutationResponse {
    pub fn new(slug: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            message: message.into(),
        }
    }
}
