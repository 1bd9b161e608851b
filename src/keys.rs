//! Storage key construction.
//!
//! Document keys follow a single-table layout: the partition key groups an
//! entity with its children and the sort key distinguishes items inside it.
//!
//! ```text
//! blog post:        PK=BLOG#<slug>           SK=METADATA
//! playbook module:  PK=PLAYBOOK#<slug>       SK=METADATA
//! playbook problem: PK=PLAYBOOK#<slug>       SK=PROBLEM#<id>
//! stats singleton:  PK=LEETCODE#stats        SK=METADATA
//! ```
//!
//! Blob object keys are derivable from entity type, slug, filename and
//! (optionally) problem id alone, so deleting a document never needs a lookup table.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::error::AppError;

pub const BLOG_PREFIX: &str = "BLOG#";
pub const PLAYBOOK_PREFIX: &str = "PLAYBOOK#";
pub const PROBLEM_PREFIX: &str = "PROBLEM#";
/// Sort key of every top-level document. Never starts with [`PROBLEM_PREFIX`].
pub const METADATA_SK: &str = "METADATA";
pub const LEETCODE_STATS_PK: &str = "LEETCODE#stats";

/// Primary key of a stored document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemKey {
    pub pk: String,
    pub sk: String,
}

impl ItemKey {
    pub fn new(pk: impl Into<String>, sk: impl Into<String>) -> Self {
        Self {
            pk: pk.into(),
            sk: sk.into(),
        }
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.pk, self.sk)
    }
}

pub fn blog_pk(slug: &str) -> String {
    format!("{BLOG_PREFIX}{slug}")
}

pub fn playbook_pk(slug: &str) -> String {
    format!("{PLAYBOOK_PREFIX}{slug}")
}

pub fn problem_sk(problem_id: &str) -> String {
    format!("{PROBLEM_PREFIX}{problem_id}")
}

pub fn blog_key(slug: &str) -> ItemKey {
    ItemKey::new(blog_pk(slug), METADATA_SK)
}

pub fn module_key(slug: &str) -> ItemKey {
    ItemKey::new(playbook_pk(slug), METADATA_SK)
}

pub fn problem_key(module_slug: &str, problem_id: &str) -> ItemKey {
    ItemKey::new(playbook_pk(module_slug), problem_sk(problem_id))
}

pub fn leetcode_stats_key() -> ItemKey {
    ItemKey::new(LEETCODE_STATS_PK, METADATA_SK)
}

/// Content owners that may have uploaded assets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityType {
    Blog,
    Playbook,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown entity_type '{0}'. Must be one of: blog, playbook")]
pub struct InvalidEntityType(pub String);

impl From<InvalidEntityType> for AppError {
    fn from(err: InvalidEntityType) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl FromStr for EntityType {
    type Err = InvalidEntityType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blog" => Ok(EntityType::Blog),
            "playbook" => Ok(EntityType::Playbook),
            other => Err(InvalidEntityType(other.to_string())),
        }
    }
}

/// Canonical blob key for an uploaded asset.
///
/// `problem_id` is only meaningful for playbook assets; it is ignored for blog posts.
pub fn object_key(
    entity_type: EntityType,
    entity_slug: &str,
    filename: &str,
    problem_id: Option<&str>,
) -> String {
    match (entity_type, problem_id.filter(|id| !id.is_empty())) {
        (EntityType::Blog, _) => format!("images/blog/{entity_slug}/{filename}"),
        (EntityType::Playbook, Some(id)) => {
            format!("images/playbook/{entity_slug}/problems/{id}/{filename}")
        }
        (EntityType::Playbook, None) => format!("images/playbook/{entity_slug}/{filename}"),
    }
}

/// Same as [`object_key`] but starting from the raw entity type string.
pub fn build_object_key(
    entity_type: &str,
    entity_slug: &str,
    filename: &str,
    problem_id: Option<&str>,
) -> Result<String, InvalidEntityType> {
    let entity_type: EntityType = entity_type.parse()?;
    Ok(object_key(entity_type, entity_slug, filename, problem_id))
}
