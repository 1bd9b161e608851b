use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::db::models::SolvedCounts;
use crate::error::AppError;

pub const DEFAULT_GRAPHQL_URL: &str = "https://leetcode.com/graphql";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const USER_STATS_QUERY: &str = r#"
query getUserStats($username: String!) {
  matchedUser(username: $username) {
    submitStats: submitStatsGlobal {
      acSubmissionNum {
        difficulty
        count
      }
    }
  }
}
"#;

// LeetCode rejects requests that do not look like they come from its own site.
const REFERER: &str = "https://leetcode.com";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Source of solved-problem counts for a public profile.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatsSource: Send + Sync {
    /// Fetch counts for `username`.
    ///
    /// Fails with `BadGateway` on transport or parse errors and `NotFound`
    /// when the profile does not exist or is private.
    async fn fetch_solved_counts(&self, username: &str) -> Result<SolvedCounts, AppError>;
}

/// Extract counts from a GraphQL response body.
///
/// Buckets other than `Easy`/`Medium`/`Hard`/`All` are ignored and missing ones count as zero.
pub fn parse_stats_response(body: &Value, username: &str) -> Result<SolvedCounts, AppError> {
    let matched_user = body
        .pointer("/data/matchedUser")
        .filter(|user| !user.is_null())
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "LeetCode username '{username}' not found or profile is private"
            ))
        })?;

    let buckets = matched_user
        .pointer("/submitStats/acSubmissionNum")
        .and_then(Value::as_array)
        .ok_or_else(|| AppError::BadGateway("Unexpected LeetCode response shape".into()))?;

    let mut counts = SolvedCounts::default();
    for bucket in buckets {
        let count = bucket.get("count").and_then(Value::as_u64).unwrap_or(0);
        match bucket.get("difficulty").and_then(Value::as_str) {
            Some("Easy") => counts.easy = count,
            Some("Medium") => counts.medium = count,
            Some("Hard") => counts.hard = count,
            Some("All") => counts.total = count,
            _ => {}
        }
    }

    Ok(counts)
}

/// StatsSource backed by LeetCode's public GraphQL endpoint.
pub struct LeetCodeClient {
    http: reqwest::Client,
    endpoint: String,
}

impl LeetCodeClient {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl StatsSource for LeetCodeClient {
    async fn fetch_solved_counts(&self, username: &str) -> Result<SolvedCounts, AppError> {
        let payload = json!({
            "query": USER_STATS_QUERY,
            "variables": { "username": username },
        });

        let response = self
            .http
            .post(&self.endpoint)
            .header(reqwest::header::REFERER, REFERER)
            .json(&payload)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::BadGateway(format!("LeetCode request failed: {e}")))?;

        let body: Value = response
            .json()
            .await
            .map_err(|e| AppError::BadGateway(format!("LeetCode request failed: {e}")))?;

        parse_stats_response(&body, username)
    }
}
