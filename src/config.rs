use std::env;

/// Credentials the verifier checks callers against.
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    /// The only human identity allowed to write (compared case-insensitively).
    pub admin_email: String,
    /// HS256 secret shared with the frontend that mints tokens.
    pub signing_secret: Option<String>,
    /// Static key for automation callers (`btf_...`).
    pub service_key: Option<String>,
}

impl AuthConfig {
    /// Build the auth config from environment variables.
    ///
    /// - `ADMIN_EMAIL`
    /// - `NEXTAUTH_SECRET`
    /// - `ADMIN_API_KEY`
    ///
    /// Empty values are treated as unset.
    pub fn from_env() -> Self {
        Self {
            admin_email: env::var("ADMIN_EMAIL").unwrap_or_default(),
            signing_secret: non_empty_var("NEXTAUTH_SECRET"),
            service_key: non_empty_var("ADMIN_API_KEY"),
        }
    }
}

/// Process-wide configuration, read once at startup and passed by reference.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: String,
    pub aws_region: String,
    pub blog_table: String,
    pub playbook_table: String,
    pub s3_bucket: String,
    /// Only honoured when `env == "local"`.
    pub dynamodb_endpoint: Option<String>,
    /// Custom endpoint for MinIO / LocalStack.
    pub s3_endpoint: Option<String>,
    pub leetcode_graphql_url: String,
    pub bind_addr: String,
    pub auth: AuthConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            env: env::var("ENV").unwrap_or_else(|_| "production".to_string()),
            aws_region: env::var("AWS_REGION").unwrap_or_else(|_| "us-west-2".to_string()),
            blog_table: env::var("DYNAMODB_BLOG_TABLE").unwrap_or_else(|_| "blog".to_string()),
            playbook_table: env::var("DYNAMODB_PLAYBOOK_TABLE")
                .unwrap_or_else(|_| "playbook".to_string()),
            s3_bucket: env::var("S3_BUCKET")
                .unwrap_or_else(|_| "botthef-content-bucket".to_string()),
            dynamodb_endpoint: non_empty_var("DYNAMODB_ENDPOINT"),
            s3_endpoint: non_empty_var("S3_ENDPOINT"),
            leetcode_graphql_url: env::var("LEETCODE_GRAPHQL_URL")
                .unwrap_or_else(|_| crate::leetcode::client::DEFAULT_GRAPHQL_URL.to_string()),
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8001".to_string()),
            auth: AuthConfig::from_env(),
        }
    }

    pub fn is_local(&self) -> bool {
        self.env == "local"
    }

    /// The DynamoDB endpoint override, if one applies in this environment.
    pub fn dynamodb_endpoint_override(&self) -> Option<&str> {
        self.dynamodb_endpoint
            .as_deref()
            .filter(|_| self.is_local())
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}
