use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

use crate::auth::models::{Identity, TokenClaims};
use crate::config::AuthConfig;
use crate::error::AppError;

/// Prefix that marks a credential as a static service key rather than a token.
pub const SERVICE_KEY_PREFIX: &str = "btf_";

/// Validates bearer credentials against the configured admin identity.
///
/// Two schemes funnel into one result:
/// - `btf_...` static service keys, compared byte-for-byte with the configured key;
/// - HS256-signed tokens with an `exp` and an `email` claim matching the admin email.
#[derive(Debug, Clone)]
pub struct CredentialVerifier {
    config: AuthConfig,
}

impl CredentialVerifier {
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    pub fn verify(&self, credential: &str) -> Result<Identity, AppError> {
        if credential.starts_with(SERVICE_KEY_PREFIX) {
            self.verify_service_key(credential)
        } else {
            self.verify_token(credential)
        }
    }

    fn verify_service_key(&self, credential: &str) -> Result<Identity, AppError> {
        let expected = self
            .config
            .service_key
            .as_deref()
            .ok_or_else(|| AppError::Misconfigured("ADMIN_API_KEY not configured".into()))?;

        if credential.as_bytes() != expected.as_bytes() {
            tracing::warn!("Rejected service key");
            return Err(AppError::Auth("Invalid API key".into()));
        }

        Ok(Identity::Service)
    }

    fn verify_token(&self, token: &str) -> Result<Identity, AppError> {
        let secret = self
            .config
            .signing_secret
            .as_deref()
            .ok_or_else(|| AppError::Misconfigured("NEXTAUTH_SECRET not configured".into()))?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_aud = false;

        let data = decode::<TokenClaims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => {
                tracing::warn!("Rejected expired token");
                AppError::Auth("Token expired".into())
            }
            other => {
                tracing::warn!("Rejected invalid token: {other:?}");
                AppError::Auth("Invalid token".into())
            }
        })?;

        // An empty admin email or an empty claim never matches.
        let admin_email = self.config.admin_email.trim();
        match data.claims.email {
            Some(email)
                if !email.is_empty()
                    && !admin_email.is_empty()
                    && email.eq_ignore_ascii_case(admin_email) =>
            {
                Ok(Identity::Human(email))
            }
            email => {
                tracing::warn!("Rejected token for non-admin identity {email:?}");
                Err(AppError::Forbidden("Not authorized".into()))
            }
        }
    }
}
