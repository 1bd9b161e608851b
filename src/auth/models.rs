use serde::{Deserialize, Serialize};
use std::fmt;

/// A verified caller.
///
/// Both variants currently carry the same write privileges; they are kept
/// apart so authorization can diverge later without touching the verifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "email", rename_all = "lowercase")]
pub enum Identity {
    /// Automation caller authenticated with the static service key.
    Service,
    /// The human admin, authenticated with a signed token.
    Human(String),
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identity::Service => write!(f, "service"),
            Identity::Human(email) => write!(f, "{email}"),
        }
    }
}

/// Claims the verifier reads from a signed token. `exp` is checked by the decoder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub exp: i64,
}
