use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Session of an authenticated operator, built from a validated access token
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    /// Subject claim of the access token
    pub sub: String,
    /// Session id, only present for interactive sign-ins
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Display name or email if the token carries one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl AuthenticatedUser {
    /// Label used in audit log lines
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.sub)
    }
}
