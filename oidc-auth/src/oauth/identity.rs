//! End-user identity derived from the userinfo response.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The authenticated end user as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthenticatedIdentity {
    /// Provider's unique subject identifier (`sub`).
    #[serde(rename = "sub")]
    pub subject: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_username: Option<String>,
    /// Every other claim the provider returned, kept opaque.
    #[serde(flatten)]
    pub claims: Map<String, Value>,
}

impl AuthenticatedIdentity {
    /// Best available human-readable name.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.preferred_username.as_deref())
            .or(self.email.as_deref())
            .unwrap_or(&self.subject)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_keycloak_userinfo() {
        let identity: AuthenticatedIdentity = serde_json::from_value(json!({
            "sub": "f3c9a1d2",
            "email": "jane@example.com",
            "email_verified": true,
            "name": "Jane Doe",
            "preferred_username": "jane",
            "given_name": "Jane"
        }))
        .unwrap();

        assert_eq!(identity.subject, "f3c9a1d2");
        assert_eq!(identity.email.as_deref(), Some("jane@example.com"));
        assert_eq!(identity.display_name(), "Jane Doe");
        assert_eq!(identity.claims["email_verified"], json!(true));
        assert_eq!(identity.claims["given_name"], json!("Jane"));
        assert!(!identity.claims.contains_key("sub"));
    }

    #[test]
    fn test_display_name_falls_back() {
        let identity: AuthenticatedIdentity =
            serde_json::from_value(json!({ "sub": "abc", "preferred_username": "jdoe" })).unwrap();
        assert_eq!(identity.display_name(), "jdoe");

        let identity: AuthenticatedIdentity = serde_json::from_value(json!({ "sub": "abc" })).unwrap();
        assert_eq!(identity.display_name(), "abc");
    }

    #[test]
    fn test_missing_subject_is_rejected() {
        let result = serde_json::from_value::<AuthenticatedIdentity>(json!({ "email": "a@b.c" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_serialized_form_round_trips_through_session() {
        let identity: AuthenticatedIdentity =
            serde_json::from_value(json!({ "sub": "abc", "email": "a@b.c", "locale": "en" })).unwrap();
        let value = serde_json::to_value(&identity).unwrap();
        assert_eq!(value, json!({ "sub": "abc", "email": "a@b.c", "locale": "en" }));
    }
}
