//! User profile as returned by `GET /users/info` and persisted as `userInfo`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::id::UserId;

/// Role granted to an account.
///
/// Unknown role strings are preserved rather than rejected so a profile from a
/// newer backend still loads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum UserRole {
    /// `ROLE_USER`
    User,
    /// `ROLE_ADMIN`
    Admin,
    /// Anything else the backend sends.
    Other(String),
}

impl From<String> for UserRole {
    fn from(s: String) -> Self {
        match s.as_str() {
            "ROLE_USER" => Self::User,
            "ROLE_ADMIN" => Self::Admin,
            _ => Self::Other(s),
        }
    }
}

impl From<UserRole> for String {
    fn from(role: UserRole) -> Self {
        match role {
            UserRole::User => "ROLE_USER".to_owned(),
            UserRole::Admin => "ROLE_ADMIN".to_owned(),
            UserRole::Other(s) => s,
        }
    }
}

/// The signed-in user's profile.
///
/// Every field is optional: an empty profile (`{}`) is the signed-out state.
/// Fields this type does not model are kept in `extra` so that persisting and
/// reloading a profile never drops data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub real_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_level: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserProfile {
    /// Whether this is the empty (`{}`) profile.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Whether the profile carries the admin role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Some(UserRole::Admin)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_object_is_empty_profile() {
        let profile: UserProfile = serde_json::from_value(json!({})).unwrap();
        assert!(profile.is_empty());
        assert_eq!(serde_json::to_value(&profile).unwrap(), json!({}));
    }

    #[test]
    fn test_admin_role() {
        let profile: UserProfile =
            serde_json::from_value(json!({"id": 1, "role": "ROLE_ADMIN"})).unwrap();
        assert!(profile.is_admin());

        let profile: UserProfile = serde_json::from_value(json!({"role": "ROLE_USER"})).unwrap();
        assert!(!profile.is_admin());
    }

    #[test]
    fn test_unknown_fields_and_roles_survive_round_trip() {
        let raw = json!({
            "id": 9,
            "username": "oolong",
            "realName": "Wu Long",
            "role": "ROLE_AUDITOR",
            "createdAt": "2024-05-01T10:00:00"
        });
        let profile: UserProfile = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(profile.role, Some(UserRole::Other("ROLE_AUDITOR".to_owned())));
        assert_eq!(profile.real_name.as_deref(), Some("Wu Long"));
        assert_eq!(serde_json::to_value(&profile).unwrap(), raw);
    }
}
