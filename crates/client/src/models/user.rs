//! User domain types.

use serde::{Deserialize, Serialize};

use shopapp_core::{RoleId, UserId};

/// Role assigned to a user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
}

impl Role {
    /// Whether this role grants access to store administration endpoints.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.name.eq_ignore_ascii_case("admin")
    }
}

/// Profile of the logged-in user.
///
/// This is both the body of `GET /users/details` and the document stored
/// under the `user` storage key. Deserialization checks that required fields
/// are present with the right primitive type; values are not range-checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub fullname: String,
    pub phone_number: String,
    #[serde(default)]
    pub address: String,
    pub is_active: bool,
    /// Passed through as sent by the backend (timestamp or date string).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facebook_account_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_account_id: Option<i64>,
    pub role: Role,
}

impl UserProfile {
    /// Whether the account was created through a social login.
    #[must_use]
    pub fn has_linked_account(&self) -> bool {
        self.facebook_account_id.is_some_and(|id| id > 0)
            || self.google_account_id.is_some_and(|id| id > 0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_parses_backend_shape() {
        let json = r#"{
            "id": 12,
            "fullname": "Nguyen Van A",
            "phone_number": "0912345678",
            "address": "Ha Noi",
            "is_active": true,
            "date_of_birth": 946684800000,
            "facebook_account_id": 0,
            "google_account_id": 0,
            "role": {"id": 1, "name": "user"}
        }"#;

        let profile: UserProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.id, UserId::new(12));
        assert!(profile.is_active);
        assert!(!profile.role.is_admin());
        assert!(!profile.has_linked_account());
    }

    #[test]
    fn test_profile_rejects_wrong_primitive_type() {
        let json = r#"{
            "id": "twelve",
            "fullname": "A",
            "phone_number": "1",
            "is_active": true,
            "role": {"id": 1, "name": "user"}
        }"#;
        assert!(serde_json::from_str::<UserProfile>(json).is_err());
    }

    #[test]
    fn test_profile_rejects_missing_required_field() {
        let json = r#"{"id": 1, "fullname": "A", "phone_number": "1", "role": {"id": 1, "name": "user"}}"#;
        assert!(serde_json::from_str::<UserProfile>(json).is_err());
    }

    #[test]
    fn test_optional_fields_default() {
        let json = r#"{"id": 3, "fullname": "B", "phone_number": "2", "is_active": false,
                       "role": {"id": 2, "name": "ADMIN"}}"#;
        let profile: UserProfile = serde_json::from_str(json).unwrap();
        assert!(profile.address.is_empty());
        assert!(profile.date_of_birth.is_none());
        assert!(profile.role.is_admin());
    }
}
