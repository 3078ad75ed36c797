//! Account API models.

use serde::{Deserialize, Serialize};

/// Envelope every account endpoint answers with.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(bound(deserialize = "T: Deserialize<'de> + Default"))]
pub struct ApiEnvelope<T> {
    /// Human-readable status message.
    #[serde(default)]
    pub message: String,
    /// Application status code (`0` on success).
    #[serde(default)]
    pub code: i64,
    /// Endpoint payload.
    #[serde(default)]
    pub result: T,
}

/// Response of `GET /{version}/me`.
pub type GetUserResponse = ApiEnvelope<UserProfile>;

/// Profile of the signed-in user.
///
/// Missing fields decode to their zero value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct UserProfile {
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Display name.
    pub display_name: String,
    /// Newsletter subscription flag.
    pub subscribed: bool,
    /// Preferred language tag.
    pub language: String,
    /// Gender code.
    pub gender: i32,
    /// Account creation time as sent by the service.
    pub created_at: String,
    /// Last profile update as sent by the service.
    pub updated_at: String,
    /// Portal notification opt-in.
    pub portal_notify: bool,
    /// Simple token.
    pub simple_token: String,
    /// Birthday; older deployments send it as `brithday`.
    #[serde(alias = "brithday")]
    pub birthday: String,
    /// Mobile number.
    pub mobile_number: String,
    /// User identifier.
    pub user_id: String,
    /// Primary email address.
    pub email: String,
}

/// Status-only response for calls that carry no result.
pub type StatusResponse = ApiEnvelope<serde_json::Value>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_profile_accepts_misspelled_birthday() {
        let profile: UserProfile = serde_json::from_value(json!({
            "user_id": "abc",
            "brithday": "1990-01-01"
        }))
        .unwrap();

        assert_eq!(profile.birthday, "1990-01-01");
        assert_eq!(profile.user_id, "abc");
    }

    #[test]
    fn test_user_profile_defaults_missing_fields() {
        let profile: UserProfile = serde_json::from_value(json!({ "email": "a@b.c" })).unwrap();
        assert_eq!(profile.email, "a@b.c");
        assert!(profile.first_name.is_empty());
        assert!(!profile.subscribed);
        assert_eq!(profile.gender, 0);
    }

    #[test]
    fn test_envelope_without_result() {
        let response: GetUserResponse =
            serde_json::from_value(json!({ "message": "ok", "code": 0 })).unwrap();
        assert_eq!(response.result, UserProfile::default());
    }

    #[test]
    fn test_status_response_keeps_arbitrary_result() {
        let response: StatusResponse = serde_json::from_value(json!({
            "message": "ok",
            "code": 0,
            "result": { "sent": true }
        }))
        .unwrap();
        assert_eq!(response.result["sent"], json!(true));
    }
}
