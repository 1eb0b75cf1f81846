use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct RegisterRequest {
    #[validate(length(min = 1, max = 150, message = "username must be 1-150 characters"))]
    pub(crate) username: String,
    pub(crate) password: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginRequest {
    pub(crate) username: String,
    pub(crate) password: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct UserResponse {
    pub(crate) id: String,
    pub(crate) username: String,
    pub(crate) is_admin: bool,
    pub(crate) is_active: bool,
    pub(crate) created_at: String,
}

impl UserResponse {
    pub(crate) fn from_db(user: crate::db::models::User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            is_admin: user.is_admin,
            is_active: user.is_active,
            created_at: format_primitive(user.created_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::{Date, PrimitiveDateTime, Time};

    #[test]
    fn user_response_hides_password_hash() {
        let date = Date::from_calendar_date(2025, time::Month::March, 4).unwrap();
        let created_at = PrimitiveDateTime::new(date, Time::from_hms(7, 8, 9).unwrap());
        let user = crate::db::models::User {
            id: "u-1".to_string(),
            username: "student".to_string(),
            hashed_password: "$argon2id$secret".to_string(),
            is_admin: false,
            is_active: true,
            created_at,
            updated_at: created_at,
        };

        let json = serde_json::to_value(UserResponse::from_db(user)).unwrap();

        assert_eq!(json["created_at"], "2025-03-04T07:08:09Z");
        assert!(json.get("hashed_password").is_none());
    }

    #[test]
    fn register_request_rejects_long_username() {
        let payload = RegisterRequest { username: "x".repeat(151), password: "password1".into() };
        assert!(payload.validate().is_err());
    }
}
