use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::not_blank;
use crate::store::Entity;

pub const DEFAULT_ROLE: &str = "user";

lazy_static! {
    static ref MOBILE_NUMBER: Regex = Regex::new(r"^[0-9]{10}$").unwrap();
}

/// Registered user. `password` holds the bcrypt hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    #[serde(default)]
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub mobile_number: String,
    pub user_role: String,
    pub email: String,
    pub password: String,
}

impl Entity for Registration {
    const COLLECTION: &'static str = "registrations";
    const ID_FIELD: &'static str = "userId";
    const ID_START: i64 = 1010;

    fn id(&self) -> i64 {
        self.user_id
    }

    fn set_id(&mut self, id: i64) {
        self.user_id = id;
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    #[serde(default)]
    #[validate(custom(function = not_blank, message = "First name should not be empty"))]
    pub first_name: String,

    #[serde(default)]
    #[validate(custom(function = not_blank, message = "Last name should not be empty"))]
    pub last_name: String,

    #[serde(default)]
    #[validate(regex(path = *MOBILE_NUMBER, message = "Mobile number should be 10 digits"))]
    pub mobile_number: String,

    #[serde(default)]
    pub user_role: Option<String>,

    #[serde(default)]
    #[validate(email(message = "Email should be valid"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 4, message = "Password should be at least 4 characters"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(custom(function = not_blank, message = "Email should not be empty"))]
    pub email: String,

    #[serde(default)]
    #[validate(custom(function = not_blank, message = "Password should not be empty"))]
    pub password: String,
}

/// Registration as seen by other services; the password hash never leaves
/// the registration service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub mobile_number: String,
    pub user_role: String,
    pub email: String,
}

impl From<Registration> for UserProfile {
    fn from(r: Registration) -> Self {
        Self {
            user_id: r.user_id,
            first_name: r.first_name,
            last_name: r.last_name,
            mobile_number: r.mobile_number,
            user_role: r.user_role,
            email: r.email,
        }
    }
}
