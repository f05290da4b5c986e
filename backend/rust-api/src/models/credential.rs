use serde::{Deserialize, Serialize};
use validator::Validate;

use super::not_blank;
use crate::store::Entity;

/// Login credential owned by the auth service. `password` is a bcrypt hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    pub email_id: String,
    pub password: String,
}

impl Entity for Credential {
    const COLLECTION: &'static str = "credentials";
    const ID_FIELD: &'static str = "id";
    const ID_START: i64 = 2010;

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CredentialRequest {
    #[serde(default)]
    #[validate(custom(function = not_blank, message = "Name should not be empty"))]
    pub name: String,

    #[serde(default)]
    #[validate(custom(function = not_blank, message = "Email should not be empty"))]
    pub email_id: String,

    #[serde(default)]
    #[validate(custom(function = not_blank, message = "Password should not be empty"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TokenRequest {
    #[serde(default)]
    #[validate(custom(function = not_blank, message = "Email should not be empty"))]
    pub email_id: String,

    #[serde(default)]
    #[validate(custom(function = not_blank, message = "Password should not be empty"))]
    pub password: String,
}
