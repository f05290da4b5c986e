use serde::{Deserialize, Serialize};
use validator::Validate;

use super::not_blank;
use crate::store::Entity;

/// Category stored by the category service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(default)]
    pub category_id: i64,
    pub category_name: String,
    pub description: String,
    #[serde(default)]
    pub enabled: bool,
}

impl Entity for Category {
    const COLLECTION: &'static str = "categories";
    const ID_FIELD: &'static str = "categoryId";
    const ID_START: i64 = 3010;

    fn id(&self) -> i64 {
        self.category_id
    }

    fn set_id(&mut self, id: i64) {
        self.category_id = id;
    }
}

/// Body of `POST /categories` and `PUT /categories/{id}`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRequest {
    #[serde(default)]
    #[validate(custom(function = not_blank, message = "Category name should not be empty"))]
    pub category_name: String,

    #[serde(default)]
    #[validate(custom(function = not_blank, message = "Description should not be empty"))]
    pub description: String,

    #[serde(default)]
    pub enabled: bool,
}

impl CategoryRequest {
    pub fn into_category(self, category_id: i64) -> Category {
        Category {
            category_id,
            category_name: self.category_name,
            description: self.description,
            enabled: self.enabled,
        }
    }
}
