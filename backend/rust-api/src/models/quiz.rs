use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{not_blank, Category};
use crate::store::Entity;

/// Quiz stored by the quiz service. `category_id` points at a category owned
/// by the category service and is only checked when the quiz is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    #[serde(default)]
    pub quiz_id: i64,
    pub category_id: i64,
    pub quiz_name: String,
    pub quiz_description: String,
    pub time_in_minutes: i32,
    #[serde(default)]
    pub enabled: bool,
}

impl Entity for Quiz {
    const COLLECTION: &'static str = "quizzes";
    const ID_FIELD: &'static str = "quizId";
    const ID_START: i64 = 4010;

    fn id(&self) -> i64 {
        self.quiz_id
    }

    fn set_id(&mut self, id: i64) {
        self.quiz_id = id;
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct QuizRequest {
    #[serde(default)]
    #[validate(range(min = 1, message = "Category id is required"))]
    pub category_id: i64,

    #[serde(default)]
    #[validate(custom(function = not_blank, message = "Quiz name should not be empty"))]
    pub quiz_name: String,

    #[serde(default)]
    #[validate(custom(function = not_blank, message = "Quiz description should not be empty"))]
    pub quiz_description: String,

    #[serde(default)]
    #[validate(range(min = 1, message = "Time should be at least 1 minute"))]
    pub time_in_minutes: i32,

    #[serde(default)]
    pub enabled: bool,
}

impl QuizRequest {
    pub fn into_quiz(self, quiz_id: i64) -> Quiz {
        Quiz {
            quiz_id,
            category_id: self.category_id,
            quiz_name: self.quiz_name,
            quiz_description: self.quiz_description,
            time_in_minutes: self.time_in_minutes,
            enabled: self.enabled,
        }
    }
}

/// Outbound quiz with its category embedded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizView {
    #[serde(flatten)]
    pub quiz: Quiz,
    pub category: Category,
}
