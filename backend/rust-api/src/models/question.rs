use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{not_blank, QuizView};
use crate::store::Entity;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct QuestionOptions {
    #[validate(custom(function = not_blank, message = "Option one should not be empty"))]
    pub option_one: String,
    #[validate(custom(function = not_blank, message = "Option two should not be empty"))]
    pub option_two: String,
    #[validate(custom(function = not_blank, message = "Option three should not be empty"))]
    pub option_three: String,
    #[validate(custom(function = not_blank, message = "Option four should not be empty"))]
    pub option_four: String,
    #[validate(custom(function = not_blank, message = "Correct option should not be empty"))]
    pub correct_option: String,
}

impl QuestionOptions {
    pub fn choices(&self) -> [&str; 4] {
        [
            &self.option_one,
            &self.option_two,
            &self.option_three,
            &self.option_four,
        ]
    }

    /// Options are compared as written, without trimming or case folding.
    pub fn has_duplicates(&self) -> bool {
        let distinct: HashSet<&str> = self.choices().into_iter().collect();
        distinct.len() < 4
    }

    pub fn correct_is_a_choice(&self) -> bool {
        self.choices().contains(&self.correct_option.as_str())
    }
}

/// Question stored by the question service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    #[serde(default)]
    pub question_id: i64,
    pub quiz_id: i64,
    pub question_text: String,
    pub options: QuestionOptions,
}

impl Entity for Question {
    const COLLECTION: &'static str = "questions";
    const ID_FIELD: &'static str = "questionId";
    const ID_START: i64 = 5010;

    fn id(&self) -> i64 {
        self.question_id
    }

    fn set_id(&mut self, id: i64) {
        self.question_id = id;
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRequest {
    #[serde(default)]
    #[validate(range(min = 1, message = "Quiz id is required"))]
    pub quiz_id: i64,

    #[serde(default)]
    #[validate(custom(function = not_blank, message = "Question text should not be empty"))]
    pub question_text: String,

    #[serde(default)]
    #[validate(nested)]
    pub options: QuestionOptions,
}

impl QuestionRequest {
    pub fn into_question(self, question_id: i64) -> Question {
        Question {
            question_id,
            quiz_id: self.quiz_id,
            question_text: self.question_text,
            options: self.options,
        }
    }
}

/// Outbound question with its quiz (and the quiz's category) embedded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionView {
    #[serde(flatten)]
    pub question: Question,
    pub quiz: QuizView,
}
