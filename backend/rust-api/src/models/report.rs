use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{not_blank, QuizView, UserProfile};
use crate::store::Entity;

/// Quiz attempt recorded by the report service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    #[serde(default)]
    pub report_id: i64,
    pub user_email_id: String,
    pub quiz_id: i64,
    pub total_marks: i32,
    pub marks_obtained: i32,
    pub wrong_answers: i32,
    pub total_questions: i32,
    pub attempted_questions: i32,
    pub date_and_time: String,
}

impl Entity for Report {
    const COLLECTION: &'static str = "reports";
    const ID_FIELD: &'static str = "reportId";
    const ID_START: i64 = 6010;

    fn id(&self) -> i64 {
        self.report_id
    }

    fn set_id(&mut self, id: i64) {
        self.report_id = id;
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    #[serde(default)]
    #[validate(custom(function = not_blank, message = "User email should not be empty"))]
    pub user_email_id: String,

    #[serde(default)]
    #[validate(range(min = 1, message = "Quiz id is required"))]
    pub quiz_id: i64,

    #[serde(default)]
    #[validate(range(min = 0, message = "Total marks cannot be negative"))]
    pub total_marks: i32,

    #[serde(default)]
    #[validate(range(min = 0, message = "Marks obtained cannot be negative"))]
    pub marks_obtained: i32,

    #[serde(default)]
    #[validate(range(min = 0, message = "Wrong answers cannot be negative"))]
    pub wrong_answers: i32,

    #[serde(default)]
    #[validate(range(min = 0, message = "Total questions cannot be negative"))]
    pub total_questions: i32,

    #[serde(default)]
    #[validate(range(min = 0, message = "Attempted questions cannot be negative"))]
    pub attempted_questions: i32,

    #[serde(default)]
    #[validate(custom(function = not_blank, message = "Date and time should not be empty"))]
    pub date_and_time: String,
}

impl ReportRequest {
    pub fn into_report(self) -> Report {
        Report {
            report_id: 0,
            user_email_id: self.user_email_id,
            quiz_id: self.quiz_id,
            total_marks: self.total_marks,
            marks_obtained: self.marks_obtained,
            wrong_answers: self.wrong_answers,
            total_questions: self.total_questions,
            attempted_questions: self.attempted_questions,
            date_and_time: self.date_and_time,
        }
    }
}

/// Outbound report with the user and the quiz embedded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportView {
    #[serde(flatten)]
    pub report: Report,
    pub user: UserProfile,
    pub quiz: QuizView,
}
