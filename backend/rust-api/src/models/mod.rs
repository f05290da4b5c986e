use validator::ValidationError;

pub mod cascade;
pub mod category;
pub mod credential;
pub mod question;
pub mod quiz;
pub mod registration;
pub mod report;
pub mod response;

pub use cascade::{CascadeFailure, CascadeReport};
pub use category::{Category, CategoryRequest};
pub use credential::{Credential, CredentialRequest, TokenRequest};
pub use question::{Question, QuestionOptions, QuestionRequest, QuestionView};
pub use quiz::{Quiz, QuizRequest, QuizView};
pub use registration::{LoginRequest, Registration, RegistrationRequest, UserProfile};
pub use report::{Report, ReportRequest, ReportView};
pub use response::SuccessResponse;

/// Rejects empty and whitespace-only strings.
pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Query string of the batch lookup endpoints: `?ids=1,2,3`.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct BatchIdsQuery {
    #[serde(default)]
    pub ids: String,
}

impl BatchIdsQuery {
    pub fn parse(&self) -> Result<Vec<i64>, String> {
        self.ids
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<i64>().map_err(|_| format!("Invalid id in batch query: {}", s)))
            .collect()
    }
}

/// Query string of the user batch endpoint: `?emails=a@x.com,b@y.com`.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct BatchEmailsQuery {
    #[serde(default)]
    pub emails: String,
}

impl BatchEmailsQuery {
    pub fn parse(&self) -> Vec<String> {
        self.emails
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}
