pub mod aggregation;
pub mod auth_service;
pub mod cascade;
pub mod category_service;
pub mod question_service;
pub mod quiz_service;
pub mod registration_service;
pub mod report_service;

#[cfg(test)]
pub(crate) mod testing;

pub use auth_service::AuthService;
pub use category_service::CategoryService;
pub use question_service::QuestionService;
pub use quiz_service::QuizService;
pub use registration_service::RegistrationService;
pub use report_service::ReportService;
