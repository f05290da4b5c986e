//! In-process peer fakes for service unit tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::models::{CascadeReport, Category, Quiz, QuizView, UserProfile};
use crate::remote::{CategoryPeer, QuestionPeer, QuizPeer, RegistrationPeer, RemoteError};

pub fn category(id: i64, name: &str) -> Category {
    Category {
        category_id: id,
        category_name: name.to_string(),
        description: format!("{} questions", name),
        enabled: true,
    }
}

pub fn quiz(id: i64, category_id: i64, name: &str) -> Quiz {
    Quiz {
        quiz_id: id,
        category_id,
        quiz_name: name.to_string(),
        quiz_description: format!("{} quiz", name),
        time_in_minutes: 15,
        enabled: true,
    }
}

fn not_found(service: &str, what: String) -> RemoteError {
    RemoteError::NotFound {
        service: service.to_string(),
        message: what,
    }
}

fn unavailable(service: &str) -> RemoteError {
    RemoteError::Unavailable {
        service: service.to_string(),
        reason: "connection refused".to_string(),
    }
}

#[derive(Default)]
pub struct FakeCategories {
    rows: Vec<Category>,
    down: bool,
    batch: AtomicUsize,
}

impl FakeCategories {
    pub fn with(rows: Vec<Category>) -> Self {
        Self {
            rows,
            ..Default::default()
        }
    }

    pub fn unavailable() -> Self {
        Self {
            down: true,
            ..Default::default()
        }
    }

    pub fn batch_calls(&self) -> usize {
        self.batch.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CategoryPeer for FakeCategories {
    async fn get_category(&self, category_id: i64) -> Result<Category, RemoteError> {
        if self.down {
            return Err(unavailable("category-service"));
        }
        self.rows
            .iter()
            .find(|c| c.category_id == category_id)
            .cloned()
            .ok_or_else(|| not_found("category-service", format!("Category not found with id: {}", category_id)))
    }

    async fn get_categories(&self, ids: &[i64]) -> Result<Vec<Category>, RemoteError> {
        self.batch.fetch_add(1, Ordering::SeqCst);
        if self.down {
            return Err(unavailable("category-service"));
        }
        Ok(self
            .rows
            .iter()
            .filter(|c| ids.contains(&c.category_id))
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct FakeQuizzes {
    rows: Vec<QuizView>,
    down: bool,
    batch: AtomicUsize,
    cascaded: Mutex<Vec<i64>>,
}

impl FakeQuizzes {
    pub fn with(quizzes: Vec<Quiz>) -> Self {
        let rows = quizzes
            .into_iter()
            .map(|q| {
                let category = category(q.category_id, "Rust");
                QuizView { quiz: q, category }
            })
            .collect();
        Self {
            rows,
            ..Default::default()
        }
    }

    pub fn unavailable() -> Self {
        Self {
            down: true,
            ..Default::default()
        }
    }

    pub fn batch_calls(&self) -> usize {
        self.batch.load(Ordering::SeqCst)
    }

    pub fn cascaded(&self) -> Vec<i64> {
        self.cascaded.lock().unwrap().clone()
    }
}

#[async_trait]
impl QuizPeer for FakeQuizzes {
    async fn get_quiz(&self, quiz_id: i64) -> Result<QuizView, RemoteError> {
        if self.down {
            return Err(unavailable("quiz-service"));
        }
        self.rows
            .iter()
            .find(|q| q.quiz.quiz_id == quiz_id)
            .cloned()
            .ok_or_else(|| not_found("quiz-service", format!("Quiz not found with id: {}", quiz_id)))
    }

    async fn get_quizzes(&self, ids: &[i64]) -> Result<Vec<QuizView>, RemoteError> {
        self.batch.fetch_add(1, Ordering::SeqCst);
        if self.down {
            return Err(unavailable("quiz-service"));
        }
        Ok(self
            .rows
            .iter()
            .filter(|q| ids.contains(&q.quiz.quiz_id))
            .cloned()
            .collect())
    }

    async fn delete_quizzes_by_category(&self, category_id: i64) -> Result<CascadeReport, RemoteError> {
        if self.down {
            return Err(unavailable("quiz-service"));
        }
        self.cascaded.lock().unwrap().push(category_id);
        let mut report = CascadeReport::new(category_id);
        report.completed = self
            .rows
            .iter()
            .filter(|q| q.quiz.category_id == category_id)
            .map(|q| q.quiz.quiz_id)
            .collect();
        Ok(report)
    }
}

#[derive(Default)]
pub struct FakeQuestions {
    failing: HashSet<i64>,
    deleted: Mutex<Vec<i64>>,
}

impl FakeQuestions {
    /// Deleting the questions of any quiz in `failing` reports the peer as down.
    pub fn failing_for(failing: &[i64]) -> Self {
        Self {
            failing: failing.iter().copied().collect(),
            ..Default::default()
        }
    }

    pub fn deleted(&self) -> Vec<i64> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl QuestionPeer for FakeQuestions {
    async fn delete_questions_by_quiz(&self, quiz_id: i64) -> Result<u64, RemoteError> {
        if self.failing.contains(&quiz_id) {
            return Err(unavailable("question-service"));
        }
        self.deleted.lock().unwrap().push(quiz_id);
        Ok(2)
    }
}

#[derive(Default)]
pub struct FakeUsers {
    emails: Vec<String>,
    batch: AtomicUsize,
}

impl FakeUsers {
    pub fn with(emails: &[&str]) -> Self {
        Self {
            emails: emails.iter().map(|e| e.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn batch_calls(&self) -> usize {
        self.batch.load(Ordering::SeqCst)
    }

    fn profile(email: &str) -> UserProfile {
        UserProfile {
            user_id: 1010,
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            mobile_number: "9876543210".to_string(),
            user_role: "user".to_string(),
            email: email.to_string(),
        }
    }
}

#[async_trait]
impl RegistrationPeer for FakeUsers {
    async fn get_user(&self, email: &str) -> Result<UserProfile, RemoteError> {
        if self.emails.iter().any(|e| e == email) {
            Ok(Self::profile(email))
        } else {
            Err(not_found("registration-service", format!("User not found with email: {}", email)))
        }
    }

    async fn get_users(&self, emails: &[String]) -> Result<Vec<UserProfile>, RemoteError> {
        self.batch.fetch_add(1, Ordering::SeqCst);
        Ok(emails
            .iter()
            .filter(|e| self.emails.contains(e))
            .map(|e| Self::profile(e))
            .collect())
    }
}
