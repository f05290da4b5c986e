use std::sync::Arc;

use serde_json::json;
use validator::Validate;

use super::aggregation::enrich_questions;
use crate::error::{AppError, AppResult};
use crate::models::{Question, QuestionOptions, QuestionRequest, QuestionView, QuizView, SuccessResponse};
use crate::remote::QuizPeer;
use crate::store::ResourceStore;

pub struct QuestionService {
    store: Arc<dyn ResourceStore<Question>>,
    quizzes: Arc<dyn QuizPeer>,
}

fn not_found(question_id: i64) -> AppError {
    AppError::NotFound(format!("Question not found with id: {}", question_id))
}

/// Four distinct options, one of which is the correct one.
fn check_options(options: &QuestionOptions) -> AppResult<()> {
    if options.has_duplicates() {
        return Err(AppError::DuplicateOption(
            "Options of a question must all be different".to_string(),
        ));
    }
    if !options.correct_is_a_choice() {
        return Err(AppError::validation(
            "correctOption",
            "Correct option must match one of the options",
        ));
    }
    Ok(())
}

impl QuestionService {
    pub fn new(store: Arc<dyn ResourceStore<Question>>, quizzes: Arc<dyn QuizPeer>) -> Self {
        Self { store, quizzes }
    }

    async fn quiz(&self, quiz_id: i64) -> AppResult<QuizView> {
        self.quizzes
            .get_quiz(quiz_id)
            .await
            .map_err(|e| AppError::from_lookup(e, "Quiz", "id", quiz_id))
    }

    async fn load(&self, question_id: i64) -> AppResult<Question> {
        self.store.get(question_id).await?.ok_or_else(|| {
            tracing::warn!(question_id, "Question not found");
            not_found(question_id)
        })
    }

    pub async fn add(&self, request: QuestionRequest) -> AppResult<SuccessResponse> {
        request.validate()?;
        check_options(&request.options)?;
        self.quiz(request.quiz_id).await?;

        let saved = self.store.insert(request.into_question(0)).await?;
        tracing::info!(question_id = saved.question_id, quiz_id = saved.quiz_id, "Question created");
        Ok(SuccessResponse::created("Question added successfully").with_id(saved.question_id))
    }

    pub async fn get(&self, question_id: i64) -> AppResult<QuestionView> {
        let question = self.load(question_id).await?;
        let quiz = self.quiz(question.quiz_id).await?;
        Ok(QuestionView { question, quiz })
    }

    pub async fn list(&self) -> AppResult<Vec<QuestionView>> {
        let questions = self.store.list().await?;
        enrich_questions(self.quizzes.as_ref(), questions).await
    }

    pub async fn list_by_quiz(&self, quiz_id: i64) -> AppResult<Vec<QuestionView>> {
        let questions = self.store.find_by("quizId", json!(quiz_id)).await?;
        enrich_questions(self.quizzes.as_ref(), questions).await
    }

    pub async fn update(&self, question_id: i64, request: QuestionRequest) -> AppResult<SuccessResponse> {
        request.validate()?;
        self.load(question_id).await?;
        check_options(&request.options)?;
        self.quiz(request.quiz_id).await?;

        self.store
            .update(request.into_question(question_id))
            .await?
            .ok_or_else(|| not_found(question_id))?;

        tracing::info!(question_id, "Question updated");
        Ok(SuccessResponse::ok("Question updated successfully"))
    }

    pub async fn delete(&self, question_id: i64) -> AppResult<SuccessResponse> {
        if !self.store.delete(question_id).await? {
            return Err(not_found(question_id));
        }
        tracing::info!(question_id, "Question deleted");
        Ok(SuccessResponse::ok("Question deleted successfully"))
    }

    /// Idempotent: a quiz without questions is a success with zero removed.
    pub async fn delete_by_quiz(&self, quiz_id: i64) -> AppResult<SuccessResponse> {
        let questions = self.store.find_by("quizId", json!(quiz_id)).await?;
        let mut removed = 0u64;
        for question in questions {
            if self.store.delete(question.question_id).await? {
                removed += 1;
            }
        }
        tracing::info!(quiz_id, removed, "Questions of quiz deleted");
        Ok(SuccessResponse::ok("Questions deleted successfully").with_deleted(removed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::{quiz, FakeQuizzes};
    use crate::store::MemoryStore;

    fn options(one: &str, two: &str, three: &str, four: &str, correct: &str) -> QuestionOptions {
        QuestionOptions {
            option_one: one.to_string(),
            option_two: two.to_string(),
            option_three: three.to_string(),
            option_four: four.to_string(),
            correct_option: correct.to_string(),
        }
    }

    fn request(quiz_id: i64, opts: QuestionOptions) -> QuestionRequest {
        QuestionRequest {
            quiz_id,
            question_text: "Which keyword moves ownership into a closure?".to_string(),
            options: opts,
        }
    }

    fn valid(quiz_id: i64) -> QuestionRequest {
        request(quiz_id, options("move", "ref", "mut", "static", "move"))
    }

    fn service(quizzes: FakeQuizzes) -> QuestionService {
        QuestionService::new(Arc::new(MemoryStore::<Question>::new()), Arc::new(quizzes))
    }

    #[tokio::test]
    async fn duplicate_options_rejected_before_quiz_lookup() {
        let service = service(FakeQuizzes::unavailable());
        let err = service
            .add(request(4010, options("a", "b", "a", "d", "a")))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DuplicateOption(_)));
    }

    #[tokio::test]
    async fn correct_option_must_be_one_of_the_four() {
        let service = service(FakeQuizzes::with(vec![quiz(4010, 3010, "Ownership")]));
        let err = service
            .add(request(4010, options("a", "b", "c", "d", "e")))
            .await
            .unwrap_err();
        match err {
            AppError::Validation(fields) => assert!(fields.contains_key("correctOption")),
            other => panic!("unexpected {:?}", other),
        }
        assert!(service.store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_quiz_blocks_the_write() {
        let service = service(FakeQuizzes::with(vec![quiz(4010, 3010, "Ownership")]));
        let err = service.add(valid(9999)).await.unwrap_err();
        assert!(matches!(&err, AppError::NotFound(m) if m.contains("9999")));
    }

    #[tokio::test]
    async fn get_embeds_quiz_and_category() {
        let service = service(FakeQuizzes::with(vec![quiz(4010, 3010, "Ownership")]));
        let created = service.add(valid(4010)).await.unwrap();
        assert_eq!(created.id, Some(5010));

        let view = service.get(5010).await.unwrap();
        assert_eq!(view.quiz.quiz.quiz_name, "Ownership");
        assert_eq!(view.quiz.category.category_id, 3010);
    }

    #[tokio::test]
    async fn update_rechecks_options() {
        let service = service(FakeQuizzes::with(vec![quiz(4010, 3010, "Ownership")]));
        service.add(valid(4010)).await.unwrap();

        let err = service
            .update(5010, request(4010, options("x", "x", "y", "z", "x")))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DuplicateOption(_)));

        let err = service.update(9999, valid(4010)).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_by_quiz_is_idempotent() {
        let service = service(FakeQuizzes::with(vec![
            quiz(4010, 3010, "Ownership"),
            quiz(4011, 3010, "Traits"),
        ]));
        service.add(valid(4010)).await.unwrap();
        service.add(valid(4010)).await.unwrap();
        service.add(valid(4011)).await.unwrap();

        let first = service.delete_by_quiz(4010).await.unwrap();
        assert_eq!(first.deleted, Some(2));
        let second = service.delete_by_quiz(4010).await.unwrap();
        assert_eq!(second.deleted, Some(0));

        assert_eq!(service.list_by_quiz(4011).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn list_fails_when_a_quiz_is_gone() {
        let service = service(FakeQuizzes::with(vec![quiz(4010, 3010, "Ownership")]));
        service.add(valid(4010)).await.unwrap();
        service
            .store
            .insert(valid(4099).into_question(0))
            .await
            .unwrap();

        let err = service.list().await.unwrap_err();
        assert!(matches!(&err, AppError::NotFound(m) if m.contains("4099")));
    }
}
