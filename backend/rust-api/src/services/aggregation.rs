//! Read-side joins across service boundaries.
//!
//! Bulk reads collect the distinct foreign keys first and fetch them with one
//! batch call per foreign entity type. Every requested key must come back;
//! one missing key or one failed call fails the whole response.

use std::collections::{BTreeMap, BTreeSet};
use std::future::Future;

use crate::error::{AppError, AppResult};
use crate::models::{Question, QuestionView, Quiz, QuizView, Report, ReportView};
use crate::remote::{CategoryPeer, QuizPeer, RegistrationPeer};

/// Fetches the distinct `keys` in one call and indexes the result by key.
///
/// No call is made when there are no keys.
pub async fn fetch_indexed<K, V, F, Fut>(
    keys: impl IntoIterator<Item = K>,
    fetch: F,
    key_of: impl Fn(&V) -> K,
    missing: impl Fn(&K) -> AppError,
) -> AppResult<BTreeMap<K, V>>
where
    K: Ord + Clone,
    F: FnOnce(Vec<K>) -> Fut,
    Fut: Future<Output = AppResult<Vec<V>>>,
{
    let wanted: BTreeSet<K> = keys.into_iter().collect();
    if wanted.is_empty() {
        return Ok(BTreeMap::new());
    }

    let fetched = fetch(wanted.iter().cloned().collect()).await?;
    let mut index: BTreeMap<K, V> = fetched.into_iter().map(|v| (key_of(&v), v)).collect();
    index.retain(|k, _| wanted.contains(k));

    if let Some(absent) = wanted.iter().find(|k| !index.contains_key(k)) {
        return Err(missing(absent));
    }
    Ok(index)
}

fn category_missing(id: &i64) -> AppError {
    AppError::NotFound(format!("Category not found with id: {}", id))
}

fn quiz_missing(id: &i64) -> AppError {
    AppError::NotFound(format!("Quiz not found with id: {}", id))
}

fn user_missing(email: &String) -> AppError {
    AppError::NotFound(format!("User not found with email: {}", email))
}

/// Embeds each quiz's category.
pub async fn enrich_quizzes(
    categories: &dyn CategoryPeer,
    quizzes: Vec<Quiz>,
) -> AppResult<Vec<QuizView>> {
    let index = fetch_indexed(
        quizzes.iter().map(|q| q.category_id),
        |ids| async move {
            categories
                .get_categories(&ids)
                .await
                .map_err(|e| AppError::from_remote(e, format!("Category lookup failed for ids: {:?}", ids)))
        },
        |c| c.category_id,
        category_missing,
    )
    .await?;

    quizzes
        .into_iter()
        .map(|quiz| {
            let category = index
                .get(&quiz.category_id)
                .cloned()
                .ok_or_else(|| category_missing(&quiz.category_id))?;
            Ok(QuizView { quiz, category })
        })
        .collect()
}

async fn quiz_index(quizzes: &dyn QuizPeer, ids: impl IntoIterator<Item = i64>) -> AppResult<BTreeMap<i64, QuizView>> {
    fetch_indexed(
        ids,
        |ids| async move {
            quizzes
                .get_quizzes(&ids)
                .await
                .map_err(|e| AppError::from_remote(e, format!("Quiz lookup failed for ids: {:?}", ids)))
        },
        |q| q.quiz.quiz_id,
        quiz_missing,
    )
    .await
}

/// Embeds each question's quiz.
pub async fn enrich_questions(
    quizzes: &dyn QuizPeer,
    questions: Vec<Question>,
) -> AppResult<Vec<QuestionView>> {
    let index = quiz_index(quizzes, questions.iter().map(|q| q.quiz_id)).await?;

    questions
        .into_iter()
        .map(|question| {
            let quiz = index
                .get(&question.quiz_id)
                .cloned()
                .ok_or_else(|| quiz_missing(&question.quiz_id))?;
            Ok(QuestionView { question, quiz })
        })
        .collect()
}

/// Embeds each report's user and quiz. The two batch calls run concurrently;
/// the first failure aborts both.
pub async fn enrich_reports(
    users: &dyn RegistrationPeer,
    quizzes: &dyn QuizPeer,
    reports: Vec<Report>,
) -> AppResult<Vec<ReportView>> {
    let user_lookup = fetch_indexed(
        reports.iter().map(|r| r.user_email_id.clone()),
        |emails| async move {
            users
                .get_users(&emails)
                .await
                .map_err(|e| AppError::from_remote(e, format!("User lookup failed for: {}", emails.join(","))))
        },
        |u| u.email.clone(),
        user_missing,
    );
    let quiz_lookup = quiz_index(quizzes, reports.iter().map(|r| r.quiz_id));

    let (user_index, quiz_index) = futures::try_join!(user_lookup, quiz_lookup)?;

    reports
        .into_iter()
        .map(|report| {
            let user = user_index
                .get(&report.user_email_id)
                .cloned()
                .ok_or_else(|| user_missing(&report.user_email_id))?;
            let quiz = quiz_index
                .get(&report.quiz_id)
                .cloned()
                .ok_or_else(|| quiz_missing(&report.quiz_id))?;
            Ok(ReportView { report, user, quiz })
        })
        .collect()
}
