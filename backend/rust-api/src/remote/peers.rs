//! Typed views of the peer services.
//!
//! Domain services depend on these traits only; the `Http*` types are the
//! production implementations over a [`RemoteClient`].

use async_trait::async_trait;

use super::{RemoteClient, RemoteError};
use crate::models::{CascadeReport, Category, QuizView, SuccessResponse, UserProfile};

fn join_keys<T: ToString>(keys: &[T]) -> String {
    keys.iter().map(ToString::to_string).collect::<Vec<_>>().join(",")
}

#[async_trait]
pub trait CategoryPeer: Send + Sync {
    async fn get_category(&self, category_id: i64) -> Result<Category, RemoteError>;

    /// Categories for `ids`; absent ids are simply missing from the result.
    async fn get_categories(&self, ids: &[i64]) -> Result<Vec<Category>, RemoteError>;
}

#[async_trait]
pub trait QuizPeer: Send + Sync {
    async fn get_quiz(&self, quiz_id: i64) -> Result<QuizView, RemoteError>;

    async fn get_quizzes(&self, ids: &[i64]) -> Result<Vec<QuizView>, RemoteError>;

    async fn delete_quizzes_by_category(&self, category_id: i64) -> Result<CascadeReport, RemoteError>;
}

#[async_trait]
pub trait QuestionPeer: Send + Sync {
    /// Number of questions removed; zero is a success.
    async fn delete_questions_by_quiz(&self, quiz_id: i64) -> Result<u64, RemoteError>;
}

#[async_trait]
pub trait RegistrationPeer: Send + Sync {
    async fn get_user(&self, email: &str) -> Result<UserProfile, RemoteError>;

    async fn get_users(&self, emails: &[String]) -> Result<Vec<UserProfile>, RemoteError>;
}

#[async_trait]
pub trait AuthPeer: Send + Sync {
    async fn validate_token(&self, token: &str) -> Result<(), RemoteError>;
}

pub struct HttpCategoryPeer {
    client: RemoteClient,
}

impl HttpCategoryPeer {
    pub fn new(client: RemoteClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CategoryPeer for HttpCategoryPeer {
    async fn get_category(&self, category_id: i64) -> Result<Category, RemoteError> {
        self.client
            .get_json(&["categories", &category_id.to_string()])
            .await
    }

    async fn get_categories(&self, ids: &[i64]) -> Result<Vec<Category>, RemoteError> {
        self.client
            .get_json_with_query(&["categories", "batch"], &[("ids", join_keys(ids))])
            .await
    }
}

pub struct HttpQuizPeer {
    client: RemoteClient,
}

impl HttpQuizPeer {
    pub fn new(client: RemoteClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl QuizPeer for HttpQuizPeer {
    async fn get_quiz(&self, quiz_id: i64) -> Result<QuizView, RemoteError> {
        self.client.get_json(&["quizzes", &quiz_id.to_string()]).await
    }

    async fn get_quizzes(&self, ids: &[i64]) -> Result<Vec<QuizView>, RemoteError> {
        self.client
            .get_json_with_query(&["quizzes", "batch"], &[("ids", join_keys(ids))])
            .await
    }

    async fn delete_quizzes_by_category(&self, category_id: i64) -> Result<CascadeReport, RemoteError> {
        let response: SuccessResponse = self
            .client
            .delete_json(&["quizzes", "delete", "quiz", &category_id.to_string()])
            .await?;
        Ok(response
            .cascade
            .unwrap_or_else(|| CascadeReport::new(category_id)))
    }
}

pub struct HttpQuestionPeer {
    client: RemoteClient,
}

impl HttpQuestionPeer {
    pub fn new(client: RemoteClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl QuestionPeer for HttpQuestionPeer {
    async fn delete_questions_by_quiz(&self, quiz_id: i64) -> Result<u64, RemoteError> {
        let response: SuccessResponse = self
            .client
            .delete_json(&["api", "questions", "deletebyquiz", &quiz_id.to_string()])
            .await?;
        Ok(response.deleted.unwrap_or(0))
    }
}

pub struct HttpRegistrationPeer {
    client: RemoteClient,
}

impl HttpRegistrationPeer {
    pub fn new(client: RemoteClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RegistrationPeer for HttpRegistrationPeer {
    async fn get_user(&self, email: &str) -> Result<UserProfile, RemoteError> {
        self.client.get_json(&["users", "getUser", email]).await
    }

    async fn get_users(&self, emails: &[String]) -> Result<Vec<UserProfile>, RemoteError> {
        self.client
            .get_json_with_query(&["users", "batch"], &[("emails", join_keys(emails))])
            .await
    }
}

pub struct HttpAuthPeer {
    client: RemoteClient,
}

impl HttpAuthPeer {
    pub fn new(client: RemoteClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AuthPeer for HttpAuthPeer {
    async fn validate_token(&self, token: &str) -> Result<(), RemoteError> {
        self.client
            .get_text(&["auth", "validate"], &[("token", token.to_string())])
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::remote::StaticResolver;

    fn client(server: &MockServer, service: &str) -> RemoteClient {
        let resolver = StaticResolver::default()
            .with_peer(service, &server.uri())
            .unwrap();
        RemoteClient::new(reqwest::Client::new(), Arc::new(resolver), service)
    }

    #[test]
    fn batch_keys_are_comma_joined() {
        assert_eq!(join_keys(&[4010, 4011]), "4010,4011");
        assert_eq!(join_keys::<i64>(&[]), "");
    }

    #[tokio::test]
    async fn quiz_cascade_report_is_read_from_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/quizzes/delete/quiz/3010"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": 200,
                "message": "Quizzes deleted",
                "cascade": {
                    "parent": 3010,
                    "completed": [4010],
                    "failed": [{ "id": 4011, "error": "question-service is unavailable" }]
                }
            })))
            .mount(&server)
            .await;

        let peer = HttpQuizPeer::new(client(&server, "quiz-service"));
        let report = peer.delete_quizzes_by_category(3010).await.unwrap();

        assert_eq!(report.completed, vec![4010]);
        assert_eq!(report.failed[0].id, 4011);
    }

    #[tokio::test]
    async fn question_delete_count_defaults_to_zero() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/questions/deletebyquiz/4010"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "status": 200, "message": "Questions deleted" })),
            )
            .mount(&server)
            .await;

        let peer = HttpQuestionPeer::new(client(&server, "question-service"));
        assert_eq!(peer.delete_questions_by_quiz(4010).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn user_batch_sends_emails_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/batch"))
            .and(query_param("emails", "a@x.com,b@y.com"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let peer = HttpRegistrationPeer::new(client(&server, "registration-service"));
        let users = peer
            .get_users(&["a@x.com".to_string(), "b@y.com".to_string()])
            .await
            .unwrap();
        assert!(users.is_empty());
    }

    #[tokio::test]
    async fn user_lookup_escapes_the_email() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/getUser/ada%231@example.com"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "userId": 1010,
                "firstName": "Ada",
                "lastName": "Lovelace",
                "mobileNumber": "9876543210",
                "userRole": "user",
                "email": "ada#1@example.com"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let peer = HttpRegistrationPeer::new(client(&server, "registration-service"));
        let user = peer.get_user("ada#1@example.com").await.unwrap();
        assert_eq!(user.user_id, 1010);
        assert_eq!(user.email, "ada#1@example.com");
    }

    #[tokio::test]
    async fn rejected_token_is_an_unmapped_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/validate"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "status": 401,
                "message": "Invalid token"
            })))
            .mount(&server)
            .await;

        let peer = HttpAuthPeer::new(client(&server, "auth-service"));
        let err = peer.validate_token("garbage").await.unwrap_err();
        assert!(matches!(err, RemoteError::Unavailable { .. }));
    }
}
