#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use quizhub_api::{
    config::Config,
    create_router,
    middlewares::auth::JwtService,
    remote::StaticResolver,
    ServiceKind, Stores, Wiring,
};
use reqwest::{Method, StatusCode};
use serde_json::Value;
use tokio::net::TcpListener;

pub const TEST_SECRET: &str = "integration-test-secret";

/// All six services running on ephemeral ports, sharing one set of in-memory
/// stores so tests can seed records directly.
pub struct Cluster {
    pub addrs: HashMap<ServiceKind, SocketAddr>,
    pub stores: Stores,
    pub token: String,
    http: reqwest::Client,
}

pub async fn start_cluster() -> Cluster {
    start_cluster_with(&[]).await
}

/// Starts the cluster with some peers pointed somewhere else, such as a
/// wiremock server standing in for a failing service.
pub async fn start_cluster_with(overrides: &[(ServiceKind, String)]) -> Cluster {
    start_cluster_configured(overrides, |_| {}).await
}

/// Starts the cluster after letting `tweak` adjust every service's config.
pub async fn start_cluster_configured(
    overrides: &[(ServiceKind, String)],
    tweak: impl Fn(&mut Config),
) -> Cluster {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();

    let mut listeners = Vec::new();
    let mut addrs = HashMap::new();
    for kind in ServiceKind::ALL {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        addrs.insert(kind, listener.local_addr().unwrap());
        listeners.push((kind, listener));
    }

    let mut peers: HashMap<String, String> = addrs
        .iter()
        .map(|(kind, addr)| (kind.service_name().to_string(), format!("http://{}", addr)))
        .collect();
    for (kind, address) in overrides {
        peers.insert(kind.service_name().to_string(), address.clone());
    }
    let resolver = Arc::new(StaticResolver::new(&peers).unwrap());
    let stores = Stores::memory();

    for (kind, listener) in listeners {
        let mut config = Config::for_service(kind);
        config.jwt_secret = TEST_SECRET.to_string();
        config.peers = peers.clone();
        tweak(&mut config);

        let wiring = Wiring::new(config, resolver.clone(), stores.clone()).with_hash_cost(4);
        let app = create_router(&wiring).unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
    }

    let token = JwtService::new(TEST_SECRET, 30)
        .issue("tester@example.com", "user")
        .unwrap();

    Cluster {
        addrs,
        stores,
        token,
        http: reqwest::Client::new(),
    }
}

impl Cluster {
    pub fn url(&self, kind: ServiceKind, path: &str) -> String {
        format!("http://{}{}", self.addrs[&kind], path)
    }

    /// Authenticated call; the body is parsed as JSON when possible, else
    /// returned as a JSON string.
    pub async fn call(
        &self,
        method: Method,
        kind: ServiceKind,
        path: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = self
            .http
            .request(method, self.url(kind, path))
            .bearer_auth(&self.token);
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await.unwrap();
        let status = response.status();
        let text = response.text().await.unwrap();
        let value = serde_json::from_str(&text).unwrap_or(Value::String(text));
        (status, value)
    }

    pub async fn get(&self, kind: ServiceKind, path: &str) -> (StatusCode, Value) {
        self.call(Method::GET, kind, path, None).await
    }

    pub async fn post(&self, kind: ServiceKind, path: &str, body: Value) -> (StatusCode, Value) {
        self.call(Method::POST, kind, path, Some(body)).await
    }

    pub async fn put(&self, kind: ServiceKind, path: &str, body: Value) -> (StatusCode, Value) {
        self.call(Method::PUT, kind, path, Some(body)).await
    }

    pub async fn delete(&self, kind: ServiceKind, path: &str) -> (StatusCode, Value) {
        self.call(Method::DELETE, kind, path, None).await
    }

    pub async fn add_category(&self, name: &str) -> i64 {
        let (status, body) = self
            .post(
                ServiceKind::Category,
                "/categories",
                serde_json::json!({
                    "categoryName": name,
                    "description": format!("All about {}", name),
                    "enabled": true
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["id"].as_i64().unwrap()
    }

    pub async fn add_quiz(&self, category_id: i64, name: &str) -> i64 {
        let (status, body) = self
            .post(ServiceKind::Quiz, "/quizzes/save", quiz_body(category_id, name))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["id"].as_i64().unwrap()
    }

    pub async fn add_question(&self, quiz_id: i64, text: &str) -> i64 {
        let (status, body) = self
            .post(
                ServiceKind::Question,
                "/api/questions",
                question_body(quiz_id, text, ["alpha", "beta", "gamma", "delta"], "beta"),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["id"].as_i64().unwrap()
    }

    pub async fn register_user(&self, first_name: &str, email: &str) -> i64 {
        let (status, body) = self
            .post(
                ServiceKind::Registration,
                "/users/register",
                serde_json::json!({
                    "firstName": first_name,
                    "lastName": "Tester",
                    "mobileNumber": "9876543210",
                    "email": email,
                    "password": "secret-pass"
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["id"].as_i64().unwrap()
    }
}

pub fn quiz_body(category_id: i64, name: &str) -> Value {
    serde_json::json!({
        "categoryId": category_id,
        "quizName": name,
        "quizDescription": format!("{} basics", name),
        "timeInMinutes": 15,
        "enabled": true
    })
}

pub fn question_body(quiz_id: i64, text: &str, options: [&str; 4], correct: &str) -> Value {
    serde_json::json!({
        "quizId": quiz_id,
        "questionText": text,
        "options": {
            "optionOne": options[0],
            "optionTwo": options[1],
            "optionThree": options[2],
            "optionFour": options[3],
            "correctOption": correct
        }
    })
}

pub fn report_body(email: &str, quiz_id: i64) -> Value {
    serde_json::json!({
        "userEmailId": email,
        "quizId": quiz_id,
        "totalMarks": 10,
        "marksObtained": 7,
        "wrongAnswers": 3,
        "totalQuestions": 10,
        "attemptedQuestions": 10,
        "dateAndTime": "2024-05-01T10:00:00"
    })
}
