use quizhub_api::ServiceKind;
use reqwest::StatusCode;
use serde_json::json;

mod common;

#[tokio::test]
async fn names_and_emails_are_unique() {
    let cluster = common::start_cluster().await;

    let rust = cluster.add_category("Rust").await;
    let (status, body) = cluster
        .post(
            ServiceKind::Category,
            "/categories",
            json!({"categoryName": "Rust", "description": "again", "enabled": true}),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["status"], 409);

    cluster.add_quiz(rust, "Ownership").await;
    let (status, _) = cluster
        .post(ServiceKind::Quiz, "/quizzes/save", common::quiz_body(rust, "Ownership"))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    cluster.register_user("Ada", "ada@example.com").await;
    let (status, _) = cluster
        .post(
            ServiceKind::Registration,
            "/users/register",
            json!({
                "firstName": "Other",
                "lastName": "Ada",
                "mobileNumber": "9876543210",
                "email": "ada@example.com",
                "password": "secret-pass"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn writes_referencing_missing_records_are_rejected() {
    let cluster = common::start_cluster().await;

    let (status, body) = cluster
        .post(ServiceKind::Quiz, "/quizzes/save", common::quiz_body(9999, "Orphan"))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Category not found with id: 9999");

    let (status, body) = cluster
        .post(
            ServiceKind::Question,
            "/api/questions",
            common::question_body(9999, "Lost?", ["a", "b", "c", "d"], "a"),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Quiz not found with id: 9999");

    let (status, body) = cluster
        .post(ServiceKind::Report, "/reports", common::report_body("ghost@example.com", 9999))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "User not found with email: ghost@example.com");

    let (_, quizzes) = cluster.get(ServiceKind::Quiz, "/quizzes").await;
    assert_eq!(quizzes, json!([]));
}

#[tokio::test]
async fn quiz_update_round_trip() {
    let cluster = common::start_cluster().await;

    let rust = cluster.add_category("Rust").await;
    let go = cluster.add_category("Go").await;
    let ownership = cluster.add_quiz(rust, "Ownership").await;
    cluster.add_quiz(rust, "Traits").await;

    let mut payload = common::quiz_body(go, "Ownership and borrowing");
    payload["timeInMinutes"] = json!(25);
    payload["enabled"] = json!(false);
    let (status, _) = cluster
        .put(ServiceKind::Quiz, &format!("/quizzes/{}", ownership), payload.clone())
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, view) = cluster
        .get(ServiceKind::Quiz, &format!("/quizzes/{}", ownership))
        .await;
    for field in ["categoryId", "quizName", "quizDescription", "timeInMinutes", "enabled"] {
        assert_eq!(view[field], payload[field], "{}", field);
    }
    assert_eq!(view["category"]["categoryName"], "Go");

    let category_payload = json!({"categoryName": "Golang", "description": "new", "enabled": false});
    let (status, _) = cluster
        .put(ServiceKind::Category, &format!("/categories/{}", go), category_payload.clone())
        .await;
    assert_eq!(status, StatusCode::OK);
    let (_, category) = cluster
        .get(ServiceKind::Category, &format!("/categories/{}", go))
        .await;
    for field in ["categoryName", "description", "enabled"] {
        assert_eq!(category[field], category_payload[field], "{}", field);
    }

    let (status, _) = cluster
        .put(
            ServiceKind::Quiz,
            &format!("/quizzes/{}", ownership),
            common::quiz_body(go, "Traits"),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = cluster
        .put(
            ServiceKind::Quiz,
            &format!("/quizzes/{}", ownership),
            common::quiz_body(9999, "Ownership and borrowing"),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, view) = cluster
        .get(ServiceKind::Quiz, &format!("/quizzes/{}", ownership))
        .await;
    assert_eq!(view["categoryId"], go);
}

#[tokio::test]
async fn question_options_must_be_distinct_and_contain_the_answer() {
    let cluster = common::start_cluster().await;
    let rust = cluster.add_category("Rust").await;
    let ownership = cluster.add_quiz(rust, "Ownership").await;

    let (status, body) = cluster
        .post(
            ServiceKind::Question,
            "/api/questions",
            common::question_body(ownership, "Pick one", ["a", "b", "a", "d"], "a"),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);

    let (status, body) = cluster
        .post(
            ServiceKind::Question,
            "/api/questions",
            common::question_body(ownership, "Pick one", ["a", "b", "c", "d"], "e"),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.get("correctOption").is_some(), "{}", body);
}

#[tokio::test]
async fn invalid_bodies_get_the_validation_envelope() {
    let cluster = common::start_cluster().await;

    let (status, body) = cluster
        .post(
            ServiceKind::Category,
            "/categories",
            json!({"categoryName": "  ", "description": "blank name"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
    assert_eq!(body["categoryName"], "Category name should not be empty");

    let (status, body) = cluster
        .post(
            ServiceKind::Registration,
            "/users/register",
            json!({
                "firstName": "Ada",
                "lastName": "Lovelace",
                "mobileNumber": "12345",
                "email": "not-an-email",
                "password": "secret-pass"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.get("mobileNumber").is_some(), "{}", body);
    assert!(body.get("email").is_some(), "{}", body);
}

#[tokio::test]
async fn enable_and_disable_keep_the_record() {
    let cluster = common::start_cluster().await;
    let rust = cluster.add_category("Rust").await;

    let (status, _) = cluster
        .put(ServiceKind::Category, &format!("/categories/disable/{}", rust), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, category) = cluster
        .get(ServiceKind::Category, &format!("/categories/{}", rust))
        .await;
    assert_eq!(category["enabled"], false);

    let (status, _) = cluster
        .put(ServiceKind::Category, "/categories/enable/9999", json!({}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
