//! End-to-end test: the dashboard server in front of a fake content API.
//!
//! Both run in-process on random ports. The fake API accepts
//! `Bearer good-token` everywhere, answers 401 to anything else, and fails
//! the payments collection with a 500 for `Bearer flaky-token`.

use std::net::SocketAddr;

use aegir_dashboard::config::{AppConfig, DEFAULT_STUDENT_ROLE_ID, DEFAULT_TEACHER_ROLE_ID};
use aegir_dashboard::gateway::Credential;
use aegir_dashboard::{routes, AppState};
use axum::extract::Path;
use axum::http::{HeaderMap, StatusCode as AxumStatus};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use tokio::net::TcpListener;

const GOOD_TOKEN: &str = "good-token";
const FLAKY_TOKEN: &str = "flaky-token";
const ADMIN_TOKEN: &str = "operator-secret";

fn collection_data(name: &str) -> Option<Value> {
    let data = match name {
        "users" => json!([
            {"id": "t1", "first_name": "Tina", "last_name": "Teach", "role": DEFAULT_TEACHER_ROLE_ID},
            {"id": "s1", "first_name": "Sam", "last_name": "Student", "role": DEFAULT_STUDENT_ROLE_ID},
            {"id": "s2", "first_name": "Sue", "last_name": "Singer", "role": {"id": DEFAULT_STUDENT_ROLE_ID, "name": "Student"}}
        ]),
        "instruments" => json!([
            {"id": 1, "name": "Piano"},
            {"id": 2, "name": "Violin"}
        ]),
        "packages" => json!([
            {"id": 1, "name": "Piano 10", "student": "s1", "instrument": 1, "duration": 45,
             "lessons_quota": 10, "status": "active", "start_datetime": "2024-01-01T00:00:00"},
            {"id": 2, "name": "Violin 5", "student": {"id": "s2"}, "instrument": "2", "duration": 30,
             "lessons_quota": 5, "status": "completed", "start_datetime": "2023-12-01T00:00:00"}
        ]),
        "lessons" => json!([
            {"id": 1, "package": 1, "teacher": "t1", "start_datetime": "2024-01-05T10:00:00", "status": "attended"},
            {"id": 2, "package": 2, "teacher": "t1", "start_datetime": "2024-01-20T15:30:00", "status": "cancelled"},
            {"id": 3, "package": 1, "teacher": "t1", "start_datetime": "2024-02-02T10:00:00", "status": "attended"}
        ]),
        "payments" => json!([
            {"id": 1, "payment_id": "PAY-1", "rate": "100.00", "currency": "USD", "payment_date": "2024-01-15T09:00:00Z", "package": 1},
            {"id": 2, "payment_id": "PAY-2", "rate": 50, "currency": "USD", "payment_date": "2024-01-20", "package": 2},
            {"id": 3, "payment_id": "PAY-3", "rate": 200, "currency": "USD", "payment_date": "2024-02-01", "package": 404},
            "not a record"
        ]),
        "student_teacher_relations" => json!([
            {"teacher": "t1", "student": "s1", "instrument": 1},
            {"teacher": "t1", "student": "s2", "instrument": 2}
        ]),
        "junction_students_instruments" => json!([
            {"instruments_id": 1},
            {"instruments_id": 2}
        ]),
        "junction_teachers_instruments" => json!([
            {"instruments_id": 1}
        ]),
        _ => return None,
    };
    Some(data)
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

fn serve_collection(name: &str, headers: &HeaderMap) -> Response {
    match bearer(headers) {
        Some(GOOD_TOKEN) => {}
        Some(FLAKY_TOKEN) if name != "payments" => {}
        Some(FLAKY_TOKEN) => return AxumStatus::INTERNAL_SERVER_ERROR.into_response(),
        _ => return AxumStatus::UNAUTHORIZED.into_response(),
    }
    match collection_data(name) {
        Some(data) => Json(json!({ "data": data })).into_response(),
        None => AxumStatus::NOT_FOUND.into_response(),
    }
}

async fn fake_items(Path(collection): Path<String>, headers: HeaderMap) -> Response {
    serve_collection(&collection, &headers)
}

async fn fake_users(headers: HeaderMap) -> Response {
    serve_collection("users", &headers)
}

async fn fake_login(Json(body): Json<Value>) -> Response {
    if body["email"] == "admin@example.com" && body["password"] == "secret" {
        Json(json!({"data": {"access_token": GOOD_TOKEN, "expires": 900000, "refresh_token": "r"}}))
            .into_response()
    } else {
        AxumStatus::UNAUTHORIZED.into_response()
    }
}

async fn spawn(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    format!("http://{addr}")
}

/// Start the fake content API and the dashboard, returning the dashboard base URL and state.
async fn start_server(credential: Option<Credential>) -> (String, AppState) {
    let fake = Router::new()
        .route("/server/ping", get(|| async { "pong" }))
        .route("/auth/login", post(fake_login))
        .route("/users", get(fake_users))
        .route("/items/{collection}", get(fake_items));
    let content_api = spawn(fake).await;

    let mut config = AppConfig::with_content_api(content_api);
    config.content_api_email = Some("admin@example.com".to_string());
    config.content_api_password = Some("secret".to_string());
    config.admin_token = Some(ADMIN_TOKEN.to_string());
    let state = AppState::new(config).unwrap();
    if let Some(credential) = credential {
        state.session.install(credential).await;
    }

    let base = spawn(routes::router(state.clone())).await;
    (base, state)
}

/// Extract `data` from the API envelope, panic with message on error.
fn extract_data(body: &Value) -> &Value {
    if let Some(err) = body.get("error").filter(|e| !e.is_null()) {
        panic!(
            "API error: {} - {}",
            err["code"].as_str().unwrap_or("?"),
            err["message"].as_str().unwrap_or("?"),
        );
    }
    body.get("data").expect("missing 'data' field")
}

async fn get_json(client: &Client, url: String) -> (StatusCode, Value) {
    let resp = client.get(url).send().await.unwrap();
    let status = resp.status();
    (status, resp.json().await.unwrap())
}

#[tokio::test]
async fn health_probes() {
    let (base, _state) = start_server(None).await;
    let client = Client::new();

    let resp = client.get(format!("{base}/health/live")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let (status, body) = get_json(&client, format!("{base}/health/ready")).await;
    assert_eq!(status, StatusCode::OK);
    let data = extract_data(&body);
    assert_eq!(data["content_api"], "connected");
    assert_eq!(data["session"]["authenticated"], false);
}

#[tokio::test]
async fn overview_and_instruments_views() {
    let (base, _state) = start_server(Some(Credential::static_token(GOOD_TOKEN))).await;
    let client = Client::new();

    let (status, body) = get_json(&client, format!("{base}/api/v1/views/overview")).await;
    assert_eq!(status, StatusCode::OK);
    let overview = extract_data(&body);
    assert_eq!(overview["teacher_count"], 1);
    assert_eq!(overview["student_count"], 2);
    assert_eq!(overview["instrument_count"], 2);
    assert_eq!(overview["total_packages"], 2);
    // the undecodable payment row is skipped
    assert_eq!(overview["total_revenue"], 350.0);

    let (_, body) = get_json(&client, format!("{base}/api/v1/views/instruments")).await;
    let instruments = extract_data(&body);
    assert_eq!(instruments["instruments"][0]["student_teacher_ratio"], 1.0);
    assert_eq!(instruments["instruments"][1]["student_teacher_ratio"], "N/A");
}

#[tokio::test]
async fn financial_view_expands_requested_months() {
    let (base, _state) = start_server(Some(Credential::static_token(GOOD_TOKEN))).await;
    let client = Client::new();

    let (status, body) = get_json(
        &client,
        format!("{base}/api/v1/views/financial?months=2024-01&months=2024-03"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let view = extract_data(&body);

    let trend: Vec<&str> = view["monthly_revenue"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["month"].as_str().unwrap())
        .collect();
    assert_eq!(trend, vec!["2024-01", "2024-02"]);
    assert_eq!(view["unattributed_revenue"], 200.0);

    let details = view["monthly_details"].as_array().unwrap();
    assert_eq!(details[0]["key"], "2024-02");
    assert_eq!(details[0]["expanded"], false);
    assert_eq!(details[1]["expanded"], true);
    assert_eq!(details[1]["total"], 150.0);
    let rows = details[1]["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["payment_id"], "PAY-2");
    assert_eq!(rows[0]["student"], "Sue Singer");
}

#[tokio::test]
async fn package_drill_down_levels_are_independent() {
    let (base, _state) = start_server(Some(Credential::static_token(GOOD_TOKEN))).await;
    let client = Client::new();

    let (_, body) = get_json(
        &client,
        format!("{base}/api/v1/views/packages?names=Piano%2010&package_students=Piano%2010%2Fs1&package_students=Violin%205%2Fs2"),
    )
    .await;
    let view = extract_data(&body);
    let groups = view["packages"].as_array().unwrap();

    let piano = &groups[0];
    assert_eq!(piano["key"], "Piano 10");
    assert_eq!(piano["rows"][0]["expanded"], true);
    assert_eq!(piano["rows"][0]["rows"][0]["recent_lessons"].as_array().unwrap().len(), 2);

    // the student key is set but its parent name is collapsed
    let violin = &groups[1];
    assert_eq!(violin["expanded"], false);
    assert!(violin["rows"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn teachers_and_students_views() {
    let (base, _state) = start_server(Some(Credential::static_token(GOOD_TOKEN))).await;
    let client = Client::new();

    let (_, body) = get_json(&client, format!("{base}/api/v1/views/teachers?teachers=t1")).await;
    let teachers = extract_data(&body);
    let tina = &teachers["teachers"][0];
    assert_eq!(tina["total_students"], 2);
    assert_eq!(tina["total_lessons"], 3);
    assert_eq!(tina["rows"].as_array().unwrap().len(), 2);

    let (_, body) = get_json(&client, format!("{base}/api/v1/views/students")).await;
    let students = extract_data(&body);
    assert_eq!(students["active_students"], 1);
    assert_eq!(students["packages_per_student"].as_array().unwrap().len(), 2);

    let (_, body) = get_json(&client, format!("{base}/api/v1/views/lessons")).await;
    let lessons = extract_data(&body);
    assert_eq!(lessons["total_lessons"], 3);
}

#[tokio::test]
async fn views_require_a_credential() {
    let (base, _state) = start_server(None).await;
    let client = Client::new();

    let (status, body) = get_json(&client, format!("{base}/api/v1/views/overview")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
    assert!(body["data"].is_null());
}

#[tokio::test]
async fn rejected_credential_is_invalidated_until_login() {
    let (base, state) = start_server(Some(Credential::static_token("expired-token"))).await;
    let client = Client::new();

    let (status, _) = get_json(&client, format!("{base}/api/v1/views/financial")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(state.session.current().await.is_none());

    let (_, body) = get_json(&client, format!("{base}/api/v1/auth/status")).await;
    assert_eq!(extract_data(&body)["authenticated"], false);

    // no silent retry: still unauthorized until an explicit login
    let (status, _) = get_json(&client, format!("{base}/api/v1/views/financial")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let resp = client
        .post(format!("{base}/api/v1/auth/login"))
        .bearer_auth(ADMIN_TOKEN)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    let login = extract_data(&body);
    assert_eq!(login["authenticated"], true);
    assert_eq!(login["source"], "login");

    let (status, _) = get_json(&client, format!("{base}/api/v1/views/financial")).await;
    assert_eq!(status, StatusCode::OK);

    let resp = client
        .post(format!("{base}/api/v1/auth/logout"))
        .bearer_auth(ADMIN_TOKEN)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(state.session.current().await.is_none());
}

#[tokio::test]
async fn session_changes_need_the_operator_token() {
    let (base, state) = start_server(Some(Credential::static_token(GOOD_TOKEN))).await;
    let client = Client::new();

    let resp = client.post(format!("{base}/api/v1/auth/logout")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(state.session.current().await.is_some());

    let resp = client
        .post(format!("{base}/api/v1/auth/login"))
        .json(&json!({"email": "admin@example.com", "password": "secret"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let (status, _) = get_json(&client, format!("{base}/api/v1/views/overview")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn bad_login_is_unauthorized() {
    let (base, state) = start_server(None).await;
    let client = Client::new();

    let resp = client
        .post(format!("{base}/api/v1/auth/login"))
        .bearer_auth(ADMIN_TOKEN)
        .json(&json!({"email": "admin@example.com", "password": "wrong"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(state.session.current().await.is_none());
}

#[tokio::test]
async fn upstream_failure_fails_the_whole_view() {
    let (base, state) = start_server(Some(Credential::static_token(FLAKY_TOKEN))).await;
    let client = Client::new();

    let (status, body) = get_json(&client, format!("{base}/api/v1/views/financial")).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["code"], "UPSTREAM_ERROR");
    assert_eq!(body["error"]["message"], "Failed to fetch data");
    assert!(body["data"].is_null());
    // a 500 is not an auth failure; the credential stays installed
    assert!(state.session.current().await.is_some());

    // views that do not read payments still work
    let (status, _) = get_json(&client, format!("{base}/api/v1/views/lessons")).await;
    assert_eq!(status, StatusCode::OK);
}
