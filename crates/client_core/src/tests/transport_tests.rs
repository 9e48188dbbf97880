use super::*;

use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{Arc, Mutex},
};

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode, Uri},
    response::IntoResponse,
    routing::post,
    Form, Router,
};
use shared::domain::Marks;
use tokio::net::TcpListener;

#[derive(Debug, Clone)]
struct Captured {
    path: String,
    csrf_header: Option<String>,
    fields: HashMap<String, String>,
}

#[derive(Clone)]
struct ServerState {
    captured: Arc<Mutex<Vec<Captured>>>,
    status: StatusCode,
    body: &'static str,
}

async fn record(
    State(state): State<ServerState>,
    uri: Uri,
    headers: HeaderMap,
    Form(fields): Form<HashMap<String, String>>,
) -> impl IntoResponse {
    state.captured.lock().expect("captured").push(Captured {
        path: uri.path().to_string(),
        csrf_header: headers
            .get("x-csrftoken")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        fields,
    });
    (
        state.status,
        [(header::CONTENT_TYPE, "application/json")],
        state.body,
    )
}

async fn spawn_server(
    status: StatusCode,
    body: &'static str,
) -> (SocketAddr, Arc<Mutex<Vec<Captured>>>) {
    let captured = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/student/add/", post(record))
        .route("/student/:id/update/", post(record))
        .route("/student/:id/delete/", post(record))
        .with_state(ServerState {
            captured: Arc::clone(&captured),
            status,
            body,
        });

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    (addr, captured)
}

fn api_for(addr: SocketAddr, token_transport: TokenTransport) -> HttpStudentApi {
    let settings = ControllerSettings {
        server_url: format!("http://{addr}/"),
        token_transport,
        ..ControllerSettings::default()
    };
    HttpStudentApi::new(&settings)
}

fn token() -> CsrfToken {
    CsrfToken::new("secret-token")
}

#[tokio::test]
async fn create_posts_form_fields_with_token_header() {
    let (addr, captured) = spawn_server(StatusCode::OK, r#"{"success": true}"#).await;
    let api = api_for(addr, TokenTransport::Header);
    let form = StudentForm {
        name: "Grace Hopper".into(),
        subject_name: "Computing".into(),
        marks: "88.5".into(),
    };

    let response = api.create_student(&form, &token()).await.expect("response");

    assert_eq!(response, ActionResponse::ok());
    let captured = captured.lock().expect("captured").clone();
    assert_eq!(captured.len(), 1);
    let request = &captured[0];
    assert_eq!(request.path, "/student/add/");
    assert_eq!(request.csrf_header.as_deref(), Some("secret-token"));
    assert_eq!(request.fields.get("name").map(String::as_str), Some("Grace Hopper"));
    assert_eq!(
        request.fields.get("subject_name").map(String::as_str),
        Some("Computing")
    );
    assert_eq!(request.fields.get("marks").map(String::as_str), Some("88.5"));
    assert!(!request.fields.contains_key("csrfmiddlewaretoken"));
}

#[tokio::test]
async fn form_field_convention_puts_token_in_body_for_update() {
    let (addr, captured) = spawn_server(StatusCode::OK, r#"{"success": true}"#).await;
    let api = api_for(addr, TokenTransport::FormField);
    let form = UpdateMarksForm {
        marks: Marks::new(55.5).expect("marks"),
    };

    api.update_marks(StudentId(12), form, &token())
        .await
        .expect("response");

    let captured = captured.lock().expect("captured").clone();
    let request = &captured[0];
    assert_eq!(request.path, "/student/12/update/");
    assert_eq!(request.csrf_header, None);
    assert_eq!(request.fields.get("marks").map(String::as_str), Some("55.5"));
    assert_eq!(
        request.fields.get("csrfmiddlewaretoken").map(String::as_str),
        Some("secret-token")
    );
}

#[tokio::test]
async fn delete_targets_per_record_endpoint() {
    let (addr, captured) = spawn_server(StatusCode::OK, r#"{"success": true}"#).await;
    let api = api_for(addr, TokenTransport::Header);

    api.delete_student(StudentId(4), &token())
        .await
        .expect("response");

    let captured = captured.lock().expect("captured").clone();
    assert_eq!(captured[0].path, "/student/4/delete/");
    assert_eq!(captured[0].csrf_header.as_deref(), Some("secret-token"));
    assert!(captured[0].fields.is_empty());
}

#[tokio::test]
async fn rejection_body_is_honoured_regardless_of_status() {
    let (addr, _) = spawn_server(
        StatusCode::BAD_REQUEST,
        r#"{"success": false, "errors": ["Marks should be between 0 and 100."]}"#,
    )
    .await;
    let api = api_for(addr, TokenTransport::Header);

    let response = api
        .delete_student(StudentId(1), &token())
        .await
        .expect("decoded");

    assert_eq!(
        response,
        ActionResponse::rejected(vec!["Marks should be between 0 and 100.".into()])
    );
}

#[tokio::test]
async fn non_json_body_is_a_transport_error() {
    let (addr, _) = spawn_server(StatusCode::INTERNAL_SERVER_ERROR, "<h1>Server Error</h1>").await;
    let api = api_for(addr, TokenTransport::Header);

    let err = api
        .delete_student(StudentId(1), &token())
        .await
        .expect_err("not json");

    assert!(matches!(err, TransportError::Decode { status: 500, .. }));
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    let api = api_for(addr, TokenTransport::Header);

    let err = api
        .delete_student(StudentId(1), &token())
        .await
        .expect_err("connection refused");

    assert!(matches!(err, TransportError::Request(_)));
}

#[test]
fn token_debug_output_is_redacted() {
    assert_eq!(format!("{:?}", token()), "CsrfToken(***)");
}
