//! Shared HTTP fixture for the integration suites.
//!
//! A small axum server bound to an ephemeral local port. Routes either
//! implement the behavior a real remoting backend would (login, widget
//! CRUD, container/file storage) or echo enough request detail (method,
//! path, decoded query, headers, body) for the tests to assert on.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Multipart, Path, RawQuery, State};
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::routing::{any, get, post};
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{json, Value};

#[derive(Default)]
struct FixtureState {
    files: Mutex<HashMap<String, (Vec<u8>, String)>>,
}

/// Starts the fixture server and returns its base url.
pub async fn spawn_fixture() -> String {
    let state = Arc::new(FixtureState::default());
    let app = Router::new()
        .route("/contract/customizedGetSecret", get(get_secret))
        .route("/Widgets/{name}/greet", get(greet))
        .route("/echo", any(echo))
        .route("/echo/{*rest}", any(echo))
        .route("/fail/teapot", get(teapot))
        .route("/users/login", post(login))
        .route("/users/logout", post(logout))
        .route("/widgets", get(list_widgets).post(create_widget))
        .route(
            "/widgets/{id}",
            get(get_widget).put(save_widget).delete(delete_widget),
        )
        .route("/containers", get(list_containers).post(create_container))
        .route(
            "/containers/{name}",
            get(get_container).delete(delete_container),
        )
        .route("/containers/{container}/files", get(list_files))
        .route(
            "/containers/{container}/files/{name}",
            get(get_file).delete(delete_file),
        )
        .route("/containers/{container}/upload", post(upload_file))
        .route("/containers/{container}/download/{name}", get(download_file))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind fixture port");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn decode_query(query: Option<&str>) -> HashMap<String, String> {
    query
        .map(|q| serde_urlencoded::from_str(q).expect("Fixture received undecodable query"))
        .unwrap_or_default()
}

// ============================================================================
// Echo and scenario routes
// ============================================================================

async fn get_secret() -> Json<Value> {
    Json(json!({ "data": "shhh!" }))
}

async fn greet(Path(name): Path<String>, RawQuery(query): RawQuery) -> Json<Value> {
    Json(json!({
        "greeting": format!("Hello, {}!", name),
        "query": decode_query(query.as_deref()),
    }))
}

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Json<Value> {
    let header_str = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    };
    Json(json!({
        "method": method.as_str(),
        "path": uri.path(),
        "query": decode_query(uri.query()),
        "content_type": header_str(header::CONTENT_TYPE),
        "authorization": header_str(header::AUTHORIZATION),
        "user_agent": header_str(header::USER_AGENT),
        "body": String::from_utf8_lossy(&body),
    }))
}

async fn teapot() -> impl IntoResponse {
    (StatusCode::IM_A_TEAPOT, "short and stout")
}

// ============================================================================
// Users
// ============================================================================

async fn login(RawQuery(query): RawQuery, Json(body): Json<Value>) -> impl IntoResponse {
    if body["password"] != json!("opensesame") {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "invalid credentials" })),
        );
    }
    let include_user =
        decode_query(query.as_deref()).get("include").map(String::as_str) == Some("user");
    let user = if include_user {
        json!({ "id": "u-1", "email": body["email"] })
    } else {
        Value::Null
    };
    (
        StatusCode::OK,
        Json(json!({
            "id": "token-123",
            "ttl": 1209600,
            "created": "2026-08-24T00:00:00Z",
            "userId": "u-1",
            "user": user,
        })),
    )
}

async fn logout(headers: HeaderMap) -> impl IntoResponse {
    if headers.get(header::AUTHORIZATION).is_none() {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "no token" })));
    }
    (StatusCode::OK, Json(json!({})))
}

// ============================================================================
// Widgets (model CRUD)
// ============================================================================

async fn create_widget(Json(mut body): Json<Value>) -> Json<Value> {
    body["id"] = json!("w-1");
    body["createdAt"] = json!("2026-08-24T10:00:00Z");
    Json(body)
}

async fn save_widget(Path(id): Path<String>, Json(mut body): Json<Value>) -> Json<Value> {
    body["id"] = json!(id);
    body["updatedAt"] = json!("2026-08-24T11:00:00Z");
    Json(body)
}

async fn get_widget(Path(id): Path<String>) -> Json<Value> {
    Json(json!({ "id": id, "name": "stored-widget" }))
}

async fn list_widgets() -> Json<Value> {
    Json(json!([
        { "id": "w-1", "name": "first" },
        { "id": "w-2", "name": "second" },
    ]))
}

async fn delete_widget(Path(_id): Path<String>) -> Json<Value> {
    Json(json!({ "count": 1 }))
}

// ============================================================================
// Containers and files
// ============================================================================

async fn list_containers() -> Json<Value> {
    Json(json!([{ "name": "photos" }, { "name": "docs" }]))
}

async fn create_container(Json(body): Json<Value>) -> Json<Value> {
    Json(body)
}

async fn get_container(Path(name): Path<String>) -> Json<Value> {
    Json(json!({ "name": name }))
}

async fn delete_container(Path(_name): Path<String>) -> Json<Value> {
    Json(json!({}))
}

async fn list_files(
    State(state): State<Arc<FixtureState>>,
    Path(container): Path<String>,
) -> Json<Value> {
    let files = state.files.lock();
    let metas: Vec<Value> = files
        .iter()
        .map(|(name, (bytes, _))| {
            json!({ "name": name, "container": container, "size": bytes.len() })
        })
        .collect();
    Json(Value::Array(metas))
}

async fn get_file(
    State(state): State<Arc<FixtureState>>,
    Path((container, name)): Path<(String, String)>,
) -> impl IntoResponse {
    match state.files.lock().get(&name) {
        Some((bytes, _)) => (
            StatusCode::OK,
            Json(json!({ "name": name, "container": container, "size": bytes.len() })),
        ),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "no such file" })),
        ),
    }
}

async fn upload_file(
    State(state): State<Arc<FixtureState>>,
    Path(container): Path<String>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    while let Some(field) = multipart.next_field().await.unwrap() {
        if field.file_name().is_none() {
            continue;
        }
        let name = field.file_name().unwrap().to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field.bytes().await.unwrap().to_vec();
        let size = bytes.len();
        state
            .files
            .lock()
            .insert(name.clone(), (bytes, content_type));
        return (
            StatusCode::OK,
            Json(json!({ "name": name, "container": container, "size": size })),
        );
    }
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": "no file part" })),
    )
}

async fn download_file(
    State(state): State<Arc<FixtureState>>,
    Path((_container, name)): Path<(String, String)>,
) -> impl IntoResponse {
    match state.files.lock().get(&name) {
        Some((bytes, content_type)) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, content_type.clone())],
            bytes.clone(),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "no such file").into_response(),
    }
}

async fn delete_file(
    State(state): State<Arc<FixtureState>>,
    Path((_container, name)): Path<(String, String)>,
) -> impl IntoResponse {
    match state.files.lock().remove(&name) {
        Some(_) => (StatusCode::OK, Json(json!({}))),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "no such file" })),
        ),
    }
}
