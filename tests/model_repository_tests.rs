//! Model Layer Integration Tests
//!
//! Typed repositories over the fixture: widget CRUD, the user session
//! (login/logout and token wiring), containers, and file upload/download.

mod common;

use remoting_client::{
    LoginCredentials, Model, Params, RemotingClient, RemotingError, ACCESS_TOKEN_KEY,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use common::spawn_fixture;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Widget {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(flatten)]
    attributes: Params,
}

impl Model for Widget {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: Option<String>) {
        self.id = id;
    }
}

async fn connected_client() -> RemotingClient {
    let base_url = spawn_fixture().await;
    RemotingClient::builder(&base_url).build().unwrap()
}

// ============================================================================
// Widget CRUD
// ============================================================================

#[tokio::test]
async fn test_save_without_id_creates() {
    let client = connected_client().await;
    let widgets = client.model_repository::<Widget>("widget", "widgets").unwrap();

    let widget = Widget {
        name: Some("fresh".to_string()),
        ..Widget::default()
    };
    let stored = widgets.save(&widget).await.unwrap();

    assert_eq!(stored.id(), Some("w-1"));
    assert_eq!(stored.name.as_deref(), Some("fresh"));
    assert!(stored.attributes.contains_key("createdAt"));
}

#[tokio::test]
async fn test_save_with_id_updates_in_place() {
    let client = connected_client().await;
    let widgets = client.model_repository::<Widget>("widget", "widgets").unwrap();

    let widget = Widget {
        id: Some("w-9".to_string()),
        name: Some("renamed".to_string()),
        ..Widget::default()
    };
    let stored = widgets.save(&widget).await.unwrap();

    // The fixture's PUT handler echoes the path id back, proving the save
    // routed to /widgets/:id rather than the create route.
    assert_eq!(stored.id(), Some("w-9"));
    assert_eq!(stored.name.as_deref(), Some("renamed"));
    assert!(stored.attributes.contains_key("updatedAt"));
}

#[tokio::test]
async fn test_find_by_id_and_find_all() {
    let client = connected_client().await;
    let widgets = client.model_repository::<Widget>("widget", "widgets").unwrap();

    let widget = widgets.find_by_id("w-42").await.unwrap();
    assert_eq!(widget.id(), Some("w-42"));
    assert_eq!(widget.name.as_deref(), Some("stored-widget"));

    let all = widgets.find_all().await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].id(), Some("w-1"));
    assert_eq!(all[1].name.as_deref(), Some("second"));
}

#[tokio::test]
async fn test_remove_clears_the_id() {
    let client = connected_client().await;
    let widgets = client.model_repository::<Widget>("widget", "widgets").unwrap();

    let mut widget = Widget {
        id: Some("w-1".to_string()),
        ..Widget::default()
    };
    widgets.remove(&mut widget).await.unwrap();
    assert!(widget.id().is_none());
}

#[tokio::test]
async fn test_remove_without_id_is_an_argument_error() {
    let client = connected_client().await;
    let widgets = client.model_repository::<Widget>("widget", "widgets").unwrap();

    let mut widget = Widget::default();
    let err = widgets.remove(&mut widget).await.unwrap_err();
    assert!(matches!(err, RemotingError::InvalidArgument(_)));
}

// ============================================================================
// User session
// ============================================================================

#[tokio::test]
async fn test_login_installs_and_persists_the_token() {
    let client = connected_client().await;
    let users = client.user_repository().unwrap();

    let token = users
        .login(&LoginCredentials::new("user@example.com", "opensesame"))
        .await
        .unwrap();

    assert_eq!(token.id, "token-123");
    assert_eq!(token.user_id.as_deref(), Some("u-1"));
    assert_eq!(token.ttl, Some(1209600));
    let included = token.user.expect("login?include=user returns the user");
    assert_eq!(included.email.as_deref(), Some("user@example.com"));

    assert_eq!(users.current_user_id().as_deref(), Some("u-1"));
    assert_eq!(
        client.adapter().access_token().as_deref(),
        Some("token-123")
    );
    assert_eq!(
        client.token_store().get(ACCESS_TOKEN_KEY).as_deref(),
        Some("token-123")
    );
}

#[tokio::test]
async fn test_login_failure_leaves_no_token_behind() {
    let client = connected_client().await;
    let users = client.user_repository().unwrap();

    let err = users
        .login(&LoginCredentials::new("user@example.com", "wrong"))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), Some(401));
    assert!(client.adapter().access_token().is_none());
    assert!(client.token_store().get(ACCESS_TOKEN_KEY).is_none());
}

#[tokio::test]
async fn test_logout_clears_adapter_and_store() {
    let client = connected_client().await;
    let users = client.user_repository().unwrap();

    users
        .login(&LoginCredentials::new("user@example.com", "opensesame"))
        .await
        .unwrap();
    users.logout().await.unwrap();

    assert!(client.adapter().access_token().is_none());
    assert!(client.token_store().get(ACCESS_TOKEN_KEY).is_none());
    assert!(users.current_user_id().is_none());
}

#[tokio::test]
async fn test_logout_without_token_fails_and_keeps_state() {
    let client = connected_client().await;
    let users = client.user_repository().unwrap();

    // The fixture rejects logout without an Authorization header.
    let err = users.logout().await.unwrap_err();
    assert_eq!(err.status_code(), Some(401));
}

// ============================================================================
// Containers
// ============================================================================

#[tokio::test]
async fn test_container_round_trip() {
    let client = connected_client().await;
    let containers = client.container_repository().unwrap();

    let created = containers.create("photos").await.unwrap();
    assert_eq!(created.name, "photos");

    let fetched = containers.get("photos").await.unwrap();
    assert_eq!(fetched.name, "photos");

    let all = containers.get_all().await.unwrap();
    let names: Vec<&str> = all.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["photos", "docs"]);

    containers.remove("docs").await.unwrap();
}

// ============================================================================
// Files
// ============================================================================

#[tokio::test]
async fn test_file_upload_download_round_trip() {
    let client = connected_client().await;
    let files = client.file_repository("photos").unwrap();

    let bytes = b"\x89PNG not really".to_vec();
    let meta = files
        .upload("cat.png", bytes.clone(), "image/png")
        .await
        .unwrap();
    assert_eq!(meta.name, "cat.png");
    assert_eq!(meta.container.as_deref(), Some("photos"));
    assert_eq!(meta.size, Some(bytes.len() as u64));

    let (downloaded, content_type) = files.download("cat.png").await.unwrap();
    assert_eq!(downloaded, bytes);
    assert_eq!(content_type, "image/png");

    let listed = files.get_all().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "cat.png");

    files.delete("cat.png").await.unwrap();
    let err = files.download("cat.png").await.unwrap_err();
    assert_eq!(err.status_code(), Some(404));
}

#[tokio::test]
async fn test_file_get_returns_metadata() {
    let client = connected_client().await;
    let files = client.file_repository("photos").unwrap();

    files
        .upload("note.txt", b"hello".to_vec(), "text/plain")
        .await
        .unwrap();
    let meta = files.get("note.txt").await.unwrap();
    assert_eq!(meta.name, "note.txt");
    assert_eq!(meta.size, Some(5));
}

// ============================================================================
// Shared contract
// ============================================================================

#[tokio::test]
async fn test_repositories_share_one_contract() {
    let client = connected_client().await;
    let _widgets = client
        .model_repository::<Widget>("widget", "widgets")
        .unwrap();
    let _users = client.user_repository().unwrap();

    let contract = client.adapter().contract();
    assert_eq!(contract.pattern_for_method("widget.findById"), Some("/widgets/:id"));
    assert_eq!(
        contract.pattern_for_method("user.login"),
        Some("/users/login?include=user")
    );
}

#[tokio::test]
async fn test_later_registration_overrides_shared_route() {
    let client = connected_client().await;
    let _widgets = client
        .model_repository::<Widget>("widget", "widgets")
        .unwrap();

    // A derived repository layering a custom route over the default one.
    client
        .adapter()
        .add_item(
            remoting_client::ContractItem::new("/Widgets/:id/greet", "GET"),
            "widget.findById",
        )
        .unwrap();

    let contract = client.adapter().contract();
    assert_eq!(
        contract.pattern_for_method("widget.findById"),
        Some("/Widgets/:id/greet")
    );
}
