//! Integration tests for the HTTP gateway, editor and wizard against a stub
//! backend.
//!
//! Each test spins up an Axum server on a random port that mimics the
//! onboarding backend's JSON contract and drives it through the real client.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::time::timeout;

use onboard_flow::config::{GatewayConfig, PageOrder};
use onboard_flow::editor::FlowEditor;
use onboard_flow::error::{GatewayError, WizardError};
use onboard_flow::fields::FieldRegistry;
use onboard_flow::gateway::{HttpGateway, RegisterRequest, SubmissionGateway};
use onboard_flow::wizard::{self, WizardStep};

/// Maximum time any test is allowed to run before we consider it hung.
const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// In-memory stand-in for the onboarding backend.
#[derive(Default)]
struct Backend {
    config: Mutex<Option<Value>>,
    users: Mutex<Vec<Value>>,
    delay: Duration,
}

type Shared = Arc<Backend>;
type Reply = Result<Json<Value>, (StatusCode, String)>;

impl Backend {
    async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

async fn save_config(State(backend): State<Shared>, Json(body): Json<Value>) -> Reply {
    backend.pause().await;
    if body.get("configuration").is_none() {
        return Err((StatusCode::BAD_REQUEST, "Missing configuration".into()));
    }
    *backend.config.lock().unwrap() = Some(body);
    Ok(Json(json!({ "message": "Configuration saved successfully" })))
}

async fn get_config(State(backend): State<Shared>) -> Reply {
    backend.pause().await;
    backend
        .config
        .lock()
        .unwrap()
        .clone()
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "No configuration found".into()))
}

async fn register(State(backend): State<Shared>, Json(body): Json<Value>) -> Reply {
    backend.pause().await;
    let mut users = backend.users.lock().unwrap();
    if users.iter().any(|u| u["email"] == body["email"]) {
        return Err((StatusCode::BAD_REQUEST, "Email already registered".into()));
    }
    let id = users.len() + 1;
    users.push(json!({
        "id": id,
        "email": body["email"],
        "password": body["password"],
        "birthdate": null,
        "address": null,
        "about": null
    }));
    Ok(Json(json!({
        "user_id": id,
        "email": body["email"],
        "birthdate": null,
        "address": null,
        "about": null
    })))
}

async fn update_profile(State(backend): State<Shared>, Json(body): Json<Value>) -> Reply {
    backend.pause().await;
    let mut users = backend.users.lock().unwrap();
    let user = users
        .iter_mut()
        .find(|u| u["email"] == body["email"] && u["password"] == body["password"])
        .ok_or((StatusCode::UNAUTHORIZED, "Invalid credentials".into()))?;
    for key in ["birthdate", "address", "about"] {
        if body[key].as_str().is_some_and(|v| !v.is_empty()) {
            user[key] = body[key].clone();
        }
    }
    Ok(Json(json!({ "message": "Login successful and profile updated" })))
}

async fn list_users(State(backend): State<Shared>) -> Json<Value> {
    backend.pause().await;
    let users: Vec<Value> = backend
        .users
        .lock()
        .unwrap()
        .iter()
        .map(|u| {
            let mut u = u.clone();
            u.as_object_mut().unwrap().remove("password");
            u
        })
        .collect();
    Json(Value::Array(users))
}

fn backend_routes(backend: Shared) -> Router {
    Router::new()
        .route("/save-config", post(save_config))
        .route("/get-config", get(get_config))
        .route("/register/", post(register))
        .route("/login/update-profile/", post(update_profile))
        .route("/data", get(list_users))
        .with_state(backend)
}

/// Start an Axum server on a random port, return its base URL.
async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Give the server a moment to start accepting connections.
    tokio::time::sleep(Duration::from_millis(50)).await;

    format!("http://127.0.0.1:{port}")
}

async fn start_backend(backend: Backend) -> (Arc<HttpGateway>, Shared) {
    let backend = Arc::new(backend);
    let base_url = serve(backend_routes(Arc::clone(&backend))).await;
    (client(&base_url, Duration::from_secs(2)), backend)
}

fn client(base_url: &str, request_timeout: Duration) -> Arc<HttpGateway> {
    Arc::new(
        HttpGateway::new(&GatewayConfig {
            base_url: base_url.to_string(),
            request_timeout,
        })
        .unwrap(),
    )
}

// ── Full flow ────────────────────────────────────────────────────────

#[tokio::test]
async fn seeded_flow_registers_and_updates_profile() {
    timeout(TEST_TIMEOUT, async {
        let (gateway, backend) = start_backend(Backend::default()).await;

        let editor = FlowEditor::new(gateway.clone());
        editor.save().await.unwrap();
        assert!(backend.config.lock().unwrap().is_some());

        let seq = wizard::start_session(gateway.clone(), FieldRegistry::standard(), PageOrder::Ordinal)
            .await
            .unwrap();
        assert_eq!(seq.total_pages(), 3);

        seq.set_field("email", "a@b.com").unwrap();
        seq.set_field("password", "x").unwrap();
        assert_eq!(seq.advance().await.unwrap(), WizardStep::Collecting(2));

        seq.set_field("birthdate", "2000-01-01").unwrap();
        assert_eq!(seq.advance().await.unwrap(), WizardStep::Collecting(3));

        seq.set_field("address", "42 Main St").unwrap();
        assert_eq!(seq.advance().await.unwrap(), WizardStep::Completed);

        let users = gateway.list_users().await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].email, "a@b.com");
        assert_eq!(users[0].id.to_string(), "1");
        assert_eq!(users[0].birthdate.as_deref(), Some("2000-01-01"));
        assert_eq!(users[0].address.as_deref(), Some("42 Main St"));
        assert_eq!(users[0].about, None);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn edge_ordered_session_follows_saved_transitions() {
    timeout(TEST_TIMEOUT, async {
        let (gateway, _backend) = start_backend(Backend::default()).await;

        let editor = FlowEditor::new(gateway.clone());
        editor.disconnect("page1->page2").unwrap();
        editor.disconnect("page2->page3").unwrap();
        editor.assign("page3", "email").unwrap();
        editor.unassign("page1", "email").unwrap_err();
        editor.connect("page3", "page1").unwrap();
        editor.connect("page1", "page2").unwrap();
        editor.save().await.unwrap();

        let seq = wizard::start_session(gateway, FieldRegistry::standard(), PageOrder::Edges)
            .await
            .unwrap();
        assert_eq!(
            seq.sequence().iter().collect::<Vec<_>>(),
            vec!["page3", "page1", "page2"]
        );
    })
    .await
    .expect("test timed out");
}

// ── Failures ─────────────────────────────────────────────────────────

#[tokio::test]
async fn rejected_registration_keeps_wizard_on_first_page() {
    timeout(TEST_TIMEOUT, async {
        let (gateway, _backend) = start_backend(Backend::default()).await;
        FlowEditor::new(gateway.clone()).save().await.unwrap();

        gateway
            .register(&RegisterRequest {
                email: "taken@b.com".into(),
                password: "pw".to_string().into(),
            })
            .await
            .unwrap();

        let seq = wizard::start_session(gateway, FieldRegistry::standard(), PageOrder::Ordinal)
            .await
            .unwrap();
        seq.set_field("email", "taken@b.com").unwrap();
        seq.set_field("password", "x").unwrap();

        let err = seq.advance().await.unwrap_err();
        match err {
            WizardError::Gateway(GatewayError::Http { status, body, .. }) => {
                assert_eq!(status, 400);
                assert_eq!(body, "Email already registered");
            }
            other => panic!("expected HTTP failure, got {other:?}"),
        }
        assert_eq!(seq.step(), WizardStep::Collecting(1));
        assert_eq!(seq.field("email").as_deref(), Some("taken@b.com"));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn missing_configuration_surfaces_http_status() {
    timeout(TEST_TIMEOUT, async {
        let (gateway, _backend) = start_backend(Backend::default()).await;

        let err = wizard::load_configuration(gateway.as_ref()).await.unwrap_err();
        assert!(matches!(
            err,
            WizardError::Gateway(GatewayError::Http { status: 404, .. })
        ));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn slow_backend_times_out() {
    timeout(TEST_TIMEOUT, async {
        let backend = Arc::new(Backend {
            delay: Duration::from_millis(500),
            ..Default::default()
        });
        let base_url = serve(backend_routes(backend)).await;
        let gateway = client(&base_url, Duration::from_millis(100));

        let err = gateway.list_users().await.unwrap_err();
        assert!(matches!(err, GatewayError::Timeout { .. }), "{err:?}");
        assert!(!err.is_network_failure());
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn concurrent_calls_of_one_kind_are_rejected() {
    timeout(TEST_TIMEOUT, async {
        let (gateway, _backend) = start_backend(Backend {
            delay: Duration::from_millis(200),
            ..Default::default()
        })
        .await;

        let (a, b) = tokio::join!(gateway.list_users(), gateway.list_users());
        assert!(a.is_ok());
        assert!(matches!(b, Err(GatewayError::Busy { .. })));

        // A different operation kind is not blocked.
        let (users, config) = tokio::join!(gateway.list_users(), gateway.fetch_config());
        assert!(users.is_ok());
        assert!(matches!(config, Err(GatewayError::Http { status: 404, .. })));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn non_json_body_is_an_invalid_response() {
    timeout(TEST_TIMEOUT, async {
        let app = Router::new().route("/data", get(|| async { "not json" }));
        let base_url = serve(app).await;
        let gateway = client(&base_url, Duration::from_secs(2));

        let err = gateway.list_users().await.unwrap_err();
        assert!(matches!(err, GatewayError::InvalidResponse { .. }), "{err:?}");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_failure() {
    timeout(TEST_TIMEOUT, async {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let gateway = client(&format!("http://127.0.0.1:{port}"), Duration::from_secs(2));
        let err = gateway.fetch_config().await.unwrap_err();
        assert!(matches!(err, GatewayError::Transport { .. }), "{err:?}");
        assert!(err.is_network_failure());
    })
    .await
    .expect("test timed out");
}
