use anyhow::Context;
use axum::{
    extract::{Query, State},
    http::{header, HeaderMap},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use calendario::{
    build_grid, CalendarCursor, GridRenderer, Highlights, MonthView, Navigator, ViewRecorder,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::services::ServeDir;
use tracing::{info, warn};

use crate::auth::{self, CredentialStore, LoginRequest};
use crate::config::Config;
use crate::error::AppError;
use crate::html::{self, RangeInputs};
use crate::store::{self, CommitmentStore, StoreError};
use crate::types::{self, Commitment};

/// Application state shared across requests
pub struct AppState {
    /// Serializes read-modify-write of user files
    pub store: Mutex<CommitmentStore>,
    pub credentials: CredentialStore,
}

/// Start the web server
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let store = CommitmentStore::open(&config.data_dir).with_context(|| {
        format!(
            "Failed to open data directory {}",
            config.data_dir.display()
        )
    })?;

    let credentials = CredentialStore::new(&config.credentials);
    if !credentials.path().exists() {
        warn!(path = %credentials.path().display(), "Credentials file not found, logins will fail");
    }
    if !config.static_dir.exists() {
        warn!(path = %config.static_dir.display(), "Static directory not found");
    }

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    info!(address = %addr, data = %store.data_dir().display(), "Server running");

    let state = Arc::new(AppState {
        store: Mutex::new(store),
        credentials,
    });
    let app = router(state, &config.static_dir);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

pub fn router(state: Arc<AppState>, static_dir: &Path) -> Router {
    Router::new()
        .route("/", get(calendar_handler))
        .route("/calendar", get(calendar_handler))
        .route("/api/month", get(month_handler))
        .route("/save", post(save_handler))
        .route("/load", get(load_handler))
        .route("/login", post(login_handler))
        .fallback_service(ServeDir::new(static_dir))
        .with_state(state)
}

/// Calendar page inputs: the cursor carried between requests plus at most
/// one navigation command
#[derive(Debug, Default, Deserialize)]
pub struct CalendarQuery {
    pub month: Option<u32>,
    pub year: Option<i32>,
    /// Months to move by
    pub nav: Option<i32>,
    /// Text from the year input
    pub year_input: Option<String>,
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub end: String,
}

impl CalendarQuery {
    /// Cursor the request starts from; today's month when absent or invalid
    fn cursor(&self) -> CalendarCursor {
        match (self.month, self.year) {
            (Some(month), Some(year)) => {
                CalendarCursor::new(month, year).unwrap_or_else(|_| CalendarCursor::today())
            }
            _ => CalendarCursor::today(),
        }
    }
}

/// Apply the command in `query` and make sure one frame gets rendered
fn drive<R: GridRenderer>(navigator: &mut Navigator<R>, query: &CalendarQuery) {
    if let Some(delta) = query.nav {
        navigator.navigate(delta);
    } else if let Some(text) = &query.year_input {
        if navigator.change_year(text).is_err() {
            // Show the unchanged month next to the rejection
            navigator.refresh();
        }
    } else {
        navigator.refresh();
    }
}

/// Run the navigator for a request and return the resulting view
fn month_view(query: &CalendarQuery) -> (MonthView, Option<String>) {
    let mut navigator = Navigator::new(query.cursor(), ViewRecorder::default())
        .with_range(query.start.as_str(), query.end.as_str());
    drive(&mut navigator, query);

    let cursor = navigator.cursor();
    let (view, rejection) = navigator.into_renderer().into_parts();
    let view = view.unwrap_or_else(|| {
        let grid = build_grid(cursor);
        MonthView::new(&grid, &Highlights::none(&grid))
    });
    (view, rejection)
}

/// Serve the calendar page
async fn calendar_handler(Query(query): Query<CalendarQuery>) -> Html<String> {
    let (view, rejection) = month_view(&query);
    let range = RangeInputs {
        start: &query.start,
        end: &query.end,
    };
    let markup = html::render_page(&view, rejection.as_deref(), range);
    Html(markup.into_string())
}

#[derive(Debug, Serialize)]
pub struct MonthResponse {
    pub view: MonthView,
    pub notice: Option<String>,
}

/// Return the month grid and highlights as JSON
async fn month_handler(Query(query): Query<CalendarQuery>) -> Json<MonthResponse> {
    let (view, notice) = month_view(&query);
    Json(MonthResponse { view, notice })
}

#[derive(Debug, Default, Deserialize)]
pub struct TokenQuery {
    pub token: Option<String>,
}

/// Token from the query string, falling back to the login cookie
fn resolve_token(query: &TokenQuery, headers: &HeaderMap) -> Result<String, StoreError> {
    let from_query = query.token.as_deref().filter(|t| !t.is_empty());
    let from_cookie = || {
        headers
            .get(header::COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(auth::token_from_cookie_header)
    };

    let token = from_query
        .or_else(from_cookie)
        .ok_or(StoreError::MissingToken)?;
    Ok(store::validate_token(token)?.to_string())
}

/// Append commitments to the user's list
async fn save_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TokenQuery>,
    headers: HeaderMap,
    body: String,
) -> Result<&'static str, AppError> {
    let token = resolve_token(&query, &headers)?;
    let payload: serde_json::Value = serde_json::from_str(&body).map_err(AppError::InvalidJson)?;
    let commitments = types::commitments_from_payload(payload)?;
    let added = commitments.len();

    let store = state.store.lock().await;
    let total = store.append(&token, commitments)?;

    info!(token = %token, added, total, "Data saved");
    Ok("Data saved")
}

/// Return the user's commitments
async fn load_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TokenQuery>,
    headers: HeaderMap,
) -> Result<Json<Vec<Commitment>>, AppError> {
    let token = resolve_token(&query, &headers)?;
    let store = state.store.lock().await;
    let entries = store.load(&token)?;
    Ok(Json(entries))
}

/// Check credentials and hand out the token cookie
async fn login_handler(
    State(state): State<Arc<AppState>>,
    body: String,
) -> Result<Response, AppError> {
    let login: LoginRequest = serde_json::from_str(&body).map_err(AppError::InvalidJson)?;

    if !state.credentials.verify(&login)? {
        warn!(username = %login.username, "Login rejected");
        return Err(AppError::Unauthorized);
    }

    let token = store::validate_token(&login.username)?;
    info!(username = %token, "Login accepted");

    let cookie = auth::session_cookie(token);
    Ok(([(header::SET_COOKIE, cookie)], token.to_string()).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;
    use tower::ServiceExt;

    struct TestApp {
        _dir: TempDir,
        router: Router,
    }

    fn test_app() -> TestApp {
        let dir = TempDir::new().unwrap();
        let creds = dir.path().join("creds.json");
        fs::write(
            &creds,
            r#"{"users":[{"username":"alice","password":"wonderland"}]}"#,
        )
        .unwrap();
        let static_dir = dir.path().join("static");
        fs::create_dir_all(&static_dir).unwrap();
        fs::write(static_dir.join("login.html"), "<h1>Login</h1>").unwrap();

        let state = Arc::new(AppState {
            store: Mutex::new(CommitmentStore::open(dir.path().join("data")).unwrap()),
            credentials: CredentialStore::new(creds),
        });
        let router = router(state, &static_dir);
        TestApp { _dir: dir, router }
    }

    async fn send(app: &TestApp, request: Request<Body>) -> (StatusCode, String, HeaderMap) {
        let response = app.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap(), headers)
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: String) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    fn commitment(task: &str, start: &str, end: &str) -> serde_json::Value {
        json!({
            "task": task,
            "start_date": start,
            "end_date": end,
            "start_time": "09:00",
            "end_time": "10:00",
            "importance": "medium"
        })
    }

    // ========== calendar page ==========

    #[tokio::test]
    async fn test_calendar_page_renders() {
        let app = test_app();
        let (status, body, _) = send(&app, get_req("/?month=2&year=2024")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("March / 2024"));
    }

    #[tokio::test]
    async fn test_calendar_defaults_to_current_month() {
        let app = test_app();
        let (status, body, _) = send(&app, get_req("/calendar")).await;
        assert_eq!(status, StatusCode::OK);
        let today = CalendarCursor::today();
        assert!(body.contains(&calendario::month_label(today.month(), today.year())));
    }

    #[tokio::test]
    async fn test_calendar_navigation_wraps_year() {
        let app = test_app();
        let (_, body, _) = send(&app, get_req("/?month=11&year=2024&nav=1")).await;
        assert!(body.contains("January / 2025"));

        let (_, body, _) = send(&app, get_req("/?month=0&year=2025&nav=-1")).await;
        assert!(body.contains("December / 2024"));
    }

    #[tokio::test]
    async fn test_calendar_rejects_bad_year() {
        let app = test_app();
        let (status, body, _) = send(&app, get_req("/?month=2&year=2024&year_input=1969")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("March / 2024"));
        assert!(body.contains(r#"class="notice""#));
    }

    #[tokio::test]
    async fn test_calendar_accepts_year_input() {
        let app = test_app();
        let (_, body, _) = send(&app, get_req("/?month=2&year=2024&year_input=2100")).await;
        assert!(body.contains("March / 2100"));
        assert!(!body.contains(r#"class="notice""#));
    }

    #[tokio::test]
    async fn test_calendar_highlights_range() {
        let app = test_app();
        let (_, body, _) = send(
            &app,
            get_req("/?month=2&year=2024&start=2024-03-01&end=2024-03-05"),
        )
        .await;
        assert!(body.contains(r#"class="day range-start" data-day="1""#));
        assert!(body.contains(r#"class="day range-end" data-day="5""#));
    }

    #[tokio::test]
    async fn test_month_api() {
        let app = test_app();
        let (status, body, _) = send(
            &app,
            get_req("/api/month?month=2&year=2024&start=2024-03-10&end=2024-03-10"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["view"]["label"], "March / 2024");
        assert!(json["notice"].is_null());
        // 5 leading cells, so March 10th is at index 14
        assert_eq!(json["view"]["cells"][14]["day"], 10);
        assert_eq!(json["view"]["cells"][14]["highlight"], "start");
    }

    #[tokio::test]
    async fn test_month_api_reports_rejection() {
        let app = test_app();
        let (_, body, _) = send(&app, get_req("/api/month?month=2&year=2024&year_input=abc")).await;
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["view"]["label"], "March / 2024");
        assert!(json["notice"].as_str().unwrap().starts_with("Invalid year"));
    }

    // ========== save / load ==========

    #[tokio::test]
    async fn test_save_then_load() {
        let app = test_app();
        let payload = json!([commitment("A", "2025-01-15", "2025-01-16")]);
        let request = post_json("/save?token=alice", payload.to_string());
        let (status, body, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "Data saved");

        let payload = json!([[commitment("B", "2025-02-01", "2025-02-01")]]);
        send(&app, post_json("/save?token=alice", payload.to_string())).await;

        let (status, body, _) = send(&app, get_req("/load?token=alice")).await;
        assert_eq!(status, StatusCode::OK);
        let entries: Vec<Commitment> = serde_json::from_str(&body).unwrap();
        let tasks: Vec<&str> = entries.iter().map(|c| c.task.as_str()).collect();
        assert_eq!(tasks, vec!["A", "B"]);
    }

    #[tokio::test]
    async fn test_load_new_user_is_empty() {
        let app = test_app();
        let (status, body, _) = send(&app, get_req("/load?token=newcomer")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "[]");
    }

    #[tokio::test]
    async fn test_save_uses_cookie_token() {
        let app = test_app();
        let request = Request::builder()
            .method("POST")
            .uri("/save")
            .header(header::COOKIE, "userToken=alice")
            .body(Body::from(commitment("A", "2025-01-15", "2025-01-15").to_string()))
            .unwrap();
        let (status, _, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);

        let (_, body, _) = send(&app, get_req("/load?token=alice")).await;
        assert!(body.contains("\"task\":\"A\""));
    }

    #[tokio::test]
    async fn test_save_missing_token() {
        let app = test_app();
        let body = commitment("A", "2025-01-15", "2025-01-15").to_string();
        let (status, text, _) = send(&app, post_json("/save", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(text, "Missing token");
    }

    #[tokio::test]
    async fn test_save_rejects_path_token() {
        let app = test_app();
        let body = commitment("A", "2025-01-15", "2025-01-15").to_string();
        let (status, _, _) = send(&app, post_json("/save?token=..%2Fescape", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_save_invalid_json() {
        let app = test_app();
        let request = post_json("/save?token=alice", "{oops".to_string());
        let (status, text, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(text, "Invalid JSON");
    }

    #[tokio::test]
    async fn test_save_rejects_inverted_range() {
        let app = test_app();
        let body = commitment("A", "2025-01-16", "2025-01-15").to_string();
        let (status, text, _) = send(&app, post_json("/save?token=alice", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(text.contains("before start date"));

        let (_, body, _) = send(&app, get_req("/load?token=alice")).await;
        assert_eq!(body, "[]");
    }

    // ========== login ==========

    #[tokio::test]
    async fn test_login_sets_cookie() {
        let app = test_app();
        let body = json!({"username": "alice", "password": "wonderland"}).to_string();
        let (status, text, headers) = send(&app, post_json("/login", body)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(text, "alice");
        let cookie = headers.get(header::SET_COOKIE).unwrap().to_str().unwrap();
        assert_eq!(cookie, auth::session_cookie("alice"));
    }

    #[tokio::test]
    async fn test_login_rejects_bad_password() {
        let app = test_app();
        let body = json!({"username": "alice", "password": "nope"}).to_string();
        let (status, text, headers) = send(&app, post_json("/login", body)).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(text, "Invalid credentials");
        assert!(headers.get(header::SET_COOKIE).is_none());
    }

    #[tokio::test]
    async fn test_login_rejects_malformed_body() {
        let app = test_app();
        let (status, _, _) = send(&app, post_json("/login", json!({"user": 1}).to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    // ========== static files ==========

    #[tokio::test]
    async fn test_static_fallback() {
        let app = test_app();
        let (status, body, _) = send(&app, get_req("/login.html")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "<h1>Login</h1>");

        let (status, _, _) = send(&app, get_req("/missing.html")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
