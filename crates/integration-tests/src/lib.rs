//! Integration test support for the Atelier client.
//!
//! [`MockBackend`] serves the REST surface the client consumes from an
//! in-process axum router on `127.0.0.1:0`, mounted under `/api` so base
//! URL path handling is exercised too. Every endpoint counts its calls, and
//! failure switches let tests break individual endpoints.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p atelier-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use atelier_client::{ClientConfig, ClientState, MemoryTokenStore, TokenKind, TokenStore};
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header::AUTHORIZATION};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use secrecy::ExposeSecret;
use serde_json::{Value, json};
use tokio::task::JoinHandle;

/// Credentials the mock backend accepts.
pub const VALID_EMAIL: &str = "valid@x.com";
pub const VALID_PASSWORD: &str = "correctpw";

/// Backend detail that must never reach a user-facing message.
pub const RAW_DETAIL: &str = "SequelizeDatabaseError: relation \"users\" does not exist";

/// Per-endpoint request counters.
#[derive(Debug, Default)]
pub struct Calls {
    pub login: AtomicUsize,
    pub profile: AtomicUsize,
    pub refresh: AtomicUsize,
    pub logout: AtomicUsize,
    pub projects: AtomicUsize,
    pub blogs: AtomicUsize,
    pub views: AtomicUsize,
    /// Everything else, e.g. `/status/{code}`.
    pub other: AtomicUsize,
}

impl Calls {
    /// Every request the backend has seen.
    pub fn total(&self) -> usize {
        [
            &self.login,
            &self.profile,
            &self.refresh,
            &self.logout,
            &self.projects,
            &self.blogs,
            &self.views,
            &self.other,
        ]
        .iter()
        .map(|c| c.load(Ordering::SeqCst))
        .sum()
    }
}

#[derive(Debug, Default)]
struct Issued {
    access: String,
    refresh: String,
}

/// Shared state of the mock backend.
#[derive(Debug, Default)]
pub struct MockState {
    pub calls: Calls,
    pub fail_profile: AtomicBool,
    pub fail_refresh: AtomicBool,
    pub fail_logout: AtomicBool,
    refresh_delay_ms: AtomicU64,
    projects_response: Mutex<Option<(StatusCode, Value)>>,
    issued: Mutex<Issued>,
    last_log_query: Mutex<Option<HashMap<String, String>>>,
    uploaded_fields: Mutex<Vec<String>>,
}

impl MockState {
    /// Delay every refresh response, to race it against a logout.
    pub fn set_refresh_delay(&self, delay: Duration) {
        let millis = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self.refresh_delay_ms.store(millis, Ordering::SeqCst);
    }

    /// Answer `GET /projects` with `status` and `body` instead of the fixture.
    pub fn set_projects_response(&self, status: StatusCode, body: Value) {
        *lock(&self.projects_response) = Some((status, body));
    }

    /// Access token most recently issued by login or refresh.
    pub fn current_access_token(&self) -> String {
        lock(&self.issued).access.clone()
    }

    pub fn current_refresh_token(&self) -> String {
        lock(&self.issued).refresh.clone()
    }

    /// Query string of the last `/admin/logs` call.
    pub fn last_log_query(&self) -> Option<HashMap<String, String>> {
        lock(&self.last_log_query).clone()
    }

    /// Multipart field names of the last upload.
    pub fn uploaded_fields(&self) -> Vec<String> {
        lock(&self.uploaded_fields).clone()
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    fn issue_tokens(&self) -> (String, String) {
        let mut issued = lock(&self.issued);
        issued.access = format!("access-{}", uuid::Uuid::new_v4());
        issued.refresh = format!("refresh-{}", uuid::Uuid::new_v4());
        (issued.access.clone(), issued.refresh.clone())
    }

    fn is_authorized(&self, headers: &HeaderMap) -> bool {
        let expected = format!("Bearer {}", lock(&self.issued).access);
        headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == expected && expected != "Bearer ")
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A running mock backend. Stops when dropped.
pub struct MockBackend {
    pub state: Arc<MockState>,
    base_url: String,
    server: JoinHandle<()>,
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

impl MockBackend {
    /// Bind to an ephemeral port and start serving.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());
        let app = Router::new().nest("/api", routes()).with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock backend");
        let addr = listener.local_addr().expect("Failed to read local address");

        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            state,
            base_url: format!("http://{addr}/api"),
            server,
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// A client against this backend with in-memory tokens.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be built.
    #[must_use]
    pub fn client(&self, refresh_interval: Duration) -> TestClient {
        let url = self.base_url.parse().expect("Invalid mock URL");
        let mut config = ClientConfig::new(url);
        config.refresh_interval = refresh_interval;

        let tokens = Arc::new(MemoryTokenStore::new());
        let state = ClientState::with_token_store(config, Arc::clone(&tokens) as Arc<dyn TokenStore>)
            .expect("Failed to build client");
        TestClient { state, tokens }
    }
}

/// A client plus direct access to its token store.
pub struct TestClient {
    pub state: ClientState,
    pub tokens: Arc<MemoryTokenStore>,
}

impl TestClient {
    #[must_use]
    pub fn token(&self, kind: TokenKind) -> Option<String> {
        self.tokens.get(kind).map(|t| t.expose_secret().to_string())
    }

    /// Whether neither token is stored.
    #[must_use]
    pub fn tokens_cleared(&self) -> bool {
        self.token(TokenKind::Access).is_none() && self.token(TokenKind::Refresh).is_none()
    }
}

// ============================================================================
// Fixtures
// ============================================================================

#[must_use]
pub fn user_json() -> Value {
    json!({
        "_id": "u-1",
        "email": VALID_EMAIL,
        "name": "Valid User",
        "role": "super_admin",
        "createdAt": "2024-05-01T08:00:00Z"
    })
}

/// Five projects, two of them tagged Laravel (in different cases).
#[must_use]
pub fn projects_json() -> Value {
    json!([
        {"_id": "p1", "title": "Clinic booking", "description": "Appointments for a clinic",
         "category": "Web App", "tags": ["Laravel", "Vue"], "featured": true},
        {"_id": "p2", "title": "Company profile", "description": "Marketing site",
         "category": {"name": "Website"}, "tags": ["Next.js"]},
        {"_id": "p3", "title": "Inventory API", "description": "Stock tracking backend",
         "category": "Backend", "tags": [{"name": "laravel"}, "MySQL"]},
        {"_id": "p4", "title": "Mobile ordering", "description": "Food ordering app",
         "category": "Mobile", "tags": ["Flutter"]},
        {"_id": "p5", "title": "Design system", "description": "Component library",
         "category": "Website", "tags": ["Storybook"]}
    ])
}

#[must_use]
pub fn blogs_json() -> Value {
    json!([
        {"_id": "b1", "title": "Shipping a Laravel API", "slug": "shipping-laravel-api",
         "excerpt": "Notes from production", "content": "<p>word word word</p>",
         "category": {"name": "Engineering"}, "tags": ["Laravel"], "views": 10},
        {"_id": "b2", "title": "Design tokens", "slug": "design-tokens",
         "excerpt": "A shared vocabulary", "content": "<p>tokens</p>",
         "category": "Design", "tags": [], "views": 3}
    ])
}

// ============================================================================
// Routes
// ============================================================================

type Shared = State<Arc<MockState>>;

fn routes() -> Router<Arc<MockState>> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/profile", get(profile))
        .route("/auth/refresh", post(refresh))
        .route("/auth/logout", post(logout))
        .route("/projects", get(list_projects).post(create_project))
        .route("/projects/{id}", get(get_project).delete(delete_project))
        .route("/blogs", get(list_blogs))
        .route("/blogs/categories", get(list_categories))
        .route("/blogs/tags", get(list_tags))
        .route("/blogs/{id}", get(get_blog))
        .route("/blogs/{id}/view", post(record_view))
        .route("/admin/users", get(list_users))
        .route("/admin/logs", get(list_logs))
        .route("/upload/single", post(upload))
        .route("/upload/multiple", post(upload))
        .route("/status/{code}", get(status))
        .route("/raw/{kind}", get(raw))
}

fn envelope(data: Value) -> Response {
    Json(json!({ "success": true, "data": data })).into_response()
}

fn failure(status: StatusCode, error: &str) -> Response {
    (status, Json(json!({ "success": false, "error": error }))).into_response()
}

fn unauthorized() -> Response {
    failure(StatusCode::UNAUTHORIZED, "jwt malformed at verify (auth.js:12)")
}

async fn login(State(state): Shared, Json(body): Json<Value>) -> Response {
    state.calls.login.fetch_add(1, Ordering::SeqCst);
    if body["email"] != VALID_EMAIL || body["password"] != VALID_PASSWORD {
        return failure(StatusCode::UNAUTHORIZED, "Invalid credentials");
    }
    let (access, refresh) = state.issue_tokens();
    envelope(json!({
        "user": user_json(),
        "tokens": { "accessToken": access, "refreshToken": refresh }
    }))
}

async fn profile(State(state): Shared, headers: HeaderMap) -> Response {
    state.calls.profile.fetch_add(1, Ordering::SeqCst);
    if state.fail_profile.load(Ordering::SeqCst) || !state.is_authorized(&headers) {
        return unauthorized();
    }
    envelope(json!({ "user": user_json() }))
}

async fn refresh(State(state): Shared, Json(body): Json<Value>) -> Response {
    state.calls.refresh.fetch_add(1, Ordering::SeqCst);

    let delay = state.refresh_delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }

    let current = state.current_refresh_token();
    if state.fail_refresh.load(Ordering::SeqCst) || body["refreshToken"] != current.as_str() {
        return unauthorized();
    }
    let (access, refresh) = state.issue_tokens();
    envelope(json!({ "accessToken": access, "refreshToken": refresh }))
}

async fn logout(State(state): Shared) -> Response {
    state.calls.logout.fetch_add(1, Ordering::SeqCst);
    if state.fail_logout.load(Ordering::SeqCst) {
        return failure(StatusCode::INTERNAL_SERVER_ERROR, RAW_DETAIL);
    }
    Json(json!({ "success": true, "message": "Logged out" })).into_response()
}

async fn list_projects(State(state): Shared) -> Response {
    state.calls.projects.fetch_add(1, Ordering::SeqCst);
    if let Some((status, body)) = lock(&state.projects_response).clone() {
        return (status, Json(body)).into_response();
    }
    envelope(projects_json())
}

async fn get_project(State(state): Shared, Path(id): Path<String>) -> Response {
    state.calls.other.fetch_add(1, Ordering::SeqCst);
    let projects = projects_json();
    let found = projects
        .as_array()
        .and_then(|all| all.iter().find(|p| p["_id"] == id.as_str()))
        .cloned();
    match found {
        Some(project) => envelope(project),
        None => failure(StatusCode::NOT_FOUND, "Project not found"),
    }
}

async fn create_project(State(state): Shared, headers: HeaderMap, Json(mut body): Json<Value>) -> Response {
    state.calls.other.fetch_add(1, Ordering::SeqCst);
    if !state.is_authorized(&headers) {
        return unauthorized();
    }
    body["_id"] = json!(uuid::Uuid::new_v4().to_string());
    (StatusCode::CREATED, Json(json!({ "success": true, "data": body }))).into_response()
}

async fn delete_project(State(state): Shared, headers: HeaderMap) -> Response {
    state.calls.other.fetch_add(1, Ordering::SeqCst);
    if !state.is_authorized(&headers) {
        return unauthorized();
    }
    StatusCode::NO_CONTENT.into_response()
}

/// Bare array, no envelope.
async fn list_blogs(State(state): Shared) -> Response {
    state.calls.blogs.fetch_add(1, Ordering::SeqCst);
    Json(blogs_json()).into_response()
}

async fn get_blog(State(state): Shared, Path(id): Path<String>) -> Response {
    state.calls.other.fetch_add(1, Ordering::SeqCst);
    let blogs = blogs_json();
    let found = blogs
        .as_array()
        .and_then(|all| all.iter().find(|b| b["_id"] == id.as_str()))
        .cloned();
    match found {
        Some(post) => envelope(post),
        None => failure(StatusCode::NOT_FOUND, "Post not found"),
    }
}

async fn record_view(State(state): Shared, Path(_id): Path<String>) -> Response {
    state.calls.views.fetch_add(1, Ordering::SeqCst);
    Json(json!({ "success": true, "message": "View recorded" })).into_response()
}

/// Keyed list.
async fn list_categories(State(state): Shared) -> Response {
    state.calls.other.fetch_add(1, Ordering::SeqCst);
    envelope(json!({
        "categories": [
            {"_id": "c1", "name": "Engineering", "slug": "engineering"},
            {"_id": "c2", "name": "Design", "slug": "design"}
        ]
    }))
}

async fn list_tags(State(state): Shared) -> Response {
    state.calls.other.fetch_add(1, Ordering::SeqCst);
    envelope(json!([{"_id": "t1", "name": "Laravel", "slug": "laravel"}]))
}

async fn list_users(State(state): Shared, headers: HeaderMap) -> Response {
    state.calls.other.fetch_add(1, Ordering::SeqCst);
    if !state.is_authorized(&headers) {
        return failure(StatusCode::FORBIDDEN, RAW_DETAIL);
    }
    envelope(json!({ "users": [user_json()], "total": 1 }))
}

async fn list_logs(
    State(state): Shared,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    state.calls.other.fetch_add(1, Ordering::SeqCst);
    if !state.is_authorized(&headers) {
        return unauthorized();
    }
    *lock(&state.last_log_query) = Some(query);
    envelope(json!({
        "logs": [
            {"_id": "l1", "user": {"email": VALID_EMAIL}, "action": "login",
             "ipAddress": "10.0.0.1", "createdAt": "2024-05-02T09:30:00Z"}
        ],
        "total": 1
    }))
}

async fn upload(State(state): Shared, headers: HeaderMap, mut multipart: Multipart) -> Response {
    state.calls.other.fetch_add(1, Ordering::SeqCst);
    if !state.is_authorized(&headers) {
        return unauthorized();
    }

    let mut fields = Vec::new();
    let mut files = Vec::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let filename = field.file_name().unwrap_or("upload").to_string();
        let size = field.bytes().await.map_or(0, |b| b.len());
        files.push(json!({
            "url": format!("/uploads/{filename}"),
            "originalName": filename,
            "size": size,
        }));
        fields.push(name);
    }

    let single = fields.iter().all(|f| f == "file");
    *lock(&state.uploaded_fields) = fields;
    match (single, files.len()) {
        (true, 1) => envelope(files.remove(0)),
        _ => envelope(Value::Array(files)),
    }
}

/// Any status with a backend detail message.
async fn status(State(state): Shared, Path(code): Path<u16>) -> Response {
    state.calls.other.fetch_add(1, Ordering::SeqCst);
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::IM_A_TEAPOT);
    let mut response = failure(status, RAW_DETAIL);
    if status == StatusCode::TOO_MANY_REQUESTS {
        response
            .headers_mut()
            .insert("retry-after", axum::http::HeaderValue::from_static("30"));
    }
    response
}

/// Success responses with unusual bodies.
async fn raw(State(state): Shared, Path(kind): Path<String>) -> Response {
    state.calls.other.fetch_add(1, Ordering::SeqCst);
    match kind.as_str() {
        "empty" => StatusCode::OK.into_response(),
        "text" => (StatusCode::OK, "OK").into_response(),
        "rejected" => Json(json!({ "success": false, "error": "Slug already exists" })).into_response(),
        "bare" => Json(json!({ "_id": "p9", "title": "Bare project", "category": "Website" })).into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}
