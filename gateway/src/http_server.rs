use crate::api::{ApiError, ApiResponse};
use crate::auth::{bearer_token, AuthSession};
use crate::session::{
    spawn_sweeper, Clock, ClockRef, InMemorySessionStore, Session, SessionStoreRef,
};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use b1_core::{
    Branch, BranchView, DatabaseInfo, Environment, GatewayConfig, LoginPayload, Resource,
    ServiceLayerClient, ServiceLayerError, Warehouse, WarehouseView,
    DEFAULT_SESSION_TIMEOUT_MINUTES,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tracing::{error, info, warn};
use uuid::Uuid;

/// Application state shared with all routes
#[derive(Clone)]
pub struct AppState {
    pub(crate) config: Arc<GatewayConfig>,
    pub(crate) client: ServiceLayerClient,
    pub(crate) sessions: SessionStoreRef,
    pub(crate) clock: ClockRef,
}

impl AppState {
    pub fn new(
        config: GatewayConfig,
        client: ServiceLayerClient,
        sessions: SessionStoreRef,
        clock: ClockRef,
    ) -> Self {
        Self {
            config: Arc::new(config),
            client,
            sessions,
            clock,
        }
    }
}

/// Request model for `/api/login`
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    username: Option<String>,
    password: Option<String>,
    database: Option<String>,
    environment: Option<String>,
}

/// Response model for `/api/login`
#[derive(Debug, Serialize)]
pub struct LoginData {
    token: String,
    username: String,
    environment: String,
    timeout: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    session_id: String,
    username: String,
    environment: String,
    timeout: i64,
    time_remaining: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    total_partners: u64,
    active_items: u64,
    open_orders: u64,
    session_time_remaining: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigInfo {
    service_layer_url: String,
    default_user: Option<String>,
    supported_environments: [Environment; 2],
    session_timeout: i64,
    database_count: usize,
}

/// Build the router: the JSON API under `/api` and the web client everywhere else
pub fn router(state: AppState, static_dir: &Path) -> Router {
    // Set up CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/session", get(session_info))
        .route("/business-partners", get(business_partners))
        .route("/items", get(items))
        .route("/sales-orders", get(sales_orders))
        .route("/locations", get(locations))
        .route("/branches", get(branches))
        .route("/warehouses", get(warehouses))
        .route("/dashboard-stats", get(dashboard_stats))
        .route("/databases", get(databases))
        .route("/config", get(config_info))
        .fallback(api_not_found);

    // Unknown paths belong to the client-side router, so they get index.html
    let web_client = ServeDir::new(static_dir).fallback(ServeFile::new(static_dir.join("index.html")));

    Router::new()
        .nest("/api", api)
        .fallback_service(web_client)
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server
pub async fn run_server(config: GatewayConfig, addr: SocketAddr) -> anyhow::Result<()> {
    let client = ServiceLayerClient::new(&config)
        .map_err(|e| anyhow::anyhow!("Failed to create Service Layer client: {}", e))?;

    // One registry for the process lifetime
    let store = InMemorySessionStore::new();
    let clock = store.clock();
    let sessions: SessionStoreRef = Arc::new(store);

    let sweeper = spawn_sweeper(
        sessions.clone(),
        Duration::from_secs(config.server.sweep_interval_secs),
    );

    let static_dir = config.server.static_dir.clone();
    if !static_dir.join("index.html").exists() {
        warn!("No index.html in {}; the web client will not load", static_dir.display());
    }

    info!(
        service_layer = %client.base_url(),
        databases = config.databases.len(),
        "Starting HTTP server on {}",
        addr
    );

    let state = AppState::new(config, client, sessions, clock);
    let app = router(state, &static_dir);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind {}: {}", addr, e))?;

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("HTTP server failed: {}", e));

    if let Some(handle) = sweeper {
        handle.abort();
    }
    result
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Handler for `POST /api/login`
async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<ApiResponse<LoginData>, ApiError> {
    let Json(req) = payload.map_err(|e| {
        warn!(error = %e, "Malformed login request");
        ApiError::bad_request("Login failed")
    })?;

    let (username, password, database) = match (
        non_empty(req.username),
        non_empty(req.password),
        non_empty(req.database),
    ) {
        (Some(u), Some(p), Some(d)) => (u, p, d),
        _ => return Err(ApiError::bad_request("Missing required fields")),
    };

    let environment = non_empty(req.environment)
        .or_else(|| {
            state
                .config
                .find_database(&database)
                .map(|db| db.environment().to_string())
        })
        .unwrap_or_default();

    let payload = LoginPayload {
        user_name: username.clone(),
        password,
        company_db: database.clone(),
    };

    let upstream = match state.client.login(&payload).await {
        Ok(resp) => resp,
        Err(ServiceLayerError::HttpError { status_code, message }) => {
            info!(user = %username, company_db = %database, status_code, "Service Layer rejected login");
            return Err(ApiError::unauthorized(format!("Authentication failed: {}", message)));
        }
        Err(e) => {
            error!(error = %e, "Login error");
            return Err(ApiError::bad_request("Login failed"));
        }
    };

    let session = Session::new(
        Uuid::new_v4().to_string(),
        upstream.session_id.clone(),
        username,
        environment,
        upstream.version.clone().unwrap_or_default(),
        upstream.timeout_minutes(),
        state.clock.now(),
    );

    let data = LoginData {
        token: session.token.clone(),
        username: session.username.clone(),
        environment: session.environment.clone(),
        timeout: session.timeout_minutes,
    };

    info!(user = %session.username, company_db = %database, timeout = session.timeout_minutes, "Login succeeded");
    state.sessions.store(session).await;

    Ok(ApiResponse::ok(data))
}

/// Handler for `POST /api/logout`. Succeeds whether or not the session existed.
async fn logout(State(state): State<AppState>, headers: HeaderMap) -> ApiResponse<()> {
    if let Some(token) = bearer_token(&headers) {
        state.sessions.remove(token).await;
    }
    ApiResponse::empty()
}

async fn session_info(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
) -> ApiResponse<SessionInfo> {
    let time_remaining = session.minutes_remaining(state.clock.now());
    ApiResponse::ok(SessionInfo {
        session_id: session.token,
        username: session.username,
        environment: session.environment,
        timeout: session.timeout_minutes,
        time_remaining,
    })
}

/// Fetch a collection and hand it to the client unchanged
async fn passthrough(
    state: &AppState,
    session: &Session,
    resource: Resource,
) -> Result<ApiResponse<Vec<Value>>, ApiError> {
    state
        .client
        .get_collection::<Value>(&session.upstream_session_id, resource.query())
        .await
        .map(ApiResponse::ok)
        .map_err(|e| ApiError::upstream(resource.label(), e))
}

async fn business_partners(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
) -> Result<ApiResponse<Vec<Value>>, ApiError> {
    passthrough(&state, &session, Resource::BusinessPartners).await
}

async fn items(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
) -> Result<ApiResponse<Vec<Value>>, ApiError> {
    passthrough(&state, &session, Resource::Items).await
}

async fn sales_orders(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
) -> Result<ApiResponse<Vec<Value>>, ApiError> {
    passthrough(&state, &session, Resource::SalesOrders).await
}

async fn locations(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
) -> Result<ApiResponse<Vec<Value>>, ApiError> {
    passthrough(&state, &session, Resource::Locations).await
}

async fn branches(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
) -> Result<ApiResponse<Vec<BranchView>>, ApiError> {
    let resource = Resource::Branches;
    let branches = state
        .client
        .get_collection::<Branch>(&session.upstream_session_id, resource.query())
        .await
        .map_err(|e| ApiError::upstream(resource.label(), e))?;

    Ok(ApiResponse::ok(branches.into_iter().map(BranchView::from).collect()))
}

async fn warehouses(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
) -> Result<ApiResponse<Vec<WarehouseView>>, ApiError> {
    let resource = Resource::Warehouses;
    let warehouses = state
        .client
        .get_collection::<Warehouse>(&session.upstream_session_id, resource.query())
        .await
        .map_err(|e| ApiError::upstream(resource.label(), e))?;

    Ok(ApiResponse::ok(warehouses.into_iter().map(WarehouseView::from).collect()))
}

/// Minutes rendered as `H:MM`
fn format_remaining(minutes: i64) -> String {
    let minutes = minutes.max(0);
    format!("{}:{:02}", minutes / 60, minutes % 60)
}

async fn dashboard_stats(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
) -> ApiResponse<DashboardStats> {
    let sid = session.upstream_session_id.as_str();
    let (partners, items, orders) = tokio::join!(
        state.client.count(sid, Resource::BusinessPartners.entity()),
        state.client.count(sid, Resource::Items.entity()),
        state.client.count(sid, Resource::SalesOrders.entity()),
    );

    // A failed count shows as zero rather than failing the whole dashboard
    let or_zero = |entity: &str, result: Result<u64, ServiceLayerError>| {
        result.unwrap_or_else(|e| {
            warn!(entity, error = %e, "Count failed");
            0
        })
    };

    ApiResponse::ok(DashboardStats {
        total_partners: or_zero("BusinessPartners", partners),
        active_items: or_zero("Items", items),
        open_orders: or_zero("Orders", orders),
        session_time_remaining: format_remaining(session.minutes_remaining(state.clock.now())),
    })
}

async fn databases(State(state): State<AppState>) -> ApiResponse<Vec<DatabaseInfo>> {
    ApiResponse::ok(state.config.databases_list())
}

async fn config_info(State(state): State<AppState>) -> ApiResponse<ConfigInfo> {
    ApiResponse::ok(ConfigInfo {
        service_layer_url: state.config.service_layer_url.clone(),
        default_user: state.config.default_user.clone(),
        supported_environments: Environment::supported(),
        session_timeout: DEFAULT_SESSION_TIMEOUT_MINUTES,
        database_count: state.config.databases.len(),
    })
}

async fn api_not_found() -> ApiError {
    ApiError::not_found()
}
