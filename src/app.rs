use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde_json::json;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::auth::{PasswordHashing, SessionResolver, TokenIssuer};
use crate::config::AppConfig;
use crate::database::Store;
use crate::handlers::{protected, public};
use crate::services::{ListService, TaskService, UploadService, UserService};

/// Everything a handler can reach. Cheap to clone; built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn Store>,
    pub sessions: SessionResolver,
    pub users: UserService,
    pub lists: ListService,
    pub tasks: TaskService,
    pub uploads: UploadService,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn Store>) -> anyhow::Result<Self> {
        let security = &config.security;
        let tokens = TokenIssuer::new(&security.jwt_secret, security.token_ttl_days);
        let passwords = PasswordHashing::new(security.password_memory_kib, security.password_iterations)?;

        Ok(Self {
            sessions: SessionResolver::new(store.clone(), tokens.clone()),
            users: UserService::new(store.clone(), passwords, tokens, security.require_activation),
            lists: ListService::new(store.clone()),
            tasks: TaskService::new(store.clone()),
            uploads: UploadService::new(&config.uploads),
            store,
            config: Arc::new(config),
        })
    }
}

/// The full HTTP surface: `/api/v1`, `/health` and uploaded images.
pub fn app(state: AppState) -> Router {
    let images = ServeDir::new(state.uploads.directory());
    let image_prefix = state.config.uploads.public_prefix.trim_end_matches('/').to_string();
    let body_limit = state.config.uploads.max_bytes;
    let cors = cors_layer(&state.config);

    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api_routes())
        .nest_service(&image_prefix, images)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    use protected::{files, lists, tasks, user};

    Router::new()
        // Public
        .route("/register", post(public::register_post))
        .route("/login", post(public::login_post))
        .route("/logout", post(public::logout_post))
        // Protected
        .route("/user", get(user::user_get))
        .route("/lists", post(lists::list_post))
        .route("/lists/user/:user_id", get(lists::lists_by_user))
        .route(
            "/lists/:key",
            get(lists::list_get).put(lists::list_put).delete(lists::list_delete),
        )
        .route("/tasks", post(tasks::task_post))
        .route("/tasks/list/:list_id", get(tasks::tasks_by_list))
        .route(
            "/tasks/:key",
            get(tasks::task_get)
                .patch(tasks::task_patch)
                .put(tasks::task_put)
                .delete(tasks::task_delete),
        )
        .route("/files", post(files::file_post))
}

/// Cookies only travel cross-origin with credentials enabled, which in turn
/// rules out wildcard origins.
fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::ORIGIN, header::CONTENT_TYPE, header::AUTHORIZATION])
        .expose_headers([header::CONTENT_LENGTH])
        .allow_credentials(true)
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "error": "database unavailable"
                })),
            )
        }
    }
}
