/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use staffboard_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = staffboard_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    middleware::{auth::jwt_auth_layer, security::SecurityHeadersLayer},
    routes,
};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{delete, get, patch, post, put},
    Router,
};
use sqlx::PgPool;
use staffboard_shared::cache::{View, ViewCache};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use uuid::Uuid;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Per-user cache of dashboard and assistant views
    pub views: Arc<ViewCache>,
}

impl AppState {
    pub fn new(db: PgPool, config: Config) -> Self {
        let views = ViewCache::new(config.cache.view_ttl());
        Self {
            db,
            config: Arc::new(config),
            views: Arc::new(views),
        }
    }

    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }

    /// Drops cached views of `user_id` after a mutation
    pub async fn invalidate(&self, user_id: Uuid, views: &[View]) {
        self.views.invalidate(user_id, views).await;
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// ```text
/// /
/// ├── GET /health
/// └── /v1/
///     ├── /auth/                      register, login, refresh (public)
///     ├── /diagnostics/               database, config (public)
///     ├── /dashboard                  GET
///     ├── /employees[/:id]            GET POST | GET PUT DELETE
///     ├── /projects[/:id]             GET POST | GET PUT DELETE
///     ├── /tasks[/:id]                GET POST | GET PATCH DELETE
///     │   ├── /:id/status             PUT
///     │   └── /:id/assignments[/:employee_id]   POST | DELETE
///     ├── /board                      GET
///     ├── /salary[/:id]               GET POST | PATCH DELETE
///     │   └── /export                 GET
///     └── /assistant/                 GET context, POST messages
/// ```
///
/// Everything under `/v1` except auth and diagnostics requires a bearer
/// access token.
pub fn build_router(state: AppState) -> Router {
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh));

    let diagnostics_routes = Router::new()
        .route("/database", get(routes::diagnostics::database))
        .route("/config", get(routes::diagnostics::config));

    let protected_routes = Router::new()
        .route("/dashboard", get(routes::dashboard::get_dashboard))
        .route(
            "/employees",
            get(routes::employees::list_employees).post(routes::employees::create_employee),
        )
        .route(
            "/employees/:id",
            get(routes::employees::get_employee)
                .put(routes::employees::update_employee)
                .delete(routes::employees::delete_employee),
        )
        .route(
            "/projects",
            get(routes::projects::list_projects).post(routes::projects::create_project),
        )
        .route(
            "/projects/:id",
            get(routes::projects::get_project)
                .put(routes::projects::update_project)
                .delete(routes::projects::delete_project),
        )
        .route(
            "/tasks",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route(
            "/tasks/:id",
            get(routes::tasks::get_task)
                .patch(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .route("/tasks/:id/status", put(routes::tasks::update_task_status))
        .route("/tasks/:id/assignments", post(routes::assignments::assign_task))
        .route(
            "/tasks/:id/assignments/:employee_id",
            delete(routes::assignments::remove_assignment),
        )
        .route("/board", get(routes::board::get_board))
        .route(
            "/salary",
            get(routes::salary::list_salary_records).post(routes::salary::save_salary_record),
        )
        .route("/salary/export", get(routes::salary::export_salary_records))
        .route(
            "/salary/:id",
            patch(routes::salary::update_salary_record)
                .delete(routes::salary::delete_salary_record),
        )
        .route("/assistant/context", get(routes::assistant::get_context))
        .route("/assistant/messages", post(routes::assistant::ask))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let v1_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/diagnostics", diagnostics_routes)
        .merge(protected_routes);

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CompressionLayer::new())
        .layer(cors_layer(&state.config))
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.allows_any_origin() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
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
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .expose_headers([header::CONTENT_DISPOSITION])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}
