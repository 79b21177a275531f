/// Deployment diagnostics
///
/// - `GET /v1/diagnostics/database` - Runs a count and a sample query
/// - `GET /v1/diagnostics/config` - Reports the configured database backend

use crate::app::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use staffboard_shared::{
    db::pool::DatabaseKind,
    models::user::{User, UserSummary},
};

#[derive(Debug, Serialize)]
pub struct DatabaseReport {
    pub user_count: i64,
    pub sample_user: Option<UserSummary>,

    /// "Set" or "Not set"; the URL itself is never echoed
    pub database_url: &'static str,

    pub environment: String,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum DiagnosticResponse<T> {
    Success {
        status: &'static str,
        message: &'static str,
        data: T,
    },
    Failure {
        status: &'static str,
        message: &'static str,
        error: String,
    },
}

fn url_state(url: &str) -> &'static str {
    if url.is_empty() {
        "Not set"
    } else {
        "Set"
    }
}

/// Checks that the database answers queries
pub async fn database(State(state): State<AppState>) -> Response {
    let probe = async {
        let user_count = User::count(&state.db).await?;
        let sample_user = User::first_summary(&state.db).await?;
        Ok::<_, sqlx::Error>((user_count, sample_user))
    };

    match probe.await {
        Ok((user_count, sample_user)) => {
            tracing::debug!(user_count, "Database diagnostics succeeded");
            Json(DiagnosticResponse::Success {
                status: "success",
                message: "Database is working correctly",
                data: DatabaseReport {
                    user_count,
                    sample_user,
                    database_url: url_state(&state.config.database.url),
                    environment: state.config.api.environment.clone(),
                },
            })
            .into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Database diagnostics failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(DiagnosticResponse::<()>::Failure {
                    status: "error",
                    message: "Database connection failed",
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ConfigReport {
    pub status: &'static str,
    pub message: &'static str,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_type: Option<&'static str>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,

    pub next_steps: Vec<&'static str>,
}

/// Classifies a database URL for the config report
pub fn config_report(database_url: &str) -> (StatusCode, ConfigReport) {
    if database_url.is_empty() {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            ConfigReport {
                status: "error",
                message: "DATABASE_URL environment variable not set",
                database_type: None,
                error: None,
                next_steps: vec!["Set DATABASE_URL to a PostgreSQL connection string"],
            },
        );
    }

    match DatabaseKind::detect(database_url) {
        DatabaseKind::Sqlite => (
            StatusCode::INTERNAL_SERVER_ERROR,
            ConfigReport {
                status: "error",
                message: "SQLite database detected",
                database_type: Some(DatabaseKind::Sqlite.as_str()),
                error: Some("Only PostgreSQL is supported"),
                next_steps: vec!["Switch DATABASE_URL to a hosted PostgreSQL database"],
            },
        ),
        kind => (
            StatusCode::OK,
            ConfigReport {
                status: "info",
                message: "Database configuration detected",
                database_type: Some(kind.as_str()),
                error: None,
                next_steps: vec![
                    "Ensure your database is properly migrated",
                    "Run database migrations if needed",
                    "Register a first user account",
                ],
            },
        ),
    }
}

/// Reports which database backend the server is configured for
pub async fn config(State(state): State<AppState>) -> (StatusCode, Json<ConfigReport>) {
    let (status, report) = config_report(&state.config.database.url);
    tracing::info!(database_type = ?report.database_type, "Configuration diagnostics");
    (status, Json(report))
}
