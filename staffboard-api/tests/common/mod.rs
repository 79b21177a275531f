/// Common test utilities for integration tests
///
/// - Test database setup (skipped when `DATABASE_URL` is not set)
/// - Test account creation with a signed access token
/// - Request helpers returning status and JSON body

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use sqlx::PgPool;
use staffboard_api::app::{build_router, AppState};
use staffboard_api::config::{ApiConfig, CacheConfig, Config, DatabaseConfig, JwtConfig, LogFormat};
use staffboard_shared::auth::jwt::{create_token, Claims, TokenType};
use staffboard_shared::models::user::{CreateUser, User};
use tower::Service as _;
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "integration-test-secret-that-is-long-enough";

/// A registered account and its bearer token
pub struct TestUser {
    pub user: User,
    pub token: String,
}

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub config: Config,
    users: Vec<Uuid>,
}

impl TestContext {
    /// Connects to `DATABASE_URL` and builds the app; `None` when unset
    pub async fn try_new() -> Option<Self> {
        let url = match std::env::var("DATABASE_URL") {
            Ok(url) => url,
            Err(_) => {
                eprintln!("DATABASE_URL not set, skipping database test");
                return None;
            }
        };

        let config = Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors_origins: vec!["*".to_string()],
                environment: "test".to_string(),
                production: false,
            },
            database: DatabaseConfig {
                url,
                max_connections: 5,
            },
            jwt: JwtConfig {
                secret: TEST_JWT_SECRET.to_string(),
            },
            cache: CacheConfig { view_ttl_secs: 30 },
            log_format: LogFormat::Pretty,
        };

        let db = PgPool::connect(&config.database.url)
            .await
            .expect("Failed to connect to test database");

        // Path relative to Cargo.toml, not this file
        sqlx::migrate!("../migrations")
            .run(&db)
            .await
            .expect("Failed to run migrations");

        let app = build_router(AppState::new(db.clone(), config.clone()));

        Some(TestContext {
            db,
            app,
            config,
            users: Vec::new(),
        })
    }

    /// Creates an account directly in the database
    pub async fn create_user(&mut self, name: &str) -> TestUser {
        let user = User::create(
            &self.db,
            CreateUser {
                email: format!("test-{}@example.com", Uuid::new_v4()),
                password_hash: "test_hash".to_string(), // Never verified
                name: name.to_string(),
            },
        )
        .await
        .expect("Failed to create test user");

        let claims = Claims::new(user.id, TokenType::Access);
        let token = create_token(&claims, &self.config.jwt.secret).expect("Failed to sign token");

        self.users.push(user.id);
        TestUser { user, token }
    }

    /// Sends a request and returns the status and parsed JSON body
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let (status, bytes) = self.send_raw(method, uri, token, body).await;
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, json)
    }

    /// Sends a request and returns the status and raw body
    pub async fn send_raw(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Vec<u8>) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = self.app.clone().call(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes.to_vec())
    }

    /// Deletes every account created by this context (cascades to its data)
    pub async fn cleanup(&self) {
        for id in &self.users {
            User::delete(&self.db, *id).await.expect("Failed to delete test user");
        }
    }
}

/// Creates an employee through the API and returns its id
pub async fn create_employee(ctx: &TestContext, token: &str, code: &str, name: &str, salary: f64) -> Uuid {
    let (status, body) = ctx
        .send(
            "POST",
            "/v1/employees",
            Some(token),
            Some(serde_json::json!({
                "name": name,
                "employee_code": code,
                "joining_date": "2023-01-15",
                "basic_salary": salary
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "create employee failed: {}", body);
    body["data"]["id"].as_str().unwrap().parse().unwrap()
}

/// Creates a project through the API and returns its id
pub async fn create_project(ctx: &TestContext, token: &str, name: &str) -> Uuid {
    let (status, body) = ctx
        .send(
            "POST",
            "/v1/projects",
            Some(token),
            Some(serde_json::json!({ "name": name, "description": "Test project" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "create project failed: {}", body);
    body["data"]["id"].as_str().unwrap().parse().unwrap()
}

/// Creates a task through the API and returns its id
pub async fn create_task(ctx: &TestContext, token: &str, project_id: Uuid, title: &str, priority: &str) -> Uuid {
    let (status, body) = ctx
        .send(
            "POST",
            "/v1/tasks",
            Some(token),
            Some(serde_json::json!({
                "project_id": project_id,
                "title": title,
                "priority": priority
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "create task failed: {}", body);
    body["data"]["id"].as_str().unwrap().parse().unwrap()
}
