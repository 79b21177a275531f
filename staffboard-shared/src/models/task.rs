/// Task model and database operations
///
/// Tasks live inside a project and are owned through it. Status is the kanban
/// column; any status may be set from any other (cards are dragged freely).
///
/// # Workflow
///
/// ```text
/// TODO -> IN_PROGRESS -> IN_REVIEW -> DONE
/// ```
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_priority AS ENUM ('LOW', 'MEDIUM', 'HIGH', 'URGENT');
/// CREATE TYPE task_status AS ENUM ('TODO', 'IN_PROGRESS', 'IN_REVIEW', 'DONE');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     title VARCHAR(255) NOT NULL,
///     description TEXT,
///     priority task_priority NOT NULL DEFAULT 'MEDIUM',
///     status task_status NOT NULL DEFAULT 'TODO',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use staffboard_shared::models::task::{CreateTask, Task, TaskPriority, TaskStatus};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, user_id: Uuid, project_id: Uuid) -> Result<(), sqlx::Error> {
/// let task = Task::create(&pool, CreateTask {
///     project_id,
///     title: "Design homepage".to_string(),
///     description: None,
///     priority: TaskPriority::High,
/// }).await?;
///
/// // Drag the card to the next column
/// Task::update_status(&pool, task.id, user_id, TaskStatus::InProgress).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Task priority
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "task_priority", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "LOW",
            TaskPriority::Medium => "MEDIUM",
            TaskPriority::High => "HIGH",
            TaskPriority::Urgent => "URGENT",
        }
    }

    /// Sort weight; higher is more urgent
    pub fn rank(&self) -> u8 {
        match self {
            TaskPriority::Low => 1,
            TaskPriority::Medium => 2,
            TaskPriority::High => 3,
            TaskPriority::Urgent => 4,
        }
    }
}

/// Task status, which is also the kanban column
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "task_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    InReview,
    Done,
}

impl TaskStatus {
    /// Columns in board order
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::Todo,
        TaskStatus::InProgress,
        TaskStatus::InReview,
        TaskStatus::Done,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "TODO",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::InReview => "IN_REVIEW",
            TaskStatus::Done => "DONE",
        }
    }

    /// Column heading shown on the board
    pub fn title(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "To Do",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::InReview => "In Review",
            TaskStatus::Done => "Done",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    pub id: Uuid,
    pub project_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Task joined with the name of its project
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TaskWithProject {
    pub id: Uuid,
    pub project_id: Uuid,
    pub project_name: String,
    pub title: String,
    pub description: Option<String>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a task; new tasks always start in `TODO`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    pub project_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub priority: TaskPriority,
}

/// Partial update; `None` leaves the field untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<TaskPriority>,
    pub status: Option<TaskStatus>,
}

impl UpdateTask {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.status.is_none()
    }
}

/// Task totals across all of a user's projects
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct TaskCounts {
    pub total: i64,
    pub completed: i64,
    pub in_progress: i64,
}

const TASK_COLUMNS: &str =
    "t.id, t.project_id, t.title, t.description, t.priority, t.status, t.created_at, t.updated_at";

impl Task {
    /// Creates a task in `TODO`
    ///
    /// The caller must already have checked that the project is owned by the
    /// requesting user.
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (project_id, title, description, priority, status)
            VALUES ($1, $2, $3, $4, 'TODO')
            RETURNING id, project_id, title, description, priority, status, created_at, updated_at
            "#,
        )
        .bind(data.project_id)
        .bind(data.title.trim())
        .bind(data.description.filter(|d| !d.trim().is_empty()))
        .bind(data.priority)
        .fetch_one(pool)
        .await
    }

    /// Finds a task only if its project belongs to `user_id`
    pub async fn find_owned(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            r#"
            SELECT {}
            FROM tasks t
            JOIN projects p ON p.id = t.project_id
            WHERE t.id = $1 AND p.user_id = $2
            "#,
            TASK_COLUMNS
        );

        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Lists the owner's tasks in creation order, optionally for one project
    pub async fn list_by_user(
        pool: &PgPool,
        user_id: Uuid,
        project_id: Option<Uuid>,
    ) -> Result<Vec<TaskWithProject>, sqlx::Error> {
        sqlx::query_as::<_, TaskWithProject>(
            r#"
            SELECT
                t.id, t.project_id, p.name AS project_name, t.title, t.description,
                t.priority, t.status, t.created_at, t.updated_at
            FROM tasks t
            JOIN projects p ON p.id = t.project_id
            WHERE p.user_id = $1
              AND ($2::uuid IS NULL OR t.project_id = $2)
            ORDER BY t.created_at ASC, t.id ASC
            "#,
        )
        .bind(user_id)
        .bind(project_id)
        .fetch_all(pool)
        .await
    }

    /// Moves an owned task to another column
    pub async fn update_status(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
        status: TaskStatus,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            r#"
            UPDATE tasks t
            SET status = $3, updated_at = NOW()
            FROM projects p
            WHERE t.id = $1 AND p.id = t.project_id AND p.user_id = $2
            RETURNING {}
            "#,
            TASK_COLUMNS
        );

        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(user_id)
            .bind(status)
            .fetch_optional(pool)
            .await
    }

    /// Applies a partial update to an owned task
    ///
    /// Omitted fields keep their value; a blank description clears it.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            r#"
            UPDATE tasks t
            SET title = COALESCE($3, t.title),
                description = CASE
                    WHEN $4::text IS NULL THEN t.description
                    ELSE NULLIF(BTRIM($4::text), '')
                END,
                priority = COALESCE($5, t.priority),
                status = COALESCE($6, t.status),
                updated_at = NOW()
            FROM projects p
            WHERE t.id = $1 AND p.id = t.project_id AND p.user_id = $2
            RETURNING {}
            "#,
            TASK_COLUMNS
        );

        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(user_id)
            .bind(data.title.map(|t| t.trim().to_string()))
            .bind(data.description)
            .bind(data.priority)
            .bind(data.status)
            .fetch_optional(pool)
            .await
    }

    /// Deletes an owned task and its assignments
    pub async fn delete_owned(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM tasks t
            USING projects p
            WHERE t.id = $1 AND p.id = t.project_id AND p.user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn counts_by_user(pool: &PgPool, user_id: Uuid) -> Result<TaskCounts, sqlx::Error> {
        sqlx::query_as::<_, TaskCounts>(
            r#"
            SELECT
                COUNT(t.id) AS total,
                COUNT(t.id) FILTER (WHERE t.status = 'DONE') AS completed,
                COUNT(t.id) FILTER (WHERE t.status = 'IN_PROGRESS') AS in_progress
            FROM tasks t
            JOIN projects p ON p.id = t.project_id
            WHERE p.user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(pool)
        .await
    }
}
