/// Task assignments
///
/// A task may be assigned to any number of the owner's employees, at most once
/// per employee. Ownership of both sides is checked by the caller before
/// [`TaskAssignment::assign`] is invoked.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE task_assignments (
///     task_id UUID NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
///     employee_id UUID NOT NULL REFERENCES employees(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT task_assignments_pkey PRIMARY KEY (task_id, employee_id)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Constraint raised when the same employee is assigned twice
pub const ASSIGNMENT_CONSTRAINT: &str = "task_assignments_pkey";

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TaskAssignment {
    pub task_id: Uuid,
    pub employee_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Employee assigned to a task, as shown on a card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Assignee {
    pub task_id: Uuid,
    pub employee_id: Uuid,
    pub employee_code: String,
    pub name: String,
}

impl TaskAssignment {
    /// Assigns an employee to a task
    ///
    /// # Errors
    ///
    /// Fails with a unique violation on [`ASSIGNMENT_CONSTRAINT`] if the pair
    /// already exists.
    pub async fn assign(pool: &PgPool, task_id: Uuid, employee_id: Uuid) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, TaskAssignment>(
            r#"
            INSERT INTO task_assignments (task_id, employee_id)
            VALUES ($1, $2)
            RETURNING task_id, employee_id, created_at
            "#,
        )
        .bind(task_id)
        .bind(employee_id)
        .fetch_one(pool)
        .await
    }

    pub async fn exists(pool: &PgPool, task_id: Uuid, employee_id: Uuid) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM task_assignments WHERE task_id = $1 AND employee_id = $2)",
        )
        .bind(task_id)
        .bind(employee_id)
        .fetch_one(pool)
        .await
    }

    /// Removes an assignment; returns false if there was none
    pub async fn remove(pool: &PgPool, task_id: Uuid, employee_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM task_assignments WHERE task_id = $1 AND employee_id = $2")
            .bind(task_id)
            .bind(employee_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Loads the assignees of the given tasks, ordered by employee name
    pub async fn assignees_for_tasks(pool: &PgPool, task_ids: &[Uuid]) -> Result<Vec<Assignee>, sqlx::Error> {
        if task_ids.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_as::<_, Assignee>(
            r#"
            SELECT a.task_id, e.id AS employee_id, e.employee_code, e.name
            FROM task_assignments a
            JOIN employees e ON e.id = a.employee_id
            WHERE a.task_id = ANY($1)
            ORDER BY e.name ASC
            "#,
        )
        .bind(task_ids)
        .fetch_all(pool)
        .await
    }
}
