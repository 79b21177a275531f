/// Task assignment endpoints
///
/// - `POST /v1/tasks/:id/assignments` - `{employee_id}`
/// - `DELETE /v1/tasks/:id/assignments/:employee_id`
///
/// Both the task and the employee must belong to the caller.

use crate::{
    app::AppState,
    error::{done, ok, ActionError, ActionJson, ActionPath, ActionResult, OrFail},
};
use axum::extract::State;
use serde::Deserialize;
use staffboard_shared::{
    auth::middleware::AuthContext,
    models::{
        assignment::{TaskAssignment, ASSIGNMENT_CONSTRAINT},
        employee::Employee,
        task::Task,
        unique_violation,
    },
};
use uuid::Uuid;

const ALREADY_ASSIGNED: &str = "Task is already assigned to this employee";

#[derive(Debug, Deserialize)]
pub struct AssignRequest {
    pub employee_id: Uuid,
}

async fn ensure_owned(
    state: &AppState,
    auth: &AuthContext,
    task_id: Uuid,
    employee_id: Uuid,
    action: &str,
) -> Result<(), ActionError> {
    Task::find_owned(&state.db, task_id, auth.user_id)
        .await
        .or_fail(action)?
        .ok_or_else(|| ActionError::NotFound("Task not found".to_string()))?;

    Employee::find_owned(&state.db, employee_id, auth.user_id)
        .await
        .or_fail(action)?
        .ok_or_else(|| ActionError::NotFound("Employee not found".to_string()))?;

    Ok(())
}

pub async fn assign_task(
    State(state): State<AppState>,
    auth: AuthContext,
    ActionPath(task_id): ActionPath<Uuid>,
    ActionJson(req): ActionJson<AssignRequest>,
) -> ActionResult<TaskAssignment> {
    ensure_owned(&state, &auth, task_id, req.employee_id, "assign task").await?;

    if TaskAssignment::exists(&state.db, task_id, req.employee_id)
        .await
        .or_fail("assign task")?
    {
        return Err(ActionError::Conflict(ALREADY_ASSIGNED.to_string()));
    }

    // A concurrent insert can still win the race; the key catches it.
    let assignment = TaskAssignment::assign(&state.db, task_id, req.employee_id)
        .await
        .map_err(|e| match unique_violation(&e).as_deref() {
            Some(ASSIGNMENT_CONSTRAINT) => ActionError::Conflict(ALREADY_ASSIGNED.to_string()),
            _ => ActionError::internal("assign task", e),
        })?;

    tracing::info!(%task_id, employee_id = %req.employee_id, "Task assigned");

    Ok(ok(assignment))
}

pub async fn remove_assignment(
    State(state): State<AppState>,
    auth: AuthContext,
    ActionPath((task_id, employee_id)): ActionPath<(Uuid, Uuid)>,
) -> ActionResult<()> {
    ensure_owned(&state, &auth, task_id, employee_id, "remove task assignment").await?;

    if !TaskAssignment::remove(&state.db, task_id, employee_id)
        .await
        .or_fail("remove task assignment")?
    {
        return Err(ActionError::NotFound("Assignment not found".to_string()));
    }

    Ok(done())
}
