/// Task endpoints
///
/// - `GET /v1/tasks?project_id=` - Tasks in creation order
/// - `POST /v1/tasks` - Create task in `TODO`
/// - `GET /v1/tasks/:id` - Task with assignees
/// - `PATCH /v1/tasks/:id` - Partial update
/// - `PUT /v1/tasks/:id/status` - Move to another board column
/// - `DELETE /v1/tasks/:id` - Delete task and its assignments

use crate::{
    app::AppState,
    error::{
        done, ok, validate, ActionError, ActionJson, ActionPath, ActionQuery, ActionResult, OrFail,
    },
};
use axum::extract::State;
use serde::{Deserialize, Serialize};
use staffboard_shared::{
    auth::middleware::AuthContext,
    cache::View,
    models::{
        assignment::{Assignee, TaskAssignment},
        project::Project,
        task::{CreateTask, Task, TaskPriority, TaskStatus, TaskWithProject, UpdateTask},
    },
};
use uuid::Uuid;
use validator::Validate;

const NOT_FOUND: &str = "Task not found";

#[derive(Debug, Default, Deserialize)]
pub struct TaskListQuery {
    pub project_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    #[validate(required(message = "Project is required"))]
    pub project_id: Option<Uuid>,

    #[serde(default)]
    #[validate(custom(function = "crate::error::not_blank", message = "Task title is required"))]
    pub title: String,

    pub description: Option<String>,

    #[serde(default)]
    pub priority: TaskPriority,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    #[validate(custom(function = "crate::error::not_blank", message = "Task title is required"))]
    pub title: Option<String>,

    pub description: Option<String>,
    pub priority: Option<TaskPriority>,
    pub status: Option<TaskStatus>,
}

impl UpdateTaskRequest {
    pub fn into_update(self) -> Result<UpdateTask, ActionError> {
        validate(&self)?;

        let update = UpdateTask {
            title: self.title,
            description: self.description,
            priority: self.priority,
            status: self.status,
        };
        if update.is_empty() {
            return Err(ActionError::Validation("No fields to update".to_string()));
        }
        Ok(update)
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: TaskStatus,
}

#[derive(Debug, Serialize)]
pub struct TaskDetail {
    #[serde(flatten)]
    pub task: Task,
    pub assignees: Vec<Assignee>,
}

pub async fn list_tasks(
    State(state): State<AppState>,
    auth: AuthContext,
    ActionQuery(query): ActionQuery<TaskListQuery>,
) -> ActionResult<Vec<TaskWithProject>> {
    let tasks = Task::list_by_user(&state.db, auth.user_id, query.project_id)
        .await
        .or_fail("load tasks")?;

    Ok(ok(tasks))
}

/// Creates a task in a project owned by the caller
pub async fn create_task(
    State(state): State<AppState>,
    auth: AuthContext,
    ActionJson(req): ActionJson<CreateTaskRequest>,
) -> ActionResult<Task> {
    validate(&req)?;
    let project_id = req
        .project_id
        .ok_or_else(|| ActionError::Validation("Project is required".to_string()))?;

    let project = Project::find_owned(&state.db, project_id, auth.user_id)
        .await
        .or_fail("create task")?
        .ok_or_else(|| ActionError::NotFound("Project not found".to_string()))?;

    let task = Task::create(
        &state.db,
        CreateTask {
            project_id: project.id,
            title: req.title,
            description: req.description,
            priority: req.priority,
        },
    )
    .await
    .or_fail("create task")?;

    state.invalidate(auth.user_id, &View::ALL).await;
    tracing::info!(user_id = %auth.user_id, task_id = %task.id, "Task created");

    Ok(ok(task))
}

pub async fn get_task(
    State(state): State<AppState>,
    auth: AuthContext,
    ActionPath(id): ActionPath<Uuid>,
) -> ActionResult<TaskDetail> {
    let task = Task::find_owned(&state.db, id, auth.user_id)
        .await
        .or_fail("load task")?
        .ok_or_else(|| ActionError::NotFound(NOT_FOUND.to_string()))?;

    let assignees = TaskAssignment::assignees_for_tasks(&state.db, &[task.id])
        .await
        .or_fail("load task")?;

    Ok(ok(TaskDetail { task, assignees }))
}

pub async fn update_task(
    State(state): State<AppState>,
    auth: AuthContext,
    ActionPath(id): ActionPath<Uuid>,
    ActionJson(req): ActionJson<UpdateTaskRequest>,
) -> ActionResult<Task> {
    let update = req.into_update()?;

    let task = Task::update(&state.db, id, auth.user_id, update)
        .await
        .or_fail("update task")?
        .ok_or_else(|| ActionError::NotFound(NOT_FOUND.to_string()))?;

    state.invalidate(auth.user_id, &View::ALL).await;

    Ok(ok(task))
}

/// Moves a card; the updated task is returned so clients can reconcile
pub async fn update_task_status(
    State(state): State<AppState>,
    auth: AuthContext,
    ActionPath(id): ActionPath<Uuid>,
    ActionJson(req): ActionJson<StatusRequest>,
) -> ActionResult<Task> {
    let task = Task::update_status(&state.db, id, auth.user_id, req.status)
        .await
        .or_fail("update task status")?
        .ok_or_else(|| ActionError::NotFound(NOT_FOUND.to_string()))?;

    state.invalidate(auth.user_id, &View::ALL).await;
    tracing::debug!(task_id = %task.id, status = task.status.as_str(), "Task moved");

    Ok(ok(task))
}

pub async fn delete_task(
    State(state): State<AppState>,
    auth: AuthContext,
    ActionPath(id): ActionPath<Uuid>,
) -> ActionResult<()> {
    if !Task::delete_owned(&state.db, id, auth.user_id)
        .await
        .or_fail("delete task")?
    {
        return Err(ActionError::NotFound(NOT_FOUND.to_string()));
    }

    state.invalidate(auth.user_id, &View::ALL).await;

    Ok(done())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_defaults_priority() {
        let req: CreateTaskRequest = serde_json::from_value(serde_json::json!({
            "project_id": Uuid::nil(),
            "title": "Design homepage"
        }))
        .unwrap();
        assert_eq!(req.priority, TaskPriority::Medium);
        assert!(validate(&req).is_ok());
    }

    #[test]
    fn test_create_request_requires_project_and_title() {
        let req: CreateTaskRequest = serde_json::from_str(r#"{"title":"Design homepage"}"#).unwrap();
        assert_eq!(validate(&req).unwrap_err().message(), "Project is required");

        let req: CreateTaskRequest = serde_json::from_value(serde_json::json!({
            "project_id": Uuid::nil(),
            "title": ""
        }))
        .unwrap();
        assert_eq!(validate(&req).unwrap_err().message(), "Task title is required");
    }

    #[test]
    fn test_empty_update_rejected() {
        let err = UpdateTaskRequest::default().into_update().unwrap_err();
        assert_eq!(err.message(), "No fields to update");
    }

    #[test]
    fn test_partial_update_keeps_other_fields_unset() {
        let req: UpdateTaskRequest = serde_json::from_str(r#"{"priority":"URGENT"}"#).unwrap();
        let update = req.into_update().unwrap();
        assert_eq!(update.priority, Some(TaskPriority::Urgent));
        assert!(update.title.is_none());
        assert!(update.status.is_none());
    }

    #[test]
    fn test_blank_title_update_rejected() {
        let req: UpdateTaskRequest = serde_json::from_str(r#"{"title":" "}"#).unwrap();
        assert_eq!(req.into_update().unwrap_err().message(), "Task title is required");
    }
}
