/// Project endpoints
///
/// - `GET /v1/projects` - Projects with task counts, newest first
/// - `POST /v1/projects` - Create project
/// - `GET /v1/projects/:id` - Project with its tasks
/// - `PUT /v1/projects/:id` - Update name and description
/// - `DELETE /v1/projects/:id` - Delete project and its tasks

use crate::{
    app::AppState,
    error::{done, ok, validate, ActionError, ActionJson, ActionPath, ActionResult, OrFail},
};
use axum::extract::State;
use serde::{Deserialize, Serialize};
use staffboard_shared::{
    auth::middleware::AuthContext,
    cache::View,
    models::{
        project::{CreateProject, Project, ProjectSummary},
        task::{Task, TaskWithProject},
    },
};
use uuid::Uuid;
use validator::Validate;

const NOT_FOUND: &str = "Project not found";

#[derive(Debug, Deserialize, Validate)]
pub struct ProjectRequest {
    #[serde(default)]
    #[validate(custom(function = "crate::error::not_blank", message = "Project name is required"))]
    pub name: String,

    pub description: Option<String>,
}

impl ProjectRequest {
    pub fn into_project(self) -> Result<CreateProject, ActionError> {
        validate(&self)?;
        Ok(CreateProject {
            name: self.name.trim().to_string(),
            description: self.description,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub project: Project,
    pub tasks: Vec<TaskWithProject>,
}

pub async fn list_projects(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ActionResult<Vec<ProjectSummary>> {
    let projects = Project::list_with_task_counts(&state.db, auth.user_id)
        .await
        .or_fail("load projects")?;

    Ok(ok(projects))
}

pub async fn create_project(
    State(state): State<AppState>,
    auth: AuthContext,
    ActionJson(req): ActionJson<ProjectRequest>,
) -> ActionResult<Project> {
    let data = req.into_project()?;

    let project = Project::create(&state.db, auth.user_id, data)
        .await
        .or_fail("create project")?;

    state.invalidate(auth.user_id, &View::ALL).await;
    tracing::info!(user_id = %auth.user_id, project_id = %project.id, "Project created");

    Ok(ok(project))
}

pub async fn get_project(
    State(state): State<AppState>,
    auth: AuthContext,
    ActionPath(id): ActionPath<Uuid>,
) -> ActionResult<ProjectDetail> {
    let project = Project::find_owned(&state.db, id, auth.user_id)
        .await
        .or_fail("load project")?
        .ok_or_else(|| ActionError::NotFound(NOT_FOUND.to_string()))?;

    let tasks = Task::list_by_user(&state.db, auth.user_id, Some(project.id))
        .await
        .or_fail("load project")?;

    Ok(ok(ProjectDetail { project, tasks }))
}

pub async fn update_project(
    State(state): State<AppState>,
    auth: AuthContext,
    ActionPath(id): ActionPath<Uuid>,
    ActionJson(req): ActionJson<ProjectRequest>,
) -> ActionResult<Project> {
    let data = req.into_project()?;

    let project = Project::update_owned(&state.db, id, auth.user_id, data)
        .await
        .or_fail("update project")?
        .ok_or_else(|| ActionError::NotFound(NOT_FOUND.to_string()))?;

    state.invalidate(auth.user_id, &View::ALL).await;

    Ok(ok(project))
}

pub async fn delete_project(
    State(state): State<AppState>,
    auth: AuthContext,
    ActionPath(id): ActionPath<Uuid>,
) -> ActionResult<()> {
    if !Project::delete_owned(&state.db, id, auth.user_id)
        .await
        .or_fail("delete project")?
    {
        return Err(ActionError::NotFound(NOT_FOUND.to_string()));
    }

    state.invalidate(auth.user_id, &View::ALL).await;
    tracing::info!(user_id = %auth.user_id, project_id = %id, "Project deleted");

    Ok(done())
}
