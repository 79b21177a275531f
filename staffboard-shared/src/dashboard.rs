/// Dashboard statistics

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::employee::Employee;
use crate::models::project::Project;
use crate::models::task::Task;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_employees: i64,
    pub total_projects: i64,
    pub total_tasks: i64,
    pub completed_tasks: i64,

    /// Rounded percentage of DONE tasks
    pub completion_rate: i64,
}

/// Rounded percentage of completed tasks; 0 when there are none
pub fn completion_rate(completed: i64, total: i64) -> i64 {
    if total <= 0 {
        return 0;
    }
    ((completed as f64 / total as f64) * 100.0).round() as i64
}

impl DashboardStats {
    pub fn new(total_employees: i64, total_projects: i64, total_tasks: i64, completed_tasks: i64) -> Self {
        Self {
            total_employees,
            total_projects,
            total_tasks,
            completed_tasks,
            completion_rate: completion_rate(completed_tasks, total_tasks),
        }
    }

    pub async fn load(pool: &PgPool, user_id: Uuid) -> Result<Self, sqlx::Error> {
        let employees = Employee::count_by_user(pool, user_id).await?;
        let projects = Project::count_by_user(pool, user_id).await?;
        let tasks = Task::counts_by_user(pool, user_id).await?;

        Ok(Self::new(employees, projects, tasks.total, tasks.completed))
    }
}
