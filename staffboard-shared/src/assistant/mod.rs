/// HR assistant
///
/// A keyword-driven responder over a pre-aggregated snapshot of the user's
/// data. There is no model and no conversation state: each question is
/// answered from the [`AssistantContext`] alone.
///
/// # Example
///
/// ```no_run
/// use staffboard_shared::assistant::{load_context, respond};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, user_id: Uuid) -> Result<(), sqlx::Error> {
/// let context = load_context(&pool, user_id).await?;
/// let reply = respond("How many employees do we have?", &context);
/// # Ok(())
/// # }
/// ```

mod responder;

pub use responder::{respond, GREETING};

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::employee::Employee;
use crate::models::project::Project;
use crate::models::salary_record::SalaryRecord;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatestSalary {
    pub month: i32,
    pub year: i32,
    pub bonus: f64,
    pub deduction: f64,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeContext {
    pub id: Uuid,
    pub name: String,
    pub employee_code: String,
    pub joining_date: NaiveDate,
    pub basic_salary: f64,
    pub latest_salary: Option<LatestSalary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectContext {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub task_count: i64,
    pub completed_tasks: i64,
    pub in_progress_tasks: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextSummary {
    pub total_employees: i64,
    pub total_projects: i64,
    pub total_tasks: i64,
    pub completed_tasks: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssistantContext {
    pub employees: Vec<EmployeeContext>,
    pub projects: Vec<ProjectContext>,
    pub summary: ContextSummary,
}

impl AssistantContext {
    /// Builds the context and derives the summary from its parts
    pub fn new(employees: Vec<EmployeeContext>, projects: Vec<ProjectContext>) -> Self {
        let summary = ContextSummary {
            total_employees: employees.len() as i64,
            total_projects: projects.len() as i64,
            total_tasks: projects.iter().map(|p| p.task_count).sum(),
            completed_tasks: projects.iter().map(|p| p.completed_tasks).sum(),
        };

        Self {
            employees,
            projects,
            summary,
        }
    }
}

/// Loads the assistant snapshot for `user_id`
pub async fn load_context(pool: &PgPool, user_id: Uuid) -> Result<AssistantContext, sqlx::Error> {
    let employees = Employee::list_by_user(pool, user_id).await?;
    let mut latest: HashMap<Uuid, SalaryRecord> = SalaryRecord::latest_per_employee(pool, user_id)
        .await?
        .into_iter()
        .map(|r| (r.employee_id, r))
        .collect();
    let projects = Project::list_with_task_counts(pool, user_id).await?;

    let employees = employees
        .into_iter()
        .map(|e| EmployeeContext {
            latest_salary: latest.remove(&e.id).map(|r| LatestSalary {
                total: r.total_paid(),
                month: r.month,
                year: r.year,
                bonus: r.bonus,
                deduction: r.deduction,
            }),
            id: e.id,
            name: e.name,
            employee_code: e.employee_code,
            joining_date: e.joining_date,
            basic_salary: e.basic_salary,
        })
        .collect();

    let projects = projects
        .into_iter()
        .map(|p| ProjectContext {
            id: p.id,
            name: p.name,
            description: p.description,
            task_count: p.task_count,
            completed_tasks: p.completed_tasks,
            in_progress_tasks: p.in_progress_tasks,
        })
        .collect();

    Ok(AssistantContext::new(employees, projects))
}
