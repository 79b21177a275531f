/// Employee endpoints
///
/// - `GET /v1/employees` - List employees by name
/// - `POST /v1/employees` - Create employee
/// - `GET /v1/employees/:id` - Employee with salary history
/// - `PUT /v1/employees/:id` - Replace employee fields
/// - `DELETE /v1/employees/:id` - Delete employee, salary records and assignments

use crate::{
    app::AppState,
    error::{done, ok, validate, ActionError, ActionJson, ActionPath, ActionResult, OrFail},
    routes::salary::RecordWithTotal,
};
use axum::extract::State;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use staffboard_shared::{
    auth::middleware::AuthContext,
    cache::View,
    models::{
        employee::{CreateEmployee, Employee, EMPLOYEE_CODE_CONSTRAINT},
        salary_record::SalaryRecord,
        unique_violation,
    },
};
use uuid::Uuid;
use validator::Validate;

const NOT_FOUND: &str = "Employee not found";
const DUPLICATE_CODE: &str = "Employee ID already exists";

/// Body of create and update
#[derive(Debug, Deserialize, Validate)]
pub struct EmployeeRequest {
    #[serde(default)]
    #[validate(custom(function = "crate::error::not_blank", message = "Name is required"))]
    pub name: String,

    #[serde(default)]
    #[validate(custom(function = "crate::error::not_blank", message = "Employee ID is required"))]
    pub employee_code: String,

    #[validate(required(message = "Joining date is required"))]
    pub joining_date: Option<NaiveDate>,

    #[validate(
        required(message = "Basic salary is required"),
        range(min = 0.0, message = "Salary must be positive")
    )]
    pub basic_salary: Option<f64>,
}

impl EmployeeRequest {
    /// Validates and trims the payload into model input
    pub fn into_employee(self) -> Result<CreateEmployee, ActionError> {
        validate(&self)?;

        match (self.joining_date, self.basic_salary) {
            (Some(joining_date), Some(basic_salary)) => Ok(CreateEmployee {
                employee_code: self.employee_code.trim().to_string(),
                name: self.name.trim().to_string(),
                joining_date,
                basic_salary,
            }),
            _ => Err(ActionError::Validation("Invalid employee".to_string())),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EmployeeDetail {
    #[serde(flatten)]
    pub employee: Employee,
    pub salary_records: Vec<RecordWithTotal>,
}

fn conflict_or_internal(err: sqlx::Error, action: &str) -> ActionError {
    match unique_violation(&err).as_deref() {
        Some(EMPLOYEE_CODE_CONSTRAINT) => ActionError::Conflict(DUPLICATE_CODE.to_string()),
        _ => ActionError::internal(action, err),
    }
}

pub async fn list_employees(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ActionResult<Vec<Employee>> {
    let employees = Employee::list_by_user(&state.db, auth.user_id)
        .await
        .or_fail("load employees")?;

    Ok(ok(employees))
}

pub async fn create_employee(
    State(state): State<AppState>,
    auth: AuthContext,
    ActionJson(req): ActionJson<EmployeeRequest>,
) -> ActionResult<Employee> {
    let data = req.into_employee()?;

    let employee = Employee::create(&state.db, auth.user_id, data)
        .await
        .map_err(|e| conflict_or_internal(e, "create employee"))?;

    state.invalidate(auth.user_id, &View::ALL).await;
    tracing::info!(user_id = %auth.user_id, employee_id = %employee.id, "Employee created");

    Ok(ok(employee))
}

/// Employee with salary records, latest period first
pub async fn get_employee(
    State(state): State<AppState>,
    auth: AuthContext,
    ActionPath(id): ActionPath<Uuid>,
) -> ActionResult<EmployeeDetail> {
    let employee = Employee::find_owned(&state.db, id, auth.user_id)
        .await
        .or_fail("load employee")?
        .ok_or_else(|| ActionError::NotFound(NOT_FOUND.to_string()))?;

    let salary_records = SalaryRecord::list_for_employee(&state.db, employee.id)
        .await
        .or_fail("load employee")?
        .into_iter()
        .map(RecordWithTotal::from)
        .collect();

    Ok(ok(EmployeeDetail {
        employee,
        salary_records,
    }))
}

pub async fn update_employee(
    State(state): State<AppState>,
    auth: AuthContext,
    ActionPath(id): ActionPath<Uuid>,
    ActionJson(req): ActionJson<EmployeeRequest>,
) -> ActionResult<Employee> {
    let data = req.into_employee()?;

    let employee = Employee::update_owned(&state.db, id, auth.user_id, data)
        .await
        .map_err(|e| conflict_or_internal(e, "update employee"))?
        .ok_or_else(|| ActionError::NotFound(NOT_FOUND.to_string()))?;

    state.invalidate(auth.user_id, &View::ALL).await;

    Ok(ok(employee))
}

pub async fn delete_employee(
    State(state): State<AppState>,
    auth: AuthContext,
    ActionPath(id): ActionPath<Uuid>,
) -> ActionResult<()> {
    let deleted = Employee::delete_owned(&state.db, id, auth.user_id)
        .await
        .or_fail("delete employee")?;
    if !deleted {
        return Err(ActionError::NotFound(NOT_FOUND.to_string()));
    }

    state.invalidate(auth.user_id, &View::ALL).await;
    tracing::info!(user_id = %auth.user_id, employee_id = %id, "Employee deleted");

    Ok(done())
}
