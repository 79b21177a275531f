/// Salary endpoints
///
/// - `GET /v1/salary?search=&month=&year=&sort=&order=` - Filtered records with statistics
/// - `POST /v1/salary` - Create or update the record of an employee for a period
/// - `PATCH /v1/salary/:id` - Change bonus and/or deduction
/// - `DELETE /v1/salary/:id` - Delete record
/// - `GET /v1/salary/export?format=csv|json` - Download all records
///
/// The basic salary of a record is a snapshot of the employee's basic salary
/// taken on every save; totals are derived on read.

use crate::{
    app::AppState,
    error::{
        done, ok, validate, ActionError, ActionJson, ActionPath, ActionQuery, ActionResult, OrFail,
    },
};
use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use staffboard_shared::{
    auth::middleware::AuthContext,
    cache::View,
    models::{
        employee::Employee,
        salary_record::{SalaryEntry, SalaryRecord, UpsertSalaryRecord},
    },
    salary::{
        export::{render, ExportError, ExportFormat, NO_DATA_MESSAGE},
        listing::{available_years, salary_stats, SalaryQuery, SalaryStats},
    },
};
use uuid::Uuid;
use validator::Validate;

const NOT_FOUND: &str = "Salary record not found";

/// Salary record with its derived total
#[derive(Debug, Serialize)]
pub struct RecordWithTotal {
    #[serde(flatten)]
    pub record: SalaryRecord,
    pub total_paid: f64,
}

impl From<SalaryRecord> for RecordWithTotal {
    fn from(record: SalaryRecord) -> Self {
        Self {
            total_paid: record.total_paid(),
            record,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SalaryOverview {
    pub records: Vec<SalaryEntry>,
    pub stats: SalaryStats,
    pub available_years: Vec<i32>,

    /// Employees selectable when recording a salary
    pub employees: Vec<Employee>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SaveSalaryRequest {
    #[validate(required(message = "Employee is required"))]
    pub employee_id: Option<Uuid>,

    #[validate(
        required(message = "Month is required"),
        range(min = 1, max = 12, message = "Month must be between 1 and 12")
    )]
    pub month: Option<i32>,

    #[validate(
        required(message = "Year is required"),
        range(min = 2020, message = "Year must be 2020 or later")
    )]
    pub year: Option<i32>,

    #[serde(default)]
    #[validate(range(min = 0.0, message = "Bonus cannot be negative"))]
    pub bonus: f64,

    #[serde(default)]
    #[validate(range(min = 0.0, message = "Deduction cannot be negative"))]
    pub deduction: f64,
}

impl SaveSalaryRequest {
    pub fn into_upsert(self) -> Result<UpsertSalaryRecord, ActionError> {
        validate(&self)?;

        match (self.employee_id, self.month, self.year) {
            (Some(employee_id), Some(month), Some(year)) => Ok(UpsertSalaryRecord {
                employee_id,
                month,
                year,
                bonus: self.bonus,
                deduction: self.deduction,
            }),
            _ => Err(ActionError::Validation("Invalid salary record".to_string())),
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct AdjustSalaryRequest {
    #[validate(range(min = 0.0, message = "Bonus cannot be negative"))]
    pub bonus: Option<f64>,

    #[validate(range(min = 0.0, message = "Deduction cannot be negative"))]
    pub deduction: Option<f64>,
}

impl AdjustSalaryRequest {
    fn check(&self) -> Result<(), ActionError> {
        validate(self)?;
        if self.bonus.is_none() && self.deduction.is_none() {
            return Err(ActionError::Validation("No fields to update".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ExportQuery {
    #[serde(default)]
    pub format: ExportFormat,
}

pub async fn list_salary_records(
    State(state): State<AppState>,
    auth: AuthContext,
    ActionQuery(query): ActionQuery<SalaryQuery>,
) -> ActionResult<SalaryOverview> {
    let entries = SalaryRecord::list_entries(&state.db, auth.user_id)
        .await
        .or_fail("load salary records")?;
    let employees = Employee::list_by_user(&state.db, auth.user_id)
        .await
        .or_fail("load salary records")?;

    let basic_salaries: Vec<f64> = employees.iter().map(|e| e.basic_salary).collect();
    let today = Utc::now().date_naive();

    Ok(ok(SalaryOverview {
        records: query.apply(&entries),
        stats: salary_stats(&entries, &basic_salaries, today),
        available_years: available_years(&entries),
        employees,
    }))
}

/// Creates the record for the period, or updates the existing one
pub async fn save_salary_record(
    State(state): State<AppState>,
    auth: AuthContext,
    ActionJson(req): ActionJson<SaveSalaryRequest>,
) -> ActionResult<RecordWithTotal> {
    let data = req.into_upsert()?;

    let employee = Employee::find_owned(&state.db, data.employee_id, auth.user_id)
        .await
        .or_fail("save salary record")?
        .ok_or_else(|| ActionError::NotFound("Employee not found".to_string()))?;

    let record = SalaryRecord::upsert(&state.db, data, employee.basic_salary)
        .await
        .or_fail("save salary record")?;

    state.invalidate(auth.user_id, &[View::Assistant]).await;
    tracing::info!(
        employee_id = %employee.id,
        month = record.month,
        year = record.year,
        "Salary record saved"
    );

    Ok(ok(record.into()))
}

pub async fn update_salary_record(
    State(state): State<AppState>,
    auth: AuthContext,
    ActionPath(id): ActionPath<Uuid>,
    ActionJson(req): ActionJson<AdjustSalaryRequest>,
) -> ActionResult<RecordWithTotal> {
    req.check()?;

    let record = SalaryRecord::update_adjustments(&state.db, id, auth.user_id, req.bonus, req.deduction)
        .await
        .or_fail("update salary record")?
        .ok_or_else(|| ActionError::NotFound(NOT_FOUND.to_string()))?;

    state.invalidate(auth.user_id, &[View::Assistant]).await;

    Ok(ok(record.into()))
}

pub async fn delete_salary_record(
    State(state): State<AppState>,
    auth: AuthContext,
    ActionPath(id): ActionPath<Uuid>,
) -> ActionResult<()> {
    if !SalaryRecord::delete_owned(&state.db, id, auth.user_id)
        .await
        .or_fail("delete salary record")?
    {
        return Err(ActionError::NotFound(NOT_FOUND.to_string()));
    }

    state.invalidate(auth.user_id, &[View::Assistant]).await;

    Ok(done())
}

/// Sends every record as a CSV or JSON attachment
pub async fn export_salary_records(
    State(state): State<AppState>,
    auth: AuthContext,
    ActionQuery(query): ActionQuery<ExportQuery>,
) -> Result<Response, ActionError> {
    let entries = SalaryRecord::list_entries(&state.db, auth.user_id)
        .await
        .or_fail("export salary records")?;

    let file = render(&entries, query.format, Utc::now().date_naive()).map_err(|e| match e {
        ExportError::NoData => ActionError::NotFound(NO_DATA_MESSAGE.to_string()),
        other => ActionError::internal("export salary records", other),
    })?;

    tracing::info!(
        user_id = %auth.user_id,
        rows = entries.len(),
        filename = %file.filename,
        "Salary records exported"
    );

    Ok((
        [
            (header::CONTENT_TYPE, file.content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file.filename),
            ),
        ],
        file.body,
    )
        .into_response())
}
