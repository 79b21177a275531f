/// Database models for Staffboard
///
/// Every model except `user` is owned, directly or transitively, by a user.
/// Lookups and mutations take the owner's id and filter on it in SQL, so a
/// record belonging to another account is indistinguishable from a missing one.
///
/// # Models
///
/// - `user`: Accounts (the tenant boundary)
/// - `employee`: Employees owned by a user
/// - `project`: Projects owned by a user
/// - `task`: Tasks inside a project, with priority and kanban status
/// - `assignment`: Task <-> employee assignments
/// - `salary_record`: Monthly salary records, one per employee per period
///
/// # Example
///
/// ```no_run
/// use staffboard_shared::models::employee::{CreateEmployee, Employee};
/// use chrono::NaiveDate;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, user_id: Uuid) -> Result<(), sqlx::Error> {
/// let employee = Employee::create(&pool, user_id, CreateEmployee {
///     employee_code: "EMP001".to_string(),
///     name: "John Doe".to_string(),
///     joining_date: NaiveDate::from_ymd_opt(2023, 1, 15).unwrap(),
///     basic_salary: 95_000.0,
/// }).await?;
/// # Ok(())
/// # }
/// ```

pub mod assignment;
pub mod employee;
pub mod project;
pub mod salary_record;
pub mod task;
pub mod user;

/// Postgres error code for unique constraint violations
const UNIQUE_VIOLATION: &str = "23505";

/// Returns the violated constraint name if `err` is a unique violation
pub fn unique_violation(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) => {
            Some(db_err.constraint().unwrap_or_default().to_string())
        }
        _ => None,
    }
}
