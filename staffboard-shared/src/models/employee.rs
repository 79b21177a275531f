/// Employee model and database operations
///
/// Employees belong to exactly one user. The business code (`employee_code`,
/// e.g. "EMP001") is unique per owner.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE employees (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     employee_code VARCHAR(64) NOT NULL,
///     name VARCHAR(255) NOT NULL,
///     joining_date DATE NOT NULL,
///     basic_salary DOUBLE PRECISION NOT NULL CHECK (basic_salary >= 0),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT employees_user_code_key UNIQUE (user_id, employee_code)
/// );
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Name of the per-owner employee code uniqueness constraint
pub const EMPLOYEE_CODE_CONSTRAINT: &str = "employees_user_code_key";

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Employee {
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// Business identifier shown to people, e.g. "EMP001"
    pub employee_code: String,

    pub name: String,
    pub joining_date: NaiveDate,

    /// Current monthly basic salary; salary records snapshot this value
    pub basic_salary: f64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields of an employee supplied on create and on (full) update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateEmployee {
    pub employee_code: String,
    pub name: String,
    pub joining_date: NaiveDate,
    pub basic_salary: f64,
}

pub type UpdateEmployee = CreateEmployee;

const EMPLOYEE_COLUMNS: &str =
    "id, user_id, employee_code, name, joining_date, basic_salary, created_at, updated_at";

impl Employee {
    /// Creates an employee owned by `user_id`
    ///
    /// # Errors
    ///
    /// Fails with a unique violation on [`EMPLOYEE_CODE_CONSTRAINT`] if the
    /// owner already has an employee with the same code.
    pub async fn create(pool: &PgPool, user_id: Uuid, data: CreateEmployee) -> Result<Self, sqlx::Error> {
        let query = format!(
            r#"
            INSERT INTO employees (user_id, employee_code, name, joining_date, basic_salary)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            EMPLOYEE_COLUMNS
        );

        sqlx::query_as::<_, Employee>(&query)
            .bind(user_id)
            .bind(data.employee_code.trim())
            .bind(data.name.trim())
            .bind(data.joining_date)
            .bind(data.basic_salary)
            .fetch_one(pool)
            .await
    }

    /// Finds an employee only if it belongs to `user_id`
    pub async fn find_owned(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM employees WHERE id = $1 AND user_id = $2",
            EMPLOYEE_COLUMNS
        );

        sqlx::query_as::<_, Employee>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Lists the owner's employees, alphabetically
    pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM employees WHERE user_id = $1 ORDER BY name ASC, employee_code ASC",
            EMPLOYEE_COLUMNS
        );

        sqlx::query_as::<_, Employee>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Replaces all editable fields of an owned employee
    ///
    /// Returns `None` if the employee does not exist or belongs to someone else.
    /// Existing salary records keep their snapshot of the old basic salary.
    pub async fn update_owned(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
        data: UpdateEmployee,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            r#"
            UPDATE employees
            SET employee_code = $3,
                name = $4,
                joining_date = $5,
                basic_salary = $6,
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING {}
            "#,
            EMPLOYEE_COLUMNS
        );

        sqlx::query_as::<_, Employee>(&query)
            .bind(id)
            .bind(user_id)
            .bind(data.employee_code.trim())
            .bind(data.name.trim())
            .bind(data.joining_date)
            .bind(data.basic_salary)
            .fetch_optional(pool)
            .await
    }

    /// Deletes an owned employee
    ///
    /// Salary records and task assignments go with it (ON DELETE CASCADE).
    pub async fn delete_owned(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM employees WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn count_by_user(pool: &PgPool, user_id: Uuid) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM employees WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_employee_serializes_date_as_iso() {
        let employee = Employee {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            employee_code: "EMP001".to_string(),
            name: "John Doe".to_string(),
            joining_date: NaiveDate::from_ymd_opt(2023, 1, 15).unwrap(),
            basic_salary: 95_000.0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&employee).unwrap();
        assert_eq!(json["joining_date"], "2023-01-15");
        assert_eq!(json["employee_code"], "EMP001");
        assert_eq!(json["basic_salary"], 95_000.0);
    }
}
