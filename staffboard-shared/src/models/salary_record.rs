/// Monthly salary records
///
/// One record per employee per (month, year). The employee's basic salary is
/// copied into the record when it is written, so later raises do not rewrite
/// history. The total paid is never stored.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE salary_records (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     employee_id UUID NOT NULL REFERENCES employees(id) ON DELETE CASCADE,
///     month INTEGER NOT NULL CHECK (month BETWEEN 1 AND 12),
///     year INTEGER NOT NULL CHECK (year >= 2020),
///     basic_salary DOUBLE PRECISION NOT NULL,
///     bonus DOUBLE PRECISION NOT NULL DEFAULT 0 CHECK (bonus >= 0),
///     deduction DOUBLE PRECISION NOT NULL DEFAULT 0 CHECK (deduction >= 0),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT salary_records_period_key UNIQUE (employee_id, month, year)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::salary::total_paid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SalaryRecord {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub month: i32,
    pub year: i32,

    /// Employee's basic salary at the time the record was written
    pub basic_salary: f64,

    pub bonus: f64,
    pub deduction: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SalaryRecord {
    pub fn total_paid(&self) -> f64 {
        total_paid(self.basic_salary, self.bonus, self.deduction)
    }
}

/// Salary record joined with its employee, as listed and exported
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SalaryEntry {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub employee_name: String,
    pub employee_code: String,
    pub month: i32,
    pub year: i32,
    pub basic_salary: f64,
    pub bonus: f64,
    pub deduction: f64,

    #[sqlx(skip)]
    pub total_paid: f64,

    pub created_at: DateTime<Utc>,
}

impl SalaryEntry {
    /// Fills in the derived total
    pub fn with_total(mut self) -> Self {
        self.total_paid = total_paid(self.basic_salary, self.bonus, self.deduction);
        self
    }
}

/// Input for the create-or-update operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpsertSalaryRecord {
    pub employee_id: Uuid,
    pub month: i32,
    pub year: i32,
    pub bonus: f64,
    pub deduction: f64,
}

const RECORD_COLUMNS: &str =
    "s.id, s.employee_id, s.month, s.year, s.basic_salary, s.bonus, s.deduction, s.created_at, s.updated_at";

const ENTRY_SELECT: &str = r#"
    SELECT
        s.id, s.employee_id, e.name AS employee_name, e.employee_code,
        s.month, s.year, s.basic_salary, s.bonus, s.deduction, s.created_at
    FROM salary_records s
    JOIN employees e ON e.id = s.employee_id
"#;

impl SalaryRecord {
    /// Creates the record for the period or refreshes the existing one
    ///
    /// `basic_salary` is the employee's current basic salary; it replaces the
    /// snapshot on update as well.
    pub async fn upsert(
        pool: &PgPool,
        data: UpsertSalaryRecord,
        basic_salary: f64,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, SalaryRecord>(
            r#"
            INSERT INTO salary_records AS s (employee_id, month, year, basic_salary, bonus, deduction)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT ON CONSTRAINT salary_records_period_key DO UPDATE
            SET basic_salary = EXCLUDED.basic_salary,
                bonus = EXCLUDED.bonus,
                deduction = EXCLUDED.deduction,
                updated_at = NOW()
            RETURNING s.id, s.employee_id, s.month, s.year, s.basic_salary, s.bonus,
                      s.deduction, s.created_at, s.updated_at
            "#,
        )
        .bind(data.employee_id)
        .bind(data.month)
        .bind(data.year)
        .bind(basic_salary)
        .bind(data.bonus)
        .bind(data.deduction)
        .fetch_one(pool)
        .await
    }

    /// Finds a record only if its employee belongs to `user_id`
    pub async fn find_owned(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            r#"
            SELECT {}
            FROM salary_records s
            JOIN employees e ON e.id = s.employee_id
            WHERE s.id = $1 AND e.user_id = $2
            "#,
            RECORD_COLUMNS
        );

        sqlx::query_as::<_, SalaryRecord>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Changes bonus and/or deduction of an owned record
    pub async fn update_adjustments(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
        bonus: Option<f64>,
        deduction: Option<f64>,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            r#"
            UPDATE salary_records s
            SET bonus = COALESCE($3, s.bonus),
                deduction = COALESCE($4, s.deduction),
                updated_at = NOW()
            FROM employees e
            WHERE s.id = $1 AND e.id = s.employee_id AND e.user_id = $2
            RETURNING {}
            "#,
            RECORD_COLUMNS
        );

        sqlx::query_as::<_, SalaryRecord>(&query)
            .bind(id)
            .bind(user_id)
            .bind(bonus)
            .bind(deduction)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete_owned(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM salary_records s
            USING employees e
            WHERE s.id = $1 AND e.id = s.employee_id AND e.user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// All of an employee's records, latest period first
    pub async fn list_for_employee(pool: &PgPool, employee_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            r#"
            SELECT {}
            FROM salary_records s
            WHERE s.employee_id = $1
            ORDER BY s.year DESC, s.month DESC
            "#,
            RECORD_COLUMNS
        );

        sqlx::query_as::<_, SalaryRecord>(&query)
            .bind(employee_id)
            .fetch_all(pool)
            .await
    }

    /// All of the owner's records with employee details
    ///
    /// Ordered by year desc, month desc, then employee name.
    pub async fn list_entries(pool: &PgPool, user_id: Uuid) -> Result<Vec<SalaryEntry>, sqlx::Error> {
        let query = format!(
            "{} WHERE e.user_id = $1 ORDER BY s.year DESC, s.month DESC, e.name ASC",
            ENTRY_SELECT
        );

        let entries = sqlx::query_as::<_, SalaryEntry>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await?;

        Ok(entries.into_iter().map(SalaryEntry::with_total).collect())
    }

    /// The most recent record (by period) of each of the owner's employees
    pub async fn latest_per_employee(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            r#"
            SELECT DISTINCT ON (s.employee_id) {}
            FROM salary_records s
            JOIN employees e ON e.id = s.employee_id
            WHERE e.user_id = $1
            ORDER BY s.employee_id, s.year DESC, s.month DESC
            "#,
            RECORD_COLUMNS
        );

        sqlx::query_as::<_, SalaryRecord>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(basic: f64, bonus: f64, deduction: f64) -> SalaryEntry {
        SalaryEntry {
            id: Uuid::new_v4(),
            employee_id: Uuid::new_v4(),
            employee_name: "Jane Smith".to_string(),
            employee_code: "EMP002".to_string(),
            month: 3,
            year: 2024,
            basic_salary: basic,
            bonus,
            deduction,
            total_paid: 0.0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_entry_with_total() {
        let e = entry(5000.0, 500.0, 200.0).with_total();
        assert_eq!(e.total_paid, 5300.0);

        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["total_paid"], 5300.0);
        assert_eq!(json["employee_code"], "EMP002");
    }

    #[test]
    fn test_record_total_paid() {
        let record = SalaryRecord {
            id: Uuid::new_v4(),
            employee_id: Uuid::new_v4(),
            month: 1,
            year: 2024,
            basic_salary: 95_000.0,
            bonus: 0.0,
            deduction: 1_000.0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(record.total_paid(), 94_000.0);
    }
}
