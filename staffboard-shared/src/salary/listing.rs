/// Salary list filtering, sorting and statistics

use std::cmp::Ordering;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::salary_record::SalaryEntry;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    Name,
    BasicSalary,
    TotalPaid,
    Date,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Query parameters of the salary list
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SalaryQuery {
    /// Case-insensitive match on employee name or code
    pub search: Option<String>,
    pub month: Option<i32>,
    pub year: Option<i32>,
    #[serde(default)]
    pub sort: SortField,
    #[serde(default)]
    pub order: SortOrder,
}

impl SalaryQuery {
    fn matches(&self, entry: &SalaryEntry) -> bool {
        if let Some(term) = self.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let term = term.to_lowercase();
            if !entry.employee_name.to_lowercase().contains(&term)
                && !entry.employee_code.to_lowercase().contains(&term)
            {
                return false;
            }
        }

        self.month.map_or(true, |m| entry.month == m) && self.year.map_or(true, |y| entry.year == y)
    }

    fn compare(&self, a: &SalaryEntry, b: &SalaryEntry) -> Ordering {
        let ordering = match self.sort {
            SortField::Name => a
                .employee_name
                .to_lowercase()
                .cmp(&b.employee_name.to_lowercase()),
            SortField::BasicSalary => a.basic_salary.total_cmp(&b.basic_salary),
            SortField::TotalPaid => a.total_paid.total_cmp(&b.total_paid),
            SortField::Date => (a.year, a.month).cmp(&(b.year, b.month)),
        };

        match self.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }

    /// Filters and sorts entries; ties keep their incoming order
    pub fn apply(&self, entries: &[SalaryEntry]) -> Vec<SalaryEntry> {
        let mut filtered: Vec<SalaryEntry> =
            entries.iter().filter(|e| self.matches(e)).cloned().collect();
        filtered.sort_by(|a, b| self.compare(a, b));
        filtered
    }
}

/// Aggregates shown above the salary list
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SalaryStats {
    /// Sum of total paid for the current month's records
    pub total_paid: f64,
    pub total_bonus: f64,
    pub total_deduction: f64,

    /// Sum of every employee's current basic salary
    pub total_basic_salary: f64,

    pub employee_count: usize,
}

/// Computes the statistics for the month containing `today`
pub fn salary_stats(entries: &[SalaryEntry], basic_salaries: &[f64], today: NaiveDate) -> SalaryStats {
    let (month, year) = (today.month() as i32, today.year());

    let current = entries.iter().filter(|e| e.month == month && e.year == year);
    let mut stats = SalaryStats {
        total_basic_salary: basic_salaries.iter().sum(),
        employee_count: basic_salaries.len(),
        ..Default::default()
    };

    for entry in current {
        stats.total_paid += entry.total_paid;
        stats.total_bonus += entry.bonus;
        stats.total_deduction += entry.deduction;
    }

    stats
}

/// Distinct record years, newest first
pub fn available_years(entries: &[SalaryEntry]) -> Vec<i32> {
    let mut years: Vec<i32> = entries.iter().map(|e| e.year).collect();
    years.sort_unstable_by(|a, b| b.cmp(a));
    years.dedup();
    years
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn entry(name: &str, code: &str, month: i32, year: i32, basic: f64, bonus: f64) -> SalaryEntry {
        SalaryEntry {
            id: Uuid::new_v4(),
            employee_id: Uuid::new_v4(),
            employee_name: name.to_string(),
            employee_code: code.to_string(),
            month,
            year,
            basic_salary: basic,
            bonus,
            deduction: 0.0,
            total_paid: 0.0,
            created_at: Utc::now(),
        }
        .with_total()
    }

    fn sample() -> Vec<SalaryEntry> {
        vec![
            entry("John Doe", "EMP001", 1, 2024, 95_000.0, 0.0),
            entry("jane smith", "EMP002", 2, 2024, 85_000.0, 5_000.0),
            entry("Mike Johnson", "EMP003", 12, 2023, 75_000.0, 0.0),
            entry("Alice", "ENG-7", 2, 2024, 60_000.0, 1_000.0),
        ]
    }

    fn names(entries: &[SalaryEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.employee_name.as_str()).collect()
    }

    #[test]
    fn test_default_sort_is_name_ascending_case_insensitive() {
        let result = SalaryQuery::default().apply(&sample());
        assert_eq!(names(&result), vec!["Alice", "jane smith", "John Doe", "Mike Johnson"]);
    }

    #[test]
    fn test_search_matches_name_or_code() {
        let query = SalaryQuery {
            search: Some("emp00".to_string()),
            ..Default::default()
        };
        assert_eq!(query.apply(&sample()).len(), 3);

        let query = SalaryQuery {
            search: Some("SMITH".to_string()),
            ..Default::default()
        };
        assert_eq!(names(&query.apply(&sample())), vec!["jane smith"]);
    }

    #[test]
    fn test_month_and_year_filters() {
        let query = SalaryQuery {
            month: Some(2),
            year: Some(2024),
            ..Default::default()
        };
        assert_eq!(names(&query.apply(&sample())), vec!["Alice", "jane smith"]);

        let query = SalaryQuery {
            year: Some(2023),
            ..Default::default()
        };
        assert_eq!(names(&query.apply(&sample())), vec!["Mike Johnson"]);
    }

    #[test]
    fn test_sort_by_total_paid_desc() {
        let query = SalaryQuery {
            sort: SortField::TotalPaid,
            order: SortOrder::Desc,
            ..Default::default()
        };
        assert_eq!(
            names(&query.apply(&sample())),
            vec!["John Doe", "jane smith", "Mike Johnson", "Alice"]
        );
    }

    #[test]
    fn test_sort_by_date_is_stable() {
        let query = SalaryQuery {
            sort: SortField::Date,
            ..Default::default()
        };
        assert_eq!(
            names(&query.apply(&sample())),
            vec!["Mike Johnson", "John Doe", "jane smith", "Alice"]
        );
    }

    #[test]
    fn test_query_deserializes_sort_options() {
        let query: SalaryQuery =
            serde_json::from_str(r#"{"sort":"basic_salary","order":"desc","year":2024}"#).unwrap();
        assert_eq!(query.sort, SortField::BasicSalary);
        assert_eq!(query.order, SortOrder::Desc);
        assert_eq!(query.year, Some(2024));
    }

    #[test]
    fn test_salary_stats_current_month_only() {
        let today = NaiveDate::from_ymd_opt(2024, 2, 14).unwrap();
        let stats = salary_stats(&sample(), &[95_000.0, 85_000.0, 75_000.0, 60_000.0], today);

        assert_eq!(stats.total_paid, 90_000.0 + 61_000.0);
        assert_eq!(stats.total_bonus, 6_000.0);
        assert_eq!(stats.total_deduction, 0.0);
        assert_eq!(stats.total_basic_salary, 315_000.0);
        assert_eq!(stats.employee_count, 4);
    }

    #[test]
    fn test_available_years() {
        assert_eq!(available_years(&sample()), vec![2024, 2023]);
        assert!(available_years(&[]).is_empty());
    }
}
