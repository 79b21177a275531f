/// Salary export as CSV or JSON
///
/// Rows follow the order of [`SalaryRecord::list_entries`]: year desc, month
/// desc, employee name asc.
///
/// [`SalaryRecord::list_entries`]: crate::models::salary_record::SalaryRecord::list_entries

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::period_label;
use crate::models::salary_record::SalaryEntry;

/// Message returned when there is nothing to export
pub const NO_DATA_MESSAGE: &str = "No salary data available for download";

const CSV_HEADER: [&str; 9] = [
    "Employee Name",
    "Employee ID",
    "Period",
    "Month",
    "Year",
    "Basic Salary",
    "Bonus",
    "Deduction",
    "Total Paid",
];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("No salary data available for download")]
    NoData,

    #[error("CSV encoding failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV output is not valid UTF-8")]
    Encoding,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Json => "application/json",
        }
    }
}

/// One exported line
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRow {
    pub employee_name: String,
    pub employee_id: String,
    pub period: String,
    pub month: i32,
    pub year: i32,
    pub basic_salary: f64,
    pub bonus: f64,
    pub deduction: f64,
    pub total_paid: f64,
}

impl From<&SalaryEntry> for ExportRow {
    fn from(entry: &SalaryEntry) -> Self {
        Self {
            employee_name: entry.employee_name.clone(),
            employee_id: entry.employee_code.clone(),
            period: period_label(entry.month, entry.year),
            month: entry.month,
            year: entry.year,
            basic_salary: entry.basic_salary,
            bonus: entry.bonus,
            deduction: entry.deduction,
            total_paid: entry.total_paid,
        }
    }
}

/// A rendered export, ready to be sent as an attachment
#[derive(Debug, Clone)]
pub struct ExportFile {
    pub filename: String,
    pub content_type: &'static str,
    pub body: String,
}

pub fn export_rows(entries: &[SalaryEntry]) -> Vec<ExportRow> {
    entries.iter().map(ExportRow::from).collect()
}

/// Attachment name, e.g. `salary-records-2024-03-01.csv`
pub fn export_filename(format: ExportFormat, date: NaiveDate) -> String {
    format!("salary-records-{}.{}", date.format("%Y-%m-%d"), format.extension())
}

pub fn to_csv(rows: &[ExportRow]) -> Result<String, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;

    for row in rows {
        writer.write_record([
            row.employee_name.clone(),
            row.employee_id.clone(),
            row.period.clone(),
            row.month.to_string(),
            row.year.to_string(),
            row.basic_salary.to_string(),
            row.bonus.to_string(),
            row.deduction.to_string(),
            row.total_paid.to_string(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Csv(e.into_error().into()))?;
    String::from_utf8(bytes).map_err(|_| ExportError::Encoding)
}

pub fn to_json(rows: &[ExportRow]) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(rows)?)
}

/// Renders the entries in `format`, named for `date`
///
/// # Errors
///
/// [`ExportError::NoData`] when `entries` is empty.
pub fn render(entries: &[SalaryEntry], format: ExportFormat, date: NaiveDate) -> Result<ExportFile, ExportError> {
    if entries.is_empty() {
        return Err(ExportError::NoData);
    }

    let rows = export_rows(entries);
    let body = match format {
        ExportFormat::Csv => to_csv(&rows)?,
        ExportFormat::Json => to_json(&rows)?,
    };

    Ok(ExportFile {
        filename: export_filename(format, date),
        content_type: format.content_type(),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn entry(name: &str, code: &str, month: i32, year: i32) -> SalaryEntry {
        SalaryEntry {
            id: Uuid::new_v4(),
            employee_id: Uuid::new_v4(),
            employee_name: name.to_string(),
            employee_code: code.to_string(),
            month,
            year,
            basic_salary: 5000.0,
            bonus: 500.0,
            deduction: 200.0,
            total_paid: 0.0,
            created_at: Utc::now(),
        }
        .with_total()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn test_csv_layout() {
        let rows = export_rows(&[entry("John Doe", "EMP001", 1, 2024)]);
        let csv = to_csv(&rows).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(
            lines[0],
            "Employee Name,Employee ID,Period,Month,Year,Basic Salary,Bonus,Deduction,Total Paid"
        );
        assert_eq!(lines[1], "John Doe,EMP001,January 2024,1,2024,5000,500,200,5300");
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_csv_quotes_fields_with_commas() {
        let rows = export_rows(&[entry("Doe, John", "EMP001", 1, 2024)]);
        let csv = to_csv(&rows).unwrap();
        assert!(csv.lines().nth(1).unwrap().starts_with("\"Doe, John\",EMP001"));
    }

    #[test]
    fn test_json_uses_export_field_names() {
        let rows = export_rows(&[entry("John Doe", "EMP001", 2, 2024)]);
        let json: serde_json::Value = serde_json::from_str(&to_json(&rows).unwrap()).unwrap();

        assert_eq!(json[0]["employeeName"], "John Doe");
        assert_eq!(json[0]["employeeId"], "EMP001");
        assert_eq!(json[0]["period"], "February 2024");
        assert_eq!(json[0]["totalPaid"], 5300.0);
    }

    #[test]
    fn test_render_preserves_entry_order() {
        let entries = vec![
            entry("Alice", "EMP004", 3, 2024),
            entry("Bob", "EMP005", 3, 2024),
            entry("Alice", "EMP004", 12, 2023),
        ];
        let file = render(&entries, ExportFormat::Csv, date()).unwrap();
        let periods: Vec<&str> = file
            .body
            .lines()
            .skip(1)
            .map(|l| l.split(',').nth(2).unwrap())
            .collect();
        assert_eq!(periods, vec!["March 2024", "March 2024", "December 2023"]);
        assert_eq!(file.filename, "salary-records-2024-03-01.csv");
        assert_eq!(file.content_type, "text/csv; charset=utf-8");
    }

    #[test]
    fn test_render_empty_is_no_data() {
        let err = render(&[], ExportFormat::Json, date()).unwrap_err();
        assert!(matches!(err, ExportError::NoData));
        assert_eq!(err.to_string(), NO_DATA_MESSAGE);
    }

    #[test]
    fn test_export_filename() {
        assert_eq!(
            export_filename(ExportFormat::Json, date()),
            "salary-records-2024-03-01.json"
        );
    }
}
