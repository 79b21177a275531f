/// Salary arithmetic, listing filters and export
///
/// Everything here is pure; the records come from
/// [`crate::models::salary_record::SalaryRecord::list_entries`].
///
/// - `listing`: search/filter/sort, current-month statistics, available years
/// - `export`: flat export rows rendered as CSV or JSON

pub mod export;
pub mod listing;

use chrono::Month;

/// Earliest year a salary record may be filed for
pub const MIN_YEAR: i32 = 2020;

/// Amount actually paid for a period
pub fn total_paid(basic_salary: f64, bonus: f64, deduction: f64) -> f64 {
    basic_salary + bonus - deduction
}

/// Human label for a pay period, e.g. "January 2024"
pub fn period_label(month: i32, year: i32) -> String {
    let name = u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map(|m| m.name());

    match name {
        Some(name) => format!("{} {}", name, year),
        None => format!("{}/{}", month, year),
    }
}

/// Formats an amount with thousands separators and at most two decimals
///
/// Trailing zeros in the fraction are dropped: `95000.0` is "95,000",
/// `1234.5` is "1,234.5".
pub fn format_amount(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = cents / 100;
    let fraction = cents % 100;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    match fraction {
        0 => format!("{}{}", sign, grouped),
        f if f % 10 == 0 => format!("{}{}.{}", sign, grouped, f / 10),
        f => format!("{}{}.{:02}", sign, grouped, f),
    }
}
