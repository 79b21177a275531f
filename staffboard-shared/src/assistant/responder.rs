use super::{AssistantContext, EmployeeContext};
use crate::dashboard::completion_rate;
use crate::salary::{format_amount, period_label};

pub const GREETING: &str = "Hello! I'm your HR assistant. I can help you with information about \
employees, projects, tasks, and salaries. What would you like to know?";

const HELP: &str = "I can help you with:\n\
• Employee information and counts\n\
• Project status and progress\n\
• Task completion rates\n\
• Salary information\n\
• General HR overview\n\n\
Just ask me questions like 'How many employees do we have?' or 'What's the project status?'";

const FALLBACK: &str = "I understand you're asking about HR data. I can help with information \
about employees, projects, tasks, and salaries. Could you rephrase your question? For example, \
try asking 'How many employees do we have?' or 'What's our project status?'";

fn money(value: f64) -> String {
    format!("${}", format_amount(value))
}

fn mentions_any(question: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| question.contains(k))
}

fn has_word(question: &str, word: &str) -> bool {
    question
        .split(|c: char| !c.is_alphanumeric())
        .any(|token| token == word)
}

/// Answers `question` from `context`
///
/// Rules are tried in order; a topic whose follow-up keywords do not match
/// falls through to the next topic.
pub fn respond(question: &str, context: &AssistantContext) -> String {
    let q = question.to_lowercase();
    let summary = &context.summary;
    let rate = completion_rate(summary.completed_tasks, summary.total_tasks);

    if mentions_any(&q, &["employee", "staff", "worker"]) {
        if mentions_any(&q, &["how many", "count"]) {
            return format!(
                "You currently have {} employees in your organization.",
                summary.total_employees
            );
        }
        if mentions_any(&q, &["list", "who"]) {
            let list = context
                .employees
                .iter()
                .map(|e| format!("{} (ID: {})", e.name, e.employee_code))
                .collect::<Vec<_>>()
                .join(", ");
            return format!("Here are your employees: {}", list);
        }
        if mentions_any(&q, &["salary", "pay"]) {
            return salary_overview(&context.employees);
        }
    }

    if q.contains("project") {
        if mentions_any(&q, &["how many", "count"]) {
            return format!(
                "You have {} active projects with a total of {} tasks.",
                summary.total_projects, summary.total_tasks
            );
        }
        if mentions_any(&q, &["list", "what"]) {
            let list = context
                .projects
                .iter()
                .map(|p| format!("{} ({}/{} tasks completed)", p.name, p.completed_tasks, p.task_count))
                .collect::<Vec<_>>()
                .join(", ");
            return format!("Here are your projects: {}", list);
        }
        if mentions_any(&q, &["progress", "status"]) {
            return format!(
                "Overall project progress: {}% completion rate ({} out of {} tasks completed).",
                rate, summary.completed_tasks, summary.total_tasks
            );
        }
    }

    if q.contains("task") {
        if mentions_any(&q, &["how many", "count"]) {
            return format!(
                "There are {} total tasks, with {} completed tasks.",
                summary.total_tasks, summary.completed_tasks
            );
        }
        if mentions_any(&q, &["completed", "done"]) {
            return format!(
                "{} tasks have been completed out of {} total tasks ({}% completion rate).",
                summary.completed_tasks, summary.total_tasks, rate
            );
        }
    }

    if mentions_any(&q, &["summary", "overview", "status"]) {
        return format!(
            "Here's your HR overview: You have {} employees working on {} projects. \
             There are {} total tasks with {} completed ({}% completion rate).",
            summary.total_employees,
            summary.total_projects,
            summary.total_tasks,
            summary.completed_tasks,
            rate
        );
    }

    if let Some(employee) = context
        .employees
        .iter()
        .find(|e| !e.name.trim().is_empty() && q.contains(&e.name.to_lowercase()))
    {
        return employee_details(employee);
    }

    if q.contains("hello") || has_word(&q, "hi") {
        return GREETING.to_string();
    }

    if q.contains("help") {
        return HELP.to_string();
    }

    FALLBACK.to_string()
}

fn salary_overview(employees: &[EmployeeContext]) -> String {
    if employees.is_empty() {
        return "You don't have any employees yet, so there is no salary information to report."
            .to_string();
    }

    let salaries = employees.iter().map(|e| e.basic_salary);
    let average = (salaries.clone().sum::<f64>() / employees.len() as f64).round();
    let min = salaries.clone().fold(f64::INFINITY, f64::min);
    let max = salaries.fold(f64::NEG_INFINITY, f64::max);

    format!(
        "The average salary across all employees is {}. Individual salaries range from {} to {}.",
        money(average),
        money(min),
        money(max)
    )
}

fn employee_details(employee: &EmployeeContext) -> String {
    let mut reply = format!(
        "{} (ID: {}) joined on {} with a basic salary of {}.",
        employee.name,
        employee.employee_code,
        employee.joining_date.format("%-m/%-d/%Y"),
        money(employee.basic_salary)
    );

    if let Some(latest) = &employee.latest_salary {
        reply.push_str(&format!(
            " Their latest salary record shows a total of {} for {}.",
            money(latest.total),
            period_label(latest.month, latest.year)
        ));
    }

    reply
}
