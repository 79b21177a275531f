/// Integration tests for owner-scoped models
///
/// These tests require a running PostgreSQL database and are skipped when
/// `DATABASE_URL` is not set.

use chrono::NaiveDate;
use sqlx::PgPool;
use staffboard_shared::assistant::{load_context, respond};
use staffboard_shared::db::migrations::run_migrations;
use staffboard_shared::models::assignment::TaskAssignment;
use staffboard_shared::models::employee::{CreateEmployee, Employee, EMPLOYEE_CODE_CONSTRAINT};
use staffboard_shared::models::project::{CreateProject, Project};
use staffboard_shared::models::salary_record::{SalaryRecord, UpsertSalaryRecord};
use staffboard_shared::models::task::{CreateTask, Task, TaskPriority, TaskStatus, UpdateTask};
use staffboard_shared::models::unique_violation;
use staffboard_shared::models::user::{CreateUser, User};
use uuid::Uuid;

async fn test_pool() -> Option<PgPool> {
    let url = std::env::var("DATABASE_URL").ok()?;
    let pool = PgPool::connect(&url).await.expect("Failed to connect");
    run_migrations(&pool).await.expect("Failed to run migrations");
    Some(pool)
}

async fn create_user(pool: &PgPool) -> User {
    User::create(
        pool,
        CreateUser {
            email: format!("model-{}@example.com", Uuid::new_v4()),
            password_hash: "test_hash".to_string(),
            name: "Model Test".to_string(),
        },
    )
    .await
    .expect("Failed to create user")
}

async fn create_employee(pool: &PgPool, user_id: Uuid, code: &str, name: &str, salary: f64) -> Employee {
    Employee::create(
        pool,
        user_id,
        CreateEmployee {
            employee_code: code.to_string(),
            name: name.to_string(),
            joining_date: NaiveDate::from_ymd_opt(2023, 1, 15).unwrap(),
            basic_salary: salary,
        },
    )
    .await
    .expect("Failed to create employee")
}

fn period(employee_id: Uuid, month: i32, year: i32, bonus: f64) -> UpsertSalaryRecord {
    UpsertSalaryRecord {
        employee_id,
        month,
        year,
        bonus,
        deduction: 0.0,
    }
}

#[tokio::test]
async fn test_employee_code_unique_per_owner() {
    let Some(pool) = test_pool().await else { return };
    let alice = create_user(&pool).await;
    let bob = create_user(&pool).await;

    create_employee(&pool, alice.id, "EMP001", "John Doe", 5000.0).await;
    create_employee(&pool, bob.id, "EMP001", "John Doe", 5000.0).await;

    let err = Employee::create(
        &pool,
        alice.id,
        CreateEmployee {
            employee_code: "EMP001".to_string(),
            name: "Jane Smith".to_string(),
            joining_date: NaiveDate::from_ymd_opt(2023, 3, 1).unwrap(),
            basic_salary: 6000.0,
        },
    )
    .await
    .unwrap_err();
    assert_eq!(unique_violation(&err).as_deref(), Some(EMPLOYEE_CODE_CONSTRAINT));

    User::delete(&pool, alice.id).await.unwrap();
    User::delete(&pool, bob.id).await.unwrap();
}

#[tokio::test]
async fn test_owner_scoped_lookups() {
    let Some(pool) = test_pool().await else { return };
    let alice = create_user(&pool).await;
    let bob = create_user(&pool).await;

    let employee = create_employee(&pool, alice.id, "EMP001", "John Doe", 5000.0).await;
    let project = Project::create(
        &pool,
        alice.id,
        CreateProject {
            name: "Website Redesign".to_string(),
            description: Some("  ".to_string()),
        },
    )
    .await
    .unwrap();
    assert!(project.description.is_none());

    assert!(Employee::find_owned(&pool, employee.id, bob.id).await.unwrap().is_none());
    assert!(Project::find_owned(&pool, project.id, bob.id).await.unwrap().is_none());
    assert!(!Employee::delete_owned(&pool, employee.id, bob.id).await.unwrap());
    assert!(Employee::find_owned(&pool, employee.id, alice.id).await.unwrap().is_some());

    User::delete(&pool, alice.id).await.unwrap();
    User::delete(&pool, bob.id).await.unwrap();
}

#[tokio::test]
async fn test_salary_upsert_and_listing() {
    let Some(pool) = test_pool().await else { return };
    let user = create_user(&pool).await;
    let john = create_employee(&pool, user.id, "EMP001", "John Doe", 5000.0).await;
    let jane = create_employee(&pool, user.id, "EMP002", "Jane Smith", 6000.0).await;

    let first = SalaryRecord::upsert(&pool, period(john.id, 1, 2024, 100.0), john.basic_salary)
        .await
        .unwrap();
    let again = SalaryRecord::upsert(&pool, period(john.id, 1, 2024, 300.0), 5200.0)
        .await
        .unwrap();
    assert_eq!(first.id, again.id);
    assert_eq!(again.basic_salary, 5200.0);
    assert_eq!(again.total_paid(), 5500.0);

    SalaryRecord::upsert(&pool, period(john.id, 2, 2024, 0.0), 5200.0).await.unwrap();
    SalaryRecord::upsert(&pool, period(jane.id, 2, 2024, 0.0), 6000.0).await.unwrap();

    let entries = SalaryRecord::list_entries(&pool, user.id).await.unwrap();
    let order: Vec<(&str, i32)> = entries
        .iter()
        .map(|e| (e.employee_name.as_str(), e.month))
        .collect();
    assert_eq!(order, vec![("Jane Smith", 2), ("John Doe", 2), ("John Doe", 1)]);
    assert_eq!(entries[2].total_paid, 5500.0);

    let latest = SalaryRecord::latest_per_employee(&pool, user.id).await.unwrap();
    let john_latest = latest.iter().find(|r| r.employee_id == john.id).unwrap();
    assert_eq!(john_latest.month, 2);

    // Deleting the employee removes the salary history
    assert!(Employee::delete_owned(&pool, john.id, user.id).await.unwrap());
    assert!(SalaryRecord::list_for_employee(&pool, john.id).await.unwrap().is_empty());

    User::delete(&pool, user.id).await.unwrap();
}

#[tokio::test]
async fn test_tasks_assignments_and_assistant_context() {
    let Some(pool) = test_pool().await else { return };
    let user = create_user(&pool).await;
    let employee = create_employee(&pool, user.id, "EMP001", "John Doe", 5000.0).await;
    let project = Project::create(
        &pool,
        user.id,
        CreateProject {
            name: "Mobile App".to_string(),
            description: None,
        },
    )
    .await
    .unwrap();

    let task = Task::create(
        &pool,
        CreateTask {
            project_id: project.id,
            title: "Build login".to_string(),
            description: None,
            priority: TaskPriority::High,
        },
    )
    .await
    .unwrap();
    assert_eq!(task.status, TaskStatus::Todo);

    TaskAssignment::assign(&pool, task.id, employee.id).await.unwrap();
    assert!(TaskAssignment::assign(&pool, task.id, employee.id).await.is_err());

    let assignees = TaskAssignment::assignees_for_tasks(&pool, &[task.id]).await.unwrap();
    assert_eq!(assignees.len(), 1);
    assert_eq!(assignees[0].employee_code, "EMP001");

    Task::update_status(&pool, task.id, user.id, TaskStatus::Done)
        .await
        .unwrap()
        .unwrap();

    let context = load_context(&pool, user.id).await.unwrap();
    assert_eq!(context.summary.total_employees, 1);
    assert_eq!(context.summary.completed_tasks, 1);
    assert_eq!(
        respond("How many tasks are there?", &context),
        "There are 1 total tasks, with 1 completed tasks."
    );

    // Deleting the project removes its tasks and their assignments
    assert!(Project::delete_owned(&pool, project.id, user.id).await.unwrap());
    assert!(Task::find_owned(&pool, task.id, user.id).await.unwrap().is_none());
    assert!(!TaskAssignment::exists(&pool, task.id, employee.id).await.unwrap());

    User::delete(&pool, user.id).await.unwrap();
}

async fn create_task(pool: &PgPool, user_id: Uuid, title: &str) -> Task {
    let project = Project::create(
        pool,
        user_id,
        CreateProject {
            name: "Internal Tools".to_string(),
            description: None,
        },
    )
    .await
    .unwrap();

    Task::create(
        pool,
        CreateTask {
            project_id: project.id,
            title: title.to_string(),
            description: Some("First draft".to_string()),
            priority: TaskPriority::High,
        },
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn test_task_partial_update() {
    let Some(pool) = test_pool().await else { return };
    let user = create_user(&pool).await;
    let other = create_user(&pool).await;
    let task = create_task(&pool, user.id, "Write report").await;

    let status_only = UpdateTask {
        status: Some(TaskStatus::InReview),
        ..Default::default()
    };
    let updated = Task::update(&pool, task.id, user.id, status_only)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.status, TaskStatus::InReview);
    assert_eq!(updated.title, "Write report");
    assert_eq!(updated.priority, TaskPriority::High);
    assert_eq!(updated.description.as_deref(), Some("First draft"));

    // A blank description clears it, like on create
    let clear = UpdateTask {
        description: Some("   ".to_string()),
        ..Default::default()
    };
    let updated = Task::update(&pool, task.id, user.id, clear).await.unwrap().unwrap();
    assert!(updated.description.is_none());
    assert_eq!(updated.status, TaskStatus::InReview);

    let foreign = UpdateTask {
        title: Some("Hijacked".to_string()),
        ..Default::default()
    };
    assert!(Task::update(&pool, task.id, other.id, foreign).await.unwrap().is_none());
    assert!(!Task::delete_owned(&pool, task.id, other.id).await.unwrap());

    User::delete(&pool, user.id).await.unwrap();
    User::delete(&pool, other.id).await.unwrap();
}

#[tokio::test]
async fn test_deletes_cascade_to_assignments() {
    let Some(pool) = test_pool().await else { return };
    let user = create_user(&pool).await;
    let john = create_employee(&pool, user.id, "EMP001", "John Doe", 5000.0).await;
    let jane = create_employee(&pool, user.id, "EMP002", "Jane Smith", 6000.0).await;
    let task = create_task(&pool, user.id, "Build login").await;
    let other_task = create_task(&pool, user.id, "Fix header").await;

    TaskAssignment::assign(&pool, task.id, john.id).await.unwrap();
    TaskAssignment::assign(&pool, task.id, jane.id).await.unwrap();
    TaskAssignment::assign(&pool, other_task.id, john.id).await.unwrap();

    // Deleting an employee removes only that employee's assignments
    assert!(Employee::delete_owned(&pool, john.id, user.id).await.unwrap());
    assert!(!TaskAssignment::exists(&pool, task.id, john.id).await.unwrap());
    assert!(!TaskAssignment::exists(&pool, other_task.id, john.id).await.unwrap());
    assert!(TaskAssignment::exists(&pool, task.id, jane.id).await.unwrap());

    // Deleting a task removes its assignments but keeps the employee
    assert!(Task::delete_owned(&pool, task.id, user.id).await.unwrap());
    assert!(!TaskAssignment::exists(&pool, task.id, jane.id).await.unwrap());
    assert!(Employee::find_owned(&pool, jane.id, user.id).await.unwrap().is_some());
    let remaining = TaskAssignment::assignees_for_tasks(&pool, &[task.id, other_task.id])
        .await
        .unwrap();
    assert!(remaining.is_empty());

    User::delete(&pool, user.id).await.unwrap();
}
