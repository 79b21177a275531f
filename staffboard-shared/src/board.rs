/// Kanban board
///
/// Groups a user's tasks into the four status columns. Cards are moved by
/// updating the task status; this module only shapes the read side.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::assignment::{Assignee, TaskAssignment};
use crate::models::task::{Task, TaskPriority, TaskStatus, TaskWithProject};

/// Ordering of cards within a column
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoardSort {
    /// Creation order
    #[default]
    Default,

    /// Most urgent first; ties keep creation order
    Priority,
}

/// Employee shown on a card
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardAssignee {
    pub employee_id: Uuid,
    pub employee_code: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BoardCard {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub project_id: Uuid,
    pub project_name: String,
    pub assignees: Vec<CardAssignee>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BoardColumn {
    pub status: TaskStatus,
    pub title: &'static str,
    pub count: usize,
    pub tasks: Vec<BoardCard>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Board {
    pub columns: Vec<BoardColumn>,
}

impl Board {
    pub fn column(&self, status: TaskStatus) -> Option<&BoardColumn> {
        self.columns.iter().find(|c| c.status == status)
    }
}

/// Groups tasks (in creation order) into columns
///
/// Every status gets a column, empty or not.
pub fn build_board(tasks: Vec<TaskWithProject>, assignees: Vec<Assignee>, sort: BoardSort) -> Board {
    let mut by_task: HashMap<Uuid, Vec<CardAssignee>> = HashMap::new();
    for a in assignees {
        by_task.entry(a.task_id).or_default().push(CardAssignee {
            employee_id: a.employee_id,
            employee_code: a.employee_code,
            name: a.name,
        });
    }

    let mut columns: Vec<BoardColumn> = TaskStatus::ALL
        .iter()
        .map(|&status| BoardColumn {
            status,
            title: status.title(),
            count: 0,
            tasks: Vec::new(),
        })
        .collect();

    for task in tasks {
        let card = BoardCard {
            assignees: by_task.remove(&task.id).unwrap_or_default(),
            id: task.id,
            title: task.title,
            description: task.description,
            priority: task.priority,
            status: task.status,
            project_id: task.project_id,
            project_name: task.project_name,
        };

        if let Some(column) = columns.iter_mut().find(|c| c.status == card.status) {
            column.tasks.push(card);
        }
    }

    for column in &mut columns {
        if sort == BoardSort::Priority {
            // stable: equal priorities keep creation order
            column.tasks.sort_by_key(|t| std::cmp::Reverse(t.priority.rank()));
        }
        column.count = column.tasks.len();
    }

    Board { columns }
}

/// Loads and groups the user's board, optionally for a single project
pub async fn load_board(
    pool: &PgPool,
    user_id: Uuid,
    project_id: Option<Uuid>,
    sort: BoardSort,
) -> Result<Board, sqlx::Error> {
    let tasks = Task::list_by_user(pool, user_id, project_id).await?;
    let ids: Vec<Uuid> = tasks.iter().map(|t| t.id).collect();
    let assignees = TaskAssignment::assignees_for_tasks(pool, &ids).await?;

    Ok(build_board(tasks, assignees, sort))
}
