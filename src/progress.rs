//! Task roll-up and the detail panel's field edits.
//!
//! Every function returns a whole replacement node; callers commit it through
//! `NodeSet::replace`, so the task change and the recomputed progress land
//! together.

use serde::Deserialize;

use crate::error::{OrbitError, Result};
use crate::model::{Node, Priority, Status, Task, TaskStatus};

/// Task fields as edited in the task dialog.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub progress: u32,
    pub due_date: Option<String>,
    pub linked_kpis: Vec<String>,
    pub linked_milestones: Vec<String>,
    pub assignees: Vec<String>,
}

impl TaskDraft {
    fn into_task(self, id: String) -> Task {
        let progress = self.progress.min(100);
        Task {
            id,
            title: self.title,
            description: self.description,
            priority: self.priority,
            status: TaskStatus::from_progress(progress),
            progress,
            due_date: self.due_date,
            linked_kpis: self.linked_kpis,
            linked_milestones: self.linked_milestones,
            assignees: self.assignees,
        }
    }
}

/// Rounded mean of the tasks' progress; `None` when there are no tasks.
pub fn rollup(tasks: &[Task]) -> Option<u32> {
    if tasks.is_empty() {
        return None;
    }
    let total: u64 = tasks.iter().map(|t| u64::from(t.progress)).sum();
    Some((total as f64 / tasks.len() as f64).round() as u32)
}

/// Add a task (`editing == None`) or overwrite the task with id `editing`,
/// then recompute the node's progress.
pub fn save_task(node: &Node, draft: TaskDraft, editing: Option<&str>) -> Result<Node> {
    let mut updated = node.clone();
    match editing {
        Some(task_id) => {
            let slot = updated
                .tasks
                .iter_mut()
                .find(|t| t.id == task_id)
                .ok_or_else(|| OrbitError::UnknownTask {
                    node: node.id.clone(),
                    task: task_id.to_string(),
                })?;
            *slot = draft.into_task(task_id.to_string());
        }
        None => {
            let id = next_task_id(node);
            updated.tasks.push(draft.into_task(id));
        }
    }
    if let Some(p) = rollup(&updated.tasks) {
        updated.progress = p;
    }
    Ok(updated)
}

/// Drop a task and recompute progress. An emptied task list keeps the last value.
pub fn remove_task(node: &Node, task_id: &str) -> Result<Node> {
    let mut updated = node.clone();
    let before = updated.tasks.len();
    updated.tasks.retain(|t| t.id != task_id);
    if updated.tasks.len() == before {
        return Err(OrbitError::UnknownTask { node: node.id.clone(), task: task_id.to_string() });
    }
    if let Some(p) = rollup(&updated.tasks) {
        updated.progress = p;
    }
    Ok(updated)
}

fn next_task_id(node: &Node) -> String {
    let mut n = node.tasks.len() + 1;
    loop {
        let id = format!("{}-task-{}", node.id, n);
        if node.tasks.iter().all(|t| t.id != id) {
            return id;
        }
        n += 1;
    }
}

/// Progress slider: rounded and clamped to 0..=100.
pub fn set_progress(node: &Node, value: f64) -> Node {
    Node { progress: value.round().clamp(0.0, 100.0) as u32, ..node.clone() }
}

/// Budget slider: rounded and clamped to 0..=budget.
pub fn set_spent(node: &Node, value: f64) -> Node {
    Node { spent: value.round().clamp(0.0, node.budget.max(0.0)), ..node.clone() }
}

pub fn set_status(node: &Node, status: Status) -> Node {
    Node { status, ..node.clone() }
}

/// Spent as a rounded percentage of budget; `None` ("N/A") for a zero budget.
pub fn budget_utilization(node: &Node) -> Option<u32> {
    if node.budget <= 0.0 {
        return None;
    }
    Some((node.spent / node.budget * 100.0).round().max(0.0) as u32)
}
