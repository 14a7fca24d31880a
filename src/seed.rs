use crate::models::NewTask;
use std::collections::HashMap;

/// Rows inserted into an empty `tasks` table on first start.
pub const DEFAULT_TASKS: [NewTask<'static>; 9] = [
    NewTask {
        id: 1,
        name: "25 Apps (Time - 2.5 hrs)",
        parent_id: None,
        time_minutes: 150,
        position: 1,
    },
    NewTask {
        id: 2,
        name: "15 with claude and Linkedin 15 connections for each app",
        parent_id: Some(1),
        time_minutes: 90,
        position: 1,
    },
    NewTask {
        id: 3,
        name: "10 generics",
        parent_id: Some(1),
        time_minutes: 60,
        position: 2,
    },
    NewTask {
        id: 4,
        name: "Leetcode Min- 2 to 5 (Time 1.5 to 2 hrs)",
        parent_id: None,
        time_minutes: 90,
        position: 2,
    },
    NewTask {
        id: 5,
        name: "Projects (Data engineer (Resume), AI, ML) and push to Github - 2 hrs",
        parent_id: None,
        time_minutes: 120,
        position: 3,
    },
    NewTask {
        id: 6,
        name: "Learn AI (Andrew NG) 30 mins",
        parent_id: None,
        time_minutes: 30,
        position: 4,
    },
    NewTask {
        id: 7,
        name: "Learn Data Engineering other tools 1 hr",
        parent_id: None,
        time_minutes: 60,
        position: 5,
    },
    NewTask {
        id: 8,
        name: "Learn ML - 1 hr",
        parent_id: None,
        time_minutes: 60,
        position: 6,
    },
    NewTask {
        id: 9,
        name: "Learn MLOPS - 30 mins",
        parent_id: None,
        time_minutes: 30,
        position: 7,
    },
];

/// Checks that a task set forms at most two levels: every parent exists, is
/// not the task itself, and is a root task. Two levels rule out cycles.
pub fn validate_hierarchy(tasks: &[NewTask<'_>]) -> Result<(), String> {
    let parents: HashMap<i32, Option<i32>> = tasks.iter().map(|t| (t.id, t.parent_id)).collect();

    if parents.len() != tasks.len() {
        return Err("duplicate task id in seed data".to_string());
    }

    for task in tasks {
        let Some(parent) = task.parent_id else {
            continue;
        };
        if parent == task.id {
            return Err(format!("task {} is its own parent", task.id));
        }
        match parents.get(&parent) {
            None => {
                return Err(format!(
                    "task {} references missing parent {}",
                    task.id, parent
                ))
            }
            Some(Some(grandparent)) => {
                return Err(format!(
                    "task {} nests under {} which already has parent {}",
                    task.id, parent, grandparent
                ))
            }
            Some(None) => {}
        }
    }

    Ok(())
}
