//! In-memory task list backed by [`TaskStore`]
//!
//! Every mutation is applied to a copy, saved, and only then swapped in, so
//! a failed save leaves the list exactly as it was.

use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use super::{
    model::{Priority, Subtask, Task},
    store::TaskStore,
    TodoError,
};
use crate::timer::Clock;

pub struct TaskList {
    store: TaskStore,
    clock: Arc<dyn Clock>,
    tasks: Vec<Task>,
    last_modified: Option<i64>,
}

impl TaskList {
    pub fn load(store: TaskStore, clock: Arc<dyn Clock>) -> Self {
        let doc = store.load();
        debug!("Loaded {} tasks", doc.tasks.len());
        Self {
            store,
            clock,
            tasks: doc.tasks,
            last_modified: doc.last_modified,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn last_modified(&self) -> Option<i64> {
        self.last_modified
    }

    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == task_id)
    }

    /// Append a task; a blank title is ignored and returns `None`
    pub fn add_task(&mut self, title: &str, priority: Priority) -> Result<Option<Task>, TodoError> {
        let title = title.trim();
        if title.is_empty() {
            return Ok(None);
        }

        let task = Task {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            completed: false,
            expanded: false,
            subtasks: Vec::new(),
            created_at: self.clock.now_ms(),
            order: self.tasks.len(),
            priority,
        };

        let created = task.clone();
        self.commit(|tasks| {
            tasks.push(task);
            Ok(())
        })?;
        info!("Added task {}", created.id);
        Ok(Some(created))
    }

    pub fn delete_task(&mut self, task_id: &str) -> Result<(), TodoError> {
        self.commit(|tasks| {
            let index = position(tasks, task_id)?;
            tasks.remove(index);
            Ok(())
        })
    }

    /// Rename a task; a blank title leaves it unchanged
    pub fn rename_task(&mut self, task_id: &str, title: &str) -> Result<(), TodoError> {
        let title = title.trim();
        self.commit(|tasks| {
            let task = find_task(tasks, task_id)?;
            if !title.is_empty() {
                task.title = title.to_string();
            }
            Ok(())
        })
    }

    pub fn set_priority(&mut self, task_id: &str, priority: Priority) -> Result<(), TodoError> {
        self.commit(|tasks| {
            find_task(tasks, task_id)?.priority = priority;
            Ok(())
        })
    }

    /// Flip completion; every subtask takes the new state
    pub fn toggle_task(&mut self, task_id: &str) -> Result<(), TodoError> {
        self.commit(|tasks| {
            let task = find_task(tasks, task_id)?;
            task.completed = !task.completed;
            for subtask in &mut task.subtasks {
                subtask.completed = task.completed;
            }
            Ok(())
        })
    }

    pub fn toggle_expanded(&mut self, task_id: &str) -> Result<(), TodoError> {
        self.commit(|tasks| {
            let task = find_task(tasks, task_id)?;
            task.expanded = !task.expanded;
            Ok(())
        })
    }

    /// Move the task at `from` to `to` and renumber every `order`
    pub fn reorder_tasks(&mut self, from: usize, to: usize) -> Result<(), TodoError> {
        self.commit(|tasks| {
            move_item(tasks, from, to)?;
            for (index, task) in tasks.iter_mut().enumerate() {
                task.order = index;
            }
            Ok(())
        })
    }

    /// Append a subtask and mark the parent incomplete; blank titles are ignored
    pub fn add_subtask(&mut self, task_id: &str, title: &str) -> Result<Option<Subtask>, TodoError> {
        let title = title.trim();
        if title.is_empty() {
            // Still report unknown parents
            self.task(task_id)
                .ok_or_else(|| TodoError::TaskNotFound(task_id.to_string()))?;
            return Ok(None);
        }

        let now = self.clock.now_ms();
        let created = self.commit(|tasks| {
            let task = find_task(tasks, task_id)?;
            let subtask = Subtask {
                id: Uuid::new_v4().to_string(),
                title: title.to_string(),
                completed: false,
                created_at: now,
                order: task.subtasks.len(),
            };
            task.subtasks.push(subtask.clone());
            task.completed = false;
            Ok(subtask)
        })?;
        Ok(Some(created))
    }

    /// Remove a subtask; the parent is complete afterwards iff subtasks
    /// remain and all of them are complete
    pub fn delete_subtask(&mut self, task_id: &str, subtask_id: &str) -> Result<(), TodoError> {
        self.commit(|tasks| {
            let task = find_task(tasks, task_id)?;
            let index = task
                .subtasks
                .iter()
                .position(|subtask| subtask.id == subtask_id)
                .ok_or_else(|| subtask_not_found(task_id, subtask_id))?;
            task.subtasks.remove(index);
            task.sync_completion_from_subtasks();
            Ok(())
        })
    }

    pub fn rename_subtask(
        &mut self,
        task_id: &str,
        subtask_id: &str,
        title: &str,
    ) -> Result<(), TodoError> {
        let title = title.trim();
        self.commit(|tasks| {
            let subtask = find_task(tasks, task_id)?
                .subtask_mut(subtask_id)
                .ok_or_else(|| subtask_not_found(task_id, subtask_id))?;
            if !title.is_empty() {
                subtask.title = title.to_string();
            }
            Ok(())
        })
    }

    pub fn toggle_subtask(&mut self, task_id: &str, subtask_id: &str) -> Result<(), TodoError> {
        self.commit(|tasks| {
            let task = find_task(tasks, task_id)?;
            let subtask = task
                .subtask_mut(subtask_id)
                .ok_or_else(|| subtask_not_found(task_id, subtask_id))?;
            subtask.completed = !subtask.completed;
            task.sync_completion_from_subtasks();
            Ok(())
        })
    }

    pub fn reorder_subtasks(&mut self, task_id: &str, from: usize, to: usize) -> Result<(), TodoError> {
        self.commit(|tasks| {
            let task = find_task(tasks, task_id)?;
            move_item(&mut task.subtasks, from, to)?;
            for (index, subtask) in task.subtasks.iter_mut().enumerate() {
                subtask.order = index;
            }
            Ok(())
        })
    }

    /// Drop every task and remove the stored document
    pub fn clear(&mut self) -> Result<(), TodoError> {
        self.store.clear()?;
        self.tasks.clear();
        self.last_modified = None;
        info!("Cleared all tasks");
        Ok(())
    }

    fn commit<T>(
        &mut self,
        mutate: impl FnOnce(&mut Vec<Task>) -> Result<T, TodoError>,
    ) -> Result<T, TodoError> {
        let mut next = self.tasks.clone();
        let out = mutate(&mut next)?;

        let now = self.clock.now_ms();
        self.store.save(&next, now)?;
        self.tasks = next;
        self.last_modified = Some(now);
        Ok(out)
    }
}

fn position(tasks: &[Task], task_id: &str) -> Result<usize, TodoError> {
    tasks
        .iter()
        .position(|task| task.id == task_id)
        .ok_or_else(|| TodoError::TaskNotFound(task_id.to_string()))
}

fn find_task<'a>(tasks: &'a mut [Task], task_id: &str) -> Result<&'a mut Task, TodoError> {
    tasks
        .iter_mut()
        .find(|task| task.id == task_id)
        .ok_or_else(|| TodoError::TaskNotFound(task_id.to_string()))
}

fn subtask_not_found(task_id: &str, subtask_id: &str) -> TodoError {
    TodoError::SubtaskNotFound {
        task: task_id.to_string(),
        subtask: subtask_id.to_string(),
    }
}

fn move_item<T>(items: &mut Vec<T>, from: usize, to: usize) -> Result<(), TodoError> {
    let len = items.len();
    if from >= len || to >= len {
        return Err(TodoError::IndexOutOfRange {
            index: from.max(to),
            len,
        });
    }
    let item = items.remove(from);
    items.insert(to, item);
    Ok(())
}
