use std::sync::Arc;

use shared::{to_entity, to_transport, Task, TaskData};
use tracing::info;

use crate::error::AppError;
use crate::store::TaskRepository;

/// Task use cases on top of a [`TaskRepository`].
pub struct TaskService {
    repo: Arc<dyn TaskRepository>,
}

impl TaskService {
    pub fn new(repo: Arc<dyn TaskRepository>) -> Self {
        Self { repo }
    }

    pub fn find_all(&self) -> Result<Vec<TaskData>, AppError> {
        let tasks = self.repo.find_all()?;
        Ok(tasks.iter().map(|t| to_transport(Some(t))).collect())
    }

    pub fn find_by_id(&self, id: i64) -> Result<TaskData, AppError> {
        let task = self.repo.find_by_id(id)?.ok_or(AppError::NotFound(id))?;
        Ok(to_transport(Some(&task)))
    }

    pub fn create(&self, data: &TaskData) -> Result<TaskData, AppError> {
        let task = to_entity(Some(data));
        check(&task)?;
        let saved = self.repo.insert(task)?;
        info!(task_id = saved.id, "task created");
        Ok(to_transport(Some(&saved)))
    }

    /// Full replace: fields missing from `data` are not carried over from the
    /// stored row. The id always comes from `id`, never from `data`.
    pub fn update(&self, id: i64, data: &TaskData) -> Result<TaskData, AppError> {
        let task = Task {
            id,
            ..to_entity(Some(data))
        };
        if let Err(e) = check(&task) {
            // An unknown id outranks a bad body.
            return match self.repo.find_by_id(id)? {
                Some(_) => Err(e),
                None => Err(AppError::NotFound(id)),
            };
        }
        let saved = self.repo.replace(task)?.ok_or(AppError::NotFound(id))?;
        info!(task_id = saved.id, "task updated");
        Ok(to_transport(Some(&saved)))
    }

    pub fn delete(&self, id: i64) -> Result<(), AppError> {
        self.repo.delete_by_id(id)?;
        info!(task_id = id, "task deleted");
        Ok(())
    }
}

fn check(task: &Task) -> Result<(), AppError> {
    let violations = task.violations();
    if violations.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(violations))
    }
}
