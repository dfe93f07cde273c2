//! Ordered task catalog with max-plus-one id assignment.

use tokio::sync::RwLock;

use super::{Task, TaskDraft, TaskId};
use crate::error::GatewayError;

/// The live set of tasks, in creation order.
///
/// Ids are assigned as one greater than the highest existing id (1 for an
/// empty catalog), so an id freed by deleting the highest task may be
/// reused — progress entries for deleted tasks are cascaded away by the
/// service, so a reused id starts incomplete for everyone.
#[derive(Debug, Default)]
pub struct TaskCatalog {
    tasks: RwLock<Vec<Task>>,
}

impl TaskCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a new task built from `draft`, assigning its id.
    pub async fn add(&self, draft: TaskDraft) -> Task {
        let mut tasks = self.tasks.write().await;
        let id = tasks
            .iter()
            .map(|t| t.id.as_u64())
            .max()
            .map_or(1, |max| max + 1);
        let task = Task {
            id: TaskId::from_raw(id),
            title: draft.title,
            description: draft.description,
            points: draft.points,
            link: draft.link,
        };
        tasks.push(task.clone());
        task
    }

    /// Returns the task with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::TaskNotFound`] if no task with the given ID
    /// exists.
    pub async fn get(&self, task_id: TaskId) -> Result<Task, GatewayError> {
        let tasks = self.tasks.read().await;
        tasks
            .iter()
            .find(|t| t.id == task_id)
            .cloned()
            .ok_or(GatewayError::TaskNotFound(task_id))
    }

    /// Replaces the stored task with a matching id wholesale.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::TaskNotFound`] if no task with the given ID
    /// exists.
    pub async fn update(&self, task: Task) -> Result<Task, GatewayError> {
        let mut tasks = self.tasks.write().await;
        let slot = tasks
            .iter_mut()
            .find(|t| t.id == task.id)
            .ok_or(GatewayError::TaskNotFound(task.id))?;
        *slot = task.clone();
        Ok(task)
    }

    /// Removes the task with the given id. Returns `false` if it did not
    /// exist.
    pub async fn remove(&self, task_id: TaskId) -> bool {
        let mut tasks = self.tasks.write().await;
        let before = tasks.len();
        tasks.retain(|t| t.id != task_id);
        tasks.len() < before
    }

    /// Returns the full task sequence in creation order.
    pub async fn list(&self) -> Vec<Task> {
        self.tasks.read().await.clone()
    }

    /// Replaces the whole catalog (snapshot restore).
    pub async fn replace_all(&self, tasks: Vec<Task>) {
        *self.tasks.write().await = tasks;
    }

    /// Returns the number of tasks.
    pub async fn len(&self) -> usize {
        self.tasks.read().await.len()
    }

    /// Returns `true` if the catalog contains no tasks.
    pub async fn is_empty(&self) -> bool {
        self.tasks.read().await.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn draft(title: &str, points: u32) -> TaskDraft {
        TaskDraft {
            title: title.to_string(),
            description: String::new(),
            points,
            link: None,
        }
    }

    #[tokio::test]
    async fn first_task_gets_id_one() {
        let catalog = TaskCatalog::new();
        let task = catalog.add(draft("a", 100)).await;
        assert_eq!(task.id, TaskId::from_raw(1));
    }

    #[tokio::test]
    async fn ids_are_max_plus_one() {
        let catalog = TaskCatalog::new();
        let _ = catalog.add(draft("a", 100)).await;
        let _ = catalog.add(draft("b", 100)).await;
        let c = catalog.add(draft("c", 100)).await;
        assert_eq!(c.id, TaskId::from_raw(3));

        // Deleting a lower id does not disturb the sequence.
        assert!(catalog.remove(TaskId::from_raw(1)).await);
        let d = catalog.add(draft("d", 100)).await;
        assert_eq!(d.id, TaskId::from_raw(4));
    }

    #[tokio::test]
    async fn update_replaces_wholesale() {
        let catalog = TaskCatalog::new();
        let task = catalog.add(draft("old title", 100)).await;

        let updated = catalog
            .update(Task {
                title: "new title".to_string(),
                points: 250,
                ..task
            })
            .await;
        assert!(updated.is_ok());

        let fetched = catalog.get(TaskId::from_raw(1)).await;
        let Ok(fetched) = fetched else {
            panic!("task not found");
        };
        assert_eq!(fetched.title, "new title");
        assert_eq!(fetched.points, 250);
    }

    #[tokio::test]
    async fn update_unknown_id_errors() {
        let catalog = TaskCatalog::new();
        let result = catalog
            .update(Task {
                id: TaskId::from_raw(9),
                title: "x".to_string(),
                description: String::new(),
                points: 1,
                link: None,
            })
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn remove_reports_existence() {
        let catalog = TaskCatalog::new();
        let task = catalog.add(draft("a", 100)).await;
        assert!(catalog.remove(task.id).await);
        assert!(!catalog.remove(task.id).await);
        assert!(catalog.is_empty().await);
    }

    #[tokio::test]
    async fn list_preserves_creation_order() {
        let catalog = TaskCatalog::new();
        let _ = catalog.add(draft("first", 1)).await;
        let _ = catalog.add(draft("second", 2)).await;

        let titles: Vec<String> = catalog.list().await.into_iter().map(|t| t.title).collect();
        assert_eq!(titles, vec!["first".to_string(), "second".to_string()]);
    }
}
