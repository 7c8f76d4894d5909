use crate::storage::StorageError;
use async_trait::async_trait;

pub mod api;
mod repository;

pub use repository::SqlTodoRepository;

/// A single todo item.
#[derive(Debug, PartialEq, Clone, Eq, Hash)]
pub struct Todo {
    id: i32,
    task: String,
    completed: bool,
}

impl Todo {
    pub fn new(id: i32, task: String, completed: bool) -> Self {
        Self {
            id,
            task,
            completed,
        }
    }

    /// Returns the ID assigned by the database.
    pub fn id(&self) -> i32 {
        self.id
    }

    /// Returns the task description.
    pub fn task(&self) -> &str {
        &self.task
    }

    /// Returns whether the todo has been completed.
    pub fn completed(&self) -> bool {
        self.completed
    }
}

/// Error returned by every [`TodoRepository`] operation when the storage layer fails.
///
/// Carries the name of the attempted operation and the underlying [`StorageError`].
#[derive(Debug, thiserror::Error)]
#[error("Failed to {operation}: {source}")]
pub struct RepositoryError {
    operation: &'static str,
    #[source]
    source: StorageError,
}

impl RepositoryError {
    pub fn new(operation: &'static str, source: StorageError) -> Self {
        Self { operation, source }
    }

    /// Returns the name of the operation that failed.
    pub fn operation(&self) -> &'static str {
        self.operation
    }

    /// Returns the underlying storage failure.
    pub fn storage_error(&self) -> &StorageError {
        &self.source
    }
}

/// Persistence operations for todos.
///
/// Lookups that match nothing return `Ok(None)` or an empty list; `Err` is reserved
/// for storage failures.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TodoRepository: Send + Sync {
    /// Inserts a new, not yet completed todo.
    async fn create(&self, task: String) -> Result<Todo, RepositoryError>;

    /// Returns every todo in no particular order.
    async fn get_all(&self) -> Result<Vec<Todo>, RepositoryError>;

    async fn get_by_id(&self, id: i32) -> Result<Option<Todo>, RepositoryError>;

    /// Returns the todo whose task matches exactly. When several match, the one
    /// with the lowest ID wins.
    async fn get_by_task(&self, task: String) -> Result<Option<Todo>, RepositoryError>;

    async fn get_by_status(&self, completed: bool) -> Result<Vec<Todo>, RepositoryError>;

    /// Overwrites both the task and the completed flag.
    async fn update(
        &self,
        id: i32,
        task: String,
        completed: bool,
    ) -> Result<Option<Todo>, RepositoryError>;

    /// Flips the completed flag.
    async fn toggle_status(&self, id: i32) -> Result<Option<Todo>, RepositoryError>;

    /// Removes a todo and returns it as it was before deletion.
    async fn delete_by_id(&self, id: i32) -> Result<Option<Todo>, RepositoryError>;

    async fn delete_all(&self) -> Result<(), RepositoryError>;

    async fn delete_by_status(&self, completed: bool) -> Result<(), RepositoryError>;

    async fn delete_by_task(&self, task: String) -> Result<(), RepositoryError>;
}
