use super::{RepositoryError, Todo, TodoRepository};
use crate::storage::{StorageError, StorageHandle};
use async_trait::async_trait;
use sea_orm::{DbErr, FromQueryResult, Value};
use std::sync::Arc;

const INSERT_TODO: &str = "INSERT INTO todos (task) VALUES ($1) RETURNING id, task, completed";
const SELECT_ALL: &str = "SELECT id, task, completed FROM todos";
const SELECT_BY_ID: &str = "SELECT id, task, completed FROM todos WHERE id = $1";
const SELECT_BY_TASK: &str =
    "SELECT id, task, completed FROM todos WHERE task = $1 ORDER BY id LIMIT 1";
const SELECT_BY_STATUS: &str = "SELECT id, task, completed FROM todos WHERE completed = $1";
const UPDATE_TODO: &str =
    "UPDATE todos SET task = $1, completed = $2 WHERE id = $3 RETURNING id, task, completed";
const TOGGLE_STATUS: &str =
    "UPDATE todos SET completed = NOT completed WHERE id = $1 RETURNING id, task, completed";
const DELETE_BY_ID: &str = "DELETE FROM todos WHERE id = $1 RETURNING id, task, completed";
const DELETE_ALL: &str = "DELETE FROM todos";
const DELETE_BY_STATUS: &str = "DELETE FROM todos WHERE completed = $1";
const DELETE_BY_TASK: &str = "DELETE FROM todos WHERE task = $1";
const SEED_DEMO_TODOS: &str = "INSERT INTO todos (task, completed) \
     SELECT seed.task, seed.completed FROM (VALUES \
     ('Read the API docs at /swagger-ui', true), \
     ('Create your first todo', false), \
     ('Toggle a todo with PUT /todos/toggle/{id}', false)) \
     AS seed(task, completed) \
     WHERE NOT EXISTS (SELECT 1 FROM todos)";

#[derive(Debug, FromQueryResult)]
struct TodoRow {
    id: i32,
    task: String,
    completed: bool,
}

impl From<TodoRow> for Todo {
    fn from(row: TodoRow) -> Self {
        Todo::new(row.id, row.task, row.completed)
    }
}

/// [`TodoRepository`] that issues one SQL statement per operation through a
/// shared [`StorageHandle`].
#[derive(Debug, Clone)]
pub struct SqlTodoRepository {
    storage: Arc<StorageHandle>,
}

impl SqlTodoRepository {
    pub fn new(storage: Arc<StorageHandle>) -> Self {
        Self { storage }
    }

    /// Inserts the demo todos, but only into an empty table.
    #[tracing::instrument(skip(self))]
    pub async fn seed_demo_todos(&self) -> Result<(), RepositoryError> {
        self.run("seed demo todos", SEED_DEMO_TODOS, vec![]).await?;
        tracing::info!("Demo todos seeded");
        Ok(())
    }

    async fn run(
        &self,
        operation: &'static str,
        sql: &str,
        values: Vec<Value>,
    ) -> Result<Vec<Todo>, RepositoryError> {
        let rows = self
            .storage
            .execute(sql, values)
            .await
            .map_err(|err| RepositoryError::new(operation, err))?;

        rows.iter()
            .map(|row| TodoRow::from_query_result(row, "").map(Todo::from))
            .collect::<Result<Vec<_>, DbErr>>()
            .map_err(|err| RepositoryError::new(operation, StorageError::Query(err)))
    }

    async fn run_optional(
        &self,
        operation: &'static str,
        sql: &str,
        values: Vec<Value>,
    ) -> Result<Option<Todo>, RepositoryError> {
        Ok(self.run(operation, sql, values).await?.into_iter().next())
    }
}

#[async_trait]
impl TodoRepository for SqlTodoRepository {
    #[tracing::instrument(skip(self))]
    async fn create(&self, task: String) -> Result<Todo, RepositoryError> {
        const OPERATION: &str = "create todo";
        self.run_optional(OPERATION, INSERT_TODO, vec![task.into()])
            .await?
            .ok_or_else(|| {
                RepositoryError::new(
                    OPERATION,
                    StorageError::Query(DbErr::RecordNotInserted),
                )
            })
    }

    #[tracing::instrument(skip(self))]
    async fn get_all(&self) -> Result<Vec<Todo>, RepositoryError> {
        self.run("get all todos", SELECT_ALL, vec![]).await
    }

    #[tracing::instrument(skip(self))]
    async fn get_by_id(&self, id: i32) -> Result<Option<Todo>, RepositoryError> {
        self.run_optional("get todo by id", SELECT_BY_ID, vec![id.into()])
            .await
    }

    #[tracing::instrument(skip(self))]
    async fn get_by_task(&self, task: String) -> Result<Option<Todo>, RepositoryError> {
        self.run_optional("get todo by task", SELECT_BY_TASK, vec![task.into()])
            .await
    }

    #[tracing::instrument(skip(self))]
    async fn get_by_status(&self, completed: bool) -> Result<Vec<Todo>, RepositoryError> {
        self.run("get todos by status", SELECT_BY_STATUS, vec![completed.into()])
            .await
    }

    #[tracing::instrument(skip(self))]
    async fn update(
        &self,
        id: i32,
        task: String,
        completed: bool,
    ) -> Result<Option<Todo>, RepositoryError> {
        self.run_optional(
            "update todo",
            UPDATE_TODO,
            vec![task.into(), completed.into(), id.into()],
        )
        .await
    }

    #[tracing::instrument(skip(self))]
    async fn toggle_status(&self, id: i32) -> Result<Option<Todo>, RepositoryError> {
        self.run_optional("toggle todo status", TOGGLE_STATUS, vec![id.into()])
            .await
    }

    #[tracing::instrument(skip(self))]
    async fn delete_by_id(&self, id: i32) -> Result<Option<Todo>, RepositoryError> {
        self.run_optional("delete todo by id", DELETE_BY_ID, vec![id.into()])
            .await
    }

    #[tracing::instrument(skip(self))]
    async fn delete_all(&self) -> Result<(), RepositoryError> {
        self.run("delete all todos", DELETE_ALL, vec![]).await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn delete_by_status(&self, completed: bool) -> Result<(), RepositoryError> {
        self.run("delete todos by status", DELETE_BY_STATUS, vec![completed.into()])
            .await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn delete_by_task(&self, task: String) -> Result<(), RepositoryError> {
        self.run("delete todos by task", DELETE_BY_TASK, vec![task.into()])
            .await?;
        Ok(())
    }
}
