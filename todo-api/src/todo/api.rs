use crate::todo::{RepositoryError, Todo, TodoRepository};
use axum::{
    Router,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, put},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

/// Shared state for the todo handlers.
#[derive(Clone)]
pub struct TodoState {
    pub repository: Arc<dyn TodoRepository>,
}

impl TodoState {
    pub fn new(repository: Arc<dyn TodoRepository>) -> Self {
        Self { repository }
    }
}

/// JSON representation of a Todo for API responses.
#[derive(Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TodoJson {
    /// Identifier assigned by the server
    pub id: i32,
    /// What needs to be done
    pub task: String,
    /// Whether the todo has been completed
    pub completed: bool,
}

impl From<Todo> for TodoJson {
    fn from(todo: Todo) -> Self {
        Self {
            id: todo.id(),
            task: todo.task().to_string(),
            completed: todo.completed(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTodoRequest {
    /// What needs to be done
    task: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateTodoRequest {
    /// New task description
    task: String,
    /// New completed flag
    completed: bool,
}

/// Query parameters for listing todos.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListTodosQuery {
    /// Only return todos with this completed flag
    #[serde(default)]
    completed: Option<bool>,
}

/// Query parameters for looking a todo up by its task.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchTodoQuery {
    /// Exact task text to match
    task: String,
}

/// Query parameters selecting which todos to delete. Without either filter every
/// todo is deleted.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DeleteTodosQuery {
    /// Delete todos with this completed flag
    #[serde(default)]
    completed: Option<bool>,
    /// Delete todos whose task matches exactly
    #[serde(default)]
    task: Option<String>,
}

/// JSON response for API errors
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Errors produced by the todo handlers.
#[derive(Debug, thiserror::Error)]
pub enum TodoApiError {
    #[error("'{0}' is not a valid todo ID")]
    InvalidId(String),
    #[error("Task must not be empty")]
    EmptyTask,
    #[error("Invalid request body: {0}")]
    InvalidBody(#[from] JsonRejection),
    #[error("Filter by either 'completed' or 'task', not both")]
    AmbiguousFilter,
    #[error("Todo with ID {0} not found")]
    NotFound(i32),
    #[error("No todo with task '{0}'")]
    TaskNotFound(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl IntoResponse for TodoApiError {
    fn into_response(self) -> Response {
        let (status_code, error) = match &self {
            TodoApiError::InvalidId(_) => (StatusCode::BAD_REQUEST, "INVALID_ID"),
            TodoApiError::EmptyTask => (StatusCode::BAD_REQUEST, "EMPTY_TASK"),
            TodoApiError::InvalidBody(rejection) => (rejection.status(), "INVALID_BODY"),
            TodoApiError::AmbiguousFilter => (StatusCode::BAD_REQUEST, "AMBIGUOUS_FILTER"),
            TodoApiError::NotFound(_) | TodoApiError::TaskNotFound(_) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND")
            }
            TodoApiError::Repository(err) => {
                tracing::error!("Todo request failed: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };

        let message = match self {
            TodoApiError::Repository(_) => {
                "An unexpected error occurred while processing your request. Please try again later."
                    .to_string()
            }
            other => other.to_string(),
        };

        (
            status_code,
            Json(ErrorResponse {
                error: error.to_string(),
                message,
            }),
        )
            .into_response()
    }
}

fn parse_id(raw: &str) -> Result<i32, TodoApiError> {
    raw.parse().map_err(|_| TodoApiError::InvalidId(raw.to_string()))
}

fn validate_task(task: String) -> Result<String, TodoApiError> {
    if task.trim().is_empty() {
        return Err(TodoApiError::EmptyTask);
    }
    Ok(task)
}

/// Handler for GET /todos - Returns all todos, optionally filtered by status.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/todos",
    params(ListTodosQuery),
    responses(
        (status = 200, description = "Successfully retrieved todos", body = Vec<TodoJson>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Todos"
)]
pub async fn list_todos_handler(
    State(state): State<TodoState>,
    Query(query): Query<ListTodosQuery>,
) -> Result<Json<Vec<TodoJson>>, TodoApiError> {
    let todos = match query.completed {
        Some(completed) => state.repository.get_by_status(completed).await?,
        None => state.repository.get_all().await?,
    };
    Ok(Json(todos.into_iter().map(TodoJson::from).collect()))
}

/// Handler for GET /todos/{id}.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/todos/{id}",
    params(("id" = i32, Path, description = "Todo ID")),
    responses(
        (status = 200, description = "The todo", body = TodoJson),
        (status = 400, description = "Malformed ID", body = ErrorResponse),
        (status = 404, description = "Todo not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Todos"
)]
pub async fn get_todo_handler(
    State(state): State<TodoState>,
    Path(id): Path<String>,
) -> Result<Json<TodoJson>, TodoApiError> {
    let id = parse_id(&id)?;
    let todo = state
        .repository
        .get_by_id(id)
        .await?
        .ok_or(TodoApiError::NotFound(id))?;
    Ok(Json(TodoJson::from(todo)))
}

/// Handler for GET /todos/search - Finds a todo by its exact task text.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/todos/search",
    params(SearchTodoQuery),
    responses(
        (status = 200, description = "The matching todo", body = TodoJson),
        (status = 400, description = "Empty task", body = ErrorResponse),
        (status = 404, description = "No todo has this task", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Todos"
)]
pub async fn search_todo_handler(
    State(state): State<TodoState>,
    Query(query): Query<SearchTodoQuery>,
) -> Result<Json<TodoJson>, TodoApiError> {
    let task = validate_task(query.task)?;
    let todo = state
        .repository
        .get_by_task(task.clone())
        .await?
        .ok_or(TodoApiError::TaskNotFound(task))?;
    Ok(Json(TodoJson::from(todo)))
}

/// Handler for POST /todos.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    post,
    path = "/todos",
    request_body = CreateTodoRequest,
    responses(
        (status = 201, description = "Todo created", body = TodoJson),
        (status = 400, description = "Empty task", body = ErrorResponse),
        (status = 422, description = "Malformed request body", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Todos"
)]
pub async fn create_todo_handler(
    State(state): State<TodoState>,
    payload: Result<Json<CreateTodoRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TodoJson>), TodoApiError> {
    let Json(payload) = payload?;
    let task = validate_task(payload.task)?;
    let todo = state.repository.create(task).await?;
    tracing::info!("Created todo {}", todo.id());
    Ok((StatusCode::CREATED, Json(TodoJson::from(todo))))
}

/// Handler for PUT /todos/{id} - Replaces the task and completed flag.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    put,
    path = "/todos/{id}",
    params(("id" = i32, Path, description = "Todo ID")),
    request_body = UpdateTodoRequest,
    responses(
        (status = 200, description = "Todo updated", body = TodoJson),
        (status = 400, description = "Malformed ID or empty task", body = ErrorResponse),
        (status = 404, description = "Todo not found", body = ErrorResponse),
        (status = 422, description = "Malformed request body", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Todos"
)]
pub async fn update_todo_handler(
    State(state): State<TodoState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateTodoRequest>, JsonRejection>,
) -> Result<Json<TodoJson>, TodoApiError> {
    let id = parse_id(&id)?;
    let Json(payload) = payload?;
    let task = validate_task(payload.task)?;
    let todo = state
        .repository
        .update(id, task, payload.completed)
        .await?
        .ok_or(TodoApiError::NotFound(id))?;
    Ok(Json(TodoJson::from(todo)))
}

/// Handler for PUT /todos/toggle/{id}.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    put,
    path = "/todos/toggle/{id}",
    params(("id" = i32, Path, description = "Todo ID")),
    responses(
        (status = 200, description = "Todo toggled", body = TodoJson),
        (status = 400, description = "Malformed ID", body = ErrorResponse),
        (status = 404, description = "Todo not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Todos"
)]
pub async fn toggle_todo_handler(
    State(state): State<TodoState>,
    Path(id): Path<String>,
) -> Result<Json<TodoJson>, TodoApiError> {
    let id = parse_id(&id)?;
    let todo = state
        .repository
        .toggle_status(id)
        .await?
        .ok_or(TodoApiError::NotFound(id))?;
    Ok(Json(TodoJson::from(todo)))
}

/// Handler for DELETE /todos/{id} - Returns the deleted todo.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    delete,
    path = "/todos/{id}",
    params(("id" = i32, Path, description = "Todo ID")),
    responses(
        (status = 200, description = "Todo deleted", body = TodoJson),
        (status = 400, description = "Malformed ID", body = ErrorResponse),
        (status = 404, description = "Todo not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Todos"
)]
pub async fn delete_todo_handler(
    State(state): State<TodoState>,
    Path(id): Path<String>,
) -> Result<Json<TodoJson>, TodoApiError> {
    let id = parse_id(&id)?;
    let todo = state
        .repository
        .delete_by_id(id)
        .await?
        .ok_or(TodoApiError::NotFound(id))?;
    Ok(Json(TodoJson::from(todo)))
}

/// Handler for DELETE /todos - Deletes todos matching the filter, or all of them.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    delete,
    path = "/todos",
    params(DeleteTodosQuery),
    responses(
        (status = 204, description = "Matching todos deleted"),
        (status = 400, description = "Both filters supplied or empty task", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Todos"
)]
pub async fn delete_todos_handler(
    State(state): State<TodoState>,
    Query(query): Query<DeleteTodosQuery>,
) -> Result<StatusCode, TodoApiError> {
    match (query.completed, query.task) {
        (Some(_), Some(_)) => return Err(TodoApiError::AmbiguousFilter),
        (Some(completed), None) => state.repository.delete_by_status(completed).await?,
        (None, Some(task)) => {
            let task = validate_task(task)?;
            state.repository.delete_by_task(task).await?
        }
        (None, None) => state.repository.delete_all().await?,
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Creates and returns the todos router.
pub fn create_todo_router(state: TodoState) -> Router {
    Router::new()
        .route(
            "/todos",
            get(list_todos_handler)
                .post(create_todo_handler)
                .delete(delete_todos_handler),
        )
        .route("/todos/search", get(search_todo_handler))
        .route("/todos/toggle/{id}", put(toggle_todo_handler))
        .route(
            "/todos/{id}",
            get(get_todo_handler)
                .put(update_todo_handler)
                .delete(delete_todo_handler),
        )
        .with_state(state)
}
