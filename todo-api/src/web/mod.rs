use axum::Router;
use axum::routing::get;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::Config;
use crate::storage::StorageHandle;
use crate::todo::SqlTodoRepository;
use crate::todo::api::{self, TodoState, create_todo_router};

/// OpenAPI description of the todo routes, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        api::list_todos_handler,
        api::get_todo_handler,
        api::search_todo_handler,
        api::create_todo_handler,
        api::update_todo_handler,
        api::toggle_todo_handler,
        api::delete_todo_handler,
        api::delete_todos_handler,
    ),
    components(schemas(
        api::TodoJson,
        api::CreateTodoRequest,
        api::UpdateTodoRequest,
        api::ErrorResponse
    )),
    tags((name = "Todos", description = "Create, read, update and delete todos"))
)]
pub struct ApiDoc;

#[tracing::instrument(skip(config))]
pub async fn start_web_server(config: Config) -> anyhow::Result<()> {
    let server_address = format!("0.0.0.0:{}", &config.port);
    let listener = tokio::net::TcpListener::bind(&server_address).await?;
    tracing::info!("Web server running on http://{}", server_address);

    let storage = Arc::new(StorageHandle::connect(&config).await?);
    storage.ensure_schema().await?;

    let repository = SqlTodoRepository::new(storage.clone());
    if config.seed_demo_todos {
        repository.seed_demo_todos().await?;
    }

    let app = create_app(TodoState::new(Arc::new(repository)));

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    storage.close().await;
    Ok(())
}

/// Builds the full application: todo routes, health check and API docs, wrapped
/// in HTTP tracing and CORS layers.
pub fn create_app(todo_state: TodoState) -> Router {
    Router::new()
        .route("/health", get(health_check_handler))
        .merge(create_todo_router(todo_state))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}

#[tracing::instrument]
pub async fn health_check_handler() -> &'static str {
    "OK"
}

/// Resolves on Ctrl+C or, on unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
