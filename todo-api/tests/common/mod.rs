use std::sync::Arc;
use testcontainers_modules::testcontainers::runners::AsyncRunner;
use testcontainers_modules::{postgres, testcontainers};
use todo_api::config::Config;
use todo_api::storage::StorageHandle;
use todo_api::todo::SqlTodoRepository;

/// Test context backed by a throwaway PostgreSQL container.
pub struct TestContext {
    #[allow(dead_code)] // container is kept to ensure it's not dropped
    pub container: testcontainers::ContainerAsync<postgres::Postgres>,
    #[allow(dead_code)] // only the storage tests use the handle directly
    pub storage: Arc<StorageHandle>,
    pub repository: SqlTodoRepository,
}

pub const DEFAULT_PASSWORD: &str = "postgres";

pub async fn setup_container(
    password: &str,
) -> anyhow::Result<testcontainers::ContainerAsync<postgres::Postgres>> {
    let container = postgres::Postgres::default()
        .with_password(password)
        .start()
        .await?;
    Ok(container)
}

pub async fn setup_storage(
    container: &testcontainers::ContainerAsync<postgres::Postgres>,
    password: &str,
) -> anyhow::Result<StorageHandle> {
    let config = Config {
        db_url: None,
        db_user: "postgres".to_string(),
        db_password: password.to_string(),
        db_host: container.get_host().await?.to_string(),
        db_name: "postgres".to_string(),
        db_port: container.get_host_port_ipv4(5432).await?,
        db_max_connections: 5,
        port: 0,
        seed_demo_todos: false,
    };
    let storage = StorageHandle::connect(&config).await?;
    storage.ensure_schema().await?;
    Ok(storage)
}

pub async fn setup() -> anyhow::Result<TestContext> {
    // Allow multiple calls to init for tests.
    let _ = tracing_subscriber::fmt().with_env_filter("debug").try_init();
    let container = setup_container(DEFAULT_PASSWORD).await?;
    let storage = Arc::new(setup_storage(&container, DEFAULT_PASSWORD).await?);
    let repository = SqlTodoRepository::new(storage.clone());
    Ok(TestContext {
        container,
        storage,
        repository,
    })
}
