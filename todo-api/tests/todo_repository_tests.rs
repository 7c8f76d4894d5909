use todo_api::todo::{Todo, TodoRepository};

mod common;

use common::setup;

#[tokio::test]
async fn can_create_todo() {
    let state = setup().await.expect("Failed to setup test context");

    let created = state
        .repository
        .create("Buy milk".to_string())
        .await
        .expect("Failed to create todo");

    assert_eq!(created, Todo::new(1, "Buy milk".to_string(), false));
}

#[tokio::test]
async fn can_get_created_todo_by_id() {
    let state = setup().await.expect("Failed to setup test context");
    let created = state
        .repository
        .create("Walk the dog".to_string())
        .await
        .expect("Failed to create todo");

    let fetched = state
        .repository
        .get_by_id(created.id())
        .await
        .expect("Failed to get todo");

    assert_eq!(fetched, Some(created));
}

#[tokio::test]
async fn returns_none_for_unknown_id() {
    let state = setup().await.expect("Failed to setup test context");

    let fetched = state
        .repository
        .get_by_id(12345)
        .await
        .expect("Lookup of a missing id should not fail");

    assert_eq!(fetched, None);
}

#[tokio::test]
async fn can_get_all_todos_with_distinct_ids() {
    let state = setup().await.expect("Failed to setup test context");
    let first = state.repository.create("A".to_string()).await.unwrap();
    let second = state.repository.create("B".to_string()).await.unwrap();

    let todos = state
        .repository
        .get_all()
        .await
        .expect("Failed to get all todos");

    assert_eq!(todos.len(), 2);
    assert_ne!(first.id(), second.id());
    assert!(todos.contains(&first));
    assert!(todos.contains(&second));
}

#[tokio::test]
async fn can_handle_empty_todo_list() {
    let state = setup().await.expect("Failed to setup test context");

    let todos = state.repository.get_all().await.unwrap();

    assert!(todos.is_empty());
}

#[tokio::test]
async fn can_get_todo_by_exact_task() {
    let state = setup().await.expect("Failed to setup test context");
    let first = state.repository.create("Pay rent".to_string()).await.unwrap();
    state.repository.create("Pay rent".to_string()).await.unwrap();
    state.repository.create("Pay bills".to_string()).await.unwrap();

    let found = state
        .repository
        .get_by_task("Pay rent".to_string())
        .await
        .unwrap();
    let missing = state
        .repository
        .get_by_task("pay rent".to_string())
        .await
        .unwrap();

    assert_eq!(found, Some(first));
    assert_eq!(missing, None);
}

#[tokio::test]
async fn can_update_task_and_status() {
    let state = setup().await.expect("Failed to setup test context");
    let created = state.repository.create("Buy milk".to_string()).await.unwrap();

    let updated = state
        .repository
        .update(created.id(), "Buy milk and eggs".to_string(), true)
        .await
        .expect("Failed to update todo");

    assert_eq!(
        updated,
        Some(Todo::new(created.id(), "Buy milk and eggs".to_string(), true))
    );
}

#[tokio::test]
async fn can_handle_update_when_todo_not_found() {
    let state = setup().await.expect("Failed to setup test context");
    let created = state.repository.create("Existing".to_string()).await.unwrap();

    let updated = state
        .repository
        .update(created.id() + 1, "Nope".to_string(), true)
        .await
        .unwrap();

    assert_eq!(updated, None);
}

#[tokio::test]
async fn toggling_twice_restores_status() {
    let state = setup().await.expect("Failed to setup test context");
    let created = state.repository.create("Stretch".to_string()).await.unwrap();

    let toggled = state
        .repository
        .toggle_status(created.id())
        .await
        .unwrap()
        .expect("Todo should exist");
    assert!(toggled.completed());

    let restored = state
        .repository
        .toggle_status(created.id())
        .await
        .unwrap()
        .expect("Todo should exist");
    assert_eq!(restored, created);
}

#[tokio::test]
async fn can_delete_todo_by_id() {
    let state = setup().await.expect("Failed to setup test context");
    let created = state.repository.create("Temporary".to_string()).await.unwrap();

    let deleted = state.repository.delete_by_id(created.id()).await.unwrap();
    let fetched = state.repository.get_by_id(created.id()).await.unwrap();
    let deleted_again = state.repository.delete_by_id(created.id()).await.unwrap();

    assert_eq!(deleted, Some(created));
    assert_eq!(fetched, None);
    assert_eq!(deleted_again, None);
}

#[tokio::test]
async fn never_reuses_ids_after_deletion() {
    let state = setup().await.expect("Failed to setup test context");
    let first = state.repository.create("First".to_string()).await.unwrap();
    state.repository.delete_by_id(first.id()).await.unwrap();

    let second = state.repository.create("Second".to_string()).await.unwrap();

    assert!(second.id() > first.id());
}

#[tokio::test]
async fn can_delete_todos_by_status() {
    let state = setup().await.expect("Failed to setup test context");
    let done = state.repository.create("Done".to_string()).await.unwrap();
    state
        .repository
        .toggle_status(done.id())
        .await
        .unwrap()
        .expect("Todo should exist");
    let open = state.repository.create("Open".to_string()).await.unwrap();

    state
        .repository
        .delete_by_status(true)
        .await
        .expect("Failed to delete completed todos");

    assert!(state.repository.get_by_status(true).await.unwrap().is_empty());
    assert_eq!(state.repository.get_by_status(false).await.unwrap(), vec![open]);
}

#[tokio::test]
async fn can_delete_todos_by_task() {
    let state = setup().await.expect("Failed to setup test context");
    state.repository.create("Spam".to_string()).await.unwrap();
    state.repository.create("Spam".to_string()).await.unwrap();
    let keep = state.repository.create("Keep".to_string()).await.unwrap();

    state
        .repository
        .delete_by_task("Spam".to_string())
        .await
        .unwrap();

    assert_eq!(state.repository.get_all().await.unwrap(), vec![keep]);
}

#[tokio::test]
async fn can_delete_all_todos() {
    let state = setup().await.expect("Failed to setup test context");
    state.repository.create("One".to_string()).await.unwrap();
    state.repository.create("Two".to_string()).await.unwrap();

    state.repository.delete_all().await.unwrap();

    assert!(state.repository.get_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn stores_empty_task_as_given() {
    let state = setup().await.expect("Failed to setup test context");

    let created = state.repository.create(String::new()).await.unwrap();

    assert_eq!(created.task(), "");
}

#[tokio::test]
async fn seeds_demo_todos_only_into_empty_table() {
    let state = setup().await.expect("Failed to setup test context");

    state.repository.seed_demo_todos().await.unwrap();
    state.repository.seed_demo_todos().await.unwrap();
    assert_eq!(state.repository.get_all().await.unwrap().len(), 3);

    state.repository.delete_all().await.unwrap();
    state.repository.create("Mine".to_string()).await.unwrap();
    state.repository.seed_demo_todos().await.unwrap();
    assert_eq!(state.repository.get_all().await.unwrap().len(), 1);
}
