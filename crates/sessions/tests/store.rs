//! Integration tests for the session repository.

use ie_domain::error::Error;
use ie_sessions::{ChatRole, SessionStore};

fn store_in(dir: &tempfile::TempDir) -> SessionStore {
    SessionStore::new(dir.path(), 50).unwrap()
}

#[tokio::test]
async fn commit_creates_session_lazily_with_derived_title() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);

    assert!(store.get("s1").is_none());

    store
        .commit_turn("s1", "What's the weather in Tokyo?", Some("It's 18°C and cloudy"))
        .await
        .unwrap();

    let session = store.get("s1").unwrap();
    assert_eq!(session.title.as_deref(), Some("What's the weather in Tokyo?"));

    let messages = store.list_messages("s1").await.unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, ChatRole::Human);
    assert_eq!(messages[0].content, "What's the weather in Tokyo?");
    assert_eq!(messages[1].role, ChatRole::Ai);
    assert_eq!(messages[1].content, "It's 18°C and cloudy");
    assert!(messages[0].created_at <= messages[1].created_at);
}

#[tokio::test]
async fn commit_without_final_text_persists_human_only() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);

    store.commit_turn("s1", "hello?", None).await.unwrap();
    store.commit_turn("s1", "anyone?", Some("")).await.unwrap();

    let messages = store.list_messages("s1").await.unwrap();
    assert_eq!(messages.len(), 2);
    assert!(messages.iter().all(|m| m.role == ChatRole::Human));
}

#[tokio::test]
async fn title_is_derived_once_from_the_first_message() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);

    store.commit_turn("s1", "first question", Some("answer")).await.unwrap();
    store.commit_turn("s1", "second question", Some("answer")).await.unwrap();

    assert_eq!(store.get("s1").unwrap().title.as_deref(), Some("first question"));
}

#[tokio::test]
async fn history_reads_are_idempotent_and_ordered() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);

    for i in 0..3 {
        store
            .commit_turn("s1", &format!("q{i}"), Some(&format!("a{i}")))
            .await
            .unwrap();
    }

    let first = store.list_messages("s1").await.unwrap();
    let second = store.list_messages("s1").await.unwrap();
    assert_eq!(first.len(), 6);
    let contents: Vec<&str> = first.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["q0", "a0", "q1", "a1", "q2", "a2"]);
    assert_eq!(
        second.iter().map(|m| m.content.as_str()).collect::<Vec<_>>(),
        contents
    );
}

#[tokio::test]
async fn list_orders_by_updated_at_desc() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);

    store.commit_turn("old", "first", Some("a")).await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    store.commit_turn("new", "second", Some("b")).await.unwrap();

    let ids: Vec<String> = store.list().into_iter().map(|s| s.id).collect();
    assert_eq!(ids, vec!["new", "old"]);

    // Touching the older session moves it to the front.
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    store.touch("old");
    let ids: Vec<String> = store.list().into_iter().map(|s| s.id).collect();
    assert_eq!(ids, vec!["old", "new"]);
}

#[tokio::test]
async fn rename_unknown_session_is_not_found_and_mutates_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);

    store.commit_turn("s1", "hi", Some("hello")).await.unwrap();
    let before = store.list();

    let err = store.rename("ghost", "new title").unwrap_err();
    assert!(matches!(err, Error::SessionNotFound(_)));
    assert_eq!(store.list().len(), before.len());
    assert_eq!(store.get("s1").unwrap().title, before[0].title);
}

#[tokio::test]
async fn rename_updates_title_and_timestamp() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);

    store.commit_turn("s1", "hi", Some("hello")).await.unwrap();
    let before = store.get("s1").unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;

    let renamed = store.rename("s1", "Weather chat").unwrap();
    assert_eq!(renamed.title.as_deref(), Some("Weather chat"));
    assert!(renamed.updated_at > before.updated_at);
}

#[tokio::test]
async fn delete_cascades_to_messages() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);

    store.commit_turn("s1", "hi", Some("hello")).await.unwrap();
    store.delete("s1").unwrap();

    assert!(store.get("s1").is_none());
    assert!(store.list_messages("s1").await.unwrap().is_empty());
    assert!(matches!(store.delete("s1"), Err(Error::SessionNotFound(_))));
}

#[tokio::test]
async fn sessions_survive_a_store_reload() {
    let dir = tempfile::tempdir().unwrap();
    {
        let store = store_in(&dir);
        store.commit_turn("s1", "persist me", Some("done")).await.unwrap();
    }

    let store = store_in(&dir);
    let session = store.get("s1").unwrap();
    assert_eq!(session.title.as_deref(), Some("persist me"));
    let messages = store.list_messages("s1").await.unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].content, "done");
}
