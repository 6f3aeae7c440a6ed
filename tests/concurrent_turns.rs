//! Integration tests for concurrent turns.
//!
//! Turns for the same user are serialized end to end; turns for different
//! users proceed independently.

use std::sync::Arc;

use matchday::adapters::search::RecordingSearchHandoff;
use matchday::adapters::storage::{InMemorySessionStore, SessionLimits};
use matchday::application::handlers::message::{
    HandleMessageCommand, HandleMessageHandler, IntentRecognizer,
};
use matchday::domain::catalog::{Catalog, CatalogEntry};
use matchday::domain::foundation::{Slug, UserKey};
use matchday::ports::SessionStore;

fn slug(s: &str) -> Slug {
    Slug::new(s).unwrap()
}

fn catalog() -> Arc<Catalog> {
    Arc::new(
        Catalog::build(vec![
            CatalogEntry::new("1", "ארסנל", slug("arsenal")),
            CatalogEntry::new("2", "ליברפול", slug("liverpool")),
        ])
        .unwrap(),
    )
}

fn setup(limits: SessionLimits) -> (
    Arc<HandleMessageHandler>,
    Arc<InMemorySessionStore>,
    Arc<RecordingSearchHandoff>,
) {
    let catalog = catalog();
    let store = Arc::new(InMemorySessionStore::new(limits));
    let handoff = Arc::new(RecordingSearchHandoff::new());
    let handler = HandleMessageHandler::new(
        store.clone(),
        handoff.clone(),
        catalog.clone(),
        IntentRecognizer::new(None, catalog),
    );
    (Arc::new(handler), store, handoff)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn simultaneous_halves_of_a_pair_complete_exactly_once() {
    let (handler, _store, handoff) = setup(SessionLimits::default());
    let users: Vec<UserKey> = (0..25)
        .map(|i| UserKey::new(format!("97250000{i:04}")).unwrap())
        .collect();

    let mut tasks = Vec::new();
    for user in &users {
        for text in ["ארסנל", "ליברפול"] {
            let handler = handler.clone();
            let cmd = HandleMessageCommand::new(user.clone(), text);
            tasks.push(tokio::spawn(async move { handler.handle(cmd).await }));
        }
    }
    for task in tasks {
        task.await.unwrap();
    }

    let requests = handoff.requests().await;
    for user in &users {
        let for_user: Vec<_> = requests.iter().filter(|r| &r.user_key == user).collect();
        assert_eq!(for_user.len(), 1, "user {user} should get exactly one search");
        let mut pair = vec![for_user[0].home.clone(), for_user[0].away.clone()];
        pair.sort();
        assert_eq!(pair, vec![slug("arsenal"), slug("liverpool")]);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn same_user_turns_never_lose_history() {
    let (handler, store, _handoff) = setup(SessionLimits {
        history_limit: 100,
        ..SessionLimits::default()
    });
    let user = UserKey::new("972500000001").unwrap();

    let tasks: Vec<_> = (0..20)
        .map(|_| {
            let handler = handler.clone();
            let cmd = HandleMessageCommand::new(user.clone(), "מה יש השבוע");
            tokio::spawn(async move { handler.handle(cmd).await })
        })
        .collect();
    for task in tasks {
        task.await.unwrap();
    }

    let session = store.snapshot(&user).await.unwrap().unwrap();
    assert_eq!(session.history().len(), 40);
    // Turns alternate user/bot because each turn holds the permit throughout.
    let roles: Vec<_> = session.history().map(|t| t.role).collect();
    for pair in roles.chunks(2) {
        assert_ne!(pair[0], pair[1]);
    }
}

#[tokio::test]
async fn capacity_bound_holds_under_many_users() {
    let (handler, store, _handoff) = setup(SessionLimits {
        capacity: 10,
        ..SessionLimits::default()
    });

    for i in 0..30 {
        let user = UserKey::new(format!("user-{i}")).unwrap();
        handler.handle(HandleMessageCommand::new(user, "ארסנל")).await;
    }

    assert_eq!(store.len().await, 10);
    let newest = UserKey::new("user-29").unwrap();
    assert!(store.snapshot(&newest).await.unwrap().is_some());
}
