mod common;

use bookclub::app_state::AppState;
use bookclub::auth::SessionService;
use bookclub::error::AppError;
use bookclub::models::{NewUser, SocialProvider};
use bookclub::store::Database;

use common::{register, test_config, test_state};

#[tokio::test]
async fn test_username_uniqueness() {
    let state = test_state().await;

    assert!(state.users.is_username_available("책벌레").await.unwrap());
    register(&state, "책벌레", false).await;
    assert!(!state.users.is_username_available("책벌레").await.unwrap());

    // The UNIQUE constraint is the authoritative guard.
    let err = state
        .users
        .create(NewUser {
            username: "책벌레".to_string(),
            ..NewUser::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn test_username_shape_is_enforced() {
    let state = test_state().await;

    for bad in ["a", "ninechars", "가나다라마바사아자", "a b"] {
        let err = state
            .users
            .create(NewUser {
                username: bad.to_string(),
                ..NewUser::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)), "accepted {:?}", bad);

        let err = state.users.is_username_available(bad).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}

#[tokio::test]
async fn test_social_identity_lookup() {
    let state = test_state().await;

    assert!(state
        .users
        .find_by_provider(SocialProvider::Kakao, "kakao-1")
        .await
        .unwrap()
        .is_none());

    let user = state
        .users
        .create(NewUser {
            username: "카카오".to_string(),
            provider: Some(SocialProvider::Kakao),
            provider_id: Some("kakao-1".to_string()),
            ..NewUser::default()
        })
        .await
        .unwrap();
    assert!(user.email.is_none());
    assert!(user.password_hash.is_none());

    let found = state
        .users
        .find_by_provider(SocialProvider::Kakao, "kakao-1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, user.id);
    assert_eq!(found.provider, Some(SocialProvider::Kakao));

    // Same provider id under a different provider is a different identity.
    assert!(state
        .users
        .find_by_provider(SocialProvider::Naver, "kakao-1")
        .await
        .unwrap()
        .is_none());

    let err = state
        .users
        .create(NewUser {
            username: "복제본".to_string(),
            provider: Some(SocialProvider::Kakao),
            provider_id: Some("kakao-1".to_string()),
            ..NewUser::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn test_session_roundtrip() {
    let state = test_state().await;
    let actor = register(&state, "세션맨", false).await;

    let token = state.sessions.issue(actor.id).await.unwrap();
    let resolved = state.sessions.resolve(&token).await.unwrap();
    assert_eq!(resolved.id, actor.id);
    assert_eq!(resolved.username, "세션맨");
    assert!(!resolved.is_admin);

    let err = state.sessions.resolve("bogus-token").await.unwrap_err();
    assert!(matches!(err, AppError::Unauthenticated(_)));

    state.sessions.revoke(&token).await.unwrap();
    let err = state.sessions.resolve(&token).await.unwrap_err();
    assert!(matches!(err, AppError::Unauthenticated(_)));
}

#[tokio::test]
async fn test_expired_session_is_rejected() {
    let database = Database::new_in_memory().await.unwrap();
    let state = AppState::with_database(&database, test_config());
    let actor = register(&state, "잠깐만", false).await;

    // A service whose sessions are born expired.
    let expired_sessions = SessionService::new(database.pool().clone(), -1);
    let token = expired_sessions.issue(actor.id).await.unwrap();

    let err = state.sessions.resolve(&token).await.unwrap_err();
    assert!(matches!(err, AppError::Unauthenticated(_)));
}

#[tokio::test]
async fn test_password_reset_updates_hash() {
    let state = test_state().await;

    let user = state
        .users
        .create(NewUser {
            username: "메일러".to_string(),
            email: Some("reader@example.com".to_string()),
            password_hash: Some(bookclub::auth::hash_password("old password").unwrap()),
            ..NewUser::default()
        })
        .await
        .unwrap();

    state.users.set_password(user.id, "new-hash").await.unwrap();
    let reloaded = state.users.get(user.id).await.unwrap().unwrap();
    assert_eq!(reloaded.password_hash.as_deref(), Some("new-hash"));

    let err = state.users.set_password(9999, "x").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let by_email = state
        .users
        .find_by_email("reader@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_email.id, user.id);
}
