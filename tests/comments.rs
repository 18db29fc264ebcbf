mod common;

use bookclub::error::AppError;
use bookclub::models::NewReview;
use bookclub::store::paging::SortKey;

use common::{register, test_state};

async fn seed_review(state: &bookclub::app_state::AppState, author: &bookclub::models::Actor) -> i64 {
    state
        .reviews
        .create(
            author,
            NewReview {
                title: "T".to_string(),
                book_title: "B".to_string(),
                content: "C".to_string(),
                publisher: None,
                book_author: None,
            },
        )
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn test_comment_lifecycle() {
    let state = test_state().await;
    let author = register(&state, "글쓴이", false).await;
    let commenter = register(&state, "덧글러", false).await;
    let review_id = seed_review(&state, &author).await;

    let comment = state
        .comments
        .create(&commenter, review_id, "nice review".to_string(), None)
        .await
        .unwrap();
    assert_eq!(comment.review_id, review_id);
    assert_eq!(comment.parent_id, None);
    assert_eq!(comment.author_name, "덧글러");

    let updated = state
        .comments
        .update(&commenter, comment.id, "nice review!".to_string())
        .await
        .unwrap();
    assert_eq!(updated.content, "nice review!");

    state.comments.delete(&commenter, comment.id).await.unwrap();
    assert!(state.comments.find(comment.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_comment_requires_existing_review() {
    let state = test_state().await;
    let actor = register(&state, "aa", false).await;

    let err = state
        .comments
        .create(&actor, 9999, "hello".to_string(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_comment_requires_content() {
    let state = test_state().await;
    let actor = register(&state, "bb", false).await;
    let review_id = seed_review(&state, &actor).await;

    let err = state
        .comments
        .create(&actor, review_id, "   ".to_string(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let comment = state
        .comments
        .create(&actor, review_id, "ok".to_string(), None)
        .await
        .unwrap();
    let err = state
        .comments
        .update(&actor, comment.id, "".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_single_level_nesting() {
    let state = test_state().await;
    let actor = register(&state, "cc", false).await;
    let review_id = seed_review(&state, &actor).await;

    let top = state
        .comments
        .create(&actor, review_id, "top".to_string(), None)
        .await
        .unwrap();
    let reply = state
        .comments
        .create(&actor, review_id, "reply".to_string(), Some(top.id))
        .await
        .unwrap();
    assert_eq!(reply.parent_id, Some(top.id));

    // A reply may not itself be replied to.
    let err = state
        .comments
        .create(&actor, review_id, "nested".to_string(), Some(reply.id))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_parent_must_be_on_same_review() {
    let state = test_state().await;
    let actor = register(&state, "dd", false).await;
    let first_review = seed_review(&state, &actor).await;
    let second_review = seed_review(&state, &actor).await;

    let parent = state
        .comments
        .create(&actor, first_review, "top".to_string(), None)
        .await
        .unwrap();

    let err = state
        .comments
        .create(&actor, second_review, "cross".to_string(), Some(parent.id))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = state
        .comments
        .create(&actor, first_review, "orphan".to_string(), Some(9999))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_only_author_or_admin_may_mutate() {
    let state = test_state().await;
    let author = register(&state, "ee", false).await;
    let other = register(&state, "ff", false).await;
    let admin = register(&state, "gg", true).await;
    let review_id = seed_review(&state, &author).await;

    let comment = state
        .comments
        .create(&author, review_id, "mine".to_string(), None)
        .await
        .unwrap();

    let err = state
        .comments
        .update(&other, comment.id, "hijacked".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let err = state.comments.delete(&other, comment.id).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    // Untouched after the forbidden attempts.
    assert_eq!(
        state.comments.get(comment.id).await.unwrap().content,
        "mine"
    );

    state.comments.delete(&admin, comment.id).await.unwrap();
    assert!(state.comments.find(comment.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_delete_cascades_replies() {
    let state = test_state().await;
    let actor = register(&state, "hh", false).await;
    let review_id = seed_review(&state, &actor).await;

    let top = state
        .comments
        .create(&actor, review_id, "top".to_string(), None)
        .await
        .unwrap();
    let reply = state
        .comments
        .create(&actor, review_id, "reply".to_string(), Some(top.id))
        .await
        .unwrap();
    let unrelated = state
        .comments
        .create(&actor, review_id, "other thread".to_string(), None)
        .await
        .unwrap();

    state.comments.delete(&actor, top.id).await.unwrap();

    assert!(state.comments.find(top.id).await.unwrap().is_none());
    assert!(state.comments.find(reply.id).await.unwrap().is_none());
    assert!(state.comments.find(unrelated.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_list_by_review_is_flat_and_ordered() {
    let state = test_state().await;
    let actor = register(&state, "ii", false).await;
    let review_id = seed_review(&state, &actor).await;

    let first = state
        .comments
        .create(&actor, review_id, "first".to_string(), None)
        .await
        .unwrap();
    let second = state
        .comments
        .create(&actor, review_id, "second".to_string(), None)
        .await
        .unwrap();
    let reply = state
        .comments
        .create(&actor, review_id, "reply to first".to_string(), Some(first.id))
        .await
        .unwrap();

    let listed = state.comments.list_by_review(review_id).await.unwrap();
    let ids: Vec<i64> = listed.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![first.id, second.id, reply.id]);
    assert_eq!(listed[2].parent_id, Some(first.id));

    assert!(state.comments.list_by_review(9999).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_by_author_pages_and_joins() {
    let state = test_state().await;
    let author = register(&state, "jj", false).await;
    let commenter = register(&state, "kk", false).await;
    let review_id = seed_review(&state, &author).await;

    for i in 0..7 {
        state
            .comments
            .create(&commenter, review_id, format!("comment {}", i), None)
            .await
            .unwrap();
    }
    // Someone else's comment stays out of the listing.
    state
        .comments
        .create(&author, review_id, "not yours".to_string(), None)
        .await
        .unwrap();

    let first = state
        .comments
        .list_by_author("kk", 1, SortKey::Latest)
        .await
        .unwrap();
    assert_eq!(first.total_count, 7);
    assert_eq!(first.total_pages, 2);
    assert_eq!(first.items.len(), 5);
    assert_eq!(first.items[0].content, "comment 6");
    assert_eq!(first.items[0].review_title, "T");

    let second = state
        .comments
        .list_by_author("kk", 2, SortKey::Oldest)
        .await
        .unwrap();
    assert_eq!(second.items.len(), 2);
    assert_eq!(second.items[0].content, "comment 5");

    let beyond = state
        .comments
        .list_by_author("kk", 9, SortKey::Latest)
        .await
        .unwrap();
    assert!(beyond.items.is_empty());
    assert_eq!(beyond.total_pages, 2);
}
