use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::app_state::AppState;
use crate::error::AppResult;
use crate::models::{Actor, Comment, CommentWithReview, NewComment};
use crate::store::paging::{PagedResult, SortKey};

pub async fn list_review_comments_handler(
    State(state): State<AppState>,
    Path(review_id): Path<i64>,
) -> AppResult<Json<Vec<Comment>>> {
    let comments = state.comments.list_by_review(review_id).await?;
    Ok(Json(comments))
}

pub async fn create_comment_handler(
    State(state): State<AppState>,
    actor: Actor,
    Path(review_id): Path<i64>,
    Json(request): Json<NewComment>,
) -> AppResult<(StatusCode, Json<Comment>)> {
    let comment = state
        .comments
        .create(&actor, review_id, request.content, request.parent_id)
        .await?;

    Ok((StatusCode::CREATED, Json(comment)))
}

#[derive(Deserialize)]
pub struct UpdateCommentRequest {
    pub content: String,
}

pub async fn update_comment_handler(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
    Json(request): Json<UpdateCommentRequest>,
) -> AppResult<Json<Comment>> {
    let comment = state.comments.update(&actor, id, request.content).await?;
    Ok(Json(comment))
}

pub async fn delete_comment_handler(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
) -> AppResult<Json<Value>> {
    state.comments.delete(&actor, id).await?;
    Ok(Json(json!({"id": id, "deleted": true})))
}

#[derive(Deserialize)]
pub struct ListAuthorCommentsQuery {
    pub page: Option<i64>,
    pub sort: Option<String>,
}

pub async fn list_author_comments_handler(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Query(params): Query<ListAuthorCommentsQuery>,
) -> AppResult<Json<PagedResult<CommentWithReview>>> {
    let page = params.page.unwrap_or(1);
    let sort = SortKey::parse(params.sort.as_deref());

    let result = state.comments.list_by_author(&username, page, sort).await?;
    Ok(Json(result))
}
