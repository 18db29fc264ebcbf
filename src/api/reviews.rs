use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::app_state::AppState;
use crate::error::{AppError, AppResult};
use crate::models::{Actor, NewReview, Review, ReviewPatch};
use crate::store::paging::{FilterField, PagedResult, ReviewFilter, SortKey};

#[derive(Deserialize)]
pub struct ListReviewsQuery {
    pub page: Option<i64>,
    pub sort: Option<String>,
    pub field: Option<String>,
    pub term: Option<String>,
}

pub async fn list_reviews_handler(
    State(state): State<AppState>,
    Query(params): Query<ListReviewsQuery>,
) -> AppResult<Json<PagedResult<Review>>> {
    let filter = match (params.field.as_deref(), params.term.as_deref()) {
        (Some(field), Some(term)) if !term.trim().is_empty() => Some(ReviewFilter {
            field: FilterField::parse(field)?,
            term: term.to_string(),
        }),
        (Some(_), Some(_)) | (None, None) => None,
        _ => {
            return Err(AppError::Validation(
                "Filtering requires both field and term".to_string(),
            ))
        }
    };

    let page = params.page.unwrap_or(1);
    let sort = SortKey::parse(params.sort.as_deref());

    let result = state.reviews.list(page, sort, filter).await?;
    Ok(Json(result))
}

pub async fn create_review_handler(
    State(state): State<AppState>,
    actor: Actor,
    Json(request): Json<NewReview>,
) -> AppResult<(StatusCode, Json<Review>)> {
    let review = state.reviews.create(&actor, request).await?;

    tracing::info!("Created review {} by {}", review.id, actor.username);
    Ok((StatusCode::CREATED, Json(review)))
}

pub async fn get_review_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Review>> {
    let review = state.reviews.get(id).await?;
    Ok(Json(review))
}

pub async fn record_view_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Value>> {
    let views = state.reviews.record_view(id).await?;
    Ok(Json(json!({"id": id, "views": views})))
}

pub async fn update_review_handler(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
    Json(patch): Json<ReviewPatch>,
) -> AppResult<Json<Review>> {
    let review = state.reviews.update(&actor, id, patch).await?;
    Ok(Json(review))
}

pub async fn delete_review_handler(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<i64>,
) -> AppResult<Json<Value>> {
    state.reviews.delete(&actor, id).await?;
    Ok(Json(json!({"id": id, "deleted": true})))
}
