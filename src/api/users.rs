use axum::{
    extract::{Query, State},
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::app_state::AppState;
use crate::error::AppResult;
use crate::models::Actor;

#[derive(Deserialize)]
pub struct CheckUsernameQuery {
    pub username: String,
}

pub async fn check_username_handler(
    State(state): State<AppState>,
    Query(params): Query<CheckUsernameQuery>,
) -> AppResult<Json<Value>> {
    let available = state.users.is_username_available(&params.username).await?;
    Ok(Json(json!({
        "username": params.username,
        "available": available
    })))
}

pub async fn me_handler(actor: Actor) -> AppResult<Json<Actor>> {
    Ok(Json(actor))
}
