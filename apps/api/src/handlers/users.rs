use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use phishwise_domain::NewTrainingUser;

use crate::dto::{CreateUserRequest, UserResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_users_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<UserResponse>>> {
    let users = state
        .user_service
        .list_users()
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect();

    Ok(Json(users))
}

pub async fn create_user_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    let input = NewTrainingUser::new(
        payload.email.as_str(),
        payload.name,
        payload.department,
        payload.user_type.as_deref(),
    )?;
    let user = state.user_service.register_user(input).await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}
