use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use phishwise_application::IssueAccessGrantInput;

use crate::dto::{
    AccessGrantIssuedResponse, AccessGrantResponse, AccessUseResponse, AccessValidationResponse,
    CreateAccessGrantRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

use super::request_meta::parse_optional_id;

pub async fn issue_access_grant_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateAccessGrantRequest>,
) -> ApiResult<(StatusCode, Json<AccessGrantIssuedResponse>)> {
    let input = IssueAccessGrantInput {
        subject_user: parse_optional_id(payload.user_id.as_deref())?,
        subject_campaign: parse_optional_id(payload.campaign_id.as_deref())?,
        valid_days: i64::from(payload.valid_days),
        max_uses: payload.max_uses,
    };
    let base_url = state.base_url_resolver.resolve(&headers);

    let issued = state.access_grant_service.issue(input, &base_url).await?;

    Ok((
        StatusCode::CREATED,
        Json(AccessGrantIssuedResponse::from(issued)),
    ))
}

pub async fn validate_access_handler(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> ApiResult<Json<AccessValidationResponse>> {
    let validation = state.access_grant_service.validate(code.as_str()).await?;
    Ok(Json(AccessValidationResponse::from(validation)))
}

pub async fn record_access_use_handler(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> ApiResult<Json<AccessUseResponse>> {
    let used_count = state.access_grant_service.record_use(code.as_str()).await?;

    Ok(Json(AccessUseResponse {
        message: "access use recorded".to_owned(),
        used_count,
    }))
}

pub async fn revoke_access_handler(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> ApiResult<StatusCode> {
    state.access_grant_service.revoke(code.as_str()).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_access_grants_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<AccessGrantResponse>>> {
    let now = state.access_grant_service.now();
    let grants = state
        .access_grant_service
        .list()
        .await?
        .into_iter()
        .map(|listing| AccessGrantResponse::from_listing(listing, now))
        .collect();

    Ok(Json(grants))
}
