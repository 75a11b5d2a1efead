use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use phishwise_domain::{CampaignId, NewCampaign};

use crate::dto::{CampaignDispatchResponse, CampaignResponse, CreateCampaignRequest};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_campaigns_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<CampaignResponse>>> {
    let campaigns = state
        .campaign_service
        .list_campaigns()
        .await?
        .into_iter()
        .map(CampaignResponse::from)
        .collect();

    Ok(Json(campaigns))
}

pub async fn create_campaign_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreateCampaignRequest>,
) -> ApiResult<(StatusCode, Json<CampaignResponse>)> {
    let input = NewCampaign::new(
        payload.name.as_str(),
        payload.description,
        payload.phishing_type.as_deref(),
        payload.difficulty_level.as_deref(),
        payload.email_subject,
        payload.email_content,
        payload.target_audience,
    )?;
    let campaign = state.campaign_service.create_campaign(input).await?;

    Ok((StatusCode::CREATED, Json(CampaignResponse::from(campaign))))
}

pub async fn send_campaign_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(campaign_id): Path<String>,
) -> ApiResult<Json<CampaignDispatchResponse>> {
    let campaign_id = campaign_id.parse::<CampaignId>()?;
    let base_url = state.base_url_resolver.resolve(&headers);

    let dispatch = state
        .campaign_service
        .send_campaign(campaign_id, &base_url)
        .await?;

    Ok(Json(CampaignDispatchResponse::from(dispatch)))
}
