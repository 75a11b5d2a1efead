use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use phishwise_application::INTERACTIONS_PAGE_SIZE;
use phishwise_core::AppError;
use phishwise_domain::{CampaignId, InteractionType, NewInteraction, UserId};
use tracing::{info, warn};

use crate::error::ApiResult;
use crate::pages::{
    AccessDeniedTemplate, AwarenessTemplate, DashboardTemplate, LandingTemplate, render,
};
use crate::state::AppState;

use super::request_meta::{client_ip, parse_optional_id, user_agent};

#[derive(Debug, Default, serde::Deserialize)]
pub struct VisitorQuery {
    pub user: Option<String>,
}

pub async fn landing_handler() -> ApiResult<Html<String>> {
    Ok(render(&LandingTemplate {
        product_name: "PhishWise",
    })?)
}

pub async fn dashboard_handler() -> ApiResult<Html<String>> {
    Ok(render(&DashboardTemplate {
        page_size: INTERACTIONS_PAGE_SIZE,
    })?)
}

fn visitor_interaction(
    interaction_type: InteractionType,
    user_id: Option<UserId>,
    campaign_id: Option<CampaignId>,
    headers: &HeaderMap,
) -> NewInteraction {
    let mut input = NewInteraction::new(interaction_type, user_id, campaign_id);
    input.ip_address = client_ip(headers);
    input.user_agent = user_agent(headers);
    input
}

fn awareness_location(campaign_id: CampaignId, user_id: Option<UserId>) -> String {
    match user_id {
        Some(user_id) => format!("/awareness/{campaign_id}?user={user_id}"),
        None => format!("/awareness/{campaign_id}"),
    }
}

/// Lure link target: records the click and forwards to the awareness page.
pub async fn track_click_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(campaign_id): Path<String>,
    Query(query): Query<VisitorQuery>,
) -> ApiResult<Redirect> {
    let campaign_id = campaign_id.parse::<CampaignId>()?;
    let user_id = parse_optional_id::<UserId>(query.user.as_deref())?;

    state
        .interaction_service
        .record(visitor_interaction(
            InteractionType::Click,
            user_id,
            Some(campaign_id),
            &headers,
        ))
        .await?;

    Ok(Redirect::to(&awareness_location(campaign_id, user_id)))
}

pub async fn campaign_awareness_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(campaign_id): Path<String>,
    Query(query): Query<VisitorQuery>,
) -> ApiResult<Html<String>> {
    let campaign_id = campaign_id.parse::<CampaignId>()?;
    let user_id = parse_optional_id::<UserId>(query.user.as_deref())?;

    let campaign_name = match state.campaign_service.get_campaign(campaign_id).await {
        Ok(campaign) => Some(campaign.name),
        Err(AppError::NotFound(_)) => None,
        Err(error) => return Err(error.into()),
    };

    state
        .interaction_service
        .record(visitor_interaction(
            InteractionType::AwarenessView,
            user_id,
            Some(campaign_id),
            &headers,
        ))
        .await?;

    Ok(render(&AwarenessTemplate {
        campaign_id: Some(campaign_id.to_string()),
        campaign_name,
        user_id: user_id.map(|user_id| user_id.to_string()),
    })?)
}

/// General training content, not tied to a campaign.
pub async fn general_awareness_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<VisitorQuery>,
) -> ApiResult<Html<String>> {
    let user_id = parse_optional_id::<UserId>(query.user.as_deref())?;

    state
        .interaction_service
        .record(visitor_interaction(
            InteractionType::AwarenessView,
            user_id,
            None,
            &headers,
        ))
        .await?;

    Ok(render(&AwarenessTemplate {
        campaign_id: None,
        campaign_name: None,
        user_id: user_id.map(|user_id| user_id.to_string()),
    })?)
}

/// External entry: redeems the code and forwards the visitor to training.
pub async fn external_login_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(code): Path<String>,
) -> ApiResult<Response> {
    let redeemed = match state.access_grant_service.redeem(code.as_str()).await? {
        Ok(redeemed) => redeemed,
        Err(rejection) => {
            warn!(reason = rejection.reason(), "external access refused");
            let page = render(&AccessDeniedTemplate {
                reason: rejection.reason(),
            })?;
            return Ok((StatusCode::FORBIDDEN, page).into_response());
        }
    };

    state
        .interaction_service
        .record(visitor_interaction(
            InteractionType::PhishingAlertView,
            redeemed.subject_user,
            redeemed.subject_campaign,
            &headers,
        ))
        .await?;

    info!(
        remaining_uses = redeemed.remaining_uses,
        campaign_id = ?redeemed.subject_campaign,
        "external access redeemed"
    );

    // Straight to training content; the lure route would log a click.
    let location = match (redeemed.subject_campaign, redeemed.subject_user) {
        (Some(campaign_id), user_id) => awareness_location(campaign_id, user_id),
        (None, Some(user_id)) => format!("/awareness?user={user_id}"),
        (None, None) => "/awareness".to_owned(),
    };

    Ok(Redirect::to(&location).into_response())
}
