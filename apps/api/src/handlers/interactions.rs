use std::str::FromStr;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use chrono::NaiveDate;
use phishwise_application::InteractionFilter;
use phishwise_core::{AppError, AppResult};
use phishwise_domain::{CampaignId, InteractionType, NewInteraction};

use crate::dto::{GenericMessageResponse, InteractionResponse, ReportPhishingRequest, StatsResponse};
use crate::error::ApiResult;
use crate::state::AppState;

use super::request_meta::{client_ip, parse_optional_id, user_agent};

const EXPORT_FILE_NAME: &str = "phishing_training_visitors.csv";

#[derive(Debug, Default, serde::Deserialize)]
pub struct InteractionListQuery {
    pub page: Option<usize>,
    pub campaign_id: Option<String>,
    pub interaction_type: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

impl InteractionListQuery {
    fn filter(&self) -> AppResult<InteractionFilter> {
        Ok(InteractionFilter {
            campaign_id: parse_optional_id(self.campaign_id.as_deref())?,
            interaction_type: non_blank(self.interaction_type.as_deref())
                .map(InteractionType::from_str)
                .transpose()?,
            date_from: parse_date(self.date_from.as_deref(), "date_from")?,
            date_to: parse_date(self.date_to.as_deref(), "date_to")?,
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn parse_date(value: Option<&str>, field: &str) -> AppResult<Option<NaiveDate>> {
    non_blank(value)
        .map(|value| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|error| {
                AppError::Validation(format!("{field} must be a YYYY-MM-DD date: {error}"))
            })
        })
        .transpose()
}

pub async fn list_interactions_handler(
    State(state): State<AppState>,
    Query(query): Query<InteractionListQuery>,
) -> ApiResult<Json<Vec<InteractionResponse>>> {
    let filter = query.filter()?;
    let interactions = state
        .interaction_service
        .list_page(filter, query.page.unwrap_or(1))
        .await?
        .into_iter()
        .map(InteractionResponse::from)
        .collect();

    Ok(Json(interactions))
}

pub async fn export_interactions_handler(
    State(state): State<AppState>,
    Query(query): Query<InteractionListQuery>,
) -> ApiResult<Response> {
    let csv = state.interaction_service.export_csv(query.filter()?).await?;

    Ok((
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8".to_owned()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{EXPORT_FILE_NAME}\""),
            ),
        ],
        csv,
    )
        .into_response())
}

pub async fn stats_handler(State(state): State<AppState>) -> ApiResult<Json<StatsResponse>> {
    let stats = state.interaction_service.stats().await?;
    Ok(Json(StatsResponse::from(stats)))
}

pub async fn report_phishing_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(campaign_id): Path<String>,
    Json(payload): Json<ReportPhishingRequest>,
) -> ApiResult<(StatusCode, Json<GenericMessageResponse>)> {
    let campaign_id = campaign_id.parse::<CampaignId>()?;
    let mut input = NewInteraction::new(
        InteractionType::Report,
        parse_optional_id(payload.user_id.as_deref())?,
        Some(campaign_id),
    );
    input.response_time_seconds = payload.response_time;
    input.ip_address = client_ip(&headers);
    input.user_agent = user_agent(&headers);

    state.interaction_service.record(input).await?;

    Ok((
        StatusCode::CREATED,
        Json(GenericMessageResponse {
            message: "Thank you for reporting this phishing attempt.".to_owned(),
        }),
    ))
}
