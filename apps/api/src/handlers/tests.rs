use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::header::{CONTENT_TYPE, LOCATION};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use phishwise_domain::{Campaign, InteractionType, NewCampaign, NewTrainingUser};

use crate::dto::{CreateAccessGrantRequest, ReportPhishingRequest};
use crate::error::ApiError;
use crate::state::AppState;
use crate::test_support::{TEST_BASE_URL, in_memory_state};

use super::access::{
    issue_access_grant_handler, list_access_grants_handler, record_access_use_handler,
    revoke_access_handler, validate_access_handler,
};
use super::interactions::{
    InteractionListQuery, export_interactions_handler, list_interactions_handler,
    report_phishing_handler, stats_handler,
};
use super::pages::{
    VisitorQuery, campaign_awareness_handler, external_login_handler, track_click_handler,
};

fn grant_request(campaign: Option<&Campaign>, max_uses: u32) -> CreateAccessGrantRequest {
    CreateAccessGrantRequest {
        user_id: None,
        campaign_id: campaign.map(|campaign| campaign.id.to_string()),
        valid_days: 30,
        max_uses,
    }
}

async fn seed_campaign(state: &AppState) -> Campaign {
    let input = NewCampaign::new(
        "Password reset",
        None,
        Some("email"),
        Some("medium"),
        None,
        None,
        None,
    );
    let Ok(input) = input else {
        panic!("campaign input should validate");
    };
    match state.campaign_service.create_campaign(input).await {
        Ok(campaign) => campaign,
        Err(error) => panic!("campaign should be created: {error}"),
    }
}

async fn issue_code(state: &AppState, request: CreateAccessGrantRequest) -> String {
    match issue_access_grant_handler(State(state.clone()), HeaderMap::new(), Json(request)).await
    {
        Ok((status, Json(issued))) => {
            assert_eq!(status, StatusCode::CREATED);
            issued.access_code
        }
        Err(error) => panic!("issue should succeed: {:?}", error.0),
    }
}

#[tokio::test]
async fn issued_grant_uses_fallback_base_url_and_validates() {
    let state = in_memory_state(None);
    let campaign = seed_campaign(&state).await;

    let issued = issue_access_grant_handler(
        State(state.clone()),
        HeaderMap::new(),
        Json(grant_request(Some(&campaign), 2)),
    )
    .await;
    let Ok((_, Json(issued))) = issued else {
        panic!("issue should succeed");
    };
    assert_eq!(issued.base_url, TEST_BASE_URL);
    assert_eq!(
        issued.external_url,
        format!("{TEST_BASE_URL}/external/login/{}", issued.access_code)
    );

    let validation =
        validate_access_handler(State(state.clone()), Path(issued.access_code.clone())).await;
    let Ok(Json(validation)) = validation else {
        panic!("validate should succeed");
    };
    assert!(validation.valid);
    assert_eq!(validation.remaining_uses, Some(2));
    assert_eq!(validation.campaign_name.as_deref(), Some("Password reset"));
}

#[tokio::test]
async fn issue_with_request_host_builds_link_on_that_host() {
    let state = in_memory_state(None);
    let mut headers = HeaderMap::new();
    headers.insert("host", HeaderValue::from_static("training.example.edu"));
    headers.insert("x-forwarded-proto", HeaderValue::from_static("https"));

    let issued =
        issue_access_grant_handler(State(state), headers, Json(grant_request(None, 1))).await;
    let Ok((_, Json(issued))) = issued else {
        panic!("issue should succeed");
    };

    assert_eq!(issued.base_url, "https://training.example.edu");
}

#[tokio::test]
async fn issue_rejects_malformed_campaign_id() {
    let state = in_memory_state(None);
    let mut request = grant_request(None, 1);
    request.campaign_id = Some("campaign-7".to_owned());

    let result = issue_access_grant_handler(State(state), HeaderMap::new(), Json(request)).await;

    assert_eq!(
        result.err().map(|error| error.into_response().status()),
        Some(StatusCode::BAD_REQUEST)
    );
}

#[tokio::test]
async fn exhausted_grant_reports_reason_and_refuses_further_use() {
    let state = in_memory_state(None);
    let code = issue_code(&state, grant_request(None, 1)).await;

    let used = record_access_use_handler(State(state.clone()), Path(code.clone())).await;
    assert_eq!(used.ok().map(|Json(response)| response.used_count), Some(1));

    let validation = validate_access_handler(State(state.clone()), Path(code.clone())).await;
    let Ok(Json(validation)) = validation else {
        panic!("validate should succeed");
    };
    assert!(!validation.valid);
    assert_eq!(validation.reason.as_deref(), Some("usage limit reached"));

    let refused = record_access_use_handler(State(state.clone()), Path(code)).await;
    assert_eq!(
        refused.err().map(|error| error.into_response().status()),
        Some(StatusCode::CONFLICT)
    );

    let unknown = record_access_use_handler(State(state), Path("ZZZZZZZZ".to_owned())).await;
    assert_eq!(
        unknown.err().map(|error| error.into_response().status()),
        Some(StatusCode::NOT_FOUND)
    );
}

#[tokio::test]
async fn revoked_grant_is_listed_as_revoked() {
    let state = in_memory_state(None);
    let code = issue_code(&state, grant_request(None, 3)).await;

    let revoked = revoke_access_handler(State(state.clone()), Path(code.clone())).await;
    assert_eq!(revoked.ok(), Some(StatusCode::NO_CONTENT));

    let listed = list_access_grants_handler(State(state)).await;
    let Ok(Json(listed)) = listed else {
        panic!("list should succeed");
    };
    assert_eq!(listed.len(), 1);
    assert_eq!(listed.first().map(|grant| grant.access_code.as_str()), Some(code.as_str()));
    assert_eq!(listed.first().map(|grant| grant.is_active), Some(false));
    assert_eq!(listed.first().map(|grant| grant.status.as_str()), Some("inactive"));
}

#[tokio::test]
async fn external_login_redirects_to_awareness_page_without_logging_a_click() {
    let state = in_memory_state(None);
    let campaign = seed_campaign(&state).await;
    let user = NewTrainingUser::new("student1@university.edu", None, None, None);
    let Ok(user) = user else {
        panic!("user input should validate");
    };
    let Ok(user) = state.user_service.register_user(user).await else {
        panic!("user should register");
    };

    let mut request = grant_request(Some(&campaign), 1);
    request.user_id = Some(user.id.to_string());
    let code = issue_code(&state, request).await;

    let response =
        external_login_handler(State(state.clone()), HeaderMap::new(), Path(code.clone()))
            .await
            .map(IntoResponse::into_response);
    let Ok(response) = response else {
        panic!("redeem should succeed");
    };
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok()),
        Some(format!("/awareness/{}?user={}", campaign.id, user.id).as_str())
    );

    let awareness = campaign_awareness_handler(
        State(state.clone()),
        HeaderMap::new(),
        Path(campaign.id.to_string()),
        Query(VisitorQuery {
            user: Some(user.id.to_string()),
        }),
    )
    .await;
    assert!(awareness.is_ok());

    let interactions = state
        .interaction_service
        .list_page(Default::default(), 1)
        .await
        .unwrap_or_default();
    let mut kinds: Vec<&str> = interactions
        .iter()
        .map(|row| row.interaction.interaction_type.as_str())
        .collect();
    kinds.sort_unstable();
    assert_eq!(kinds, vec!["awareness_view", "phishing_alert_view"]);
    assert!(
        interactions
            .iter()
            .all(|row| row.interaction.interaction_type != InteractionType::Click)
    );

    let second = external_login_handler(State(state), HeaderMap::new(), Path(code))
        .await
        .map(IntoResponse::into_response);
    assert_eq!(
        second.ok().map(|response| response.status()),
        Some(StatusCode::FORBIDDEN)
    );
}

#[tokio::test]
async fn unknown_external_code_renders_forbidden_page() {
    let state = in_memory_state(None);

    let response = external_login_handler(State(state), HeaderMap::new(), Path("nope".to_owned()))
        .await
        .map(IntoResponse::into_response);

    assert_eq!(
        response.ok().map(|response| response.status()),
        Some(StatusCode::FORBIDDEN)
    );
}

#[tokio::test]
async fn click_then_report_feed_stats() {
    let state = in_memory_state(None);
    let campaign = seed_campaign(&state).await;
    let mut headers = HeaderMap::new();
    headers.insert("x-forwarded-for", HeaderValue::from_static("198.51.100.4"));

    let redirect = track_click_handler(
        State(state.clone()),
        headers.clone(),
        Path(campaign.id.to_string()),
        Query(VisitorQuery::default()),
    )
    .await
    .map(IntoResponse::into_response);
    assert_eq!(
        redirect
            .ok()
            .and_then(|response| response.headers().get(LOCATION).cloned()),
        HeaderValue::from_str(&format!("/awareness/{}", campaign.id)).ok()
    );

    let reported = report_phishing_handler(
        State(state.clone()),
        headers,
        Path(campaign.id.to_string()),
        Json(ReportPhishingRequest::default()),
    )
    .await;
    assert_eq!(
        reported.ok().map(|(status, _)| status),
        Some(StatusCode::CREATED)
    );

    let stats = stats_handler(State(state.clone())).await;
    let Ok(Json(stats)) = stats else {
        panic!("stats should load");
    };
    assert_eq!(stats.total_campaigns, 1);
    assert_eq!(stats.total_responses, 2);
    assert_eq!(stats.success_rate, 50.0);

    let listed = list_interactions_handler(
        State(state),
        Query(InteractionListQuery {
            interaction_type: Some("click".to_owned()),
            ..InteractionListQuery::default()
        }),
    )
    .await;
    let Ok(Json(listed)) = listed else {
        panic!("listing should succeed");
    };
    assert_eq!(listed.len(), 1);
    assert_eq!(
        listed.first().and_then(|row| row.ip_address.as_deref()),
        Some("198.51.100.4")
    );
    assert_eq!(
        listed.first().and_then(|row| row.campaign_name.as_deref()),
        Some("Password reset")
    );
    assert_eq!(listed.first().map(|row| row.risk_score), Some(50));
}

#[tokio::test]
async fn listing_rejects_malformed_date_filter() {
    let state = in_memory_state(None);

    let result = list_interactions_handler(
        State(state),
        Query(InteractionListQuery {
            date_from: Some("05/01/2024".to_owned()),
            ..InteractionListQuery::default()
        }),
    )
    .await;

    assert_eq!(
        result.err().map(|error| error.into_response().status()),
        Some(StatusCode::BAD_REQUEST)
    );
}

#[tokio::test]
async fn export_is_served_as_csv_attachment() {
    let state = in_memory_state(None);

    let response = export_interactions_handler(
        State(state),
        Query(InteractionListQuery {
            date_from: Some(" ".to_owned()),
            ..InteractionListQuery::default()
        }),
    )
    .await;
    let Ok(response) = response else {
        panic!("export should succeed");
    };

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok()),
        Some("text/csv; charset=utf-8")
    );
    assert!(
        response
            .headers()
            .get("content-disposition")
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("attachment;"))
    );
}

#[test]
fn api_error_keeps_status_mapping() {
    let error = phishwise_core::AppError::Unauthorized("no token".to_owned());
    let response = ApiError::from(error).into_response();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
