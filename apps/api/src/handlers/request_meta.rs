use std::str::FromStr;

use axum::http::HeaderMap;
use axum::http::header::USER_AGENT;
use phishwise_core::{AppError, AppResult};

const FORWARDED_FOR: &str = "x-forwarded-for";
const REAL_IP: &str = "x-real-ip";

fn header_text<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Client address as reported by the closest proxy.
pub(super) fn client_ip(headers: &HeaderMap) -> Option<String> {
    header_text(headers, FORWARDED_FOR)
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .or_else(|| header_text(headers, REAL_IP))
        .map(str::to_owned)
}

pub(super) fn user_agent(headers: &HeaderMap) -> Option<String> {
    header_text(headers, USER_AGENT.as_str()).map(str::to_owned)
}

/// Parses an optional identifier. Blank values count as absent.
pub(super) fn parse_optional_id<T>(value: Option<&str>) -> AppResult<Option<T>>
where
    T: FromStr<Err = AppError>,
{
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(T::from_str)
        .transpose()
}
