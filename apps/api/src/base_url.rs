use axum::http::HeaderMap;
use axum::http::header::HOST;
use url::Url;

const FORWARDED_PROTO: &str = "x-forwarded-proto";

/// Decides which base URL external links are built on.
///
/// A configured public URL wins. Otherwise the request `Host` header (with
/// `X-Forwarded-Proto`) is used, and finally the listener address.
#[derive(Debug, Clone)]
pub struct BaseUrlResolver {
    configured: Option<String>,
    fallback: String,
}

impl BaseUrlResolver {
    pub fn new(configured: Option<&Url>, fallback: String) -> Self {
        Self {
            configured: configured.map(|url| url.as_str().trim_end_matches('/').to_owned()),
            fallback: fallback.trim_end_matches('/').to_owned(),
        }
    }

    pub fn resolve(&self, headers: &HeaderMap) -> String {
        if let Some(configured) = &self.configured {
            return configured.clone();
        }

        let Some(host) = headers
            .get(HOST)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|host| is_plausible_host(host))
        else {
            return self.fallback.clone();
        };

        let scheme = match headers
            .get(FORWARDED_PROTO)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').next())
            .map(str::trim)
        {
            Some(proto) if proto.eq_ignore_ascii_case("https") => "https",
            _ => "http",
        };

        format!("{scheme}://{host}")
    }
}

fn is_plausible_host(host: &str) -> bool {
    !host.is_empty()
        && host.len() <= 255
        && host.chars().all(|symbol| {
            symbol.is_ascii_alphanumeric() || matches!(symbol, '.' | '-' | ':' | '[' | ']')
        })
}
