//! Server-rendered HTML pages.

use askama::Template;
use axum::response::Html;
use phishwise_core::{AppError, AppResult};

#[derive(Template)]
#[template(path = "landing.html")]
pub struct LandingTemplate {
    pub product_name: &'static str,
}

/// Admin dashboard shell; data is loaded by the page script.
#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub page_size: usize,
}

/// Awareness content shown after a simulated lure was followed.
#[derive(Template)]
#[template(path = "awareness.html")]
pub struct AwarenessTemplate {
    pub campaign_id: Option<String>,
    pub campaign_name: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Template)]
#[template(path = "access_denied.html")]
pub struct AccessDeniedTemplate {
    pub reason: &'static str,
}

pub fn render<T: Template>(template: &T) -> AppResult<Html<String>> {
    template
        .render()
        .map(Html)
        .map_err(|error| AppError::Internal(format!("failed to render page: {error}")))
}

#[cfg(test)]
mod tests {
    use super::{AccessDeniedTemplate, AwarenessTemplate, render};

    #[test]
    fn access_denied_page_shows_reason() {
        let page = render(&AccessDeniedTemplate {
            reason: "usage limit reached",
        });
        let Ok(page) = page else {
            panic!("page should render");
        };

        assert!(page.0.contains("usage limit reached"));
    }

    #[test]
    fn awareness_page_names_campaign_and_escapes_it() {
        let page = render(&AwarenessTemplate {
            campaign_id: Some("c-1".to_owned()),
            campaign_name: Some("<Password reset>".to_owned()),
            user_id: None,
        });
        let Ok(page) = page else {
            panic!("page should render");
        };

        assert!(
            page.0.contains("&#60;Password reset&#62;")
                || page.0.contains("&lt;Password reset&gt;")
        );
        assert!(!page.0.contains("<Password reset>"));
    }
}
