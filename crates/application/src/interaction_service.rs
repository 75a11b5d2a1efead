//! Interaction tracking, reporting statistics and CSV export.

use std::sync::Arc;

use tracing::debug;

use phishwise_core::{AppError, AppResult};
use phishwise_domain::{Interaction, NewInteraction};

use crate::{
    CampaignRepository, Clock, InteractionFilter, InteractionListing, InteractionRepository,
    UserRepository,
};

/// Rows returned per interaction listing page.
pub const INTERACTIONS_PAGE_SIZE: usize = 20;

/// Dashboard counters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingStats {
    /// Active users.
    pub total_users: u64,
    /// Active campaigns.
    pub total_campaigns: u64,
    /// Recorded interactions.
    pub total_responses: u64,
    /// Share of interactions that were not clicks, in percent with one decimal.
    pub success_rate: f64,
}

/// Application service for tracked interactions.
#[derive(Clone)]
pub struct InteractionService {
    repository: Arc<dyn InteractionRepository>,
    user_repository: Arc<dyn UserRepository>,
    campaign_repository: Arc<dyn CampaignRepository>,
    clock: Arc<dyn Clock>,
}

impl InteractionService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        repository: Arc<dyn InteractionRepository>,
        user_repository: Arc<dyn UserRepository>,
        campaign_repository: Arc<dyn CampaignRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            user_repository,
            campaign_repository,
            clock,
        }
    }

    /// Records one interaction.
    pub async fn record(&self, input: NewInteraction) -> AppResult<Interaction> {
        let interaction = Interaction::record(input, self.clock.now());
        self.repository.insert_interaction(&interaction).await?;

        debug!(
            interaction_type = interaction.interaction_type.as_str(),
            risk_score = interaction.risk_score,
            "recorded interaction"
        );
        Ok(interaction)
    }

    /// Lists one page (1-based) of matching interactions, newest first.
    ///
    /// A page whose offset does not fit in `usize` is a validation error.
    pub async fn list_page(
        &self,
        filter: InteractionFilter,
        page: usize,
    ) -> AppResult<Vec<InteractionListing>> {
        let offset = page
            .max(1)
            .saturating_sub(1)
            .checked_mul(INTERACTIONS_PAGE_SIZE)
            .ok_or_else(|| AppError::Validation("page is out of range".to_owned()))?;
        self.repository
            .list_interactions(filter, Some(INTERACTIONS_PAGE_SIZE), offset)
            .await
    }

    /// Renders every matching interaction as CSV.
    pub async fn export_csv(&self, filter: InteractionFilter) -> AppResult<String> {
        let rows = self.repository.list_interactions(filter, None, 0).await?;
        Ok(interactions_to_csv(&rows))
    }

    /// Computes dashboard counters.
    pub async fn stats(&self) -> AppResult<TrainingStats> {
        let total_users = self.user_repository.count_active_users().await?;
        let total_campaigns = self.campaign_repository.count_active_campaigns().await?;
        let counts = self.repository.count_interactions().await?;

        let success_rate = if counts.total == 0 {
            0.0
        } else {
            let safe = counts.total.saturating_sub(counts.clicks) as f64;
            (safe * 1000.0 / counts.total as f64).round() / 10.0
        };

        Ok(TrainingStats {
            total_users,
            total_campaigns,
            total_responses: counts.total,
            success_rate,
        })
    }
}

const CSV_HEADER: &str =
    "name,email,campaign,interaction_type,response_time,ip_address,interaction_date";

/// Renders interaction rows as RFC 4180 CSV with a header line.
#[must_use]
pub fn interactions_to_csv(rows: &[InteractionListing]) -> String {
    let mut output = String::with_capacity(CSV_HEADER.len() + rows.len() * 96);
    output.push_str(CSV_HEADER);
    output.push_str("\r\n");

    for row in rows {
        let interaction = &row.interaction;
        let response_time = interaction
            .response_time_seconds
            .map(|value| value.to_string())
            .unwrap_or_default();
        let occurred_at = interaction.occurred_at.to_rfc3339();
        let fields = [
            row.user_name.as_deref().unwrap_or_default(),
            row.user_email.as_deref().unwrap_or_default(),
            row.campaign_name.as_deref().unwrap_or_default(),
            interaction.interaction_type.as_str(),
            response_time.as_str(),
            interaction.ip_address.as_deref().unwrap_or_default(),
            occurred_at.as_str(),
        ];

        for (index, field) in fields.iter().enumerate() {
            if index > 0 {
                output.push(',');
            }
            push_csv_field(&mut output, field);
        }
        output.push_str("\r\n");
    }

    output
}

fn push_csv_field(output: &mut String, field: &str) {
    if field.contains([',', '"', '\r', '\n']) {
        output.push('"');
        output.push_str(&field.replace('"', "\"\""));
        output.push('"');
    } else {
        output.push_str(field);
    }
}
