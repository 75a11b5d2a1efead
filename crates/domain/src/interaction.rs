use std::str::FromStr;

use chrono::{DateTime, Utc};
use phishwise_core::{AppError, optional_text};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{CampaignId, UserId};

/// Unique identifier for a tracked interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InteractionId(Uuid);

impl InteractionId {
    /// Creates a new random interaction identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an interaction identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for InteractionId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl Default for InteractionId {
    fn default() -> Self {
        Self::new()
    }
}

/// Kind of tracked user interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionType {
    /// Followed the lure link.
    Click,
    /// Opened the awareness content.
    AwarenessView,
    /// Reported the lure.
    Report,
    /// Ignored the lure.
    Ignore,
    /// Saw the alert page after external entry.
    PhishingAlertView,
}

impl InteractionType {
    /// Returns a stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::AwarenessView => "awareness_view",
            Self::Report => "report",
            Self::Ignore => "ignore",
            Self::PhishingAlertView => "phishing_alert_view",
        }
    }

    /// Risk score assigned to this interaction.
    ///
    /// Only clicks are risky; a click that also submitted data scores highest.
    #[must_use]
    pub fn risk_score(&self, entered_data: bool) -> i32 {
        match (self, entered_data) {
            (Self::Click, true) => 100,
            (Self::Click, false) => 50,
            _ => 0,
        }
    }
}

impl FromStr for InteractionType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "click" => Ok(Self::Click),
            "awareness_view" => Ok(Self::AwarenessView),
            "report" => Ok(Self::Report),
            "ignore" => Ok(Self::Ignore),
            "phishing_alert_view" => Ok(Self::PhishingAlertView),
            _ => Err(AppError::Validation(format!(
                "unknown interaction type value '{value}'"
            ))),
        }
    }
}

/// Input describing one interaction to record.
#[derive(Debug, Clone, PartialEq)]
pub struct NewInteraction {
    /// Acting user, when known.
    pub user_id: Option<UserId>,
    /// Campaign the interaction belongs to, when known.
    pub campaign_id: Option<CampaignId>,
    /// Interaction kind.
    pub interaction_type: InteractionType,
    /// Seconds between dispatch and the interaction.
    pub response_time_seconds: Option<f64>,
    /// Data typed into the simulated form, if any.
    pub data_entered: Option<String>,
    /// Client address.
    pub ip_address: Option<String>,
    /// Client user agent.
    pub user_agent: Option<String>,
}

impl NewInteraction {
    /// Creates an input with only the required attributes set.
    #[must_use]
    pub fn new(
        interaction_type: InteractionType,
        user_id: Option<UserId>,
        campaign_id: Option<CampaignId>,
    ) -> Self {
        Self {
            user_id,
            campaign_id,
            interaction_type,
            response_time_seconds: None,
            data_entered: None,
            ip_address: None,
            user_agent: None,
        }
    }
}

/// Recorded interaction.
#[derive(Debug, Clone, PartialEq)]
pub struct Interaction {
    /// Stable identifier.
    pub id: InteractionId,
    /// Acting user, when known.
    pub user_id: Option<UserId>,
    /// Campaign, when known.
    pub campaign_id: Option<CampaignId>,
    /// Interaction kind.
    pub interaction_type: InteractionType,
    /// Time the interaction was recorded.
    pub occurred_at: DateTime<Utc>,
    /// Seconds between dispatch and the interaction.
    pub response_time_seconds: Option<f64>,
    /// Data typed into the simulated form, if any.
    pub data_entered: Option<String>,
    /// Client address.
    pub ip_address: Option<String>,
    /// Client user agent.
    pub user_agent: Option<String>,
    /// Derived risk score.
    pub risk_score: i32,
}

impl Interaction {
    /// Materializes an interaction and derives its risk score.
    #[must_use]
    pub fn record(input: NewInteraction, occurred_at: DateTime<Utc>) -> Self {
        let data_entered = optional_text(input.data_entered);
        let risk_score = input
            .interaction_type
            .risk_score(data_entered.is_some());

        Self {
            id: InteractionId::new(),
            user_id: input.user_id,
            campaign_id: input.campaign_id,
            interaction_type: input.interaction_type,
            occurred_at,
            response_time_seconds: input.response_time_seconds.filter(|value| *value >= 0.0),
            data_entered,
            ip_address: optional_text(input.ip_address),
            user_agent: optional_text(input.user_agent),
            risk_score,
        }
    }
}
