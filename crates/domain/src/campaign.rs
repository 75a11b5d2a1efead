use std::str::FromStr;

use chrono::{DateTime, Utc};
use phishwise_core::{AppError, AppResult, NonEmptyString, optional_text};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Placeholder substituted with the per-recipient tracking link.
pub const TRACKING_URL_PLACEHOLDER: &str = "{tracking_url}";

/// Unique identifier for a simulated campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CampaignId(Uuid);

impl CampaignId {
    /// Creates a new random campaign identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a campaign identifier from an existing UUID value.
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

impl Default for CampaignId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CampaignId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl FromStr for CampaignId {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(value.trim()).map(Self).map_err(|error| {
            AppError::Validation(format!("invalid campaign id '{value}': {error}"))
        })
    }
}

/// Delivery channel being simulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhishingType {
    /// Phishing email.
    #[default]
    Email,
    /// Text message lure.
    Sms,
    /// Spoofed website.
    Website,
    /// Social media or messaging lure.
    Social,
}

impl PhishingType {
    /// Returns a stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Sms => "sms",
            Self::Website => "website",
            Self::Social => "social",
        }
    }
}

impl FromStr for PhishingType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "email" => Ok(Self::Email),
            "sms" => Ok(Self::Sms),
            "website" => Ok(Self::Website),
            "social" => Ok(Self::Social),
            _ => Err(AppError::Validation(format!(
                "unknown phishing type value '{value}'"
            ))),
        }
    }
}

/// How hard the lure is to spot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyLevel {
    /// Obvious lure.
    Easy,
    /// Default level.
    #[default]
    Medium,
    /// Convincing lure.
    Hard,
}

impl DifficultyLevel {
    /// Returns a stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

impl FromStr for DifficultyLevel {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            _ => Err(AppError::Validation(format!(
                "unknown difficulty level value '{value}'"
            ))),
        }
    }
}

/// Campaign publication state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    /// Not yet sent.
    #[default]
    Draft,
    /// Tracking links have been dispatched.
    Sent,
}

impl CampaignStatus {
    /// Returns a stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Sent => "sent",
        }
    }
}

impl FromStr for CampaignStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "draft" => Ok(Self::Draft),
            "sent" => Ok(Self::Sent),
            _ => Err(AppError::Validation(format!(
                "unknown campaign status value '{value}'"
            ))),
        }
    }
}

/// Validated input for creating a campaign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCampaign {
    /// Display name.
    pub name: NonEmptyString,
    /// Optional description.
    pub description: Option<String>,
    /// Simulated channel.
    pub phishing_type: PhishingType,
    /// Difficulty level.
    pub difficulty: DifficultyLevel,
    /// Subject line of the lure.
    pub email_subject: Option<String>,
    /// HTML body containing the tracking placeholder.
    pub email_content: Option<String>,
    /// Free-form audience selector.
    pub target_audience: String,
}

impl NewCampaign {
    /// Validates raw campaign values. Blank enum values fall back to defaults.
    pub fn new(
        name: &str,
        description: Option<String>,
        phishing_type: Option<&str>,
        difficulty: Option<&str>,
        email_subject: Option<String>,
        email_content: Option<String>,
        target_audience: Option<String>,
    ) -> AppResult<Self> {
        let phishing_type = match non_blank(phishing_type) {
            Some(value) => PhishingType::from_str(value)?,
            None => PhishingType::default(),
        };
        let difficulty = match non_blank(difficulty) {
            Some(value) => DifficultyLevel::from_str(value)?,
            None => DifficultyLevel::default(),
        };

        Ok(Self {
            name: NonEmptyString::new(name)?,
            description: optional_text(description),
            phishing_type,
            difficulty,
            email_subject: optional_text(email_subject),
            email_content: optional_text(email_content),
            target_audience: optional_text(target_audience).unwrap_or_else(|| "all".to_owned()),
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// Simulated phishing campaign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Campaign {
    /// Stable identifier.
    pub id: CampaignId,
    /// Display name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Simulated channel.
    pub phishing_type: PhishingType,
    /// Difficulty level.
    pub difficulty: DifficultyLevel,
    /// Subject line of the lure.
    pub email_subject: Option<String>,
    /// HTML body containing the tracking placeholder.
    pub email_content: Option<String>,
    /// Free-form audience selector.
    pub target_audience: String,
    /// Publication state.
    pub status: CampaignStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Time of the last dispatch.
    pub sent_at: Option<DateTime<Utc>>,
    /// Inactive campaigns are hidden from listings.
    pub is_active: bool,
}

impl Campaign {
    /// Materializes a new draft campaign from validated input.
    #[must_use]
    pub fn create(input: NewCampaign, created_at: DateTime<Utc>) -> Self {
        Self {
            id: CampaignId::new(),
            name: input.name.into(),
            description: input.description,
            phishing_type: input.phishing_type,
            difficulty: input.difficulty,
            email_subject: input.email_subject,
            email_content: input.email_content,
            target_audience: input.target_audience,
            status: CampaignStatus::Draft,
            created_at,
            sent_at: None,
            is_active: true,
        }
    }

    /// Renders the lure body for one recipient.
    ///
    /// Campaigns without a body get a minimal link so every dispatch still
    /// carries the tracking URL.
    #[must_use]
    pub fn render_body(&self, tracking_url: &str) -> String {
        match self.email_content.as_deref() {
            Some(content) if content.contains(TRACKING_URL_PLACEHOLDER) => {
                content.replace(TRACKING_URL_PLACEHOLDER, tracking_url)
            }
            Some(content) => {
                format!("{content}\n<p><a href=\"{tracking_url}\">{tracking_url}</a></p>")
            }
            None => format!("<p><a href=\"{tracking_url}\">{tracking_url}</a></p>"),
        }
    }
}
