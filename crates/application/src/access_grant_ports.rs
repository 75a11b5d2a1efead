use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use phishwise_core::{AppError, AppResult};
use phishwise_domain::{ACCESS_CODE_LENGTH, AccessCode, AccessGrant, GrantRejection};

/// How record-use treats the usage ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UsePolicy {
    /// Increment only while the grant is active, unexpired and below
    /// `max_uses`, as one atomic step.
    #[default]
    Strict,
    /// Always increment; concurrent callers may overshoot the ceiling.
    BestEffort,
}

impl UsePolicy {
    /// Returns a stable configuration value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::BestEffort => "best_effort",
        }
    }
}

impl FromStr for UsePolicy {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "strict" => Ok(Self::Strict),
            "best_effort" => Ok(Self::BestEffort),
            _ => Err(AppError::Validation(format!(
                "access use policy must be either 'strict' or 'best_effort', got '{value}'"
            ))),
        }
    }
}

/// Result of a record-use attempt at the storage layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordUseOutcome {
    /// The counter was incremented to `used_count`.
    Recorded {
        /// Counter value after the increment.
        used_count: u32,
    },
    /// Strict policy refused the increment for this reason.
    Refused(GrantRejection),
    /// No grant carries this code.
    NotFound,
}

/// Grant projection for administrative listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessGrantListing {
    /// Stored grant.
    pub grant: AccessGrant,
    /// Name of the linked campaign, when it exists.
    pub campaign_name: Option<String>,
}

/// Repository port for access grant persistence.
#[async_trait]
pub trait AccessGrantRepository: Send + Sync {
    /// Persists a new grant. Returns `Conflict` when the code is already taken.
    async fn insert_grant(&self, grant: &AccessGrant) -> AppResult<()>;

    /// Finds a grant by exact code.
    async fn find_grant(&self, code: &AccessCode) -> AppResult<Option<AccessGrant>>;

    /// Adds one use to the grant according to `policy`, judged at `now`.
    async fn record_use(
        &self,
        code: &AccessCode,
        policy: UsePolicy,
        now: DateTime<Utc>,
    ) -> AppResult<RecordUseOutcome>;

    /// Marks a grant inactive. Returns whether a grant matched.
    async fn revoke_grant(&self, code: &AccessCode) -> AppResult<bool>;

    /// Lists every grant, newest first, with the linked campaign name.
    async fn list_grants(&self) -> AppResult<Vec<AccessGrantListing>>;
}

/// Port for producing fresh access codes.
pub trait AccessCodeGenerator: Send + Sync {
    /// Returns a new random code.
    fn generate(&self) -> AppResult<AccessCode>;
}

/// Generator backed by the operating system's random source.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomAccessCodeGenerator;

impl AccessCodeGenerator for RandomAccessCodeGenerator {
    fn generate(&self) -> AppResult<AccessCode> {
        let mut entropy = [0_u8; ACCESS_CODE_LENGTH];
        getrandom::fill(&mut entropy).map_err(|error| {
            AppError::Internal(format!("failed to generate access code: {error}"))
        })?;

        Ok(AccessCode::from_entropy(entropy))
    }
}
