//! Access grant ledger: issue, validate, consume and list external access codes.
//!
//! Validation never mutates state. Consumption is a separate storage round
//! trip; under [`UsePolicy::Strict`] the repository performs it as one
//! conditional update so concurrent visitors cannot push a grant past its
//! ceiling.

use std::sync::Arc;

use tracing::{info, warn};

use phishwise_core::{AppError, AppResult};
use phishwise_domain::{AccessCode, AccessGrant, CampaignId, GrantRejection, UserId};

use crate::access_grant_ports::{
    AccessCodeGenerator, AccessGrantListing, AccessGrantRepository, RandomAccessCodeGenerator,
    RecordUseOutcome, UsePolicy,
};
use crate::{CampaignRepository, Clock};

/// Attempts made to find an unused code before giving up.
const MAX_CODE_ATTEMPTS: usize = 5;

/// Input payload for issuing a grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IssueAccessGrantInput {
    /// Informational subject user.
    pub subject_user: Option<UserId>,
    /// Campaign the grant unlocks.
    pub subject_campaign: Option<CampaignId>,
    /// Validity window in days.
    pub valid_days: i64,
    /// Usage ceiling.
    pub max_uses: u32,
}

/// Newly issued grant together with its shareable link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedAccessGrant {
    /// Persisted grant.
    pub grant: AccessGrant,
    /// Fully-qualified external entry URL.
    pub external_url: String,
    /// Base URL the entry URL was built from.
    pub base_url: String,
}

/// Successful validation details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidAccess {
    /// Stored grant.
    pub grant: AccessGrant,
    /// Name of the linked campaign, when it exists.
    pub campaign_name: Option<String>,
    /// `max_uses - used_count`.
    pub remaining_uses: u32,
}

/// Outcome of validating a presented code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessValidation {
    /// The code admits entry.
    Valid(ValidAccess),
    /// The code is refused.
    Invalid(GrantRejection),
}

impl AccessValidation {
    /// Returns whether the code admits entry.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }
}

/// Result of a validate-then-consume entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RedeemedAccess {
    /// Informational subject user of the grant.
    pub subject_user: Option<UserId>,
    /// Campaign to route the visitor to.
    pub subject_campaign: Option<CampaignId>,
    /// Uses left after this entry.
    pub remaining_uses: u32,
}

/// Builds the external entry URL for a code.
#[must_use]
pub fn external_login_url(base_url: &str, code: &AccessCode) -> String {
    format!("{}/external/login/{}", base_url.trim_end_matches('/'), code)
}

/// Application service for the access grant ledger.
#[derive(Clone)]
pub struct AccessGrantService {
    repository: Arc<dyn AccessGrantRepository>,
    campaign_repository: Arc<dyn CampaignRepository>,
    clock: Arc<dyn Clock>,
    code_generator: Arc<dyn AccessCodeGenerator>,
    use_policy: UsePolicy,
}

impl AccessGrantService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        repository: Arc<dyn AccessGrantRepository>,
        campaign_repository: Arc<dyn CampaignRepository>,
        clock: Arc<dyn Clock>,
        use_policy: UsePolicy,
    ) -> Self {
        Self {
            repository,
            campaign_repository,
            clock,
            code_generator: Arc::new(RandomAccessCodeGenerator),
            use_policy,
        }
    }

    /// Replaces the code generator.
    #[must_use]
    pub fn with_code_generator(mut self, code_generator: Arc<dyn AccessCodeGenerator>) -> Self {
        self.code_generator = code_generator;
        self
    }

    /// Returns the configured record-use policy.
    #[must_use]
    pub fn use_policy(&self) -> UsePolicy {
        self.use_policy
    }

    /// Issues a new grant and returns its external entry URL.
    pub async fn issue(
        &self,
        input: IssueAccessGrantInput,
        base_url: &str,
    ) -> AppResult<IssuedAccessGrant> {
        let now = self.clock.now();

        for _ in 0..MAX_CODE_ATTEMPTS {
            let code = self.code_generator.generate()?;
            let grant = AccessGrant::issue(
                code,
                input.subject_user,
                input.subject_campaign,
                input.valid_days,
                input.max_uses,
                now,
            )?;

            match self.repository.insert_grant(&grant).await {
                Ok(()) => {
                    info!(
                        code = %grant.code(),
                        expires_at = %grant.expires_at(),
                        max_uses = grant.max_uses(),
                        "issued access grant"
                    );
                    let base_url = base_url.trim_end_matches('/').to_owned();
                    return Ok(IssuedAccessGrant {
                        external_url: external_login_url(&base_url, grant.code()),
                        base_url,
                        grant,
                    });
                }
                Err(AppError::Conflict(_)) => {
                    warn!(code = %grant.code(), "access code collision, regenerating");
                }
                Err(error) => return Err(error),
            }
        }

        Err(AppError::Internal(format!(
            "failed to allocate a unique access code after {MAX_CODE_ATTEMPTS} attempts"
        )))
    }

    /// Checks whether a code currently admits entry. Has no side effects.
    pub async fn validate(&self, code: &str) -> AppResult<AccessValidation> {
        let Ok(code) = AccessCode::parse(code) else {
            return Ok(AccessValidation::Invalid(GrantRejection::UnknownOrInactive));
        };

        let Some(grant) = self.repository.find_grant(&code).await? else {
            return Ok(AccessValidation::Invalid(GrantRejection::UnknownOrInactive));
        };

        let remaining_uses = match grant.evaluate(self.clock.now()) {
            Ok(remaining_uses) => remaining_uses,
            Err(rejection) => return Ok(AccessValidation::Invalid(rejection)),
        };

        let campaign_name = match grant.subject_campaign() {
            Some(campaign_id) => self
                .campaign_repository
                .find_campaign(campaign_id)
                .await?
                .map(|campaign| campaign.name),
            None => None,
        };

        Ok(AccessValidation::Valid(ValidAccess {
            grant,
            campaign_name,
            remaining_uses,
        }))
    }

    /// Adds one use to a grant and returns the new use count.
    ///
    /// Not idempotent. Under the strict policy a revoked, expired or
    /// exhausted grant fails with `Conflict`; the best-effort policy
    /// increments regardless.
    pub async fn record_use(&self, code: &str) -> AppResult<u32> {
        let parsed = AccessCode::parse(code)
            .map_err(|_| AppError::NotFound(format!("access code '{code}' does not exist")))?;

        match self
            .repository
            .record_use(&parsed, self.use_policy, self.clock.now())
            .await?
        {
            RecordUseOutcome::Recorded { used_count } => Ok(used_count),
            RecordUseOutcome::Refused(rejection) => {
                Err(AppError::Conflict(rejection.reason().to_owned()))
            }
            RecordUseOutcome::NotFound => Err(AppError::NotFound(format!(
                "access code '{code}' does not exist"
            ))),
        }
    }

    /// Validates a code and consumes one use for an external entry.
    ///
    /// The inner `Err` carries the reason an entry is refused.
    pub async fn redeem(&self, code: &str) -> AppResult<Result<RedeemedAccess, GrantRejection>> {
        let valid = match self.validate(code).await? {
            AccessValidation::Valid(valid) => valid,
            AccessValidation::Invalid(rejection) => {
                warn!(code, reason = rejection.reason(), "access code refused");
                return Ok(Err(rejection));
            }
        };

        let outcome = self
            .repository
            .record_use(valid.grant.code(), self.use_policy, self.clock.now())
            .await?;

        let used_count = match outcome {
            RecordUseOutcome::Recorded { used_count } => used_count,
            RecordUseOutcome::Refused(rejection) => {
                warn!(
                    code,
                    reason = rejection.reason(),
                    "access code refused by a concurrent change"
                );
                return Ok(Err(rejection));
            }
            RecordUseOutcome::NotFound => return Ok(Err(GrantRejection::UnknownOrInactive)),
        };

        info!(code, used_count, "access code redeemed");

        Ok(Ok(RedeemedAccess {
            subject_user: valid.grant.subject_user(),
            subject_campaign: valid.grant.subject_campaign(),
            remaining_uses: valid.grant.max_uses().saturating_sub(used_count),
        }))
    }

    /// Revokes a grant so it no longer validates.
    pub async fn revoke(&self, code: &str) -> AppResult<()> {
        let not_found = || AppError::NotFound(format!("access code '{code}' does not exist"));
        let parsed = AccessCode::parse(code).map_err(|_| not_found())?;

        if !self.repository.revoke_grant(&parsed).await? {
            return Err(not_found());
        }

        info!(code, "access grant revoked");
        Ok(())
    }

    /// Lists every grant, newest first.
    pub async fn list(&self) -> AppResult<Vec<AccessGrantListing>> {
        self.repository.list_grants().await
    }

    /// Current instant according to the service clock.
    #[must_use]
    pub fn now(&self) -> chrono::DateTime<chrono::Utc> {
        self.clock.now()
    }
}
