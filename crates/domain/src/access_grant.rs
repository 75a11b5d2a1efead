//! Externally shareable access grants.
//!
//! A grant gates one or more external entries into a campaign simulation.
//! Expiry and exhaustion are evaluated lazily against a caller-supplied
//! instant; nothing transitions in the background.

use chrono::{DateTime, Duration, Utc};
use phishwise_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::{CampaignId, UserId};

/// Symbols used in access codes. Ambiguous glyphs (`0`, `O`, `1`, `I`) are left out.
pub const ACCESS_CODE_ALPHABET: &[u8; 32] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Number of symbols in an access code.
pub const ACCESS_CODE_LENGTH: usize = 8;

/// Short, human-shareable access code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccessCode(String);

impl AccessCode {
    /// Builds a code from raw entropy.
    ///
    /// The alphabet has 32 symbols, so the low five bits of each byte select a
    /// symbol with uniform probability.
    #[must_use]
    pub fn from_entropy(entropy: [u8; ACCESS_CODE_LENGTH]) -> Self {
        let code = entropy
            .iter()
            .map(|byte| char::from(ACCESS_CODE_ALPHABET[usize::from(byte & 0x1f)]))
            .collect();

        Self(code)
    }

    /// Parses a presented code. Matching is exact: no case folding.
    pub fn parse(value: &str) -> AppResult<Self> {
        if value.len() != ACCESS_CODE_LENGTH
            || !value
                .bytes()
                .all(|byte| ACCESS_CODE_ALPHABET.contains(&byte))
        {
            return Err(AppError::Validation(format!(
                "access code must be {ACCESS_CODE_LENGTH} characters from the code alphabet"
            )));
        }

        Ok(Self(value.to_owned()))
    }

    /// Returns the code string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for AccessCode {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// Why a presented code does not grant entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantRejection {
    /// No grant with this code, or the grant was revoked.
    UnknownOrInactive,
    /// The validity window has passed.
    Expired,
    /// `used_count` reached `max_uses`.
    UsageLimitReached,
}

impl GrantRejection {
    /// Display reason returned to callers.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::UnknownOrInactive => "unknown or inactive code",
            Self::Expired => "expired",
            Self::UsageLimitReached => "usage limit reached",
        }
    }
}

impl std::fmt::Display for GrantRejection {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.reason())
    }
}

/// Derived lifecycle state of a grant at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantStatus {
    /// Usable.
    Active,
    /// All uses consumed.
    Exhausted,
    /// Past its expiry.
    Expired,
    /// Revoked.
    Inactive,
}

impl GrantStatus {
    /// Returns a stable transport value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Exhausted => "exhausted",
            Self::Expired => "expired",
            Self::Inactive => "inactive",
        }
    }
}

/// Time- and usage-limited access grant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessGrant {
    code: AccessCode,
    subject_user: Option<UserId>,
    subject_campaign: Option<CampaignId>,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    active: bool,
    used_count: u32,
    max_uses: u32,
}

impl AccessGrant {
    /// Issues a fresh, unused grant valid for `valid_days` from `now`.
    ///
    /// `valid_days` may be zero or negative, which yields a grant that is
    /// already expired. `max_uses` must be at least one.
    pub fn issue(
        code: AccessCode,
        subject_user: Option<UserId>,
        subject_campaign: Option<CampaignId>,
        valid_days: i64,
        max_uses: u32,
        now: DateTime<Utc>,
    ) -> AppResult<Self> {
        if max_uses == 0 {
            return Err(AppError::Validation(
                "max_uses must be greater than zero".to_owned(),
            ));
        }

        let window = Duration::try_days(valid_days).ok_or_else(|| {
            AppError::Validation(format!("valid_days '{valid_days}' is out of range"))
        })?;
        let expires_at = now.checked_add_signed(window).ok_or_else(|| {
            AppError::Validation(format!("valid_days '{valid_days}' is out of range"))
        })?;

        Ok(Self {
            code,
            subject_user,
            subject_campaign,
            created_at: now,
            expires_at,
            active: true,
            used_count: 0,
            max_uses,
        })
    }

    /// Rehydrates a grant from storage.
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn restore(
        code: AccessCode,
        subject_user: Option<UserId>,
        subject_campaign: Option<CampaignId>,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
        active: bool,
        used_count: u32,
        max_uses: u32,
    ) -> Self {
        Self {
            code,
            subject_user,
            subject_campaign,
            created_at,
            expires_at,
            active,
            used_count,
            max_uses,
        }
    }

    /// Returns the access code.
    #[must_use]
    pub fn code(&self) -> &AccessCode {
        &self.code
    }

    /// Returns the informational subject user.
    #[must_use]
    pub fn subject_user(&self) -> Option<UserId> {
        self.subject_user
    }

    /// Returns the campaign this grant unlocks, if any.
    #[must_use]
    pub fn subject_campaign(&self) -> Option<CampaignId> {
        self.subject_campaign
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the absolute expiry timestamp.
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Returns whether the grant has not been revoked.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Returns the number of recorded uses.
    #[must_use]
    pub fn used_count(&self) -> u32 {
        self.used_count
    }

    /// Returns the usage ceiling.
    #[must_use]
    pub fn max_uses(&self) -> u32 {
        self.max_uses
    }

    /// Uses left before exhaustion.
    #[must_use]
    pub fn remaining_uses(&self) -> u32 {
        self.max_uses.saturating_sub(self.used_count)
    }

    /// Checks whether the grant admits entry at `now`.
    ///
    /// Checks run in order: revocation, expiry, exhaustion. On success the
    /// remaining use count is returned.
    pub fn evaluate(&self, now: DateTime<Utc>) -> Result<u32, GrantRejection> {
        if !self.active {
            return Err(GrantRejection::UnknownOrInactive);
        }

        if self.expires_at < now {
            return Err(GrantRejection::Expired);
        }

        if self.used_count >= self.max_uses {
            return Err(GrantRejection::UsageLimitReached);
        }

        Ok(self.remaining_uses())
    }

    /// Derived lifecycle state at `now`.
    #[must_use]
    pub fn status(&self, now: DateTime<Utc>) -> GrantStatus {
        match self.evaluate(now) {
            Ok(_) => GrantStatus::Active,
            Err(GrantRejection::UnknownOrInactive) => GrantStatus::Inactive,
            Err(GrantRejection::Expired) => GrantStatus::Expired,
            Err(GrantRejection::UsageLimitReached) => GrantStatus::Exhausted,
        }
    }

    /// Increments the use counter only while below the ceiling.
    ///
    /// Returns whether a use was recorded.
    pub fn try_record_use(&mut self) -> bool {
        if self.used_count >= self.max_uses {
            return false;
        }

        self.used_count += 1;
        true
    }

    /// Increments the use counter without checking the ceiling.
    pub fn force_record_use(&mut self) {
        self.used_count = self.used_count.saturating_add(1);
    }

    /// Marks the grant as revoked.
    pub fn revoke(&mut self) {
        self.active = false;
    }
}
