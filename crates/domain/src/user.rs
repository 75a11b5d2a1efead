//! Training audience: students, employees and administrators that receive
//! simulated campaigns.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use phishwise_core::{AppError, AppResult, optional_text};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a training user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(Uuid);

impl UserId {
    /// Creates a new random user identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a user identifier from an existing UUID value.
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

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(value.trim())
            .map(Self)
            .map_err(|error| AppError::Validation(format!("invalid user id '{value}': {error}")))
    }
}

/// Validated, lower-cased email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Creates a validated email address.
    ///
    /// Performs basic structural validation: non-empty, contains exactly one `@`,
    /// local part and domain are non-empty, domain contains at least one `.`.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim().to_lowercase();

        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "email address must not be empty".to_owned(),
            ));
        }

        let Some((local, domain)) = trimmed.split_once('@') else {
            return Err(AppError::Validation(
                "email address must contain exactly one '@'".to_owned(),
            ));
        };

        if domain.contains('@') {
            return Err(AppError::Validation(
                "email address must contain exactly one '@'".to_owned(),
            ));
        }

        if local.is_empty() {
            return Err(AppError::Validation(
                "email local part must not be empty".to_owned(),
            ));
        }

        if domain.is_empty() || !domain.contains('.') {
            return Err(AppError::Validation(
                "email domain must contain at least one '.'".to_owned(),
            ));
        }

        if trimmed.len() > 254 {
            return Err(AppError::Validation(
                "email address must not exceed 254 characters".to_owned(),
            ));
        }

        Ok(Self(trimmed))
    }

    /// Returns the validated email string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

/// Audience category of a training user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    /// Enrolled student (default).
    #[default]
    Student,
    /// University staff member.
    Employee,
    /// Awareness programme administrator.
    Admin,
}

impl UserType {
    /// Returns a stable storage value for this user type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Employee => "employee",
            Self::Admin => "admin",
        }
    }
}

impl FromStr for UserType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "student" => Ok(Self::Student),
            "employee" => Ok(Self::Employee),
            "admin" => Ok(Self::Admin),
            _ => Err(AppError::Validation(format!(
                "unknown user type value '{value}'"
            ))),
        }
    }
}

/// Validated input for registering a training user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTrainingUser {
    /// Unique email address.
    pub email: EmailAddress,
    /// Optional display name.
    pub name: Option<String>,
    /// Optional department.
    pub department: Option<String>,
    /// Audience category.
    pub user_type: UserType,
}

impl NewTrainingUser {
    /// Validates raw registration values.
    pub fn new(
        email: &str,
        name: Option<String>,
        department: Option<String>,
        user_type: Option<&str>,
    ) -> AppResult<Self> {
        let user_type = match user_type.map(str::trim).filter(|value| !value.is_empty()) {
            Some(value) => UserType::from_str(value)?,
            None => UserType::default(),
        };

        Ok(Self {
            email: EmailAddress::new(email)?,
            name: optional_text(name),
            department: optional_text(department),
            user_type,
        })
    }
}

/// Registered training user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingUser {
    /// Stable identifier.
    pub id: UserId,
    /// Unique email address.
    pub email: EmailAddress,
    /// Optional display name.
    pub name: Option<String>,
    /// Optional department.
    pub department: Option<String>,
    /// Audience category.
    pub user_type: UserType,
    /// Registration timestamp.
    pub registered_at: DateTime<Utc>,
    /// Inactive users are skipped when campaigns are sent.
    pub is_active: bool,
}

impl TrainingUser {
    /// Materializes a new active user from validated input.
    #[must_use]
    pub fn register(input: NewTrainingUser, registered_at: DateTime<Utc>) -> Self {
        Self {
            id: UserId::new(),
            email: input.email,
            name: input.name,
            department: input.department,
            user_type: input.user_type,
            registered_at,
            is_active: true,
        }
    }

    /// Returns the name when present, otherwise the email.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.email.as_str())
    }
}
