use phishwise_domain::TrainingUser;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Incoming payload for user registration.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-user-request.ts"
)]
pub struct CreateUserRequest {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub user_type: Option<String>,
}

/// API representation of a training user.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/user-response.ts"
)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub department: Option<String>,
    pub user_type: String,
    pub registration_date: String,
    pub is_active: bool,
}

impl From<TrainingUser> for UserResponse {
    fn from(user: TrainingUser) -> Self {
        Self {
            id: user.id.to_string(),
            user_type: user.user_type.as_str().to_owned(),
            registration_date: user.registered_at.to_rfc3339(),
            email: user.email.into(),
            name: user.name,
            department: user.department,
            is_active: user.is_active,
        }
    }
}
