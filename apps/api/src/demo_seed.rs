//! Idempotent demo data for fresh installations.

use phishwise_core::{AppError, AppResult};
use phishwise_domain::{NewCampaign, NewTrainingUser};
use tracing::info;

use crate::state::AppState;

struct DemoUser {
    email: &'static str,
    name: &'static str,
    department: &'static str,
    user_type: &'static str,
}

const DEMO_USERS: [DemoUser; 3] = [
    DemoUser {
        email: "admin@university.edu",
        name: "Admin User",
        department: "IT",
        user_type: "admin",
    },
    DemoUser {
        email: "student1@university.edu",
        name: "John Student",
        department: "Engineering",
        user_type: "student",
    },
    DemoUser {
        email: "employee1@university.edu",
        name: "Jane Employee",
        department: "Administration",
        user_type: "employee",
    },
];

struct DemoCampaign {
    name: &'static str,
    description: &'static str,
    difficulty: &'static str,
    subject: &'static str,
    content: &'static str,
}

const DEMO_CAMPAIGNS: [DemoCampaign; 2] = [
    DemoCampaign {
        name: "Account confirmation",
        description: "Generic request to confirm account details",
        difficulty: "easy",
        subject: "Action required: confirm your university account",
        content: "Dear user,\n\nWe noticed unusual activity on your account. \
                  Please confirm your details within 24 hours to avoid suspension:\n\
                  {tracking_url}\n\nIT Service Desk",
    },
    DemoCampaign {
        name: "Password update",
        description: "Urgent password expiry notice",
        difficulty: "medium",
        subject: "Your password expires today",
        content: "Hello,\n\nYour password will expire at midnight. \
                  Keep your current password by signing in here:\n\
                  {tracking_url}\n\nAccount Security Team",
    },
];

pub async fn run(state: &AppState) -> AppResult<()> {
    let mut seeded_users = 0_usize;
    for demo in &DEMO_USERS {
        let input = NewTrainingUser::new(
            demo.email,
            Some(demo.name.to_owned()),
            Some(demo.department.to_owned()),
            Some(demo.user_type),
        )?;

        match state.user_service.register_user(input).await {
            Ok(_) => seeded_users += 1,
            Err(AppError::Conflict(_)) => {}
            Err(error) => return Err(error),
        }
    }

    let mut seeded_campaigns = 0_usize;
    if state.campaign_service.list_campaigns().await?.is_empty() {
        for demo in &DEMO_CAMPAIGNS {
            let input = NewCampaign::new(
                demo.name,
                Some(demo.description.to_owned()),
                Some("email"),
                Some(demo.difficulty),
                Some(demo.subject.to_owned()),
                Some(demo.content.to_owned()),
                Some("all".to_owned()),
            )?;
            state.campaign_service.create_campaign(input).await?;
            seeded_campaigns += 1;
        }
    }

    info!(seeded_users, seeded_campaigns, "demo data ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::run;
    use crate::test_support::in_memory_state;

    #[tokio::test]
    async fn seeding_twice_keeps_one_copy_of_everything() {
        let state = in_memory_state(None);

        assert!(run(&state).await.is_ok());
        assert!(run(&state).await.is_ok());

        let users = state.user_service.list_users().await.unwrap_or_default();
        let campaigns = state
            .campaign_service
            .list_campaigns()
            .await
            .unwrap_or_default();

        assert_eq!(users.len(), 3);
        assert_eq!(campaigns.len(), 2);
        assert!(
            campaigns
                .iter()
                .all(|campaign| campaign.render_body("LINK").contains("LINK"))
        );
    }
}
