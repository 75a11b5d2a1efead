use chrono::Utc;
use phishwise_application::{
    CampaignRepository, InteractionFilter, InteractionRepository, UserRepository,
};
use phishwise_domain::{
    Campaign, Interaction, InteractionType, NewCampaign, NewInteraction, NewTrainingUser,
    TrainingUser,
};
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;

use super::PostgresInteractionRepository;
use crate::{PostgresCampaignRepository, PostgresUserRepository};

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for postgres interaction tests: {error}");
    }

    Some(pool)
}

#[tokio::test]
async fn listing_joins_labels_and_applies_campaign_and_type_filters() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let users = PostgresUserRepository::new(pool.clone());
    let campaigns = PostgresCampaignRepository::new(pool.clone());
    let repository = PostgresInteractionRepository::new(pool);

    let user_input = NewTrainingUser::new(
        format!("{}@university.edu", uuid::Uuid::new_v4().simple()).as_str(),
        Some("Sam Student".to_owned()),
        None,
        None,
    );
    let campaign_input = NewCampaign::new("Library fine", None, None, None, None, None, None);
    let (Ok(user_input), Ok(campaign_input)) = (user_input, campaign_input) else {
        panic!("fixtures should validate");
    };
    let user = TrainingUser::register(user_input, Utc::now());
    let campaign = Campaign::create(campaign_input, Utc::now());
    assert!(users.insert_user(&user).await.is_ok());
    assert!(campaigns.insert_campaign(&campaign).await.is_ok());

    for interaction_type in [InteractionType::Click, InteractionType::Report] {
        let interaction = Interaction::record(
            NewInteraction::new(interaction_type, Some(user.id), Some(campaign.id)),
            Utc::now(),
        );
        assert!(repository.insert_interaction(&interaction).await.is_ok());
    }

    let by_campaign = InteractionFilter {
        campaign_id: Some(campaign.id),
        ..InteractionFilter::default()
    };
    let listed = repository
        .list_interactions(by_campaign, None, 0)
        .await
        .unwrap_or_default();
    assert_eq!(listed.len(), 2);
    assert!(listed.iter().all(|row| {
        row.user_name.as_deref() == Some("Sam Student")
            && row.campaign_name.as_deref() == Some("Library fine")
    }));

    let reports = repository
        .list_interactions(
            InteractionFilter {
                interaction_type: Some(InteractionType::Report),
                ..by_campaign
            },
            Some(20),
            0,
        )
        .await
        .unwrap_or_default();
    assert_eq!(reports.len(), 1);
    assert_eq!(
        reports.first().map(|row| row.interaction.risk_score),
        Some(0)
    );

    let counts = repository.count_interactions().await.unwrap_or_default();
    assert!(counts.total >= 2);
    assert!(counts.clicks >= 1);
}
