use chrono::Utc;
use phishwise_application::CampaignRepository;
use phishwise_domain::{Campaign, CampaignId, CampaignStatus, DifficultyLevel, NewCampaign};
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;

use super::PostgresCampaignRepository;

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
        panic!("failed to run migrations for postgres campaign tests: {error}");
    }

    Some(pool)
}

#[tokio::test]
async fn insert_find_and_mark_sent() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresCampaignRepository::new(pool);

    let input = NewCampaign::new(
        "Parcel delivery notice",
        Some("Courier lure".to_owned()),
        Some("sms"),
        Some("easy"),
        None,
        Some("Track it: {tracking_url}".to_owned()),
        Some("students".to_owned()),
    );
    let Ok(input) = input else {
        panic!("campaign input should validate");
    };
    let campaign = Campaign::create(input, Utc::now());
    assert!(repository.insert_campaign(&campaign).await.is_ok());

    let found = repository.find_campaign(campaign.id).await;
    let Ok(Some(found)) = found else {
        panic!("campaign should be found");
    };
    assert_eq!(found.difficulty, DifficultyLevel::Easy);
    assert_eq!(found.target_audience, "students");
    assert_eq!(found.status, CampaignStatus::Draft);

    assert_eq!(
        repository.mark_sent(campaign.id, Utc::now()).await.ok(),
        Some(true)
    );
    let sent = repository.find_campaign(campaign.id).await.ok().flatten();
    assert_eq!(sent.as_ref().map(|value| value.status), Some(CampaignStatus::Sent));
    assert!(sent.and_then(|value| value.sent_at).is_some());

    let listed = repository.list_campaigns().await.unwrap_or_default();
    assert!(listed.iter().any(|value| value.id == campaign.id));
}

#[tokio::test]
async fn mark_sent_on_unknown_campaign_matches_nothing() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresCampaignRepository::new(pool);

    assert_eq!(
        repository.mark_sent(CampaignId::new(), Utc::now()).await.ok(),
        Some(false)
    );
}
