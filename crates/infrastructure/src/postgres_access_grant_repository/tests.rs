use chrono::{Duration, Utc};
use phishwise_application::{AccessGrantRepository, RecordUseOutcome, UsePolicy};
use phishwise_core::AppError;
use phishwise_domain::{ACCESS_CODE_LENGTH, AccessCode, AccessGrant, GrantRejection};
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;

use super::PostgresAccessGrantRepository;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(8)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for postgres access grant tests: {error}");
    }

    Some(pool)
}

fn fresh_code() -> AccessCode {
    let mut entropy = [0_u8; ACCESS_CODE_LENGTH];
    let seed = uuid::Uuid::new_v4();
    for (slot, byte) in entropy.iter_mut().zip(seed.as_bytes()) {
        *slot = *byte;
    }
    AccessCode::from_entropy(entropy)
}

async fn issue(repository: &PostgresAccessGrantRepository, max_uses: u32) -> AccessCode {
    let grant = AccessGrant::issue(fresh_code(), None, None, 30, max_uses, Utc::now());
    let Ok(grant) = grant else {
        panic!("grant input should validate");
    };
    assert!(repository.insert_grant(&grant).await.is_ok());
    grant.code().clone()
}

#[tokio::test]
async fn insert_and_find_round_trip_keeps_counters() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresAccessGrantRepository::new(pool);
    let code = issue(&repository, 3).await;

    let found = repository.find_grant(&code).await;
    let Ok(Some(found)) = found else {
        panic!("grant should be found");
    };

    assert_eq!(found.code(), &code);
    assert_eq!(found.used_count(), 0);
    assert_eq!(found.max_uses(), 3);
    assert!(found.is_active());
    assert!(found.expires_at() > found.created_at() + Duration::days(29));
}

#[tokio::test]
async fn duplicate_code_is_conflict() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresAccessGrantRepository::new(pool);
    let code = issue(&repository, 1).await;

    let duplicate = AccessGrant::issue(code, None, None, 30, 1, Utc::now());
    let Ok(duplicate) = duplicate else {
        panic!("grant input should validate");
    };

    assert!(matches!(
        repository.insert_grant(&duplicate).await,
        Err(AppError::Conflict(_))
    ));
}

#[tokio::test]
async fn strict_record_use_never_exceeds_ceiling_under_concurrency() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresAccessGrantRepository::new(pool);
    let code = issue(&repository, 3).await;

    let mut handles = Vec::new();
    for _ in 0..10 {
        let repository = repository.clone();
        let code = code.clone();
        handles.push(tokio::spawn(async move {
            repository
                .record_use(&code, UsePolicy::Strict, Utc::now())
                .await
        }));
    }

    let mut recorded = 0;
    let mut refused = 0;
    for handle in handles {
        match handle.await {
            Ok(Ok(RecordUseOutcome::Recorded { .. })) => recorded += 1,
            Ok(Ok(RecordUseOutcome::Refused(GrantRejection::UsageLimitReached))) => refused += 1,
            other => panic!("unexpected record-use outcome: {other:?}"),
        }
    }

    assert_eq!(recorded, 3);
    assert_eq!(refused, 7);

    let stored = repository.find_grant(&code).await;
    assert_eq!(
        stored.ok().flatten().map(|grant| grant.used_count()),
        Some(3)
    );
}

#[tokio::test]
async fn best_effort_record_use_passes_ceiling() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresAccessGrantRepository::new(pool);
    let code = issue(&repository, 1).await;

    for expected in 1..=2 {
        assert_eq!(
            repository
                .record_use(&code, UsePolicy::BestEffort, Utc::now())
                .await
                .ok(),
            Some(RecordUseOutcome::Recorded {
                used_count: expected
            })
        );
    }
}

#[tokio::test]
async fn record_use_and_revoke_on_unknown_code() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresAccessGrantRepository::new(pool);
    let unknown = fresh_code();

    assert_eq!(
        repository
            .record_use(&unknown, UsePolicy::Strict, Utc::now())
            .await
            .ok(),
        Some(RecordUseOutcome::NotFound)
    );
    assert_eq!(repository.revoke_grant(&unknown).await.ok(), Some(false));
}

#[tokio::test]
async fn strict_record_use_refuses_revoked_and_expired_grants() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresAccessGrantRepository::new(pool);
    let revoked = issue(&repository, 5).await;
    let expiring = issue(&repository, 5).await;
    assert_eq!(repository.revoke_grant(&revoked).await.ok(), Some(true));

    assert_eq!(
        repository
            .record_use(&revoked, UsePolicy::Strict, Utc::now())
            .await
            .ok(),
        Some(RecordUseOutcome::Refused(GrantRejection::UnknownOrInactive))
    );
    assert_eq!(
        repository
            .record_use(&expiring, UsePolicy::Strict, Utc::now() + Duration::days(31))
            .await
            .ok(),
        Some(RecordUseOutcome::Refused(GrantRejection::Expired))
    );

    for code in [&revoked, &expiring] {
        let stored = repository.find_grant(code).await;
        assert_eq!(
            stored.ok().flatten().map(|grant| grant.used_count()),
            Some(0)
        );
    }
}

#[tokio::test]
async fn revoke_marks_grant_inactive_and_list_includes_it() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresAccessGrantRepository::new(pool);
    let code = issue(&repository, 2).await;

    assert_eq!(repository.revoke_grant(&code).await.ok(), Some(true));

    let listed = repository.list_grants().await.unwrap_or_default();
    let entry = listed.iter().find(|listing| listing.grant.code() == &code);
    assert_eq!(entry.map(|listing| listing.grant.is_active()), Some(false));
    assert_eq!(entry.and_then(|listing| listing.campaign_name.clone()), None);
}
