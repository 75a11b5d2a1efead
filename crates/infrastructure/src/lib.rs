//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_training_repository;
mod postgres_access_grant_repository;
mod postgres_campaign_repository;
mod postgres_interaction_repository;
mod postgres_user_repository;

pub use in_memory_training_repository::InMemoryTrainingRepository;
pub use postgres_access_grant_repository::PostgresAccessGrantRepository;
pub use postgres_campaign_repository::PostgresCampaignRepository;
pub use postgres_interaction_repository::PostgresInteractionRepository;
pub use postgres_user_repository::PostgresUserRepository;
