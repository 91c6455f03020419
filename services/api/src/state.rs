//! Application state shared across handlers

use common::jwt::JwtService;
use sqlx::PgPool;
use std::sync::Arc;

use crate::repositories::{
    AttributeRepository, InMemoryRepository, PgRepository, RecipeRepository,
};
use crate::storage::MediaStorage;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub attributes: Arc<dyn AttributeRepository>,
    pub recipes: Arc<dyn RecipeRepository>,
    pub jwt_service: JwtService,
    pub media: MediaStorage,
}

impl AppState {
    /// State backed by PostgreSQL
    pub fn postgres(pool: PgPool, jwt_service: JwtService, media: MediaStorage) -> Self {
        let repository = PgRepository::new(pool);
        Self {
            attributes: Arc::new(repository.clone()),
            recipes: Arc::new(repository),
            jwt_service,
            media,
        }
    }

    /// State backed by the in-memory store
    pub fn in_memory(jwt_service: JwtService, media: MediaStorage) -> Self {
        let repository = InMemoryRepository::new();
        Self {
            attributes: Arc::new(repository.clone()),
            recipes: Arc::new(repository),
            jwt_service,
            media,
        }
    }
}
