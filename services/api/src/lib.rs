//! Recipe API service
//!
//! Owner-scoped CRUD for recipes, tags and ingredients, plus recipe image
//! uploads. Every request is authenticated with an access token issued by
//! the auth service.

pub mod access;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod serializers;
pub mod state;
pub mod storage;

pub use state::AppState;
