//! Integration tests for the infrastructure components
//!
//! These tests verify that the PostgreSQL database is properly configured,
//! accessible from the application and that the schema migrations apply.
//! They need a running database: `cargo test -- --ignored`.

use common::database::{DatabaseConfig, health_check, init_pool, run_migrations};
use sqlx::Row;

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_database_integration() -> Result<(), Box<dyn std::error::Error>> {
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    assert!(health_check(&pool).await?, "Database health check failed");

    let row = sqlx::query("SELECT 1 as result").fetch_one(&pool).await?;
    let result: i32 = row.get("result");
    assert_eq!(result, 1, "PostgreSQL simple query test failed");

    // Running twice must be a no-op the second time
    run_migrations(&pool).await?;
    run_migrations(&pool).await?;

    for table in [
        "users",
        "tags",
        "ingredients",
        "recipes",
        "recipe_tags",
        "recipe_ingredients",
    ] {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM information_schema.tables WHERE table_name = $1)",
        )
        .bind(table)
        .fetch_one(&pool)
        .await?;
        assert!(exists, "table {} missing after migrations", table);
    }

    Ok(())
}
