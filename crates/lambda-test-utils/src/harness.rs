// SPDX-FileCopyrightText: 2026 Project Lambda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for integration testing.
//!
//! `TestHarness` opens a migrated SQLite database in a temp directory and
//! wraps it in a [`Registry`], the same way the binary composes the layer.

use std::sync::Arc;

use chrono::NaiveDate;
use lambda_config::model::{LambdaConfig, ShowcaseConfig, StorageConfig};
use lambda_core::{EntityId, LambdaError};
use lambda_storage::{Database, Lunch, Meal, Params, Persist, Registry, User};
use tracing::debug;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    busy_timeout_ms: u64,
    stall_ms: u64,
    users: Vec<(String, f64)>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            busy_timeout_ms: 1_000,
            stall_ms: 200,
            users: Vec::new(),
        }
    }

    /// How long statements wait on a locked database.
    pub fn with_busy_timeout_ms(mut self, ms: u64) -> Self {
        self.busy_timeout_ms = ms;
        self
    }

    /// Stall used by the showcase settings of the harness config.
    pub fn with_stall_ms(mut self, ms: u64) -> Self {
        self.stall_ms = ms;
        self
    }

    /// Seed a user when the harness is built.
    pub fn with_user(mut self, username: &str, credit: f64) -> Self {
        self.users.push((username.to_string(), credit));
        self
    }

    /// Build the test harness, creating the database and seeding users.
    pub async fn build(self) -> Result<TestHarness, LambdaError> {
        let temp_dir =
            tempfile::TempDir::new().map_err(|e| LambdaError::Storage { source: e.into() })?;
        let db_path = temp_dir.path().join("test.db");

        let config = LambdaConfig {
            storage: StorageConfig {
                database_path: db_path.to_string_lossy().to_string(),
                wal_mode: true,
                busy_timeout_ms: self.busy_timeout_ms,
            },
            showcase: ShowcaseConfig {
                stall_ms: self.stall_ms,
                ..ShowcaseConfig::default()
            },
            ..LambdaConfig::default()
        };

        let db = Database::open_with_config(&config.storage).await?;
        let registry = Arc::new(Registry::new(db));

        let harness = TestHarness {
            config,
            registry,
            _temp_dir: temp_dir,
        };
        for (username, credit) in &self.users {
            harness.seed_user(username, *credit).await?;
        }
        Ok(harness)
    }
}

/// A temp database with the registry built on it.
pub struct TestHarness {
    /// Configuration pointing at the temp database.
    pub config: LambdaConfig,
    /// Registry owning the database handle.
    pub registry: Arc<Registry>,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    pub fn db(&self) -> &Database {
        self.registry.database()
    }

    /// Save a user with a fixed name and password hash.
    pub async fn seed_user(&self, username: &str, credit: f64) -> Result<User, LambdaError> {
        let mut user = User::new("Test", "User", username, "not-a-real-hash", credit);
        user.try_save(self.db()).await?;
        debug!(username, id = %user.id, credit, "seeded user");
        Ok(user)
    }

    /// Save one meal per seeded meal type and a lunch made of them.
    pub async fn seed_lunch(&self, price: f64) -> Result<Lunch, LambdaError> {
        let mut ids = Vec::with_capacity(3);
        for (type_id, name) in [(1, "Tomato soup"), (2, "Schnitzel"), (3, "Apple pie")] {
            let mut meal = Meal::new(EntityId(type_id), name);
            ids.push(meal.try_save(self.db()).await?);
        }
        let date = NaiveDate::from_ymd_opt(2026, 3, 2)
            .ok_or_else(|| LambdaError::Internal("invalid seed date".to_string()))?;
        let deadline = date
            .and_hms_opt(9, 30, 0)
            .ok_or_else(|| LambdaError::Internal("invalid seed deadline".to_string()))?;
        let mut lunch = Lunch::new(ids[0], ids[1], ids[2], price, date, deadline);
        lunch.try_save(self.db()).await?;
        Ok(lunch)
    }

    /// Stored credit of a user, read outside any transaction.
    pub async fn credit_of(&self, id: EntityId) -> Result<Option<f64>, LambdaError> {
        self.db()
            .execute_scalar(User::SELECT_CREDIT, Params::new().with("@ID", id.get()))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lambda_storage::EntitySet;

    #[tokio::test]
    async fn harness_seeds_users_on_build() {
        let harness = TestHarness::builder()
            .with_user("admin", 1000.0)
            .with_user("guest", 5.0)
            .build()
            .await
            .unwrap();

        let users = harness.registry.retriever::<User>().unwrap();
        let all = users.get_all().await.unwrap();
        assert_eq!(all.len(), 2);
        let admin = users
            .get_first_by(&|u: &User| u.username == "admin")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(harness.credit_of(admin.id).await.unwrap(), Some(1000.0));
    }

    #[tokio::test]
    async fn harness_config_points_at_temp_database() {
        let harness = TestHarness::builder()
            .with_busy_timeout_ms(50)
            .with_stall_ms(10)
            .build()
            .await
            .unwrap();
        assert_eq!(harness.config.storage.busy_timeout_ms, 50);
        assert_eq!(harness.config.showcase.stall_ms, 10);
        assert_eq!(harness.db().path(), harness.config.storage.database_path);
        assert!(harness.db().path().ends_with("test.db"));
    }

    #[tokio::test]
    async fn seeded_lunch_is_saved() {
        let harness = TestHarness::builder().build().await.unwrap();
        let lunch = harness.seed_lunch(4.5).await.unwrap();
        assert!(!lunch.id.is_unsaved());
        assert_eq!(lunch.price, 4.5);
    }
}
