// SPDX-FileCopyrightText: 2026 Project Lambda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared setup for storage integration tests.

#![allow(dead_code)]

use std::time::Duration;

use chrono::NaiveDate;
use lambda_core::EntityId;
use lambda_storage::{ConnectionOptions, Database, Lunch, Meal, Persist, User};
use tempfile::TempDir;

pub async fn open_temp() -> (Database, TempDir) {
    open_temp_with(Duration::from_secs(5)).await
}

pub async fn open_temp_with(busy_timeout: Duration) -> (Database, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lambda-test.db");
    let db = Database::open_with(
        path.to_str().unwrap(),
        ConnectionOptions {
            wal_mode: true,
            busy_timeout,
        },
    )
    .await
    .unwrap();
    (db, dir)
}

pub async fn seed_user(db: &Database, username: &str, credit: f64) -> User {
    let mut user = User::new("Test", "User", username, "not-a-real-hash", credit);
    user.try_save(db).await.unwrap();
    user
}

/// Saves one meal per seeded type and a lunch made of them.
pub async fn seed_lunch(db: &Database, price: f64) -> Lunch {
    let mut ids = Vec::new();
    for (type_id, name) in [(1, "Tomato soup"), (2, "Schnitzel"), (3, "Apple pie")] {
        let mut meal = Meal::new(EntityId(type_id), name);
        ids.push(meal.try_save(db).await.unwrap());
    }
    let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
    let mut lunch = Lunch::new(
        ids[0],
        ids[1],
        ids[2],
        price,
        date,
        date.and_hms_opt(9, 30, 0).unwrap(),
    );
    lunch.try_save(db).await.unwrap();
    lunch
}

pub async fn credit_of(db: &Database, user: &User) -> f64 {
    db.execute_scalar(
        User::SELECT_CREDIT,
        lambda_storage::Params::new().with("@ID", user.id.get()),
    )
    .await
    .unwrap()
    .unwrap()
}
