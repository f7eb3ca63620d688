// SPDX-FileCopyrightText: 2026 Project Lambda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `lambda week` and `lambda report` command implementations.

use chrono::NaiveDate;
use lambda_core::{EntityId, EntityKind, LambdaError};
use lambda_storage::ordering::{MonthlyReport, lunches_for_week, monthly_report};
use lambda_storage::{EntitySet, Lunch, Meal, Registry, User};

/// Lunches offered in the ISO week of `day`, one block per lunch.
pub async fn run_week(registry: &Registry, day: NaiveDate) -> Result<Vec<String>, LambdaError> {
    let lunches = lunches_for_week(&*registry.cache::<Lunch>()?, day).await?;
    let meals = registry.cache::<Meal>()?;
    meals.get_all().await?;

    let name = |id: EntityId| {
        meals
            .get(id)
            .map(|meal| meal.name)
            .unwrap_or_else(|| format!("meal {id}"))
    };
    Ok(lunches
        .iter()
        .map(|lunch| {
            format!(
                "{} - {:.2} credits\nSoup: {}\nMain course: {}\nDessert: {}",
                lunch.date.format("%d/%m/%Y"),
                lunch.price,
                name(lunch.soup_id),
                name(lunch.main_meal_id),
                name(lunch.dessert_id),
            )
        })
        .collect())
}

pub async fn run_report(
    registry: &Registry,
    username: &str,
    year: i32,
    month: u32,
) -> Result<MonthlyReport, LambdaError> {
    let user = registry
        .retriever::<User>()?
        .get_first_by(&|user: &User| user.username == username)
        .await?
        .ok_or_else(|| LambdaError::NotFound {
            entity: EntityKind::User,
            detail: format!("username {username}"),
        })?;
    monthly_report(registry.database(), &user, year, month).await
}
