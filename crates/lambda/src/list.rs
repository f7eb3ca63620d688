// SPDX-FileCopyrightText: 2026 Project Lambda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `lambda list` command implementation.

use std::fmt::Display;

use lambda_core::{EntityKind, LambdaError};
use lambda_storage::{Entity, EntitySet, Lunch, LunchOrder, Meal, MealType, Registry, User};

/// Render every stored entity of `kind`, one line each.
pub async fn run_list(registry: &Registry, kind: EntityKind) -> Result<Vec<String>, LambdaError> {
    match kind {
        EntityKind::User => lines::<User>(registry).await,
        EntityKind::MealType => lines::<MealType>(registry).await,
        EntityKind::Meal => lines::<Meal>(registry).await,
        EntityKind::Lunch => lines::<Lunch>(registry).await,
        EntityKind::LunchOrder => lines::<LunchOrder>(registry).await,
    }
}

async fn lines<T: Entity + Display>(registry: &Registry) -> Result<Vec<String>, LambdaError> {
    let items = registry.retriever::<T>()?.get_all().await?;
    Ok(items.iter().map(ToString::to_string).collect())
}
