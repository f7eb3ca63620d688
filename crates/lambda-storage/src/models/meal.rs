// SPDX-FileCopyrightText: 2026 Project Lambda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt;

use lambda_core::{EntityId, EntityKind, LambdaError};

use crate::entity::Entity;
use crate::params::Params;
use crate::rowset::Row;

use super::identity_by_id;

/// A named dish of one [`MealType`](super::MealType).
#[derive(Debug, Clone)]
pub struct Meal {
    pub id: EntityId,
    pub meal_type_id: EntityId,
    pub name: String,
}

identity_by_id!(Meal);

impl Meal {
    pub fn new(meal_type_id: EntityId, name: impl Into<String>) -> Self {
        Self {
            id: EntityId::UNSAVED,
            meal_type_id,
            name: name.into(),
        }
    }
}

impl Entity for Meal {
    const KIND: EntityKind = EntityKind::Meal;
    const SELECT_ALL: &'static str = "SELECT * FROM Meal;";
    const UPDATE: &'static str =
        "UPDATE Meal SET MealType_ID = @MealType_ID, Name = @Name WHERE ID = @ID;";
    const INSERT: &'static str = "INSERT INTO Meal (MealType_ID, Name) VALUES (@MealType_ID, @Name);";
    const DELETE: &'static str = "DELETE FROM Meal WHERE ID = @ID;";

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }

    fn from_row(row: &Row<'_>) -> Result<Self, LambdaError> {
        Ok(Self {
            id: EntityId(row.field(Self::KIND, "ID")?),
            meal_type_id: EntityId(row.field(Self::KIND, "MealType_ID")?),
            name: row.field(Self::KIND, "Name")?,
        })
    }

    fn params(&self, include_id: bool) -> Params {
        let params = Params::new()
            .with("@MealType_ID", self.meal_type_id.get())
            .with("@Name", self.name.clone());
        if include_id {
            params.with("@ID", self.id.get())
        } else {
            params
        }
    }
}

impl fmt::Display for Meal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
