// SPDX-FileCopyrightText: 2026 Project Lambda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt;

use lambda_core::{EntityId, EntityKind, LambdaError};

use crate::entity::Entity;
use crate::params::Params;
use crate::rowset::Row;

use super::identity_by_id;

/// Course category. The schema seeds [`SOUP`], [`MAIN_COURSE`] and [`DESSERT`].
#[derive(Debug, Clone)]
pub struct MealType {
    pub id: EntityId,
    pub name: String,
}

identity_by_id!(MealType);

pub const SOUP: &str = "Soup";
pub const MAIN_COURSE: &str = "MainCourse";
pub const DESSERT: &str = "Dessert";

impl MealType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: EntityId::UNSAVED,
            name: name.into(),
        }
    }
}

impl Entity for MealType {
    const KIND: EntityKind = EntityKind::MealType;
    const SELECT_ALL: &'static str = "SELECT * FROM MealType;";
    const UPDATE: &'static str = "UPDATE MealType SET Name = @Name WHERE ID = @ID;";
    const INSERT: &'static str = "INSERT INTO MealType (Name) VALUES (@Name);";
    const DELETE: &'static str = "DELETE FROM MealType WHERE ID = @ID;";

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }

    fn from_row(row: &Row<'_>) -> Result<Self, LambdaError> {
        Ok(Self {
            id: EntityId(row.field(Self::KIND, "ID")?),
            name: row.field(Self::KIND, "Name")?,
        })
    }

    fn params(&self, include_id: bool) -> Params {
        let params = Params::new().with("@Name", self.name.clone());
        if include_id {
            params.with("@ID", self.id.get())
        } else {
            params
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
