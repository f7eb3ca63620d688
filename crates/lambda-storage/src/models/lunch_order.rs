// SPDX-FileCopyrightText: 2026 Project Lambda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt;

use lambda_core::{EntityId, EntityKind, LambdaError};

use crate::entity::Entity;
use crate::params::Params;
use crate::rowset::Row;

use super::identity_by_id;

/// A user's order of one lunch. `picked` is unknown (`None`) until recorded.
#[derive(Debug, Clone)]
pub struct LunchOrder {
    pub id: EntityId,
    pub lunch_id: EntityId,
    pub user_id: EntityId,
    pub picked: Option<bool>,
}

identity_by_id!(LunchOrder);

impl LunchOrder {
    pub fn new(lunch_id: EntityId, user_id: EntityId, picked: Option<bool>) -> Self {
        Self {
            id: EntityId::UNSAVED,
            lunch_id,
            user_id,
            picked,
        }
    }

    pub fn is_picked(&self) -> bool {
        self.picked == Some(true)
    }

    /// Orders of `@User_ID` for any lunch served on `@Date`.
    pub const COUNT_FOR_USER_ON_DATE: &'static str = "SELECT COUNT(*) FROM LunchOrder o \
        JOIN Lunch l ON l.ID = o.Lunch_ID WHERE o.User_ID = @User_ID AND l.Date = @Date;";
}

impl Entity for LunchOrder {
    const KIND: EntityKind = EntityKind::LunchOrder;
    const SELECT_ALL: &'static str = "SELECT * FROM LunchOrder;";
    const UPDATE: &'static str = "UPDATE LunchOrder SET Lunch_ID = @Lunch_ID, User_ID = @User_ID, \
        Picked = @Picked WHERE ID = @ID;";
    const INSERT: &'static str =
        "INSERT INTO LunchOrder (Lunch_ID, User_ID, Picked) VALUES (@Lunch_ID, @User_ID, @Picked);";
    const DELETE: &'static str = "DELETE FROM LunchOrder WHERE ID = @ID;";

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }

    fn from_row(row: &Row<'_>) -> Result<Self, LambdaError> {
        Ok(Self {
            id: EntityId(row.field(Self::KIND, "ID")?),
            lunch_id: EntityId(row.field(Self::KIND, "Lunch_ID")?),
            user_id: EntityId(row.field(Self::KIND, "User_ID")?),
            picked: row.field(Self::KIND, "Picked")?,
        })
    }

    fn params(&self, include_id: bool) -> Params {
        let params = Params::new()
            .with("@Lunch_ID", self.lunch_id.get())
            .with("@User_ID", self.user_id.get())
            .with("@Picked", self.picked);
        if include_id {
            params.with("@ID", self.id.get())
        } else {
            params
        }
    }
}

impl fmt::Display for LunchOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let picked = match self.picked {
            Some(true) => "picked",
            Some(false) => "not picked",
            None => "unknown",
        };
        write!(
            f,
            "LunchOrder {}: lunch {}, user {}, {picked}",
            self.id, self.lunch_id, self.user_id
        )
    }
}
