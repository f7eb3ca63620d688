// SPDX-FileCopyrightText: 2026 Project Lambda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt;

use lambda_core::{EntityId, EntityKind, LambdaError};

use crate::entity::Entity;
use crate::params::Params;
use crate::rowset::Row;

use super::identity_by_id;

/// An account that orders lunches and pays from its credit balance.
#[derive(Debug, Clone)]
pub struct User {
    pub id: EntityId,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub password_hashed: String,
    pub credit: f64,
}

identity_by_id!(User);

impl User {
    /// Adjusts the stored balance relative to its current value.
    pub const ADD_CREDIT: &'static str = "UPDATE User SET Credit = Credit + @Delta WHERE ID = @ID;";

    pub const SELECT_ID_BY_USERNAME: &'static str = "SELECT ID FROM User WHERE Username = @Username;";

    pub const SELECT_CREDIT: &'static str = "SELECT Credit FROM User WHERE ID = @ID;";

    pub const SET_CREDIT: &'static str = "UPDATE User SET Credit = @Credit WHERE ID = @ID;";

    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        username: impl Into<String>,
        password_hashed: impl Into<String>,
        credit: f64,
    ) -> Self {
        Self {
            id: EntityId::UNSAVED,
            first_name: first_name.into(),
            last_name: last_name.into(),
            username: username.into(),
            password_hashed: password_hashed.into(),
            credit,
        }
    }

    /// Statement and parameters that add `delta` (negative to debit) to the
    /// stored balance without reading it first.
    pub fn add_credit_statement(&self, delta: f64) -> (&'static str, Params) {
        (
            Self::ADD_CREDIT,
            Params::new().with("@ID", self.id.get()).with("@Delta", delta),
        )
    }
}

impl Entity for User {
    const KIND: EntityKind = EntityKind::User;
    const SELECT_ALL: &'static str = "SELECT * FROM User;";
    const UPDATE: &'static str = "UPDATE User SET FirstName = @FirstName, LastName = @LastName, \
        Username = @Username, Credit = @Credit, PasswordHashed = @PasswordHashed WHERE ID = @ID;";
    const INSERT: &'static str = "INSERT INTO User (FirstName, LastName, Username, PasswordHashed, Credit) \
        VALUES (@FirstName, @LastName, @Username, @PasswordHashed, @Credit);";
    const DELETE: &'static str = "DELETE FROM User WHERE ID = @ID;";

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }

    fn from_row(row: &Row<'_>) -> Result<Self, LambdaError> {
        Ok(Self {
            id: EntityId(row.field(Self::KIND, "ID")?),
            first_name: row.field(Self::KIND, "FirstName")?,
            last_name: row.field(Self::KIND, "LastName")?,
            username: row.field(Self::KIND, "Username")?,
            password_hashed: row.field(Self::KIND, "PasswordHashed")?,
            credit: row.field(Self::KIND, "Credit")?,
        })
    }

    fn params(&self, include_id: bool) -> Params {
        let params = Params::new()
            .with("@FirstName", self.first_name.clone())
            .with("@LastName", self.last_name.clone())
            .with("@Username", self.username.clone())
            .with("@Credit", self.credit)
            .with("@PasswordHashed", self.password_hashed.clone());
        if include_id {
            params.with("@ID", self.id.get())
        } else {
            params
        }
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "User: {} {} ({}), Credit: {:.2}",
            self.first_name, self.last_name, self.username, self.credit
        )
    }
}
