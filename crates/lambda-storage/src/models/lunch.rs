// SPDX-FileCopyrightText: 2026 Project Lambda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use lambda_core::{EntityId, EntityKind, LambdaError};

use crate::entity::Entity;
use crate::params::Params;
use crate::rowset::Row;

use super::identity_by_id;

/// Storage format of `Lunch.Date`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Storage format of `Lunch.MaxOrderTime`.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A three-course menu offered on one day.
#[derive(Debug, Clone)]
pub struct Lunch {
    pub id: EntityId,
    pub soup_id: EntityId,
    pub main_meal_id: EntityId,
    pub dessert_id: EntityId,
    pub price: f64,
    pub date: NaiveDate,
    /// Last moment an order for this lunch is accepted.
    pub max_order_time: NaiveDateTime,
}

identity_by_id!(Lunch);

impl Lunch {
    pub fn new(
        soup_id: EntityId,
        main_meal_id: EntityId,
        dessert_id: EntityId,
        price: f64,
        date: NaiveDate,
        max_order_time: NaiveDateTime,
    ) -> Self {
        Self {
            id: EntityId::UNSAVED,
            soup_id,
            main_meal_id,
            dessert_id,
            price,
            date,
            max_order_time,
        }
    }
}

fn malformed(column: &str, reason: impl fmt::Display) -> LambdaError {
    LambdaError::MalformedRow {
        entity: EntityKind::Lunch,
        column: column.to_string(),
        reason: reason.to_string(),
    }
}

impl Entity for Lunch {
    const KIND: EntityKind = EntityKind::Lunch;
    const SELECT_ALL: &'static str = "SELECT * FROM Lunch;";
    const UPDATE: &'static str = "UPDATE Lunch SET Soup_ID = @Soup_ID, MainMeal_ID = @MainMeal_ID, \
        Dessert_ID = @Dessert_ID, Price = @Price, Date = @Date, MaxOrderTime = @MaxOrderTime WHERE ID = @ID;";
    const INSERT: &'static str = "INSERT INTO Lunch (Soup_ID, MainMeal_ID, Dessert_ID, Price, Date, MaxOrderTime) \
        VALUES (@Soup_ID, @MainMeal_ID, @Dessert_ID, @Price, @Date, @MaxOrderTime);";
    const DELETE: &'static str = "DELETE FROM Lunch WHERE ID = @ID;";

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }

    fn from_row(row: &Row<'_>) -> Result<Self, LambdaError> {
        let date: String = row.field(Self::KIND, "Date")?;
        let max_order_time: String = row.field(Self::KIND, "MaxOrderTime")?;
        Ok(Self {
            id: EntityId(row.field(Self::KIND, "ID")?),
            soup_id: EntityId(row.field(Self::KIND, "Soup_ID")?),
            main_meal_id: EntityId(row.field(Self::KIND, "MainMeal_ID")?),
            dessert_id: EntityId(row.field(Self::KIND, "Dessert_ID")?),
            price: row.field(Self::KIND, "Price")?,
            date: NaiveDate::parse_from_str(&date, DATE_FORMAT)
                .map_err(|e| malformed("Date", e))?,
            max_order_time: NaiveDateTime::parse_from_str(&max_order_time, DATETIME_FORMAT)
                .map_err(|e| malformed("MaxOrderTime", e))?,
        })
    }

    fn params(&self, include_id: bool) -> Params {
        let params = Params::new()
            .with("@Soup_ID", self.soup_id.get())
            .with("@MainMeal_ID", self.main_meal_id.get())
            .with("@Dessert_ID", self.dessert_id.get())
            .with("@Price", self.price)
            .with("@Date", self.date.format(DATE_FORMAT).to_string())
            .with(
                "@MaxOrderTime",
                self.max_order_time.format(DATETIME_FORMAT).to_string(),
            );
        if include_id {
            params.with("@ID", self.id.get())
        } else {
            params
        }
    }
}

impl fmt::Display for Lunch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Lunch {}: {:.2}, order by {}",
            self.date.format("%d/%m/%Y"),
            self.price,
            self.max_order_time.format("%d/%m/%Y %H:%M")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rowset::RowSet;
    use rusqlite::types::Value;

    fn row_with_date(date: &str) -> RowSet {
        RowSet::new(
            ["ID", "Soup_ID", "MainMeal_ID", "Dessert_ID", "Price", "Date", "MaxOrderTime"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
            vec![vec![
                Value::Integer(1),
                Value::Integer(1),
                Value::Integer(2),
                Value::Integer(3),
                Value::Real(4.5),
                Value::Text(date.into()),
                Value::Text("2026-03-01 10:00:00".into()),
            ]],
        )
    }

    #[test]
    fn dates_parse_from_text_columns() {
        let set = row_with_date("2026-03-02");
        let lunch = Lunch::from_row(&set.first().unwrap()).unwrap();
        assert_eq!(lunch.date, NaiveDate::from_ymd_opt(2026, 3, 2).unwrap());
        assert_eq!(
            lunch.max_order_time.format(DATETIME_FORMAT).to_string(),
            "2026-03-01 10:00:00"
        );
    }

    #[test]
    fn unparseable_date_is_malformed() {
        let set = row_with_date("02/03/2026");
        let err = Lunch::from_row(&set.first().unwrap()).unwrap_err();
        assert!(matches!(
            err,
            LambdaError::MalformedRow { entity: EntityKind::Lunch, ref column, .. } if column == "Date"
        ));
    }
}
