// SPDX-FileCopyrightText: 2026 Project Lambda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lunch ordering operations built on the executor and entity sets.

use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use lambda_core::{EntityId, EntityKind, IsolationLevel, LambdaError};
use tracing::{info, warn};

use crate::cache::EntityCache;
use crate::database::Database;
use crate::entity::{Entity, Persist};
use crate::models::lunch::DATE_FORMAT;
use crate::models::meal_type::{DESSERT, MAIN_COURSE, SOUP};
use crate::params::Params;
use crate::models::{Lunch, LunchOrder, Meal, MealType, User};
use crate::set::EntitySet;
use crate::transaction::TransactionUnit;

/// Order `lunch` for `user` and debit its price, atomically.
///
/// A user gets one lunch per day: if they already ordered any lunch on
/// `lunch.date`, nothing is written and [`LambdaError::Conflict`] is
/// returned. Returns the saved order. The user's in-memory `credit` is not
/// touched; re-read it if needed.
pub async fn place_order(
    db: &Database,
    user: &User,
    lunch: &Lunch,
    isolation: IsolationLevel,
) -> Result<LunchOrder, LambdaError> {
    if !user.is_saved() || !lunch.is_saved() {
        return Err(LambdaError::Internal(
            "cannot order with an unsaved user or lunch".to_string(),
        ));
    }

    let mut order = LunchOrder::new(lunch.id, user.id, Some(false));
    let (debit, debit_params) = user.add_credit_statement(-lunch.price);

    let mut tx = db.begin(isolation).await?;
    let outcome = async {
        let existing: i64 = tx
            .query_scalar(
                LunchOrder::COUNT_FOR_USER_ON_DATE,
                Params::new()
                    .with("@User_ID", user.id.get())
                    .with("@Date", lunch.date.format(DATE_FORMAT).to_string()),
            )
            .await?
            .unwrap_or(0);
        if existing > 0 {
            return Err(LambdaError::Conflict {
                entity: EntityKind::LunchOrder,
                detail: format!(
                    "user {} already ordered lunch for {}",
                    user.id,
                    lunch.date.format("%d/%m/%Y")
                ),
            });
        }

        let id = tx.insert(LunchOrder::INSERT, order.params(false)).await?;
        let debited = tx.execute(debit, debit_params).await?;
        if debited != 1 {
            return Err(LambdaError::NotFound {
                entity: EntityKind::User,
                detail: format!("id {}", user.id),
            });
        }
        Ok(id)
    }
    .await;

    match outcome {
        Ok(id) => {
            tx.commit().await?;
            order.set_id(id);
            info!(user = %user.id, lunch = %lunch.id, order = %id, price = lunch.price, "lunch ordered");
            Ok(order)
        }
        Err(e) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!(error = %rollback_err, "rollback after failed order failed");
            }
            Err(e)
        }
    }
}

/// Mark an order as picked up and save it.
///
/// Returns `false` without writing if it was already picked.
pub async fn pick_up_order(db: &Database, order: &mut LunchOrder) -> Result<bool, LambdaError> {
    if order.is_picked() {
        return Ok(false);
    }
    let previous = order.picked;
    order.picked = Some(true);
    if let Err(e) = order.try_save(db).await {
        order.picked = previous;
        return Err(e);
    }
    info!(order = %order.id, "lunch picked up");
    Ok(true)
}

/// One lunch to import, with courses named rather than referenced by id.
#[derive(Debug, Clone, PartialEq)]
pub struct LunchImportRow {
    pub soup: String,
    pub main_course: String,
    pub dessert: String,
    pub date: NaiveDate,
    pub max_order_time: NaiveDateTime,
    pub price: f64,
}

/// Import lunches, creating any meal not yet known by name.
///
/// New meals are saved and added to `meals` as they are found. The lunches
/// themselves are inserted in one transaction: all or none. Returns the
/// number of lunches inserted.
pub async fn import_lunches(
    db: &Database,
    meals: &EntityCache<Meal>,
    meal_types: &EntityCache<MealType>,
    rows: &[LunchImportRow],
    isolation: IsolationLevel,
) -> Result<usize, LambdaError> {
    let mut unit = TransactionUnit::new(isolation);
    for row in rows {
        let soup = resolve_meal(db, meals, meal_types, &row.soup, SOUP).await?;
        let main = resolve_meal(db, meals, meal_types, &row.main_course, MAIN_COURSE).await?;
        let dessert = resolve_meal(db, meals, meal_types, &row.dessert, DESSERT).await?;
        let lunch = Lunch::new(soup, main, dessert, row.price, row.date, row.max_order_time);
        unit.push(Lunch::INSERT, lunch.params(false));
    }

    let count = unit.len();
    db.execute_transaction(unit).await?;
    info!(count, "lunches imported");
    Ok(count)
}

/// Lunches of the ISO week (Monday to Sunday) containing `day`, by date.
///
/// Served from the cache; only the first call on a fresh cache hits storage.
pub async fn lunches_for_week(
    lunches: &EntityCache<Lunch>,
    day: NaiveDate,
) -> Result<Vec<Lunch>, LambdaError> {
    let week = day.iso_week();
    let mut found = lunches
        .get_all_by(&|lunch: &Lunch| lunch.date.iso_week() == week)
        .await?;
    found.sort_by_key(|lunch| (lunch.date, lunch.id));
    Ok(found)
}

const MONTHLY_ORDERS: &str = "SELECT l.Date AS Date, s.Name AS Soup, m.Name AS MainCourse, \
    d.Name AS Dessert, l.Price AS Price FROM LunchOrder o \
    JOIN Lunch l ON l.ID = o.Lunch_ID \
    JOIN Meal s ON s.ID = l.Soup_ID \
    JOIN Meal m ON m.ID = l.MainMeal_ID \
    JOIN Meal d ON d.ID = l.Dessert_ID \
    WHERE o.User_ID = @User_ID AND l.Date >= @From AND l.Date < @Until \
    ORDER BY l.Date, o.ID;";

const COUNT_LUNCHES_BETWEEN: &str =
    "SELECT COUNT(*) FROM Lunch WHERE Date >= @From AND Date < @Until;";

/// One ordered lunch in a [`MonthlyReport`].
#[derive(Debug, Clone, PartialEq)]
pub struct ReportedOrder {
    pub date: NaiveDate,
    pub soup: String,
    pub main_course: String,
    pub dessert: String,
    pub price: f64,
}

/// What a user ordered in one calendar month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyReport {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub year: i32,
    pub month: u32,
    pub orders: Vec<ReportedOrder>,
    /// Lunches offered that month, ordered or not.
    pub lunches_offered: i64,
}

impl MonthlyReport {
    pub fn total_cost(&self) -> f64 {
        self.orders.iter().map(|order| order.price).sum()
    }
}

impl fmt::Display for MonthlyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let full_name = format!("{} {}", self.first_name, self.last_name);
        let rule = "-".repeat(self.username.len().max(full_name.len()));
        writeln!(f, "{}({full_name})", self.username)?;
        writeln!(f, "{rule}")?;
        for order in &self.orders {
            writeln!(f, "{}", order.date.format("%d/%m/%Y"))?;
            writeln!(f, "{},{},{}", order.soup, order.main_course, order.dessert)?;
        }
        writeln!(f, "{rule}")?;
        writeln!(f, "Summary:")?;
        writeln!(
            f,
            "Bought {}/{} lunches in {:04}-{:02}",
            self.orders.len(),
            self.lunches_offered,
            self.year,
            self.month
        )?;
        write!(f, "For the price of {:.2}", self.total_cost())
    }
}

/// Build `user`'s report for `year`/`month` from one consistent snapshot.
pub async fn monthly_report(
    db: &Database,
    user: &User,
    year: i32,
    month: u32,
) -> Result<MonthlyReport, LambdaError> {
    let from = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| LambdaError::InvalidInput(format!("no such month: {year}-{month:02}")))?;
    let until = from
        .checked_add_months(chrono::Months::new(1))
        .ok_or_else(|| LambdaError::InvalidInput(format!("month out of range: {year}-{month:02}")))?;
    let range = Params::new()
        .with("@From", from.format(DATE_FORMAT).to_string())
        .with("@Until", until.format(DATE_FORMAT).to_string());

    let mut tx = db.begin(IsolationLevel::RepeatableRead).await?;
    let outcome = async {
        let rows = tx
            .query(MONTHLY_ORDERS, range.clone().with("@User_ID", user.id.get()))
            .await?;
        let offered: i64 = tx
            .query_scalar(COUNT_LUNCHES_BETWEEN, range)
            .await?
            .unwrap_or(0);
        Ok::<_, LambdaError>((rows, offered))
    }
    .await;
    let (rows, lunches_offered) = match outcome {
        Ok(read) => {
            tx.commit().await?;
            read
        }
        Err(e) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!(error = %rollback_err, "rollback after failed report failed");
            }
            return Err(e);
        }
    };

    let mut orders = Vec::with_capacity(rows.len());
    for row in rows.rows() {
        let date: String = row.field(EntityKind::Lunch, "Date")?;
        orders.push(ReportedOrder {
            date: NaiveDate::parse_from_str(&date, DATE_FORMAT).map_err(|e| {
                LambdaError::MalformedRow {
                    entity: EntityKind::Lunch,
                    column: "Date".to_string(),
                    reason: e.to_string(),
                }
            })?,
            soup: row.field(EntityKind::Meal, "Soup")?,
            main_course: row.field(EntityKind::Meal, "MainCourse")?,
            dessert: row.field(EntityKind::Meal, "Dessert")?,
            price: row.field(EntityKind::Lunch, "Price")?,
        });
    }

    info!(user = %user.id, year, month, orders = orders.len(), "monthly report built");
    Ok(MonthlyReport {
        username: user.username.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        year,
        month,
        orders,
        lunches_offered,
    })
}

async fn resolve_meal(
    db: &Database,
    meals: &EntityCache<Meal>,
    meal_types: &EntityCache<MealType>,
    name: &str,
    type_name: &str,
) -> Result<EntityId, LambdaError> {
    if let Some(meal) = meals.get_first_by(&|m: &Meal| m.name == name).await? {
        return Ok(meal.id);
    }

    let meal_type = meal_types
        .get_first_by(&|t: &MealType| t.name == type_name)
        .await?
        .ok_or_else(|| LambdaError::NotFound {
            entity: EntityKind::MealType,
            detail: format!("name {type_name}"),
        })?;

    let mut meal = Meal::new(meal_type.id, name);
    let id = meal.try_save(db).await?;
    meals.add_or_update(meal).await;
    Ok(id)
}
