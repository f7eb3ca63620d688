// SPDX-FileCopyrightText: 2026 Project Lambda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for lunch ordering operations.

mod common;

use chrono::{Datelike, NaiveDate};
use lambda_core::{EntityId, EntityKind, IsolationLevel, LambdaError};
use lambda_storage::ordering::{
    LunchImportRow, import_lunches, lunches_for_week, monthly_report, pick_up_order, place_order,
};
use lambda_storage::{EntityCache, EntityRetriever, EntitySet, LunchOrder, Meal, MealType, Lunch};

use common::{credit_of, open_temp, seed_lunch, seed_user};

#[tokio::test]
async fn placing_an_order_debits_credit_atomically() {
    let (db, _dir) = open_temp().await;
    let user = seed_user(&db, "hungry", 20.0).await;
    let lunch = seed_lunch(&db, 4.5).await;

    let order = place_order(&db, &user, &lunch, IsolationLevel::RepeatableRead)
        .await
        .unwrap();
    assert!(!order.id.is_unsaved());
    assert_eq!(order.picked, Some(false));
    assert_eq!(credit_of(&db, &user).await, 15.5);

    let orders = EntityRetriever::<LunchOrder>::new(db.clone())
        .get_all()
        .await
        .unwrap();
    assert_eq!(orders, vec![order]);
}

#[tokio::test]
async fn order_for_missing_user_is_rolled_back() {
    let (db, _dir) = open_temp().await;
    let mut ghost = seed_user(&db, "ghost", 20.0).await;
    let lunch = seed_lunch(&db, 4.5).await;
    ghost.id = EntityId(999);

    let err = place_order(&db, &ghost, &lunch, IsolationLevel::ReadCommitted)
        .await
        .unwrap_err();
    // Either the foreign key or the missing debit target stops it.
    assert!(matches!(
        err,
        LambdaError::NotFound { .. } | LambdaError::Statement { .. }
    ));
    let orders = EntityRetriever::<LunchOrder>::new(db.clone())
        .get_all()
        .await
        .unwrap();
    assert!(orders.is_empty());
}

#[tokio::test]
async fn picking_up_is_recorded_once() {
    let (db, _dir) = open_temp().await;
    let user = seed_user(&db, "picker", 20.0).await;
    let lunch = seed_lunch(&db, 4.5).await;
    let mut order = place_order(&db, &user, &lunch, IsolationLevel::ReadCommitted)
        .await
        .unwrap();

    assert!(pick_up_order(&db, &mut order).await.unwrap());
    assert!(!pick_up_order(&db, &mut order).await.unwrap());

    let stored = EntityRetriever::<LunchOrder>::new(db.clone())
        .get_first_by(&|o: &LunchOrder| o.id == order.id)
        .await
        .unwrap()
        .unwrap();
    assert!(stored.is_picked());
}

fn import_row(soup: &str, day: u32, price: f64) -> LunchImportRow {
    let date = NaiveDate::from_ymd_opt(2026, 3, day).unwrap();
    LunchImportRow {
        soup: soup.to_string(),
        main_course: "Goulash".to_string(),
        dessert: "Cake".to_string(),
        date,
        max_order_time: date.and_hms_opt(10, 0, 0).unwrap(),
        price,
    }
}

#[tokio::test]
async fn import_creates_missing_meals_and_inserts_all_lunches() {
    let (db, _dir) = open_temp().await;
    let meals = EntityCache::<Meal>::new(db.clone());
    let meal_types = EntityCache::<MealType>::new(db.clone());

    let rows = vec![
        import_row("Broth", 2, 4.0),
        import_row("Broth", 3, 4.5),
        import_row("Lentil soup", 4, 5.0),
    ];
    let count = import_lunches(&db, &meals, &meal_types, &rows, IsolationLevel::Serializable)
        .await
        .unwrap();
    assert_eq!(count, 3);

    let stored_meals = EntityRetriever::<Meal>::new(db.clone()).get_all().await.unwrap();
    let mut names: Vec<String> = stored_meals.iter().map(|m| m.name.clone()).collect();
    names.sort();
    assert_eq!(names, vec!["Broth", "Cake", "Goulash", "Lentil soup"]);
    assert_eq!(meals.get_all().await.unwrap().len(), 4);

    let lunches = EntityRetriever::<Lunch>::new(db.clone()).get_all().await.unwrap();
    assert_eq!(lunches.len(), 3);
    let broth = stored_meals.iter().find(|m| m.name == "Broth").unwrap();
    assert_eq!(broth.meal_type_id, EntityId(1));
    assert_eq!(lunches.iter().filter(|l| l.soup_id == broth.id).count(), 2);
}

#[tokio::test]
async fn import_without_meal_type_fails_before_inserting_lunches() {
    let (db, _dir) = open_temp().await;
    db.execute_non_query(
        "DELETE FROM MealType WHERE Name = @Name;",
        lambda_storage::Params::new().with("@Name", "Dessert".to_string()),
    )
    .await
    .unwrap();
    let meals = EntityCache::<Meal>::new(db.clone());
    let meal_types = EntityCache::<MealType>::new(db.clone());

    let err = import_lunches(
        &db,
        &meals,
        &meal_types,
        &[import_row("Broth", 2, 4.0)],
        IsolationLevel::ReadCommitted,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, LambdaError::NotFound { .. }));
    let lunches = EntityRetriever::<Lunch>::new(db.clone()).get_all().await.unwrap();
    assert!(lunches.is_empty());
}

#[tokio::test]
async fn second_order_for_the_same_day_is_rejected() {
    let (db, _dir) = open_temp().await;
    let user = seed_user(&db, "twice", 20.0).await;
    let lunch = seed_lunch(&db, 4.5).await;
    let same_day = seed_lunch(&db, 6.0).await;

    place_order(&db, &user, &lunch, IsolationLevel::RepeatableRead)
        .await
        .unwrap();
    for again in [&lunch, &same_day] {
        let err = place_order(&db, &user, again, IsolationLevel::RepeatableRead)
            .await
            .unwrap_err();
        assert!(
            matches!(err, LambdaError::Conflict { entity: EntityKind::LunchOrder, .. }),
            "got: {err}"
        );
    }

    assert_eq!(credit_of(&db, &user).await, 15.5);
    let orders = EntityRetriever::<LunchOrder>::new(db.clone())
        .get_all()
        .await
        .unwrap();
    assert_eq!(orders.len(), 1);
}

#[tokio::test]
async fn other_users_may_order_the_same_lunch() {
    let (db, _dir) = open_temp().await;
    let first = seed_user(&db, "first", 20.0).await;
    let second = seed_user(&db, "second", 20.0).await;
    let lunch = seed_lunch(&db, 4.5).await;

    for user in [&first, &second] {
        place_order(&db, user, &lunch, IsolationLevel::Serializable)
            .await
            .unwrap();
    }
    assert_eq!(credit_of(&db, &second).await, 15.5);
}

async fn import_days(db: &lambda_storage::Database, days: &[(u32, u32, f64)]) {
    let meals = EntityCache::<Meal>::new(db.clone());
    let meal_types = EntityCache::<MealType>::new(db.clone());
    let rows: Vec<LunchImportRow> = days
        .iter()
        .map(|&(month, day, price)| {
            let date = NaiveDate::from_ymd_opt(2026, month, day).unwrap();
            LunchImportRow {
                soup: "Broth".to_string(),
                main_course: "Goulash".to_string(),
                dessert: "Cake".to_string(),
                date,
                max_order_time: date.and_hms_opt(10, 0, 0).unwrap(),
                price,
            }
        })
        .collect();
    import_lunches(db, &meals, &meal_types, &rows, IsolationLevel::ReadCommitted)
        .await
        .unwrap();
}

#[tokio::test]
async fn week_listing_covers_monday_to_sunday() {
    let (db, _dir) = open_temp().await;
    // 2026-03-02 is a Monday.
    import_days(&db, &[(3, 1, 1.0), (3, 4, 4.0), (3, 2, 2.0), (3, 8, 8.0), (3, 9, 9.0)]).await;
    let lunches = EntityCache::<Lunch>::new(db.clone());

    let week = lunches_for_week(&lunches, NaiveDate::from_ymd_opt(2026, 3, 4).unwrap())
        .await
        .unwrap();
    let days: Vec<u32> = week.iter().map(|l| l.date.day()).collect();
    assert_eq!(days, vec![2, 4, 8]);
    assert!(lunches.is_populated());

    let queries = db.stats().queries;
    let next = lunches_for_week(&lunches, NaiveDate::from_ymd_opt(2026, 3, 9).unwrap())
        .await
        .unwrap();
    assert_eq!(next.len(), 1);
    assert_eq!(db.stats().queries, queries, "week listing is served from the cache");
}

#[tokio::test]
async fn monthly_report_counts_orders_and_cost() {
    let (db, _dir) = open_temp().await;
    let user = seed_user(&db, "reporter", 50.0).await;
    import_days(&db, &[(3, 2, 4.5), (3, 3, 5.0), (3, 20, 6.0), (4, 1, 7.0)]).await;
    let all = EntityRetriever::<Lunch>::new(db.clone()).get_all().await.unwrap();
    for day in [2, 20] {
        let lunch = all.iter().find(|l| l.date.month() == 3 && l.date.day() == day).unwrap();
        place_order(&db, &user, lunch, IsolationLevel::ReadCommitted).await.unwrap();
    }
    let april = all.iter().find(|l| l.date.month() == 4).unwrap();
    place_order(&db, &user, april, IsolationLevel::ReadCommitted).await.unwrap();

    let report = monthly_report(&db, &user, 2026, 3).await.unwrap();
    assert_eq!(report.orders.len(), 2);
    assert_eq!(report.lunches_offered, 3);
    assert_eq!(report.total_cost(), 10.5);
    assert_eq!(report.orders[0].date, NaiveDate::from_ymd_opt(2026, 3, 2).unwrap());
    assert_eq!(report.orders[0].soup, "Broth");

    let rendered = report.to_string();
    assert!(rendered.starts_with("reporter(Test User)"), "got: {rendered}");
    assert!(rendered.contains("Bought 2/3 lunches in 2026-03"), "got: {rendered}");
    assert!(rendered.ends_with("For the price of 10.50"), "got: {rendered}");
}

#[tokio::test]
async fn monthly_report_rejects_invalid_month() {
    let (db, _dir) = open_temp().await;
    let user = seed_user(&db, "reporter", 50.0).await;
    let err = monthly_report(&db, &user, 2026, 13).await.unwrap_err();
    assert!(matches!(err, LambdaError::InvalidInput(_)));

    let empty = monthly_report(&db, &user, 2026, 12).await.unwrap();
    assert!(empty.orders.is_empty());
    assert_eq!(empty.total_cost(), 0.0);
}
