// SPDX-FileCopyrightText: 2026 Project Lambda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedded schema bootstrap using refinery.
//!
//! SQL migration files are compiled into the binary at build time via
//! `embed_migrations!`. They run automatically on [`Database::open`](crate::Database::open).

use lambda_core::LambdaError;

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Run all pending migrations against the given connection.
///
/// Refinery tracks applied migrations in its own `refinery_schema_history` table,
/// so reopening an existing database is a no-op.
pub fn run_migrations(conn: &mut rusqlite::Connection) -> Result<(), LambdaError> {
    let report = embedded::migrations::runner()
        .run(conn)
        .map_err(|e| LambdaError::Storage {
            source: Box::new(e),
        })?;
    for migration in report.applied_migrations() {
        tracing::info!(version = migration.version(), name = %migration.name(), "applied migration");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_create_tables_and_seed_meal_types() {
        let mut conn = rusqlite::Connection::open_in_memory().unwrap();
        run_migrations(&mut conn).unwrap();

        let names: Vec<String> = conn
            .prepare("SELECT Name FROM MealType ORDER BY ID")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(names, vec!["Soup", "MainCourse", "Dessert"]);

        for table in ["User", "Meal", "Lunch", "LunchOrder"] {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                    [table],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(count, 1, "table {table} should exist");
        }
    }

    #[test]
    fn migrations_are_idempotent() {
        let mut conn = rusqlite::Connection::open_in_memory().unwrap();
        run_migrations(&mut conn).unwrap();
        run_migrations(&mut conn).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM MealType", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 3);
    }
}
