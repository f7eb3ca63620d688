// SPDX-FileCopyrightText: 2026 Project Lambda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persisted record types of the lunch ordering store.

pub mod lunch;
pub mod lunch_order;
pub mod meal;
pub mod meal_type;
pub mod user;

pub use lunch::Lunch;
pub use lunch_order::LunchOrder;
pub use meal::Meal;
pub use meal_type::MealType;
pub use user::User;

/// Implements id-based equality and hashing for an entity type.
macro_rules! identity_by_id {
    ($ty:ty) => {
        impl PartialEq for $ty {
            fn eq(&self, other: &Self) -> bool {
                self.id == other.id
            }
        }

        impl Eq for $ty {}

        impl std::hash::Hash for $ty {
            fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                self.id.hash(state);
            }
        }
    };
}

pub(crate) use identity_by_id;
