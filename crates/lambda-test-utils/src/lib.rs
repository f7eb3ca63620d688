// SPDX-FileCopyrightText: 2026 Project Lambda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Lambda integration tests.
//!
//! Provides a temp-database harness with seed helpers for fast,
//! deterministic tests without a shared store.

pub mod harness;

pub use harness::{TestHarness, TestHarnessBuilder};
