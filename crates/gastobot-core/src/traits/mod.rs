// SPDX-FileCopyrightText: 2026 Gastobot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait definitions for the seams between the intake pipeline and its
//! external collaborators (persistence, classification).

pub mod classifier;
pub mod storage;

pub use classifier::ExpenseClassifier;
pub use storage::MessageStore;
