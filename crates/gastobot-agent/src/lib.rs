// SPDX-FileCopyrightText: 2026 Gastobot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gastobot agent: message filter and intake orchestrator.

pub mod filter;
pub mod orchestrator;

pub use orchestrator::{Intake, FALLBACK_ACKNOWLEDGEMENT};
