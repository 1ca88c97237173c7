// SPDX-FileCopyrightText: 2026 Gastobot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query modules. All queries accept `&Database` and go through the
//! single background connection.

pub mod messages;
