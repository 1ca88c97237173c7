// SPDX-FileCopyrightText: 2026 Gastobot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP webhook gateway: the push transport into the intake orchestrator.

pub mod handlers;
pub mod server;

pub use server::{router, start_server, GatewayState};
