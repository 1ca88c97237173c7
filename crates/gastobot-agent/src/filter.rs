// SPDX-FileCopyrightText: 2026 Gastobot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message filter: decides whether an inbound message is in scope before
//! any side effect runs.

use gastobot_core::types::ChatMessage;

/// Pure predicate: is this message in scope for processing?
///
/// The sender's username must be a member of the allow-list; absence of a
/// username or non-membership disqualifies. Matching is case-insensitive
/// and tolerates a leading `@` in allow-list entries. Content support is
/// enforced structurally -- only supported content kinds can be
/// represented as a [`ChatMessage`] at all.
pub fn is_in_scope(msg: &ChatMessage, allowed_users: &[String]) -> bool {
    if allowed_users.is_empty() {
        return false;
    }

    let username = match msg.sender_username.as_deref() {
        Some(u) => u,
        None => return false,
    };

    allowed_users.iter().any(|allowed| {
        let allowed = allowed.strip_prefix('@').unwrap_or(allowed);
        username.eq_ignore_ascii_case(allowed)
    })
}
