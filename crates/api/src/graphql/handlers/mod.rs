// SPDX-FileCopyrightText: 2025 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

pub mod admin;
pub mod games;
pub mod join_requests;
pub mod registrations;
pub mod sessions;
pub mod students;
pub mod teams;
pub mod users;
pub mod votes;

/// Error type for multi-step mutations that run inside a database
/// transaction, so `?` works on both query results and rule checks.
#[derive(thiserror::Error, Debug)]
pub(crate) enum TxError {
    #[error(transparent)]
    Db(#[from] diesel::result::Error),
    #[error(transparent)]
    Rule(#[from] crate::rules::RuleViolation),
}
